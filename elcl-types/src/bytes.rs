use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::Error;

/// An ordered sequence of bytes.
///
/// Byte data is parsed from and formatted as lowercase hexadecimal text.
///
/// ## Examples
/// ```
/// use std::str::FromStr;
/// use elcl_types::Bytes;
///
/// let bytes = Bytes::from_str("01a2ff").unwrap();
/// assert_eq!(bytes.as_slice(), &[0x01, 0xa2, 0xff]);
/// assert_eq!(format!("{bytes}"), "01a2ff");
/// assert_eq!(Bytes::from_str("01 A2 FF").unwrap(), bytes);
/// assert!(Bytes::from_str("012").is_err());
/// ```
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Bytes {
    data: Vec<u8>,
}

impl Bytes {
    /// Create an empty byte sequence.
    #[must_use]
    pub const fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Parse byte data from hexadecimal text.
    ///
    /// Whitespace between the digits is ignored; the digit count must be
    /// even and both digit cases are accepted.
    pub fn from_hex(text: &str) -> Result<Self, Error> {
        let mut data = Vec::with_capacity(text.len() / 2);
        let mut high: Option<u8> = None;
        for c in text.chars() {
            if c.is_ascii_whitespace() {
                continue;
            }
            let digit = c
                .to_digit(16)
                .ok_or_else(|| Error::InvalidBytes(format!("unexpected character '{c}'")))?
                as u8;
            match high.take() {
                None => high = Some(digit),
                Some(high_digit) => data.push((high_digit << 4) | digit),
            }
        }
        if high.is_some() {
            return Err(Error::InvalidBytes(String::from(
                "an odd number of hex digits",
            )));
        }
        Ok(Self { data })
    }

    /// Render this byte sequence as continuous lowercase hexadecimal text.
    #[must_use]
    pub fn to_hex(&self) -> String {
        let mut result = String::with_capacity(self.data.len() * 2);
        for byte in &self.data {
            result.push_str(&format!("{byte:02x}"));
        }
        result
    }

    /// The number of bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Test if the sequence is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The bytes as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Append all bytes of another sequence.
    pub fn append(&mut self, other: &Self) {
        self.data.extend_from_slice(&other.data);
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl Display for Bytes {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Bytes {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::from_hex(input)
    }
}
