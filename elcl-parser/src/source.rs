//! Sources deliver the raw line data of configuration documents.

use std::fmt::Debug;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use elcl_types::SourceIdentifier;

use crate::error::{Error, ErrorCategory};
use crate::limits::{MAX_DOCUMENT_SIZE, MAX_LINE_LENGTH};

/// A source of document data, read line by line.
///
/// A source must be opened before reading and closed on all exit paths;
/// the parser driver takes care of this for its own sources. Line data is
/// delivered raw, including the line terminator.
pub trait Source: Debug {
    /// The identifier of this source.
    fn identifier(&self) -> Arc<SourceIdentifier>;

    /// Open the source for reading.
    fn open(&mut self) -> Result<(), Error>;

    /// Test if the source is open.
    fn is_open(&self) -> bool;

    /// Test if all data has been read.
    fn at_end(&self) -> bool;

    /// Read the next line into `buffer`, replacing its contents.
    ///
    /// The line terminator is included. A line that reaches the maximum
    /// line length with no terminator in sight is truncated at one byte
    /// over the limit, which the character stream reports as an error.
    fn read_line(&mut self, buffer: &mut Vec<u8>) -> Result<usize, Error>;

    /// Close the source and release its resources.
    fn close(&mut self);
}

/// Read one line from a buffered reader, including the terminator.
///
/// Recognizes `\n`, `\r` and `\r\n` line endings. Stops one byte past the
/// maximum line length when no terminator was found.
fn read_line_from(
    reader: &mut impl BufRead,
    buffer: &mut Vec<u8>,
    at_end: &mut bool,
) -> std::io::Result<usize> {
    buffer.clear();
    loop {
        let Some(byte) = peek_byte(reader)? else {
            *at_end = true;
            break;
        };
        if byte == b'\n' {
            reader.consume(1);
            buffer.push(byte);
            break;
        }
        if byte == b'\r' {
            reader.consume(1);
            buffer.push(byte);
            if peek_byte(reader)? == Some(b'\n') {
                reader.consume(1);
                buffer.push(b'\n');
            }
            break;
        }
        buffer.push(byte);
        reader.consume(1);
        if buffer.len() > MAX_LINE_LENGTH {
            break;
        }
    }
    Ok(buffer.len())
}

fn peek_byte(reader: &mut impl BufRead) -> std::io::Result<Option<u8>> {
    let available = reader.fill_buf()?;
    Ok(available.first().copied())
}

/// A source reading a document from the local filesystem.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    identifier: Arc<SourceIdentifier>,
    reader: Option<BufReader<File>>,
    at_end: bool,
}

impl FileSource {
    /// Create a new file source for the given path.
    ///
    /// The path is canonicalized when possible, so equal files compare
    /// equal by their source identifier for the include loop detection.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let path = path.canonicalize().unwrap_or(path);
        let identifier = SourceIdentifier::for_file(path.to_string_lossy());
        Self {
            path,
            identifier,
            reader: None,
            at_end: false,
        }
    }

    /// The path of this source.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Source for FileSource {
    fn identifier(&self) -> Arc<SourceIdentifier> {
        self.identifier.clone()
    }

    fn open(&mut self) -> Result<(), Error> {
        let file = File::open(&self.path).map_err(|io_error| {
            Error::new(ErrorCategory::Io, "Cannot open the document.")
                .with_path(&self.path)
                .with_io_error(io_error)
        })?;
        let size = file
            .metadata()
            .map_err(|io_error| {
                Error::new(ErrorCategory::Io, "Cannot read the document metadata.")
                    .with_path(&self.path)
                    .with_io_error(io_error)
            })?
            .len();
        if size > MAX_DOCUMENT_SIZE {
            return Err(Error::new(
                ErrorCategory::LimitExceeded,
                "The document exceeds the maximum allowed size of 100MB.",
            )
            .with_path(&self.path));
        }
        self.reader = Some(BufReader::new(file));
        self.at_end = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.reader.is_some()
    }

    fn at_end(&self) -> bool {
        self.at_end
    }

    fn read_line(&mut self, buffer: &mut Vec<u8>) -> Result<usize, Error> {
        let Some(reader) = self.reader.as_mut() else {
            return Err(Error::new(
                ErrorCategory::Internal,
                "Reading from a source that is not open.",
            ));
        };
        read_line_from(reader, buffer, &mut self.at_end).map_err(|io_error| {
            Error::new(ErrorCategory::Io, "Cannot read from the document.")
                .with_path(&self.path)
                .with_io_error(io_error)
        })
    }

    fn close(&mut self) {
        self.reader = None;
        self.at_end = true;
    }
}

/// A source reading a document from a text in memory.
#[derive(Debug)]
pub struct TextSource {
    identifier: Arc<SourceIdentifier>,
    data: Vec<u8>,
    cursor: usize,
    open: bool,
}

impl TextSource {
    /// Create a new source from a text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            identifier: SourceIdentifier::for_text(),
            data: text.into().into_bytes(),
            cursor: 0,
            open: false,
        }
    }

    /// Create a new source from raw bytes.
    #[must_use]
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self {
            identifier: SourceIdentifier::for_text(),
            data,
            cursor: 0,
            open: false,
        }
    }
}

impl Source for TextSource {
    fn identifier(&self) -> Arc<SourceIdentifier> {
        self.identifier.clone()
    }

    fn open(&mut self) -> Result<(), Error> {
        if self.data.len() as u64 > MAX_DOCUMENT_SIZE {
            return Err(Error::new(
                ErrorCategory::LimitExceeded,
                "The document exceeds the maximum allowed size of 100MB.",
            ));
        }
        self.open = true;
        self.cursor = 0;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn at_end(&self) -> bool {
        self.cursor >= self.data.len()
    }

    fn read_line(&mut self, buffer: &mut Vec<u8>) -> Result<usize, Error> {
        if !self.open {
            return Err(Error::new(
                ErrorCategory::Internal,
                "Reading from a source that is not open.",
            ));
        }
        let mut remaining = &self.data[self.cursor.min(self.data.len())..];
        let mut at_end = false;
        let count = read_line_from(&mut remaining, buffer, &mut at_end).map_err(|io_error| {
            Error::new(ErrorCategory::Io, "Cannot read from the document.").with_io_error(io_error)
        })?;
        self.cursor += count;
        Ok(count)
    }

    fn close(&mut self) {
        self.open = false;
    }
}
