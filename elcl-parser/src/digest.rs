//! The rolling document digest used by the signature channel.

use elcl_types::Bytes;
use sha3::{Digest, Sha3_256, Sha3_384, Sha3_512};

/// The hash algorithms available for document digests.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, strum::Display, strum::EnumString)]
#[non_exhaustive]
pub enum HashAlgorithm {
    /// SHA3 with a 256-bit digest; the default for signatures.
    #[default]
    #[strum(serialize = "sha3-256")]
    Sha3_256,
    /// SHA3 with a 384-bit digest.
    #[strum(serialize = "sha3-384")]
    Sha3_384,
    /// SHA3 with a 512-bit digest.
    #[strum(serialize = "sha3-512")]
    Sha3_512,
}

/// A rolling hash over the raw line data of a document.
#[derive(Debug)]
pub(crate) enum RollingHash {
    /// SHA3-256 state.
    Sha3_256(Sha3_256),
    /// SHA3-384 state.
    Sha3_384(Sha3_384),
    /// SHA3-512 state.
    Sha3_512(Sha3_512),
}

impl RollingHash {
    /// Create a new rolling hash for the given algorithm.
    pub(crate) fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Sha3_256 => Self::Sha3_256(Sha3_256::new()),
            HashAlgorithm::Sha3_384 => Self::Sha3_384(Sha3_384::new()),
            HashAlgorithm::Sha3_512 => Self::Sha3_512(Sha3_512::new()),
        }
    }

    /// The algorithm of this hash.
    pub(crate) fn algorithm(&self) -> HashAlgorithm {
        match self {
            Self::Sha3_256(_) => HashAlgorithm::Sha3_256,
            Self::Sha3_384(_) => HashAlgorithm::Sha3_384,
            Self::Sha3_512(_) => HashAlgorithm::Sha3_512,
        }
    }

    /// Feed raw data into the hash.
    pub(crate) fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha3_256(hash) => hash.update(data),
            Self::Sha3_384(hash) => hash.update(data),
            Self::Sha3_512(hash) => hash.update(data),
        }
    }

    /// Finalize the hash and return the digest.
    pub(crate) fn finalize(self) -> Bytes {
        match self {
            Self::Sha3_256(hash) => Bytes::from(hash.finalize().to_vec()),
            Self::Sha3_384(hash) => Bytes::from(hash.finalize().to_vec()),
            Self::Sha3_512(hash) => Bytes::from(hash.finalize().to_vec()),
        }
    }
}

/// Render the digest text handed to signature validators:
/// `<algorithm> <lowercase hex digest>`.
#[must_use]
pub fn digest_text(algorithm: HashAlgorithm, digest: &Bytes) -> String {
    format!("{algorithm} {}", digest.to_hex())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn algorithm_names() {
        assert_eq!(format!("{}", HashAlgorithm::Sha3_256), "sha3-256");
        assert_eq!(
            HashAlgorithm::from_str("sha3-512").unwrap(),
            HashAlgorithm::Sha3_512
        );
        assert!(HashAlgorithm::from_str("sha2-256").is_err());
    }

    #[test]
    fn empty_sha3_256_digest() {
        let hash = RollingHash::new(HashAlgorithm::Sha3_256);
        let digest = hash.finalize();
        // The well-known SHA3-256 digest of the empty message.
        assert_eq!(
            digest.to_hex(),
            "a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a"
        );
        assert_eq!(
            digest_text(HashAlgorithm::Sha3_256, &digest),
            "sha3-256 a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a"
        );
    }

    #[test]
    fn update_changes_the_digest() {
        let mut hash = RollingHash::new(HashAlgorithm::Sha3_384);
        hash.update(b"[main]\n");
        let digest = hash.finalize();
        assert_eq!(digest.len(), 48);
    }
}
