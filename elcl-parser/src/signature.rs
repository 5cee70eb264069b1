//! The document signature interface.

use std::fmt::Debug;
use std::sync::Arc;

use elcl_types::SourceIdentifier;

use crate::error::Error;

/// The data handed to a [`SignatureValidator`].
#[derive(Clone, Debug)]
pub struct SignatureValidatorData {
    /// The identifier of the signed document.
    pub source_identifier: Arc<SourceIdentifier>,
    /// The text of the `@signature` meta value; empty if there is none.
    pub signature_text: String,
    /// The digest of the document, as `<algorithm> <hex>`.
    pub document_digest: String,
}

/// The decision of a signature validator.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SignatureValidatorResult {
    /// The signature is valid, or the document acceptably unsigned.
    Accept,
    /// The document is rejected.
    Reject,
}

/// Validates document signatures.
///
/// The parser calls the validator once for every parsed document, right
/// before its source is closed, with the signature text from the
/// document and the digest computed over the document data. Without a
/// configured validator, documents carrying a signature are rejected.
pub trait SignatureValidator: Debug {
    /// Decide whether the document is acceptable.
    fn validate(&self, data: &SignatureValidatorData) -> Result<SignatureValidatorResult, Error>;
}
