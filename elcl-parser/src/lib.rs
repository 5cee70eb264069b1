#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

mod access;
pub use access::AccessCheck;
pub use access::AccessCheckResult;
pub use access::AccessFeature;
pub use access::AccessSources;
pub use access::FileAccessCheck;

mod assignment;
pub use assignment::Feature;

mod builder;
pub use builder::DocumentBuilder;

mod char_stream;
mod chars;

#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "cli")]
pub mod commands;

mod digest;
pub use digest::HashAlgorithm;
pub use digest::digest_text;

mod document;
pub use document::Document;

mod error;
pub use error::Error;
pub use error::ErrorCategory;

mod lexer;

pub mod limits;

mod parser;
pub use parser::Parser;
pub use parser::ParserSettings;

mod resolver;
pub use resolver::FileSourceResolver;
pub use resolver::ResolverFeature;
pub use resolver::SourceResolver;
pub use resolver::SourceResolverContext;

mod signature;
pub use signature::SignatureValidator;
pub use signature::SignatureValidatorData;
pub use signature::SignatureValidatorResult;

mod source;
pub use source::FileSource;
pub use source::Source;
pub use source::TextSource;

mod test_format;
pub use test_format::TestFormat;
pub use test_format::value_test_text;

mod token;

mod value;
pub use value::Value;
pub use value::ValueKind;
pub use value::ValueMatrix;
pub use value::ValuePtr;
