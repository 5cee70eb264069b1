//! The parser driver: the multi-source context stack.

use std::path::Path;
use std::sync::Arc;

use elcl_types::{Location, Name, SourceIdentifier};
use log::{debug, trace};

use crate::access::{AccessCheck, AccessCheckResult, AccessSources, FileAccessCheck};
use crate::assignment::{Assignment, AssignmentKind, AssignmentStream};
use crate::builder::DocumentBuilder;
use crate::char_stream::CharStream;
use crate::digest::{HashAlgorithm, digest_text};
use crate::document::Document;
use crate::error::{Error, ErrorCategory};
use crate::limits::MAX_DOCUMENT_NESTING;
use crate::resolver::{FileSourceResolver, SourceResolver, SourceResolverContext};
use crate::signature::{SignatureValidator, SignatureValidatorData, SignatureValidatorResult};
use crate::source::{FileSource, Source, TextSource};

/// The collaborators of a [`Parser`].
///
/// The default settings use the [`FileSourceResolver`] and the
/// [`FileAccessCheck`] and no signature validator, which rejects all
/// signed documents.
#[derive(Debug)]
pub struct ParserSettings {
    /// Resolves `@include` directives; `None` disables includes.
    pub source_resolver: Option<Box<dyn SourceResolver>>,
    /// Gates the access to sources; `None` grants all access.
    pub access_check: Option<Box<dyn AccessCheck>>,
    /// Verifies document signatures; `None` rejects signed documents.
    pub signature_validator: Option<Box<dyn SignatureValidator>>,
    /// Forces document hashing for the root source, to sign documents.
    pub hash_algorithm: Option<HashAlgorithm>,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            source_resolver: Some(Box::new(FileSourceResolver::new())),
            access_check: Some(Box::new(FileAccessCheck::new())),
            signature_validator: None,
            hash_algorithm: None,
        }
    }
}

/// The parser: turns a document source into a [`Document`].
///
/// One parser instance can parse any number of documents, one at a
/// time. Includes are parsed on a context stack, all feeding the same
/// document tree.
///
/// ## Examples
/// ```
/// use elcl_parser::Parser;
///
/// # fn main() -> Result<(), elcl_parser::Error> {
/// let mut parser = Parser::new();
/// let document = parser.parse_text("[main]\nvalue: 42\n")?;
/// assert_eq!(document.value("main.value").unwrap().as_integer(), 42);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct Parser {
    settings: ParserSettings,
    last_error: Option<Error>,
}

impl Parser {
    /// Create a parser with the default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with custom settings.
    #[must_use]
    pub fn with_settings(settings: ParserSettings) -> Self {
        Self {
            settings,
            last_error: None,
        }
    }

    /// Access the settings for modification.
    pub fn settings_mut(&mut self) -> &mut ParserSettings {
        &mut self.settings
    }

    /// Parse a document from the given source.
    pub fn parse(&mut self, source: Box<dyn Source>) -> Result<Document, Error> {
        let driver = Driver::new(&self.settings, source);
        driver.run()
    }

    /// Parse a document from a file.
    pub fn parse_file(&mut self, path: impl AsRef<Path>) -> Result<Document, Error> {
        self.parse(Box::new(FileSource::new(path.as_ref())))
    }

    /// Parse a document from a text.
    pub fn parse_text(&mut self, text: impl Into<String>) -> Result<Document, Error> {
        self.parse(Box::new(TextSource::new(text)))
    }

    /// Parse a document, storing a failure as the last error.
    pub fn parse_or_none(&mut self, source: Box<dyn Source>) -> Option<Document> {
        match self.parse(source) {
            Ok(document) => {
                self.last_error = None;
                Some(document)
            }
            Err(error) => {
                self.last_error = Some(error);
                None
            }
        }
    }

    /// The error of the last [`Parser::parse_or_none`] call.
    #[must_use]
    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }
}

/// One frame of the context stack: a source and its assignment stream.
#[derive(Debug)]
struct ParserContext {
    include_level: usize,
    identifier: Arc<SourceIdentifier>,
    source: Option<Box<dyn Source>>,
    stream: Option<AssignmentStream>,
    parent_identifier: Option<Arc<SourceIdentifier>>,
    include_location: Option<Location>,
    signature_text: String,
}

impl ParserContext {
    fn new(include_level: usize, source: Box<dyn Source>) -> Self {
        Self {
            include_level,
            identifier: source.identifier(),
            source: Some(source),
            stream: None,
            parent_identifier: None,
            include_location: None,
            signature_text: String::new(),
        }
    }

    fn is_initialized(&self) -> bool {
        self.stream.is_some()
    }

    /// Open the source and create the assignment stream.
    fn initialize(&mut self, hash_algorithm: Option<HashAlgorithm>) -> Result<(), Error> {
        let Some(mut source) = self.source.take() else {
            return Err(Error::new(
                ErrorCategory::Internal,
                "The context was already initialized.",
            ));
        };
        source.open()?;
        let mut stream = AssignmentStream::new(CharStream::new(source));
        if let Some(algorithm) = hash_algorithm {
            stream.enable_hashing(algorithm);
        }
        self.stream = Some(stream);
        Ok(())
    }

    fn next_assignment(&mut self) -> Result<Assignment, Error> {
        self.stream
            .as_mut()
            .ok_or_else(|| {
                Error::new(ErrorCategory::Internal, "The context is not initialized.")
            })?
            .next_assignment()
    }

    /// The digest text of the parsed document, if hashing was active.
    fn digest_text(&self) -> Option<String> {
        let (algorithm, digest) = self.stream.as_ref()?.digest()?;
        Some(digest_text(*algorithm, digest))
    }

    /// Close the source on all exit paths.
    fn close(&mut self) {
        if let Some(stream) = self.stream.as_mut() {
            stream.close();
        }
        if let Some(source) = self.source.as_mut() {
            source.close();
        }
    }
}

/// The state of one parse run.
struct Driver<'a> {
    settings: &'a ParserSettings,
    builder: DocumentBuilder,
    stack: Vec<ParserContext>,
    root_identifier: Arc<SourceIdentifier>,
    root_digest_text: Option<String>,
}

impl<'a> Driver<'a> {
    fn new(settings: &'a ParserSettings, source: Box<dyn Source>) -> Self {
        let root_identifier = source.identifier();
        Self {
            settings,
            builder: DocumentBuilder::new(),
            stack: vec![ParserContext::new(0, source)],
            root_identifier,
            root_digest_text: None,
        }
    }

    fn run(mut self) -> Result<Document, Error> {
        let root_location = Location::from_source(self.root_identifier.clone());
        match self.parse_all() {
            Ok(()) => {
                let mut document = self.builder.get_document_and_reset();
                document.set_location(root_location);
                if let Some(digest) = self.root_digest_text.take() {
                    document.set_digest_text(digest);
                }
                Ok(document)
            }
            Err(error) => {
                // Close the remaining contexts; the original error wins.
                for context in self.stack.iter_mut().rev() {
                    context.close();
                }
                Err(error)
            }
        }
    }

    fn parse_all(&mut self) -> Result<(), Error> {
        while !self.stack.is_empty() {
            self.initialize_current_context()?;
            let assignment = self.current_context()?.next_assignment()?;
            trace!("assignment: {:?} {}", assignment.kind, assignment.name_path);
            match assignment.kind {
                AssignmentKind::EndOfDocument => {
                    self.pre_leave_processing()?;
                    if let Some(mut context) = self.stack.pop() {
                        context.close();
                    }
                }
                AssignmentKind::SectionMap => {
                    self.builder
                        .add_section_map_at(&assignment.name_path, assignment.location)?;
                }
                AssignmentKind::SectionList => {
                    self.builder
                        .add_section_list_at(&assignment.name_path, assignment.location)?;
                }
                AssignmentKind::Value => {
                    let value = assignment.value.ok_or_else(|| {
                        Error::new(ErrorCategory::Internal, "A value assignment without a value.")
                    })?;
                    self.builder
                        .add_value_at(&assignment.name_path, value, assignment.location)?;
                }
                AssignmentKind::MetaValue => self.process_meta_value(&assignment)?,
            }
        }
        Ok(())
    }

    fn current_context(&mut self) -> Result<&mut ParserContext, Error> {
        self.stack.last_mut().ok_or_else(|| {
            Error::new(ErrorCategory::Internal, "No context available.")
        })
    }

    /// Run the access check and open the topmost source, if needed.
    fn initialize_current_context(&mut self) -> Result<(), Error> {
        let top = self.current_context()?;
        if top.is_initialized() {
            return Ok(());
        }
        let identifier = top.identifier.clone();
        let parent_identifier = top.parent_identifier.clone();
        let location = top
            .include_location
            .clone()
            .unwrap_or_else(|| Location::from_source(identifier.clone()));
        if let Some(access_check) = &self.settings.access_check {
            let sources = AccessSources {
                source: identifier.clone(),
                parent: parent_identifier,
                root: self.root_identifier.clone(),
            };
            match access_check.check(&sources) {
                Ok(AccessCheckResult::Granted) => {}
                Ok(AccessCheckResult::Denied) => {
                    return Err(Error::with_location(
                        ErrorCategory::Access,
                        "Access denied to source.",
                        location,
                    ));
                }
                Err(error) => return Err(error.at_if_missing(location)),
            }
        }
        debug!("opening source: {identifier}");
        let hash_algorithm = if self.stack.len() == 1 {
            self.settings.hash_algorithm
        } else {
            None
        };
        self.current_context()?.initialize(hash_algorithm)
    }

    /// Handle `@signature` and `@include` meta values.
    fn process_meta_value(&mut self, assignment: &Assignment) -> Result<(), Error> {
        let name = assignment.name_path.last().cloned().ok_or_else(|| {
            Error::new(ErrorCategory::Internal, "A meta value without a name.")
        })?;
        let text = assignment
            .value
            .as_ref()
            .map(|value| value.as_text())
            .unwrap_or_default();
        if name == Name::meta_signature() {
            self.current_context()?.signature_text = text;
        } else if name == Name::meta_include() {
            self.process_include(&text, &assignment.location)?;
        }
        Ok(())
    }

    fn process_include(&mut self, include_text: &str, location: &Location) -> Result<(), Error> {
        let include_level = self.current_context()?.include_level + 1;
        if include_level >= MAX_DOCUMENT_NESTING {
            return Err(Error::with_location(
                ErrorCategory::LimitExceeded,
                format!(
                    "The maximum document nesting level of {MAX_DOCUMENT_NESTING} is exceeded."
                ),
                location.clone(),
            ));
        }
        let parent_identifier = self.current_context()?.identifier.clone();
        let Some(resolver) = &self.settings.source_resolver else {
            return Err(Error::with_location(
                ErrorCategory::Unsupported,
                "The @include meta-command is disabled.",
                location.clone(),
            ));
        };
        let context = SourceResolverContext {
            include_text: include_text.to_string(),
            source_identifier: parent_identifier.clone(),
        };
        let sources = resolver
            .resolve(&context)
            .map_err(|error| error.at_if_missing(location.clone()))?;
        // Push in reverse order so the first source is parsed first.
        for source in sources.into_iter().rev() {
            self.push_source_context(include_level, source, parent_identifier.clone(), location)?;
        }
        Ok(())
    }

    fn push_source_context(
        &mut self,
        include_level: usize,
        source: Box<dyn Source>,
        parent_identifier: Arc<SourceIdentifier>,
        location: &Location,
    ) -> Result<(), Error> {
        let identifier = source.identifier();
        // A source anywhere on the stack means the includes form a loop.
        if self
            .stack
            .iter()
            .any(|context| context.identifier == identifier)
        {
            return Err(Error::with_location(
                ErrorCategory::Syntax,
                "An included document is in the list of parent documents (loop detected).",
                location.clone(),
            ));
        }
        let mut context = ParserContext::new(include_level, source);
        context.parent_identifier = Some(parent_identifier);
        context.include_location = Some(location.clone());
        self.stack.push(context);
        Ok(())
    }

    /// Verify the signature before a context is left.
    fn pre_leave_processing(&mut self) -> Result<(), Error> {
        let is_root_context = self.stack.len() == 1;
        let top = self.current_context()?;
        let identifier = top.identifier.clone();
        let signature_text = top.signature_text.clone();
        let context_digest = top.digest_text();
        if is_root_context {
            self.root_digest_text = context_digest.clone();
        }
        if let Some(validator) = &self.settings.signature_validator {
            let document_digest = context_digest.unwrap_or_else(|| {
                format!("{} ", HashAlgorithm::default())
            });
            let data = SignatureValidatorData {
                source_identifier: identifier.clone(),
                signature_text,
                document_digest,
            };
            if validator.validate(&data)? != SignatureValidatorResult::Accept {
                return Err(Error::with_location(
                    ErrorCategory::Signature,
                    "Signature verification failed.",
                    Location::from_source(identifier),
                ));
            }
        } else if !signature_text.is_empty() {
            // Without a validator, a signed document cannot be trusted.
            return Err(Error::with_location(
                ErrorCategory::Signature,
                "Signature cannot be verified.",
                Location::from_source(identifier),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueKind;
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> Result<Document, Error> {
        Parser::new().parse_text(text)
    }

    #[test]
    fn minimal_map() {
        let document = parse("[main]\nvalue: 42\n").unwrap();
        let flat: Vec<String> = document
            .to_flat_value_map()
            .iter()
            .map(|(path, value)| format!("{path} => {}", value.kind()))
            .collect();
        assert_eq!(
            flat,
            vec!["main => SectionWithNames", "main.value => Integer"]
        );
        assert_eq!(document.value("main").unwrap().size(), 1);
        assert_eq!(document.value("main.value").unwrap().as_integer(), 42);
    }

    #[test]
    fn section_lists_and_relative_paths() {
        let document = parse(
            "[servers]\nname: \"primary\"\n\
             *[servers.workers]\nid: 1\n\
             *[servers.workers]\nid: 2\n",
        )
        .unwrap();
        let workers = document.value("servers.workers").unwrap();
        assert_eq!(workers.kind(), ValueKind::SectionList);
        assert_eq!(workers.size(), 2);
        assert_eq!(document.value("servers.workers[0].id").unwrap().as_integer(), 1);
        assert_eq!(document.value("servers.workers[1].id").unwrap().as_integer(), 2);
    }

    #[test]
    fn multi_line_text_value() {
        let document = parse("[doc]\nbody:\n    \"\"\"\n    hello\n    world\n    \"\"\"\n").unwrap();
        assert_eq!(document.value("doc.body").unwrap().as_text(), "hello\nworld");
    }

    #[test]
    fn duplicate_value_is_a_name_conflict() {
        let error = parse("[main]\nvalue: 1\nvalue: 2\n").unwrap_err();
        assert_eq!(error.category(), ErrorCategory::NameConflict);
    }

    #[test]
    fn signed_document_without_validator_is_rejected() {
        let error = parse("@signature: \"data\"\n[main]\n").unwrap_err();
        assert_eq!(error.category(), ErrorCategory::Signature);
        assert_eq!(error.message(), "Signature cannot be verified.");
    }

    #[derive(Debug)]
    struct AcceptAll;

    impl SignatureValidator for AcceptAll {
        fn validate(
            &self,
            data: &SignatureValidatorData,
        ) -> Result<SignatureValidatorResult, Error> {
            assert!(data.document_digest.starts_with("sha3-256 "));
            Ok(SignatureValidatorResult::Accept)
        }
    }

    #[derive(Debug)]
    struct RejectAll;

    impl SignatureValidator for RejectAll {
        fn validate(
            &self,
            _data: &SignatureValidatorData,
        ) -> Result<SignatureValidatorResult, Error> {
            Ok(SignatureValidatorResult::Reject)
        }
    }

    #[test]
    fn validator_accepts_signed_document() {
        let mut settings = ParserSettings::default();
        settings.signature_validator = Some(Box::new(AcceptAll));
        let mut parser = Parser::with_settings(settings);
        let document = parser
            .parse_text("@signature: \"data\"\n[main]\nvalue: 1\n")
            .unwrap();
        assert_eq!(document.value("main.value").unwrap().as_integer(), 1);
        assert!(document.digest_text().unwrap().starts_with("sha3-256 "));
    }

    #[test]
    fn validator_rejection_is_a_signature_error() {
        let mut settings = ParserSettings::default();
        settings.signature_validator = Some(Box::new(RejectAll));
        let mut parser = Parser::with_settings(settings);
        let error = parser.parse_text("[main]\n").unwrap_err();
        assert_eq!(error.category(), ErrorCategory::Signature);
    }

    #[test]
    fn disabled_resolver_rejects_includes() {
        let mut settings = ParserSettings::default();
        settings.source_resolver = None;
        let mut parser = Parser::with_settings(settings);
        let error = parser.parse_text("@include: \"other.elcl\"\n").unwrap_err();
        assert_eq!(error.category(), ErrorCategory::Unsupported);
    }

    #[test]
    fn parse_or_none_stores_the_error() {
        let mut parser = Parser::new();
        let document = parser.parse_or_none(Box::new(TextSource::new("value 1\n")));
        assert!(document.is_none());
        assert!(parser.last_error().is_some());
        let document = parser.parse_or_none(Box::new(TextSource::new("[main]\n")));
        assert!(document.is_some());
        assert!(parser.last_error().is_none());
    }

    #[test]
    fn errors_carry_the_document_location() {
        let error = parse("[main]\nvalue: 9999999999999999999999\n").unwrap_err();
        let location = error.location().unwrap();
        assert_eq!(location.position().line(), 2);
    }

    #[test]
    fn document_hashing_can_be_forced() {
        let mut settings = ParserSettings::default();
        settings.hash_algorithm = Some(HashAlgorithm::Sha3_512);
        let mut parser = Parser::with_settings(settings);
        let document = parser.parse_text("[main]\nvalue: 1\n").unwrap();
        assert!(document.digest_text().unwrap().starts_with("sha3-512 "));
    }
}
