//! Resolving `@include` directives into document sources.

use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use elcl_types::SourceIdentifier;
use log::debug;
use walkdir::WalkDir;

use crate::error::{Error, ErrorCategory};
use crate::limits::MAX_INCLUDE_SOURCES;
use crate::source::{FileSource, Source};

/// The maximum character count of an include path.
const MAX_INCLUDE_TEXT_LENGTH: usize = 500;

/// The context handed to a [`SourceResolver`].
#[derive(Clone, Debug)]
pub struct SourceResolverContext {
    /// The text of the `@include` meta value.
    pub include_text: String,
    /// The identifier of the including document.
    pub source_identifier: Arc<SourceIdentifier>,
}

/// Resolves the text of an `@include` directive into a list of sources.
///
/// The returned order is the order in which the documents are parsed.
pub trait SourceResolver: Debug {
    /// Resolve the include text into an ordered list of sources.
    fn resolve(&self, context: &SourceResolverContext) -> Result<Vec<Box<dyn Source>>, Error>;
}

/// The optional features of the [`FileSourceResolver`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ResolverFeature {
    /// Accept the `file:` prefix in include paths.
    FileProtocol,
    /// Accept a single `*` wildcard in the filename.
    FilenameWildcard,
    /// Accept a single `**` directory wildcard.
    RecursiveWildcard,
    /// Accept absolute include paths.
    AbsolutePaths,
}

/// The default resolver, loading included documents from the filesystem.
///
/// Supports `file:`-prefixed and bare paths, at most one `*` wildcard in
/// the filename and at most one `**` wildcard as an individual directory
/// component. The result is sorted with directories ordered before files
/// at each level.
#[derive(Debug)]
pub struct FileSourceResolver {
    file_protocol: bool,
    filename_wildcard: bool,
    recursive_wildcard: bool,
    absolute_paths: bool,
}

impl Default for FileSourceResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// A filename with an optional `*` wildcard.
#[derive(Debug)]
struct FilenamePattern {
    prefix: String,
    suffix: String,
    has_wildcard: bool,
}

impl FilenamePattern {
    fn matches(&self, filename: &str) -> bool {
        if self.has_wildcard {
            return filename.starts_with(&self.prefix)
                && filename.ends_with(&self.suffix)
                && filename.len() >= self.prefix.len() + self.suffix.len();
        }
        filename == self.prefix
    }
}

impl FileSourceResolver {
    /// Create a resolver with all features enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            file_protocol: true,
            filename_wildcard: true,
            recursive_wildcard: true,
            absolute_paths: true,
        }
    }

    /// Enable a feature.
    pub fn enable(&mut self, feature: ResolverFeature) {
        self.set(feature, true);
    }

    /// Disable a feature.
    pub fn disable(&mut self, feature: ResolverFeature) {
        self.set(feature, false);
    }

    /// Test if a feature is enabled.
    #[must_use]
    pub fn is_enabled(&self, feature: ResolverFeature) -> bool {
        match feature {
            ResolverFeature::FileProtocol => self.file_protocol,
            ResolverFeature::FilenameWildcard => self.filename_wildcard,
            ResolverFeature::RecursiveWildcard => self.recursive_wildcard,
            ResolverFeature::AbsolutePaths => self.absolute_paths,
        }
    }

    fn set(&mut self, feature: ResolverFeature, enabled: bool) {
        match feature {
            ResolverFeature::FileProtocol => self.file_protocol = enabled,
            ResolverFeature::FilenameWildcard => self.filename_wildcard = enabled,
            ResolverFeature::RecursiveWildcard => self.recursive_wildcard = enabled,
            ResolverFeature::AbsolutePaths => self.absolute_paths = enabled,
        }
    }

    /// Remove the `file:` protocol prefix.
    fn remove_file_protocol(&self, path: &str) -> Result<String, Error> {
        if let Some(stripped) = path.strip_prefix("file:") {
            if !self.file_protocol {
                return Err(syntax_error(
                    "The file protocol prefix 'file:' is not supported.",
                ));
            }
            return Ok(stripped.to_string());
        }
        Ok(path.to_string())
    }

    /// Normalize backslashes and duplicate separators.
    fn normalize_path_separators(path: &str) -> Result<String, Error> {
        let mut result = String::with_capacity(path.len());
        let mut previous_was_separator = false;
        for c in path.chars() {
            let c = if c == '\\' { '/' } else { c };
            if c == '/' {
                if previous_was_separator {
                    continue;
                }
                previous_was_separator = true;
            } else {
                previous_was_separator = false;
            }
            result.push(c);
        }
        if result.ends_with('/') && result.len() > 1 {
            return Err(syntax_error(
                "An include path must not end with a path separator.",
            ));
        }
        Ok(result)
    }

    /// Split an include path into its directory and filename parts.
    fn split_directory_and_filename(path: &str) -> (&str, &str) {
        match path.rfind('/') {
            None => ("", path),
            Some(index) => (&path[..index], &path[index + 1..]),
        }
    }

    /// Analyze the filename part for wildcards.
    fn filename_pattern(&self, filename: &str) -> Result<FilenamePattern, Error> {
        if filename.contains("***") {
            return Err(syntax_error(
                "The include path contains an unsupported wildcard pattern.",
            ));
        }
        if filename.contains("**") {
            return Err(syntax_error(
                "An include path must not contain the recursive '**' wildcard in the filename.",
            ));
        }
        let asterisk_count = filename.matches('*').count();
        if asterisk_count > 1 {
            return Err(syntax_error(
                "An include path must not contain more than one '*' wildcard in the filename.",
            ));
        }
        if asterisk_count == 1 {
            if !self.filename_wildcard {
                return Err(syntax_error("The filename wildcard '*' is not supported."));
            }
            let index = filename.find('*').unwrap_or(0);
            return Ok(FilenamePattern {
                prefix: filename[..index].to_string(),
                suffix: filename[index + 1..].to_string(),
                has_wildcard: true,
            });
        }
        Ok(FilenamePattern {
            prefix: filename.to_string(),
            suffix: String::new(),
            has_wildcard: false,
        })
    }

    /// Validate the `**` directory wildcard and strip it from the path.
    fn validate_directory_wildcard<'a>(
        &self,
        directory: &'a str,
    ) -> Result<(&'a str, bool), Error> {
        if directory.contains("***") {
            return Err(syntax_error(
                "The include path contains an unsupported wildcard pattern.",
            ));
        }
        let Some(position) = directory.find("**") else {
            if directory.contains('*') {
                return Err(syntax_error(
                    "An include path must not contain a '*' wildcard in the directory.",
                ));
            }
            return Ok((directory, false));
        };
        if !self.recursive_wildcard {
            return Err(syntax_error("The recursive wildcard '**' is not supported."));
        }
        if directory.matches("**").count() > 1 {
            return Err(syntax_error(
                "An include path must not contain more than one '**' wildcard in the directory.",
            ));
        }
        // The wildcard must be the last directory element and stand alone.
        if directory.len() != position + 2 {
            return Err(syntax_error(
                "The recursive wildcard '**' must be the last directory element in the path.",
            ));
        }
        if position > 0 && directory.as_bytes()[position - 1] != b'/' {
            return Err(syntax_error(
                "The recursive wildcard '**' must be an individual path element.",
            ));
        }
        if position == 0 {
            return Ok(("", true));
        }
        Ok((&directory[..position - 1], true))
    }

    /// The directory of the including document.
    fn base_directory(source_identifier: &SourceIdentifier) -> Result<PathBuf, Error> {
        let error_prefix = "Cannot determine the base directory of the including document. ";
        if source_identifier.name() != "file" {
            return Err(syntax_error(format!(
                "{error_prefix}The document is not a file source."
            )));
        }
        let path = PathBuf::from(source_identifier.path());
        if !path.is_absolute() {
            return Err(syntax_error(format!(
                "{error_prefix}The path of the document is not absolute."
            ))
            .with_path(path));
        }
        let path = path.canonicalize().map_err(|io_error| {
            syntax_error(format!(
                "{error_prefix}The path of the document cannot be canonicalized."
            ))
            .with_path(&path)
            .with_io_error(io_error)
        })?;
        let base_directory = path.parent().ok_or_else(|| {
            syntax_error(format!(
                "{error_prefix}Could not determine the directory of the document."
            ))
            .with_path(&path)
        })?;
        if !base_directory.is_dir() {
            return Err(syntax_error(format!(
                "{error_prefix}The parent path of the document is not a directory."
            ))
            .with_path(base_directory));
        }
        Ok(base_directory.to_path_buf())
    }

    /// Combine the include directory with the base directory.
    fn build_directory(
        &self,
        source_identifier: &SourceIdentifier,
        directory: &str,
    ) -> Result<PathBuf, Error> {
        let result = if directory.is_empty() {
            Self::base_directory(source_identifier)?
        } else {
            let path = PathBuf::from(directory);
            if path.is_absolute() {
                if !self.absolute_paths {
                    return Err(syntax_error("Absolute include paths are not allowed."));
                }
                path
            } else {
                Self::base_directory(source_identifier)?.join(path)
            }
        };
        if !result.exists() {
            return Err(
                syntax_error("The base directory of an include path does not exist.")
                    .with_path(result),
            );
        }
        let result = result.canonicalize().map_err(|io_error| {
            syntax_error("Could not canonicalize the base directory of an include path.")
                .with_io_error(io_error)
        })?;
        if !result.is_dir() {
            return Err(
                syntax_error("The base of an include path is not a directory.").with_path(result)
            );
        }
        Ok(result)
    }

    /// Collect all matching paths below the given directory.
    fn scan_for_paths(
        directory: &Path,
        is_recursive: bool,
        pattern: &FilenamePattern,
    ) -> Result<Vec<PathBuf>, Error> {
        if !is_recursive && !pattern.has_wildcard {
            return Ok(vec![directory.join(&pattern.prefix)]);
        }
        let mut walker = WalkDir::new(directory).min_depth(1);
        if !is_recursive {
            walker = walker.max_depth(1);
        }
        let mut paths = Vec::new();
        for entry in walker.into_iter().filter_map(std::result::Result::ok) {
            if !entry.file_type().is_file() {
                continue;
            }
            let matches = entry
                .file_name()
                .to_str()
                .is_some_and(|filename| pattern.matches(filename));
            if !matches {
                continue;
            }
            if paths.len() >= MAX_INCLUDE_SOURCES {
                return Err(Error::new(
                    ErrorCategory::LimitExceeded,
                    format!(
                        "This include directive includes more than {MAX_INCLUDE_SOURCES} documents."
                    ),
                ));
            }
            paths.push(entry.into_path());
        }
        Ok(paths)
    }

    /// Turn the collected paths into sorted document sources.
    fn create_sources_from_paths(paths: Vec<PathBuf>) -> Result<Vec<Box<dyn Source>>, Error> {
        let mut canonical = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.canonicalize().map_err(|io_error| {
                syntax_error("Could not find the path of an included file.")
                    .with_path(&path)
                    .with_io_error(io_error)
            })?;
            if !path.is_file() {
                return Err(
                    syntax_error("The path of an included file is not a regular file.")
                        .with_path(path),
                );
            }
            canonical.push(path);
        }
        canonical.sort_by(|a, b| compare_paths(a, b));
        Ok(canonical
            .into_iter()
            .map(|path| Box::new(FileSource::new(path)) as Box<dyn Source>)
            .collect())
    }
}

impl SourceResolver for FileSourceResolver {
    fn resolve(&self, context: &SourceResolverContext) -> Result<Vec<Box<dyn Source>>, Error> {
        if context.include_text.is_empty() {
            return Err(syntax_error("The include path is empty."));
        }
        if context.include_text.chars().count() > MAX_INCLUDE_TEXT_LENGTH {
            return Err(syntax_error("The include path is too long."));
        }
        let path = self.remove_file_protocol(&context.include_text)?;
        let path = Self::normalize_path_separators(&path)?;
        let (directory, filename) = Self::split_directory_and_filename(&path);
        let pattern = self.filename_pattern(filename)?;
        let (directory, is_recursive) = self.validate_directory_wildcard(directory)?;
        let directory = self.build_directory(&context.source_identifier, directory)?;
        let paths = Self::scan_for_paths(&directory, is_recursive, &pattern)?;
        debug!(
            "resolved include '{}' to {} source(s)",
            context.include_text,
            paths.len()
        );
        Self::create_sources_from_paths(paths)
    }
}

fn syntax_error(message: impl Into<String>) -> Error {
    Error::new(ErrorCategory::Syntax, message)
}

/// Order paths with directories before files at each level, children
/// directly after their directory, components byte-wise ascending.
fn compare_paths(a: &Path, b: &Path) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    let a: Vec<_> = a.iter().collect();
    let b: Vec<_> = b.iter().collect();
    let mut index = 0;
    loop {
        match (a.get(index), b.get(index)) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(component_a), Some(component_b)) => {
                let a_is_directory = index + 1 < a.len();
                let b_is_directory = index + 1 < b.len();
                if a_is_directory != b_is_directory {
                    // Directories order before plain files.
                    return if a_is_directory {
                        Ordering::Less
                    } else {
                        Ordering::Greater
                    };
                }
                match component_a.cmp(component_b) {
                    Ordering::Equal => index += 1,
                    other => return other,
                }
            }
        }
    }
}
