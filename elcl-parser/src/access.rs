//! Access control for document sources.

use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use elcl_types::SourceIdentifier;

use crate::error::{Error, ErrorCategory};
use crate::limits::MAX_DOCUMENT_SIZE;

/// The sources involved in an access decision.
#[derive(Clone, Debug)]
pub struct AccessSources {
    /// The source that is about to be opened.
    pub source: Arc<SourceIdentifier>,
    /// The including document, or `None` for the root document.
    pub parent: Option<Arc<SourceIdentifier>>,
    /// The root document of the parse.
    pub root: Arc<SourceIdentifier>,
}

/// The result of an access check.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AccessCheckResult {
    /// Access to the source is granted.
    Granted,
    /// Access to the source is denied.
    Denied,
}

/// Decides whether a document source may be opened.
///
/// The parser consults the access check before opening any source,
/// including the root document.
pub trait AccessCheck: Debug {
    /// Check if the source in `sources` may be opened.
    fn check(&self, sources: &AccessSources) -> Result<AccessCheckResult, Error>;
}

/// The policies of the [`FileAccessCheck`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum AccessFeature {
    /// Allow including files from the directory of the including file.
    SameDirectory,
    /// Allow including files from subdirectories of the including file.
    Subdirectories,
    /// Allow including files from anywhere.
    AnyDirectory,
    /// Reject all non-file sources.
    OnlyFileSources,
    /// Reject included files over the 100 MB document limit.
    LimitSize,
    /// Require the `.elcl` suffix on included files.
    RequireSuffix,
}

/// The default access check, sandboxing includes to the file tree of the
/// including document.
///
/// Enabled by default: [`AccessFeature::SameDirectory`],
/// [`AccessFeature::Subdirectories`] and [`AccessFeature::LimitSize`].
#[derive(Debug)]
pub struct FileAccessCheck {
    same_directory: bool,
    subdirectories: bool,
    any_directory: bool,
    only_file_sources: bool,
    limit_size: bool,
    require_suffix: bool,
}

impl Default for FileAccessCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl FileAccessCheck {
    /// Create an access check with the default policy set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            same_directory: true,
            subdirectories: true,
            any_directory: false,
            only_file_sources: false,
            limit_size: true,
            require_suffix: false,
        }
    }

    /// Enable a policy.
    pub fn enable(&mut self, feature: AccessFeature) {
        self.set(feature, true);
    }

    /// Disable a policy.
    pub fn disable(&mut self, feature: AccessFeature) {
        self.set(feature, false);
    }

    /// Test if a policy is enabled.
    #[must_use]
    pub fn is_enabled(&self, feature: AccessFeature) -> bool {
        match feature {
            AccessFeature::SameDirectory => self.same_directory,
            AccessFeature::Subdirectories => self.subdirectories,
            AccessFeature::AnyDirectory => self.any_directory,
            AccessFeature::OnlyFileSources => self.only_file_sources,
            AccessFeature::LimitSize => self.limit_size,
            AccessFeature::RequireSuffix => self.require_suffix,
        }
    }

    fn set(&mut self, feature: AccessFeature, enabled: bool) {
        match feature {
            AccessFeature::SameDirectory => self.same_directory = enabled,
            AccessFeature::Subdirectories => self.subdirectories = enabled,
            AccessFeature::AnyDirectory => self.any_directory = enabled,
            AccessFeature::OnlyFileSources => self.only_file_sources = enabled,
            AccessFeature::LimitSize => self.limit_size = enabled,
            AccessFeature::RequireSuffix => self.require_suffix = enabled,
        }
    }

    /// The checks for file sources.
    fn file_access_check(&self, sources: &AccessSources) -> Result<(), Error> {
        if !(self.any_directory || self.same_directory || self.subdirectories) {
            return Err(access_error(
                "No directory access policies are configured. \
                 All file access is currently blocked.",
            ));
        }
        let Some(parent) = &sources.parent else {
            // The root document itself is always accessible.
            return Ok(());
        };
        let source_path = self.extract_source_path(sources)?;
        let parent_directory = self.extract_parent_directory(parent)?;
        let source_path = canonicalize(&source_path, "included file")?;
        if self.limit_size {
            let size = std::fs::metadata(&source_path)
                .map_err(|io_error| {
                    access_error("Cannot read the metadata of the included file.")
                        .with_path(&source_path)
                        .with_io_error(io_error)
                })?
                .len();
            if size > MAX_DOCUMENT_SIZE {
                return Err(access_error(
                    "The included file exceeds the maximum allowed size of 100MB.",
                )
                .with_path(source_path));
            }
        }
        if !self.any_directory {
            let parent_directory =
                canonicalize(&parent_directory, "parent file's directory")?;
            let is_in_same = require_source_in_parent_directory(&source_path, &parent_directory)?;
            if !self.same_directory && is_in_same {
                return Err(access_error(
                    "Including files from the same directory as the parent file \
                     is not permitted by policy.",
                )
                .with_path(source_path));
            }
            if !self.subdirectories && !is_in_same {
                return Err(access_error(
                    "Including files from subdirectories is not permitted by policy.",
                )
                .with_path(source_path));
            }
        }
        Ok(())
    }

    fn extract_source_path(&self, sources: &AccessSources) -> Result<PathBuf, Error> {
        let source_path = PathBuf::from(sources.source.path());
        if self.require_suffix {
            let has_suffix = source_path
                .extension()
                .and_then(|extension| extension.to_str())
                .is_some_and(|extension| extension.eq_ignore_ascii_case("elcl"));
            if !has_suffix {
                return Err(access_error(
                    "The included file does not have the suffix \".elcl\".",
                )
                .with_path(source_path));
            }
        }
        Ok(source_path)
    }

    fn extract_parent_directory(&self, parent: &SourceIdentifier) -> Result<PathBuf, Error> {
        if parent.name() != "file" {
            return Err(access_error(
                "Cannot verify the parent path because the including document \
                 is not a local file.",
            ));
        }
        let parent_path = PathBuf::from(parent.path());
        let parent_directory = parent_path.parent().ok_or_else(|| {
            access_error("Could not determine the parent directory of the including file.")
        })?;
        Ok(parent_directory.to_path_buf())
    }
}

impl AccessCheck for FileAccessCheck {
    fn check(&self, sources: &AccessSources) -> Result<AccessCheckResult, Error> {
        if sources.source.name() != "file" {
            if self.only_file_sources {
                return Err(access_error("Only file sources are permitted."));
            }
            return Ok(AccessCheckResult::Granted);
        }
        self.file_access_check(sources)?;
        Ok(AccessCheckResult::Granted)
    }
}

fn access_error(message: impl Into<String>) -> Error {
    Error::new(ErrorCategory::Access, message)
}

fn canonicalize(path: &Path, description: &str) -> Result<PathBuf, Error> {
    path.canonicalize().map_err(|io_error| {
        access_error(format!(
            "Failed to resolve the canonical path of the {description}."
        ))
        .with_path(path)
        .with_io_error(io_error)
    })
}

/// Verify that the source lies below the parent directory; returns
/// whether both are in the very same directory.
fn require_source_in_parent_directory(
    source_path: &Path,
    parent_directory: &Path,
) -> Result<bool, Error> {
    let source_directory = source_path.parent().ok_or_else(|| {
        access_error("Could not determine the directory of the included file.")
            .with_path(source_path)
    })?;
    if !source_directory.starts_with(parent_directory) {
        return Err(access_error(
            "The included file is outside the allowed directory range of the parent file.",
        )
        .with_path(source_path));
    }
    Ok(source_directory == parent_directory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn sources_for(source: &Path, parent: Option<&Path>, root: &Path) -> AccessSources {
        AccessSources {
            source: SourceIdentifier::for_file(source.to_string_lossy()),
            parent: parent.map(|path| SourceIdentifier::for_file(path.to_string_lossy())),
            root: SourceIdentifier::for_file(root.to_string_lossy()),
        }
    }

    #[test]
    fn root_documents_are_always_granted() {
        let check = FileAccessCheck::new();
        let path = Path::new("/does/not/exist.elcl");
        let result = check.check(&sources_for(path, None, path)).unwrap();
        assert_eq!(result, AccessCheckResult::Granted);
    }

    #[test]
    fn same_directory_includes_are_granted() {
        let directory = tempfile::tempdir().unwrap();
        let main = directory.path().join("main.elcl");
        let other = directory.path().join("other.elcl");
        fs::write(&main, "").unwrap();
        fs::write(&other, "").unwrap();
        let check = FileAccessCheck::new();
        let result = check
            .check(&sources_for(&other, Some(&main), &main))
            .unwrap();
        assert_eq!(result, AccessCheckResult::Granted);
    }

    #[test]
    fn subdirectory_includes_are_granted_by_default() {
        let directory = tempfile::tempdir().unwrap();
        let main = directory.path().join("main.elcl");
        fs::create_dir(directory.path().join("sub")).unwrap();
        let sub = directory.path().join("sub/other.elcl");
        fs::write(&main, "").unwrap();
        fs::write(&sub, "").unwrap();
        let check = FileAccessCheck::new();
        let result = check.check(&sources_for(&sub, Some(&main), &main)).unwrap();
        assert_eq!(result, AccessCheckResult::Granted);
    }

    #[test]
    fn includes_outside_the_parent_tree_are_denied() {
        let directory = tempfile::tempdir().unwrap();
        fs::create_dir(directory.path().join("a")).unwrap();
        fs::create_dir(directory.path().join("b")).unwrap();
        let main = directory.path().join("a/main.elcl");
        let outside = directory.path().join("b/other.elcl");
        fs::write(&main, "").unwrap();
        fs::write(&outside, "").unwrap();
        let check = FileAccessCheck::new();
        let error = check
            .check(&sources_for(&outside, Some(&main), &main))
            .unwrap_err();
        assert_eq!(error.category(), ErrorCategory::Access);
    }

    #[test]
    fn subdirectories_can_be_disabled() {
        let directory = tempfile::tempdir().unwrap();
        let main = directory.path().join("main.elcl");
        fs::create_dir(directory.path().join("sub")).unwrap();
        let sub = directory.path().join("sub/other.elcl");
        fs::write(&main, "").unwrap();
        fs::write(&sub, "").unwrap();
        let mut check = FileAccessCheck::new();
        check.disable(AccessFeature::Subdirectories);
        let error = check
            .check(&sources_for(&sub, Some(&main), &main))
            .unwrap_err();
        assert_eq!(error.category(), ErrorCategory::Access);
    }

    #[test]
    fn suffix_requirement() {
        let directory = tempfile::tempdir().unwrap();
        let main = directory.path().join("main.elcl");
        let other = directory.path().join("other.conf");
        fs::write(&main, "").unwrap();
        fs::write(&other, "").unwrap();
        let mut check = FileAccessCheck::new();
        check.enable(AccessFeature::RequireSuffix);
        let error = check
            .check(&sources_for(&other, Some(&main), &main))
            .unwrap_err();
        assert_eq!(error.category(), ErrorCategory::Access);
    }

    #[test]
    fn non_file_sources_pass_unless_restricted() {
        let check = FileAccessCheck::new();
        let sources = AccessSources {
            source: SourceIdentifier::for_text(),
            parent: None,
            root: SourceIdentifier::for_text(),
        };
        assert_eq!(check.check(&sources).unwrap(), AccessCheckResult::Granted);
        let mut check = FileAccessCheck::new();
        check.enable(AccessFeature::OnlyFileSources);
        assert_eq!(
            check.check(&sources).unwrap_err().category(),
            ErrorCategory::Access
        );
    }
}
