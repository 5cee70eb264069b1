//! The document root of a parsed value tree.

use elcl_types::{IntoNamePath, Location, NamePath};

use crate::error::Error;
use crate::test_format::{TestFormat, value_test_text};
use crate::value::ValuePtr;

/// A parsed configuration document.
///
/// The document owns the root of the value tree. Documents are built by
/// the parser or the document builder and are read-only afterwards.
#[derive(Debug)]
pub struct Document {
    root: ValuePtr,
    digest_text: Option<String>,
}

impl Document {
    pub(crate) fn new(root: ValuePtr) -> Self {
        Self {
            root,
            digest_text: None,
        }
    }

    pub(crate) fn set_digest_text(&mut self, digest_text: String) {
        self.digest_text = Some(digest_text);
    }

    pub(crate) fn set_location(&self, location: Location) {
        self.root.set_location(location);
    }

    /// The root value of the document.
    #[must_use]
    pub fn root(&self) -> &ValuePtr {
        &self.root
    }

    /// The digest of the document text, as `<algorithm> <hex>`.
    ///
    /// Only available when the document carried a `@signature` or when
    /// hashing was explicitly enabled for signing.
    #[must_use]
    pub fn digest_text(&self) -> Option<&str> {
        self.digest_text.as_deref()
    }

    /// The number of top-level elements.
    #[must_use]
    pub fn size(&self) -> usize {
        self.root.size()
    }

    /// Test if a value exists at the given name path.
    #[must_use]
    pub fn has_value(&self, path: impl IntoNamePath) -> bool {
        self.root.has_value(path)
    }

    /// Resolve the value at the given name path.
    #[must_use]
    pub fn value(&self, path: impl IntoNamePath) -> Option<ValuePtr> {
        self.root.value(path)
    }

    /// Resolve the value at the given name path, or fail.
    pub fn try_value(&self, path: impl IntoNamePath) -> Result<ValuePtr, Error> {
        self.root.try_value(path)
    }

    /// All non-document descendants with their absolute name paths, in
    /// depth-first order.
    #[must_use]
    pub fn to_flat_value_map(&self) -> Vec<(NamePath, ValuePtr)> {
        let mut result = Vec::new();
        flatten_into(&self.root, &NamePath::new(), &mut result);
        result
    }

    /// Render the value tree in the test format, one line per value.
    #[must_use]
    pub fn to_test_value_tree(&self, format: TestFormat) -> String {
        let mut result = String::new();
        for (path, value) in self.to_flat_value_map() {
            result.push_str(&format!("{path} => {}\n", value_test_text(&value, format)));
        }
        result
    }
}

fn flatten_into(value: &ValuePtr, path: &NamePath, result: &mut Vec<(NamePath, ValuePtr)>) {
    for child in value.children() {
        let mut child_path = path.clone();
        if let Some(name) = child.name() {
            child_path.append(name);
        }
        result.push((child_path.clone(), child.clone()));
        flatten_into(&child, &child_path, result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use elcl_types::Name;

    fn sample_document() -> Document {
        let root = Value::create_document();
        let section = Value::create_section_with_names();
        section.set_name(Name::regular("main").unwrap());
        Value::attach_child(&root, section.clone());
        let value = Value::create_integer(42);
        value.set_name(Name::regular("value").unwrap());
        Value::attach_child(&section, value);
        Document::new(root)
    }

    #[test]
    fn flat_map_lists_all_descendants() {
        let document = sample_document();
        let flat: Vec<String> = document
            .to_flat_value_map()
            .iter()
            .map(|(path, _)| format!("{path}"))
            .collect();
        assert_eq!(flat, vec!["main", "main.value"]);
    }

    #[test]
    fn lookup_through_the_document() {
        let document = sample_document();
        assert!(document.has_value("main.value"));
        assert_eq!(document.value("main.value").unwrap().as_integer(), 42);
        assert!(document.value("main.missing").is_none());
        assert!(document.try_value("main.missing").is_err());
    }

    #[test]
    fn test_value_tree_rendering() {
        let document = sample_document();
        let tree = document.to_test_value_tree(TestFormat::default().with_container_size());
        assert_eq!(
            tree,
            "main => SectionWithNames(size=1)\nmain.value => Integer(42)\n"
        );
    }
}
