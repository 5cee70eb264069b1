//! The document builder places sections and values into the value tree.

use elcl_types::{
    Bytes, Date, DateTime, IntoNamePath, Location, Name, NamePath, Regex, Time, TimeDelta,
};
use log::trace;

use crate::document::Document;
use crate::error::{Error, ErrorCategory};
use crate::value::{Value, ValueKind, ValuePtr};

/// Builds configuration documents, one section or value at a time.
///
/// The builder is used by the parser and can also be used to create
/// documents programmatically. It verifies the same rules the document
/// syntax enforces: values require an existing section, names must be
/// unique within their container and regular and text names cannot be
/// mixed.
///
/// ## Examples
/// ```
/// use elcl_parser::DocumentBuilder;
///
/// # fn main() -> Result<(), elcl_parser::Error> {
/// let mut builder = DocumentBuilder::new();
/// builder.add_section_map("main")?;
/// builder.add_integer("value", 42)?;
/// let document = builder.get_document_and_reset();
/// assert_eq!(document.value("main.value").unwrap().as_integer(), 42);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DocumentBuilder {
    root: ValuePtr,
    last_section: Option<ValuePtr>,
    last_section_path: NamePath,
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentBuilder {
    /// Create a new builder with an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Value::create_document(),
            last_section: None,
            last_section_path: NamePath::new(),
        }
    }

    /// Discard the current document and start a new one.
    pub fn reset(&mut self) {
        self.root = Value::create_document();
        self.last_section = None;
        self.last_section_path = NamePath::new();
    }

    /// The name path of the last added section; empty before the first one.
    #[must_use]
    pub fn last_section_path(&self) -> &NamePath {
        &self.last_section_path
    }

    /// Return the built document and reset the builder.
    ///
    /// Intermediate sections that were never defined explicitly become
    /// regular sections, so the returned tree contains no transient types.
    #[must_use]
    pub fn get_document_and_reset(&mut self) -> Document {
        let root = std::mem::replace(&mut self.root, Value::create_document());
        finalize_intermediate_sections(&root);
        self.last_section = None;
        self.last_section_path = NamePath::new();
        Document::new(root)
    }

    /// Add a section map at the given name path.
    ///
    /// Missing parent sections are created as intermediate sections; an
    /// existing intermediate section at the path is converted.
    pub fn add_section_map(&mut self, path: impl IntoNamePath) -> Result<(), Error> {
        self.add_section_map_at(&path.into_name_path()?, Location::undefined())
    }

    pub(crate) fn add_section_map_at(
        &mut self,
        path: &NamePath,
        location: Location,
    ) -> Result<(), Error> {
        trace!("add section map: {path}");
        self.verify_section_path(path, &location)?;
        let (parent, existing) = self.resolve_for_section(path, &location)?;
        let section = match existing {
            Some(existing) => {
                if existing.kind() != ValueKind::IntermediateSection {
                    return Err(Error::with_location(
                        ErrorCategory::NameConflict,
                        "A section or value with the same name already exists. \
                         This is a conflict with the new section.",
                        location,
                    )
                    .with_name_path(path.clone()));
                }
                existing.transform(ValueKind::SectionWithNames);
                existing.set_location(location);
                existing
            }
            None => {
                let section = Value::create_section_with_names();
                section.set_name(last_name(path)?);
                self.add_child_value(parent.as_ref(), path, &location, &section)?;
                section
            }
        };
        self.last_section = Some(section);
        self.last_section_path = path.clone();
        Ok(())
    }

    /// Add a section list entry at the given name path.
    ///
    /// Creates the section list if it does not exist and appends a fresh
    /// section to it.
    pub fn add_section_list(&mut self, path: impl IntoNamePath) -> Result<(), Error> {
        self.add_section_list_at(&path.into_name_path()?, Location::undefined())
    }

    pub(crate) fn add_section_list_at(
        &mut self,
        path: &NamePath,
        location: Location,
    ) -> Result<(), Error> {
        trace!("add section list: {path}");
        self.verify_section_path(path, &location)?;
        if last_name(path)?.is_text() {
            return Err(Error::with_location(
                ErrorCategory::Syntax,
                "Can not create a section list with a text name.",
                location,
            )
            .with_name_path(path.clone()));
        }
        let (parent, existing) = self.resolve_for_section(path, &location)?;
        let entry = match existing {
            Some(existing) => {
                if existing.kind() != ValueKind::SectionList {
                    return Err(Error::with_location(
                        ErrorCategory::NameConflict,
                        "A section map or value with the same name already exists. \
                         This is a conflict with the new section list.",
                        location,
                    )
                    .with_name_path(path.clone()));
                }
                let entry = Value::create_section_with_names();
                entry.set_location(location);
                Value::append_to_section_list(&existing, entry.clone());
                entry
            }
            None => {
                let list = Value::create_section_list();
                list.set_name(last_name(path)?);
                self.add_child_value(parent.as_ref(), path, &location, &list)?;
                let entry = Value::create_section_with_names();
                entry.set_location(location);
                Value::append_to_section_list(&list, entry.clone());
                entry
            }
        };
        self.last_section = Some(entry);
        self.last_section_path = path.clone();
        Ok(())
    }

    /// Add an integer value.
    pub fn add_integer(&mut self, path: impl IntoNamePath, value: i64) -> Result<(), Error> {
        self.add_value_at(
            &path.into_name_path()?,
            Value::create_integer(value),
            Location::undefined(),
        )
    }

    /// Add a boolean value.
    pub fn add_boolean(&mut self, path: impl IntoNamePath, value: bool) -> Result<(), Error> {
        self.add_value_at(
            &path.into_name_path()?,
            Value::create_boolean(value),
            Location::undefined(),
        )
    }

    /// Add a float value.
    pub fn add_float(&mut self, path: impl IntoNamePath, value: f64) -> Result<(), Error> {
        self.add_value_at(
            &path.into_name_path()?,
            Value::create_float(value),
            Location::undefined(),
        )
    }

    /// Add a text value.
    pub fn add_text(
        &mut self,
        path: impl IntoNamePath,
        value: impl Into<String>,
    ) -> Result<(), Error> {
        self.add_value_at(
            &path.into_name_path()?,
            Value::create_text(value),
            Location::undefined(),
        )
    }

    /// Add a date value.
    pub fn add_date(&mut self, path: impl IntoNamePath, value: Date) -> Result<(), Error> {
        self.add_value_at(
            &path.into_name_path()?,
            Value::create_date(value),
            Location::undefined(),
        )
    }

    /// Add a time value.
    pub fn add_time(&mut self, path: impl IntoNamePath, value: Time) -> Result<(), Error> {
        self.add_value_at(
            &path.into_name_path()?,
            Value::create_time(value),
            Location::undefined(),
        )
    }

    /// Add a date-time value.
    pub fn add_date_time(
        &mut self,
        path: impl IntoNamePath,
        value: DateTime,
    ) -> Result<(), Error> {
        self.add_value_at(
            &path.into_name_path()?,
            Value::create_date_time(value),
            Location::undefined(),
        )
    }

    /// Add a byte-data value.
    pub fn add_bytes(&mut self, path: impl IntoNamePath, value: Bytes) -> Result<(), Error> {
        self.add_value_at(
            &path.into_name_path()?,
            Value::create_bytes(value),
            Location::undefined(),
        )
    }

    /// Add a time-delta value.
    pub fn add_time_delta(
        &mut self,
        path: impl IntoNamePath,
        value: TimeDelta,
    ) -> Result<(), Error> {
        self.add_value_at(
            &path.into_name_path()?,
            Value::create_time_delta(value),
            Location::undefined(),
        )
    }

    /// Add a regular expression value.
    pub fn add_regex(&mut self, path: impl IntoNamePath, value: Regex) -> Result<(), Error> {
        self.add_value_at(
            &path.into_name_path()?,
            Value::create_regex(value),
            Location::undefined(),
        )
    }

    /// Add an already created value at the given name path.
    ///
    /// A path with a single name targets the last added section; a
    /// longer path is resolved from the document root without creating
    /// missing sections.
    pub(crate) fn add_value_at(
        &mut self,
        path: &NamePath,
        value: ValuePtr,
        location: Location,
    ) -> Result<(), Error> {
        trace!("add value: {path}");
        if value.kind().is_container() {
            return Err(Error::new(
                ErrorCategory::Internal,
                "Containers must be added with the section methods.",
            ));
        }
        let section = self.resolve_for_value(path, &location)?;
        if value.name().is_none() {
            value.set_name(last_name(path)?);
        }
        let name = value
            .name()
            .ok_or_else(|| Error::new(ErrorCategory::Internal, "A value without a name."))?;
        if let Some(section) = &section {
            if section.child(&name).is_some() {
                return Err(Error::with_location(
                    ErrorCategory::NameConflict,
                    "A value with the same name already exists.",
                    location,
                )
                .with_name_path(path.clone()));
            }
        }
        self.add_child_value(section.as_ref(), path, &location, &value)
    }

    /// Verify the common rules for section name paths.
    fn verify_section_path(&self, path: &NamePath, location: &Location) -> Result<(), Error> {
        if path.is_empty() {
            return Err(Error::with_location(
                ErrorCategory::Syntax,
                "Can not create a section with an empty name path.",
                location.clone(),
            ));
        }
        if path.contains_index() {
            return Err(Error::with_location(
                ErrorCategory::Syntax,
                "Can not create a section with an index in the name path.",
                location.clone(),
            )
            .with_name_path(path.clone()));
        }
        Ok(())
    }

    /// Resolve the parent container for a section definition, creating
    /// intermediate sections for the missing parts of the path.
    ///
    /// Returns the parent container (`None` for the document root) and
    /// the existing value at the final name, if there is one.
    fn resolve_for_section(
        &self,
        path: &NamePath,
        location: &Location,
    ) -> Result<(Option<ValuePtr>, Option<ValuePtr>), Error> {
        let mut section: Option<ValuePtr> = None;
        let mut parent: Option<ValuePtr> = None;
        for index in 0..path.len().saturating_sub(1) {
            let name = path
                .at(index)
                .ok_or_else(|| Error::new(ErrorCategory::Internal, "Name path out of range."))?;
            let child = self.get_child(section.as_ref(), name);
            section = match child {
                None => {
                    let intermediate = Value::create_intermediate_section();
                    intermediate.set_name(name.clone());
                    self.add_child_value(parent.as_ref(), path, location, &intermediate)?;
                    Some(intermediate)
                }
                Some(child) => {
                    if child.kind() == ValueKind::SectionList {
                        Some(child.last_value().ok_or_else(|| {
                            Error::new(ErrorCategory::Internal, "An empty section list.")
                        })?)
                    } else if !child.kind().is_map() {
                        return Err(Error::with_location(
                            ErrorCategory::NameConflict,
                            "One of the intermediate elements in the name path is a value.",
                            location.clone(),
                        )
                        .with_name_path(path.clone()));
                    } else {
                        Some(child)
                    }
                }
            };
            parent = section.clone();
        }
        let existing = self.get_child(section.as_ref(), &last_name(path)?);
        Ok((parent, existing))
    }

    /// Resolve the section a value is added to, without creating
    /// missing sections.
    fn resolve_for_value(
        &self,
        path: &NamePath,
        location: &Location,
    ) -> Result<Option<ValuePtr>, Error> {
        if path.is_empty() {
            return Err(Error::with_location(
                ErrorCategory::Syntax,
                "Can not add a value with an empty name path.",
                location.clone(),
            ));
        }
        if path.contains_index() {
            return Err(Error::with_location(
                ErrorCategory::Syntax,
                "Can not add a value with an index in the name path.",
                location.clone(),
            )
            .with_name_path(path.clone()));
        }
        if path.len() == 1 {
            return Ok(self.last_section.clone());
        }
        let mut section: Option<ValuePtr> = None;
        for index in 0..path.len() - 1 {
            let name = path
                .at(index)
                .ok_or_else(|| Error::new(ErrorCategory::Internal, "Name path out of range."))?;
            let child = self.get_child(section.as_ref(), name).ok_or_else(|| {
                Error::with_location(
                    ErrorCategory::Syntax,
                    "Can not add a value to a non-existing section.",
                    location.clone(),
                )
                .with_name_path(path.clone())
            })?;
            section = if child.kind() == ValueKind::SectionList {
                Some(child.last_value().ok_or_else(|| {
                    Error::new(ErrorCategory::Internal, "An empty section list.")
                })?)
            } else if !child.kind().is_map() {
                return Err(Error::with_location(
                    ErrorCategory::NameConflict,
                    "One of the intermediate elements in the name path is a value.",
                    location.clone(),
                )
                .with_name_path(path.clone()));
            } else {
                Some(child)
            };
        }
        Ok(section)
    }

    /// Look up a direct child, defaulting to the document root.
    fn get_child(&self, container: Option<&ValuePtr>, name: &Name) -> Option<ValuePtr> {
        container.unwrap_or(&self.root).child(name)
    }

    /// Attach a value to a container, enforcing the placement rules.
    fn add_child_value(
        &self,
        container: Option<&ValuePtr>,
        path: &NamePath,
        location: &Location,
        value: &ValuePtr,
    ) -> Result<(), Error> {
        let parent = match container {
            None => {
                self.apply_root_rules(path, location, value)?;
                &self.root
            }
            Some(container) => {
                Self::apply_container_rules(container, path, location, value)?;
                container
            }
        };
        value.set_location(location.clone());
        Value::attach_child(parent, value.clone());
        Ok(())
    }

    /// The rules for adding an element to the document root.
    fn apply_root_rules(
        &self,
        path: &NamePath,
        location: &Location,
        value: &ValuePtr,
    ) -> Result<(), Error> {
        let kind = value.kind();
        if !kind.is_map() && kind != ValueKind::SectionList {
            return Err(Error::with_location(
                ErrorCategory::Syntax,
                "Can not add a value to the document root.",
                location.clone(),
            )
            .with_name_path(path.clone()));
        }
        if value.name().is_some_and(|name| name.is_text()) {
            return Err(Error::with_location(
                ErrorCategory::NameConflict,
                "Can not add a section with a text name to a document.",
                location.clone(),
            )
            .with_name_path(path.clone()));
        }
        Ok(())
    }

    /// The rules for adding an element to an existing container.
    fn apply_container_rules(
        container: &ValuePtr,
        path: &NamePath,
        location: &Location,
        value: &ValuePtr,
    ) -> Result<(), Error> {
        let container_kind = container.kind();
        let value_kind = value.kind();
        let value_has_text_name = value.name().is_some_and(|name| name.is_text());
        if container.name().is_some_and(|name| name.is_text()) && value_kind.is_map() {
            return Err(Error::with_location(
                ErrorCategory::Syntax,
                "A section with a text name must not have sub sections.",
                location.clone(),
            )
            .with_name_path(path.clone()));
        }
        match container_kind {
            ValueKind::IntermediateSection => {
                if !value_kind.is_map() && value_kind != ValueKind::SectionList {
                    return Err(Error::with_location(
                        ErrorCategory::Syntax,
                        "Can not add a value without an existing section.",
                        location.clone(),
                    )
                    .with_name_path(path.clone()));
                }
                if value_has_text_name {
                    if !container.is_empty() {
                        return Err(Error::with_location(
                            ErrorCategory::NameConflict,
                            "Can not mix sections with text names and regular names.",
                            location.clone(),
                        )
                        .with_name_path(path.clone()));
                    }
                    container.transform(ValueKind::SectionWithTexts);
                    container.set_location(location.clone());
                }
            }
            ValueKind::SectionWithNames => {
                if value_has_text_name {
                    if container.is_empty() {
                        container.transform(ValueKind::SectionWithTexts);
                    } else {
                        return Err(Error::with_location(
                            ErrorCategory::NameConflict,
                            "Values and sections with text names can not be mixed \
                             with regular names.",
                            location.clone(),
                        )
                        .with_name_path(path.clone()));
                    }
                }
            }
            ValueKind::SectionWithTexts => {
                if value.name().is_some_and(|name| name.is_regular()) {
                    return Err(Error::with_location(
                        ErrorCategory::NameConflict,
                        "Values and sections with text names can not be mixed \
                         with regular names.",
                        location.clone(),
                    )
                    .with_name_path(path.clone()));
                }
            }
            ValueKind::SectionList => {
                if value_kind != ValueKind::SectionWithNames {
                    return Err(Error::new(
                        ErrorCategory::Internal,
                        "Only sections can be added to a section list.",
                    ));
                }
            }
            _ => {
                return Err(Error::new(
                    ErrorCategory::Internal,
                    "Values can only be added to containers.",
                ));
            }
        }
        Ok(())
    }
}

/// The last name of a path, as an owned value.
fn last_name(path: &NamePath) -> Result<Name, Error> {
    path.last()
        .cloned()
        .ok_or_else(|| Error::new(ErrorCategory::Internal, "An empty name path."))
}

/// Convert all remaining intermediate sections into regular sections.
fn finalize_intermediate_sections(value: &ValuePtr) {
    if value.kind() == ValueKind::IntermediateSection {
        value.transform(ValueKind::SectionWithNames);
    }
    for child in value.children() {
        finalize_intermediate_sections(&child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn build_a_minimal_document() {
        let mut builder = DocumentBuilder::new();
        builder.add_section_map("main").unwrap();
        assert_eq!(format!("{}", builder.last_section_path()), "main");
        builder.add_integer("value", 42).unwrap();
        let document = builder.get_document_and_reset();
        assert_eq!(document.size(), 1);
        assert_eq!(document.value("main.value").unwrap().as_integer(), 42);
    }

    #[test]
    fn intermediate_sections_are_created_and_transformed() {
        let mut builder = DocumentBuilder::new();
        builder.add_section_map("a.b.c").unwrap();
        builder.add_integer("value", 1).unwrap();
        builder.add_section_map("a").unwrap();
        let document = builder.get_document_and_reset();
        assert_eq!(document.value("a").unwrap().kind(), ValueKind::SectionWithNames);
        assert_eq!(document.value("a.b.c.value").unwrap().as_integer(), 1);
    }

    #[test]
    fn no_intermediate_sections_remain_after_finalizing() {
        let mut builder = DocumentBuilder::new();
        builder.add_section_map("a.b.c").unwrap();
        let document = builder.get_document_and_reset();
        for (_, value) in document.to_flat_value_map() {
            assert_ne!(value.kind(), ValueKind::IntermediateSection);
        }
        assert_eq!(document.value("a").unwrap().kind(), ValueKind::SectionWithNames);
    }

    #[test]
    fn duplicate_value_names_conflict() {
        let mut builder = DocumentBuilder::new();
        builder.add_section_map("main").unwrap();
        builder.add_integer("value", 1).unwrap();
        let error = builder.add_integer("value", 2).unwrap_err();
        assert_eq!(error.category(), ErrorCategory::NameConflict);
    }

    #[test]
    fn duplicate_section_names_conflict() {
        let mut builder = DocumentBuilder::new();
        builder.add_section_map("main").unwrap();
        builder.add_integer("value", 1).unwrap();
        let error = builder.add_section_map("main.value").unwrap_err();
        assert_eq!(error.category(), ErrorCategory::NameConflict);
    }

    #[test]
    fn section_lists_grow_with_each_definition() {
        let mut builder = DocumentBuilder::new();
        builder.add_section_list("servers").unwrap();
        builder.add_integer("id", 1).unwrap();
        builder.add_section_list("servers").unwrap();
        builder.add_integer("id", 2).unwrap();
        let document = builder.get_document_and_reset();
        let list = document.value("servers").unwrap();
        assert_eq!(list.kind(), ValueKind::SectionList);
        assert_eq!(list.size(), 2);
        assert_eq!(document.value("servers[0].id").unwrap().as_integer(), 1);
        assert_eq!(document.value("servers[1].id").unwrap().as_integer(), 2);
    }

    #[test]
    fn value_without_a_section_is_rejected() {
        let mut builder = DocumentBuilder::new();
        let error = builder.add_integer("value", 1).unwrap_err();
        assert_eq!(error.category(), ErrorCategory::Syntax);
    }

    #[test]
    fn value_into_missing_section_is_rejected() {
        let mut builder = DocumentBuilder::new();
        builder.add_section_map("main").unwrap();
        let error = builder.add_integer("other.value", 1).unwrap_err();
        assert_eq!(error.category(), ErrorCategory::Syntax);
    }

    #[test]
    fn text_names_promote_an_empty_section() {
        let mut builder = DocumentBuilder::new();
        builder.add_section_map("translations").unwrap();
        builder
            .add_value_at(
                &NamePath::from_name(Name::text("hello world")),
                Value::create_text("hallo welt"),
                Location::undefined(),
            )
            .unwrap();
        let document = builder.get_document_and_reset();
        let section = document.value("translations").unwrap();
        assert_eq!(section.kind(), ValueKind::SectionWithTexts);
        assert_eq!(
            document
                .value(r#"translations."hello world""#)
                .unwrap()
                .as_text(),
            "hallo welt"
        );
    }

    #[test]
    fn mixing_text_and_regular_names_conflicts() {
        let mut builder = DocumentBuilder::new();
        builder.add_section_map("main").unwrap();
        builder.add_integer("value", 1).unwrap();
        let error = builder
            .add_value_at(
                &NamePath::from_name(Name::text("key")),
                Value::create_integer(2),
                Location::undefined(),
            )
            .unwrap_err();
        assert_eq!(error.category(), ErrorCategory::NameConflict);
    }

    #[test]
    fn text_named_sections_cannot_have_subsections() {
        let mut builder = DocumentBuilder::new();
        builder.add_section_map("main").unwrap();
        let mut path = NamePath::from_text("main").unwrap();
        path.append(Name::text("key"));
        builder.add_section_map_at(&path, Location::undefined()).unwrap();
        let mut sub_path = path.clone();
        sub_path.append(Name::regular("sub").unwrap());
        let error = builder
            .add_section_map_at(&sub_path, Location::undefined())
            .unwrap_err();
        assert_eq!(error.category(), ErrorCategory::Syntax);
    }

    #[test]
    fn section_list_conflicts_with_section_map() {
        let mut builder = DocumentBuilder::new();
        builder.add_section_map("main").unwrap();
        let error = builder.add_section_list("main").unwrap_err();
        assert_eq!(error.category(), ErrorCategory::NameConflict);
    }
}
