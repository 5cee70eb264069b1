//! The value tree of a parsed document.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use elcl_types::{
    Bytes, Date, DateTime, IntoNamePath, Location, Name, NamePath, Regex, Time, TimeDelta,
};

use crate::error::{Error, ErrorCategory};

/// A shared reference to a value node.
pub type ValuePtr = Rc<Value>;

/// The type of a value node.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display)]
#[non_exhaustive]
pub enum ValueKind {
    /// No value; only used for default constructed values.
    Undefined,
    /// A signed 64-bit integer.
    Integer,
    /// A boolean.
    Boolean,
    /// An IEEE-754 double precision float.
    Float,
    /// A text.
    Text,
    /// A calendar date.
    Date,
    /// A time of day.
    Time,
    /// A combined date and time.
    DateTime,
    /// Byte data.
    Bytes,
    /// A time-delta.
    TimeDelta,
    /// A regular expression.
    Regex,
    /// A list of values.
    ValueList,
    /// A list of unnamed sections.
    SectionList,
    /// A section created implicitly as part of a longer name path.
    IntermediateSection,
    /// A section with regular names.
    SectionWithNames,
    /// A section with text names.
    SectionWithTexts,
    /// The document root.
    Document,
}

impl ValueKind {
    /// Test if this is one of the map-like section types.
    #[must_use]
    pub fn is_map(&self) -> bool {
        matches!(
            self,
            Self::IntermediateSection
                | Self::SectionWithNames
                | Self::SectionWithTexts
                | Self::Document
        )
    }

    /// Test if values of this type hold children.
    #[must_use]
    pub fn is_container(&self) -> bool {
        self.is_map() || matches!(self, Self::ValueList | Self::SectionList)
    }
}

/// The ordered, name-addressable children of a container value.
#[derive(Debug, Default)]
pub(crate) struct Children {
    ordered: Vec<ValuePtr>,
    by_name: HashMap<Name, ValuePtr>,
}

impl Children {
    fn insert(&mut self, name: Name, child: ValuePtr) {
        self.by_name.insert(name, child.clone());
        self.ordered.push(child);
    }
}

/// The typed payload of a value node.
#[derive(Debug)]
pub(crate) enum Storage {
    Undefined,
    Integer(i64),
    Boolean(bool),
    Float(f64),
    Text(String),
    Date(Date),
    Time(Time),
    DateTime(DateTime),
    Bytes(Bytes),
    TimeDelta(TimeDelta),
    Regex(Regex),
    ValueList(Children),
    SectionList(Children),
    IntermediateSection(Children),
    SectionWithNames(Children),
    SectionWithTexts(Children),
    Document(Children),
}

impl Storage {
    fn kind(&self) -> ValueKind {
        match self {
            Self::Undefined => ValueKind::Undefined,
            Self::Integer(_) => ValueKind::Integer,
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Float(_) => ValueKind::Float,
            Self::Text(_) => ValueKind::Text,
            Self::Date(_) => ValueKind::Date,
            Self::Time(_) => ValueKind::Time,
            Self::DateTime(_) => ValueKind::DateTime,
            Self::Bytes(_) => ValueKind::Bytes,
            Self::TimeDelta(_) => ValueKind::TimeDelta,
            Self::Regex(_) => ValueKind::Regex,
            Self::ValueList(_) => ValueKind::ValueList,
            Self::SectionList(_) => ValueKind::SectionList,
            Self::IntermediateSection(_) => ValueKind::IntermediateSection,
            Self::SectionWithNames(_) => ValueKind::SectionWithNames,
            Self::SectionWithTexts(_) => ValueKind::SectionWithTexts,
            Self::Document(_) => ValueKind::Document,
        }
    }

    fn children(&self) -> Option<&Children> {
        match self {
            Self::ValueList(children)
            | Self::SectionList(children)
            | Self::IntermediateSection(children)
            | Self::SectionWithNames(children)
            | Self::SectionWithTexts(children)
            | Self::Document(children) => Some(children),
            _ => None,
        }
    }

    fn children_mut(&mut self) -> Option<&mut Children> {
        match self {
            Self::ValueList(children)
            | Self::SectionList(children)
            | Self::IntermediateSection(children)
            | Self::SectionWithNames(children)
            | Self::SectionWithTexts(children)
            | Self::Document(children) => Some(children),
            _ => None,
        }
    }
}

/// A node of the value tree.
///
/// Nodes are created by the parser and are read-only afterwards: the
/// typed accessors come in a best-effort form (`as_*`, returning a
/// default on a type mismatch) and a strict form (`try_*`, returning a
/// [`ErrorCategory::TypeMismatch`] error).
///
/// Containers own their children; every child holds a weak reference to
/// its parent.
#[derive(Debug)]
pub struct Value {
    name: RefCell<Option<Name>>,
    location: RefCell<Option<Location>>,
    parent: RefCell<Weak<Value>>,
    storage: RefCell<Storage>,
}

impl Value {
    fn new(storage: Storage) -> ValuePtr {
        Rc::new(Self {
            name: RefCell::new(None),
            location: RefCell::new(None),
            parent: RefCell::new(Weak::new()),
            storage: RefCell::new(storage),
        })
    }

    /// Create an undefined value, usable as a lookup default.
    #[must_use]
    pub fn undefined() -> ValuePtr {
        Self::new(Storage::Undefined)
    }

    /// Create an integer value.
    pub(crate) fn create_integer(value: i64) -> ValuePtr {
        Self::new(Storage::Integer(value))
    }

    /// Create a boolean value.
    pub(crate) fn create_boolean(value: bool) -> ValuePtr {
        Self::new(Storage::Boolean(value))
    }

    /// Create a float value.
    pub(crate) fn create_float(value: f64) -> ValuePtr {
        Self::new(Storage::Float(value))
    }

    /// Create a text value.
    pub(crate) fn create_text(value: impl Into<String>) -> ValuePtr {
        Self::new(Storage::Text(value.into()))
    }

    /// Create a date value.
    pub(crate) fn create_date(value: Date) -> ValuePtr {
        Self::new(Storage::Date(value))
    }

    /// Create a time value.
    pub(crate) fn create_time(value: Time) -> ValuePtr {
        Self::new(Storage::Time(value))
    }

    /// Create a date-time value.
    pub(crate) fn create_date_time(value: DateTime) -> ValuePtr {
        Self::new(Storage::DateTime(value))
    }

    /// Create a byte-data value.
    pub(crate) fn create_bytes(value: Bytes) -> ValuePtr {
        Self::new(Storage::Bytes(value))
    }

    /// Create a time-delta value.
    pub(crate) fn create_time_delta(value: TimeDelta) -> ValuePtr {
        Self::new(Storage::TimeDelta(value))
    }

    /// Create a regular expression value.
    pub(crate) fn create_regex(value: Regex) -> ValuePtr {
        Self::new(Storage::Regex(value))
    }

    /// Create a value list from the given values.
    ///
    /// The children are named by their position.
    pub(crate) fn create_value_list(values: Vec<ValuePtr>) -> ValuePtr {
        let list = Self::new(Storage::ValueList(Children::default()));
        for (index, value) in values.into_iter().enumerate() {
            value.set_name(Name::index(index));
            Self::attach_child(&list, value);
        }
        list
    }

    /// Create an empty section list.
    pub(crate) fn create_section_list() -> ValuePtr {
        Self::new(Storage::SectionList(Children::default()))
    }

    /// Create an empty intermediate section.
    pub(crate) fn create_intermediate_section() -> ValuePtr {
        Self::new(Storage::IntermediateSection(Children::default()))
    }

    /// Create an empty section with regular names.
    pub(crate) fn create_section_with_names() -> ValuePtr {
        Self::new(Storage::SectionWithNames(Children::default()))
    }

    /// Create an empty document root.
    pub(crate) fn create_document() -> ValuePtr {
        Self::new(Storage::Document(Children::default()))
    }

    /// The type of this value.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        self.storage.borrow().kind()
    }

    /// The name of this value in its parent container.
    ///
    /// The document root and detached values have no name.
    #[must_use]
    pub fn name(&self) -> Option<Name> {
        self.name.borrow().clone()
    }

    pub(crate) fn set_name(&self, name: Name) {
        *self.name.borrow_mut() = Some(name);
    }

    /// The location of this value in the document, if one is known.
    #[must_use]
    pub fn location(&self) -> Option<Location> {
        self.location.borrow().clone()
    }

    pub(crate) fn set_location(&self, location: Location) {
        *self.location.borrow_mut() = Some(location);
    }

    /// The parent of this value.
    #[must_use]
    pub fn parent(&self) -> Option<ValuePtr> {
        self.parent.borrow().upgrade()
    }

    /// Test if this value is attached to a parent.
    #[must_use]
    pub fn has_parent(&self) -> bool {
        self.parent().is_some()
    }

    /// The absolute name path of this value.
    #[must_use]
    pub fn name_path(&self) -> NamePath {
        let mut names = Vec::new();
        if let Some(name) = self.name() {
            names.push(name);
        }
        let mut current = self.parent();
        while let Some(value) = current {
            if let Some(name) = value.name() {
                names.push(name);
            }
            current = value.parent();
        }
        names.reverse();
        names.into_iter().collect()
    }

    /// The number of children of this value; zero for scalars.
    #[must_use]
    pub fn size(&self) -> usize {
        self.storage
            .borrow()
            .children()
            .map_or(0, |children| children.ordered.len())
    }

    /// Test if this value has no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// The children of this value, in insertion order.
    #[must_use]
    pub fn children(&self) -> Vec<ValuePtr> {
        self.storage
            .borrow()
            .children()
            .map_or_else(Vec::new, |children| children.ordered.clone())
    }

    /// The first child of this value.
    #[must_use]
    pub fn first_value(&self) -> Option<ValuePtr> {
        self.storage
            .borrow()
            .children()
            .and_then(|children| children.ordered.first().cloned())
    }

    /// The last child of this value.
    #[must_use]
    pub fn last_value(&self) -> Option<ValuePtr> {
        self.storage
            .borrow()
            .children()
            .and_then(|children| children.ordered.last().cloned())
    }

    /// Resolve a direct child by name.
    ///
    /// An index name resolves positional children; a text-index name only
    /// resolves inside a section with text names.
    #[must_use]
    pub fn child(&self, name: &Name) -> Option<ValuePtr> {
        let storage = self.storage.borrow();
        let children = storage.children()?;
        match name {
            Name::Index(index) => children.ordered.get(*index).cloned(),
            Name::TextIndex(index) => {
                if storage.kind() == ValueKind::SectionWithTexts {
                    children.ordered.get(*index).cloned()
                } else {
                    None
                }
            }
            _ => children.by_name.get(name).cloned(),
        }
    }

    /// Test if a value exists at the given name path.
    #[must_use = "use `value()` to retrieve the value"]
    pub fn has_value(&self, path: impl IntoNamePath) -> bool {
        self.value(path).is_some()
    }

    /// Resolve the value at the given name path.
    #[must_use]
    pub fn value(&self, path: impl IntoNamePath) -> Option<ValuePtr> {
        let path = path.into_name_path().ok()?;
        let mut names = path.iter();
        let first = names.next()?;
        let mut current = self.child(first)?;
        for name in names {
            let next = current.child(name)?;
            current = next;
        }
        Some(current)
    }

    /// Resolve the value at the given name path, or fail with a
    /// [`ErrorCategory::ValueNotFound`] error.
    pub fn try_value(&self, path: impl IntoNamePath) -> Result<ValuePtr, Error> {
        let path = path.into_name_path()?;
        self.value(&path).ok_or_else(|| {
            Error::new(ErrorCategory::ValueNotFound, "The requested value does not exist.")
                .with_name_path(path)
        })
    }

    /// The integer value, or zero if this is no integer.
    #[must_use]
    pub fn as_integer(&self) -> i64 {
        match &*self.storage.borrow() {
            Storage::Integer(value) => *value,
            _ => 0,
        }
    }

    /// The integer value, or a type mismatch error.
    pub fn try_integer(&self) -> Result<i64, Error> {
        match &*self.storage.borrow() {
            Storage::Integer(value) => Ok(*value),
            _ => Err(self.type_mismatch("integer")),
        }
    }

    /// The boolean value, or `false` if this is no boolean.
    #[must_use]
    pub fn as_boolean(&self) -> bool {
        match &*self.storage.borrow() {
            Storage::Boolean(value) => *value,
            _ => false,
        }
    }

    /// The boolean value, or a type mismatch error.
    pub fn try_boolean(&self) -> Result<bool, Error> {
        match &*self.storage.borrow() {
            Storage::Boolean(value) => Ok(*value),
            _ => Err(self.type_mismatch("boolean")),
        }
    }

    /// The float value, or zero if this is no float.
    #[must_use]
    pub fn as_float(&self) -> f64 {
        match &*self.storage.borrow() {
            Storage::Float(value) => *value,
            _ => 0.0,
        }
    }

    /// The float value, or a type mismatch error.
    pub fn try_float(&self) -> Result<f64, Error> {
        match &*self.storage.borrow() {
            Storage::Float(value) => Ok(*value),
            _ => Err(self.type_mismatch("float")),
        }
    }

    /// The text value, or an empty string if this is no text.
    #[must_use]
    pub fn as_text(&self) -> String {
        match &*self.storage.borrow() {
            Storage::Text(value) => value.clone(),
            _ => String::new(),
        }
    }

    /// The text value, or a type mismatch error.
    pub fn try_text(&self) -> Result<String, Error> {
        match &*self.storage.borrow() {
            Storage::Text(value) => Ok(value.clone()),
            _ => Err(self.type_mismatch("text")),
        }
    }

    /// The date value, or an undefined date if this is no date.
    #[must_use]
    pub fn as_date(&self) -> Date {
        match &*self.storage.borrow() {
            Storage::Date(value) => *value,
            _ => Date::undefined(),
        }
    }

    /// The date value, or a type mismatch error.
    pub fn try_date(&self) -> Result<Date, Error> {
        match &*self.storage.borrow() {
            Storage::Date(value) => Ok(*value),
            _ => Err(self.type_mismatch("date")),
        }
    }

    /// The time value, or an undefined time if this is no time.
    #[must_use]
    pub fn as_time(&self) -> Time {
        match &*self.storage.borrow() {
            Storage::Time(value) => *value,
            _ => Time::undefined(),
        }
    }

    /// The time value, or a type mismatch error.
    pub fn try_time(&self) -> Result<Time, Error> {
        match &*self.storage.borrow() {
            Storage::Time(value) => Ok(*value),
            _ => Err(self.type_mismatch("time")),
        }
    }

    /// The date-time value, or an undefined one if this is no date-time.
    #[must_use]
    pub fn as_date_time(&self) -> DateTime {
        match &*self.storage.borrow() {
            Storage::DateTime(value) => *value,
            _ => DateTime::undefined(),
        }
    }

    /// The date-time value, or a type mismatch error.
    pub fn try_date_time(&self) -> Result<DateTime, Error> {
        match &*self.storage.borrow() {
            Storage::DateTime(value) => Ok(*value),
            _ => Err(self.type_mismatch("date-time")),
        }
    }

    /// The byte data, or empty bytes if this is no byte-data value.
    #[must_use]
    pub fn as_bytes(&self) -> Bytes {
        match &*self.storage.borrow() {
            Storage::Bytes(value) => value.clone(),
            _ => Bytes::new(),
        }
    }

    /// The byte data, or a type mismatch error.
    pub fn try_bytes(&self) -> Result<Bytes, Error> {
        match &*self.storage.borrow() {
            Storage::Bytes(value) => Ok(value.clone()),
            _ => Err(self.type_mismatch("byte-data")),
        }
    }

    /// The time-delta, or an empty one if this is no time-delta.
    #[must_use]
    pub fn as_time_delta(&self) -> TimeDelta {
        match &*self.storage.borrow() {
            Storage::TimeDelta(value) => value.clone(),
            _ => TimeDelta::new(),
        }
    }

    /// The time-delta, or a type mismatch error.
    pub fn try_time_delta(&self) -> Result<TimeDelta, Error> {
        match &*self.storage.borrow() {
            Storage::TimeDelta(value) => Ok(value.clone()),
            _ => Err(self.type_mismatch("time-delta")),
        }
    }

    /// The regular expression, or an empty one if this is none.
    #[must_use]
    pub fn as_regex(&self) -> Regex {
        match &*self.storage.borrow() {
            Storage::Regex(value) => value.clone(),
            _ => Regex::default(),
        }
    }

    /// The regular expression, or a type mismatch error.
    pub fn try_regex(&self) -> Result<Regex, Error> {
        match &*self.storage.borrow() {
            Storage::Regex(value) => Ok(value.clone()),
            _ => Err(self.type_mismatch("regular expression")),
        }
    }

    /// The children of a value list, or an empty list for other types.
    #[must_use]
    pub fn as_value_list(&self) -> Vec<ValuePtr> {
        match self.kind() {
            ValueKind::ValueList => self.children(),
            _ => Vec::new(),
        }
    }

    /// Broaden this value into a list.
    ///
    /// A value list yields its children; any other value yields itself as
    /// a one-element list.
    #[must_use]
    pub fn to_value_list(self: &ValuePtr) -> Vec<ValuePtr> {
        match self.kind() {
            ValueKind::ValueList => self.children(),
            _ => vec![self.clone()],
        }
    }

    /// Broaden this value into a matrix.
    ///
    /// The rows are the elements of the outer list and the columns the
    /// elements of the nested lists. A single scalar becomes a 1×1
    /// matrix and a flat list an N×1 matrix. Rows shorter than the
    /// longest one leave the remaining cells unset.
    #[must_use]
    pub fn to_value_matrix(self: &ValuePtr) -> ValueMatrix {
        let rows: Vec<Vec<ValuePtr>> = self
            .to_value_list()
            .iter()
            .map(Value::to_value_list)
            .collect();
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        let cells = rows
            .into_iter()
            .map(|row| {
                let mut cells: Vec<Option<ValuePtr>> = row.into_iter().map(Some).collect();
                cells.resize(columns, None);
                cells
            })
            .collect();
        ValueMatrix { columns, cells }
    }

    /// A canonical textual form of a scalar value.
    ///
    /// Containers return an empty string.
    #[must_use]
    pub fn to_text_representation(&self) -> String {
        match &*self.storage.borrow() {
            Storage::Integer(value) => value.to_string(),
            Storage::Boolean(value) => value.to_string(),
            Storage::Float(value) => format!("{value}"),
            Storage::Text(value) => value.clone(),
            Storage::Date(value) => value.to_string(),
            Storage::Time(value) => value.to_string(),
            Storage::DateTime(value) => value.to_string(),
            Storage::Bytes(value) => value.to_hex(),
            Storage::TimeDelta(value) => value.to_string(),
            Storage::Regex(value) => value.pattern().to_string(),
            _ => String::new(),
        }
    }

    /// Attach a child to a container value.
    ///
    /// The child must already have its name set; the caller is
    /// responsible for name-conflict checks.
    pub(crate) fn attach_child(parent: &ValuePtr, child: ValuePtr) {
        let name = child
            .name()
            .expect("a child needs a name before it is attached");
        *child.parent.borrow_mut() = Rc::downgrade(parent);
        if let Some(children) = parent.storage.borrow_mut().children_mut() {
            children.insert(name, child);
        }
    }

    /// Append a fresh element to a section list, naming it by position.
    pub(crate) fn append_to_section_list(parent: &ValuePtr, child: ValuePtr) {
        child.set_name(Name::index(parent.size()));
        Self::attach_child(parent, child);
    }

    /// Transform an intermediate section into a concrete section type.
    pub(crate) fn transform(&self, kind: ValueKind) {
        let mut storage = self.storage.borrow_mut();
        let children = match &mut *storage {
            Storage::IntermediateSection(children) | Storage::SectionWithNames(children) => {
                std::mem::take(children)
            }
            _ => panic!("only sections can be transformed"),
        };
        *storage = match kind {
            ValueKind::SectionWithNames => Storage::SectionWithNames(children),
            ValueKind::SectionWithTexts => Storage::SectionWithTexts(children),
            _ => panic!("a section cannot be transformed into {kind}"),
        };
    }

    fn type_mismatch(&self, expected: &str) -> Error {
        Error::new(
            ErrorCategory::TypeMismatch,
            format!("Expected a {expected} value, but found {}.", self.kind()),
        )
        .with_name_path(self.name_path())
    }
}

/// A two-dimensional view of nested value lists.
///
/// Created by [`Value::to_value_matrix`]. Cells of short rows are unset.
#[derive(Debug)]
pub struct ValueMatrix {
    columns: usize,
    cells: Vec<Vec<Option<ValuePtr>>>,
}

impl ValueMatrix {
    /// The number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.cells.len()
    }

    /// The number of columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns
    }

    /// The value of a cell, or `None` if the cell is unset.
    #[must_use]
    pub fn value(&self, row: usize, column: usize) -> Option<ValuePtr> {
        self.cells.get(row)?.get(column)?.clone()
    }

    /// The value of a cell, or the given default if the cell is unset.
    #[must_use]
    pub fn value_or(&self, row: usize, column: usize, default: ValuePtr) -> ValuePtr {
        self.value(row, column).unwrap_or(default)
    }
}
