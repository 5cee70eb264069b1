//! Compact value rendering for tests and tools.

use elcl_types::{EscapeMode, escape::escape_text};

use crate::value::{ValueKind, ValuePtr};

/// Options for rendering values in the test format.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TestFormat {
    show_container_size: bool,
    show_position: bool,
}

impl TestFormat {
    /// Also render the size of containers, e.g. `SectionWithNames(size=2)`.
    #[must_use]
    pub fn with_container_size(mut self) -> Self {
        self.show_container_size = true;
        self
    }

    /// Also render the position of values, e.g. `Integer(1)[1:8]`.
    #[must_use]
    pub fn with_position(mut self) -> Self {
        self.show_position = true;
        self
    }
}

/// Render a single value in the test format: the type name with the
/// value in parentheses, e.g. `Integer(42)` or `Text("hello")`.
#[must_use]
pub fn value_test_text(value: &ValuePtr, format: TestFormat) -> String {
    let inner = match value.kind() {
        ValueKind::Undefined => String::new(),
        ValueKind::Integer => value.as_integer().to_string(),
        ValueKind::Boolean => value.as_boolean().to_string(),
        ValueKind::Float => format!("{}", value.as_float()),
        ValueKind::Text => quoted(&value.as_text()),
        ValueKind::Date => value.as_date().to_string(),
        ValueKind::Time => value.as_time().to_string(),
        ValueKind::DateTime => value.as_date_time().to_string(),
        ValueKind::Bytes => value.as_bytes().to_hex(),
        ValueKind::TimeDelta => time_delta_test_text(value),
        ValueKind::Regex => quoted(value.as_regex().pattern()),
        _ => {
            if format.show_container_size {
                format!("size={}", value.size())
            } else {
                String::new()
            }
        }
    };
    let mut result = format!("{}({inner})", value.kind());
    if format.show_position {
        if let Some(location) = value.location() {
            result.push_str(&format!("[{}]", location.position()));
        }
    }
    result
}

/// A time-delta renders as `count,unit` for a single unit.
fn time_delta_test_text(value: &ValuePtr) -> String {
    let delta = value.as_time_delta();
    if delta.is_empty() {
        return String::from("<none>");
    }
    if delta.unit_count() > 1 {
        return String::from("<multiple>");
    }
    let (unit, count) = delta.iter().next().expect("a non-empty delta has a unit");
    format!("{count},{}", unit.singular_text())
}

fn quoted(text: &str) -> String {
    format!("\"{}\"", escape_text(text, EscapeMode::Text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use elcl_types::{TimeDelta, TimeUnit};

    #[test]
    fn scalar_test_texts() {
        let format = TestFormat::default();
        assert_eq!(
            value_test_text(&Value::create_integer(42), format),
            "Integer(42)"
        );
        assert_eq!(
            value_test_text(&Value::create_text("a \"b\""), format),
            "Text(\"a \\\"b\\\"\")"
        );
        assert_eq!(
            value_test_text(
                &Value::create_time_delta(TimeDelta::from_count(TimeUnit::Seconds, 10)),
                format
            ),
            "TimeDelta(10,second)"
        );
        assert_eq!(
            value_test_text(&Value::create_time_delta(TimeDelta::new()), format),
            "TimeDelta(<none>)"
        );
    }

    #[test]
    fn container_sizes_are_optional() {
        let list = Value::create_value_list(vec![Value::create_integer(1)]);
        assert_eq!(
            value_test_text(&list, TestFormat::default()),
            "ValueList()"
        );
        assert_eq!(
            value_test_text(&list, TestFormat::default().with_container_size()),
            "ValueList(size=1)"
        );
    }
}
