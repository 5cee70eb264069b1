//! End-to-end tests for documents that must fail to parse.

use elcl_parser::{ErrorCategory, Parser};
use rstest::rstest;

fn parse_error(text: &str) -> elcl_parser::Error {
    Parser::new()
        .parse_text(text)
        .expect_err("the document should not parse")
}

#[rstest]
// Structure errors.
#[case("value: 1\n", ErrorCategory::Syntax)]
#[case("[main]\nvalue\n", ErrorCategory::Syntax)]
#[case("[main]\nvalue:\n", ErrorCategory::UnexpectedEnd)]
#[case("[main\nvalue: 1\n", ErrorCategory::Syntax)]
#[case("[.relative]\n", ErrorCategory::Syntax)]
#[case("[main]*\n", ErrorCategory::Syntax)]
#[case("[main]\nvalue: 1 x\n", ErrorCategory::Syntax)]
// Meta value errors.
#[case("[main]\n@version: \"1.0\"\n", ErrorCategory::Syntax)]
#[case("@version: \"1.0\"\n@version: \"1.0\"\n", ErrorCategory::Syntax)]
#[case("@version: \"2.0\"\n", ErrorCategory::Unsupported)]
#[case("@features: \"core\"\n@features: \"core\"\n", ErrorCategory::Syntax)]
#[case("@features: \"unknown-feature\"\n", ErrorCategory::Unsupported)]
#[case("[main]\n@signature: \"x\"\n", ErrorCategory::Syntax)]
#[case("@unknown: \"x\"\n", ErrorCategory::Syntax)]
#[case("@version: 1\n", ErrorCategory::Syntax)]
// Name conflicts.
#[case("[main]\nvalue: 1\nvalue: 2\n", ErrorCategory::NameConflict)]
#[case("[main]\n[main]\n", ErrorCategory::NameConflict)]
#[case("[main]\nvalue: 1\n[main.value]\n", ErrorCategory::NameConflict)]
#[case("[main]\n*[main]\n", ErrorCategory::NameConflict)]
#[case("[main]\nvalue: 1\n\"text\": 2\n", ErrorCategory::NameConflict)]
// Number limits.
#[case("[main]\nvalue: 12345678901234567890\n", ErrorCategory::Syntax)]
#[case("[main]\nvalue: 0x1ffffffffffffffff\n", ErrorCategory::Syntax)]
#[case("[main]\nvalue: 10parsec\n", ErrorCategory::Unsupported)]
// Invalid literals.
#[case("[main]\nvalue: 2023-02-29\n", ErrorCategory::Syntax)]
#[case("[main]\nvalue: 24:00\n", ErrorCategory::Syntax)]
#[case("[main]\nvalue: \"open\n", ErrorCategory::Syntax)]
#[case("[main]\nvalue: <0x>\n", ErrorCategory::Syntax)]
#[case("[main]\nvalue: \"\\u{0}\"\n", ErrorCategory::Syntax)]
fn document_errors(#[case] text: &str, #[case] category: ErrorCategory) {
    let error = parse_error(text);
    assert_eq!(error.category(), category, "{error}");
}

#[test]
fn line_over_the_length_limit_is_an_encoding_error() {
    let text = format!("[main]\n# {}\n", "x".repeat(4000));
    let error = parse_error(&text);
    assert_eq!(error.category(), ErrorCategory::Encoding);
}

#[test]
fn line_at_the_length_limit_parses() {
    // Two characters of comment marker plus 3998 fill the line exactly.
    let text = format!("[main]\n# {}\n", "x".repeat(3998));
    assert!(Parser::new().parse_text(text).is_ok());
}

#[test]
fn name_over_the_length_limit() {
    let text = format!("[main]\n{}: 1\n", "a".repeat(101));
    let error = parse_error(&text);
    assert_eq!(error.category(), ErrorCategory::LimitExceeded);
}

#[test]
fn section_path_over_the_length_limit() {
    let error = parse_error("[a.b.c.d.e.f.g.h.i.j.k]\n");
    assert_eq!(error.category(), ErrorCategory::LimitExceeded);
}

#[test]
fn control_character_is_a_character_error() {
    let error = parse_error("[main]\nvalue: \"a\u{1}b\"\n");
    assert_eq!(error.category(), ErrorCategory::Character);
}

#[test]
fn signature_without_validator_is_rejected() {
    let error = parse_error("@signature: \"untrusted\"\n[main]\n");
    assert_eq!(error.category(), ErrorCategory::Signature);
    assert_eq!(error.message(), "Signature cannot be verified.");
}

#[test]
fn errors_report_source_and_position() {
    let error = parse_error("[main]\nvalue: 1\nvalue: 2\n");
    let location = error.location().expect("the error has a location");
    assert_eq!(location.position().line(), 3);
    assert_eq!(location.source().unwrap().name(), "text");
    assert!(format!("{error}").starts_with("NameConflict:"));
}

#[test]
fn unclosed_multi_line_text_is_an_error() {
    let error = parse_error("[main]\nbody:\n    \"\"\"\n    text\n");
    assert_eq!(error.category(), ErrorCategory::UnexpectedEnd);
}

#[test]
fn mixed_indentation_in_multi_line_text_is_an_error() {
    let error = parse_error("[main]\nbody:\n    \"\"\"\n    a\n  b\n    \"\"\"\n");
    assert_eq!(error.category(), ErrorCategory::Syntax);
}
