//! Tests for the typed value access API on parsed documents.

use elcl_parser::{ErrorCategory, Parser, ValueKind};
use elcl_types::{Name, NamePath};
use pretty_assertions::assert_eq;
use testresult::TestResult;

fn parse(text: &str) -> elcl_parser::Document {
    Parser::new().parse_text(text).unwrap()
}

#[test]
fn best_effort_accessors_return_defaults() -> TestResult {
    let document = parse("[main]\nvalue: 42\n");
    let value = document.try_value("main.value")?;
    assert_eq!(value.as_integer(), 42);
    assert_eq!(value.as_text(), "");
    assert_eq!(value.as_float(), 0.0);
    assert!(!value.as_boolean());
    assert!(value.as_date().is_undefined());
    assert!(value.as_time().is_undefined());
    assert!(value.as_date_time().is_undefined());
    assert!(value.as_bytes().is_empty());
    assert!(value.as_time_delta().is_empty());
    assert_eq!(value.as_regex().pattern(), "");
    assert!(value.as_value_list().is_empty());
    Ok(())
}

#[test]
fn strict_accessors_fail_with_type_mismatch() -> TestResult {
    let document = parse("[main]\nvalue: 42\n");
    let value = document.try_value("main.value")?;
    assert_eq!(value.try_integer()?, 42);
    let error = value.try_text().unwrap_err();
    assert_eq!(error.category(), ErrorCategory::TypeMismatch);
    assert_eq!(
        error.name_path(),
        Some(&NamePath::from_text("main.value")?)
    );
    Ok(())
}

#[test]
fn missing_values_fail_with_value_not_found() {
    let document = parse("[main]\nvalue: 42\n");
    assert!(!document.has_value("main.other"));
    let error = document.try_value("main.other").unwrap_err();
    assert_eq!(error.category(), ErrorCategory::ValueNotFound);
}

#[test]
fn lookup_accepts_paths_names_and_indexes() -> TestResult {
    let document = parse("[main]\nlist: 1, 2, 3\n");
    let main = document.try_value(Name::regular("main")?)?;
    assert_eq!(main.kind(), ValueKind::SectionWithNames);
    let list = main.try_value("list")?;
    assert_eq!(list.try_value(1usize)?.as_integer(), 2);
    assert_eq!(
        document.try_value(NamePath::from_text("main.list[2]")?)?.as_integer(),
        3
    );
    Ok(())
}

#[test]
fn to_value_list_broadens_single_values() -> TestResult {
    let document = parse("[main]\nsingle: 1\nlist: 1, 2\n");
    assert_eq!(document.try_value("main.single")?.to_value_list().len(), 1);
    assert_eq!(document.try_value("main.list")?.to_value_list().len(), 2);
    Ok(())
}

#[test]
fn value_locations_point_into_the_document() -> TestResult {
    let document = parse("[main]\nvalue: 42\n");
    let value = document.try_value("main.value")?;
    let location = value.location().expect("parsed values have locations");
    assert_eq!(location.position().line(), 2);
    assert_eq!(location.position().column(), 1);
    Ok(())
}

#[test]
fn name_paths_render_canonically() -> TestResult {
    let document = parse(
        "[servers]\n*[servers.workers]\nid: 1\n\
         [translations]\n\"a b\": \"x\"\n",
    );
    let id = document.try_value("servers.workers[0].id")?;
    assert_eq!(format!("{}", id.name_path()), "servers.workers[0].id");
    let translated = document.try_value(r#"translations."a b""#)?;
    assert_eq!(format!("{}", translated.name_path()), "translations.\"a b\"");
    Ok(())
}

#[test]
fn containers_have_no_text_representation() -> TestResult {
    let document = parse("[main]\nlist: 1, 2\nvalue: 5m\n");
    assert_eq!(document.try_value("main")?.to_text_representation(), "");
    assert_eq!(document.try_value("main.list")?.to_text_representation(), "");
    assert_eq!(document.try_value("main.value")?.to_text_representation(), "5m");
    Ok(())
}

#[test]
fn flat_map_covers_every_descendant() -> TestResult {
    let document = parse("[a]\nx: 1\n[a.b]\ny: 2\nlist: 1, 2\n");
    let paths: Vec<String> = document
        .to_flat_value_map()
        .iter()
        .map(|(path, _)| format!("{path}"))
        .collect();
    assert_eq!(
        paths,
        vec![
            "a",
            "a.x",
            "a.b",
            "a.b.y",
            "a.b.list",
            "a.b.list[0]",
            "a.b.list[1]",
        ]
    );
    Ok(())
}
