//! End-to-end tests for `@include` handling.

use std::fs;
use std::path::Path;

use elcl_parser::{AccessFeature, ErrorCategory, FileAccessCheck, Parser, ParserSettings};
use pretty_assertions::assert_eq;
use testresult::TestResult;

fn write(directory: &Path, name: &str, content: &str) {
    let path = directory.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn include_merges_into_one_document() -> TestResult {
    let directory = tempfile::tempdir()?;
    write(
        directory.path(),
        "main.elcl",
        "[main]\nvalue: 1\n@include: \"other.elcl\"\n",
    );
    write(directory.path(), "other.elcl", "[other]\nvalue: 2\n");
    let document = Parser::new().parse_file(directory.path().join("main.elcl"))?;
    assert_eq!(document.try_value("main.value")?.as_integer(), 1);
    assert_eq!(document.try_value("other.value")?.as_integer(), 2);
    Ok(())
}

#[test]
fn include_with_wildcard_parses_in_sorted_order() -> TestResult {
    let directory = tempfile::tempdir()?;
    write(
        directory.path(),
        "main.elcl",
        "@include: \"parts/*.elcl\"\n",
    );
    write(directory.path(), "parts/b.elcl", "*[entries]\nname: \"b\"\n");
    write(directory.path(), "parts/a.elcl", "*[entries]\nname: \"a\"\n");
    let document = Parser::new().parse_file(directory.path().join("main.elcl"))?;
    let entries = document.try_value("entries")?;
    assert_eq!(entries.size(), 2);
    assert_eq!(document.try_value("entries[0].name")?.as_text(), "a");
    assert_eq!(document.try_value("entries[1].name")?.as_text(), "b");
    Ok(())
}

#[test]
fn include_loop_is_detected() -> TestResult {
    let directory = tempfile::tempdir()?;
    write(directory.path(), "a.elcl", "@include: \"b.elcl\"\n");
    write(directory.path(), "b.elcl", "@include: \"a.elcl\"\n");
    let error = Parser::new()
        .parse_file(directory.path().join("a.elcl"))
        .expect_err("the include loop should fail");
    assert_eq!(error.category(), ErrorCategory::Syntax);
    assert_eq!(
        error.message(),
        "An included document is in the list of parent documents (loop detected)."
    );
    Ok(())
}

#[test]
fn self_include_is_detected() -> TestResult {
    let directory = tempfile::tempdir()?;
    write(directory.path(), "a.elcl", "@include: \"a.elcl\"\n");
    let error = Parser::new()
        .parse_file(directory.path().join("a.elcl"))
        .expect_err("the self include should fail");
    assert_eq!(error.category(), ErrorCategory::Syntax);
    Ok(())
}

#[test]
fn nesting_limit_is_enforced() -> TestResult {
    let directory = tempfile::tempdir()?;
    for level in 0..6 {
        let content = format!("[level_{level}]\n@include: \"doc{}.elcl\"\n", level + 1);
        write(directory.path(), &format!("doc{level}.elcl"), &content);
    }
    write(directory.path(), "doc6.elcl", "[deepest]\n");
    let error = Parser::new()
        .parse_file(directory.path().join("doc0.elcl"))
        .expect_err("the nesting limit should fail");
    assert_eq!(error.category(), ErrorCategory::LimitExceeded);
    Ok(())
}

#[test]
fn nesting_below_the_limit_parses() -> TestResult {
    let directory = tempfile::tempdir()?;
    for level in 0..3 {
        let content = format!("[level_{level}]\n@include: \"doc{}.elcl\"\n", level + 1);
        write(directory.path(), &format!("doc{level}.elcl"), &content);
    }
    write(directory.path(), "doc3.elcl", "[deepest]\nvalue: 1\n");
    let document = Parser::new().parse_file(directory.path().join("doc0.elcl"))?;
    assert_eq!(document.try_value("deepest.value")?.as_integer(), 1);
    Ok(())
}

#[test]
fn includes_outside_the_sandbox_are_denied() -> TestResult {
    let directory = tempfile::tempdir()?;
    write(directory.path(), "outside.elcl", "[outside]\n");
    write(
        directory.path(),
        "tree/main.elcl",
        "@include: \"../outside.elcl\"\n",
    );
    let error = Parser::new()
        .parse_file(directory.path().join("tree/main.elcl"))
        .expect_err("the sandbox should deny the include");
    assert_eq!(error.category(), ErrorCategory::Access);
    Ok(())
}

#[test]
fn suffix_policy_applies_to_includes() -> TestResult {
    let directory = tempfile::tempdir()?;
    write(directory.path(), "main.elcl", "@include: \"other.conf\"\n");
    write(directory.path(), "other.conf", "[other]\n");
    let mut access_check = FileAccessCheck::new();
    access_check.enable(AccessFeature::RequireSuffix);
    let mut settings = ParserSettings::default();
    settings.access_check = Some(Box::new(access_check));
    let error = Parser::with_settings(settings)
        .parse_file(directory.path().join("main.elcl"))
        .expect_err("the suffix policy should deny the include");
    assert_eq!(error.category(), ErrorCategory::Access);
    Ok(())
}

#[test]
fn include_resets_relative_section_paths() -> TestResult {
    let directory = tempfile::tempdir()?;
    write(
        directory.path(),
        "main.elcl",
        "[servers]\n@include: \"other.elcl\"\n[.workers]\nid: 1\n",
    );
    write(directory.path(), "other.elcl", "[other]\n");
    let error = Parser::new()
        .parse_file(directory.path().join("main.elcl"))
        .expect_err("the relative path after the include should fail");
    assert_eq!(error.category(), ErrorCategory::Syntax);
    Ok(())
}

#[test]
fn section_lists_continue_across_includes() -> TestResult {
    let directory = tempfile::tempdir()?;
    write(
        directory.path(),
        "main.elcl",
        "*[entries]\nname: \"first\"\n@include: \"more.elcl\"\n",
    );
    write(directory.path(), "more.elcl", "*[entries]\nname: \"second\"\n");
    let document = Parser::new().parse_file(directory.path().join("main.elcl"))?;
    assert_eq!(document.try_value("entries")?.size(), 2);
    assert_eq!(document.try_value("entries[1].name")?.as_text(), "second");
    Ok(())
}
