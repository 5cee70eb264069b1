//! Integration tests combining several primitive types.

use std::str::FromStr;

use elcl_types::{
    Date, DateTime, IntoNamePath, Location, Name, NamePath, Position, SourceIdentifier, Time,
    TimeDelta, TimeOffset, TimeUnit,
};
use rstest::rstest;
use testresult::TestResult;

#[test]
fn date_time_from_parts_matches_parsed() -> TestResult {
    let date = Date::from_str("2024-06-01")?;
    let time = Time::from_str("12:30:00z")?;
    let combined = DateTime::new(date, time);
    let parsed = DateTime::from_str("2024-06-01 12:30:00z")?;
    assert_eq!(combined, parsed);
    assert_eq!(format!("{parsed}"), "2024-06-01 12:30:00z");
    Ok(())
}

#[rstest]
#[case("main.value")]
#[case("servers.workers[0].id")]
#[case(r#"translations."hello world".text"#)]
fn name_path_text_round_trip(#[case] text: &str) -> TestResult {
    let path = NamePath::from_text(text)?;
    let rendered = format!("{path}");
    assert_eq!(NamePath::from_text(&rendered)?, path);
    Ok(())
}

#[test]
fn into_name_path_conversions() -> TestResult {
    assert_eq!("main.value".into_name_path()?.len(), 2);
    assert_eq!(
        Name::regular("main")?.into_name_path()?,
        NamePath::from_text("main")?
    );
    assert_eq!(3usize.into_name_path()?.first(), Some(&Name::index(3)));
    Ok(())
}

#[test]
fn locations_render_with_source_and_position() {
    let source = SourceIdentifier::for_file("/etc/config/main.elcl");
    let location = Location::new(source, Position::new(12, 3));
    assert_eq!(format!("{location}"), "file:/etc/config/main.elcl:12:3");
}

#[test]
fn time_delta_ordering_across_units() {
    let one_hour = TimeDelta::from_count(TimeUnit::Hours, 1);
    let many_minutes = TimeDelta::from_count(TimeUnit::Minutes, 61);
    assert!(one_hour < many_minutes);
    let offset = TimeOffset::from_seconds(3600).unwrap();
    assert_eq!(offset.hours(), 1);
}
