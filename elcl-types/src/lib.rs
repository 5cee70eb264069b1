#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

mod bytes;
pub use bytes::Bytes;

mod date;
pub use date::Date;
pub use date::days_in_month;
pub use date::is_leap_year;

mod date_time;
pub use date_time::DateTime;

mod error;
pub use error::Error;

pub mod escape;
pub use escape::EscapeMode;

mod name;
pub use name::MAX_NAME_LENGTH;
pub use name::Name;

mod name_path;
pub use name_path::IntoNamePath;
pub use name_path::MAX_NAME_PATH_LENGTH;
pub use name_path::NamePath;

mod position;
pub use position::Location;
pub use position::Position;
pub use position::SourceIdentifier;

mod regex;
pub use regex::Regex;

mod time;
pub use time::NANOSECONDS_PER_DAY;
pub use time::Time;
pub use time::TimeOffset;
pub use time::TimeOffsetPrecision;

mod time_delta;
pub use time_delta::TimeDelta;
pub use time_delta::TimeUnit;
