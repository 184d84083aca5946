use crate::error::{ErrorCode, RollgraphError};
use crate::model::Timestamp;
use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

/// The record format's native timestamp layout, e.g. `2016-04-07T03:34:18Z`.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

const FIXED_LEN: usize = 20;
const SEPARATORS: [(usize, u8); 6] = [
    (4, b'-'),
    (7, b'-'),
    (10, b'T'),
    (13, b':'),
    (16, b':'),
    (19, b'Z'),
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected '{expected}' at byte {position} of {input:?}")]
    Layout {
        input: String,
        position: usize,
        expected: char,
    },
    #[error("field {field} is not numeric in {input:?}")]
    Field { input: String, field: &'static str },
    #[error("calendar-invalid timestamp {input:?}")]
    Calendar { input: String },
    #[error("timestamp {input:?} does not match format {format:?}: {reason}")]
    Format {
        input: String,
        format: String,
        reason: String,
    },
}

impl RollgraphError for ParseError {
    fn error_code(&self) -> ErrorCode {
        ErrorCode::InvalidArgument
    }
}

/// Converts timestamp text into seconds since the Unix epoch.
///
/// Wall-clock fields are read as UTC. The default format takes a fixed-offset
/// extraction path; any other format goes through chrono's strftime parser.
pub fn normalize(input: &str, format: &str) -> Result<Timestamp, ParseError> {
    if format == DEFAULT_TIMESTAMP_FORMAT && input.len() == FIXED_LEN && input.is_ascii() {
        return parse_fixed(input);
    }
    parse_with_format(input, format)
}

fn parse_fixed(input: &str) -> Result<Timestamp, ParseError> {
    let bytes = input.as_bytes();
    for (position, expected) in SEPARATORS {
        if bytes[position] != expected {
            return Err(ParseError::Layout {
                input: input.to_string(),
                position,
                expected: expected as char,
            });
        }
    }

    let year = field(input, 0..4, "year")? as i32;
    let month = field(input, 5..7, "month")?;
    let day = field(input, 8..10, "day")?;
    let hour = field(input, 11..13, "hour")?;
    let minute = field(input, 14..16, "minute")?;
    let second = field(input, 17..19, "second")?;

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .map(|dt| dt.and_utc().timestamp())
        .ok_or_else(|| ParseError::Calendar {
            input: input.to_string(),
        })
}

fn field(
    input: &str,
    range: std::ops::Range<usize>,
    name: &'static str,
) -> Result<u32, ParseError> {
    let raw = &input[range];
    // u32::from_str accepts a leading '+', which is not a digit here.
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::Field {
            input: input.to_string(),
            field: name,
        });
    }
    raw.parse().map_err(|_| ParseError::Field {
        input: input.to_string(),
        field: name,
    })
}

fn parse_with_format(input: &str, format: &str) -> Result<Timestamp, ParseError> {
    match NaiveDateTime::parse_from_str(input, format) {
        Ok(dt) => Ok(dt.and_utc().timestamp()),
        Err(datetime_err) => NaiveDate::parse_from_str(input, format)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc().timestamp())
            .ok_or_else(|| ParseError::Format {
                input: input.to_string(),
                format: format.to_string(),
                reason: datetime_err.to_string(),
            }),
    }
}
