use crate::error::{ErrorCode, RollgraphError};
use crate::ingest::RawRecord;
use crate::model::Event;
use crate::timestamp::{normalize, ParseError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidEvent {
    #[error("record could not be decoded: {0}")]
    Undecodable(String),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("empty identifier in field: {0}")]
    EmptyIdentifier(&'static str),
    #[error("self-loop on vertex {0}")]
    SelfLoop(String),
    #[error("invalid timestamp: {0}")]
    Timestamp(#[from] ParseError),
}

impl InvalidEvent {
    /// Short stable label used for per-reason counters.
    pub fn reason(&self) -> &'static str {
        match self {
            InvalidEvent::Undecodable(_) => "undecodable",
            InvalidEvent::MissingField(_) => "missing_field",
            InvalidEvent::EmptyIdentifier(_) => "empty_identifier",
            InvalidEvent::SelfLoop(_) => "self_loop",
            InvalidEvent::Timestamp(_) => "timestamp",
        }
    }
}

impl RollgraphError for InvalidEvent {
    fn error_code(&self) -> ErrorCode {
        ErrorCode::InvalidArgument
    }
}

/// Turns a decoded record into an [`Event`], or explains why it is rejected.
pub fn validate(record: &RawRecord, timestamp_format: &str) -> Result<Event, InvalidEvent> {
    let source = record
        .source
        .as_deref()
        .ok_or(InvalidEvent::MissingField("actor"))?;
    let target = record
        .target
        .as_deref()
        .ok_or(InvalidEvent::MissingField("target"))?;
    let created_time = record
        .created_time
        .as_deref()
        .ok_or(InvalidEvent::MissingField("created_time"))?;

    if source.is_empty() {
        return Err(InvalidEvent::EmptyIdentifier("actor"));
    }
    if target.is_empty() {
        return Err(InvalidEvent::EmptyIdentifier("target"));
    }
    if source == target {
        return Err(InvalidEvent::SelfLoop(source.to_string()));
    }

    let timestamp = normalize(created_time, timestamp_format)?;
    Ok(Event::new(source, target, timestamp))
}
