use std::fmt;
use std::sync::Arc;

/// Opaque vertex identifier. Cloning shares the underlying string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(Arc<str>);

impl VertexId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VertexId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for VertexId {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Seconds on a single monotonic scale (Unix epoch, UTC).
pub type Timestamp = i64;

/// A validated relationship event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub source: VertexId,
    pub target: VertexId,
    pub timestamp: Timestamp,
}

impl Event {
    pub fn new(
        source: impl Into<VertexId>,
        target: impl Into<VertexId>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            timestamp,
        }
    }
}

/// An admitted event as held by the edge store. Undirected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeRecord {
    pub a: VertexId,
    pub b: VertexId,
    pub timestamp: Timestamp,
}

impl From<Event> for EdgeRecord {
    fn from(event: Event) -> Self {
        Self {
            a: event.source,
            b: event.target,
            timestamp: event.timestamp,
        }
    }
}
