use crate::index::DegreeGraph;
use rollgraph_core::error::{ErrorCode, RollgraphError};
use rollgraph_core::model::{EdgeRecord, Event, Timestamp};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    #[error("window duration must be positive, got {0}")]
    NonPositiveWindow(i64),
}

impl RollgraphError for WindowError {
    fn error_code(&self) -> ErrorCode {
        ErrorCode::InvalidArgument
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    Stale,
}

/// What one call to [`WindowedEdgeStore::admit_or_reject`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmitReport {
    pub admission: Admission,
    pub window_advanced: bool,
    pub evicted: usize,
}

/// Live edges within a trailing window anchored at the highest admitted
/// timestamp, together with the degree graph they induce.
///
/// Edges are indexed by `(timestamp, insertion sequence)`, so eviction only
/// ever touches the front of the index. Every live edge has
/// `timestamp > window_floor()` once an admission call returns.
#[derive(Debug, Clone)]
pub struct WindowedEdgeStore {
    window_secs: i64,
    high_water_mark: Option<Timestamp>,
    live: BTreeMap<(Timestamp, u64), EdgeRecord>,
    next_seq: u64,
    graph: DegreeGraph,
}

impl WindowedEdgeStore {
    pub fn new(window_secs: i64) -> Result<Self, WindowError> {
        // With an exclusive floor, a zero window would make every event stale.
        if window_secs <= 0 {
            return Err(WindowError::NonPositiveWindow(window_secs));
        }
        Ok(Self {
            window_secs,
            high_water_mark: None,
            live: BTreeMap::new(),
            next_seq: 0,
            graph: DegreeGraph::new(),
        })
    }

    pub fn window_secs(&self) -> i64 {
        self.window_secs
    }

    /// Unset until the first event is admitted.
    pub fn high_water_mark(&self) -> Option<Timestamp> {
        self.high_water_mark
    }

    pub fn window_floor(&self) -> Option<Timestamp> {
        self.high_water_mark
            .map(|mark| mark.saturating_sub(self.window_secs))
    }

    pub fn graph(&self) -> &DegreeGraph {
        &self.graph
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Live edges ordered by timestamp, ties in insertion order.
    pub fn live_edges(&self) -> impl Iterator<Item = &EdgeRecord> {
        self.live.values()
    }

    /// Advances the window if the event is newer than anything seen, evicts
    /// expired edges, then admits the event unless it falls at or before the
    /// floor.
    pub fn admit_or_reject(&mut self, event: Event) -> AdmitReport {
        let mut window_advanced = false;
        let mut evicted = 0;

        if self.high_water_mark.map_or(true, |mark| event.timestamp > mark) {
            self.high_water_mark = Some(event.timestamp);
            window_advanced = true;
            evicted = self.evict();
        }

        if self.is_stale(event.timestamp) {
            debug!(
                timestamp = event.timestamp,
                floor = ?self.window_floor(),
                "stale event"
            );
            return AdmitReport {
                admission: Admission::Stale,
                window_advanced,
                evicted,
            };
        }

        self.graph.add_edge(&event.source, &event.target);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.live.insert((event.timestamp, seq), EdgeRecord::from(event));

        AdmitReport {
            admission: Admission::Admitted,
            window_advanced,
            evicted,
        }
    }

    pub fn is_stale(&self, timestamp: Timestamp) -> bool {
        self.window_floor().is_some_and(|floor| timestamp <= floor)
    }

    /// Removes every live edge with `timestamp <= window_floor()`.
    /// Returns the number of edges removed.
    pub fn evict(&mut self) -> usize {
        let Some(floor) = self.window_floor() else {
            return 0;
        };

        let mut evicted = 0;
        while let Some(entry) = self.live.first_entry() {
            if entry.key().0 > floor {
                break;
            }
            let record = entry.remove();
            if !self.graph.remove_edge(&record.a, &record.b) {
                debug!(a = %record.a, b = %record.b, "evicted edge had no graph entry");
            }
            evicted += 1;
        }

        if evicted > 0 {
            debug!(evicted, floor, remaining = self.live.len(), "evicted expired edges");
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollgraph_core::model::VertexId;

    fn ev(a: &str, b: &str, t: Timestamp) -> Event {
        Event::new(a, b, t)
    }

    #[test]
    fn test_non_positive_window_is_rejected() {
        assert_eq!(
            WindowedEdgeStore::new(-1).unwrap_err(),
            WindowError::NonPositiveWindow(-1)
        );
        assert_eq!(
            WindowedEdgeStore::new(0).unwrap_err(),
            WindowError::NonPositiveWindow(0)
        );
    }

    #[test]
    fn test_first_event_is_always_admitted() {
        let mut store = WindowedEdgeStore::new(60).unwrap();
        assert_eq!(store.high_water_mark(), None);

        let report = store.admit_or_reject(ev("a", "b", 0));
        assert_eq!(report.admission, Admission::Admitted);
        assert!(report.window_advanced);
        assert_eq!(store.high_water_mark(), Some(0));
        assert_eq!(store.window_floor(), Some(-60));
    }

    #[test]
    fn test_out_of_order_event_inside_window_does_not_move_mark() {
        let mut store = WindowedEdgeStore::new(60).unwrap();
        store.admit_or_reject(ev("a", "b", 100));

        let report = store.admit_or_reject(ev("c", "d", 50));
        assert_eq!(report.admission, Admission::Admitted);
        assert!(!report.window_advanced);
        assert_eq!(store.high_water_mark(), Some(100));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_floor_is_exclusive() {
        let mut store = WindowedEdgeStore::new(60).unwrap();
        store.admit_or_reject(ev("a", "b", 100));

        let report = store.admit_or_reject(ev("c", "d", 40));
        assert_eq!(report.admission, Admission::Stale);
        assert_eq!(store.len(), 1);
        assert_eq!(store.graph().degree(&VertexId::new("c")), 0);

        let report = store.admit_or_reject(ev("c", "d", 41));
        assert_eq!(report.admission, Admission::Admitted);
    }

    #[test]
    fn test_advancing_mark_evicts_boundary_edges() {
        let mut store = WindowedEdgeStore::new(60).unwrap();
        store.admit_or_reject(ev("a", "b", 0));
        store.admit_or_reject(ev("b", "c", 10));
        store.admit_or_reject(ev("e", "f", 11));

        // floor moves to 10: edges stamped 0 and exactly 10 both expire
        let report = store.admit_or_reject(ev("c", "d", 70));
        assert_eq!(report.evicted, 2);
        assert_eq!(store.len(), 2);
        assert_eq!(store.graph().degree(&VertexId::new("a")), 0);
        assert_eq!(store.graph().degree(&VertexId::new("b")), 0);
        assert_eq!(store.graph().degree(&VertexId::new("c")), 1);
        assert!(store.live_edges().all(|e| e.timestamp > 10));

        let report = store.admit_or_reject(ev("d", "g", 71));
        assert_eq!(report.evicted, 1);
        assert_eq!(store.graph().degree(&VertexId::new("e")), 0);
    }

    #[test]
    fn test_one_second_window_keeps_only_latest_timestamp() {
        let mut store = WindowedEdgeStore::new(1).unwrap();
        assert_eq!(store.admit_or_reject(ev("a", "b", 5)).admission, Admission::Admitted);
        assert_eq!(store.admit_or_reject(ev("c", "d", 5)).admission, Admission::Admitted);
        assert_eq!(store.admit_or_reject(ev("e", "f", 4)).admission, Admission::Stale);

        let report = store.admit_or_reject(ev("g", "h", 6));
        assert_eq!(report.admission, Admission::Admitted);
        assert_eq!(report.evicted, 2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_evict_is_idempotent() {
        let mut store = WindowedEdgeStore::new(60).unwrap();
        store.admit_or_reject(ev("a", "b", 0));
        store.admit_or_reject(ev("a", "c", 100));

        assert_eq!(store.evict(), 0);
        assert_eq!(store.len(), 1);
        assert_eq!(store.graph().vertex_count(), 2);
    }
}
