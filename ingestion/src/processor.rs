use query::{degree_median, MedianError};
use rollgraph_core::config::WindowConfig;
use rollgraph_core::error::{ErrorCode, RollgraphError};
use rollgraph_core::ingest::RawRecord;
use rollgraph_core::metrics::RunMetrics;
use rollgraph_core::model::Event;
use rollgraph_core::validate::{validate, InvalidEvent};
use storage::{Admission, WindowError, WindowedEdgeStore};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that end a run. Per-record problems are [`InvalidEvent`]s instead.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Window error: {0}")]
    Window(#[from] WindowError),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RollgraphError for PipelineError {
    fn error_code(&self) -> ErrorCode {
        match self {
            PipelineError::Io(_) => ErrorCode::Internal,
            PipelineError::Window(_) => ErrorCode::InvalidArgument,
            PipelineError::Config(_) => ErrorCode::InvalidArgument,
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

/// Result of pushing one record through the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    /// Invalid record; nothing is emitted.
    Rejected(InvalidEvent),
    /// Too old for the window; the previous median is re-emitted.
    Stale { median: f64 },
    Admitted { median: f64 },
}

impl EventOutcome {
    /// The value to emit, if any.
    pub fn median(&self) -> Option<f64> {
        match self {
            EventOutcome::Rejected(_) => None,
            EventOutcome::Stale { median } | EventOutcome::Admitted { median } => Some(*median),
        }
    }
}

/// Rolling degree-median engine. Holds all mutable state for one stream and
/// processes records strictly one at a time.
#[derive(Debug, Clone)]
pub struct RollingMedianPipeline {
    store: WindowedEdgeStore,
    timestamp_format: String,
    median: f64,
    metrics: RunMetrics,
}

impl RollingMedianPipeline {
    pub fn new(window: &WindowConfig) -> Result<Self, PipelineError> {
        if window.timestamp_format.is_empty() {
            return Err(PipelineError::Config(
                "timestamp format must not be empty".to_string(),
            ));
        }
        Ok(Self {
            store: WindowedEdgeStore::new(window.window_secs)?,
            timestamp_format: window.timestamp_format.clone(),
            median: 0.0,
            metrics: RunMetrics::default(),
        })
    }

    /// Decodes and processes one input line. Blank lines are ignored.
    pub fn process_line(&mut self, line: &str) -> Option<EventOutcome> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        match RawRecord::from_json_line(line) {
            Ok(record) => Some(self.process_record(&record)),
            Err(err) => {
                warn!(error = %err, "undecodable record");
                self.metrics.record_read();
                Some(self.reject(InvalidEvent::Undecodable(err.to_string())))
            }
        }
    }

    pub fn process_record(&mut self, record: &RawRecord) -> EventOutcome {
        self.metrics.record_read();
        match validate(record, &self.timestamp_format) {
            Ok(event) => self.apply(event),
            Err(err) => self.reject(err),
        }
    }

    /// Processes an already validated event.
    pub fn process_event(&mut self, event: Event) -> EventOutcome {
        self.metrics.record_read();
        self.apply(event)
    }

    /// Last emitted median, `0.0` before the first admission.
    pub fn median(&self) -> f64 {
        self.median
    }

    pub fn store(&self) -> &WindowedEdgeStore {
        &self.store
    }

    pub fn metrics(&self) -> &RunMetrics {
        &self.metrics
    }

    pub fn into_metrics(self) -> RunMetrics {
        self.metrics
    }

    fn apply(&mut self, event: Event) -> EventOutcome {
        let report = self.store.admit_or_reject(event);
        self.metrics.record_evicted(report.evicted);

        match report.admission {
            Admission::Stale => {
                self.metrics.record_stale();
                EventOutcome::Stale {
                    median: self.median,
                }
            }
            Admission::Admitted => {
                self.metrics.record_admitted(self.store.len());
                match degree_median(self.store.graph()) {
                    Ok(median) => self.median = median,
                    Err(MedianError::EmptyDistribution) => {
                        debug!("empty degree distribution, keeping previous median");
                    }
                }
                EventOutcome::Admitted {
                    median: self.median,
                }
            }
        }
    }

    fn reject(&mut self, err: InvalidEvent) -> EventOutcome {
        debug!(reason = err.reason(), error = %err, "rejected record");
        self.metrics.record_rejected(err.reason());
        EventOutcome::Rejected(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline() -> RollingMedianPipeline {
        RollingMedianPipeline::new(&WindowConfig::default()).unwrap()
    }

    #[test]
    fn test_non_positive_window_is_fatal() {
        let window = WindowConfig {
            window_secs: -5,
            ..WindowConfig::default()
        };
        let err = RollingMedianPipeline::new(&window).unwrap_err();
        assert!(matches!(err, PipelineError::Window(WindowError::NonPositiveWindow(-5))));
        assert!(!err.is_recoverable());

        let window = WindowConfig {
            window_secs: 0,
            ..WindowConfig::default()
        };
        let err = RollingMedianPipeline::new(&window).unwrap_err();
        assert!(matches!(err, PipelineError::Window(WindowError::NonPositiveWindow(0))));
    }

    #[test]
    fn test_reference_scenario() {
        let mut p = pipeline();
        assert_eq!(p.process_event(Event::new("A", "B", 0)), EventOutcome::Admitted { median: 1.0 });
        assert_eq!(p.process_event(Event::new("B", "C", 10)), EventOutcome::Admitted { median: 1.0 });
        assert_eq!(p.store().window_floor(), Some(-50));
        assert_eq!(p.store().len(), 2);

        assert_eq!(p.process_event(Event::new("C", "D", 70)), EventOutcome::Admitted { median: 1.0 });
        assert_eq!(p.store().window_floor(), Some(10));
        assert!(p.store().live_edges().all(|e| e.timestamp > 10));

        assert_eq!(p.process_event(Event::new("A", "E", 5)), EventOutcome::Stale { median: 1.0 });
        assert_eq!(p.metrics().stale, 1);
        assert_eq!(p.metrics().admitted, 3);
    }

    #[test]
    fn test_stale_event_re_emits_unchanged_median() {
        let mut p = pipeline();
        p.process_event(Event::new("hub", "a", 100));
        p.process_event(Event::new("hub", "b", 100));
        p.process_event(Event::new("hub", "c", 100));
        assert_eq!(p.median(), 1.0);
        p.process_event(Event::new("a", "b", 100));
        // hub=3, a=2, b=2, c=1
        assert_eq!(p.median(), 2.0);

        let outcome = p.process_event(Event::new("x", "y", 40));
        assert_eq!(outcome, EventOutcome::Stale { median: 2.0 });
        assert_eq!(p.store().len(), 4);
        assert_eq!(p.store().graph().degree(&"x".into()), 0);
    }

    #[test]
    fn test_rejected_record_emits_nothing() {
        let mut p = pipeline();
        p.process_event(Event::new("a", "b", 0));

        let mut record = RawRecord::new("a", "c", "1970-01-01T00:00:10Z");
        record.target = None;
        let outcome = p.process_record(&record);
        assert_eq!(outcome, EventOutcome::Rejected(InvalidEvent::MissingField("target")));
        assert_eq!(outcome.median(), None);
        assert_eq!(p.store().len(), 1);
        assert_eq!(p.median(), 1.0);
        assert_eq!(p.metrics().rejected_by_reason.get("missing_field"), Some(&1));
    }

    #[test]
    fn test_process_line_decodes_json() {
        let mut p = pipeline();
        assert_eq!(p.process_line("   "), None);

        let outcome = p
            .process_line(r#"{"created_time": "2016-04-07T03:33:19Z", "target": "b", "actor": "a"}"#)
            .unwrap();
        assert_eq!(outcome, EventOutcome::Admitted { median: 1.0 });

        let outcome = p
            .process_line(r#"["c", "d", "2016-04-07T03:33:20Z"]"#)
            .unwrap();
        assert!(matches!(outcome, EventOutcome::Rejected(InvalidEvent::Undecodable(_))));
        assert_eq!(p.store().len(), 1);

        let outcome = p.process_line("{not json").unwrap();
        assert!(matches!(outcome, EventOutcome::Rejected(InvalidEvent::Undecodable(_))));
        assert_eq!(p.metrics().records_read, 3);
    }

    #[test]
    fn test_even_distribution_median_is_fractional() {
        let mut p = pipeline();
        p.process_event(Event::new("a", "b", 1));
        p.process_event(Event::new("c", "d", 2));
        assert_eq!(p.median(), 1.0);

        // a=2, c=2, b=1, d=1
        let outcome = p.process_event(Event::new("a", "c", 3));
        assert_eq!(outcome, EventOutcome::Admitted { median: 1.5 });
    }

    #[test]
    fn test_parallel_edges_count_once() {
        let mut p = pipeline();
        p.process_event(Event::new("a", "b", 1));
        p.process_event(Event::new("b", "a", 2));
        p.process_event(Event::new("a", "b", 3));
        assert_eq!(p.median(), 1.0);
        assert_eq!(p.store().len(), 3);
        assert_eq!(p.store().graph().multiplicity(&"a".into(), &"b".into()), 3);
    }
}
