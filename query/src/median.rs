use rollgraph_core::error::{ErrorCode, RollgraphError};
use std::collections::BTreeMap;
use storage::DegreeGraph;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MedianError {
    #[error("no vertex has a live edge")]
    EmptyDistribution,
}

impl RollgraphError for MedianError {
    fn error_code(&self) -> ErrorCode {
        ErrorCode::FailedPrecondition
    }
}

/// Median of the distinct-neighbor degree over every vertex with a live edge.
///
/// Reads the graph's degree histogram, so the cost is proportional to the
/// number of distinct degree values rather than the number of vertices.
pub fn degree_median(graph: &DegreeGraph) -> Result<f64, MedianError> {
    histogram_median(graph.degree_histogram())
}

/// Median of a `value -> multiplicity` histogram. Even-sized distributions
/// average the two middle values.
pub fn histogram_median(histogram: &BTreeMap<usize, usize>) -> Result<f64, MedianError> {
    let total: usize = histogram.values().sum();
    if total == 0 {
        return Err(MedianError::EmptyDistribution);
    }

    let lower = nth_value(histogram, (total - 1) / 2);
    let upper = nth_value(histogram, total / 2);
    Ok((lower + upper) as f64 / 2.0)
}

/// Median by sorting a copy of the values.
pub fn median_of(values: &[usize]) -> Result<f64, MedianError> {
    if values.is_empty() {
        return Err(MedianError::EmptyDistribution);
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let n = sorted.len();
    Ok((sorted[(n - 1) / 2] + sorted[n / 2]) as f64 / 2.0)
}

// 0-based rank into the expanded, ascending histogram. Caller guarantees
// rank < total.
fn nth_value(histogram: &BTreeMap<usize, usize>, rank: usize) -> usize {
    let mut seen = 0;
    for (&value, &count) in histogram {
        seen += count;
        if rank < seen {
            return value;
        }
    }
    0
}
