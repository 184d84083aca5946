use crate::processor::{PipelineError, RollingMedianPipeline};
use rollgraph_core::config::{AppConfig, WindowConfig};
use rollgraph_core::metrics::RunMetrics;
use tokio::fs::{self, File};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tracing::info;

/// Output line for one emitted median: two decimals, newline-terminated.
pub fn format_median(median: f64) -> String {
    format!("{:.2}\n", median)
}

/// Feeds line-delimited JSON records from `reader` through a fresh pipeline
/// and writes one formatted median per emitted event to `writer`, in input
/// order. Read and write failures end the run.
pub async fn run_stream<R, W>(
    reader: R,
    mut writer: W,
    window: &WindowConfig,
) -> Result<RunMetrics, PipelineError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut pipeline = RollingMedianPipeline::new(window)?;
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        if let Some(median) = pipeline.process_line(&line).and_then(|outcome| outcome.median()) {
            writer.write_all(format_median(median).as_bytes()).await?;
        }
    }
    writer.flush().await?;

    let metrics = pipeline.into_metrics();
    info!(
        records = metrics.records_read,
        admitted = metrics.admitted,
        stale = metrics.stale,
        rejected = metrics.rejected,
        evicted = metrics.evicted_edges,
        peak_live_edges = metrics.peak_live_edges,
        "stream complete"
    );
    Ok(metrics)
}

/// Runs the configured input file into the configured output file, creating
/// the output directory if needed.
pub async fn run_files(config: &AppConfig) -> Result<RunMetrics, PipelineError> {
    let input = File::open(&config.io.input_path).await?;

    if let Some(parent) = config.io.output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    let output = File::create(&config.io.output_path).await?;

    info!(
        input = %config.io.input_path.display(),
        output = %config.io.output_path.display(),
        window_secs = config.window.window_secs,
        "starting run"
    );
    run_stream(BufReader::new(input), BufWriter::new(output), &config.window).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_uses_two_decimals() {
        assert_eq!(format_median(1.0), "1.00\n");
        assert_eq!(format_median(1.5), "1.50\n");
        assert_eq!(format_median(0.0), "0.00\n");
        assert_eq!(format_median(12.0), "12.00\n");
    }
}
