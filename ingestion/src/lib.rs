pub mod api;
pub mod processor;

pub use api::{format_median, run_files, run_stream};
pub use processor::{EventOutcome, PipelineError, RollingMedianPipeline};
