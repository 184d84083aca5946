use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ingestion::run_files;
use rollgraph_core::config::AppConfig;

#[derive(Debug, Parser)]
#[command(author, version, about = "Rolling median of vertex degree over a sliding event window")]
struct Cli {
    #[arg(
        requires = "output",
        help = "Line-delimited JSON input (defaults to io.input_path)"
    )]
    input: Option<PathBuf>,

    #[arg(requires = "input", help = "Output file for medians (defaults to io.output_path)")]
    output: Option<PathBuf>,

    #[arg(long, default_value = "config", help = "Directory holding default/{RUN_MODE} config files")]
    config_dir: PathBuf,

    #[arg(long, help = "Window duration in seconds")]
    window_secs: Option<i64>,

    #[arg(long, help = "strftime-style timestamp format")]
    timestamp_format: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<AppConfig> {
        let mut config = AppConfig::load_from(&self.config_dir)
            .with_context(|| format!("failed to load config from {}", self.config_dir.display()))?;

        if let Some(input) = self.input {
            config.io.input_path = input;
        }
        if let Some(output) = self.output {
            config.io.output_path = output;
        }
        if let Some(window_secs) = self.window_secs {
            config.window.window_secs = window_secs;
        }
        if let Some(format) = self.timestamp_format {
            config.window.timestamp_format = format;
        }
        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    rollgraph_core::init_tracing();

    let config = Cli::parse().into_config()?;
    run_files(&config).await.with_context(|| {
        format!(
            "failed to process {} into {}",
            config.io.input_path.display(),
            config.io.output_path.display()
        )
    })?;
    Ok(())
}
