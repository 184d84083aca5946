use crate::timestamp::DEFAULT_TIMESTAMP_FORMAT;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_WINDOW_SECS: i64 = 60;
pub const DEFAULT_INPUT_PATH: &str = "venmo_input/venmo-trans.txt";
pub const DEFAULT_OUTPUT_PATH: &str = "venmo_output/output.txt";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct WindowConfig {
    pub window_secs: i64,
    pub timestamp_format: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            window_secs: DEFAULT_WINDOW_SECS,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct IoConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub io: IoConfig,
}

impl AppConfig {
    /// Loads `config/default`, then `config/{RUN_MODE}`, then `ROLLGRAPH__*`
    /// environment variables. Every file is optional.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("config"))
    }

    pub fn load_from(config_dir: &Path) -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .set_default("window.window_secs", DEFAULT_WINDOW_SECS)?
            .set_default("window.timestamp_format", DEFAULT_TIMESTAMP_FORMAT)?
            .set_default("io.input_path", DEFAULT_INPUT_PATH)?
            .set_default("io.output_path", DEFAULT_OUTPUT_PATH)?
            .add_source(File::with_name(&config_file(config_dir, "default")).required(false))
            .add_source(File::with_name(&config_file(config_dir, &run_mode)).required(false))
            .add_source(
                Environment::with_prefix("ROLLGRAPH")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.window_secs <= 0 {
            return Err(ConfigError::Message(format!(
                "window.window_secs must be positive, got {}",
                self.window.window_secs
            )));
        }
        if self.window.timestamp_format.is_empty() {
            return Err(ConfigError::Message(
                "window.timestamp_format must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn config_file(config_dir: &Path, name: &str) -> String {
    config_dir.join(name).to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_apply_without_files() {
        let dir = tempdir().unwrap();
        let config = AppConfig::load_from(dir.path()).unwrap();
        assert_eq!(config.window, WindowConfig::default());
        assert_eq!(config.io, IoConfig::default());
    }

    #[test]
    fn default_file_overrides_builtin_values() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("default.toml"),
            "[window]\nwindow_secs = 30\n\n[io]\noutput_path = \"out/medians.txt\"\n",
        )
        .unwrap();

        let config = AppConfig::load_from(dir.path()).unwrap();
        assert_eq!(config.window.window_secs, 30);
        assert_eq!(config.window.timestamp_format, DEFAULT_TIMESTAMP_FORMAT);
        assert_eq!(config.io.output_path, PathBuf::from("out/medians.txt"));
        assert_eq!(config.io.input_path, PathBuf::from(DEFAULT_INPUT_PATH));
    }

    #[test]
    fn negative_window_is_rejected() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("default.toml"), "[window]\nwindow_secs = -1\n").unwrap();
        assert!(AppConfig::load_from(dir.path()).is_err());
    }

    #[test]
    fn zero_window_is_rejected() {
        let config = AppConfig {
            window: WindowConfig {
                window_secs: 0,
                ..WindowConfig::default()
            },
            io: IoConfig::default(),
        };
        assert!(config.validate().is_err());
    }
}
