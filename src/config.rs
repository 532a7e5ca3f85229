//! Demo configuration, loaded from a TOML file and overridden by CLI flags.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::error::ConfigError;
use crate::feedback::FeedbackMode;
use crate::mixer::DEFAULT_MASTER_DB;

/// Looked for in the working directory when no `--config` flag is given.
pub const DEFAULT_CONFIG_PATH: &str = "aeolus.toml";

pub const DEFAULT_PORT: u16 = 57_300;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// UDP port the relay listens on.
    pub port: u16,
    /// Output device name; host default when absent.
    pub device: Option<String>,
    /// Feedback mode selected at boot.
    pub mode: FeedbackMode,
    /// Directory of WAV files the sample bank loads from.
    pub samples_dir: Option<PathBuf>,
    /// Master gain at boot, dB.
    pub master_db: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            device: None,
            mode: FeedbackMode::default(),
            samples_dir: None,
            master_db: DEFAULT_MASTER_DB,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let config = toml::from_str(&text)?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// With an explicit path a missing file is an error; without one, a
    /// missing `aeolus.toml` just means defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let p = Path::new(DEFAULT_CONFIG_PATH);
                if p.exists() {
                    Self::load(p)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}
