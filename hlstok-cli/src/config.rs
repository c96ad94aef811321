use crate::{cli::OutputFormat, error::Result};
use hls::Details;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "hlstok";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default output format
    pub output_format: OutputFormat,

    /// Default token filter
    pub details: Details,

    /// Treat rule warnings as failures
    pub strict: bool,

    /// Enable colored output
    pub colored_output: bool,

    /// Request timeout in seconds for remote playlists
    pub timeout: u64,

    /// User agent string for requests
    pub user_agent: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Pretty,
            details: Details::Complete,
            strict: false,
            colored_output: true,
            timeout: 30,
            user_agent: Some(format!("{APP_NAME}/{}", env!("CARGO_PKG_VERSION"))),
        }
    }
}

impl AppConfig {
    /// Load configuration from `config_path`, or from the default location
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        match config_path {
            Some(path) => {
                if path.exists() {
                    let content = std::fs::read_to_string(path)?;
                    Ok(toml::from_str(&content)?)
                } else {
                    Ok(Self::default())
                }
            }
            None => Ok(confy::load(APP_NAME, None)?),
        }
    }

    /// Get default configuration file path
    pub fn default_config_path() -> Option<PathBuf> {
        confy::get_configuration_file_path(APP_NAME, None).ok()
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.show()?)?;
        Ok(())
    }

    /// Reset configuration to defaults and save
    pub fn reset(config_path: Option<&Path>) -> Result<PathBuf> {
        let path = config_path
            .map(Path::to_path_buf)
            .or_else(Self::default_config_path)
            .ok_or_else(|| {
                crate::error::AppError::Initialization(
                    "no configuration path available".to_string(),
                )
            })?;

        Self::default().save(&path)?;
        Ok(path)
    }

    /// Show current configuration as a formatted string
    pub fn show(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
