use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chat_core::StatusStyle;
use chat_logging::chat_info;
use chat_pipeline::{PipelineSettings, ServiceSettings};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::logging::LogDestination;

pub const CONFIG_FILENAME: &str = "chat_widget.ron";
pub const BASE_URL_ENV: &str = "CHAT_WIDGET_BASE_URL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StatusDisplay {
    #[default]
    TypingIndicator,
    StatusText,
    Hidden,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    pub base_url: String,
    pub status_display: StatusDisplay,
    pub log_destination: LogDestination,
    /// Unset means the widget waits for each stage indefinitely.
    pub request_timeout_secs: Option<u64>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            base_url: ServiceSettings::default().base_url,
            status_display: StatusDisplay::default(),
            log_destination: LogDestination::default(),
            request_timeout_secs: None,
        }
    }
}

impl WidgetConfig {
    pub fn service_settings(&self) -> ServiceSettings {
        ServiceSettings {
            base_url: self.base_url.clone(),
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
            ..ServiceSettings::default()
        }
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            announce_progress: self.status_display != StatusDisplay::Hidden,
        }
    }

    pub fn status_style(&self) -> StatusStyle {
        match self.status_display {
            StatusDisplay::TypingIndicator => StatusStyle::TypingIndicator,
            StatusDisplay::StatusText => StatusStyle::StatusText,
            StatusDisplay::Hidden => StatusStyle::Hidden,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

/// Loads `chat_widget.ron` from `dir`, then applies the environment override.
pub fn load(dir: &Path) -> Result<WidgetConfig, ConfigError> {
    let config = read_file(&dir.join(CONFIG_FILENAME))?;
    Ok(with_base_url_override(
        config,
        std::env::var(BASE_URL_ENV).ok(),
    ))
}

fn read_file(path: &Path) -> Result<WidgetConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Ok(WidgetConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let config = ron::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    chat_info!("Loaded config from {:?}", path);
    Ok(config)
}

fn with_base_url_override(mut config: WidgetConfig, value: Option<String>) -> WidgetConfig {
    if let Some(base_url) = value.map(|v| v.trim().to_string()) {
        if !base_url.is_empty() {
            config.base_url = base_url;
        }
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = read_file(&temp.path().join(CONFIG_FILENAME)).unwrap();
        assert_eq!(config, WidgetConfig::default());
        assert_eq!(config.base_url, "http://localhost:8000");
    }

    #[test]
    fn partial_file_fills_remaining_fields() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        fs::write(
            &path,
            r#"(base_url: "https://chatbot.example.com", status_display: StatusText)"#,
        )
        .unwrap();

        let config = read_file(&path).unwrap();

        assert_eq!(config.base_url, "https://chatbot.example.com");
        assert_eq!(config.status_display, StatusDisplay::StatusText);
        assert_eq!(config.log_destination, LogDestination::File);
        assert_eq!(config.request_timeout_secs, None);
    }

    #[test]
    fn unparsable_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        fs::write(&path, "(base_url: 42").unwrap();

        let err = read_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn env_override_replaces_base_url_unless_blank() {
        let config = with_base_url_override(
            WidgetConfig::default(),
            Some(" https://override.example.com ".to_string()),
        );
        assert_eq!(config.base_url, "https://override.example.com");

        let config = with_base_url_override(WidgetConfig::default(), Some("  ".to_string()));
        assert_eq!(config.base_url, "http://localhost:8000");
    }

    #[test]
    fn hidden_status_disables_progress_events() {
        let config = WidgetConfig {
            status_display: StatusDisplay::Hidden,
            ..WidgetConfig::default()
        };
        assert!(!config.pipeline_settings().announce_progress);
        assert_eq!(config.status_style(), StatusStyle::Hidden);

        let config = WidgetConfig {
            request_timeout_secs: Some(30),
            ..WidgetConfig::default()
        };
        assert_eq!(
            config.service_settings().request_timeout,
            Some(Duration::from_secs(30))
        );
        assert_eq!(config.service_settings().connect_timeout, None);
    }
}
