//! Configuration schema definitions.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use rivet_framework::ClientConfig;
use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RivetConfig {
    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Session and dispatch settings for the client.
    #[serde(default)]
    pub client: ClientSettings,
}

// =============================================================================
// Logging
// =============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature.
    Json,
}

/// Where log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    /// Append to `file_path`.
    File,
}

/// Log file rollover schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    #[default]
    Never,
    Hourly,
    Daily,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpanEventConfig {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub enter: bool,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub close: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Base log level, overridden by `RUST_LOG` when set.
    #[serde(default)]
    pub level: LogLevel,

    #[serde(default)]
    pub format: LogFormat,

    #[serde(default)]
    pub output: LogOutput,

    /// Log file, required when `output = "file"`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// How often the log file is rolled over.
    #[serde(default)]
    pub rotation: LogRotation,

    /// Number of rolled log files to keep.
    #[serde(default = "default_max_files")]
    pub max_files: u32,

    /// Per-module levels, e.g. `rivet_framework = "debug"`.
    #[serde(default)]
    pub filters: HashMap<String, LogLevel>,

    #[serde(default)]
    pub span_events: SpanEventConfig,

    /// Include thread ids in log lines.
    #[serde(default)]
    pub thread_ids: bool,

    /// Include source file and line in log lines.
    #[serde(default)]
    pub file_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            output: LogOutput::default(),
            file_path: None,
            rotation: LogRotation::default(),
            max_files: default_max_files(),
            filters: HashMap::new(),
            span_events: SpanEventConfig::default(),
            thread_ids: false,
            file_location: false,
        }
    }
}

fn default_max_files() -> u32 {
    5
}

// =============================================================================
// Client
// =============================================================================

/// Client settings.
///
/// Timeouts of `0` mean sessions never expire unless they choose a timeout
/// themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Grace period before an unanswered interaction is deferred.
    #[serde(default = "default_autodefer_grace_ms")]
    pub autodefer_grace_ms: u64,

    /// Default inactivity timeout for views.
    #[serde(default = "default_view_timeout_secs")]
    pub view_timeout_secs: u64,

    /// Default timeout for modals.
    #[serde(default = "default_modal_timeout_secs")]
    pub modal_timeout_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            autodefer_grace_ms: default_autodefer_grace_ms(),
            view_timeout_secs: default_view_timeout_secs(),
            modal_timeout_secs: default_modal_timeout_secs(),
        }
    }
}

impl ClientSettings {
    /// Converts to the framework's client config.
    pub fn to_client_config(&self) -> ClientConfig {
        let timeout = |secs: u64| (secs > 0).then(|| Duration::from_secs(secs));
        ClientConfig::new()
            .autodefer_grace(Duration::from_millis(self.autodefer_grace_ms))
            .view_timeout(timeout(self.view_timeout_secs))
            .modal_timeout(timeout(self.modal_timeout_secs))
    }
}

fn default_autodefer_grace_ms() -> u64 {
    rivet_framework::DEFAULT_AUTODEFER_GRACE.as_millis() as u64
}

fn default_view_timeout_secs() -> u64 {
    rivet_framework::DEFAULT_VIEW_TIMEOUT.as_secs()
}

fn default_modal_timeout_secs() -> u64 {
    rivet_framework::DEFAULT_MODAL_TIMEOUT.as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_framework() {
        let settings = ClientSettings::default();
        assert_eq!(settings.to_client_config(), ClientConfig::default());
    }

    #[test]
    fn test_zero_timeout_disables_expiry() {
        let settings = ClientSettings {
            view_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(settings.to_client_config().view_timeout, None);
    }
}
