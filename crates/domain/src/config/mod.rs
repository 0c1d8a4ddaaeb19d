mod processor;
mod server;
mod storage;
mod telephony;
mod webhook;

pub use processor::*;
pub use server::*;
pub use storage::*;
pub use telephony::*;
pub use webhook::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub telephony: TelephonyConfig,
    #[serde(default)]
    pub processor: ProcessorConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.port".into(),
                message: "port must be greater than 0".into(),
            });
        }

        if self.server.host.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.host".into(),
                message: "host must not be empty".into(),
            });
        }

        // The telephony provider fetches TwiML from absolute URLs built on
        // this base, so it has to be set to something routable.
        if self.server.public_url.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.public_url".into(),
                message: "public_url must not be empty".into(),
            });
        } else if !self.server.public_url.starts_with("http") {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.public_url".into(),
                message: "public_url must be an http(s) URL".into(),
            });
        }

        if self.telephony.gather_timeout_secs == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "telephony.gather_timeout_secs".into(),
                message: "gather timeout must be greater than 0".into(),
            });
        }

        if self.webhook.max_attempts == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "webhook.max_attempts".into(),
                message: "max_attempts must be at least 1".into(),
            });
        }

        if self.processor.mode == ProcessorMode::Mock {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "processor.mode".into(),
                message: "mock processor selected — no real charges will be made".into(),
            });
        }

        errors
    }
}
