//! Configuration management with environment variable support.
//!
//! This module provides centralized configuration for scenario reporting, supporting:
//! - Environment variables for all configurable values
//! - Sensible defaults for local runs
//! - Builder pattern for programmatic configuration
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SCENARIO_REPORT_OUTPUT_DIR` | Directory compiled reports are written to | `./target/site/serenity` |
//! | `SCENARIO_REPORT_PRETTY` | Pretty-print report JSON | `true` |
//! | `SCENARIO_REPORT_LOG` | Default log filter directive | `info` |
//! | `SCENARIO_REPORT_STORY_TYPE` | Value of `userStory.type` | `feature` |
//!
//! # Example
//!
//! ```bash
//! # Write compact reports somewhere else and log every event
//! export SCENARIO_REPORT_OUTPUT_DIR="/var/tmp/reports"
//! export SCENARIO_REPORT_PRETTY=false
//! export SCENARIO_REPORT_LOG="scenario_report=debug"
//! ```

use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;

// ============================================================================
// Default Values
// ============================================================================

/// Default report output directory
pub const DEFAULT_OUTPUT_DIR: &str = "./target/site/serenity";

/// Pretty-print report JSON by default
pub const DEFAULT_PRETTY: bool = true;

/// Default tracing filter directive
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default `userStory.type` label
pub const DEFAULT_STORY_TYPE: &str = "feature";

// ============================================================================
// Environment Variable Names
// ============================================================================

/// Environment variable for the report output directory
pub const ENV_OUTPUT_DIR: &str = "SCENARIO_REPORT_OUTPUT_DIR";

/// Environment variable for pretty-printing
pub const ENV_PRETTY: &str = "SCENARIO_REPORT_PRETTY";

/// Environment variable for the log filter
pub const ENV_LOG: &str = "SCENARIO_REPORT_LOG";

/// Environment variable for the story type label
pub const ENV_STORY_TYPE: &str = "SCENARIO_REPORT_STORY_TYPE";

// ============================================================================
// Configuration Getters (with caching)
// ============================================================================

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration (initialized from environment on first access)
pub fn get() -> &'static Config {
    CONFIG.get_or_init(Config::from_env)
}

/// Centralized configuration for scenario reporting
#[derive(Debug, Clone)]
pub struct Config {
    /// Report content settings
    pub report: ReportSettings,
    /// Output settings
    pub output: OutputSettings,
    /// Logging settings
    pub logging: LogSettings,
}

/// Settings that affect report content
#[derive(Debug, Clone)]
pub struct ReportSettings {
    /// `userStory.type` label
    pub story_type: String,
}

/// Settings for writing reports
#[derive(Debug, Clone)]
pub struct OutputSettings {
    /// Directory reports are written to
    pub dir: PathBuf,
    /// Pretty-print JSON
    pub pretty: bool,
}

/// Logging settings
#[derive(Debug, Clone)]
pub struct LogSettings {
    /// Filter directive used when `RUST_LOG` is not set
    pub filter: String,
}

impl Config {
    /// Create configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            report: ReportSettings::from_env(),
            output: OutputSettings::from_env(),
            logging: LogSettings::from_env(),
        }
    }

    /// Create configuration with all defaults (ignoring environment)
    pub fn defaults() -> Self {
        Self {
            report: ReportSettings::defaults(),
            output: OutputSettings::defaults(),
            logging: LogSettings::defaults(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

impl ReportSettings {
    pub fn from_env() -> Self {
        Self {
            story_type: env::var(ENV_STORY_TYPE)
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_STORY_TYPE.to_string()),
        }
    }

    pub fn defaults() -> Self {
        Self {
            story_type: DEFAULT_STORY_TYPE.to_string(),
        }
    }
}

impl OutputSettings {
    pub fn from_env() -> Self {
        Self {
            dir: env::var(ENV_OUTPUT_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            pretty: env::var(ENV_PRETTY)
                .ok()
                .and_then(|s| parse_bool(&s))
                .unwrap_or(DEFAULT_PRETTY),
        }
    }

    pub fn defaults() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            pretty: DEFAULT_PRETTY,
        }
    }
}

impl LogSettings {
    pub fn from_env() -> Self {
        Self {
            filter: env::var(ENV_LOG).unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string()),
        }
    }

    pub fn defaults() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Parse a boolean flag: true/false, yes/no, on/off, 1/0
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Get the report output directory (convenience function)
pub fn output_dir() -> PathBuf {
    get().output.dir.clone()
}

/// Get the default log filter (convenience function)
pub fn log_filter() -> String {
    get().logging.filter.clone()
}
