//! Monitor configuration.
//!
//! Deserialized as the `[monitor]` section of a TOML config file.

use serde::Deserialize;

/// Monitor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MonitorConfig {
    /// Deaths tolerated before any `expect_death` call (default: 0).
    #[serde(default = "default_expected_deaths")]
    pub expected_deaths: i32,
    /// Log non-death events at info level instead of debug (default: true).
    #[serde(default = "default_log_events")]
    pub log_events: bool,
}

fn default_expected_deaths() -> i32 {
    0
}

fn default_log_events() -> bool {
    true
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            expected_deaths: default_expected_deaths(),
            log_events: default_log_events(),
        }
    }
}
