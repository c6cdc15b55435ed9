//! Quality report options with TOML preset support.
//!
//! Request parameters (server, metric, timeout) and viewer toggles
//! (auto-attach, tooltips) serialize to/from TOML. Every section uses
//! `#[serde(default)]` so partial files work.

mod behavior;
mod report;

use std::path::Path;

pub use behavior::BehaviorOptions;
pub use report::{Metric, ReportOptions, DEFAULT_SERVER_URL};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ResqualError;

/// Top-level options container.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Report request parameters.
    pub report: ReportOptions,
    /// Auto-attach and tooltip toggles.
    pub behavior: BehaviorOptions,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, ResqualError> {
        let content = std::fs::read_to_string(path).map_err(ResqualError::Io)?;
        toml::from_str(&content)
            .map_err(|e| ResqualError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), ResqualError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ResqualError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ResqualError::Io)?;
        }
        std::fs::write(path, content).map_err(ResqualError::Io)
    }
}
