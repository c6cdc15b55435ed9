use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Viewer-facing toggles of the quality report behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[schemars(title = "Behavior", inline)]
#[serde(default)]
pub struct BehaviorOptions {
    /// Populate the report for every newly loaded model.
    #[schemars(title = "Auto Attach")]
    pub auto_attach: bool,
    /// Show the quality label when hovering a residue.
    #[schemars(title = "Show Tooltip")]
    pub show_tooltip: bool,
}

impl Default for BehaviorOptions {
    fn default() -> Self {
        Self {
            auto_attach: false,
            show_tooltip: true,
        }
    }
}
