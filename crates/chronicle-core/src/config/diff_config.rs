use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_IGNORED_ATTRIBUTES;

/// Diff computation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Attributes never written into a change set.
    pub ignored_attributes: Vec<String>,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            ignored_attributes: DEFAULT_IGNORED_ATTRIBUTES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}
