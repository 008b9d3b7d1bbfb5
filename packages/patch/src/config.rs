use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "arbor.config.json";

/// Patcher configuration file format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatcherConfig {
    /// Comment text of component and markup markers
    #[serde(default = "default_marker_text")]
    pub marker_text: String,

    /// Comment text of the temporary markers used while reordering
    #[serde(default = "default_permutation_marker_text")]
    pub permutation_marker_text: String,

    /// Attribute names with this prefix are engine instructions, not attributes
    #[serde(default = "default_internal_attribute_prefix")]
    pub internal_attribute_prefix: String,

    #[serde(default = "default_stop_propagation_prefix")]
    pub stop_propagation_prefix: String,

    #[serde(default = "default_prevent_default_prefix")]
    pub prevent_default_prefix: String,

    /// Parsed in place of empty markup so the block still owns a node
    #[serde(default = "default_empty_markup_placeholder")]
    pub empty_markup_placeholder: String,
}

fn default_marker_text() -> String {
    "!".to_string()
}

fn default_permutation_marker_text() -> String {
    "marker".to_string()
}

fn default_internal_attribute_prefix() -> String {
    "__internal_".to_string()
}

fn default_stop_propagation_prefix() -> String {
    "stopPropagation_".to_string()
}

fn default_prevent_default_prefix() -> String {
    "preventDefault_".to_string()
}

fn default_empty_markup_placeholder() -> String {
    " ".to_string()
}

impl PatcherConfig {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_json(&content)
        } else {
            Ok(PatcherConfig::default())
        }
    }
}

impl Default for PatcherConfig {
    fn default() -> Self {
        Self {
            marker_text: default_marker_text(),
            permutation_marker_text: default_permutation_marker_text(),
            internal_attribute_prefix: default_internal_attribute_prefix(),
            stop_propagation_prefix: default_stop_propagation_prefix(),
            prevent_default_prefix: default_prevent_default_prefix(),
            empty_markup_placeholder: default_empty_markup_placeholder(),
        }
    }
}
