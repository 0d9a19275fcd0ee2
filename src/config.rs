// File: ./src/config.rs
// Extraction configuration and defaults.
use anyhow::Result;
use serde::{Deserialize, Serialize};

fn default_roster() -> Vec<String> {
    ["Aman", "Rajeev", "Shreya", "John", "Jane", "Alex", "Sarah", "Mike"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Ordered roster of personal names recognized during transcript
    /// attribution. Order is matching priority when names could overlap.
    #[serde(default = "default_roster")]
    pub roster: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            roster: default_roster(),
        }
    }
}

impl ExtractorConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }
}
