//! Compiler configuration
//!
//! Small knobs for the pipeline: the entry-function label and the spill
//! reservation added to every frame. Values come from the builder API or
//! from a TOML file.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Label of the synthetic entry function (and the `.globl` symbol)
    pub entry: String,
    /// Spill bytes reserved in every activation record
    pub spill_bytes_hint: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            entry: "main".to_string(),
            spill_bytes_hint: 256,
        }
    }
}

impl CompilerConfig {
    pub fn new() -> Self {
        CompilerConfig::default()
    }

    pub fn with_entry(mut self, entry: impl Into<String>) -> Self {
        self.entry = entry.into();
        self
    }

    pub fn with_spill_hint(mut self, bytes: usize) -> Self {
        self.spill_bytes_hint = bytes;
        self
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse compiler config: {}", e))
    }
}
