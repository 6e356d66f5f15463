//! Transform settings.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::frame::DEFAULT_LEVEL;
use crate::util::{Dtype, Error, Result};

/// Default collapse threshold: sequences with more items are compressed.
pub const DEFAULT_THRESHOLD: usize = 20;

/// Default flow threshold: flat sequences with fewer items render inline.
pub const DEFAULT_FLOW_THRESHOLD: usize = 10;

/// Settings passed explicitly into every transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Sequences longer than this collapse into blobs
    pub threshold: usize,
    /// Element type of encoded arrays
    pub dtype: Dtype,
    /// Flat sequences shorter than this render in flow style
    pub flow_threshold: usize,
    /// gzip level, 0-9
    pub level: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            dtype: Dtype::Float16,
            flow_threshold: DEFAULT_FLOW_THRESHOLD,
            level: DEFAULT_LEVEL,
        }
    }
}

impl Settings {
    /// Parse settings from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    /// Save settings as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.level > 9 {
            return Err(Error::setting("level", format!("{} is not in 0..=9", self.level)));
        }
        Ok(())
    }

    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_dtype(mut self, dtype: Dtype) -> Self {
        self.dtype = dtype;
        self
    }

    pub fn with_flow_threshold(mut self, flow_threshold: usize) -> Self {
        self.flow_threshold = flow_threshold;
        self
    }
}
