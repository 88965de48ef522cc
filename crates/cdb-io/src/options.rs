//! Import configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ImportError, Result};

/// What to do when a coordinate block defines a node id a second time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateNodePolicy {
    /// Always fail with `DuplicateForeignNodeId`.
    Reject,
    /// Ignore the repeat if its coordinates match the first definition
    /// exactly, fail otherwise.
    #[default]
    AcceptIdentical,
    /// Create a new point and point the id at it; the earlier point stays in
    /// the mesh unreferenced.
    Overwrite,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    pub duplicate_nodes: DuplicateNodePolicy,
    /// Run mesh validation once the stream is exhausted.
    pub validate: bool,
    /// Joins block name and topology name in partition names.
    pub partition_name_separator: String,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            duplicate_nodes: DuplicateNodePolicy::default(),
            validate: true,
            partition_name_separator: "_".to_string(),
        }
    }
}

impl ImportOptions {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|err| ImportError::InvalidOptions(err.to_string()))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|err| {
            ImportError::InvalidOptions(format!("failed to read {}: {err}", path.display()))
        })?;
        Self::from_json_str(&raw)
    }

    /// Composite partition name, e.g. `BRACKET_HEX20`.
    pub fn partition_name(&self, block: &str, topology: &str) -> String {
        format!("{block}{}{topology}", self.partition_name_separator)
    }
}
