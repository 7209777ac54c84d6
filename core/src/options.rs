use crate::FatError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest data-cluster count a FAT12 volume can have.
pub const FAT12_MAX_CLUSTERS: u32 = 4084;

/// Knobs for a single extraction. Every field has a default so partial
/// JSON documents are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    /// Let name lookups match directory entries marked deleted (0xE5).
    pub include_deleted: bool,
    /// Upper bound on clusters visited while walking one chain.
    pub max_chain_clusters: u32,
    /// Reject images without the 0x55AA boot signature.
    pub require_boot_signature: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            include_deleted: false,
            max_chain_clusters: FAT12_MAX_CLUSTERS,
            require_boot_signature: false,
        }
    }
}

impl ExtractOptions {
    pub fn from_json(json: &str) -> Result<Self, FatError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, FatError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}
