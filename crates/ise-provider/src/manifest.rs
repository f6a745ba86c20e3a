//! # Manifest
//!
//! Declarative desired state in TOML. Each `[[resource]]` block names a
//! resource type, a unique address, and the attributes the object should have:
//!
//! ```toml
//! [[resource]]
//! type = "ise_tacacs_profile"
//! address = "shell_admin"
//!
//! [resource.attributes]
//! name = "shell-admin"
//! description = "Privilege 15 shell"
//! ```
//!
//! Blocks are applied in file order and destroyed in reverse.

use ise_reconcile::DesiredState;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("manifest io error: {0}")]
    Io(String),
    #[error("manifest parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("resource address must not be empty")]
    EmptyAddress,
    #[error("resource address `{0}` is declared more than once")]
    DuplicateAddress(String),
    #[error("{address}: attributes cannot be converted: {source}")]
    Attributes {
        address: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A parsed manifest.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default, rename = "resource")]
    pub resources: Vec<ResourceBlock>,
}

/// One declared resource.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceBlock {
    #[serde(rename = "type")]
    pub type_name: String,
    pub address: String,
    #[serde(default)]
    pub attributes: toml::Table,
}

impl ResourceBlock {
    /// The block's attributes as a desired state.
    pub fn desired(&self) -> Result<DesiredState, ManifestError> {
        let value = serde_json::to_value(&self.attributes).map_err(|source| {
            ManifestError::Attributes {
                address: self.address.clone(),
                source,
            }
        })?;
        serde_json::from_value(value).map_err(|source| ManifestError::Attributes {
            address: self.address.clone(),
            source,
        })
    }
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = fs::read_to_string(path).map_err(|e| ManifestError::Io(e.to_string()))?;
        content.parse()
    }

    /// Checks that every address is set and unique.
    pub fn validate(&self) -> Result<(), ManifestError> {
        let mut seen = HashSet::new();
        for block in &self.resources {
            if block.address.is_empty() {
                return Err(ManifestError::EmptyAddress);
            }
            if !seen.insert(block.address.as_str()) {
                return Err(ManifestError::DuplicateAddress(block.address.clone()));
            }
        }
        Ok(())
    }
}

impl FromStr for Manifest {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let manifest: Manifest = toml::from_str(s)?;
        manifest.validate()?;
        Ok(manifest)
    }
}
