//! Version-indexed source table
//!
//! Maps each packaged upstream version to the archive it is built from.
//!
//! ## Format
//!
//! ```toml
//! [sources."0.10"]
//! url = "https://bitbucket.org/Pavel_Kisliak/bitserializer/get/v0.10.zip"
//! sha256 = "…"
//! ```
//!
//! `sha256` is optional; when present the downloaded archive is verified.

use crate::core::error::{RecipeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Where to fetch one upstream version from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

/// Source table keyed by upstream version.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceTable {
    #[serde(default)]
    pub sources: BTreeMap<String, SourceDescriptor>,
}

impl SourceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a source table from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let table: Self = toml::from_str(content)
            .map_err(|e| RecipeError::Manifest(format!("invalid source table: {}", e)))?;
        for (version, descriptor) in &table.sources {
            if descriptor.url.trim().is_empty() {
                return Err(RecipeError::Manifest(format!(
                    "source for version '{}' has an empty url",
                    version
                )));
            }
        }
        Ok(table)
    }

    /// Read a source table from disk.
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RecipeError::io(path, e))?;
        Self::from_toml(&content)
    }

    pub fn insert(&mut self, version: impl Into<String>, descriptor: SourceDescriptor) {
        self.sources.insert(version.into(), descriptor);
    }

    /// Resolve the descriptor for `version`.
    pub fn get(&self, version: &str) -> Result<&SourceDescriptor> {
        self.sources
            .get(version)
            .ok_or_else(|| RecipeError::UnknownVersion(version.to_string()))
    }

    /// Registered versions, sorted.
    pub fn versions(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }
}
