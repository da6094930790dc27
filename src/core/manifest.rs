//! Package metadata produced by the lifecycle
//!
//! - [`CppInfo`] is what consumers link against (`package_info`).
//! - [`PackageIdInfo`] is what the binary identity is computed from (`package_id`).
//! - [`PackageManifest`] records both next to the packaged files.
//!
//! ## Format
//!
//! ```toml
//! # package.toml - Auto-generated, do not edit manually
//!
//! name = "bitserializer"
//! version = "0.10"
//! package_id = "…"
//! files = ["include/bitserializer/bit_serializer.h", "licenses/license.txt"]
//!
//! [cpp_info]
//! libs = ["stdc++fs"]
//! includedirs = ["include"]
//! requires = ["rapidjson/1.1.0"]
//! ```

use crate::core::error::{RecipeError, Result};
use crate::core::settings::Settings;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;

/// File name of the manifest inside a package folder.
pub const MANIFEST_FILE: &str = "package.toml";

/// Link metadata declared for consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CppInfo {
    /// Libraries consumers must link
    #[serde(default)]
    pub libs: Vec<String>,
    /// Include directories relative to the package folder
    #[serde(default)]
    pub includedirs: Vec<String>,
    /// Upstream packages this one requires
    #[serde(default)]
    pub requires: Vec<String>,
}

impl Default for CppInfo {
    fn default() -> Self {
        Self {
            libs: Vec::new(),
            includedirs: vec!["include".to_string()],
            requires: Vec::new(),
        }
    }
}

/// Inputs to the binary identity of a package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageIdInfo {
    pub requires: Vec<String>,
    pub settings: BTreeMap<String, String>,
}

impl PackageIdInfo {
    /// Start from the settings and requirements of the current build.
    pub fn new(settings: &Settings, requires: &[&str]) -> Self {
        Self {
            requires: requires.iter().map(|r| r.to_string()).collect(),
            settings: settings.to_map(),
        }
    }

    /// Drop everything that would distinguish one build from another.
    pub fn header_only(&mut self) {
        self.settings.clear();
        self.requires.clear();
    }

    /// Hex SHA-256 of the canonical serialization.
    pub fn package_id(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(b"[requires]\n");
        for require in &self.requires {
            hasher.update(require.as_bytes());
            hasher.update(b"\n");
        }
        // BTreeMap iteration order is stable, so equal info hashes equally.
        hasher.update(b"[settings]\n");
        for (key, value) in &self.settings {
            hasher.update(key.as_bytes());
            hasher.update(b"=");
            hasher.update(value.as_bytes());
            hasher.update(b"\n");
        }
        hex::encode(hasher.finalize())
    }
}

/// Record of one packaged build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    pub name: String,
    pub version: String,
    pub package_id: String,
    /// Packaged files, relative to the package folder
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub cpp_info: CppInfo,
    /// Settings the package was created with
    #[serde(default)]
    pub settings: BTreeMap<String, String>,
}

impl PackageManifest {
    /// Read a manifest from path
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RecipeError::io(path, e))?;
        toml::from_str(&content).map_err(|e| {
            RecipeError::Manifest(format!("cannot parse {}: {}", path.display(), e))
        })
    }

    /// Write a manifest to path
    pub fn write(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| RecipeError::Manifest(format!("cannot serialize manifest: {}", e)))?;
        let header = "# package.toml - Auto-generated, do not edit manually\n\n";
        std::fs::write(path, format!("{}{}", header, content)).map_err(|e| RecipeError::io(path, e))
    }
}
