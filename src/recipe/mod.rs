//! Recipe lifecycle contract
//!
//! A recipe is a set of hooks the host calls in a fixed order:
//!
//! 1. `configure` - gate on settings, may return advisories
//! 2. `source` - fetch and normalize the upstream sources
//! 3. `package` - copy files into the package folder
//! 4. `package_info` - link metadata for consumers
//! 5. `package_id` - adjust the inputs of the binary identity
//!
//! Hooks do not enforce this order; the host does.

mod bitserializer;

pub use bitserializer::{
    BitserializerRecipe, DEFERRED_ARCHIVES, MIN_CPPSTD, SOURCE_MARKER, SOURCE_SUBFOLDER,
    find_and_rename_source,
};

use crate::core::error::Result;
use crate::core::manifest::{CppInfo, PackageIdInfo};
use crate::core::settings::Settings;
use crate::core::sources::SourceTable;
use crate::core::version::Version;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Static description of a recipe.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeMetadata {
    pub name: &'static str,
    pub description: &'static str,
    pub topics: &'static [&'static str],
    pub url: &'static str,
    pub homepage: &'static str,
    pub license: &'static str,
    /// Settings the recipe reads
    pub settings: &'static [&'static str],
    /// Upstream packages required by consumers
    pub requires: &'static [&'static str],
    /// Package straight from the source folder instead of a build copy
    pub no_copy_source: bool,
}

/// Everything a hook may read about the current build.
#[derive(Debug, Clone)]
pub struct RecipeContext {
    pub settings: Settings,
    pub version: String,
    pub source_folder: PathBuf,
}

/// A non-fatal message from `configure`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory(pub String);

impl Advisory {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Minimum compiler version per compiler name.
///
/// Immutable once built; passed to recipes instead of living in a global.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedCompilers {
    minimums: BTreeMap<String, Version>,
}

impl SupportedCompilers {
    pub fn new(minimums: BTreeMap<String, Version>) -> Self {
        Self { minimums }
    }

    /// Minimum version for `compiler`, or `None` if the compiler is unknown.
    pub fn minimum_for(&self, compiler: &str) -> Option<&Version> {
        self.minimums.get(compiler)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Version)> {
        self.minimums.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.minimums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.minimums.is_empty()
    }
}

impl Default for SupportedCompilers {
    /// Compilers known to build C++17 with `<filesystem>` or `<experimental/filesystem>`.
    fn default() -> Self {
        let minimums = [
            ("gcc", 8),
            ("clang", 7),
            ("Visual Studio", 15),
            ("apple-clang", 10),
        ]
        .into_iter()
        .map(|(name, major)| (name.to_string(), Version::from_major(major)))
        .collect();
        Self { minimums }
    }
}

impl<S: Into<String>> FromIterator<(S, Version)> for SupportedCompilers {
    fn from_iter<I: IntoIterator<Item = (S, Version)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Lifecycle hooks implemented by a recipe.
pub trait Recipe {
    fn metadata(&self) -> &RecipeMetadata;

    /// Validate the settings. Fatal problems are errors; everything else is an advisory.
    fn configure(&self, ctx: &RecipeContext) -> Result<Vec<Advisory>>;

    /// Fetch the sources for `ctx.version` into `ctx.source_folder`.
    ///
    /// Returns the normalized source tree, or `None` when the archive had no
    /// recognizable top folder.
    fn source(&self, ctx: &RecipeContext, sources: &SourceTable) -> Result<Option<PathBuf>>;

    /// Copy files into `destination`, returning the packaged paths relative to it.
    fn package(&self, ctx: &RecipeContext, destination: &Path) -> Result<Vec<PathBuf>>;

    fn package_id(&self, info: &mut PackageIdInfo);

    fn package_info(&self, settings: &Settings) -> CppInfo;
}
