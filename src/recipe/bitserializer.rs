//! Recipe for BitSerializer, a header-only C++17 serialization library.
//!
//! Upstream archives from BitBucket unpack into a folder named
//! `<owner>-bitserializer-<commit hash>`; `source` renames it to
//! [`SOURCE_SUBFOLDER`] so `package` can find it.

use super::{Advisory, Recipe, RecipeContext, RecipeMetadata, SupportedCompilers};
use crate::core::cppstd::check_min_cppstd;
use crate::core::error::{RecipeError, Result};
use crate::core::manifest::{CppInfo, PackageIdInfo};
use crate::core::output;
use crate::core::settings::{Os, Settings};
use crate::core::sources::SourceTable;
use crate::core::version::Version;
use crate::helpers::{acquire, extract, fs_utils};
use std::path::{Path, PathBuf};

/// Lowest `compiler.cppstd` accepted.
pub const MIN_CPPSTD: &str = "17";

/// Substring identifying the extracted upstream folder.
pub const SOURCE_MARKER: &str = "-bitserializer-";

/// Canonical name of the normalized source folder.
pub const SOURCE_SUBFOLDER: &str = "source_subfolder";

/// Archive backends that are not packaged yet.
///
/// Each needs per-component packaging and, for PugiXml and RapidYaml, an
/// upstream package to depend on.
pub const DEFERRED_ARCHIVES: &[&str] = &[
    "bitserializer_cpprest_json",
    "bitserializer_pugixml",
    "bitserializer_rapidyaml",
];

/// Archive backend that is packaged.
const PACKAGED_ARCHIVE: &str = "bitserializer_rapidjson";

const LICENSE_FILE: &str = "license.txt";

/// Compilers below this major version ship `<filesystem>` in a separate library.
const STDCXXFS_BELOW_MAJOR: u64 = 9;

const CXX17_UNSUPPORTED: &str =
    "This package requires c++17 support. The current compiler does not support it.";

const COMPILER_UNKNOWN: &str =
    "This recipe has no support for the current compiler. Please consider adding it.";

static METADATA: RecipeMetadata = RecipeMetadata {
    name: "bitserializer",
    description: "Core part of C++ 17 library for serialization to JSON, XML, YAML",
    topics: &["serialization", "json", "xml"],
    url: "https://github.com/conan-io/conan-center-index",
    homepage: "https://bitbucket.org/Pavel_Kisliak/bitserializer",
    license: "MIT",
    settings: &["os", "compiler"],
    requires: &["rapidjson/1.1.0"],
    no_copy_source: true,
};

/// BitSerializer packaging recipe.
#[derive(Debug, Clone, Default)]
pub struct BitserializerRecipe {
    compilers: SupportedCompilers,
}

impl BitserializerRecipe {
    /// Recipe with the built-in compiler table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recipe with an injected compiler table.
    pub fn with_compilers(compilers: SupportedCompilers) -> Self {
        Self { compilers }
    }

    pub fn compilers(&self) -> &SupportedCompilers {
        &self.compilers
    }
}

/// Rename the first extracted folder containing [`SOURCE_MARKER`] to
/// [`SOURCE_SUBFOLDER`].
///
/// Only immediate children of `source_folder` are scanned and only
/// directories are considered. Returns the new path, or `None` when nothing
/// matched. Sibling order is whatever the filesystem yields.
pub fn find_and_rename_source(source_folder: &Path) -> Result<Option<PathBuf>> {
    let entries = std::fs::read_dir(source_folder).map_err(|e| RecipeError::io(source_folder, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| RecipeError::io(source_folder, e))?;
        let name = entry.file_name();
        if !name.to_string_lossy().contains(SOURCE_MARKER) {
            continue;
        }
        let is_dir = entry
            .file_type()
            .map_err(|e| RecipeError::io(entry.path(), e))?
            .is_dir();
        if !is_dir {
            continue;
        }

        let target = source_folder.join(SOURCE_SUBFOLDER);
        // A previous run into the same folder leaves its tree behind.
        if target.exists() {
            std::fs::remove_dir_all(&target).map_err(|e| RecipeError::io(&target, e))?;
        }
        std::fs::rename(entry.path(), &target).map_err(|e| RecipeError::io(&target, e))?;
        return Ok(Some(target));
    }

    Ok(None)
}

/// Prefix relative paths with the package subdirectory they were copied to.
fn under(dir: &str, files: Vec<PathBuf>) -> impl Iterator<Item = PathBuf> + '_ {
    files.into_iter().map(move |f| Path::new(dir).join(f))
}

impl Recipe for BitserializerRecipe {
    fn metadata(&self) -> &RecipeMetadata {
        &METADATA
    }

    fn configure(&self, ctx: &RecipeContext) -> Result<Vec<Advisory>> {
        let settings = &ctx.settings;

        if settings.get_safe("compiler.cppstd").is_some() {
            check_min_cppstd(settings, MIN_CPPSTD)?;
        }

        let minimum = settings
            .compiler
            .as_deref()
            .and_then(|compiler| self.compilers.minimum_for(compiler));

        let Some(minimum) = minimum else {
            return Ok(vec![Advisory::new(COMPILER_UNKNOWN)]);
        };

        let version = settings.compiler_version.as_deref().ok_or_else(|| {
            RecipeError::Configuration(format!(
                "compiler.version must be set for {}",
                settings.compiler.as_deref().unwrap_or_default()
            ))
        })?;
        let version = Version::parse(version).map_err(|_| RecipeError::InvalidSetting {
            key: "compiler.version".to_string(),
            reason: format!("'{}' is not a valid version", version),
        })?;

        if version < *minimum {
            return Err(RecipeError::Configuration(CXX17_UNSUPPORTED.to_string()));
        }
        Ok(Vec::new())
    }

    fn source(&self, ctx: &RecipeContext, sources: &SourceTable) -> Result<Option<PathBuf>> {
        let descriptor = sources.get(&ctx.version)?;
        let folder = &ctx.source_folder;
        std::fs::create_dir_all(folder).map_err(|e| RecipeError::io(folder, e))?;

        let archive = acquire::fetch(&descriptor.url, folder)?;
        if let Some(sha256) = &descriptor.sha256 {
            acquire::verify_sha256(&archive, sha256)?;
        }
        extract::extract(&archive, folder)?;
        std::fs::remove_file(&archive).map_err(|e| RecipeError::io(&archive, e))?;

        let normalized = find_and_rename_source(folder)?;
        match &normalized {
            Some(path) => output::detail(&format!("sources normalized to {}", path.display())),
            // package() reports the missing folder
            None => output::warning(&format!(
                "no folder containing '{}' found in {}",
                SOURCE_MARKER,
                folder.display()
            )),
        }
        Ok(normalized)
    }

    fn package(&self, ctx: &RecipeContext, destination: &Path) -> Result<Vec<PathBuf>> {
        let src = ctx.source_folder.join(SOURCE_SUBFOLDER);
        if !src.is_dir() {
            return Err(RecipeError::MissingSource(src));
        }

        let license = src.join(LICENSE_FILE);
        if !license.is_file() {
            return Err(RecipeError::io(
                license,
                std::io::Error::from(std::io::ErrorKind::NotFound),
            ));
        }

        let mut packaged = Vec::new();
        let licenses = fs_utils::copy_pattern(&src, LICENSE_FILE, &destination.join("licenses"))?;
        packaged.extend(under("licenses", licenses));

        let include = destination.join("include");
        let core = fs_utils::copy_pattern(&src.join("core"), "*.h", &include)?;
        packaged.extend(under("include", core));

        let rapidjson = fs_utils::copy_pattern(
            &src.join("archives"),
            &format!("{}/*.h", PACKAGED_ARCHIVE),
            &include,
        )?;
        packaged.extend(under("include", rapidjson));

        // TODO: package DEFERRED_ARCHIVES as separate components once per-component cpp_info is supported
        Ok(packaged)
    }

    fn package_id(&self, info: &mut PackageIdInfo) {
        info.header_only();
    }

    fn package_info(&self, settings: &Settings) -> CppInfo {
        let mut info = CppInfo {
            requires: METADATA.requires.iter().map(|r| r.to_string()).collect(),
            ..CppInfo::default()
        };

        let gcc_runtime = settings.compiler_is("gcc")
            || (settings.os_is(&Os::Linux) && settings.compiler_is("clang"));
        let old_runtime = settings
            .compiler_version
            .as_deref()
            .and_then(|v| Version::parse(v).ok())
            .is_some_and(|v| v < Version::from_major(STDCXXFS_BELOW_MAJOR));

        if gcc_runtime && old_runtime {
            info.libs = vec!["stdc++fs".to_string()];
        }
        info
    }
}
