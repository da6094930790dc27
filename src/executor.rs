//! Host side of the recipe lifecycle
//!
//! The executor owns the settings and folder layout of one build and calls
//! recipe hooks in lifecycle order:
//!
//! 1. configure() - abort early on unsupported toolchains
//! 2. source() - fetch into the source folder
//! 3. package() - copy into the package folder
//! 4. package_info() - link metadata
//! 5. package_id() - binary identity
//!
//! The filesystem is the only channel between hooks: `source` leaves the
//! normalized folder behind and `package` reads it.

use crate::core::error::Result;
use crate::core::manifest::{CppInfo, MANIFEST_FILE, PackageIdInfo, PackageManifest};
use crate::core::output;
use crate::core::settings::Settings;
use crate::core::sources::SourceTable;
use crate::recipe::{Recipe, RecipeContext};
use std::path::{Path, PathBuf};

/// Folders used by one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub source_folder: PathBuf,
    pub package_folder: PathBuf,
}

impl Layout {
    /// `<root>/source` and `<root>/package`.
    pub fn under(root: &Path) -> Self {
        Self {
            source_folder: root.join("source"),
            package_folder: root.join("package"),
        }
    }
}

/// Runs recipe hooks for one `(settings, version)` pair.
pub struct RecipeExecutor<R: Recipe> {
    recipe: R,
    ctx: RecipeContext,
    package_folder: PathBuf,
}

impl<R: Recipe> RecipeExecutor<R> {
    pub fn new(recipe: R, settings: Settings, version: impl Into<String>, layout: Layout) -> Self {
        Self {
            recipe,
            ctx: RecipeContext {
                settings,
                version: version.into(),
                source_folder: layout.source_folder,
            },
            package_folder: layout.package_folder,
        }
    }

    pub fn source_folder(&self) -> &Path {
        &self.ctx.source_folder
    }

    pub fn package_folder(&self) -> &Path {
        &self.package_folder
    }

    /// Validate the settings, printing advisories as warnings.
    pub fn configure(&self) -> Result<()> {
        for advisory in self.recipe.configure(&self.ctx)? {
            output::warning(&advisory.to_string());
        }
        Ok(())
    }

    /// Fetch and normalize sources.
    pub fn source(&self, sources: &SourceTable) -> Result<Option<PathBuf>> {
        self.recipe.source(&self.ctx, sources)
    }

    /// Copy files into the package folder.
    pub fn package(&self) -> Result<Vec<PathBuf>> {
        self.recipe.package(&self.ctx, &self.package_folder)
    }

    pub fn package_info(&self) -> CppInfo {
        self.recipe.package_info(&self.ctx.settings)
    }

    /// Binary identity of the package for the current settings.
    pub fn package_id(&self) -> String {
        let mut info = PackageIdInfo::new(&self.ctx.settings, self.recipe.metadata().requires);
        self.recipe.package_id(&mut info);
        info.package_id()
    }

    /// Run the whole lifecycle and write `package.toml` into the package folder.
    ///
    /// A configure failure returns before anything is downloaded. Files that
    /// were already packaged stay in place when a later step fails.
    pub fn create(&self, sources: &SourceTable) -> Result<PackageManifest> {
        let name = self.recipe.metadata().name;
        output::action(&format!("Creating {}/{}", name, self.ctx.version));
        if !self.ctx.settings.to_map().is_empty() {
            output::detail(&format!("settings: {}", self.ctx.settings));
        }

        output::sub_action("configure");
        self.configure()?;

        output::sub_action("source");
        self.source(sources)?;

        output::sub_action("package");
        let files = self.package()?;

        output::sub_action("package_info");
        let cpp_info = self.package_info();

        output::sub_action("package_id");
        let package_id = self.package_id();
        output::detail(&format!("package id {}", package_id));

        let manifest = PackageManifest {
            name: name.to_string(),
            version: self.ctx.version.clone(),
            package_id,
            files: files
                .iter()
                .map(|f| f.to_string_lossy().replace('\\', "/"))
                .collect(),
            cpp_info,
            settings: self.ctx.settings.to_map(),
        };
        manifest.write(&self.package_folder.join(MANIFEST_FILE))?;

        output::success(&format!(
            "{}/{} packaged ({} files)",
            name,
            self.ctx.version,
            manifest.files.len()
        ));
        Ok(manifest)
    }
}
