//! Recipe CLI - package BitSerializer for a given build target
//!
//! Usage:
//!   recipe create --version <v>          Run the whole lifecycle
//!   recipe configure                     Check settings only
//!   recipe source --version <v>          Fetch and normalize sources
//!   recipe package                       Copy headers into a package folder
//!   recipe info                          Show link metadata for the settings
//!   recipe id                            Show the package id
//!   recipe inspect                       Show recipe metadata
//!
//! Settings come from `--profile <file>` and `-s key=value` (the latter wins).

use anyhow::{Context, Result};
use bitserializer_recipe::{
    BitserializerRecipe, Layout, Recipe, RecipeExecutor, Settings, SourceTable, output,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Default build directory (XDG compliant)
fn default_build_dir(name: &str, version: &str) -> PathBuf {
    let cache_home = std::env::var("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs::cache_dir().unwrap_or_else(|| PathBuf::from(".cache")));

    cache_home.join("recipe").join(name).join(version)
}

#[derive(Parser)]
#[command(name = "recipe")]
#[command(about = "Package recipe executor for the BitSerializer header-only library")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Setting as key=value (repeatable), e.g. -s compiler.version=9
    #[arg(short = 's', long = "setting", global = true)]
    settings: Vec<String>,

    /// TOML profile with a [settings] table
    #[arg(long, global = true, env = "RECIPE_PROFILE")]
    profile: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run configure, source, package, package_info and package_id
    Create {
        /// Upstream version to package
        #[arg(long)]
        version: String,

        /// Source table (TOML)
        #[arg(long, env = "RECIPE_SOURCES", default_value = "sources.toml")]
        sources: PathBuf,

        /// Build directory (defaults to the user cache dir)
        #[arg(short, long, env = "RECIPE_BUILD_DIR")]
        build_dir: Option<PathBuf>,

        /// Package folder (defaults to <build_dir>/package)
        #[arg(long)]
        package_folder: Option<PathBuf>,
    },

    /// Validate settings against the recipe
    Configure,

    /// Fetch and normalize sources
    Source {
        #[arg(long)]
        version: String,

        #[arg(long, env = "RECIPE_SOURCES", default_value = "sources.toml")]
        sources: PathBuf,

        #[arg(long)]
        source_folder: PathBuf,
    },

    /// Copy license and headers into a package folder
    Package {
        #[arg(long)]
        source_folder: PathBuf,

        #[arg(long)]
        package_folder: PathBuf,
    },

    /// Show link metadata for the settings
    Info {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the package id for the settings
    Id,

    /// Show recipe metadata
    Inspect {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.profile.as_deref(), &cli.settings)?;
    let recipe = BitserializerRecipe::new();

    match cli.command {
        Commands::Create {
            version,
            sources,
            build_dir,
            package_folder,
        } => {
            let sources = read_sources(&sources)?;
            let build_dir =
                build_dir.unwrap_or_else(|| default_build_dir(recipe.metadata().name, &version));
            let mut layout = Layout::under(&build_dir);
            if let Some(folder) = package_folder {
                layout.package_folder = folder;
            }

            let executor = RecipeExecutor::new(recipe, settings, version, layout);
            let manifest = executor.create(&sources)?;
            output::field("Package", &executor.package_folder().display().to_string());
            output::field("Package ID", &manifest.package_id);
        }

        Commands::Configure => {
            let executor = executor_for(recipe, settings, "", PathBuf::new(), PathBuf::new());
            executor.configure()?;
            output::success("configuration is supported");
        }

        Commands::Source {
            version,
            sources,
            source_folder,
        } => {
            let sources = read_sources(&sources)?;
            let executor = executor_for(recipe, settings, &version, source_folder, PathBuf::new());
            output::action(&format!("Fetching sources for {}", version));
            executor.source(&sources)?;
            output::success(&format!(
                "sources ready in {}",
                executor.source_folder().display()
            ));
        }

        Commands::Package {
            source_folder,
            package_folder,
        } => {
            let executor = executor_for(recipe, settings, "", source_folder, package_folder);
            output::action("Packaging");
            let files = executor.package()?;
            for file in &files {
                output::detail(&file.display().to_string());
            }
            output::success(&format!("{} files packaged", files.len()));
        }

        Commands::Info { json } => {
            let info = recipe.package_info(&settings);
            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                output::field("libs", &info.libs.join(", "));
                output::field("includedirs", &info.includedirs.join(", "));
                output::field("requires", &info.requires.join(", "));
            }
        }

        Commands::Id => {
            let executor = executor_for(recipe, settings, "", PathBuf::new(), PathBuf::new());
            println!("{}", executor.package_id());
        }

        Commands::Inspect { json } => {
            let meta = recipe.metadata();
            if json {
                println!("{}", serde_json::to_string_pretty(meta)?);
            } else {
                output::field("Name", meta.name);
                output::field("Description", meta.description);
                output::field("License", meta.license);
                output::field("Homepage", meta.homepage);
                output::field("Topics", &meta.topics.join(", "));
                output::field("Settings", &meta.settings.join(", "));
                output::field("Requires", &meta.requires.join(", "));
                let compilers: Vec<String> = recipe
                    .compilers()
                    .iter()
                    .map(|(name, min)| format!("{} >= {}", name, min))
                    .collect();
                output::field("Compilers", &compilers.join(", "));
            }
        }
    }

    Ok(())
}

/// Profile first, then `key=value` overrides
fn load_settings(profile: Option<&Path>, pairs: &[String]) -> Result<Settings> {
    let mut settings = match profile {
        Some(path) => Settings::read_profile(path)
            .with_context(|| format!("Failed to load profile: {}", path.display()))?,
        None => Settings::new(),
    };
    settings
        .apply_pairs(pairs)
        .context("Failed to parse settings")?;
    Ok(settings)
}

fn read_sources(path: &Path) -> Result<SourceTable> {
    SourceTable::read(path)
        .with_context(|| format!("Failed to load source table: {}", path.display()))
}

fn executor_for(
    recipe: BitserializerRecipe,
    settings: Settings,
    version: &str,
    source_folder: PathBuf,
    package_folder: PathBuf,
) -> RecipeExecutor<BitserializerRecipe> {
    let layout = Layout {
        source_folder,
        package_folder,
    };
    RecipeExecutor::new(recipe, settings, version, layout)
}
