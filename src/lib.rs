//! Package recipe executor for BitSerializer
//!
//! BitSerializer is a header-only C++17 serialization library. This crate does
//! not serialize anything: it packages the upstream headers the way a package
//! manager recipe would. A [`Recipe`] exposes five lifecycle hooks and a
//! [`RecipeExecutor`] plays the host, calling them in order:
//!
//! 1. `configure` - reject compilers and language standards that cannot build C++17
//! 2. `source` - fetch and extract the upstream archive, normalize its top folder
//! 3. `package` - copy the license and the selected headers into the package tree
//! 4. `package_info` - declare link libraries for consumers
//! 5. `package_id` - collapse the binary identity (header-only)
//!
//! # Example
//!
//! ```no_run
//! use bitserializer_recipe::{BitserializerRecipe, Layout, RecipeExecutor, Settings, SourceTable};
//! use std::path::Path;
//!
//! let settings = Settings::from_pairs(["os=Linux", "compiler=gcc", "compiler.version=8"])?;
//! let sources = SourceTable::read(Path::new("sources.toml"))?;
//! let layout = Layout::under(Path::new("/tmp/build/bitserializer/0.10"));
//!
//! let executor = RecipeExecutor::new(BitserializerRecipe::new(), settings, "0.10", layout);
//! let manifest = executor.create(&sources)?;
//! assert_eq!(manifest.cpp_info.libs, vec!["stdc++fs"]);
//! # Ok::<(), bitserializer_recipe::RecipeError>(())
//! ```
//!
//! # Package layout
//!
//! ```text
//! <package_folder>/
//!   licenses/license.txt
//!   include/**/*.h
//!   package.toml
//! ```

pub mod core;
pub mod executor;
pub mod helpers;
pub mod recipe;

pub use crate::core::error::{RecipeError, Result};
pub use crate::core::manifest::{CppInfo, PackageIdInfo, PackageManifest};
pub use crate::core::output;
pub use crate::core::settings::{Os, Settings};
pub use crate::core::sources::{SourceDescriptor, SourceTable};
pub use crate::core::version::Version;
pub use crate::executor::{Layout, RecipeExecutor};
pub use crate::recipe::{Advisory, BitserializerRecipe, Recipe, RecipeContext, RecipeMetadata, SupportedCompilers};
