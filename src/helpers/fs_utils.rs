//! Filesystem helpers for packaging
//!
//! Pattern-based copying from a source tree into a package tree.

use crate::core::error::{RecipeError, Result};
use crate::core::output;
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// `*` also crosses directory separators, so `*.h` matches at any depth.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Ensure a file's parent directory exists.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| RecipeError::io(parent, e))?;
    }
    Ok(())
}

/// Copy every file under `src` whose relative path matches `pattern` into
/// `dest`, keeping the relative path.
///
/// Files that already exist in `dest` are left alone but still reported.
/// Returns the relative paths of every matched file now present in `dest`,
/// sorted. A missing `src` is
/// [`RecipeError::MissingSource`].
///
/// # Example
/// ```ignore
/// // src/core/bitserializer/bit_serializer.h -> pkg/include/bitserializer/bit_serializer.h
/// copy_pattern(&src.join("core"), "*.h", &pkg.join("include"))?;
/// ```
pub fn copy_pattern(src: &Path, pattern: &str, dest: &Path) -> Result<Vec<PathBuf>> {
    if !src.is_dir() {
        return Err(RecipeError::MissingSource(src.to_path_buf()));
    }

    let matcher = Pattern::new(pattern).map_err(|e| RecipeError::InvalidSetting {
        key: "pattern".to_string(),
        reason: format!("invalid pattern '{}': {}", pattern, e),
    })?;

    let mut matched = Vec::new();
    let mut copied = 0usize;
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            RecipeError::io(path, e.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|_| RecipeError::MissingSource(entry.path().to_path_buf()))?;
        if !matcher.matches_path_with(rel, MATCH_OPTIONS) {
            continue;
        }

        let target = dest.join(rel);
        if target.exists() {
            output::detail(&format!("keep existing {}", target.display()));
        } else {
            ensure_parent_dir(&target)?;
            std::fs::copy(entry.path(), &target).map_err(|e| RecipeError::io(&target, e))?;
            copied += 1;
        }
        matched.push(rel.to_path_buf());
    }

    output::detail(&format!(
        "copied {} of {} file(s) matching {} from {}",
        copied,
        matched.len(),
        pattern,
        src.display()
    ));
    Ok(matched)
}
