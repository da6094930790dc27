//! C++ language standard checks

use crate::core::error::{RecipeError, Result};
use crate::core::settings::Settings;

/// Convert a `compiler.cppstd` value to a comparable year.
///
/// `gnu` variants count as their ISO level; `98` sorts below `11`.
fn cppstd_year(cppstd: &str) -> Option<u32> {
    let level = cppstd.strip_prefix("gnu").unwrap_or(cppstd);
    // Pre-release spellings of C++20
    if level == "2a" {
        return Some(2020);
    }
    let level: u32 = level.parse().ok()?;
    match level {
        98 => Some(1998),
        0..=97 => Some(2000 + level),
        _ => None,
    }
}

/// Fail unless the settings' `compiler.cppstd` is at least `minimum`.
///
/// Unset `compiler.cppstd` passes; callers decide whether to check at all.
pub fn check_min_cppstd(settings: &Settings, minimum: &str) -> Result<()> {
    let Some(current) = settings.cppstd.as_deref() else {
        return Ok(());
    };

    let required = cppstd_year(minimum).ok_or_else(|| RecipeError::InvalidSetting {
        key: "compiler.cppstd".to_string(),
        reason: format!("'{}' is not a C++ standard", minimum),
    })?;
    let actual = cppstd_year(current).ok_or_else(|| RecipeError::InvalidSetting {
        key: "compiler.cppstd".to_string(),
        reason: format!("'{}' is not a C++ standard", current),
    })?;

    if actual < required {
        return Err(RecipeError::Configuration(format!(
            "Current cppstd ({}) is lower than the required C++ standard ({}).",
            current, minimum
        )));
    }
    Ok(())
}
