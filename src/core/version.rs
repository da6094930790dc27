//! Loose compiler version comparison
//!
//! Compiler versions in settings are rarely full semver: `"8"`, `"15"`,
//! `"9.3"` and `"11.4.0"` are all common. They are padded to `X.Y.Z` before
//! parsing so that `"15" == "15.0"` and `"8.3" < "9"`.
//!
//! ```
//! use bitserializer_recipe::Version;
//!
//! let v = Version::parse("8.3").unwrap();
//! assert!(v < Version::parse("9").unwrap());
//! assert!(v >= Version::parse("8").unwrap());
//! ```

use crate::core::error::{RecipeError, Result};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A numeric version with semantic ordering.
///
/// Equality and ordering ignore the original spelling: `"15"` equals `"15.0.0"`.
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    parsed: semver::Version,
}

impl Version {
    /// Parse a loose version string.
    ///
    /// Components beyond the third are ignored (`"19.29.30133.0"` is `19.29.30133`).
    /// Anything after a `-` or `+` is treated as a semver pre-release/build suffix.
    pub fn parse(version: &str) -> Result<Self> {
        let raw = version.trim();
        let padded = pad_version(raw.trim_start_matches('v'));
        let parsed = semver::Version::parse(&padded).map_err(|e| RecipeError::InvalidSetting {
            key: "version".to_string(),
            reason: format!("'{}' is not a valid version: {}", raw, e),
        })?;
        Ok(Self {
            raw: raw.to_string(),
            parsed,
        })
    }

    /// A bare major version such as `9`.
    pub fn from_major(major: u64) -> Self {
        Self {
            raw: major.to_string(),
            parsed: semver::Version::new(major, 0, 0),
        }
    }

    /// Major component.
    pub fn major(&self) -> u64 {
        self.parsed.major
    }

    /// The version as it was written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// Pad a version string to be semver-compatible (X.Y.Z)
fn pad_version(version: &str) -> String {
    let (core, suffix) = match version.find(['-', '+']) {
        Some(idx) => version.split_at(idx),
        None => (version, ""),
    };
    let parts: Vec<&str> = core.split('.').collect();
    let core = match parts.len() {
        1 => format!("{}.0.0", parts[0]),
        2 => format!("{}.{}.0", parts[0], parts[1]),
        _ => parts[..3].join("."),
    };
    format!("{}{}", core, suffix)
}

impl FromStr for Version {
    type Err = RecipeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.parsed == other.parsed
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parsed.cmp(&other.parsed)
    }
}
