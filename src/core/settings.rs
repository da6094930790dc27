//! Build target settings
//!
//! Settings describe the consumer's build target: operating system, compiler,
//! compiler version and language standard. They are supplied by the host and
//! never mutated by recipe hooks.
//!
//! Settings come from `key=value` pairs (command line) or a TOML profile:
//!
//! ```toml
//! [settings]
//! os = "Linux"
//! compiler = "gcc"
//! "compiler.version" = "8"
//! "compiler.cppstd" = "17"
//! ```

use crate::core::error::{RecipeError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Keys accepted by [`Settings::set`].
pub const KNOWN_KEYS: &[&str] = &[
    "os",
    "arch",
    "build_type",
    "compiler",
    "compiler.version",
    "compiler.cppstd",
    "compiler.libcxx",
];

/// Target operating system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Os {
    Linux,
    Windows,
    Macos,
    FreeBSD,
    Other(String),
}

impl Os {
    /// Parse an OS name, case-insensitively for the well-known ones.
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "linux" => Self::Linux,
            "windows" => Self::Windows,
            "macos" => Self::Macos,
            "freebsd" => Self::FreeBSD,
            _ => Self::Other(name.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Linux => "Linux",
            Self::Windows => "Windows",
            Self::Macos => "Macos",
            Self::FreeBSD => "FreeBSD",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only view of the target settings.
///
/// Every field is optional; `None` means the host did not set it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub os: Option<Os>,
    pub arch: Option<String>,
    pub build_type: Option<String>,
    pub compiler: Option<String>,
    pub compiler_version: Option<String>,
    pub cppstd: Option<String>,
    pub libcxx: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Profile {
    #[serde(default)]
    settings: BTreeMap<String, String>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build settings from `key=value` pairs.
    ///
    /// # Example
    /// ```
    /// use bitserializer_recipe::Settings;
    ///
    /// let s = Settings::from_pairs(["compiler=gcc", "compiler.version=9"]).unwrap();
    /// assert_eq!(s.get_safe("compiler.version").as_deref(), Some("9"));
    /// ```
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut settings = Self::new();
        settings.apply_pairs(pairs)?;
        Ok(settings)
    }

    /// Apply `key=value` pairs on top of the current values.
    pub fn apply_pairs<I, S>(&mut self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair.split_once('=').ok_or_else(|| RecipeError::InvalidSetting {
                key: pair.to_string(),
                reason: "expected key=value".to_string(),
            })?;
            self.set(key.trim(), value.trim())?;
        }
        Ok(())
    }

    /// Parse the `[settings]` table of a TOML profile.
    pub fn from_profile_str(content: &str) -> Result<Self> {
        let profile: Profile = toml::from_str(content)
            .map_err(|e| RecipeError::Manifest(format!("invalid profile: {}", e)))?;
        let mut settings = Self::new();
        for (key, value) in &profile.settings {
            settings.set(key, value)?;
        }
        Ok(settings)
    }

    /// Read a TOML profile from disk.
    pub fn read_profile(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RecipeError::io(path, e))?;
        Self::from_profile_str(&content)
    }

    /// Set one dotted key. Empty values unset the key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = (!value.is_empty()).then(|| value.to_string());
        match key {
            "os" => self.os = value.map(|v| Os::parse(&v)),
            "arch" => self.arch = value,
            "build_type" => self.build_type = value,
            "compiler" => self.compiler = value,
            "compiler.version" => self.compiler_version = value,
            "compiler.cppstd" => self.cppstd = value,
            "compiler.libcxx" => self.libcxx = value,
            _ => {
                return Err(RecipeError::InvalidSetting {
                    key: key.to_string(),
                    reason: format!("unknown setting (expected one of: {})", KNOWN_KEYS.join(", ")),
                });
            }
        }
        Ok(())
    }

    /// Look up a dotted key, returning `None` when unset or unknown.
    pub fn get_safe(&self, key: &str) -> Option<String> {
        match key {
            "os" => self.os.as_ref().map(|o| o.as_str().to_string()),
            "arch" => self.arch.clone(),
            "build_type" => self.build_type.clone(),
            "compiler" => self.compiler.clone(),
            "compiler.version" => self.compiler_version.clone(),
            "compiler.cppstd" => self.cppstd.clone(),
            "compiler.libcxx" => self.libcxx.clone(),
            _ => None,
        }
    }

    /// All set keys with their values, in stable order.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        KNOWN_KEYS
            .iter()
            .filter_map(|key| self.get_safe(key).map(|v| (key.to_string(), v)))
            .collect()
    }

    pub fn compiler_is(&self, name: &str) -> bool {
        self.compiler.as_deref() == Some(name)
    }

    pub fn os_is(&self, os: &Os) -> bool {
        self.os.as_ref() == Some(os)
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = KNOWN_KEYS
            .iter()
            .filter_map(|key| self.get_safe(key).map(|v| format!("{}={}", key, v)))
            .collect();
        f.write_str(&pairs.join(" "))
    }
}
