//! Recipe error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while running recipe hooks.
#[derive(Error, Debug)]
pub enum RecipeError {
    /// The toolchain or language standard cannot build this package.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("invalid setting '{key}': {reason}")]
    InvalidSetting { key: String, reason: String },

    #[error("no source registered for version '{0}'")]
    UnknownVersion(String),

    #[error("download failed for {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("sha256 verification failed for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("unsupported archive format: {0}")]
    UnsupportedFormat(String),

    #[error("extraction failed for {archive}: {reason}")]
    Extract { archive: PathBuf, reason: String },

    /// The normalized source folder does not exist when packaging.
    #[error("source folder not found: {0}")]
    MissingSource(PathBuf),

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("manifest error: {0}")]
    Manifest(String),
}

impl RecipeError {
    /// Wrap an [`std::io::Error`] with the path it happened at.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error belongs to the IO class (fetch, extract, copy).
    ///
    /// Configuration failures and malformed input are not IO errors.
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            Self::Download { .. }
                | Self::ChecksumMismatch { .. }
                | Self::UnsupportedFormat(_)
                | Self::Extract { .. }
                | Self::MissingSource(_)
                | Self::Io { .. }
        )
    }
}

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, RecipeError>;
