//! Acquire helpers
//!
//! Fetch an upstream archive and verify its checksum.
//!
//! `fetch` understands `http://` and `https://` URLs as well as `file://`
//! URLs and plain local paths (for offline mirrors).

use crate::core::error::{RecipeError, Result};
use crate::core::output;
use crate::helpers::fs_utils;
use sha2::{Digest, Sha256};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

/// Default HTTP timeout in seconds
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Chunk size for streaming downloads and hashing
const CHUNK_SIZE: usize = 64 * 1024;

/// Get HTTP timeout from environment variable or use default.
/// Cached for performance (only reads env var once).
fn get_http_timeout() -> Duration {
    static TIMEOUT: OnceLock<Duration> = OnceLock::new();
    *TIMEOUT.get_or_init(|| {
        let secs = std::env::var("RECIPE_HTTP_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);
        // Clamp to reasonable range (5-300 seconds)
        Duration::from_secs(secs.clamp(5, 300))
    })
}

/// File name the archive is stored under, derived from the URL.
///
/// Query strings and fragments are dropped; an empty tail falls back to `archive`.
pub fn archive_name(url: &str) -> String {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    without_query
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty() && !s.contains(':'))
        .unwrap_or("archive")
        .to_string()
}

/// Fetch `url` into `dest_dir`, returning the path of the stored file.
///
/// # Example
/// ```ignore
/// let archive = fetch("https://example.com/v0.10.zip", Path::new("/tmp/src"))?;
/// verify_sha256(&archive, "abc123...")?;
/// ```
pub fn fetch(url: &str, dest_dir: &Path) -> Result<PathBuf> {
    let dest = dest_dir.join(archive_name(url));
    fs_utils::ensure_parent_dir(&dest)?;

    if url.starts_with("http://") || url.starts_with("https://") {
        let total = download_with_progress(url, &dest)?;
        output::detail(&format!("downloaded {} ({} bytes)", dest.display(), total));
    } else {
        let local = url.strip_prefix("file://").unwrap_or(url);
        let src = Path::new(local);
        if !src.is_file() {
            return Err(RecipeError::Download {
                url: url.to_string(),
                reason: "no such file".to_string(),
            });
        }
        std::fs::copy(src, &dest).map_err(|e| RecipeError::Download {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        output::detail(&format!("copied {}", src.display()));
    }

    Ok(dest)
}

/// Download a file with progress bar
fn download_with_progress(url: &str, dest: &Path) -> Result<u64> {
    let download_err = |reason: String| RecipeError::Download {
        url: url.to_string(),
        reason,
    };

    let pb = output::spinner(&format!("downloading {}", archive_name(url)));

    let response = ureq::get(url)
        .timeout(get_http_timeout())
        .call()
        .map_err(|e| {
            pb.finish_and_clear();
            download_err(e.to_string())
        })?;

    if let Some(len) = response
        .header("content-length")
        .and_then(|s| s.parse().ok())
    {
        output::upgrade_to_bytes(&pb, len);
    }

    let mut file = std::fs::File::create(dest).map_err(|e| RecipeError::io(dest, e))?;
    let mut reader = response.into_reader();
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut total_bytes = 0u64;

    loop {
        let n = reader
            .read(&mut buffer)
            .map_err(|e| download_err(format!("read error: {}", e)))?;
        if n == 0 {
            break;
        }
        file.write_all(&buffer[..n])
            .map_err(|e| RecipeError::io(dest, e))?;
        total_bytes += n as u64;
        pb.set_position(total_bytes);
    }

    pb.finish_and_clear();
    Ok(total_bytes)
}

/// Hex SHA-256 of a file.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut f = std::fs::File::open(path).map_err(|e| RecipeError::io(path, e))?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];
    loop {
        let n = f.read(&mut buffer).map_err(|e| RecipeError::io(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Verify a file's SHA-256 against an expected hex digest (case-insensitive).
pub fn verify_sha256(path: &Path, expected: &str) -> Result<()> {
    let actual = sha256_file(path)?;
    let expected = expected.trim().to_lowercase();
    if actual != expected {
        return Err(RecipeError::ChecksumMismatch {
            path: path.to_path_buf(),
            expected,
            actual,
        });
    }
    output::detail(&format!("sha256 ok for {}", path.display()));
    Ok(())
}
