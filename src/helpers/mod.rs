//! Helpers used by recipe hooks
//!
//! ## Categories
//!
//! - **acquire**: fetch(url, dest), verify_sha256(path, hash)
//! - **extract**: extract(archive, dest)
//! - **fs_utils**: copy_pattern(src, pattern, dest), ensure_parent_dir

pub mod acquire;
pub mod extract;
pub mod fs_utils;
