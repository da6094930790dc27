//! Archive extraction
//!
//! Native extraction of tar.gz, tar.xz, tar.bz2, tar.zst, tar and zip
//! archives. Tar entries that would land outside the destination (absolute
//! paths, `..`, symlink swaps, escaping link targets) are rejected; zip
//! entries with unsafe names are skipped.

use crate::core::error::{RecipeError, Result};
use crate::core::output;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Component, Path, PathBuf};

/// Supported archive formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    TarXz,
    TarBz2,
    TarZst,
    Tar,
    Zip,
}

impl ArchiveFormat {
    /// Detect archive format from filename extension
    pub fn detect(archive: &str) -> Option<Self> {
        let path = archive.to_lowercase();
        if path.ends_with(".tar.gz") || path.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if path.ends_with(".tar.xz") || path.ends_with(".txz") {
            Some(Self::TarXz)
        } else if path.ends_with(".tar.bz2") || path.ends_with(".tbz2") {
            Some(Self::TarBz2)
        } else if path.ends_with(".tar.zst") || path.ends_with(".tzst") {
            Some(Self::TarZst)
        } else if path.ends_with(".zip") {
            Some(Self::Zip)
        } else if path.ends_with(".tar") {
            Some(Self::Tar)
        } else {
            None
        }
    }
}

fn extract_err(archive: &Path, reason: impl Into<String>) -> RecipeError {
    RecipeError::Extract {
        archive: archive.to_path_buf(),
        reason: reason.into(),
    }
}

fn normalize_lexical(path: &Path) -> PathBuf {
    // Lexical only: link targets are validated without following symlinks.
    let mut out = PathBuf::new();
    let mut has_root = false;

    for c in path.components() {
        match c {
            Component::Prefix(p) => {
                out.clear();
                out.push(p.as_os_str());
                has_root = true;
            }
            Component::RootDir => {
                out.push(Component::RootDir.as_os_str());
                has_root = true;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = out
                    .components()
                    .next_back()
                    .is_some_and(|last| matches!(last, Component::Normal(_)));
                if popped {
                    out.pop();
                } else if !has_root {
                    out.push("..");
                }
            }
            Component::Normal(seg) => out.push(seg),
        }
    }

    out
}

fn ensure_no_symlink_components(dest: &Path, full_path: &Path) -> std::result::Result<(), String> {
    let rel = full_path
        .strip_prefix(dest)
        .map_err(|_| format!("path outside destination: {}", full_path.display()))?;

    let mut cur = dest.to_path_buf();
    for comp in rel.components() {
        cur.push(comp);
        if let Ok(md) = std::fs::symlink_metadata(&cur)
            && md.file_type().is_symlink()
        {
            return Err(format!("symlink in path component: {}", cur.display()));
        }
    }

    Ok(())
}

fn ensure_link_target_within_dest(
    dest: &Path,
    link_parent: &Path,
    link_name: &Path,
) -> std::result::Result<(), String> {
    if link_name.is_absolute()
        || link_name
            .components()
            .any(|c| matches!(c, Component::Prefix(_) | Component::RootDir))
    {
        return Err(format!(
            "unsafe link target (absolute): {}",
            link_name.display()
        ));
    }

    let candidate = normalize_lexical(&link_parent.join(link_name));
    let norm_dest = normalize_lexical(dest);
    if candidate.strip_prefix(&norm_dest).is_err() {
        return Err(format!(
            "unsafe link target (escapes dest): {} -> {}",
            link_parent.display(),
            link_name.display()
        ));
    }

    Ok(())
}

/// Unpack a tar stream with path safety checks
fn unpack_tar<R: Read>(reader: R, dest: &Path) -> std::result::Result<(), String> {
    let mut archive = tar::Archive::new(reader);

    for entry in archive.entries().map_err(|e| format!("read error: {}", e))? {
        let mut entry = entry.map_err(|e| format!("entry error: {}", e))?;
        let path = entry
            .path()
            .map_err(|e| format!("path error: {}", e))?
            .into_owned();

        if path.is_absolute() || path.components().any(|c| c == Component::ParentDir) {
            return Err(format!("unsafe path: {}", path.display()));
        }

        // Some archives contain a "." entry
        if path.as_os_str().is_empty() || path == Path::new(".") {
            continue;
        }

        let full_path = dest.join(&path);
        ensure_no_symlink_components(dest, &full_path)?;

        let entry_type = entry.header().entry_type();
        if entry_type == tar::EntryType::Symlink || entry_type == tar::EntryType::Link {
            let link_name = entry
                .link_name()
                .map_err(|e| format!("link_name error: {}", e))?
                .ok_or_else(|| format!("link without target: {}", path.display()))?;
            let link_parent = full_path.parent().unwrap_or(dest);
            ensure_link_target_within_dest(dest, link_parent, &link_name)?;
        }

        if let Some(parent) = full_path.parent() {
            if parent.starts_with(dest) {
                ensure_no_symlink_components(dest, parent)?;
            }
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("cannot create directory {}: {}", parent.display(), e))?;
        }

        entry
            .unpack(&full_path)
            .map_err(|e| format!("unpack error for {}: {}", path.display(), e))?;
    }

    Ok(())
}

fn extract_archive(archive_path: &Path, dest: &Path, format: ArchiveFormat) -> Result<()> {
    let file = File::open(archive_path).map_err(|e| RecipeError::io(archive_path, e))?;
    let reader = BufReader::new(file);

    let result = match format {
        ArchiveFormat::TarGz => unpack_tar(flate2::read::GzDecoder::new(reader), dest),
        ArchiveFormat::TarXz => unpack_tar(xz2::read::XzDecoder::new(reader), dest),
        ArchiveFormat::TarBz2 => unpack_tar(bzip2::read::BzDecoder::new(reader), dest),
        ArchiveFormat::TarZst => {
            let decoder = zstd::stream::read::Decoder::new(reader)
                .map_err(|e| extract_err(archive_path, format!("zstd init error: {}", e)))?;
            unpack_tar(decoder, dest)
        }
        ArchiveFormat::Tar => unpack_tar(reader, dest),
        ArchiveFormat::Zip => return extract_zip(archive_path, dest),
    };

    result.map_err(|reason| extract_err(archive_path, reason))
}

fn extract_zip(archive_path: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive_path).map_err(|e| RecipeError::io(archive_path, e))?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| extract_err(archive_path, format!("zip read error: {}", e)))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| extract_err(archive_path, format!("zip entry error: {}", e)))?;

        let Some(outpath) = entry.enclosed_name().map(|p| dest.join(p)) else {
            continue;
        };

        if entry.is_dir() {
            std::fs::create_dir_all(&outpath).map_err(|e| RecipeError::io(&outpath, e))?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            std::fs::create_dir_all(parent).map_err(|e| RecipeError::io(parent, e))?;
        }
        let mut outfile = File::create(&outpath).map_err(|e| RecipeError::io(&outpath, e))?;
        std::io::copy(&mut entry, &mut outfile).map_err(|e| RecipeError::io(&outpath, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode)).ok();
            }
        }
    }

    Ok(())
}

/// Extract an archive into `dest`, detecting the format from its name.
pub fn extract(archive: &Path, dest: &Path) -> Result<()> {
    let name = archive.to_string_lossy();
    let format = ArchiveFormat::detect(&name)
        .ok_or_else(|| RecipeError::UnsupportedFormat(name.to_string()))?;
    extract_with_format(archive, dest, format)
}

/// Extract an archive into `dest` with an explicit format.
pub fn extract_with_format(archive: &Path, dest: &Path, format: ArchiveFormat) -> Result<()> {
    std::fs::create_dir_all(dest).map_err(|e| RecipeError::io(dest, e))?;

    let filename = archive
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "archive".to_string());

    let pb = output::spinner(&format!("extracting {}", filename));
    let result = extract_archive(archive, dest, format);
    pb.finish_and_clear();

    result?;
    output::detail(&format!("extracted {} to {}", filename, dest.display()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn gz_with(entries: &[(&str, &[u8])], archive_path: &Path) {
        let file = File::create(archive_path).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, content) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *content).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(ArchiveFormat::detect("foo.tar.gz"), Some(ArchiveFormat::TarGz));
        assert_eq!(ArchiveFormat::detect("foo.TGZ"), Some(ArchiveFormat::TarGz));
        assert_eq!(ArchiveFormat::detect("foo.tar.xz"), Some(ArchiveFormat::TarXz));
        assert_eq!(ArchiveFormat::detect("foo.tbz2"), Some(ArchiveFormat::TarBz2));
        assert_eq!(ArchiveFormat::detect("foo.tar.zst"), Some(ArchiveFormat::TarZst));
        assert_eq!(ArchiveFormat::detect("foo.zip"), Some(ArchiveFormat::Zip));
        assert_eq!(ArchiveFormat::detect("foo.tar"), Some(ArchiveFormat::Tar));
        assert_eq!(ArchiveFormat::detect("foo.rar"), None);
    }

    #[test]
    fn test_unsupported_format() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract(&dir.path().join("src.rar"), dir.path()).unwrap_err();
        assert!(matches!(err, RecipeError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_extract_tar_gz_nested() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("src.tar.gz");
        gz_with(&[("top/core/a.h", b"// a")], &archive);

        let out = dir.path().join("out");
        extract(&archive, &out).unwrap();
        assert_eq!(std::fs::read_to_string(out.join("top/core/a.h")).unwrap(), "// a");
    }

    #[test]
    fn test_extract_zip_nested() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("src.zip");

        let file = File::create(&archive).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        zip.add_directory("top/core/", options).unwrap();
        zip.start_file("top/core/a.h", options).unwrap();
        zip.write_all(b"// zip").unwrap();
        zip.finish().unwrap();

        let out = dir.path().join("out");
        extract(&archive, &out).unwrap();
        assert_eq!(std::fs::read_to_string(out.join("top/core/a.h")).unwrap(), "// zip");
    }

    #[test]
    fn test_corrupt_zip_is_extract_error() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("broken.zip");
        std::fs::write(&archive, b"not a zip").unwrap();

        let err = extract(&archive, &dir.path().join("out")).unwrap_err();
        assert!(matches!(err, RecipeError::Extract { .. }));
        assert!(err.is_io());
    }

    #[test]
    fn test_extract_tar_blocks_symlink_escape() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("escape.tar.gz");
        let out = dir.path().join("out");

        let file = File::create(&archive).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);

        let mut link_header = tar::Header::new_gnu();
        link_header.set_entry_type(tar::EntryType::Symlink);
        link_header.set_size(0);
        link_header.set_mode(0o777);
        link_header.set_link_name("/").unwrap();
        link_header.set_cksum();
        builder
            .append_data(&mut link_header, "a", std::io::empty())
            .unwrap();

        let content = b"pwned";
        let mut file_header = tar::Header::new_gnu();
        file_header.set_size(content.len() as u64);
        file_header.set_mode(0o644);
        file_header.set_cksum();
        builder
            .append_data(&mut file_header, "a/evil.txt", &content[..])
            .unwrap();
        builder.into_inner().unwrap().finish().unwrap();

        let err = extract(&archive, &out).unwrap_err();
        let msg = err.to_string();
        assert!(
            msg.contains("unsafe link target") || msg.contains("symlink"),
            "expected link/symlink safety error, got: {msg}"
        );
        assert!(!out.join("a/evil.txt").exists());
    }
}
