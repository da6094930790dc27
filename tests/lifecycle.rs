//! End-to-end lifecycle tests
//!
//! Each test builds a local archive shaped like the upstream BitBucket
//! download (`<owner>-bitserializer-<hash>/...`) and runs the executor
//! against a `file://` source table, so no network is needed.

use bitserializer_recipe::helpers::acquire::sha256_file;
use bitserializer_recipe::recipe::{DEFERRED_ARCHIVES, SOURCE_SUBFOLDER};
use bitserializer_recipe::{
    BitserializerRecipe, Layout, PackageManifest, RecipeError, RecipeExecutor, Settings,
    SourceDescriptor, SourceTable,
};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const TOP: &str = "Pavel_Kisliak-bitserializer-5c7d3a1e9b02";

const CORE_HEADERS: &[&str] = &[
    "core/bitserializer/bit_serializer.h",
    "core/bitserializer/conversion_detail/convert_utf.h",
    "core/bitserializer/serialization_detail/archive_base.h",
];

const RAPIDJSON_HEADERS: &[&str] = &["archives/bitserializer_rapidjson/rapidjson_archive.h"];

const OTHER_ARCHIVE_HEADERS: &[&str] = &[
    "archives/bitserializer_cpprest_json/cpprest_json_archive.h",
    "archives/bitserializer_pugixml/pugixml_archive.h",
    "archives/bitserializer_rapidyaml/rapidyaml_archive.h",
];

/// Files in the upstream archive, relative to its top folder
fn upstream_files() -> Vec<(String, String)> {
    let mut files = vec![
        ("license.txt".to_string(), "MIT License".to_string()),
        ("README.md".to_string(), "# BitSerializer".to_string()),
        ("core/CMakeLists.txt".to_string(), "# cmake".to_string()),
    ];
    for header in CORE_HEADERS
        .iter()
        .chain(RAPIDJSON_HEADERS)
        .chain(OTHER_ARCHIVE_HEADERS)
    {
        files.push((header.to_string(), format!("// {}", header)));
    }
    files
}

fn write_zip(path: &Path, top: &str) {
    let file = File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    for (name, content) in upstream_files() {
        zip.start_file(format!("{}/{}", top, name), options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

fn write_tar_gz(path: &Path, top: &str) {
    let file = File::create(path).unwrap();
    let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, content) in upstream_files() {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, format!("{}/{}", top, name), content.as_bytes())
            .unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap();
}

struct Fixture {
    _dir: TempDir,
    root: PathBuf,
    sources: SourceTable,
}

impl Fixture {
    /// Mirror a zip archive with the given top folder as version 0.10.
    fn zip(top: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_path_buf();
        let archive = root.join("mirror/v0.10.zip");
        std::fs::create_dir_all(archive.parent().unwrap()).unwrap();
        write_zip(&archive, top);
        Self::with_archive(dir, root, &archive, true)
    }

    fn tar_gz(top: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_path_buf();
        let archive = root.join("mirror/v0.10.tar.gz");
        std::fs::create_dir_all(archive.parent().unwrap()).unwrap();
        write_tar_gz(&archive, top);
        Self::with_archive(dir, root, &archive, true)
    }

    fn with_archive(dir: TempDir, root: PathBuf, archive: &Path, checksum: bool) -> Self {
        let mut sources = SourceTable::new();
        sources.insert(
            "0.10",
            SourceDescriptor {
                url: format!("file://{}", archive.display()),
                sha256: checksum.then(|| sha256_file(archive).unwrap()),
            },
        );
        Self {
            _dir: dir,
            root,
            sources,
        }
    }

    fn executor(&self, pairs: &[&str]) -> RecipeExecutor<BitserializerRecipe> {
        RecipeExecutor::new(
            BitserializerRecipe::new(),
            Settings::from_pairs(pairs).unwrap(),
            "0.10",
            Layout::under(&self.root.join("build")),
        )
    }
}

fn include_path(package: &Path, upstream_header: &str) -> PathBuf {
    let rel = upstream_header
        .strip_prefix("core/")
        .or_else(|| upstream_header.strip_prefix("archives/"))
        .unwrap();
    package.join("include").join(rel)
}

#[test]
fn test_create_gcc8_end_to_end() {
    let fixture = Fixture::zip(TOP);
    let exec = fixture.executor(&["os=Linux", "compiler=gcc", "compiler.version=8"]);

    let manifest = exec.create(&fixture.sources).unwrap();
    let package = exec.package_folder();

    assert_eq!(
        std::fs::read_to_string(package.join("licenses/license.txt")).unwrap(),
        "MIT License"
    );
    for header in CORE_HEADERS.iter().chain(RAPIDJSON_HEADERS) {
        let path = include_path(package, header);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            format!("// {}", header),
            "{}",
            path.display()
        );
    }
    for header in OTHER_ARCHIVE_HEADERS {
        assert!(!include_path(package, header).exists(), "{header} must not be packaged");
    }
    for archive in DEFERRED_ARCHIVES {
        assert!(!package.join("include").join(archive).exists());
    }
    assert!(!package.join("include/CMakeLists.txt").exists());
    assert!(!package.join("README.md").exists());

    assert_eq!(manifest.name, "bitserializer");
    assert_eq!(manifest.cpp_info.libs, vec!["stdc++fs"]);
    assert_eq!(manifest.cpp_info.requires, vec!["rapidjson/1.1.0"]);
    assert_eq!(manifest.files.len(), 1 + CORE_HEADERS.len() + RAPIDJSON_HEADERS.len());
    assert!(manifest.files.contains(&"licenses/license.txt".to_string()));
    assert!(
        manifest
            .files
            .contains(&"include/bitserializer_rapidjson/rapidjson_archive.h".to_string())
    );

    let written = PackageManifest::read(&package.join("package.toml")).unwrap();
    assert_eq!(written, manifest);
}

#[test]
fn test_source_renames_only_the_marked_folder() {
    let fixture = Fixture::zip(TOP);
    let exec = fixture.executor(&["compiler=gcc", "compiler.version=9"]);

    std::fs::create_dir_all(exec.source_folder().join("unrelated")).unwrap();
    let normalized = exec.source(&fixture.sources).unwrap();

    let source = exec.source_folder();
    assert_eq!(normalized, Some(source.join(SOURCE_SUBFOLDER)));
    assert!(source.join(SOURCE_SUBFOLDER).join("license.txt").is_file());
    assert!(!source.join(TOP).exists());
    assert!(source.join("unrelated").is_dir());
    assert!(!source.join("v0.10.zip").exists());
}

#[test]
fn test_create_tar_gz_archive() {
    let fixture = Fixture::tar_gz(TOP);
    let exec = fixture.executor(&["compiler=gcc", "compiler.version=11"]);

    let manifest = exec.create(&fixture.sources).unwrap();
    assert!(manifest.cpp_info.libs.is_empty());
    assert!(exec.package_folder().join("include/bitserializer/bit_serializer.h").is_file());
}

#[test]
fn test_unmarked_archive_fails_at_package() {
    let fixture = Fixture::zip("bitserializer-master");
    let exec = fixture.executor(&["compiler=gcc", "compiler.version=9"]);

    // source itself does not fail when nothing matches
    assert_eq!(exec.source(&fixture.sources).unwrap(), None);
    assert!(!exec.source_folder().join(SOURCE_SUBFOLDER).exists());

    let err = exec.package().unwrap_err();
    assert!(matches!(err, RecipeError::MissingSource(_)));
    assert!(err.is_io());
    assert!(!exec.package_folder().join("include").exists());
}

#[test]
fn test_create_with_unmarked_archive_fails() {
    let fixture = Fixture::zip("bitserializer-master");
    let exec = fixture.executor(&[]);

    let err = exec.create(&fixture.sources).unwrap_err();
    assert!(matches!(err, RecipeError::MissingSource(_)));
    assert!(!exec.package_folder().join("package.toml").exists());
}

#[test]
fn test_checksum_mismatch_aborts() {
    let mut fixture = Fixture::zip(TOP);
    fixture
        .sources
        .sources
        .get_mut("0.10")
        .unwrap()
        .sha256 = Some("0".repeat(64));
    let exec = fixture.executor(&["compiler=clang", "compiler.version=10"]);

    let err = exec.create(&fixture.sources).unwrap_err();
    assert!(matches!(err, RecipeError::ChecksumMismatch { .. }));
    assert!(!exec.source_folder().join(SOURCE_SUBFOLDER).exists());
}

#[test]
fn test_configure_failure_happens_before_download() {
    let mut sources = SourceTable::new();
    sources.insert(
        "0.10",
        SourceDescriptor {
            url: "file:///nonexistent/v0.10.zip".to_string(),
            sha256: None,
        },
    );
    let dir = TempDir::new().unwrap();
    let exec = RecipeExecutor::new(
        BitserializerRecipe::new(),
        Settings::from_pairs(["compiler=Visual Studio", "compiler.version=14"]).unwrap(),
        "0.10",
        Layout::under(dir.path()),
    );

    let err = exec.create(&sources).unwrap_err();
    assert!(matches!(err, RecipeError::Configuration(_)));
    assert!(!exec.source_folder().exists());
}

#[test]
fn test_unknown_compiler_still_packages() {
    let fixture = Fixture::zip(TOP);
    let exec = fixture.executor(&["os=Linux", "compiler=intel", "compiler.version=19"]);

    let manifest = exec.create(&fixture.sources).unwrap();
    assert!(manifest.cpp_info.libs.is_empty());
}

#[test]
fn test_repackaging_keeps_existing_files() {
    let fixture = Fixture::zip(TOP);
    let exec = fixture.executor(&["compiler=gcc", "compiler.version=10"]);
    exec.create(&fixture.sources).unwrap();

    let header = exec.package_folder().join("include/bitserializer/bit_serializer.h");
    std::fs::write(&header, "// local edit").unwrap();

    let packaged = exec.package().unwrap();
    assert_eq!(packaged.len(), 1 + CORE_HEADERS.len() + RAPIDJSON_HEADERS.len());
    assert_eq!(std::fs::read_to_string(&header).unwrap(), "// local edit");

    let manifest = exec.create(&fixture.sources).unwrap();
    assert_eq!(manifest.files.len(), 1 + CORE_HEADERS.len() + RAPIDJSON_HEADERS.len());
    assert!(manifest.files.contains(&"licenses/license.txt".to_string()));
    assert_eq!(std::fs::read_to_string(&header).unwrap(), "// local edit");
}

#[test]
fn test_create_twice_on_same_layout() {
    let fixture = Fixture::zip(TOP);
    let exec = fixture.executor(&["os=Linux", "compiler=gcc", "compiler.version=8"]);

    let first = exec.create(&fixture.sources).unwrap();
    let second = exec.create(&fixture.sources).unwrap();

    assert_eq!(first, second);
    let source = exec.source_folder();
    assert!(source.join(SOURCE_SUBFOLDER).join("license.txt").is_file());
    assert!(!source.join(TOP).exists());
}

#[test]
fn test_package_id_same_across_builds() {
    let fixture = Fixture::zip(TOP);
    let ids: Vec<String> = [
        vec!["os=Linux", "compiler=gcc", "compiler.version=8"],
        vec!["os=Linux", "compiler=clang", "compiler.version=12", "compiler.cppstd=17"],
        vec!["os=Windows", "compiler=Visual Studio", "compiler.version=16"],
        vec!["os=Macos", "compiler=apple-clang", "compiler.version=12", "build_type=Debug"],
    ]
    .iter()
    .map(|pairs| fixture.executor(pairs).package_id())
    .collect();

    assert!(ids.iter().all(|id| id == &ids[0]));
}
