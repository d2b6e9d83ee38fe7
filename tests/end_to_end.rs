//! End-to-end scenarios against the public `Runner` API, covering the
//! documented extraction properties and a representative host-contract
//! walkthrough.

use apphost_bundle::config::ExtractConfig;
use apphost_bundle::error::StatusCode;
use apphost_bundle::fixtures::{build_bundle, build_bundle_with_major_version};
use apphost_bundle::platform::Platform;
use apphost_bundle::runner::Runner;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

fn write_bundle(bytes: &[u8]) -> tempfile::NamedTempFile {
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    tmp.write_all(bytes).unwrap();
    tmp
}

/// E1: a two-entry bundle extracts each file with exact offset/size bytes.
#[test]
fn two_entry_bundle_extracts_exact_bytes() {
    let bundle = build_bundle(
        b"fake-executable-bytes",
        "abcd1234",
        &[("app.dll", b"ABC", 1), ("app.deps.json", b"{}", 3)],
    );
    let tmp = write_bundle(&bundle);
    let out = tempfile::tempdir().unwrap();
    let config = ExtractConfig {
        extract_base_dir_override: Some(out.path().to_path_buf()),
        working_dir_key: Some("e1".into()),
        ..Default::default()
    };

    let mut runner = Runner::open(tmp.path()).unwrap().unwrap();
    assert_eq!(runner.extract(tmp.path(), &config), StatusCode::Success);

    let final_dir = runner.extraction_path().unwrap();
    assert_eq!(fs::read(final_dir.join("app.dll")).unwrap(), b"ABC");
    assert_eq!(fs::read(final_dir.join("app.deps.json")).unwrap(), b"{}");
}

/// R1: every entry's on-disk bytes equal the corresponding bundle slice, for
/// a manifest with several entries of varying size.
#[test]
fn every_entry_round_trips_its_exact_byte_range() {
    let files: Vec<(&str, &[u8], i32)> = vec![
        ("a.txt", b"hello world", 0),
        ("nested/b.bin", &[1, 2, 3, 4, 5], 2),
        ("c.json", b"{\"k\":1}", 3),
    ];
    let bundle = build_bundle(b"prefix-bytes", "round-trip-id", &files);
    let tmp = write_bundle(&bundle);
    let out = tempfile::tempdir().unwrap();
    let config = ExtractConfig {
        extract_base_dir_override: Some(out.path().to_path_buf()),
        working_dir_key: Some("r1".into()),
        ..Default::default()
    };

    let mut runner = Runner::open(tmp.path()).unwrap().unwrap();
    assert_eq!(runner.extract(tmp.path(), &config), StatusCode::Success);
    let final_dir = runner.extraction_path().unwrap().to_path_buf();

    for (path, contents, _ty) in &files {
        let on_disk = fs::read(final_dir.join(path)).unwrap();
        assert_eq!(&on_disk, contents);
    }
}

/// E3 / R3: a second `extract` call against an already-populated final_dir
/// performs no writes, observed through a counting platform mock.
#[test]
fn second_extraction_performs_zero_filesystem_writes() {
    struct CountingPlatform {
        inner: apphost_bundle::platform::StdPlatform,
        writes: std::sync::atomic::AtomicU32,
    }
    impl CountingPlatform {
        fn new() -> Self {
            CountingPlatform {
                inner: apphost_bundle::platform::StdPlatform,
                writes: std::sync::atomic::AtomicU32::new(0),
            }
        }
        fn count(&self) -> u32 {
            self.writes.load(std::sync::atomic::Ordering::SeqCst)
        }
        fn tick(&self) {
            self.writes.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        }
    }
    impl Platform for CountingPlatform {
        fn map_file_readonly(&self, path: &Path) -> std::io::Result<memmap2::Mmap> {
            self.inner.map_file_readonly(path)
        }
        fn directory_exists(&self, path: &Path) -> bool {
            self.inner.directory_exists(path)
        }
        fn create_dir_all(&self, path: &Path) -> std::io::Result<()> {
            self.tick();
            self.inner.create_dir_all(path)
        }
        fn create_file(&self, path: &Path) -> std::io::Result<fs::File> {
            self.tick();
            self.inner.create_file(path)
        }
        fn rename(&self, from: &Path, to: &Path) -> std::io::Result<()> {
            self.tick();
            self.inner.rename(from, to)
        }
        fn remove_dir_all(&self, path: &Path) -> std::io::Result<()> {
            self.tick();
            self.inner.remove_dir_all(path)
        }
        fn getenv(&self, key: &str) -> Option<String> {
            self.inner.getenv(key)
        }
        fn temp_dir(&self) -> std::path::PathBuf {
            self.inner.temp_dir()
        }
        fn pid(&self) -> u32 {
            self.inner.pid()
        }
        fn sleep(&self, d: std::time::Duration) {
            self.inner.sleep(d)
        }
    }

    let bundle = build_bundle(b"prefix", "e3-id", &[("a.txt", b"data", 0)]);
    let tmp = write_bundle(&bundle);
    let out = tempfile::tempdir().unwrap();
    let config = ExtractConfig {
        extract_base_dir_override: Some(out.path().to_path_buf()),
        working_dir_key: Some("e3".into()),
        ..Default::default()
    };
    let platform = CountingPlatform::new();

    let mut first = Runner::open_with(tmp.path(), &platform).unwrap().unwrap();
    assert_eq!(
        first.extract_with(tmp.path(), &config, &platform),
        StatusCode::Success
    );
    assert!(platform.count() > 0);

    let mut second = Runner::open_with(tmp.path(), &platform).unwrap().unwrap();
    let count_before = platform.count();
    assert_eq!(
        second.extract_with(tmp.path(), &config, &platform),
        StatusCode::Success
    );
    assert_eq!(platform.count(), count_before, "no writes on cache hit");
}

/// E4: a plain executable with no bundle footer is not a bundle, and no
/// directories are created as a side effect of probing it.
#[test]
fn plain_executable_is_rejected_without_side_effects() {
    let tmp = write_bundle(b"just some ordinary ELF-ish bytes, no trailer here");
    let out = tempfile::tempdir().unwrap();

    let runner = Runner::open(tmp.path()).unwrap();
    assert!(runner.is_none());
    assert!(fs::read_dir(out.path()).unwrap().next().is_none());
}

/// E5: a correct signature but unsupported major version fails extraction
/// with BundleExtractionFailure, not a panic or silent success.
#[test]
fn unsupported_major_version_fails_extraction() {
    let bundle = build_bundle_with_major_version(
        b"prefix",
        "e5-id",
        &[("a.txt", b"data", 0)],
        1,
    );
    let tmp = write_bundle(&bundle);
    let result = Runner::open(tmp.path());
    assert!(matches!(result, Err(_)));
}

/// R4 / E6: N concurrent extractions of the same bundle into the same
/// `final_dir`, modeled as threads sharing one `working_dir_key` template;
/// exactly the set of outcomes is Success, and no working_dir survives.
#[test]
fn concurrent_extractions_race_safely_to_one_final_dir() {
    let bundle = Arc::new(build_bundle(
        b"prefix",
        "race-id",
        &[("a.txt", b"payload-data", 0), ("b.txt", b"more", 1)],
    ));
    let tmp = write_bundle(&bundle);
    let tmp_path = Arc::new(tmp.path().to_path_buf());
    let out = tempfile::tempdir().unwrap();
    let base = Arc::new(out.path().to_path_buf());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let tmp_path = Arc::clone(&tmp_path);
            let base = Arc::clone(&base);
            std::thread::spawn(move || {
                let config = ExtractConfig {
                    extract_base_dir_override: Some((*base).clone()),
                    working_dir_key: Some(format!("racer-{i}")),
                    ..Default::default()
                };
                let mut runner = Runner::open(&tmp_path).unwrap().unwrap();
                runner.extract(&tmp_path, &config)
            })
        })
        .collect();

    let results: Vec<StatusCode> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(results.iter().all(|s| *s == StatusCode::Success));

    let app_stem = tmp_path.file_name().unwrap().to_string_lossy().into_owned();

    // Every racer's own working_dir must be gone: either it committed (renamed
    // away) or it lost the race and was cleaned up.
    for i in 0..8 {
        let leftover = base.join(&app_stem).join(format!("racer-{i}"));
        assert!(!leftover.exists(), "working_dir {i} should not survive");
    }

    let final_dir = base.join(&app_stem).join("race-id");
    assert_eq!(fs::read(final_dir.join("a.txt")).unwrap(), b"payload-data");
    assert_eq!(fs::read(final_dir.join("b.txt")).unwrap(), b"more");
}

/// R5: a working_dir left behind by a simulated crash (partial Phase B) does
/// not block a fresh extraction from reaching the same correct final_dir.
#[test]
fn fresh_extraction_recovers_from_an_abandoned_working_dir() {
    let bundle = build_bundle(b"prefix", "crash-id", &[("a.txt", b"full-contents", 0)]);
    let tmp = write_bundle(&bundle);
    let out = tempfile::tempdir().unwrap();
    let config = ExtractConfig {
        extract_base_dir_override: Some(out.path().to_path_buf()),
        working_dir_key: Some("crashed".into()),
        ..Default::default()
    };

    // Simulate a crash mid-Phase-B: create the working_dir with a truncated
    // file, but never commit.
    let platform = apphost_bundle::platform::StdPlatform;
    let layout = apphost_bundle::extractor::determine_layout(
        tmp.path(),
        "crash-id",
        &config,
        &platform,
    );
    platform.create_dir_all(&layout.working_dir).unwrap();
    fs::write(layout.working_dir.join("a.txt"), b"short").unwrap();
    assert!(!platform.directory_exists(&layout.final_dir));

    // A fresh extraction attempt (own working_dir_key) must still succeed and
    // produce the complete file, ignoring the abandoned one.
    let mut runner = Runner::open(tmp.path()).unwrap().unwrap();
    assert_eq!(runner.extract(tmp.path(), &config), StatusCode::Success);
    let final_dir = runner.extraction_path().unwrap();
    assert_eq!(fs::read(final_dir.join("a.txt")).unwrap(), b"full-contents");
}

/// R6: `read_bundled_file` addresses the live mmap, not a copy, and returns
/// `None` for anything not in the manifest.
#[test]
fn read_bundled_file_addresses_the_memory_map_directly() {
    let bundle = build_bundle(b"prefix", "r6-id", &[("a.txt", b"mapped-bytes", 0)]);
    let tmp = write_bundle(&bundle);
    let runner = Runner::open(tmp.path()).unwrap().unwrap();

    let slice = runner.read_bundled_file("a.txt").unwrap();
    assert_eq!(slice, b"mapped-bytes");
    assert!(runner.read_bundled_file("nope.txt").is_none());
}
