//! The platform abstraction boundary. `Platform` stands in for the reference
//! host's PAL: every filesystem or OS operation the extractor needs goes
//! through it, so tests can swap in a counting mock instead of touching a
//! real filesystem twice (see `extractor::tests::CountingPlatform`).

use memmap2::Mmap;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub trait Platform {
    fn map_file_readonly(&self, path: &Path) -> io::Result<Mmap>;
    fn directory_exists(&self, path: &Path) -> bool;

    /// Recursively create `path` and any missing intermediate directories,
    /// with `0700` permissions on POSIX-like systems. Idempotent: returns
    /// `Ok` if `path` already exists as a directory.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Open `path` for writing, truncating any existing contents.
    fn create_file(&self, path: &Path) -> io::Result<File>;

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Recursively remove `path`. Matches `remove_directory_tree`'s
    /// depth-first, subdirectories-before-files contract.
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    fn getenv(&self, key: &str) -> Option<String>;
    fn temp_dir(&self) -> PathBuf;
    fn pid(&self) -> u32;
    fn sleep(&self, duration: Duration);
}

/// Production implementation backed by `std::fs` and `memmap2`.
pub struct StdPlatform;

impl Platform for StdPlatform {
    fn map_file_readonly(&self, path: &Path) -> io::Result<Mmap> {
        let file = File::open(path)?;
        // Safety: the bundle file is not expected to be mutated concurrently
        // with extraction; this is the same trust boundary the reference
        // host accepts by memory-mapping the apphost it is itself running as.
        unsafe { Mmap::map(&file) }
    }

    fn directory_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    #[cfg(unix)]
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        use std::os::unix::fs::DirBuilderExt;
        if self.directory_exists(path) {
            return Ok(());
        }
        std::fs::DirBuilder::new()
            .recursive(true)
            .mode(0o700)
            .create(path)
    }

    #[cfg(not(unix))]
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        if self.directory_exists(path) {
            return Ok(());
        }
        std::fs::create_dir_all(path)
    }

    fn create_file(&self, path: &Path) -> io::Result<File> {
        File::create(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_dir_all(path)
    }

    fn getenv(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn temp_dir(&self) -> PathBuf {
        std::env::temp_dir()
    }

    fn pid(&self) -> u32 {
        std::process::id()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
