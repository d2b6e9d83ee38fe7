//! Top-level orchestration: map the executable, recognize and parse the
//! manifest, run the three extraction phases, and retain what's needed to
//! serve `read_bundled_file` lookups afterward.

use crate::config::ExtractConfig;
use crate::error::{log_failure, BundleError, StatusCode};
use crate::extractor::{self, ExtractionLayout};
use crate::manifest::Manifest;
use crate::platform::{Platform, StdPlatform};
use crate::reader::Reader;
use memmap2::Mmap;
use std::path::{Path, PathBuf};

/// Holds the bundle's memory map alive for the process lifetime so that
/// `read_bundled_file` can hand back zero-copy slices into it.
pub struct Runner {
    mapping: Mmap,
    manifest: Manifest,
    final_dir: Option<PathBuf>,
}

impl Runner {
    /// Map `bundle_path` and attempt to recognize it as a bundle. Returns
    /// `Ok(None)` (not `Err`) when the file is simply not a bundle, matching
    /// the host contract where that is an expected, non-error outcome.
    pub fn open(bundle_path: &Path) -> Result<Option<Self>, BundleError> {
        Self::open_with(bundle_path, &StdPlatform)
    }

    pub fn open_with(
        bundle_path: &Path,
        platform: &dyn Platform,
    ) -> Result<Option<Self>, BundleError> {
        let mapping = platform.map_file_readonly(bundle_path)?;
        match Manifest::parse(&mapping) {
            Ok(manifest) => Ok(Some(Runner {
                mapping,
                manifest,
                final_dir: None,
            })),
            Err(BundleError::NotABundle) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn bundle_id(&self) -> &str {
        &self.manifest.bundle_id
    }

    /// Probe, and if necessary stage and commit, the extraction directory.
    /// Safe to call repeatedly and from multiple processes concurrently.
    pub fn extract(&mut self, bundle_path: &Path, config: &ExtractConfig) -> StatusCode {
        self.extract_with(bundle_path, config, &StdPlatform)
    }

    pub fn extract_with(
        &mut self,
        bundle_path: &Path,
        config: &ExtractConfig,
        platform: &dyn Platform,
    ) -> StatusCode {
        match self.extract_inner(bundle_path, config, platform) {
            Ok(()) => StatusCode::Success,
            Err(e) => {
                log_failure(&e.to_string());
                StatusCode::from(&e)
            }
        }
    }

    fn extract_inner(
        &mut self,
        bundle_path: &Path,
        config: &ExtractConfig,
        platform: &dyn Platform,
    ) -> Result<(), BundleError> {
        let layout: ExtractionLayout = extractor::determine_layout(
            bundle_path,
            &self.manifest.bundle_id,
            config,
            platform,
        );

        if !extractor::can_reuse_extraction(&layout, platform) {
            let mut reader = Reader::new(&self.mapping);
            extractor::stage(&layout, &self.manifest.files, &mut reader, platform)?;
            extractor::commit(&layout, config, platform)?;
        }

        self.final_dir = Some(layout.final_dir);
        Ok(())
    }

    pub fn extraction_path(&self) -> Option<&Path> {
        self.final_dir.as_deref()
    }

    /// Look up an embedded file by its bundle-relative path (in the bundle's
    /// own `/`-separated form) and return a zero-copy view into the bundle's
    /// memory map, without touching the extracted-to-disk copy at all.
    pub fn read_bundled_file(&self, relative_path: &str) -> Option<&[u8]> {
        let entry = self
            .manifest
            .files
            .iter()
            .find(|f| paths_match(&f.relative_path, relative_path))?;

        let start = entry.offset as usize;
        let end = start + entry.size as usize;
        self.mapping.get(start..end)
    }
}

/// Compares two relative paths ignoring the canonical-vs-native separator
/// difference, so callers can pass either form.
fn paths_match(stored: &str, query: &str) -> bool {
    let normalize = |s: &str| s.replace('\\', "/");
    normalize(stored) == normalize(query)
}
