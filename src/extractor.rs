//! Two-phase commit extraction: stage every embedded file into a
//! process-private working directory, then atomically rename it into the
//! permanent extraction directory.

use crate::config::ExtractConfig;
use crate::error::BundleError;
use crate::manifest::FileEntry;
use crate::platform::Platform;
use crate::reader::Reader;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const COPY_CHUNK_SIZE: usize = 8 * 1024;
const KNOWN_EXECUTABLE_EXTENSIONS: &[&str] = &["exe"];

/// `<base>/<app_stem>/<bundle_id>`, and its working-directory sibling.
pub struct ExtractionLayout {
    pub final_dir: PathBuf,
    pub working_dir: PathBuf,
}

pub fn determine_layout(
    bundle_path: &Path,
    bundle_id: &str,
    config: &ExtractConfig,
    platform: &dyn Platform,
) -> ExtractionLayout {
    let base = match &config.extract_base_dir_override {
        Some(dir) => dir.clone(),
        None => match platform.getenv(ExtractConfig::env_var_name()) {
            Some(dir) => PathBuf::from(dir),
            None => platform.temp_dir().join(ExtractConfig::default_base_subdir()),
        },
    };

    let app_stem = strip_executable_ext(bundle_path);
    let final_dir = base.join(&app_stem).join(bundle_id);

    let working_key = config
        .working_dir_key
        .clone()
        .unwrap_or_else(|| format!("{:x}", platform.pid()));
    let working_dir = base.join(&app_stem).join(working_key);

    log::info!(
        "Files embedded within the bundle will be extracted to [{}]",
        final_dir.display()
    );

    ExtractionLayout {
        final_dir,
        working_dir,
    }
}

fn strip_executable_ext(bundle_path: &Path) -> String {
    let file_name = bundle_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match bundle_path.extension().and_then(|e| e.to_str()) {
        Some(ext) if KNOWN_EXECUTABLE_EXTENSIONS.contains(&ext.to_lowercase().as_str()) => {
            bundle_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or(file_name)
        }
        _ => file_name,
    }
}

/// Phase A: the fast path for a repeat launch. Performs nothing but a single
/// directory-exists probe.
pub fn can_reuse_extraction(layout: &ExtractionLayout, platform: &dyn Platform) -> bool {
    platform.directory_exists(&layout.final_dir)
}

/// Phase B: create `working_dir` and copy every embedded file into it.
pub fn stage(
    layout: &ExtractionLayout,
    files: &[FileEntry],
    reader: &mut Reader,
    platform: &dyn Platform,
) -> Result<(), BundleError> {
    platform.create_dir_all(&layout.working_dir)?;
    log::info!(
        "Temporary directory used to extract bundled files is [{}]",
        layout.working_dir.display()
    );

    for entry in files {
        stage_one_file(&layout.working_dir, entry, reader, platform)?;
    }
    Ok(())
}

fn stage_one_file(
    working_dir: &Path,
    entry: &FileEntry,
    reader: &mut Reader,
    platform: &dyn Platform,
) -> Result<(), BundleError> {
    let dest_path = working_dir.join(&entry.relative_path);
    if let Some(parent) = dest_path.parent() {
        if parent != working_dir {
            platform.create_dir_all(parent)?;
        }
    }

    let mut dest = platform.create_file(&dest_path).map_err(|e| {
        log::error!("Failed to open file [{}] for writing", dest_path.display());
        BundleError::Io(e)
    })?;

    reader.set_offset(entry.offset)?;
    let mut remaining = entry.size as u64;
    while remaining > 0 {
        let chunk_size = remaining.min(COPY_CHUNK_SIZE as u64) as usize;
        let chunk = reader.direct_read(chunk_size)?;
        dest.write_all(chunk).map_err(BundleError::Io)?;
        remaining -= chunk_size as u64;
    }
    Ok(())
}

/// Phase C: atomically rename `working_dir` to `final_dir`, retrying a
/// bounded number of times when the underlying error looks like a transient
/// permission/sharing conflict, and folding a lost race into success.
pub fn commit(
    layout: &ExtractionLayout,
    config: &ExtractConfig,
    platform: &dyn Platform,
) -> Result<(), BundleError> {
    let attempts = config.commit_retry_attempts();
    let delay = config.commit_retry_delay();

    let mut last_err: Option<io::Error> = None;
    for attempt in 0..=attempts {
        match platform.rename(&layout.working_dir, &layout.final_dir) {
            Ok(()) => return Ok(()),
            Err(e) => {
                if platform.directory_exists(&layout.final_dir) {
                    log::info!(
                        "Extraction completed by another process, aborting current extraction."
                    );
                    platform.remove_dir_all(&layout.working_dir).map_err(BundleError::Io)?;
                    return Ok(());
                }

                if !is_retriable(&e) || attempt == attempts {
                    last_err = Some(e);
                    break;
                }
                last_err = Some(e);
                platform.sleep(delay);
            }
        }
    }

    log::error!(
        "Failed to commit extracted files to directory [{}]",
        layout.final_dir.display()
    );
    Err(BundleError::CommitFailure(
        last_err.unwrap_or_else(|| io::Error::other("rename failed with no underlying error")),
    ))
}

fn is_retriable(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::PermissionDenied | io::ErrorKind::WouldBlock
    )
}
