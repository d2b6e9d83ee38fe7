use std::io;
use thiserror::Error;

/// Internal propagation type for everything that can go wrong while recognizing,
/// parsing, or extracting a bundle.
#[derive(Error, Debug)]
pub enum BundleError {
    #[error("this executable is not recognized as a bundle")]
    NotABundle,

    #[error("bundle corruption: {0}")]
    Corruption(String),

    #[error("manifest header version {major}.{minor} is not supported")]
    VersionMismatch { major: u32, minor: u32 },

    #[error("I/O failure: {0}")]
    Io(#[from] io::Error),

    #[error("failed to commit extraction directory after exhausting retries: {0}")]
    CommitFailure(io::Error),
}

impl BundleError {
    pub fn corruption(msg: impl Into<String>) -> Self {
        BundleError::Corruption(msg.into())
    }
}

/// Status codes returned across the Runner boundary, matching the status
/// values the surrounding host contract defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Success,
    AppHostExeNotBundle,
    BundleExtractionFailure,
    BundleExtractionIOError,
}

impl From<&BundleError> for StatusCode {
    fn from(err: &BundleError) -> Self {
        match err {
            BundleError::NotABundle => StatusCode::AppHostExeNotBundle,
            BundleError::Corruption(_) => StatusCode::BundleExtractionFailure,
            BundleError::VersionMismatch { .. } => StatusCode::BundleExtractionFailure,
            BundleError::CommitFailure(_) => StatusCode::BundleExtractionFailure,
            BundleError::Io(_) => StatusCode::BundleExtractionIOError,
        }
    }
}

/// Emits the standard two-line failure trace: a general banner followed by
/// the specific cause, matching the reference host's trace::error pairs.
/// `NotABundle` is intentionally excluded from error-level logging by callers;
/// this helper is only for genuine failures.
pub fn log_failure(cause: &str) {
    log::error!("Failure processing application bundle.");
    log::error!("{cause}");
}
