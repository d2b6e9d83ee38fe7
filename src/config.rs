//! Extraction knobs an embedding host (or this crate's own test suite) may
//! override. Every field defaults to the behavior the spec prescribes.

use std::path::PathBuf;
use std::time::Duration;

const EXTRACT_BASE_DIR_ENV: &str = "DOTNET_BUNDLE_EXTRACT_BASE_DIR";
const DEFAULT_BASE_SUBDIR: &str = ".net";
const DEFAULT_COMMIT_RETRY_ATTEMPTS: u32 = 500;
const DEFAULT_COMMIT_RETRY_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Default)]
pub struct ExtractConfig {
    /// Takes precedence over `DOTNET_BUNDLE_EXTRACT_BASE_DIR`. Tests use this
    /// instead of mutating process-global environment state.
    pub extract_base_dir_override: Option<PathBuf>,

    /// Overrides the pid-hex component of `working_dir`. Concurrency tests
    /// simulate multiple "processes" as threads within one test binary, where
    /// real pids cannot be made to collide.
    pub working_dir_key: Option<String>,

    pub commit_retry_attempts: Option<u32>,
    pub commit_retry_delay: Option<Duration>,
}

impl ExtractConfig {
    pub fn commit_retry_attempts(&self) -> u32 {
        self.commit_retry_attempts.unwrap_or(DEFAULT_COMMIT_RETRY_ATTEMPTS)
    }

    pub fn commit_retry_delay(&self) -> Duration {
        self.commit_retry_delay.unwrap_or(DEFAULT_COMMIT_RETRY_DELAY)
    }

    pub fn env_var_name() -> &'static str {
        EXTRACT_BASE_DIR_ENV
    }

    pub fn default_base_subdir() -> &'static str {
        DEFAULT_BASE_SUBDIR
    }
}
