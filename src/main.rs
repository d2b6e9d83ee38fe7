use apphost_bundle::config::ExtractConfig;
use apphost_bundle::error::StatusCode;
use apphost_bundle::runner::Runner;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

/// Demo harness for the bundle extractor: recognizes, extracts, and can look
/// up an individual embedded file inside a self-contained application
/// bundle.
#[derive(Parser, Debug)]
#[command(name = "apphost-bundle", version, about)]
struct Cli {
    /// Path to the bundle (an executable with an appended manifest).
    bundle: PathBuf,

    /// Directory under which bundles are extracted. Defaults to
    /// `DOTNET_BUNDLE_EXTRACT_BASE_DIR`, or a `.net` subdirectory of the
    /// system temp directory.
    #[arg(long)]
    extract_base_dir: Option<PathBuf>,

    /// After extraction, print the contents of this bundle-relative file
    /// instead of extracting to disk.
    #[arg(long)]
    read: Option<String>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let mut runner = match Runner::open(&cli.bundle) {
        Ok(Some(runner)) => runner,
        Ok(None) => {
            log::info!("[{}] is not recognized as a bundle", cli.bundle.display());
            return ExitCode::from(StatusCode::AppHostExeNotBundle as u8);
        }
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(relative_path) = cli.read {
        return match runner.read_bundled_file(&relative_path) {
            Some(bytes) => {
                use std::io::Write;
                let _ = std::io::stdout().write_all(bytes);
                ExitCode::SUCCESS
            }
            None => {
                eprintln!("no such embedded file: {relative_path}");
                ExitCode::FAILURE
            }
        };
    }

    let config = ExtractConfig {
        extract_base_dir_override: cli.extract_base_dir,
        ..Default::default()
    };

    match runner.extract(&cli.bundle, &config) {
        StatusCode::Success => {
            if let Some(path) = runner.extraction_path() {
                println!("{}", path.display());
            }
            ExitCode::SUCCESS
        }
        other => ExitCode::from(other as u8),
    }
}
