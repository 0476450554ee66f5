use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Where logs go when `--log-file` is not given.
pub fn default_log_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("posture-monitor").join("posture-monitor.log"))
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    File::options().create(true).append(true).open(path)
}

/// Install the global subscriber. The terminal belongs to the UI, so output
/// goes to a file; without one, logs are dropped.
pub fn init_logging(verbose: bool, log_file: Option<&Path>) {
    let filter = std::env::var("POSTURE_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .map_or_else(
            |_| {
                if verbose {
                    EnvFilter::new("debug")
                } else {
                    EnvFilter::new("info")
                }
            },
            |value| EnvFilter::try_new(value).unwrap_or_else(|_| EnvFilter::new("info")),
        );

    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_ansi(false);

    let result = match log_file.map(open_log_file) {
        Some(Ok(file)) => tracing::subscriber::set_global_default(
            builder.with_writer(Mutex::new(file)).finish(),
        ),
        Some(Err(err)) => {
            eprintln!("Could not open log file: {}", err);
            tracing::subscriber::set_global_default(builder.with_writer(std::io::sink).finish())
        }
        None => tracing::subscriber::set_global_default(builder.with_writer(std::io::sink).finish()),
    };

    if let Err(err) = result {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
}
