use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "posture-monitor")]
#[command(version, about = "Watch your posture through the webcam and get nudged when you slouch")]
pub struct Args {
    /// Base URL of the pose-estimation backend
    #[arg(long, env = "POSTURE_SERVER", default_value = "http://localhost:8000")]
    pub server: String,

    /// Camera device index
    #[arg(long, env = "POSTURE_CAMERA", default_value_t = 0)]
    pub camera: i32,

    /// Submit this JPEG on every tick instead of reading a camera
    #[arg(long, env = "POSTURE_IMAGE")]
    pub image: Option<PathBuf>,

    /// Milliseconds between frame submissions
    #[arg(long, env = "POSTURE_INTERVAL_MS", default_value_t = 1000, value_parser = clap::value_parser!(u64).range(100..))]
    pub interval_ms: u64,

    /// Give up on a backend request after this many seconds
    #[arg(long, env = "POSTURE_REQUEST_TIMEOUT", default_value_t = 10)]
    pub request_timeout_secs: u64,

    /// Directory holding the saved threshold configuration
    #[arg(long, env = "POSTURE_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Write logs here instead of the default data directory
    #[arg(long, env = "POSTURE_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn capture_interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
