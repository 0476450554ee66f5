pub mod alert;
pub mod capture;
pub mod client;
pub mod config;
pub mod overlay;
pub mod sample;
pub mod state;

// Re-export main types for convenience
pub use alert::{AlertTick, AlertTimer};
pub use capture::{FrameSource, StillImage};
pub use client::PostureClient;
pub use config::{startup_config, Config, ConfigError, ConfigForm, ConfigStore, ServerDefaults};
pub use overlay::{Overlay, Point, Segment};
pub use sample::{Angles, FrameOutcome, Landmark, PostureSample};
pub use state::{CameraStatus, FrameEffect, MonitorSession, PostureTone};
