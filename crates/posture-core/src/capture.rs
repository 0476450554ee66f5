//! Where frames come from.

use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result, bail};

/// A source of JPEG-encoded frames, e.g. a webcam.
pub trait FrameSource: Send {
    /// Human-readable name shown in the camera panel.
    fn describe(&self) -> String;

    /// Snapshot the current frame as JPEG bytes.
    fn grab_jpeg(&mut self) -> Result<Vec<u8>>;
}

/// Replays one JPEG file from disk on every grab. Lets the client run
/// against the backend without camera hardware.
pub struct StillImage {
    path: PathBuf,
    bytes: Vec<u8>,
}

const JPEG_MAGIC: [u8; 3] = [0xFF, 0xD8, 0xFF];

impl StillImage {
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)
            .with_context(|| format!("Could not read image {}", path.display()))?;

        if !bytes.starts_with(&JPEG_MAGIC) {
            bail!("{} is not a JPEG image", path.display());
        }

        Ok(Self {
            path: path.to_path_buf(),
            bytes,
        })
    }
}

impl FrameSource for StillImage {
    fn describe(&self) -> String {
        format!("still image {}", self.path.display())
    }

    fn grab_jpeg(&mut self) -> Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }
}
