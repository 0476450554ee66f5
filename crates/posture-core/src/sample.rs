//! Wire types returned by the pose-estimation backend.

use serde::{Deserialize, Serialize};
use anyhow::{Result, anyhow};

/// A single pose landmark in normalized image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    pub visibility: f64,
}

/// Neck angles in degrees. A side is absent when the backend could not see it clearly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Angles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
}

impl Angles {
    /// Text shown under the status line, e.g. `Neck Angles: Right: -70.00° | Left: 95.12°`.
    pub fn describe(&self) -> String {
        let mut text = String::from("Neck Angles: ");
        if let Some(right) = self.right {
            text.push_str(&format!("Right: {:.2}°", right));
        }
        if let Some(left) = self.left {
            if self.right.is_some() {
                text.push_str(" | ");
            }
            text.push_str(&format!("Left: {:.2}°", left));
        }
        text
    }
}

/// One server-evaluated result for a single frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PostureSample {
    pub status: String,
    pub is_good: bool,
    pub angles: Angles,
    pub landmarks: Option<Vec<Landmark>>,
}

/// What came back for a submitted frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    Evaluated(PostureSample),
    /// The backend answered with `{ "error": ... }`, e.g. no pose detected.
    Rejected(String),
}

/// Raw body of `POST /api/process-image`.
#[derive(Debug, Deserialize)]
pub struct ProcessResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub is_good: Option<bool>,
    #[serde(default)]
    pub angles: Angles,
    #[serde(default)]
    pub landmarks: Option<Vec<Landmark>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ProcessResponse {
    pub fn into_outcome(self) -> Result<FrameOutcome> {
        if let Some(error) = self.error {
            return Ok(FrameOutcome::Rejected(error));
        }

        let status = self.status.ok_or_else(|| anyhow!("Response is missing 'status'"))?;
        let is_good = self.is_good.ok_or_else(|| anyhow!("Response is missing 'is_good'"))?;

        Ok(FrameOutcome::Evaluated(PostureSample {
            status,
            is_good,
            angles: self.angles,
            landmarks: self.landmarks,
        }))
    }
}
