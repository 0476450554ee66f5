//! UI-agnostic session state
//!
//! Everything the monitor remembers between frames lives in [`MonitorSession`]:
//! the active thresholds, the alert timer, the alert toggle and what the last
//! frame said. Front-ends own one session and pass it to their handlers.

use std::time::{Duration, Instant};

use crate::alert::{AlertTick, AlertTimer};
use crate::config::{Config, ServerDefaults};
use crate::overlay::Overlay;
use crate::sample::{Angles, FrameOutcome, PostureSample};

/// How the status line and camera frame should be styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostureTone {
    Neutral,
    Good,
    Bad,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraStatus {
    Idle,
    Streaming(String),
    Failed(String),
}

/// Side effects the front-end should carry out after a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameEffect {
    pub play_alert: bool,
}

#[derive(Debug, Clone)]
pub struct MonitorSession {
    config: Config,
    timer: AlertTimer,
    alerts_enabled: bool,
    pub camera: CameraStatus,
    status: String,
    tone: PostureTone,
    angles: Option<Angles>,
    bad_elapsed: Option<Duration>,
    overlay: Option<Overlay>,
    pub frames_evaluated: u64,
    pub frames_rejected: u64,
}

impl MonitorSession {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            timer: AlertTimer::new(),
            alerts_enabled: true,
            camera: CameraStatus::Idle,
            status: "Press 's' to start detection".to_string(),
            tone: PostureTone::Neutral,
            angles: None,
            bad_elapsed: None,
            overlay: None,
            frames_evaluated: 0,
            frames_rejected: 0,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replace the active thresholds. Takes effect from the next frame.
    pub fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    pub fn reset_to(&mut self, defaults: ServerDefaults) {
        self.config = defaults.into();
    }

    pub fn alerts_enabled(&self) -> bool {
        self.alerts_enabled
    }

    /// Flip whether alerts are audible. Timing is unaffected.
    pub fn toggle_alerts(&mut self) -> bool {
        self.alerts_enabled = !self.alerts_enabled;
        self.alerts_enabled
    }

    pub fn apply(&mut self, outcome: FrameOutcome, now: Instant) -> FrameEffect {
        match outcome {
            FrameOutcome::Rejected(error) => {
                self.frames_rejected += 1;
                self.status = format!("Status: {}", error);
                self.tone = PostureTone::Neutral;
                FrameEffect::default()
            }
            FrameOutcome::Evaluated(sample) => {
                self.frames_evaluated += 1;
                self.apply_sample(sample, now)
            }
        }
    }

    fn apply_sample(&mut self, sample: PostureSample, now: Instant) -> FrameEffect {
        self.tone = if sample.is_good { PostureTone::Good } else { PostureTone::Bad };
        self.status = sample.status;
        self.angles = Some(sample.angles);

        if let Some(landmarks) = sample.landmarks {
            self.overlay = Some(Overlay::project(&landmarks, 1.0, 1.0));
        }

        match self.timer.observe(sample.is_good, now, self.config.alert_interval()) {
            AlertTick::Good => {
                self.bad_elapsed = None;
                FrameEffect::default()
            }
            AlertTick::Bad { elapsed, fire } => {
                self.bad_elapsed = Some(elapsed);
                if fire {
                    tracing::info!("Bad posture for {}s, alert due", elapsed.as_secs());
                }
                FrameEffect {
                    play_alert: fire && self.alerts_enabled,
                }
            }
        }
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn tone(&self) -> PostureTone {
        self.tone
    }

    pub fn angles(&self) -> Option<&Angles> {
        self.angles.as_ref()
    }

    /// `Bad Posture Time: <n>s` while posture is bad; `None` hides the timer.
    pub fn timer_text(&self) -> Option<String> {
        self.bad_elapsed
            .map(|elapsed| format!("Bad Posture Time: {}s", elapsed.as_secs()))
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    /// Whether each visible side sits inside the locally configured range.
    /// The backend's verdict stays authoritative; this is only a hint.
    pub fn range_hints(&self) -> (Option<bool>, Option<bool>) {
        match self.angles {
            Some(angles) => (
                angles.right.map(|r| self.config.right_in_range(r)),
                angles.left.map(|l| self.config.left_in_range(l)),
            ),
            None => (None, None),
        }
    }

    pub fn alert_timer(&self) -> &AlertTimer {
        &self.timer
    }
}
