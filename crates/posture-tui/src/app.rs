use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use anyhow::{Context, Result, anyhow};
use tokio::sync::mpsc;
use posture_core::{
    startup_config, CameraStatus, Config, ConfigForm, ConfigStore, FrameEffect, FrameOutcome,
    FrameSource, MonitorSession, PostureClient, ServerDefaults,
};
use crate::args::Args;
use crate::camera;
use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Fields of the config editor, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    RightMin,
    RightMax,
    LeftMin,
    LeftMax,
    AlertInterval,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        FormField::RightMin,
        FormField::RightMax,
        FormField::LeftMin,
        FormField::LeftMax,
        FormField::AlertInterval,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::RightMin => "Right min angle",
            FormField::RightMax => "Right max angle",
            FormField::LeftMin => "Left min angle",
            FormField::LeftMax => "Left max angle",
            FormField::AlertInterval => "Alert interval (s)",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,

    // Monitoring
    pub session: MonitorSession,
    pub running: bool,
    pub in_flight: bool,
    frame_source: Option<Arc<Mutex<Box<dyn FrameSource>>>>,
    image: Option<PathBuf>,
    camera_index: i32,

    // Config editor
    pub form: ConfigForm,
    pub form_field: FormField,
    pub form_error: Option<String>,
    pub reset_pending: bool,

    // One-line feedback in the footer
    pub notice: Option<String>,

    // Backend and storage
    pub client: PostureClient,
    pub store: ConfigStore,
}

impl App {
    pub async fn new(args: &Args) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(args.request_timeout())
            .build()?;
        let client = PostureClient::with_client(http, &args.server);

        let store = match &args.config_dir {
            Some(dir) => ConfigStore::at(dir),
            None => ConfigStore::new()?,
        };

        let stored = store.load_or_log();
        let fetched = match client.fetch_defaults().await {
            Ok(defaults) => Some(defaults),
            Err(e) => {
                tracing::error!("Error fetching initial config from {}: {:#}", client.base_url(), e);
                None
            }
        };
        let config = startup_config(stored, fetched);
        tracing::info!(?config, "Starting with configuration");

        Ok(Self::with_parts(client, store, config, args.image.clone(), args.camera))
    }

    pub fn with_parts(
        client: PostureClient,
        store: ConfigStore,
        config: Config,
        image: Option<PathBuf>,
        camera_index: i32,
    ) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            session: MonitorSession::new(config),
            running: false,
            in_flight: false,
            frame_source: None,
            image,
            camera_index,
            form: ConfigForm::from(&config),
            form_field: FormField::RightMin,
            form_error: None,
            reset_pending: false,
            notice: None,
            client,
            store,
        }
    }

    /// Acquire the camera and begin periodic submission. No retry on failure.
    pub fn start(&mut self) {
        if self.running {
            return;
        }

        match camera::acquire(self.image.as_deref(), self.camera_index) {
            Ok(source) => {
                tracing::info!("Capturing from {}", source.describe());
                self.session.camera = CameraStatus::Streaming(source.describe());
                self.frame_source = Some(Arc::new(Mutex::new(source)));
                self.running = true;
            }
            Err(e) => {
                tracing::error!("Error accessing webcam: {:#}", e);
                self.session.camera = CameraStatus::Failed(format!("{:#}", e));
            }
        }
    }

    /// Snapshot a frame and submit it in the background. The grab runs on a
    /// blocking thread since camera reads block. The result comes back as
    /// [`AppEvent::Frame`]. A tick that finds a request still outstanding
    /// is dropped.
    pub fn capture_and_submit(&mut self, tx: &mpsc::UnboundedSender<AppEvent>) {
        if !self.running {
            return;
        }
        if self.in_flight {
            tracing::debug!("Previous frame still in flight, skipping tick");
            return;
        }
        let Some(source) = self.frame_source.clone() else {
            return;
        };

        self.in_flight = true;
        let client = self.client.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = match grab_frame(source).await {
                Ok(jpeg) => client.process_image(jpeg).await,
                Err(e) => Err(e),
            };
            let _ = tx.send(AppEvent::Frame(result));
        });
    }

    pub fn on_frame(&mut self, result: Result<FrameOutcome>, now: Instant) -> FrameEffect {
        self.in_flight = false;
        match result {
            Ok(outcome) => self.session.apply(outcome, now),
            Err(e) => {
                tracing::error!("Error sending frame: {:#}", e);
                FrameEffect::default()
            }
        }
    }

    pub fn toggle_alerts(&mut self) {
        let enabled = self.session.toggle_alerts();
        tracing::info!("Alerts {}", if enabled { "enabled" } else { "disabled" });
    }

    pub fn alert_label(&self) -> &'static str {
        if self.session.alerts_enabled() {
            "Alerts Enabled"
        } else {
            "Alerts Disabled"
        }
    }

    pub fn open_editor(&mut self) {
        self.form = ConfigForm::from(self.session.config());
        self.form_field = FormField::RightMin;
        self.form_error = None;
        self.input_mode = InputMode::Editing;
    }

    pub fn cancel_editor(&mut self) {
        self.form_error = None;
        self.input_mode = InputMode::Normal;
    }

    pub fn field_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::RightMin => &mut self.form.right_min_angle,
            FormField::RightMax => &mut self.form.right_max_angle,
            FormField::LeftMin => &mut self.form.left_min_angle,
            FormField::LeftMax => &mut self.form.left_max_angle,
            FormField::AlertInterval => &mut self.form.alert_interval_secs,
        }
    }

    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::RightMin => &self.form.right_min_angle,
            FormField::RightMax => &self.form.right_max_angle,
            FormField::LeftMin => &self.form.left_min_angle,
            FormField::LeftMax => &self.form.left_max_angle,
            FormField::AlertInterval => &self.form.alert_interval_secs,
        }
    }

    /// Validate the editor, apply the result and persist it. A rejected form
    /// stays open with the reason shown.
    pub fn save_config(&mut self) {
        let config = match self.form.parse() {
            Ok(config) => config,
            Err(e) => {
                self.form_error = Some(e.to_string());
                return;
            }
        };

        self.session.set_config(config);
        self.form_error = None;
        self.input_mode = InputMode::Normal;

        match self.store.save(&config) {
            Ok(()) => self.notice = Some("Configuration saved".to_string()),
            Err(e) => {
                tracing::error!("Error saving config to storage: {:#}", e);
                self.notice = Some("Configuration applied but could not be saved".to_string());
            }
        }
    }

    /// Fetch the backend's defaults in the background. The result comes back
    /// as [`AppEvent::Reset`].
    pub fn request_reset(&mut self, tx: &mpsc::UnboundedSender<AppEvent>) {
        if self.reset_pending {
            return;
        }

        self.reset_pending = true;
        self.notice = Some("Resetting to default configuration...".to_string());
        let client = self.client.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = client.fetch_defaults().await;
            let _ = tx.send(AppEvent::Reset(result));
        });
    }

    /// Go back to the backend's defaults and forget the stored configuration.
    /// On failure the current configuration and the stored blob are kept.
    pub fn on_reset(&mut self, result: Result<ServerDefaults>) {
        self.reset_pending = false;
        let defaults = match result {
            Ok(defaults) => defaults,
            Err(e) => {
                tracing::error!("Error resetting configuration: {:#}", e);
                self.notice = Some("Reset failed: backend unreachable".to_string());
                return;
            }
        };

        self.session.reset_to(defaults);
        self.form = ConfigForm::from(self.session.config());

        if let Err(e) = self.store.clear() {
            tracing::error!("Error clearing stored config: {:#}", e);
        }
        tracing::info!("Reset to default configuration");
        self.notice = Some("Reset to default configuration".to_string());
    }
}

async fn grab_frame(source: Arc<Mutex<Box<dyn FrameSource>>>) -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || {
        let mut source = source
            .lock()
            .map_err(|_| anyhow!("frame source lock poisoned"))?;
        source.grab_jpeg()
    })
    .await?
    .context("Error capturing frame")
}
