use anyhow::{bail, Context, Result};
use chrono::Utc;
use log::info;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::DetectionConfig;

use super::loop_worker::detection_loop;
use super::state::{SessionInfo, SessionStatus};
use super::DetectionPipeline;

/// Control interface for the capture lifecycle. All transitions (start,
/// visibility changes, stop) go through here, so their ordering and
/// idempotency are explicit rather than spread across event listeners.
pub struct SessionController {
    session: Option<SessionInfo>,
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
    visibility_tx: Option<watch::Sender<bool>>,
}

impl SessionController {
    pub fn new() -> Self {
        Self {
            session: None,
            handle: None,
            cancel_token: None,
            visibility_tx: None,
        }
    }

    /// Begin a capture session. Must only be invoked on explicit user
    /// action; the engine never starts itself. The camera is acquired
    /// before anything else is set up: permission denial or a device
    /// error surfaces here and leaves the controller idle with no
    /// partial state.
    pub async fn start(
        &mut self,
        mut pipeline: DetectionPipeline,
        config: DetectionConfig,
    ) -> Result<SessionInfo> {
        if self.handle.is_some() {
            bail!("capture session already active");
        }

        pipeline
            .frames
            .open()
            .context("failed to acquire camera")?;

        let session = SessionInfo {
            id: Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            stopped_at: None,
            status: SessionStatus::Running,
        };
        info!("starting capture session {}", session.id);

        let cancel_token = CancellationToken::new();
        let token_clone = cancel_token.clone();

        // Sessions begin in the foreground; visibility updates stream in
        // through the watch channel.
        let (visibility_tx, visibility_rx) = watch::channel(true);

        let handle = tokio::spawn(detection_loop(
            session.id.clone(),
            pipeline,
            config,
            token_clone,
            visibility_rx,
        ));

        self.session = Some(session.clone());
        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        self.visibility_tx = Some(visibility_tx);
        Ok(session)
    }

    /// Forward a visibility change to the running loop. No-op when idle.
    pub fn set_visible(&self, visible: bool) {
        if let Some(tx) = &self.visibility_tx {
            let _ = tx.send(visible);
        }
    }

    /// End the session: cancel the loop, wait for it to wind down (it
    /// releases the camera and silences audio on the way out). Safe to
    /// call repeatedly and before any start.
    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        self.visibility_tx = None;

        let joined = if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("detection loop task failed to join")
                .map(|_| ())
        } else {
            Ok(())
        };

        if let Some(session) = self.session.as_mut() {
            if session.status == SessionStatus::Running {
                session.status = SessionStatus::Stopped;
                session.stopped_at = Some(Utc::now());
                info!("capture session {} stopped", session.id);
            }
        }

        joined
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Lifecycle record of the current or most recent session.
    pub fn session(&self) -> Option<&SessionInfo> {
        self.session.as_ref()
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}
