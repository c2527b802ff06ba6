pub mod audio;
pub mod tone;

pub use audio::AudioAlertPlayer;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::config::DetectionConfig;

/// Alert categories, each with its own cooldown window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertKind {
    TooClose,
    TooFar,
    Normal,
    Overwork,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::TooClose => "too_close",
            AlertKind::TooFar => "too_far",
            AlertKind::Normal => "normal",
            AlertKind::Overwork => "overwork",
        }
    }
}

/// Playback seam. `play` is fire-and-forget: implementations log their
/// own failures and never surface them to the detection loop.
pub trait AlertSink: Send {
    fn play(&self, kind: AlertKind);
    fn silence(&self);
}

/// Cooldown-gated alert firing. Each category carries an independent
/// last-fired timestamp; a category may not re-fire within its window.
/// Overwork carries no window of its own since its pacing comes from the
/// scorer's accumulation cycle.
pub struct AlertDispatcher {
    cooldowns: HashMap<AlertKind, Duration>,
    last_fired: HashMap<AlertKind, Instant>,
    sink: Box<dyn AlertSink>,
}

impl AlertDispatcher {
    pub fn new(sink: Box<dyn AlertSink>, config: &DetectionConfig) -> Self {
        let distance_cooldown = Duration::from_millis(config.distance_alert_cooldown_ms);
        let cooldowns = HashMap::from([
            (AlertKind::TooClose, distance_cooldown),
            (AlertKind::TooFar, distance_cooldown),
            (
                AlertKind::Normal,
                Duration::from_millis(config.normal_alert_cooldown_ms),
            ),
            (AlertKind::Overwork, Duration::ZERO),
        ]);
        Self {
            cooldowns,
            last_fired: HashMap::new(),
            sink,
        }
    }

    /// Fire an alert unless its category is still cooling down. Returns
    /// whether playback was attempted. The timestamp is recorded before
    /// playback, so a failed attempt consumes the slot but can never
    /// wedge future alerts.
    pub fn fire(&mut self, kind: AlertKind, now: Instant) -> bool {
        let cooldown = self.cooldowns.get(&kind).copied().unwrap_or(Duration::ZERO);
        if let Some(last) = self.last_fired.get(&kind) {
            if now.duration_since(*last) < cooldown {
                return false;
            }
        }
        self.last_fired.insert(kind, now);
        self.sink.play(kind);
        true
    }

    /// Cut any playing sound. Used on session stop.
    pub fn silence(&self) {
        self.sink.silence();
    }
}
