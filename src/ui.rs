use std::time::{Duration, Instant};

use serde::Serialize;

use crate::posture::{PostureReading, Rgb};
use crate::vision::EmotionConfidence;

/// Number of top emotions surfaced per update.
const TOP_EMOTIONS: usize = 3;

/// One rendered detection result: posture banner, gauge, emotion
/// breakdown, overwork indicator.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiUpdate {
    pub posture_label: &'static str,
    pub posture_color: Rgb,
    pub gauge_percent: f64,
    pub top_emotions: Vec<EmotionConfidence>,
    pub overwork_percent: f64,
}

impl UiUpdate {
    /// Assemble an update from a frame's derived values. The raw
    /// engagement ratio lives in [-1, 1]-ish territory and its inversion
    /// can stray outside the display range, so the overwork percentage is
    /// clamped here, at the UI boundary, and nowhere deeper.
    pub fn from_frame(
        reading: &PostureReading,
        ranked: &[EmotionConfidence],
        engagement_ratio: f64,
    ) -> Self {
        let overwork_percent = ((1.0 - engagement_ratio) * 100.0).clamp(0.0, 100.0);
        Self {
            posture_label: reading.label,
            posture_color: reading.color,
            gauge_percent: reading.gauge_percent,
            top_emotions: ranked.iter().take(TOP_EMOTIONS).cloned().collect(),
            overwork_percent,
        }
    }
}

/// Render seam. Called at most once per UI tick with the latest reading;
/// implementations must not block the detection loop.
pub trait UiSink: Send {
    fn render(&self, update: UiUpdate);
}

/// Decouples UI pacing from detection pacing: readings arriving inside
/// the flush window are buffered (latest wins) and only the newest one
/// goes out when the window reopens.
pub struct UiThrottle {
    interval: Duration,
    last_flush: Option<Instant>,
    pending: Option<UiUpdate>,
}

impl UiThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_flush: None,
            pending: None,
        }
    }

    /// Offer a fresh reading. Returns the update to render now, if the
    /// flush window is open.
    pub fn push(&mut self, update: UiUpdate, now: Instant) -> Option<UiUpdate> {
        if let Some(last) = self.last_flush {
            if now.duration_since(last) < self.interval {
                self.pending = Some(update);
                return None;
            }
        }
        self.last_flush = Some(now);
        self.pending = None;
        Some(update)
    }

    /// Latest buffered reading, consumed. Lets a caller drain the buffer
    /// when the stream pauses.
    pub fn take_pending(&mut self) -> Option<UiUpdate> {
        self.pending.take()
    }
}
