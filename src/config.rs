/// Configuration for the detection pipeline with tunable thresholds.
///
/// Defaults correspond to the latest shipped tuning; earlier builds used a
/// 1000 ms distance-alert cooldown before it was retuned to 300 ms.
#[derive(Debug, Clone)]
pub struct DetectionConfig {
    /// Frame pacing while the viewer-facing surface is visible (10 FPS)
    pub frame_interval_ms: u64,

    /// Reduced frame pacing while backgrounded (8 FPS); detection and
    /// alerting keep running at this rate, only drawing stops
    pub background_interval_ms: u64,

    /// Minimum spacing between UI flushes, independent of frame rate
    pub ui_update_interval_ms: u64,

    /// Cooldown for the too-close/too-far alert sounds
    pub distance_alert_cooldown_ms: u64,

    /// Cooldown for the returned-to-normal chime (edge-triggered anyway)
    pub normal_alert_cooldown_ms: u64,

    /// Samples required before the overwork check may run
    pub min_frames_for_overwork: u64,

    /// Engagement ratio at or below which the overwork alert fires
    pub overwork_threshold: f64,

    /// Edge length in pixels of the square classifier input crop
    pub face_crop_size: u32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 100,
            background_interval_ms: 125,
            ui_update_interval_ms: 100,
            distance_alert_cooldown_ms: 300,
            normal_alert_cooldown_ms: 300,
            min_frames_for_overwork: 30,
            overwork_threshold: 0.3,
            face_crop_size: 160,
        }
    }
}
