use std::time::Instant;

use anyhow::{Context, Result};
use log::{error, info};
use tokio::sync::watch;
use tokio::time::{self, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::alerts::AlertKind;
use crate::config::DetectionConfig;
use crate::posture::{self, PostureBand, StanceTracker};
use crate::scoring::{EngagementScorer, OverworkVerdict};
use crate::ui::{UiThrottle, UiUpdate};
use crate::vision::crop::prepare_face_crop;
use crate::vision::distance::face_area_percent;
use crate::vision::rank_emotions;

use super::DetectionPipeline;

/// Per-frame detection loop for one capture session. Single logical
/// thread of control: each tick runs locate -> classify -> score ->
/// alert -> UI to completion before the next is scheduled. Visibility
/// changes swap the tick pacing; detection and alerting keep running
/// while hidden, only UI flushes stop.
pub async fn detection_loop(
    session_id: String,
    mut pipeline: DetectionPipeline,
    config: DetectionConfig,
    cancel_token: CancellationToken,
    mut visibility_rx: watch::Receiver<bool>,
) {
    let mut scorer = EngagementScorer::new(&config);
    let mut stance = StanceTracker::default();
    let mut ui_gate = UiThrottle::new(Duration::from_millis(config.ui_update_interval_ms));

    let mut visible = *visibility_rx.borrow();
    let mut ticker = make_ticker(visible, &config);
    let mut visibility_open = true;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let result = process_frame(
                    &mut pipeline,
                    &config,
                    &mut scorer,
                    &mut stance,
                    &mut ui_gate,
                    visible,
                );
                if let Err(err) = result {
                    error!("frame processing failed for session {}: {err:?}", session_id);
                }
            }
            changed = visibility_rx.changed(), if visibility_open => {
                if changed.is_err() {
                    // Controller dropped its sender; keep current pacing
                    // until cancellation arrives.
                    visibility_open = false;
                    continue;
                }
                let now_visible = *visibility_rx.borrow_and_update();
                if now_visible != visible {
                    visible = now_visible;
                    info!(
                        "session {} {} (detection continues at {} ms)",
                        session_id,
                        if visible { "foregrounded" } else { "backgrounded" },
                        if visible { config.frame_interval_ms } else { config.background_interval_ms },
                    );
                    ticker = make_ticker(visible, &config);
                }
            }
            _ = cancel_token.cancelled() => {
                info!("detection loop for session {} shutting down", session_id);
                break;
            }
        }
    }

    pipeline.frames.release();
    pipeline.alerts.silence();
}

fn make_ticker(visible: bool, config: &DetectionConfig) -> time::Interval {
    let period = if visible {
        config.frame_interval_ms
    } else {
        config.background_interval_ms
    };
    let mut ticker = time::interval(Duration::from_millis(period));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

fn process_frame(
    pipeline: &mut DetectionPipeline,
    config: &DetectionConfig,
    scorer: &mut EngagementScorer,
    stance: &mut StanceTracker,
    ui_gate: &mut UiThrottle,
    visible: bool,
) -> Result<()> {
    let Some(frame) = pipeline.frames.grab().context("frame capture failed")? else {
        return Ok(());
    };

    let Some(face) = pipeline
        .locator
        .locate(&frame)
        .context("face detection failed")?
    else {
        // No face is "no reading": skip the frame, touch no state.
        return Ok(());
    };

    // The locator may report boxes past the frame edges; measure only
    // what is inside the frame.
    let Some(face) = face.clipped(frame.width(), frame.height()) else {
        return Ok(());
    };

    let crop = prepare_face_crop(&frame, &face, config.face_crop_size);
    let scores = pipeline
        .classifier
        .classify(&crop)
        .context("emotion inference failed")?;

    let distance = face_area_percent(face.width, face.height, frame.width(), frame.height());
    let reading = posture::classify(distance);
    let now = Instant::now();

    let entered_good = stance.observe(reading.band);
    match reading.band {
        PostureBand::TooFar => {
            pipeline.alerts.fire(AlertKind::TooFar, now);
        }
        PostureBand::TooClose => {
            pipeline.alerts.fire(AlertKind::TooClose, now);
        }
        PostureBand::Good if entered_good => {
            pipeline.alerts.fire(AlertKind::Normal, now);
        }
        _ => {}
    }

    let ranked = rank_emotions(&scores);
    scorer.record(ranked[0].emotion);
    let ratio = scorer.engagement_ratio();
    if scorer.evaluate() == OverworkVerdict::Overworked {
        pipeline.alerts.fire(AlertKind::Overwork, now);
    }

    if visible {
        let update = UiUpdate::from_frame(&reading, &ranked, ratio);
        if let Some(update) = ui_gate.push(update, now) {
            pipeline.ui.render(update);
        }
    }

    Ok(())
}
