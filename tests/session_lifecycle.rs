use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use image::{Rgb, RgbImage};
use tokio::time::{sleep, Duration};

use wellcam::vision::crop::FaceCrop;
use wellcam::{
    AlertDispatcher, AlertKind, AlertSink, DetectionConfig, DetectionPipeline, EmotionClassifier,
    EmotionScores, FaceBox, FaceLocator, FrameSource, SessionController, UiSink, UiUpdate,
};

const FRAME_WIDTH: u32 = 640;
const FRAME_HEIGHT: u32 = 480;

struct TestCamera {
    open: Arc<AtomicBool>,
    fail_open: bool,
}

impl TestCamera {
    fn new(open: Arc<AtomicBool>) -> Self {
        Self {
            open,
            fail_open: false,
        }
    }

    fn failing(open: Arc<AtomicBool>) -> Self {
        Self {
            open,
            fail_open: true,
        }
    }
}

impl FrameSource for TestCamera {
    fn open(&mut self) -> Result<()> {
        if self.fail_open {
            bail!("camera permission denied");
        }
        self.open.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn grab(&mut self) -> Result<Option<wellcam::VideoFrame>> {
        if !self.open.load(Ordering::SeqCst) {
            return Ok(None);
        }
        let image = RgbImage::from_pixel(FRAME_WIDTH, FRAME_HEIGHT, Rgb([128, 128, 128]));
        Ok(Some(wellcam::VideoFrame::new(image)))
    }

    fn release(&mut self) {
        self.open.store(false, Ordering::SeqCst);
    }
}

/// Serves a fixed sequence of distance readings (percent of frame area),
/// then reports no face forever, freezing all downstream state.
struct ScriptedLocator {
    distances: VecDeque<f64>,
    remaining: Arc<AtomicUsize>,
}

impl ScriptedLocator {
    fn new(distances: &[f64]) -> (Self, Arc<AtomicUsize>) {
        let remaining = Arc::new(AtomicUsize::new(distances.len()));
        (
            Self {
                distances: distances.iter().copied().collect(),
                remaining: remaining.clone(),
            },
            remaining,
        )
    }
}

impl FaceLocator for ScriptedLocator {
    fn locate(&mut self, frame: &wellcam::VideoFrame) -> Result<Option<FaceBox>> {
        let Some(d) = self.distances.pop_front() else {
            return Ok(None);
        };
        self.remaining.fetch_sub(1, Ordering::SeqCst);

        let frame_area = frame.width() as f64 * frame.height() as f64;
        let edge = (d / 100.0 * frame_area).sqrt() as f32;
        Ok(Some(FaceBox {
            x: 10.0,
            y: 10.0,
            width: edge,
            height: edge,
        }))
    }
}

struct FixedClassifier {
    scores: EmotionScores,
}

impl FixedClassifier {
    fn neutral() -> Self {
        let mut scores = [0.0; 7];
        scores[0] = 0.9;
        Self { scores }
    }

    fn angry() -> Self {
        let mut scores = [0.0; 7];
        scores[6] = 0.9;
        Self { scores }
    }
}

impl EmotionClassifier for FixedClassifier {
    fn classify(&mut self, _crop: &FaceCrop) -> Result<EmotionScores> {
        Ok(self.scores)
    }
}

#[derive(Clone, Default)]
struct RecordingSink {
    played: Arc<Mutex<Vec<AlertKind>>>,
    silenced: Arc<AtomicUsize>,
}

impl RecordingSink {
    fn played(&self) -> Vec<AlertKind> {
        self.played.lock().unwrap().clone()
    }
}

impl AlertSink for RecordingSink {
    fn play(&self, kind: AlertKind) {
        self.played.lock().unwrap().push(kind);
    }

    fn silence(&self) {
        self.silenced.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Clone, Default)]
struct CollectingUi {
    updates: Arc<Mutex<Vec<UiUpdate>>>,
}

impl UiSink for CollectingUi {
    fn render(&self, update: UiUpdate) {
        self.updates.lock().unwrap().push(update);
    }
}

fn fast_config() -> DetectionConfig {
    DetectionConfig {
        frame_interval_ms: 5,
        background_interval_ms: 5,
        ui_update_interval_ms: 5,
        ..DetectionConfig::default()
    }
}

fn pipeline_for(
    distances: &[f64],
    classifier: FixedClassifier,
    sink: RecordingSink,
    config: &DetectionConfig,
) -> (DetectionPipeline, Arc<AtomicUsize>, Arc<AtomicBool>) {
    let open = Arc::new(AtomicBool::new(false));
    let (locator, remaining) = ScriptedLocator::new(distances);
    let pipeline = DetectionPipeline {
        frames: Box::new(TestCamera::new(open.clone())),
        locator: Box::new(locator),
        classifier: Box::new(classifier),
        alerts: AlertDispatcher::new(Box::new(sink), config),
        ui: Box::new(CollectingUi::default()),
    };
    (pipeline, remaining, open)
}

async fn wait_for(mut cond: impl FnMut() -> bool) {
    for _ in 0..300 {
        if cond() {
            // Margin for frames already in flight
            sleep(Duration::from_millis(50)).await;
            return;
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met within timeout");
}

#[tokio::test]
async fn normal_alert_fires_once_for_a_run_of_good_frames() {
    let sink = RecordingSink::default();
    let config = fast_config();
    let (pipeline, remaining, _) =
        pipeline_for(&[10.0; 6], FixedClassifier::neutral(), sink.clone(), &config);

    let mut controller = SessionController::new();
    controller.start(pipeline, config).await.unwrap();
    wait_for(|| remaining.load(Ordering::SeqCst) == 0).await;
    controller.stop().await.unwrap();

    assert_eq!(sink.played(), vec![AlertKind::Normal]);
}

#[tokio::test]
async fn distance_alerts_debounce_and_normal_refires_on_reentry() {
    let sink = RecordingSink::default();
    // Cooldown far longer than the script so each category fires once
    let config = DetectionConfig {
        distance_alert_cooldown_ms: 60_000,
        normal_alert_cooldown_ms: 60_000,
        ..fast_config()
    };
    let script = [10.0, 10.0, 2.0, 2.0, 25.0, 10.0, 10.0];
    let (pipeline, remaining, _) =
        pipeline_for(&script, FixedClassifier::neutral(), sink.clone(), &config);

    let mut controller = SessionController::new();
    controller.start(pipeline, config).await.unwrap();
    wait_for(|| remaining.load(Ordering::SeqCst) == 0).await;
    controller.stop().await.unwrap();

    // Far and close frames are cooldown-limited to one playback each;
    // the chime fires on first entry and again after the bad stretch.
    // The second Normal is suppressed only by its own cooldown here.
    assert_eq!(
        sink.played(),
        vec![AlertKind::Normal, AlertKind::TooFar, AlertKind::TooClose]
    );
}

#[tokio::test]
async fn reentering_good_band_chimes_again_after_cooldown() {
    let sink = RecordingSink::default();
    let config = DetectionConfig {
        distance_alert_cooldown_ms: 60_000,
        normal_alert_cooldown_ms: 0,
        ..fast_config()
    };
    let script = [10.0, 2.0, 10.0, 10.0];
    let (pipeline, remaining, _) =
        pipeline_for(&script, FixedClassifier::neutral(), sink.clone(), &config);

    let mut controller = SessionController::new();
    controller.start(pipeline, config).await.unwrap();
    wait_for(|| remaining.load(Ordering::SeqCst) == 0).await;
    controller.stop().await.unwrap();

    assert_eq!(
        sink.played(),
        vec![AlertKind::Normal, AlertKind::TooFar, AlertKind::Normal]
    );
}

#[tokio::test]
async fn sustained_negative_affect_triggers_overwork_once() {
    let sink = RecordingSink::default();
    let config = fast_config();
    // 30 angry frames at good distance: one chime, then overwork exactly
    // when the accumulator reaches the minimum sample count
    let (pipeline, remaining, _) =
        pipeline_for(&[10.0; 30], FixedClassifier::angry(), sink.clone(), &config);

    let mut controller = SessionController::new();
    controller.start(pipeline, config).await.unwrap();
    wait_for(|| remaining.load(Ordering::SeqCst) == 0).await;
    controller.stop().await.unwrap();

    let played = sink.played();
    let overwork_count = played
        .iter()
        .filter(|&&k| k == AlertKind::Overwork)
        .count();
    assert_eq!(overwork_count, 1);
    assert_eq!(played[0], AlertKind::Normal);
}

#[tokio::test]
async fn stop_is_idempotent_and_releases_the_camera() {
    let sink = RecordingSink::default();
    let config = fast_config();
    let (pipeline, _, open) =
        pipeline_for(&[10.0; 3], FixedClassifier::neutral(), sink.clone(), &config);

    let mut controller = SessionController::new();
    controller.start(pipeline, config).await.unwrap();
    assert!(controller.is_running());

    controller.stop().await.unwrap();
    assert!(!controller.is_running());
    assert!(!open.load(Ordering::SeqCst));
    assert!(sink.silenced.load(Ordering::SeqCst) >= 1);

    // Second stop is a no-op, not an error
    controller.stop().await.unwrap();
    assert!(!controller.is_running());
}

#[tokio::test]
async fn stop_before_any_start_is_safe() {
    let mut controller = SessionController::new();
    controller.stop().await.unwrap();
    controller.stop().await.unwrap();
    assert!(!controller.is_running());
    assert!(controller.session().is_none());
}

#[tokio::test]
async fn start_while_running_is_rejected() {
    let sink = RecordingSink::default();
    let config = fast_config();
    let (first, _, _) =
        pipeline_for(&[10.0; 3], FixedClassifier::neutral(), sink.clone(), &config);
    let (second, _, _) =
        pipeline_for(&[10.0; 3], FixedClassifier::neutral(), sink.clone(), &config);

    let mut controller = SessionController::new();
    controller.start(first, config.clone()).await.unwrap();
    assert!(controller.start(second, config).await.is_err());
    assert!(controller.is_running());
    controller.stop().await.unwrap();
}

#[tokio::test]
async fn restart_after_stop_begins_a_fresh_session() {
    let sink = RecordingSink::default();
    let config = fast_config();
    let (first, remaining, _) =
        pipeline_for(&[10.0; 2], FixedClassifier::neutral(), sink.clone(), &config);

    let mut controller = SessionController::new();
    let session_a = controller.start(first, config.clone()).await.unwrap();
    wait_for(|| remaining.load(Ordering::SeqCst) == 0).await;
    controller.stop().await.unwrap();

    // A fresh pipeline means fresh accumulators: the chime fires again
    let (second, remaining, _) =
        pipeline_for(&[10.0; 2], FixedClassifier::neutral(), sink.clone(), &config);
    let session_b = controller.start(second, config).await.unwrap();
    wait_for(|| remaining.load(Ordering::SeqCst) == 0).await;
    controller.stop().await.unwrap();

    assert_ne!(session_a.id, session_b.id);
    assert_eq!(sink.played(), vec![AlertKind::Normal, AlertKind::Normal]);
}

#[tokio::test]
async fn camera_failure_surfaces_and_leaves_no_partial_state() {
    let open = Arc::new(AtomicBool::new(false));
    let config = fast_config();
    let pipeline = DetectionPipeline {
        frames: Box::new(TestCamera::failing(open.clone())),
        locator: Box::new(ScriptedLocator::new(&[]).0),
        classifier: Box::new(FixedClassifier::neutral()),
        alerts: AlertDispatcher::new(Box::new(RecordingSink::default()), &config),
        ui: Box::new(CollectingUi::default()),
    };

    let mut controller = SessionController::new();
    assert!(controller.start(pipeline, config.clone()).await.is_err());
    assert!(!controller.is_running());
    assert!(controller.session().is_none());
    assert!(!open.load(Ordering::SeqCst));

    // The controller is still usable afterwards
    let sink = RecordingSink::default();
    let (pipeline, remaining, _) =
        pipeline_for(&[10.0; 2], FixedClassifier::neutral(), sink.clone(), &config);
    controller.start(pipeline, config).await.unwrap();
    wait_for(|| remaining.load(Ordering::SeqCst) == 0).await;
    controller.stop().await.unwrap();
    assert_eq!(sink.played(), vec![AlertKind::Normal]);
}
