use anyhow::Result;
use image::{Rgb, RgbImage};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::{sleep, Duration};

use wellcam::vision::crop::FaceCrop;
use wellcam::{
    AlertDispatcher, AudioAlertPlayer, DetectionConfig, DetectionPipeline, EmotionClassifier,
    EmotionScores, FaceBox, FaceLocator, FrameSource, SessionController, SettingsStore, UiSink,
    UiUpdate, VideoFrame,
};

const FRAME_WIDTH: u32 = 640;
const FRAME_HEIGHT: u32 = 480;

/// Stand-in camera producing flat gray frames. Real integrations wrap an
/// actual capture device behind the same trait.
struct SyntheticCamera {
    open: bool,
}

impl SyntheticCamera {
    fn new() -> Self {
        Self { open: false }
    }
}

impl FrameSource for SyntheticCamera {
    fn open(&mut self) -> Result<()> {
        self.open = true;
        info!("synthetic camera acquired ({}x{})", FRAME_WIDTH, FRAME_HEIGHT);
        Ok(())
    }

    fn grab(&mut self) -> Result<Option<VideoFrame>> {
        if !self.open {
            return Ok(None);
        }
        let image = RgbImage::from_pixel(FRAME_WIDTH, FRAME_HEIGHT, Rgb([96, 96, 96]));
        Ok(Some(VideoFrame::new(image)))
    }

    fn release(&mut self) {
        if self.open {
            info!("synthetic camera released");
        }
        self.open = false;
    }
}

/// Face locator that slowly drifts toward and away from the screen,
/// sweeping the distance metric through every posture band.
struct DriftingFaceLocator {
    t: f64,
    rng: StdRng,
}

impl DriftingFaceLocator {
    fn new() -> Self {
        Self {
            t: 0.0,
            rng: StdRng::from_entropy(),
        }
    }
}

impl FaceLocator for DriftingFaceLocator {
    fn locate(&mut self, frame: &VideoFrame) -> Result<Option<FaceBox>> {
        self.t += 0.04;

        // Occasional dropped detection, as a real locator would have
        if self.rng.gen::<f32>() < 0.03 {
            return Ok(None);
        }

        let jitter = self.rng.gen_range(-0.4..0.4);
        let target_percent = 11.0 + 10.0 * self.t.sin() + jitter;
        let frame_area = frame.width() as f64 * frame.height() as f64;
        let edge = (target_percent.max(0.5) / 100.0 * frame_area).sqrt() as f32;

        let cx = frame.width() as f32 / 2.0;
        let cy = frame.height() as f32 / 2.0;
        Ok(Some(FaceBox {
            x: cx - edge / 2.0,
            y: cy - edge / 2.0,
            width: edge,
            height: edge,
        }))
    }
}

/// Classifier that cycles between relaxed and strained stretches so the
/// overwork alert gets exercised.
struct MoodClassifier {
    frame: u64,
    rng: StdRng,
}

impl MoodClassifier {
    fn new() -> Self {
        Self {
            frame: 0,
            rng: StdRng::from_entropy(),
        }
    }
}

impl EmotionClassifier for MoodClassifier {
    fn classify(&mut self, _crop: &FaceCrop) -> Result<EmotionScores> {
        self.frame += 1;
        let strained = (self.frame / 120) % 2 == 1;

        let mut scores: EmotionScores = [0.0; 7];
        for score in scores.iter_mut() {
            *score = self.rng.gen_range(0.0..0.2);
        }
        if strained {
            scores[6] = self.rng.gen_range(0.6..0.9); // Angry
        } else {
            scores[0] = self.rng.gen_range(0.5..0.8); // Neutral
            scores[1] = self.rng.gen_range(0.2..0.6); // Happy
        }
        Ok(scores)
    }
}

/// UI sink that prints the readout instead of driving a page.
struct LogUiSink;

impl UiSink for LogUiSink {
    fn render(&self, update: UiUpdate) {
        let top = &update.top_emotions[0];
        info!(
            "{:<20} [{}] gauge {:>3.0}% | overwork {:>5.1}% | {} {:.0}%",
            update.posture_label,
            update.posture_color.css(),
            update.gauge_percent,
            update.overwork_percent,
            top.emotion.as_str(),
            top.confidence * 100.0,
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = SettingsStore::new(std::env::temp_dir().join("wellcam-settings.json"))?;
    let sound = settings.alert_sound();

    let player = AudioAlertPlayer::new();
    let volume = if sound.enabled { sound.volume } else { 0.0 };
    if let Err(err) = player.set_volume(volume) {
        log::warn!("audio volume not applied: {err}");
    }

    let config = DetectionConfig::default();
    let pipeline = DetectionPipeline {
        frames: Box::new(SyntheticCamera::new()),
        locator: Box::new(DriftingFaceLocator::new()),
        classifier: Box::new(MoodClassifier::new()),
        alerts: AlertDispatcher::new(Box::new(player), &config),
        ui: Box::new(LogUiSink),
    };

    // Starting here stands in for the user's explicit start click.
    let mut controller = SessionController::new();
    let session = controller.start(pipeline, config).await?;
    info!("demo session {} running", session.id);

    sleep(Duration::from_secs(8)).await;

    controller.set_visible(false);
    info!("simulating a hidden tab: alerts continue, readouts pause");
    sleep(Duration::from_secs(3)).await;

    controller.set_visible(true);
    sleep(Duration::from_secs(3)).await;

    controller.stop().await?;
    info!("demo finished");
    Ok(())
}
