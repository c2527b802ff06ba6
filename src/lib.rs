pub mod alerts;
pub mod camera;
pub mod config;
pub mod posture;
pub mod scoring;
pub mod session;
pub mod settings;
pub mod ui;
pub mod vision;

pub use alerts::{AlertDispatcher, AlertKind, AlertSink, AudioAlertPlayer};
pub use camera::{FrameSource, VideoFrame};
pub use config::DetectionConfig;
pub use posture::{PostureBand, PostureReading, StanceTracker};
pub use scoring::{EngagementScorer, OverworkVerdict};
pub use session::{DetectionPipeline, SessionController, SessionInfo, SessionStatus};
pub use settings::{AlertSoundSettings, SettingsStore};
pub use ui::{UiSink, UiUpdate};
pub use vision::{EmotionClassifier, EmotionScores, FaceBox, FaceLocator};
