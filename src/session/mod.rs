pub mod controller;
pub mod loop_worker;
pub mod state;

pub use controller::SessionController;
pub use state::{SessionInfo, SessionStatus};

use crate::alerts::AlertDispatcher;
use crate::camera::FrameSource;
use crate::ui::UiSink;
use crate::vision::{EmotionClassifier, FaceLocator};

/// Everything one capture session needs, bundled explicitly instead of
/// living in ambient singletons. Handed to
/// [`SessionController::start`] and consumed by the loop; discarded
/// wholesale when the session ends, so a restart always begins fresh.
pub struct DetectionPipeline {
    pub frames: Box<dyn FrameSource>,
    pub locator: Box<dyn FaceLocator>,
    pub classifier: Box<dyn EmotionClassifier>,
    pub alerts: AlertDispatcher,
    pub ui: Box<dyn UiSink>,
}
