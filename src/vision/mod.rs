pub mod crop;
pub mod distance;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::camera::VideoFrame;
use crop::FaceCrop;

pub const EMOTION_COUNT: usize = 7;

/// Classifier output, aligned to the fixed label order of [`Emotion::ALL`].
/// Values are confidences in [0, 1] and need not sum to 1.
pub type EmotionScores = [f32; EMOTION_COUNT];

/// Emotion labels in the classifier's output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Emotion {
    Neutral,
    Happy,
    Sad,
    Surprise,
    Fear,
    Disgusted,
    Angry,
}

impl Emotion {
    pub const ALL: [Emotion; EMOTION_COUNT] = [
        Emotion::Neutral,
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Surprise,
        Emotion::Fear,
        Emotion::Disgusted,
        Emotion::Angry,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Neutral => "Neutral",
            Emotion::Happy => "Happy",
            Emotion::Sad => "Sad",
            Emotion::Surprise => "Surprise",
            Emotion::Fear => "Fear",
            Emotion::Disgusted => "Disgusted",
            Emotion::Angry => "Angry",
        }
    }

    /// Labels counted toward engagement rather than stress.
    pub fn is_positive(&self) -> bool {
        matches!(self, Emotion::Happy | Emotion::Neutral | Emotion::Surprise)
    }
}

/// One detected face, in frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl FaceBox {
    /// Clip to frame bounds. Locators may report boxes partially or fully
    /// outside the frame; measuring such a box would inflate the distance
    /// metric, so clipping happens before any geometry is derived.
    /// Returns `None` when nothing of the box remains inside the frame.
    pub fn clipped(&self, frame_width: u32, frame_height: u32) -> Option<FaceBox> {
        let fw = frame_width as f32;
        let fh = frame_height as f32;

        let x0 = self.x.max(0.0).min(fw);
        let y0 = self.y.max(0.0).min(fh);
        let x1 = (self.x + self.width).max(0.0).min(fw);
        let y1 = (self.y + self.height).max(0.0).min(fh);

        if x1 - x0 <= 0.0 || y1 - y0 <= 0.0 {
            return None;
        }

        Some(FaceBox {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionConfidence {
    pub emotion: Emotion,
    pub confidence: f32,
}

/// All seven labels ranked by descending confidence. Ties keep the
/// classifier's label order so ranking stays deterministic.
pub fn rank_emotions(scores: &EmotionScores) -> Vec<EmotionConfidence> {
    let mut ranked: Vec<EmotionConfidence> = Emotion::ALL
        .iter()
        .zip(scores.iter())
        .map(|(&emotion, &confidence)| EmotionConfidence {
            emotion,
            confidence,
        })
        .collect();
    ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    ranked
}

/// Face-locator seam: zero or one face per frame. Boxes may extend past
/// the frame edges; callers clip via [`FaceBox::clipped`].
pub trait FaceLocator: Send {
    fn locate(&mut self, frame: &VideoFrame) -> Result<Option<FaceBox>>;
}

/// Emotion-classifier seam over a normalized grayscale face crop.
pub trait EmotionClassifier: Send {
    fn classify(&mut self, crop: &FaceCrop) -> Result<EmotionScores>;
}
