use crate::config::DetectionConfig;
use crate::vision::Emotion;

/// Outcome of one overwork evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverworkVerdict {
    /// Not enough samples accumulated yet.
    Accumulating,
    /// Window evaluated, engagement acceptable. Counters cleared.
    Cleared,
    /// Window evaluated, sustained negative affect. Counters cleared;
    /// the caller should fire the overwork alert.
    Overworked,
}

/// Cumulative engagement signal over the emotion stream.
///
/// Each frame's top-ranked label moves a signed score up (Happy, Neutral,
/// Surprise) or down (everything else) while an unconditional step count
/// grows alongside. Once the step count reaches the configured minimum,
/// every evaluation clears the counters whether or not the overwork
/// condition held, so the check repeatedly inspects the most recent
/// window rather than a long-running average. That reset-on-both-paths
/// behavior is kept as shipped.
#[derive(Debug)]
pub struct EngagementScorer {
    score: i64,
    steps: u64,
    min_frames: u64,
    overwork_threshold: f64,
}

impl EngagementScorer {
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            score: 0,
            steps: 0,
            min_frames: config.min_frames_for_overwork,
            overwork_threshold: config.overwork_threshold,
        }
    }

    /// Fold one frame's dominant emotion into the running score.
    pub fn record(&mut self, top: Emotion) {
        if top.is_positive() {
            self.score += 1;
        } else {
            self.score -= 1;
        }
        self.steps += 1;
    }

    /// Signed engagement ratio in roughly [-1, 1]; 0 before any sample.
    pub fn engagement_ratio(&self) -> f64 {
        if self.steps == 0 {
            return 0.0;
        }
        self.score as f64 / self.steps as f64
    }

    /// Run the overwork check for this frame. Only evaluates (and resets)
    /// once the minimum sample count is reached.
    pub fn evaluate(&mut self) -> OverworkVerdict {
        if self.steps < self.min_frames {
            return OverworkVerdict::Accumulating;
        }
        let overworked = self.engagement_ratio() <= self.overwork_threshold;
        self.reset();
        if overworked {
            OverworkVerdict::Overworked
        } else {
            OverworkVerdict::Cleared
        }
    }

    pub fn reset(&mut self) {
        self.score = 0;
        self.steps = 0;
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }
}
