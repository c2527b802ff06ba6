use serde::Serialize;

// Band edges in percent of frame area occupied by the face.
const FAR_MAX: f64 = 3.0;
const FAR_EDGE_MAX: f64 = 5.0;
const GOOD_MAX: f64 = 14.0;
const LEAN_MAX: f64 = 17.0;
const CLOSE_EDGE_MAX: f64 = 19.0;

// Distance at which the UI gauge saturates.
const GAUGE_FULL_SCALE: f64 = 24.0;

/// Posture bands over the distance metric, contiguous from 0 upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PostureBand {
    TooFar,
    TooFarEdge,
    Good,
    LeanBack,
    TooCloseEdge,
    TooClose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const RED: Rgb = Rgb { r: 255, g: 0, b: 0 };
    pub const GREEN: Rgb = Rgb { r: 0, g: 255, b: 0 };

    pub fn css(&self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Classification of a single distance reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostureReading {
    pub band: PostureBand,
    pub label: &'static str,
    pub color: Rgb,
    pub gauge_percent: f64,
}

/// Map a distance reading to its band, label, and bar color. Total over
/// `d >= 0`; recomputed from the current reading alone every frame, with
/// no hysteresis (hysteresis applies to alert firing only, via
/// [`StanceTracker`]).
///
/// The good band is closed at 5: a reading sitting exactly on the lower
/// boundary counts as good posture.
pub fn classify(d: f64) -> PostureReading {
    let (band, label, color) = if d <= FAR_MAX {
        (PostureBand::TooFar, "Too far from screen", Rgb::RED)
    } else if d < FAR_EDGE_MAX {
        let ratio = (d - FAR_MAX) / (FAR_EDGE_MAX - FAR_MAX);
        (
            PostureBand::TooFarEdge,
            "Too far from screen",
            red_to_yellow(ratio),
        )
    } else if d <= GOOD_MAX {
        (PostureBand::Good, "Good posture", Rgb::GREEN)
    } else if d <= LEAN_MAX {
        let ratio = (d - GOOD_MAX) / (LEAN_MAX - GOOD_MAX);
        (
            PostureBand::LeanBack,
            "Lean back a bit",
            green_to_yellow(ratio),
        )
    } else if d <= CLOSE_EDGE_MAX {
        let ratio = (d - LEAN_MAX) / (CLOSE_EDGE_MAX - LEAN_MAX);
        (
            PostureBand::TooCloseEdge,
            "Too close to screen",
            yellow_to_red(ratio),
        )
    } else {
        (PostureBand::TooClose, "Too close to screen", Rgb::RED)
    };

    PostureReading {
        band,
        label,
        color,
        gauge_percent: gauge_percent(d),
    }
}

/// Width of the UI gauge for a distance reading, saturating at 100.
pub fn gauge_percent(d: f64) -> f64 {
    (d / GAUGE_FULL_SCALE * 100.0).min(100.0)
}

fn red_to_yellow(ratio: f64) -> Rgb {
    Rgb {
        r: 255,
        g: (ratio * 255.0).round() as u8,
        b: 0,
    }
}

fn green_to_yellow(ratio: f64) -> Rgb {
    Rgb {
        r: (ratio * 255.0).round() as u8,
        g: 255,
        b: 0,
    }
}

fn yellow_to_red(ratio: f64) -> Rgb {
    Rgb {
        r: 255,
        g: (255.0 * (1.0 - ratio)).round() as u8,
        b: 0,
    }
}

/// Last stable posture state, the memory behind alert debouncing.
///
/// Only the extreme bands clear the good flag and only the good band sets
/// it; the transitional bands leave it untouched. A brief drift just past
/// the good band therefore does not re-arm the returned-to-normal chime.
#[derive(Debug, Default)]
pub struct StanceTracker {
    in_good_posture: bool,
}

impl StanceTracker {
    /// Feed one classified frame. Returns true exactly when this frame
    /// enters the good band from a non-good stable state.
    pub fn observe(&mut self, band: PostureBand) -> bool {
        match band {
            PostureBand::Good => {
                let entered = !self.in_good_posture;
                self.in_good_posture = true;
                entered
            }
            PostureBand::TooFar | PostureBand::TooClose => {
                self.in_good_posture = false;
                false
            }
            PostureBand::TooFarEdge | PostureBand::LeanBack | PostureBand::TooCloseEdge => false,
        }
    }

    pub fn is_good(&self) -> bool {
        self.in_good_posture
    }
}
