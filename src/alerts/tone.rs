use rodio::Source;
use std::f32::consts::PI;
use std::time::Duration;

use super::AlertKind;

/// Short synthesized alert tone with a linear fade-out.
pub struct AlertTone {
    freq: f32,
    sample_rate: u32,
    num_sample: usize,
    total_samples: usize,
}

impl AlertTone {
    pub fn new(freq: f32, duration: Duration) -> Self {
        let sample_rate = 44100;
        let total_samples = (duration.as_secs_f32() * sample_rate as f32) as usize;
        Self {
            freq,
            sample_rate,
            num_sample: 0,
            total_samples,
        }
    }

    /// Tone voicing per alert category: urgent high pitch for distance
    /// warnings, a soft chime for the return to normal, a longer low
    /// tone for overwork.
    pub fn for_kind(kind: AlertKind) -> Self {
        match kind {
            AlertKind::TooClose | AlertKind::TooFar => {
                AlertTone::new(880.0, Duration::from_millis(180))
            }
            AlertKind::Normal => AlertTone::new(523.25, Duration::from_millis(250)),
            AlertKind::Overwork => AlertTone::new(440.0, Duration::from_millis(600)),
        }
    }
}

impl Iterator for AlertTone {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.num_sample >= self.total_samples {
            return None;
        }
        self.num_sample += 1;

        let t = self.num_sample as f32 / self.sample_rate as f32;
        let envelope = 1.0 - self.num_sample as f32 / self.total_samples as f32;
        let sample = (2.0 * PI * self.freq * t).sin();

        Some(sample * envelope * 0.2) // Lower amplitude to prevent clipping
    }
}

impl Source for AlertTone {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.total_samples - self.num_sample)
    }

    fn channels(&self) -> u16 {
        1 // Mono
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_secs_f32(
            self.total_samples as f32 / self.sample_rate as f32,
        ))
    }
}
