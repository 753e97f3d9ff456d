//! Ghost recording and playback
//!
//! A ghost is the player's position trace sampled at a fixed interval.
//! Playback holds the last frame and never interpolates.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::SAMPLE_EPSILON;

/// Player position and facing for one frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayerPose {
    pub pos: Vec2,
    /// Facing angle (radians)
    pub facing: f32,
}

impl PlayerPose {
    pub fn new(x: f32, y: f32, facing: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            facing,
        }
    }
}

/// One recorded ghost frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GhostSample {
    /// Run time of the sample (seconds)
    pub time: f64,
    pub x: f32,
    pub y: f32,
    pub facing: f32,
}

impl GhostSample {
    pub fn pose(&self) -> PlayerPose {
        PlayerPose::new(self.x, self.y, self.facing)
    }
}

/// Fixed-rate position sampler with a hard sample cap
#[derive(Debug, Clone)]
pub struct GhostRecorder {
    interval: f64,
    max_samples: usize,
    samples: Vec<GhostSample>,
    last_time: Option<f64>,
    capped: bool,
}

impl GhostRecorder {
    pub fn new(interval: f64, max_samples: usize) -> Self {
        Self {
            interval,
            max_samples,
            samples: Vec::new(),
            last_time: None,
            capped: false,
        }
    }

    /// Offer a pose at run time `time`. Returns true if it was recorded.
    ///
    /// Samples are at least `interval` apart; once the cap is reached
    /// recording stops for the rest of the run. The spacing check allows
    /// `SAMPLE_EPSILON` of float rounding so frame-accumulated times that
    /// land on the interval (six 60 fps frames) still count as due.
    pub fn record(&mut self, time: f64, pose: PlayerPose) -> bool {
        if self.samples.len() >= self.max_samples {
            if !self.capped {
                self.capped = true;
                log::debug!("Ghost sample cap ({}) reached at {:.1}s", self.max_samples, time);
            }
            return false;
        }

        if let Some(last) = self.last_time {
            if time + SAMPLE_EPSILON < last + self.interval {
                return false;
            }
        }

        self.samples.push(GhostSample {
            time,
            x: pose.pos.x,
            y: pose.pos.y,
            facing: pose.facing,
        });
        self.last_time = Some(time);
        true
    }

    pub fn samples(&self) -> &[GhostSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_capped(&self) -> bool {
        self.capped
    }

}

/// First sample at or after `time`, or the last sample past the end
pub fn sample_at(samples: &[GhostSample], time: f64) -> Option<&GhostSample> {
    let index = samples.partition_point(|s| s.time < time);
    samples.get(index).or_else(|| samples.last())
}
