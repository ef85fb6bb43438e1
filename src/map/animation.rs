//! Frame clock and marker pulse functions.
//!
//! Animation is a pure function of (frame index, record timestamp,
//! now): no per-marker mutable state, so two computations with the same
//! inputs are identical and the whole system can be tested without a
//! timer. The caller's tick loop is external plumbing; it advances the
//! clock and re-derives phases.

use chrono::{DateTime, Utc};

use crate::state::AnimationStyle;

/// Fixed animation frame rate the cycle is defined against.
pub const FRAMES_PER_SECOND: u32 = 30;

/// Frames per full animation cycle (6 seconds of wall time).
pub const CYCLE_FRAMES: u64 = FRAMES_PER_SECOND as u64 * 6;

/// Monotonic frame counter driving marker animation.
#[derive(Debug, Clone)]
pub struct FrameClock {
    frame: u64,
    speed: f64,
    running: bool,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            frame: 0,
            speed: 1.0,
            running: true,
        }
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances one frame and returns the new index. A stopped clock
    /// holds its frame.
    pub fn advance(&mut self) -> u64 {
        if self.running {
            self.frame = (self.frame + 1) % CYCLE_FRAMES;
        }
        self.frame
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Speed multiplier, clamped to [0.1, 5.0].
    pub fn set_speed(&mut self, speed: f64) {
        if speed.is_finite() {
            self.speed = speed.clamp(0.1, 5.0);
        }
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Suggested tick interval for the caller's timer, in milliseconds.
    pub fn frame_interval_ms(&self) -> u64 {
        (1000.0 / (FRAMES_PER_SECOND as f64 * self.speed)) as u64
    }
}

/// Pulse phase for a record at a frame: recent events pulse fast,
/// day-old events pulse slowly, older events sit at a constant 1.
pub fn pulse_phase(frame: u64, timestamp: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let age_hours = (now - timestamp).num_milliseconds() as f64 / 3_600_000.0;
    let t = frame as f64;

    if age_hours < 1.0 {
        (t * 0.3).sin() * 0.5 + 0.5
    } else if age_hours < 24.0 {
        (t * 0.1).sin() * 0.3 + 0.7
    } else {
        1.0
    }
}

/// Maps a phase through the configured style envelope. The result
/// multiplies marker size/opacity in the paint layer.
pub fn style_value(style: AnimationStyle, phase: f64) -> f64 {
    use std::f64::consts::PI;
    match style {
        AnimationStyle::Off => 1.0,
        AnimationStyle::Pulse => 0.8 + 0.2 * (phase * 2.0 * PI).sin(),
        AnimationStyle::Ripple => 1.0 + 0.5 * (phase * 4.0 * PI).sin() * (-phase * 3.0).exp(),
        AnimationStyle::Fade => (1.0 - phase * 0.7).clamp(0.3, 1.0),
        AnimationStyle::Grow => (0.5 + phase).clamp(0.5, 1.5),
        AnimationStyle::Shake => 1.0 + 0.1 * (phase * 8.0 * PI).sin(),
    }
}
