//! Animation Primitives - Frame-Rate Independent Timing
//!
//! Small building blocks shared by every animated thing in the scene:
//! easing curves, time-boxed tweens, and phase arithmetic.
//!
//! # Design Philosophy
//!
//! - **Frame-rate independent**: motion is derived from wall-clock `dt`,
//!   scaled to the 60 Hz reference rate the scene constants are tuned for
//! - **Pure functions of time**: idle motion is evaluated from elapsed
//!   animation time so it resumes cleanly after a pause
//!
//! ```text
//! dt (seconds) ──► reference_frames(dt) ──► per-frame constants
//!              └─► Tween::progress(now) ──► overlay rise / fade
//! ```

use std::f32::consts::TAU;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Display refresh rate the per-frame scene constants were tuned against
pub const REFERENCE_FPS: f32 = 60.0;

/// Convert a wall-clock delta into a number of reference frames
///
/// A per-frame constant `k` becomes `k * reference_frames(dt)` so that
/// animation speed does not depend on the actual frame rate.
#[must_use]
pub fn reference_frames(dt: f32) -> f32 {
    dt.max(0.0) * REFERENCE_FPS
}

/// Wrap a phase into `[0, 2π)`
#[must_use]
pub fn wrap_phase(phase: f32) -> f32 {
    let wrapped = phase.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Easing functions for tweens
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingFunction {
    /// No easing (constant speed)
    #[default]
    Linear,

    /// Slow start, fast end
    EaseIn,

    /// Fast start, slow end
    EaseOut,

    /// Slow start and end
    EaseInOut,

    /// Cubic ease out
    EaseOutCubic,
}

impl EasingFunction {
    /// Apply the easing function to a progress value (0.0 to 1.0)
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => 1.0 - (1.0 - t).powi(2),
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Self::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// A time-boxed interpolation between two values
///
/// Progress is computed from a start instant on the effects clock, so a
/// tween advances only while that clock runs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween {
    started_at: Duration,
    duration: Duration,
    from: f32,
    to: f32,
    easing: EasingFunction,
}

impl Tween {
    /// Create a tween starting at `started_at`
    #[must_use]
    pub fn new(started_at: Duration, duration: Duration, from: f32, to: f32) -> Self {
        Self {
            started_at,
            duration,
            from,
            to,
            easing: EasingFunction::Linear,
        }
    }

    /// Set the easing curve
    #[must_use]
    pub fn with_easing(mut self, easing: EasingFunction) -> Self {
        self.easing = easing;
        self
    }

    /// Raw linear progress in `[0, 1]`
    #[must_use]
    pub fn progress(&self, now: Duration) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.started_at);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    /// Interpolated value at `now`
    #[must_use]
    pub fn value(&self, now: Duration) -> f32 {
        let t = self.easing.apply(self.progress(now));
        self.from + (self.to - self.from) * t
    }

    /// Whether the tween has run its full duration
    #[must_use]
    pub fn is_finished(&self, now: Duration) -> bool {
        now.saturating_sub(self.started_at) >= self.duration
    }

    /// Instant the tween started
    #[must_use]
    pub fn started_at(&self) -> Duration {
        self.started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_frames() {
        assert!((reference_frames(1.0) - 60.0).abs() < f32::EPSILON);
        assert!((reference_frames(-1.0)).abs() < f32::EPSILON);
    }

    #[test]
    fn test_wrap_phase() {
        assert!((wrap_phase(TAU + 1.0) - 1.0).abs() < 1e-5);
        assert!((wrap_phase(-1.0) - (TAU - 1.0)).abs() < 1e-5);
        assert!(wrap_phase(-1e-9) < TAU);
    }

    #[test]
    fn test_easing_endpoints() {
        for easing in [
            EasingFunction::Linear,
            EasingFunction::EaseIn,
            EasingFunction::EaseOut,
            EasingFunction::EaseInOut,
            EasingFunction::EaseOutCubic,
        ] {
            assert!(easing.apply(0.0).abs() < 1e-6);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_tween_progress() {
        let tween = Tween::new(Duration::from_secs(1), Duration::from_secs(4), 4.0, 7.0);
        assert!((tween.value(Duration::from_secs(1)) - 4.0).abs() < 1e-6);
        assert!((tween.value(Duration::from_secs(3)) - 5.5).abs() < 1e-6);
        assert!((tween.value(Duration::from_secs(9)) - 7.0).abs() < 1e-6);
        assert!(!tween.is_finished(Duration::from_secs(4)));
        assert!(tween.is_finished(Duration::from_secs(5)));
    }

    #[test]
    fn test_zero_duration_tween_is_done() {
        let tween = Tween::new(Duration::ZERO, Duration::ZERO, 0.0, 1.0);
        assert!(tween.is_finished(Duration::ZERO));
        assert!((tween.progress(Duration::ZERO) - 1.0).abs() < f32::EPSILON);
    }
}
