//! Gain ramps for crossfading
//!
//! A ramp scales a run of interleaved samples by a gain that moves from a
//! start fraction `a` to an end fraction `b` across the run. Sample `i` of
//! `n` sits at the linear position `(a·(n−i) + b·i) / n`; the curve then
//! maps that position to the gain actually applied.
//!
//! Two shapes are provided:
//! - Linear: gain equals the linear position
//! - Sigmoid: a tanh S-curve through the same position, normalized so the
//!   gain is exactly 0.0 at position 0.0 and exactly 1.0 at position 1.0

use crate::config::CrossfadeSettings;
use std::fmt;

/// Default S-curve steepness
pub const DEFAULT_STEEPNESS: f32 = 6.0;

/// Gain trajectory used for fade-out and fade-in ramps
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FadeCurve {
    /// Gain follows position directly
    Linear,

    /// Gain follows `0.5 + 0.5·tanh(k·(x − 0.5))`, rescaled to hit 0 and 1
    /// at the ends. Higher `steepness` concentrates the transition around
    /// the midpoint.
    Sigmoid { steepness: f32 },
}

impl FadeCurve {
    /// Select the curve configured in `settings`
    pub fn from_settings(settings: &CrossfadeSettings) -> Self {
        if settings.use_sigmoid {
            FadeCurve::Sigmoid {
                steepness: settings.sigmoid_steepness as f32,
            }
        } else {
            FadeCurve::Linear
        }
    }

    /// Map a linear position to a gain multiplier
    pub fn gain_at(&self, position: f32) -> f32 {
        match *self {
            FadeCurve::Linear => position,
            FadeCurve::Sigmoid { steepness } => {
                let edge = (0.5 * steepness).tanh();
                if !edge.is_finite() || edge <= f32::EPSILON {
                    // A flat tanh degenerates to the straight line
                    return position;
                }
                0.5 + 0.5 * (steepness * (position - 0.5)).tanh() / edge
            }
        }
    }

    /// Scale `data` in place by this curve, ramping from `a` to `b`
    ///
    /// An empty slice is left untouched.
    pub fn apply(&self, data: &mut [f32], a: f32, b: f32) {
        let length = data.len();
        if length == 0 {
            return;
        }

        let n = length as f32;
        for (i, sample) in data.iter_mut().enumerate() {
            let position = (a * (length - i) as f32 + b * i as f32) / n;
            *sample *= self.gain_at(position);
        }
    }

    /// Short name used in configuration and logs
    pub fn name(&self) -> &'static str {
        match self {
            FadeCurve::Linear => "linear",
            FadeCurve::Sigmoid { .. } => "sigmoid",
        }
    }
}

impl Default for FadeCurve {
    fn default() -> Self {
        FadeCurve::Linear
    }
}

impl fmt::Display for FadeCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FadeCurve::Linear => write!(f, "linear"),
            FadeCurve::Sigmoid { steepness } => write!(f, "sigmoid (steepness {})", steepness),
        }
    }
}

/// Straight-line ramp from `a` to `b` across `data`
pub fn linear_ramp(data: &mut [f32], a: f32, b: f32) {
    FadeCurve::Linear.apply(data, a, b);
}

/// S-curve ramp from `a` to `b` across `data`
pub fn sigmoid_ramp(data: &mut [f32], a: f32, b: f32, steepness: f32) {
    FadeCurve::Sigmoid { steepness }.apply(data, a, b);
}
