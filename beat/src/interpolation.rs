//! Easing curves for scripted movement.

use std::f32::consts::PI;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Easing curve mapping progress in `[0, 1]` to a blend factor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interpolation {
    #[default]
    Linear,
    Pow2,
    Pow2In,
    Pow2Out,
    Elastic,
    Bounce,
}

const ELASTIC_VALUE: f32 = 2.0;
const ELASTIC_POWER: f32 = 10.0;
const ELASTIC_SCALE: f32 = 1.0;
// seven half-turns; odd counts flip the phase
const ELASTIC_BOUNCES: f32 = -7.0 * PI;

const BOUNCE_WIDTHS: [f32; 4] = [0.68, 0.34, 0.2, 0.15];
const BOUNCE_HEIGHTS: [f32; 4] = [1.0, 0.26, 0.11, 0.03];

impl Interpolation {
    pub fn apply(self, a: f32) -> f32 {
        match self {
            Interpolation::Linear => a,
            Interpolation::Pow2 => {
                if a <= 0.5 {
                    ((a * 2.0).powi(2)) / 2.0
                } else {
                    ((a - 1.0) * 2.0).powi(2) / -2.0 + 1.0
                }
            }
            Interpolation::Pow2In => a * a,
            Interpolation::Pow2Out => -(a - 1.0).powi(2) + 1.0,
            Interpolation::Elastic => elastic(a),
            Interpolation::Bounce => {
                if a <= 0.5 {
                    (1.0 - bounce_edge(1.0 - a * 2.0)) / 2.0
                } else {
                    bounce_edge(a * 2.0 - 1.0) / 2.0 + 0.5
                }
            }
        }
    }

    /// Blend from `start` to `end` by `a` along this curve.
    pub fn apply_range(self, start: f32, end: f32, a: f32) -> f32 {
        start + (end - start) * self.apply(a)
    }
}

fn elastic(a: f32) -> f32 {
    if a <= 0.5 {
        let a = a * 2.0;
        ELASTIC_VALUE.powf(ELASTIC_POWER * (a - 1.0)) * (a * ELASTIC_BOUNCES).sin() * ELASTIC_SCALE
            / 2.0
    } else {
        let a = (1.0 - a) * 2.0;
        1.0 - ELASTIC_VALUE.powf(ELASTIC_POWER * (a - 1.0))
            * (a * ELASTIC_BOUNCES).sin()
            * ELASTIC_SCALE
            / 2.0
    }
}

fn bounce_edge(a: f32) -> f32 {
    let test = a + BOUNCE_WIDTHS[0] / 2.0;
    if test < BOUNCE_WIDTHS[0] {
        return test / (BOUNCE_WIDTHS[0] / 2.0) - 1.0;
    }
    bounce_out(a)
}

fn bounce_out(a: f32) -> f32 {
    if a >= 1.0 {
        return 1.0;
    }
    let mut a = a + BOUNCE_WIDTHS[0] / 2.0;
    let mut width = 0.0;
    let mut height = 0.0;
    for (w, h) in BOUNCE_WIDTHS.iter().zip(BOUNCE_HEIGHTS.iter()) {
        width = *w;
        if a <= width {
            height = *h;
            break;
        }
        a -= width;
    }
    let a = a / width;
    let z = 4.0 / width * height * a;
    1.0 - (z - z * a) * width
}

/// Global override of every entity's curve, chosen in the configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InterpolationOverride {
    /// Use the curve carried by each entity.
    #[default]
    Current,
    /// Skip the animation and jump straight to the target.
    Disabled,
    Linear,
    Elastic,
    Pow2,
    Bounce,
}

impl InterpolationOverride {
    pub fn blend(self, curve: Interpolation, start: f32, end: f32, a: f32) -> f32 {
        match self {
            InterpolationOverride::Current => curve.apply_range(start, end, a),
            InterpolationOverride::Disabled => end,
            InterpolationOverride::Linear => Interpolation::Linear.apply_range(start, end, a),
            InterpolationOverride::Elastic => Interpolation::Elastic.apply_range(start, end, a),
            InterpolationOverride::Pow2 => Interpolation::Pow2.apply_range(start, end, a),
            InterpolationOverride::Bounce => Interpolation::Bounce.apply_range(start, end, a),
        }
    }
}

impl FromStr for InterpolationOverride {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CURRENT" => Ok(Self::Current),
            "DISABLED" => Ok(Self::Disabled),
            "LINEAR" => Ok(Self::Linear),
            "ELASTIC" => Ok(Self::Elastic),
            "POW2" => Ok(Self::Pow2),
            "BOUNCE" => Ok(Self::Bounce),
            other => Err(ConfigError::UnknownInterpolation(other.to_string())),
        }
    }
}
