//! Scalar and box value ranges sampled from an injected RNG.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{SkyError, SkyResult};

/// A scalar value that can be constant or a random range.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Reflect)]
pub enum ScalarRange {
    Constant(f32),
    Random(f32, f32),
}

impl Default for ScalarRange {
    fn default() -> Self {
        Self::Constant(1.0)
    }
}

impl ScalarRange {
    /// Get the minimum value.
    pub fn min_val(&self) -> f32 {
        match self {
            Self::Constant(v) => *v,
            Self::Random(a, _) => *a,
        }
    }

    /// Get the maximum value.
    pub fn max_val(&self) -> f32 {
        match self {
            Self::Constant(v) => *v,
            Self::Random(_, b) => *b,
        }
    }

    /// Sample a value in `[min, max)`.
    pub fn sample(&self, rng: &mut fastrand::Rng) -> f32 {
        match self {
            Self::Constant(v) => *v,
            Self::Random(a, b) => *a + (*b - *a) * rng.f32(),
        }
    }

    /// Check the range is finite, ordered, and (optionally) strictly positive.
    pub fn validate(&self, name: &'static str, positive: bool) -> SkyResult<()> {
        let (min, max) = (self.min_val(), self.max_val());
        let ordered = min.is_finite() && max.is_finite() && min <= max;
        if !ordered || (positive && min <= 0.0) {
            return Err(SkyError::InvalidRange { name, min, max });
        }
        Ok(())
    }
}

/// Axis-aligned box that particle positions are drawn from.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Reflect)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box of the given total size centered on `center`.
    pub fn from_size(center: Vec3, size: Vec3) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn validate(&self) -> SkyResult<()> {
        let finite = self.min.is_finite() && self.max.is_finite();
        if !finite || self.min.cmpgt(self.max).any() {
            return Err(SkyError::InvalidBounds {
                min: self.min.to_array(),
                max: self.max.to_array(),
            });
        }
        Ok(())
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Uniform point inside the box.
    pub fn sample(&self, rng: &mut fastrand::Rng) -> Vec3 {
        let t = Vec3::new(rng.f32(), rng.f32(), rng.f32());
        self.min + (self.max - self.min) * t
    }
}
