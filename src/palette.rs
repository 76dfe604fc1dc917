//! Weighted color palettes.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{SkyError, SkyResult};

/// One palette color with its relative weight.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Reflect)]
pub struct PaletteEntry {
    pub color: Srgba,
    /// Relative sampling weight; need not sum to 1 across the palette.
    pub weight: f32,
    /// Multiplier applied to the scale of particles that draw this color.
    #[serde(default = "one")]
    pub scale_boost: f32,
}

fn one() -> f32 {
    1.0
}

impl PaletteEntry {
    pub fn new(color: Srgba, weight: f32) -> Self {
        Self {
            color,
            weight,
            scale_boost: 1.0,
        }
    }

    pub fn with_scale_boost(mut self, boost: f32) -> Self {
        self.scale_boost = boost;
        self
    }
}

/// A small fixed set of colors sampled with weighted probability.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Reflect)]
pub struct WeightedPalette {
    pub entries: Vec<PaletteEntry>,
}

impl WeightedPalette {
    pub fn new(entries: Vec<PaletteEntry>) -> Self {
        Self { entries }
    }

    /// Equal weights for every color.
    pub fn uniform(colors: &[Srgba]) -> Self {
        Self {
            entries: colors.iter().map(|c| PaletteEntry::new(*c, 1.0)).collect(),
        }
    }

    /// Reject empty palettes and weights that are negative, non-finite, or
    /// all zero, and non-positive scale boosts.
    pub fn validate(&self) -> SkyResult<()> {
        if self.entries.is_empty() {
            return Err(SkyError::InvalidPalette("palette has no colors".into()));
        }
        for (i, entry) in self.entries.iter().enumerate() {
            if !entry.weight.is_finite() || entry.weight < 0.0 {
                return Err(SkyError::InvalidPalette(format!(
                    "entry {} has weight {}",
                    i, entry.weight
                )));
            }
            if !entry.scale_boost.is_finite() || entry.scale_boost <= 0.0 {
                return Err(SkyError::InvalidPalette(format!(
                    "entry {} has scale boost {}",
                    i, entry.scale_boost
                )));
            }
        }
        if self.total_weight() <= 0.0 {
            return Err(SkyError::InvalidPalette("all weights are zero".into()));
        }
        Ok(())
    }

    pub fn total_weight(&self) -> f32 {
        self.entries.iter().map(|e| e.weight).sum()
    }

    /// Index of a weighted-random entry.
    ///
    /// Assumes [`validate`](Self::validate) passed.
    pub fn sample_index(&self, rng: &mut fastrand::Rng) -> usize {
        let mut roll = rng.f32() * self.total_weight();
        for (i, entry) in self.entries.iter().enumerate() {
            if roll < entry.weight {
                return i;
            }
            roll -= entry.weight;
        }
        // Float rounding can leave `roll` marginally past the last bucket
        self.entries
            .iter()
            .rposition(|e| e.weight > 0.0)
            .unwrap_or(0)
    }

    pub fn sample(&self, rng: &mut fastrand::Rng) -> &PaletteEntry {
        &self.entries[self.sample_index(rng)]
    }
}
