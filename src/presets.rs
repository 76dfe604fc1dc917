//! Built-in field and scene presets.

use bevy::prelude::*;

use crate::config::SkyConfig;
use crate::field::FieldConfig;
use crate::motion::MotionProfile;
use crate::palette::{PaletteEntry, WeightedPalette};
use crate::range::{Bounds, ScalarRange};
use crate::scene::SkyCamera;
use crate::shooting_star::ShootingStarConfig;

pub const STAR_WARM: Srgba = Srgba::rgb(1.0, 0.957, 0.878); // #fff4e0
pub const STAR_COOL: Srgba = Srgba::rgb(0.878, 0.957, 1.0); // #e0f4ff
pub const STAR_WHITE: Srgba = Srgba::WHITE;
pub const STAR_GOLD: Srgba = Srgba::rgb(1.0, 0.843, 0.0); // #ffd700

/// Single warm glow shared by every night firefly.
pub const FIREFLY_GLOW: Srgba = Srgba::rgb(1.0, 0.95, 0.6);

pub const FIREFLY_GOLD: Srgba = Srgba::rgb(1.0, 0.667, 0.0); // #ffaa00
/// The bold meadow hue; drawn 1.2x larger than the others.
pub const FIREFLY_ORANGE: Srgba = Srgba::rgb(1.0, 0.467, 0.0); // #ff7700
pub const FIREFLY_YELLOW: Srgba = Srgba::rgb(1.0, 0.8, 0.0); // #ffcc00

/// 1500 twinkling stars in a deep slab behind the camera's focus.
pub fn stars() -> FieldConfig {
    FieldConfig {
        name: "Stars".into(),
        count: 1500,
        bounds: Bounds::new(Vec3::new(-62.5, -52.5, -50.0), Vec3::new(62.5, 52.5, 10.0)),
        scale: ScalarRange::Random(0.6, 1.5),
        palette: WeightedPalette::uniform(&[STAR_WARM, STAR_COOL, STAR_WHITE, STAR_GOLD]),
        steady_probability: 0.15,
        motion: MotionProfile::stars(),
    }
}

/// 70 large, slowly drifting fireflies that pulse in and out.
pub fn fireflies() -> FieldConfig {
    FieldConfig {
        name: "Fireflies".into(),
        count: 70,
        bounds: Bounds::from_size(Vec3::ZERO, Vec3::new(45.0, 35.0, 15.0)),
        scale: ScalarRange::Constant(1.0),
        palette: WeightedPalette::uniform(&[FIREFLY_GLOW]),
        steady_probability: 0.0,
        motion: MotionProfile::fireflies(),
    }
}

/// 150 golden fireflies in a compact box, mostly gold with a few bold
/// orange glows.
pub fn golden_fireflies() -> FieldConfig {
    FieldConfig {
        name: "Golden Fireflies".into(),
        count: 150,
        bounds: Bounds::from_size(Vec3::ZERO, Vec3::new(20.0, 10.0, 10.0)),
        scale: ScalarRange::Random(0.05, 1.0),
        palette: WeightedPalette::new(vec![
            PaletteEntry::new(FIREFLY_GOLD, 0.6),
            PaletteEntry::new(FIREFLY_ORANGE, 0.2).with_scale_boost(1.2),
            PaletteEntry::new(FIREFLY_YELLOW, 0.2),
        ]),
        steady_probability: 0.0,
        motion: MotionProfile::golden_fireflies(),
    }
}

/// Stars, fireflies and four shooting stars.
pub fn night_sky() -> SkyConfig {
    SkyConfig {
        seed: None,
        max_pixel_ratio: 2.0,
        camera: SkyCamera::default(),
        layers: vec![stars(), fireflies()],
        shooting_stars: ShootingStarConfig::default(),
        shooting_star_count: 4,
    }
}

/// The golden firefly field on its own, viewed from close up.
pub fn firefly_meadow() -> SkyConfig {
    SkyConfig {
        camera: SkyCamera {
            position: Vec3::new(0.0, 0.0, 5.0),
            ..default()
        },
        layers: vec![golden_fireflies()],
        shooting_star_count: 0,
        ..night_sky()
    }
}
