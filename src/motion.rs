//! Motion primitives: pure per-particle animation functions.
//!
//! These are the CPU twins of the vertex/fragment stages in
//! `bevy_glow_material`'s `glow_point.wgsl`. Both sides must use the same
//! formulas so the software sampler in [`crate::field`] reproduces what the
//! GPU draws. Nothing here holds state: the same inputs always produce the
//! same outputs.

use bevy::prelude::*;
use bevy_glow_material::{GlowPointUniform, WOBBLE_FROM_PHASE, WOBBLE_FROM_POSITION};
use serde::{Deserialize, Serialize};

/// Numerator of the radial glow falloff `k / d - c`.
pub const GLOW_K: f32 = 0.05;
/// Offset of the radial glow falloff `k / d - c`.
pub const GLOW_C: f32 = 0.1;
/// Smallest view depth used for perspective size attenuation.
pub const MIN_VIEW_DEPTH: f32 = 0.001;
/// Smallest sprite-center distance fed to the glow falloff.
pub const MIN_CENTER_DISTANCE: f32 = 0.0001;

/// GLSL/WGSL `mix`.
#[inline]
pub fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// What drives a particle's positional wobble.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Reflect)]
pub enum WobbleSource {
    /// `x += sin(t·fx + phase)·ax`, `y += cos(t·fy + phase)·ay`
    #[default]
    Phase,
    /// `y += sin(t·fy + x·seed.x)·ay`, then `x += cos(t·fx + y·seed.y)·ax`
    Position(Vec2),
}

/// Per-field animation constants shared by every particle in the field.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Reflect)]
pub struct MotionProfile {
    pub wobble_amplitude: Vec2,
    pub wobble_frequency: Vec2,
    pub wobble_source: WobbleSource,
    /// Multiply wobble amplitude by the particle's scale factor.
    pub wobble_scales_with_size: bool,
    /// Angular rate of the twinkle/pulse oscillator.
    pub pulse_rate: f32,
    /// Sprite diameter in pixels at unit view depth.
    pub base_size: f32,
    /// Size multiplier at zero pulse; 1.0 keeps size constant.
    pub size_floor: f32,
    /// Alpha at the bottom of the flicker.
    pub alpha_floor: f32,
    /// Alpha at the top of the flicker.
    pub alpha_ceiling: f32,
    /// Alpha of steady particles.
    pub steady_alpha: f32,
}

impl Default for MotionProfile {
    fn default() -> Self {
        Self::stars()
    }
}

impl MotionProfile {
    /// Slow, tiny drift with a twinkle; steady stars shine at 0.85.
    pub fn stars() -> Self {
        Self {
            wobble_amplitude: Vec2::splat(0.05),
            wobble_frequency: Vec2::splat(0.02),
            wobble_source: WobbleSource::Phase,
            wobble_scales_with_size: false,
            pulse_rate: 1.5,
            base_size: 6.4,
            size_floor: 0.6,
            alpha_floor: 0.2,
            alpha_ceiling: 1.0,
            steady_alpha: 0.85,
        }
    }

    /// Wide, lazy drift; size follows the pulse all the way down to zero.
    pub fn fireflies() -> Self {
        Self {
            wobble_amplitude: Vec2::new(1.6, 1.1),
            wobble_frequency: Vec2::new(0.4, 0.25),
            wobble_source: WobbleSource::Phase,
            wobble_scales_with_size: false,
            pulse_rate: 0.7,
            base_size: 85.0,
            size_floor: 0.0,
            alpha_floor: 0.2,
            alpha_ceiling: 0.95,
            steady_alpha: 0.95,
        }
    }

    /// Large blinking golden glows that sway with their own position.
    pub fn golden_fireflies() -> Self {
        Self {
            wobble_amplitude: Vec2::new(0.1, 0.2),
            wobble_frequency: Vec2::ONE,
            wobble_source: WobbleSource::Position(Vec2::new(100.0, 10.0)),
            wobble_scales_with_size: true,
            pulse_rate: 1.5,
            base_size: 150.0,
            size_floor: 1.0,
            alpha_floor: 0.0,
            alpha_ceiling: 1.0,
            steady_alpha: 1.0,
        }
    }

    /// Pack into the GPU uniform for one frame.
    pub fn uniform(&self, time: f32, pixel_ratio: f32) -> GlowPointUniform {
        let (wobble_mode, position_seed) = match self.wobble_source {
            WobbleSource::Phase => (WOBBLE_FROM_PHASE, Vec2::ZERO),
            WobbleSource::Position(seed) => (WOBBLE_FROM_POSITION, seed),
        };
        GlowPointUniform {
            time,
            pixel_ratio,
            base_size: self.base_size,
            pulse_rate: self.pulse_rate,
            wobble_amplitude: self.wobble_amplitude,
            wobble_frequency: self.wobble_frequency,
            position_seed,
            wobble_mode,
            scale_wobble: self.wobble_scales_with_size as u32,
            size_floor: self.size_floor,
            alpha_floor: self.alpha_floor,
            alpha_ceiling: self.alpha_ceiling,
            steady_alpha: self.steady_alpha,
            glow_k: GLOW_K,
            glow_c: GLOW_C,
        }
    }
}

// ---------------------------------------------------------------------------
// Primitives
// ---------------------------------------------------------------------------

/// Twinkle/pulse intensity in [0, 1].
#[inline]
pub fn pulse(rate: f32, time: f32, phase: f32) -> f32 {
    0.5 * ((time * rate + phase).sin() + 1.0)
}

/// Pull `pulse` toward a constant 1.0 as `kind` goes from 0 to 1.
#[inline]
pub fn steady_blend(pulse: f32, kind: f32) -> f32 {
    mix(pulse, 1.0, kind)
}

/// World position after wobble.
pub fn wobble(profile: &MotionProfile, time: f32, center: Vec3, scale: f32, phase: f32) -> Vec3 {
    let amp = profile.wobble_amplitude;
    let freq = profile.wobble_frequency;
    let s = if profile.wobble_scales_with_size {
        scale
    } else {
        1.0
    };
    let mut p = center;
    match profile.wobble_source {
        WobbleSource::Phase => {
            p.x += (time * freq.x + phase).sin() * amp.x * s;
            p.y += (time * freq.y + phase).cos() * amp.y * s;
        }
        WobbleSource::Position(seed) => {
            p.y += (time * freq.y + p.x * seed.x).sin() * amp.y * s;
            p.x += (time * freq.x + p.y * seed.y).cos() * amp.x * s;
        }
    }
    p
}

/// Point size in pixels with perspective attenuation.
///
/// `view_z` is the view-space depth (negative in front of the camera).
pub fn point_size(
    profile: &MotionProfile,
    scale: f32,
    pixel_ratio: f32,
    steady_pulse: f32,
    view_z: f32,
) -> f32 {
    let size = profile.base_size * scale * pixel_ratio * mix(profile.size_floor, 1.0, steady_pulse);
    size / (-view_z).max(MIN_VIEW_DEPTH)
}

/// Particle alpha: flicker between floor and ceiling, or fixed when steady.
#[inline]
pub fn alpha(profile: &MotionProfile, pulse: f32, kind: f32) -> f32 {
    let flicker = profile.alpha_floor + (profile.alpha_ceiling - profile.alpha_floor) * pulse;
    mix(flicker, profile.steady_alpha, kind)
}

/// Radial glow strength at distance `d` from the sprite center, clamped at 0.
#[inline]
pub fn glow_strength(d: f32) -> f32 {
    (GLOW_K / d.max(MIN_CENTER_DISTANCE) - GLOW_C).max(0.0)
}

/// Final fragment alpha for a sprite pixel `d` away from the center.
#[inline]
pub fn fragment_alpha(d: f32, alpha: f32) -> f32 {
    (glow_strength(d) * alpha).clamp(0.0, 1.0)
}

/// Everything the GPU computes for one particle in one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteSample {
    /// World position after wobble.
    pub position: Vec3,
    /// Diameter in pixels.
    pub size: f32,
    pub alpha: f32,
}

/// Evaluate every per-vertex primitive for one particle.
pub fn evaluate(
    profile: &MotionProfile,
    center: Vec3,
    scale: f32,
    phase: f32,
    kind: f32,
    time: f32,
    pixel_ratio: f32,
    view_from_world: &Mat4,
) -> SpriteSample {
    let position = wobble(profile, time, center, scale, phase);
    let view_z = view_from_world.transform_point3(position).z;
    let p = pulse(profile.pulse_rate, time, phase);
    SpriteSample {
        position,
        size: point_size(profile, scale, pixel_ratio, steady_blend(p, kind), view_z),
        alpha: alpha(profile, p, kind),
    }
}
