//! Particle fields: fixed-size sets of static particle attributes animated
//! entirely from one shared time value.

use std::f32::consts::TAU;

use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, PrimitiveTopology};
use bevy::prelude::*;
use bevy_glow_material::ATTRIBUTE_PARTICLE;
use serde::{Deserialize, Serialize};

use crate::error::{SkyError, SkyResult};
use crate::layer::{FrameParams, LayerDraw, RenderableLayer};
use crate::motion::{self, MotionProfile, SpriteSample};
use crate::palette::WeightedPalette;
use crate::range::{Bounds, ScalarRange};
use crate::scene::SkyCamera;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Everything needed to generate one particle field.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Reflect)]
pub struct FieldConfig {
    /// Display name, also used for the spawned entity.
    pub name: String,
    pub count: u32,
    pub bounds: Bounds,
    /// Scale factor distribution; must be strictly positive.
    pub scale: ScalarRange,
    pub palette: WeightedPalette,
    /// Fraction of particles flagged steady instead of twinkling.
    pub steady_probability: f32,
    pub motion: MotionProfile,
}

impl FieldConfig {
    pub fn validate(&self) -> SkyResult<()> {
        if self.count == 0 {
            return Err(SkyError::EmptyField);
        }
        self.bounds.validate()?;
        if self.scale.validate("scale", true).is_err() {
            return Err(SkyError::InvalidScaleRange(
                self.scale.min_val(),
                self.scale.max_val(),
            ));
        }
        self.palette.validate()?;
        if !(0.0..=1.0).contains(&self.steady_probability) {
            return Err(SkyError::InvalidProbability(self.steady_probability));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Field
// ---------------------------------------------------------------------------

/// Read-only view of one particle's static attributes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub scale: f32,
    /// Oscillator phase offset in `[0, 2π)`.
    pub phase: f32,
    pub color: LinearRgba,
    /// 1.0 = steady, 0.0 = twinkling.
    pub kind: f32,
}

/// A fixed population of particles stored as parallel attribute arrays.
///
/// Attributes are written once by [`ParticleField::generate`] and never
/// change; only the shared time and pixel ratio move from frame to frame.
#[derive(Clone, Debug)]
pub struct ParticleField {
    name: String,
    motion: MotionProfile,
    positions: Vec<Vec3>,
    scales: Vec<f32>,
    phases: Vec<f32>,
    colors: Vec<LinearRgba>,
    kinds: Vec<f32>,
    time: f32,
    pixel_ratio: f32,
}

impl ParticleField {
    /// Generate `config.count` particles from the injected RNG.
    ///
    /// Per particle the draw order is position, scale, phase, kind, color,
    /// so a fixed seed always yields the same field.
    pub fn generate(config: &FieldConfig, rng: &mut fastrand::Rng) -> SkyResult<Self> {
        config.validate()?;

        let count = config.count as usize;
        let mut positions = Vec::with_capacity(count);
        let mut scales = Vec::with_capacity(count);
        let mut phases = Vec::with_capacity(count);
        let mut colors = Vec::with_capacity(count);
        let mut kinds = Vec::with_capacity(count);

        for _ in 0..count {
            positions.push(config.bounds.sample(rng));
            let scale = config.scale.sample(rng);
            phases.push(rng.f32() * TAU);
            kinds.push(if rng.f32() < config.steady_probability {
                1.0
            } else {
                0.0
            });
            let entry = config.palette.sample(rng);
            scales.push(scale * entry.scale_boost);
            colors.push(LinearRgba::from(entry.color));
        }

        Ok(Self {
            name: config.name.clone(),
            motion: config.motion,
            positions,
            scales,
            phases,
            colors,
            kinds,
            time: 0.0,
            pixel_ratio: 1.0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn motion(&self) -> &MotionProfile {
        &self.motion
    }

    /// Shared animation time last pushed by [`advance`](Self::advance).
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn scales(&self) -> &[f32] {
        &self.scales
    }

    pub fn phases(&self) -> &[f32] {
        &self.phases
    }

    pub fn colors(&self) -> &[LinearRgba] {
        &self.colors
    }

    pub fn kinds(&self) -> &[f32] {
        &self.kinds
    }

    pub fn particle(&self, index: usize) -> Option<Particle> {
        Some(Particle {
            position: *self.positions.get(index)?,
            scale: self.scales[index],
            phase: self.phases[index],
            color: self.colors[index],
            kind: self.kinds[index],
        })
    }

    /// Push the shared time. One scalar update, no per-particle work.
    pub fn advance(&mut self, time: f32) {
        self.time = time;
    }

    /// Evaluate every particle on the CPU for the current time.
    pub fn sample(&self, camera: &SkyCamera) -> Vec<SpriteSample> {
        let view_from_world = camera.view_from_world();
        (0..self.len())
            .map(|i| {
                motion::evaluate(
                    &self.motion,
                    self.positions[i],
                    self.scales[i],
                    self.phases[i],
                    self.kinds[i],
                    self.time,
                    self.pixel_ratio,
                    &view_from_world,
                )
            })
            .collect()
    }

    /// Build the sprite mesh: one four-vertex quad per particle, all four
    /// corners sharing the particle center.
    pub fn build_mesh(&self) -> Mesh {
        const CORNERS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

        let n = self.len();
        let mut positions = Vec::with_capacity(n * 4);
        let mut uvs = Vec::with_capacity(n * 4);
        let mut particles = Vec::with_capacity(n * 4);
        let mut colors = Vec::with_capacity(n * 4);
        let mut indices = Vec::with_capacity(n * 6);

        for i in 0..n {
            let base = (i * 4) as u32;
            let packed = [self.scales[i], self.phases[i], self.kinds[i]];
            let c = self.colors[i];
            let color = [c.red, c.green, c.blue, c.alpha];
            for corner in CORNERS {
                positions.push(self.positions[i].to_array());
                uvs.push(corner);
                particles.push(packed);
                colors.push(color);
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::default(),
        )
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
        .with_inserted_attribute(ATTRIBUTE_PARTICLE, particles)
        .with_inserted_attribute(Mesh::ATTRIBUTE_COLOR, colors)
        .with_inserted_indices(Indices::U32(indices))
    }
}

impl RenderableLayer for ParticleField {
    fn advance(&mut self, frame: &FrameParams) {
        self.advance(frame.elapsed);
        self.pixel_ratio = frame.pixel_ratio;
    }

    fn render(&self, _camera: &SkyCamera) -> LayerDraw {
        LayerDraw::Points(self.motion.uniform(self.time, self.pixel_ratio))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::PaletteEntry;
    use crate::presets;
    use std::f32::consts::PI;

    fn frame(elapsed: f32) -> FrameParams {
        FrameParams {
            elapsed,
            pixel_ratio: 2.0,
            index: 0,
        }
    }

    fn small_config(count: u32) -> FieldConfig {
        FieldConfig {
            count,
            ..presets::golden_fireflies()
        }
    }

    #[test]
    fn zero_count_is_rejected() {
        let mut rng = fastrand::Rng::with_seed(0);
        assert_eq!(
            ParticleField::generate(&small_config(0), &mut rng).unwrap_err(),
            SkyError::EmptyField
        );
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let mut rng = fastrand::Rng::with_seed(0);
        let mut config = small_config(10);
        config.steady_probability = 1.5;
        assert!(matches!(
            ParticleField::generate(&config, &mut rng),
            Err(SkyError::InvalidProbability(_))
        ));

        let mut config = small_config(10);
        config.scale = ScalarRange::Random(0.0, 1.0);
        assert!(matches!(
            ParticleField::generate(&config, &mut rng),
            Err(SkyError::InvalidScaleRange(..))
        ));

        let mut config = small_config(10);
        config.palette = WeightedPalette::new(vec![PaletteEntry::new(Srgba::WHITE, 0.0)]);
        assert!(matches!(
            ParticleField::generate(&config, &mut rng),
            Err(SkyError::InvalidPalette(_))
        ));

        let mut config = small_config(10);
        config.bounds = Bounds::new(Vec3::splat(1.0), Vec3::splat(-1.0));
        assert!(matches!(
            ParticleField::generate(&config, &mut rng),
            Err(SkyError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn attribute_arrays_are_parallel() {
        let mut rng = fastrand::Rng::with_seed(5);
        let field = ParticleField::generate(&presets::stars(), &mut rng).unwrap();
        assert_eq!(field.len(), 1500);
        assert_eq!(field.scales().len(), field.len());
        assert_eq!(field.phases().len(), field.len());
        assert_eq!(field.colors().len(), field.len());
        assert_eq!(field.kinds().len(), field.len());
        assert!(field.phases().iter().all(|p| (0.0..TAU).contains(p)));
        assert!(field.scales().iter().all(|s| *s > 0.0));
        assert!(field.kinds().iter().all(|k| *k == 0.0 || *k == 1.0));
    }

    #[test]
    fn same_seed_same_field() {
        let config = small_config(64);
        let a = ParticleField::generate(&config, &mut fastrand::Rng::with_seed(42)).unwrap();
        let b = ParticleField::generate(&config, &mut fastrand::Rng::with_seed(42)).unwrap();
        assert_eq!(a.positions(), b.positions());
        assert_eq!(a.scales(), b.scales());
        assert_eq!(a.phases(), b.phases());
        assert_eq!(a.colors(), b.colors());
        let c = ParticleField::generate(&config, &mut fastrand::Rng::with_seed(43)).unwrap();
        assert_ne!(a.positions(), c.positions());
    }

    #[test]
    fn attributes_do_not_change_across_frames() {
        let mut rng = fastrand::Rng::with_seed(9);
        let mut field = ParticleField::generate(&presets::fireflies(), &mut rng).unwrap();
        let before: Vec<Particle> = (0..field.len()).filter_map(|i| field.particle(i)).collect();
        for i in 0..120 {
            RenderableLayer::advance(&mut field, &frame(i as f32 / 60.0));
        }
        let after: Vec<Particle> = (0..field.len()).filter_map(|i| field.particle(i)).collect();
        assert_eq!(before, after);
        assert!((field.time() - 119.0 / 60.0).abs() < 1e-6);
        assert!(field.particle(field.len()).is_none());
    }

    #[test]
    fn steady_fraction_tracks_probability() {
        let mut rng = fastrand::Rng::with_seed(21);
        let field = ParticleField::generate(&presets::stars(), &mut rng).unwrap();
        let steady = field.kinds().iter().filter(|k| **k == 1.0).count() as f32;
        let fraction = steady / field.len() as f32;
        assert!((fraction - 0.15).abs() < 0.04, "steady fraction {fraction}");
    }

    #[test]
    fn bold_entries_boost_scale() {
        let mut config = small_config(200);
        config.scale = ScalarRange::Constant(0.5);
        let field = ParticleField::generate(&config, &mut fastrand::Rng::with_seed(4)).unwrap();
        let bold = LinearRgba::from(presets::FIREFLY_ORANGE);
        for i in 0..field.len() {
            let p = field.particle(i).unwrap();
            if p.color == bold {
                assert!((p.scale - 0.6).abs() < 1e-6);
            } else {
                assert_eq!(p.scale, 0.5);
            }
        }
    }

    #[test]
    fn end_to_end_bounds_and_time_variation() {
        let config = FieldConfig {
            count: 150,
            bounds: Bounds::new(Vec3::new(-10.0, -5.0, -5.0), Vec3::new(10.0, 5.0, 5.0)),
            ..presets::golden_fireflies()
        };
        let mut field = ParticleField::generate(&config, &mut fastrand::Rng::with_seed(2)).unwrap();
        assert!(field.positions().iter().all(|p| (-10.0..=10.0).contains(&p.x)));

        let camera = SkyCamera::default();
        RenderableLayer::advance(&mut field, &frame(0.0));
        let at_zero = field.sample(&camera);
        RenderableLayer::advance(&mut field, &frame(PI));
        let at_pi = field.sample(&camera);

        assert_eq!(at_zero.len(), 150);
        let varied = (0..field.len()).any(|i| {
            field.phases()[i] != 0.0 && (at_zero[i].alpha - at_pi[i].alpha).abs() > 1e-3
        });
        assert!(varied);
    }

    #[test]
    fn mesh_has_four_vertices_per_particle() {
        let field =
            ParticleField::generate(&small_config(10), &mut fastrand::Rng::with_seed(1)).unwrap();
        let mesh = field.build_mesh();
        assert_eq!(mesh.count_vertices(), 40);
        assert_eq!(mesh.indices().map(|i| i.len()), Some(60));
        assert!(mesh.attribute(ATTRIBUTE_PARTICLE).is_some());
        assert!(mesh.attribute(Mesh::ATTRIBUTE_COLOR).is_some());
    }

    #[test]
    fn render_snapshot_carries_time_and_pixel_ratio() {
        let mut field =
            ParticleField::generate(&small_config(3), &mut fastrand::Rng::with_seed(1)).unwrap();
        RenderableLayer::advance(&mut field, &frame(4.5));
        match field.render(&SkyCamera::default()) {
            LayerDraw::Points(u) => {
                assert_eq!(u.time, 4.5);
                assert_eq!(u.pixel_ratio, 2.0);
            }
            other => panic!("unexpected draw {other:?}"),
        }
    }
}
