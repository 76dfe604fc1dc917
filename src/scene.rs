//! Scene composer: camera, viewport, clock and the per-frame layer pass.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::layer::{FrameParams, LayerDraw, RenderableLayer};
use crate::shooting_star::ShootingStar;

/// Default ceiling for the device pixel ratio.
pub const DEFAULT_MAX_PIXEL_RATIO: f32 = 2.0;

/// Clamp a reported device pixel ratio to `(0, max]`.
///
/// Non-finite or non-positive input falls back to 1.0.
pub fn clamp_pixel_ratio(device_pixel_ratio: f32, max: f32) -> f32 {
    if !device_pixel_ratio.is_finite() || device_pixel_ratio <= 0.0 {
        return 1.0_f32.min(max);
    }
    device_pixel_ratio.min(max)
}

// ---------------------------------------------------------------------------
// Camera / viewport
// ---------------------------------------------------------------------------

/// Perspective camera looking down -Z from `position`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Reflect)]
pub struct SkyCamera {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
}

impl Default for SkyCamera {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            aspect: 1.0,
            near: 0.1,
            far: 1000.0,
            position: Vec3::new(0.0, 0.0, 15.0),
        }
    }
}

impl SkyCamera {
    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position)
    }

    pub fn view_from_world(&self) -> Mat4 {
        Mat4::from_translation(-self.position)
    }

    pub fn clip_from_view(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    /// Bevy projection with the same parameters.
    pub fn projection(&self) -> Projection {
        Projection::Perspective(PerspectiveProjection {
            fov: self.fov_degrees.to_radians(),
            aspect_ratio: self.aspect,
            near: self.near,
            far: self.far,
            ..default()
        })
    }
}

/// Logical size of the drawing surface and its clamped pixel ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub pixel_ratio: f32,
}

impl Viewport {
    /// Backing buffer size in physical pixels.
    pub fn physical_size(&self) -> UVec2 {
        UVec2::new(
            (self.width * self.pixel_ratio).round() as u32,
            (self.height * self.pixel_ratio).round() as u32,
        )
    }
}

// ---------------------------------------------------------------------------
// Composer
// ---------------------------------------------------------------------------

/// Draw snapshots produced by one [`SkyScene::compose`] pass, in input order.
#[derive(Clone, Debug, PartialEq)]
pub struct ComposedFrame {
    pub frame: FrameParams,
    pub layers: Vec<LayerDraw>,
    pub stars: Vec<LayerDraw>,
}

/// Owns the camera, viewport and frame clock state.
#[derive(Resource, Clone, Debug)]
pub struct SkyScene {
    camera: SkyCamera,
    viewport: Viewport,
    max_pixel_ratio: f32,
    elapsed: f32,
    frame_index: u64,
}

impl SkyScene {
    pub fn new(camera: SkyCamera, max_pixel_ratio: f32) -> Self {
        let mut scene = Self {
            camera,
            viewport: Viewport {
                width: 0.0,
                height: 0.0,
                pixel_ratio: 1.0,
            },
            max_pixel_ratio,
            elapsed: 0.0,
            frame_index: 0,
        };
        scene.viewport.pixel_ratio = clamp_pixel_ratio(1.0, max_pixel_ratio);
        scene
    }

    pub fn camera(&self) -> &SkyCamera {
        &self.camera
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.viewport.pixel_ratio
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Frames started so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_index
    }

    /// Track a new surface size and device pixel ratio.
    ///
    /// The aspect ratio is left alone while the height is zero
    /// (minimized windows report 0×0).
    pub fn resize(&mut self, width: f32, height: f32, device_pixel_ratio: f32) {
        self.viewport = Viewport {
            width,
            height,
            pixel_ratio: clamp_pixel_ratio(device_pixel_ratio, self.max_pixel_ratio),
        };
        if height > 0.0 && width > 0.0 {
            self.camera.aspect = width / height;
        }
    }

    /// Start a frame: record the clock reading once and hand out the
    /// parameters every layer sees this frame.
    pub fn begin_frame(&mut self, elapsed: f32) -> FrameParams {
        self.elapsed = elapsed;
        let frame = FrameParams {
            elapsed,
            pixel_ratio: self.viewport.pixel_ratio,
            index: self.frame_index,
        };
        self.frame_index += 1;
        frame
    }

    /// Run one frame: push the time to every layer, tick every shooting
    /// star, then collect each layer's draw snapshot.
    pub fn compose(
        &mut self,
        elapsed: f32,
        layers: &mut [&mut dyn RenderableLayer],
        stars: &mut [&mut ShootingStar],
        rng: &mut fastrand::Rng,
    ) -> ComposedFrame {
        let frame = self.begin_frame(elapsed);
        for layer in layers.iter_mut() {
            layer.advance(&frame);
        }
        for star in stars.iter_mut() {
            star.advance(&frame);
            star.update(rng);
        }
        ComposedFrame {
            frame,
            layers: layers.iter().map(|l| l.render(&self.camera)).collect(),
            stars: stars.iter().map(|s| s.render(&self.camera)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::ParticleField;
    use crate::presets;
    use crate::shooting_star::ShootingStarConfig;

    #[test]
    fn resize_updates_aspect_and_clamps_density() {
        let mut scene = SkyScene::new(SkyCamera::default(), DEFAULT_MAX_PIXEL_RATIO);
        scene.resize(800.0, 600.0, 1.0);
        assert!((scene.camera().aspect - 800.0 / 600.0).abs() < 1e-6);

        scene.resize(1920.0, 1080.0, 3.0);
        assert!((scene.camera().aspect - 1920.0 / 1080.0).abs() < 1e-6);
        assert_eq!(scene.viewport().width, 1920.0);
        assert_eq!(scene.viewport().height, 1080.0);
        assert_eq!(scene.pixel_ratio(), 2.0);
        assert_eq!(scene.viewport().physical_size(), UVec2::new(3840, 2160));
    }

    #[test]
    fn zero_height_keeps_previous_aspect() {
        let mut scene = SkyScene::new(SkyCamera::default(), DEFAULT_MAX_PIXEL_RATIO);
        scene.resize(1600.0, 900.0, 1.0);
        scene.resize(0.0, 0.0, 1.0);
        assert!((scene.camera().aspect - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn pixel_ratio_clamp() {
        assert_eq!(clamp_pixel_ratio(3.0, 2.0), 2.0);
        assert_eq!(clamp_pixel_ratio(1.5, 2.0), 1.5);
        assert_eq!(clamp_pixel_ratio(0.0, 2.0), 1.0);
        assert_eq!(clamp_pixel_ratio(f32::NAN, 2.0), 1.0);
        assert_eq!(clamp_pixel_ratio(-2.0, 2.0), 1.0);
    }

    #[test]
    fn camera_matrices_put_origin_in_front() {
        let camera = SkyCamera::default();
        let view = camera.view_from_world().transform_point3(Vec3::ZERO);
        assert_eq!(view, Vec3::new(0.0, 0.0, -15.0));
        let clip = camera.clip_from_view() * view.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-6 && ndc.y.abs() < 1e-6);
        assert!(matches!(camera.projection(), Projection::Perspective(_)));
    }

    #[test]
    fn compose_pushes_one_time_to_every_layer() {
        let mut rng = fastrand::Rng::with_seed(12);
        let mut scene = SkyScene::new(SkyCamera::default(), DEFAULT_MAX_PIXEL_RATIO);
        scene.resize(1280.0, 720.0, 2.0);

        let mut stars = ParticleField::generate(&presets::stars(), &mut rng).unwrap();
        let mut fireflies = ParticleField::generate(&presets::fireflies(), &mut rng).unwrap();
        let mut shooting = ShootingStar::new(ShootingStarConfig::default(), &mut rng)
            .unwrap()
            .with_countdown(2.0);

        let composed = {
            let mut layers: [&mut dyn RenderableLayer; 2] = [&mut stars, &mut fireflies];
            let mut actors = [&mut shooting];
            scene.compose(1.25, &mut layers, &mut actors, &mut rng)
        };

        assert_eq!(composed.frame.index, 0);
        assert_eq!(stars.time(), 1.25);
        assert_eq!(fireflies.time(), 1.25);
        assert_eq!(composed.layers.len(), 2);
        for draw in &composed.layers {
            match draw {
                LayerDraw::Points(u) => {
                    assert_eq!(u.time, 1.25);
                    assert_eq!(u.pixel_ratio, 2.0);
                }
                other => panic!("unexpected draw {other:?}"),
            }
        }
        // One tick into a two-tick countdown
        assert_eq!(composed.stars, vec![LayerDraw::Hidden]);

        let mut layers: [&mut dyn RenderableLayer; 1] = [&mut stars];
        let composed = scene.compose(1.5, &mut layers, &mut [&mut shooting], &mut rng);
        assert_eq!(composed.frame.index, 1);
        assert!(matches!(composed.stars[0], LayerDraw::Ribbon(_)));
        assert_eq!(scene.frame_count(), 2);
    }
}
