//! The renderable layer seam between the scene composer and a backend.
//!
//! The composer never reaches into shader uniforms directly. It hands each
//! layer the frame's parameters through [`RenderableLayer::advance`] and asks
//! for a [`LayerDraw`] snapshot, which the Bevy systems copy into material
//! assets. A software sampler or a test double can consume the same snapshot.

use bevy_glow_material::{ArcRibbonUniform, GlowPointUniform};

use crate::scene::SkyCamera;

/// Per-frame values pushed to every layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameParams {
    /// Seconds since the clock started.
    pub elapsed: f32,
    /// Device pixel ratio after clamping.
    pub pixel_ratio: f32,
    /// Monotonic frame counter, starting at 0.
    pub index: u64,
}

/// Uniform snapshot for one draw call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LayerDraw {
    /// One point-sprite draw covering the whole field.
    Points(GlowPointUniform),
    /// One ribbon draw for a live shooting star.
    Ribbon(ArcRibbonUniform),
    /// Nothing to draw this frame.
    Hidden,
}

/// Something the scene composer advances and draws every frame.
pub trait RenderableLayer {
    /// Receive this frame's shared parameters.
    fn advance(&mut self, frame: &FrameParams);

    /// Describe the draw call for the current state.
    fn render(&self, camera: &SkyCamera) -> LayerDraw;
}
