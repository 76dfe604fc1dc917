//! # bevy_glow_material
//!
//! Two additive, depth-unwritten materials for decorative light effects:
//!
//! - [`GlowPointMaterial`] renders every vertex quad of a mesh as a soft,
//!   camera-facing point sprite whose position, size and brightness are
//!   animated on the GPU from a single time uniform.
//! - [`ArcRibbonMaterial`] bends a flat strip mesh along a parabolic arc and
//!   shades it as a streak with a bright head and a fading tail.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bevy::prelude::*;
//! use bevy_glow_material::{GlowMaterialPlugin, GlowPointMaterial};
//!
//! fn main() {
//!     App::new()
//!         .add_plugins((DefaultPlugins, GlowMaterialPlugin))
//!         .add_systems(Update, tick)
//!         .run();
//! }
//!
//! fn tick(time: Res<Time>, mut materials: ResMut<Assets<GlowPointMaterial>>) {
//!     for (_, material) in materials.iter_mut() {
//!         material.uniform.time = time.elapsed_secs();
//!     }
//! }
//! ```

mod point;
mod ribbon;

use bevy::{asset::embedded_asset, pbr::MaterialPlugin, prelude::*};

pub use point::{
    ATTRIBUTE_PARTICLE, GlowPointMaterial, GlowPointUniform, WOBBLE_FROM_PHASE,
    WOBBLE_FROM_POSITION,
};
pub use ribbon::{ArcRibbonMaterial, ArcRibbonUniform};

/// Registers both glow materials and embeds their shaders.
pub struct GlowMaterialPlugin;

impl Plugin for GlowMaterialPlugin {
    fn build(&self, app: &mut App) {
        embedded_asset!(app, "glow_point.wgsl");
        embedded_asset!(app, "arc_ribbon.wgsl");
        app.add_plugins((
            MaterialPlugin::<GlowPointMaterial>::default(),
            MaterialPlugin::<ArcRibbonMaterial>::default(),
        ));
    }
}
