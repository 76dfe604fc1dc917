//! # Ambient Sky
//!
//! A decorative, non-interactive night sky for Bevy: twinkling stars,
//! drifting fireflies and the occasional shooting star, composited
//! additively over a transparent, click-through surface.
//!
//! ## Quick Start
//!
//! ```no_run
//! use bevy::prelude::*;
//! use ambient_sky::SkyPlugin;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(SkyPlugin::default())
//!         .run();
//! }
//! ```
//!
//! ## Layers
//!
//! Every particle field is one mesh and one [`GlowPointMaterial`] draw. The
//! particles never move on the CPU: each frame only the shared time and
//! pixel ratio uniforms change, and the vertex shader evaluates the same
//! formulas found in [`motion`].
//!
//! Shooting stars are tick-driven actors that wait, fly one parabolic arc,
//! and start over with fresh random parameters.
//!
//! ## Configuration
//!
//! [`SkyConfig`] is plain serde data. Load it from RON with
//! [`SkyConfig::load_or_default`] or start from a preset in [`presets`].

pub mod config;
pub mod error;
pub mod field;
pub mod layer;
pub mod motion;
pub mod palette;
pub mod plugin;
pub mod presets;
pub mod range;
pub mod scene;
pub mod shooting_star;
pub mod surface;

pub use config::SkyConfig;
pub use error::{SkyError, SkyResult};
pub use plugin::{ShootingStarActor, SkyFieldLayer, SkyPlugin, SkyRng};

pub use field::{FieldConfig, ParticleField};
pub use layer::{FrameParams, LayerDraw, RenderableLayer};
pub use motion::MotionProfile;
pub use palette::{PaletteEntry, WeightedPalette};
pub use scene::{SkyCamera, SkyScene, clamp_pixel_ratio};
pub use shooting_star::{ShootingStar, ShootingStarConfig, ShootingStarPool, StarState};
pub use surface::{
    FrameClock, FrameTick, ManualClock, SkySystems, SurfaceSettings, frame_ticks, overlay_window,
};

pub use bevy_glow_material::{ArcRibbonMaterial, GlowPointMaterial};
