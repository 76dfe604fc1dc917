//! Standalone ambient sky overlay.
//!
//! Loads the config named by `AMBIENT_SKY_CONFIG` (default
//! `assets/sky.ron`). Pass `--meadow` to use the golden firefly meadow
//! when no config file exists.

use ambient_sky::config::{CONFIG_ENV_VAR, DEFAULT_CONFIG_PATH};
use ambient_sky::surface::{SurfaceSettings, overlay_window};
use ambient_sky::{SkyPlugin, presets};
use bevy::prelude::*;

fn main() {
    let path = std::env::var(CONFIG_ENV_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let fallback = if std::env::args().any(|arg| arg == "--meadow") {
        presets::firefly_meadow()
    } else {
        presets::night_sky()
    };

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(overlay_window(&SurfaceSettings::default())),
            ..default()
        }))
        .add_plugins(SkyPlugin::from_file(path, fallback))
        .run();
}
