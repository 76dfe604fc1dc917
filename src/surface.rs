//! Render surface adapter: a transparent, click-through overlay window kept
//! in sync with the scene composer, plus a pull-based frame clock.

use std::time::Instant;

use bevy::prelude::*;
use bevy::window::{
    CompositeAlphaMode, CursorOptions, MonitorSelection, PrimaryWindow, WindowLevel, WindowMode,
    WindowResized,
};

use crate::scene::SkyScene;

/// Marks the camera whose projection follows [`SkyScene`].
#[derive(Component, Debug, Default)]
pub struct SkyViewCamera;

/// Host-facing settings for the overlay surface.
#[derive(Clone, Debug)]
pub struct SurfaceSettings {
    pub title: String,
    /// CSS selector of the canvas to draw into on the web.
    pub canvas: Option<String>,
    /// Keep the window above other windows on desktop.
    pub always_on_top: bool,
}

impl Default for SurfaceSettings {
    fn default() -> Self {
        Self {
            title: "Ambient Sky".to_string(),
            canvas: None,
            always_on_top: false,
        }
    }
}

/// Startup ordering for the sky: the surface is sized before anything that
/// reads the camera spawns.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkySystems {
    FitSurface,
    Spawn,
}

/// Compositor alpha mode that lets the desktop show through cleared pixels.
pub fn overlay_alpha_mode() -> CompositeAlphaMode {
    #[cfg(target_os = "macos")]
    {
        CompositeAlphaMode::PostMultiplied
    }
    #[cfg(target_os = "linux")]
    {
        CompositeAlphaMode::PreMultiplied
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    {
        CompositeAlphaMode::Auto
    }
}

/// A transparent window with no decorations that fills its parent canvas,
/// or the current monitor when there is no canvas.
pub fn overlay_window(settings: &SurfaceSettings) -> Window {
    let mode = if settings.canvas.is_some() {
        WindowMode::Windowed
    } else {
        WindowMode::BorderlessFullscreen(MonitorSelection::Current)
    };
    Window {
        title: settings.title.clone(),
        transparent: true,
        composite_alpha_mode: overlay_alpha_mode(),
        decorations: false,
        mode,
        canvas: settings.canvas.clone(),
        fit_canvas_to_parent: true,
        prevent_default_event_handling: false,
        window_level: if settings.always_on_top {
            WindowLevel::AlwaysOnTop
        } else {
            WindowLevel::Normal
        },
        ..default()
    }
}

/// Keeps the surface transparent, pointer-transparent and sized.
pub struct SkySurfacePlugin;

impl Plugin for SkySurfacePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(Color::NONE))
            .configure_sets(Startup, (SkySystems::FitSurface, SkySystems::Spawn).chain())
            .add_systems(
                Startup,
                (pass_pointer_through, fit_scene_to_window).in_set(SkySystems::FitSurface),
            )
            .add_systems(PreUpdate, track_window_resize);
    }
}

/// Let every pointer event fall through to whatever is behind the surface.
fn pass_pointer_through(mut cursor_options: Query<&mut CursorOptions>) {
    for mut opts in cursor_options.iter_mut() {
        opts.hit_test = false;
    }
}

/// Size the scene to the primary window before the first frame.
fn fit_scene_to_window(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut scene: ResMut<SkyScene>,
    mut cameras: Query<&mut Projection, With<SkyViewCamera>>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    scene.resize(window.width(), window.height(), window.scale_factor());
    for mut projection in cameras.iter_mut() {
        *projection = scene.camera().projection();
    }
}

fn track_window_resize(
    mut events: MessageReader<WindowResized>,
    windows: Query<&Window>,
    mut scene: ResMut<SkyScene>,
    mut cameras: Query<&mut Projection, With<SkyViewCamera>>,
) {
    // Only the latest size matters
    let Some(event) = events.read().last() else {
        return;
    };
    let scale_factor = windows
        .get(event.window)
        .map(|w| w.scale_factor())
        .unwrap_or(1.0);
    scene.resize(event.width, event.height, scale_factor);
    for mut projection in cameras.iter_mut() {
        *projection = scene.camera().projection();
    }
    debug!(
        "Sky surface resized to {}x{} (pixel ratio {})",
        event.width,
        event.height,
        scene.pixel_ratio()
    );
}

// ---------------------------------------------------------------------------
// Frame clock
// ---------------------------------------------------------------------------

/// A monotonic source of elapsed seconds.
pub trait FrameClock {
    fn elapsed_secs(&mut self) -> f32;
}

/// Wall-clock time since construction.
#[derive(Clone, Copy, Debug)]
pub struct WallClock {
    start: Instant,
}

impl WallClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for WallClock {
    fn elapsed_secs(&mut self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }
}

/// Steps a fixed amount on every read. For tests and headless runs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ManualClock {
    elapsed: f32,
    step: f32,
}

impl ManualClock {
    pub fn new(step: f32) -> Self {
        Self { elapsed: 0.0, step }
    }

    pub fn starting_at(elapsed: f32, step: f32) -> Self {
        Self { elapsed, step }
    }
}

impl FrameClock for ManualClock {
    fn elapsed_secs(&mut self) -> f32 {
        let now = self.elapsed;
        self.elapsed += self.step;
        now
    }
}

/// One scheduled frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTick {
    pub index: u64,
    pub elapsed: f32,
}

/// Endless, lazy sequence of frame ticks read from a clock.
///
/// The driver decides the cadence by how often it pulls; dropping the
/// iterator stops the loop.
#[derive(Clone, Debug)]
pub struct FrameTicks<C> {
    clock: C,
    index: u64,
}

impl<C: FrameClock> Iterator for FrameTicks<C> {
    type Item = FrameTick;

    fn next(&mut self) -> Option<FrameTick> {
        let tick = FrameTick {
            index: self.index,
            elapsed: self.clock.elapsed_secs(),
        };
        self.index += 1;
        Some(tick)
    }
}

pub fn frame_ticks<C: FrameClock>(clock: C) -> FrameTicks<C> {
    FrameTicks { clock, index: 0 }
}
