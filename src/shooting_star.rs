//! Shooting-star actors: timed entities that fly a parabolic arc.
//!
//! Each actor cycles forever: it waits out a random countdown, flies once
//! along a freshly randomized arc, then resets. A small fixed pool of actors
//! lives for the whole scene, which bounds how many streaks can overlap.

use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, PrimitiveTopology};
use bevy::prelude::*;
use bevy_glow_material::ArcRibbonUniform;
use serde::{Deserialize, Serialize};

use crate::error::{SkyError, SkyResult};
use crate::layer::{FrameParams, LayerDraw, RenderableLayer};
use crate::palette::WeightedPalette;
use crate::range::ScalarRange;
use crate::scene::SkyCamera;

/// Step used to estimate the arc tangent.
const TANGENT_STEP: f32 = 0.001;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Randomization ranges and timing constants for shooting stars.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Reflect)]
pub struct ShootingStarConfig {
    /// Update ticks spent waiting before each flight.
    pub delay_ticks: ScalarRange,
    /// Progress gained per update tick while active.
    pub speed: ScalarRange,
    /// Chance a flight starts on the left and travels right.
    pub left_probability: f32,
    /// Distance of the start point from the center line.
    pub start_offset_x: ScalarRange,
    pub start_y: ScalarRange,
    /// Unsigned horizontal span of the arc.
    pub arc_span: ScalarRange,
    pub peak_height: ScalarRange,
    /// Arc progress covered by the tail.
    pub trail_length: ScalarRange,
    pub palette: WeightedPalette,
    /// Progress at activation; negative so the star fades in from nothing.
    pub start_progress: f32,
    /// Progress where the fade-in peaks.
    pub fade_in_end: f32,
    /// Progress span of the fade-out after `fade_in_end`.
    pub fade_out_span: f32,
    /// Progress at which the flight completes and the actor resets.
    pub end_progress: f32,
    pub opacity_exponent: f32,
    /// Opacity ceiling; kept below 1 so no streak is fully opaque.
    pub max_opacity: f32,
    pub ribbon_width: f32,
    pub ribbon_segments: u32,
    /// Ribbon width multiplier at the tail end.
    pub tail_width: f32,
}

impl Default for ShootingStarConfig {
    fn default() -> Self {
        Self {
            delay_ticks: ScalarRange::Random(20.0, 80.0),
            speed: ScalarRange::Random(0.0005, 0.0015),
            left_probability: 0.5,
            start_offset_x: ScalarRange::Random(50.0, 60.0),
            start_y: ScalarRange::Random(-40.0, -30.0),
            arc_span: ScalarRange::Random(80.0, 140.0),
            peak_height: ScalarRange::Random(25.0, 45.0),
            trail_length: ScalarRange::Random(0.08, 0.15),
            palette: WeightedPalette::uniform(&[
                Srgba::rgb_u8(0xff, 0xff, 0xff),
                Srgba::rgb_u8(0xff, 0xf4, 0xe0),
                Srgba::rgb_u8(0xff, 0xd7, 0x00),
                Srgba::rgb_u8(0xff, 0xee, 0xaa),
            ]),
            start_progress: -0.1,
            fade_in_end: 0.1,
            fade_out_span: 0.8,
            end_progress: 1.2,
            opacity_exponent: 1.5,
            max_opacity: 0.85,
            ribbon_width: 0.3,
            ribbon_segments: 32,
            tail_width: 0.25,
        }
    }
}

impl ShootingStarConfig {
    pub fn validate(&self) -> SkyResult<()> {
        self.delay_ticks.validate("delay_ticks", false)?;
        self.speed.validate("speed", true)?;
        self.start_offset_x.validate("start_offset_x", false)?;
        self.start_y.validate("start_y", false)?;
        self.arc_span.validate("arc_span", true)?;
        self.peak_height.validate("peak_height", false)?;
        self.trail_length.validate("trail_length", true)?;
        self.palette.validate()?;
        if !(0.0..=1.0).contains(&self.left_probability) {
            return Err(SkyError::InvalidProbability(self.left_probability));
        }
        if !(self.start_progress < 0.0
            && self.fade_in_end > 0.0
            && self.fade_out_span > 0.0
            && self.end_progress > self.fade_in_end)
        {
            return Err(SkyError::InvalidRange {
                name: "progress",
                min: self.start_progress,
                max: self.end_progress,
            });
        }
        if !(self.max_opacity > 0.0 && self.max_opacity <= 1.0) {
            return Err(SkyError::InvalidRange {
                name: "max_opacity",
                min: 0.0,
                max: self.max_opacity,
            });
        }
        if self.ribbon_segments == 0 {
            return Err(SkyError::InvalidRange {
                name: "ribbon_segments",
                min: 1.0,
                max: 0.0,
            });
        }
        Ok(())
    }

    /// Opacity for progress `t`: quick linear fade-in, slower linear
    /// fade-out, softened by the exponent and capped by `max_opacity`.
    pub fn opacity_at(&self, t: f32) -> f32 {
        let linear = if t < self.fade_in_end {
            t / self.fade_in_end
        } else {
            1.0 - (t - self.fade_in_end) / self.fade_out_span
        };
        linear.clamp(0.0, 1.0).powf(self.opacity_exponent) * self.max_opacity
    }
}

// ---------------------------------------------------------------------------
// Arc path
// ---------------------------------------------------------------------------

/// Parabolic arc `x = start_x + p·arc_width`,
/// `y = start_y + peak_height·(1 − (2p − 1)²)`, peaking at `p = 0.5`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ArcPath {
    pub start_x: f32,
    pub start_y: f32,
    /// Signed: positive flies left to right.
    pub arc_width: f32,
    pub peak_height: f32,
    pub trail_length: f32,
}

impl ArcPath {
    pub fn position(&self, p: f32) -> Vec2 {
        let s = 2.0 * p - 1.0;
        Vec2::new(
            self.start_x + p * self.arc_width,
            self.start_y + self.peak_height * (1.0 - s * s),
        )
    }

    /// Unit normal across the arc at `p`.
    pub fn normal(&self, p: f32) -> Vec2 {
        let dir = (self.position(p + TANGENT_STEP) - self.position(p)).normalize_or_zero();
        Vec2::new(-dir.y, dir.x)
    }

    /// `samples` points from the head at `t` back along the tail.
    pub fn trail(&self, t: f32, samples: usize) -> Vec<Vec2> {
        if samples < 2 {
            return vec![self.position(t)];
        }
        (0..samples)
            .map(|i| {
                let v = i as f32 / (samples - 1) as f32;
                self.position(t - v * self.trail_length)
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

/// Lifecycle state of a shooting star.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StarState {
    /// Counting down update ticks until the next flight.
    Waiting { countdown: f32 },
    /// Flying along the arc.
    Active,
}

/// One shooting star cycling between waiting and flying.
#[derive(Clone, Debug)]
pub struct ShootingStar {
    config: ShootingStarConfig,
    state: StarState,
    t: f32,
    speed: f32,
    path: ArcPath,
    color: LinearRgba,
    opacity: f32,
    /// Completed resets, including the initial one.
    cycles: u64,
}

impl ShootingStar {
    /// Create a waiting star with freshly randomized parameters.
    ///
    /// Rejects configs that could never complete a flight, such as a
    /// non-positive speed.
    pub fn new(config: ShootingStarConfig, rng: &mut fastrand::Rng) -> SkyResult<Self> {
        config.validate()?;
        let mut star = Self {
            config,
            state: StarState::Waiting { countdown: 0.0 },
            t: 0.0,
            speed: 0.0,
            path: ArcPath::default(),
            color: LinearRgba::WHITE,
            opacity: 0.0,
            cycles: 0,
        };
        star.reset(rng);
        Ok(star)
    }

    /// Override the remaining countdown.
    pub fn with_countdown(mut self, countdown: f32) -> Self {
        self.state = StarState::Waiting { countdown };
        self
    }

    /// Start a new cycle: wait again, rewind progress and re-randomize
    /// speed, arc geometry, trail length and color.
    pub fn reset(&mut self, rng: &mut fastrand::Rng) {
        let c = &self.config;
        let countdown = c.delay_ticks.sample(rng);
        self.speed = c.speed.sample(rng);
        let from_left = rng.f32() < c.left_probability;
        let direction = if from_left { 1.0 } else { -1.0 };
        let start_x = -direction * c.start_offset_x.sample(rng);
        let start_y = c.start_y.sample(rng);
        let arc_width = direction * c.arc_span.sample(rng);
        let peak_height = c.peak_height.sample(rng);
        let trail_length = c.trail_length.sample(rng);
        self.path = ArcPath {
            start_x,
            start_y,
            arc_width,
            peak_height,
            trail_length,
        };
        self.color = LinearRgba::from(c.palette.sample(rng).color);
        self.state = StarState::Waiting { countdown };
        self.t = c.start_progress;
        self.opacity = 0.0;
        self.cycles += 1;
    }

    /// Advance one tick of the lifecycle.
    pub fn update(&mut self, rng: &mut fastrand::Rng) {
        match self.state {
            StarState::Waiting { countdown } => {
                let countdown = countdown - 1.0;
                self.state = if countdown <= 0.0 {
                    StarState::Active
                } else {
                    StarState::Waiting { countdown }
                };
            }
            StarState::Active => {
                self.t += self.speed;
                self.opacity = self.config.opacity_at(self.t);
                if self.t >= self.config.end_progress {
                    self.reset(rng);
                }
            }
        }
    }

    pub fn state(&self) -> StarState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == StarState::Active
    }

    /// Progress along the arc.
    pub fn progress(&self) -> f32 {
        self.t
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn path(&self) -> &ArcPath {
        &self.path
    }

    pub fn color(&self) -> LinearRgba {
        self.color
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn config(&self) -> &ShootingStarConfig {
        &self.config
    }

    /// Head position on the arc.
    pub fn head(&self) -> Vec2 {
        self.path.position(self.t)
    }

    pub fn uniform(&self) -> ArcRibbonUniform {
        ArcRibbonUniform {
            color: self.color,
            t: self.t,
            start_x: self.path.start_x,
            start_y: self.path.start_y,
            arc_width: self.path.arc_width,
            peak_height: self.path.peak_height,
            trail_length: self.path.trail_length,
            opacity: self.opacity,
            tail_width: self.config.tail_width,
        }
    }
}

impl RenderableLayer for ShootingStar {
    // Flight is tick-driven through `update`, not clock-driven
    fn advance(&mut self, _frame: &FrameParams) {}

    fn render(&self, _camera: &SkyCamera) -> LayerDraw {
        if self.is_active() {
            LayerDraw::Ribbon(self.uniform())
        } else {
            LayerDraw::Hidden
        }
    }
}

/// The fixed set of shooting stars for a scene.
#[derive(Clone, Debug)]
pub struct ShootingStarPool {
    stars: Vec<ShootingStar>,
}

impl ShootingStarPool {
    pub fn new(count: usize, config: &ShootingStarConfig, rng: &mut fastrand::Rng) -> SkyResult<Self> {
        if count == 0 {
            return Err(SkyError::EmptyPool);
        }
        let stars = (0..count)
            .map(|_| ShootingStar::new(config.clone(), rng))
            .collect::<SkyResult<Vec<_>>>()?;
        Ok(Self { stars })
    }

    pub fn update(&mut self, rng: &mut fastrand::Rng) {
        for star in &mut self.stars {
            star.update(rng);
        }
    }

    pub fn stars(&self) -> &[ShootingStar] {
        &self.stars
    }

    pub fn into_stars(self) -> Vec<ShootingStar> {
        self.stars
    }

    pub fn active_count(&self) -> usize {
        self.stars.iter().filter(|s| s.is_active()).count()
    }
}

/// Flat strip for the ribbon material: two columns across, `segments`
/// rows from head (`uv.y = 0`) to tail (`uv.y = 1`).
pub fn ribbon_mesh(width: f32, segments: u32) -> Mesh {
    let segments = segments.max(1);
    let rows = segments + 1;
    let mut positions = Vec::with_capacity(rows as usize * 2);
    let mut uvs = Vec::with_capacity(rows as usize * 2);
    let mut indices = Vec::with_capacity(segments as usize * 6);

    for row in 0..rows {
        let v = row as f32 / segments as f32;
        for column in 0..2 {
            let u = column as f32;
            positions.push([(u - 0.5) * width, 0.0, 0.0]);
            uvs.push([u, v]);
        }
    }
    for row in 0..segments {
        let a = row * 2;
        let (b, c, d) = (a + 1, a + 2, a + 3);
        indices.extend_from_slice(&[a, c, b, b, c, d]);
    }

    Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    )
    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
    .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
    .with_inserted_indices(Indices::U32(indices))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_speed_config(speed: f32) -> ShootingStarConfig {
        ShootingStarConfig {
            speed: ScalarRange::Constant(speed),
            ..default()
        }
    }

    fn run_until_active(star: &mut ShootingStar, rng: &mut fastrand::Rng) {
        for _ in 0..1000 {
            if star.is_active() {
                return;
            }
            star.update(rng);
        }
        panic!("star never activated");
    }

    #[test]
    fn countdown_leads_to_active() {
        let mut rng = fastrand::Rng::with_seed(1);
        let mut star = ShootingStar::new(ShootingStarConfig::default(), &mut rng)
            .unwrap()
            .with_countdown(5.0);
        for _ in 0..4 {
            star.update(&mut rng);
            assert!(!star.is_active());
        }
        star.update(&mut rng);
        assert!(star.is_active());
        assert!(star.progress() < 0.0);
        assert_eq!(star.opacity(), 0.0);
    }

    #[test]
    fn waiting_star_draws_nothing() {
        let mut rng = fastrand::Rng::with_seed(2);
        let star = ShootingStar::new(ShootingStarConfig::default(), &mut rng).unwrap();
        assert!(matches!(star.state(), StarState::Waiting { .. }));
        assert_eq!(star.render(&SkyCamera::default()), LayerDraw::Hidden);
        assert_eq!(star.opacity(), 0.0);
    }

    #[test]
    fn opacity_rises_then_falls_within_ceiling() {
        let config = fixed_speed_config(0.001);
        let mut rng = fastrand::Rng::with_seed(3);
        let mut star = ShootingStar::new(config.clone(), &mut rng)
            .unwrap()
            .with_countdown(1.0);
        run_until_active(&mut star, &mut rng);

        let mut previous = (star.progress(), star.opacity());
        let start_cycles = star.cycles();
        while star.cycles() == start_cycles {
            star.update(&mut rng);
            if star.cycles() != start_cycles {
                break;
            }
            let (t, opacity) = (star.progress(), star.opacity());
            assert_eq!(star.head(), star.path().position(t));
            assert!((0.0..=config.max_opacity).contains(&opacity), "opacity {opacity} at {t}");
            if t < config.fade_in_end {
                assert!(opacity >= previous.1, "fade-in dipped at t={t}");
            } else if previous.0 >= config.fade_in_end {
                assert!(opacity <= previous.1, "fade-out rose at t={t}");
            }
            if t < 0.0 {
                assert_eq!(opacity, 0.0);
            }
            previous = (t, opacity);
        }
        // Completion lands back at the start of a fresh cycle
        assert!(star.progress() < 0.0);
        assert_eq!(star.opacity(), 0.0);
    }

    #[test]
    fn opacity_curve_shape() {
        let c = ShootingStarConfig::default();
        assert_eq!(c.opacity_at(-0.1), 0.0);
        assert_eq!(c.opacity_at(0.0), 0.0);
        assert!((c.opacity_at(0.1) - 0.85).abs() < 1e-6);
        assert!((c.opacity_at(0.05) - 0.5f32.powf(1.5) * 0.85).abs() < 1e-6);
        assert_eq!(c.opacity_at(0.9), 0.0);
        assert_eq!(c.opacity_at(1.2), 0.0);
        assert!(c.opacity_at(0.5) < c.opacity_at(0.2));
    }

    #[test]
    fn reset_rerandomizes_every_parameter() {
        let mut rng = fastrand::Rng::with_seed(4);
        let mut star = ShootingStar::new(ShootingStarConfig::default(), &mut rng).unwrap();
        let trials = 200;
        let mut differing = [0usize; 6];
        let mut recolored = 0;
        for _ in 0..trials {
            let (before_path, before_speed) = (*star.path(), star.speed());
            let before_color = star.color();
            star.reset(&mut rng);
            if star.color() != before_color {
                recolored += 1;
            }
            let after = star.path();
            let pairs = [
                (before_speed, star.speed()),
                (before_path.start_x, after.start_x),
                (before_path.start_y, after.start_y),
                (before_path.arc_width, after.arc_width),
                (before_path.peak_height, after.peak_height),
                (before_path.trail_length, after.trail_length),
            ];
            for (slot, (a, b)) in differing.iter_mut().zip(pairs) {
                if a != b {
                    *slot += 1;
                }
            }
            assert_eq!(star.progress(), -0.1);
            assert!(matches!(star.state(), StarState::Waiting { .. }));
        }
        for count in differing {
            assert!(count as f32 >= trials as f32 * 0.95);
        }
        // Four equally weighted colors: about three resets in four recolor
        assert!(recolored * 2 >= trials, "recolored {recolored} of {trials}");
    }

    #[test]
    fn new_rejects_configs_that_never_finish() {
        let mut rng = fastrand::Rng::with_seed(9);
        assert!(matches!(
            ShootingStar::new(fixed_speed_config(0.0), &mut rng),
            Err(SkyError::InvalidRange { name: "speed", .. })
        ));
        let no_fade_in = ShootingStarConfig {
            fade_in_end: 0.0,
            ..default()
        };
        assert!(matches!(
            ShootingStar::new(no_fade_in, &mut rng),
            Err(SkyError::InvalidRange { name: "progress", .. })
        ));
    }

    #[test]
    fn completion_triggers_reset() {
        let config = fixed_speed_config(0.05);
        let mut rng = fastrand::Rng::with_seed(5);
        let mut star = ShootingStar::new(config, &mut rng)
            .unwrap()
            .with_countdown(1.0);
        run_until_active(&mut star, &mut rng);
        let cycles = star.cycles();
        let old_path = *star.path();
        // -0.1 to 1.2 at 0.05 per tick takes about 26 ticks
        let mut ticks = 0;
        while star.cycles() == cycles && ticks < 40 {
            star.update(&mut rng);
            ticks += 1;
        }
        assert!((25..=27).contains(&ticks), "reset after {ticks} ticks");
        assert_eq!(star.cycles(), cycles + 1);
        assert!(star.progress() < 0.0);
        assert_ne!(*star.path(), old_path);
    }

    #[test]
    fn arc_direction_matches_start_side() {
        let mut rng = fastrand::Rng::with_seed(6);
        let mut star = ShootingStar::new(ShootingStarConfig::default(), &mut rng).unwrap();
        for _ in 0..100 {
            let path = star.path();
            assert!(path.start_x * path.arc_width < 0.0);
            assert!((50.0..=60.0).contains(&path.start_x.abs()));
            assert!((80.0..=140.0).contains(&path.arc_width.abs()));
            star.reset(&mut rng);
        }
    }

    #[test]
    fn arc_peaks_halfway() {
        let path = ArcPath {
            start_x: -50.0,
            start_y: -30.0,
            arc_width: 100.0,
            peak_height: 20.0,
            trail_length: 0.1,
        };
        assert_eq!(path.position(0.0), Vec2::new(-50.0, -30.0));
        assert_eq!(path.position(0.5), Vec2::new(0.0, -10.0));
        assert_eq!(path.position(1.0), Vec2::new(50.0, -30.0));
        let n = path.normal(0.5);
        assert!((n - Vec2::Y).length() < 1e-3);

        let trail = path.trail(0.5, 5);
        assert_eq!(trail.len(), 5);
        assert_eq!(trail[0], path.position(0.5));
        assert!((trail[4] - path.position(0.4)).length() < 1e-4);
    }

    #[test]
    fn pool_is_fixed_size_and_validated() {
        let mut rng = fastrand::Rng::with_seed(7);
        assert_eq!(
            ShootingStarPool::new(0, &ShootingStarConfig::default(), &mut rng).unwrap_err(),
            SkyError::EmptyPool
        );
        let bad = fixed_speed_config(0.0);
        assert!(matches!(
            ShootingStarPool::new(4, &bad, &mut rng),
            Err(SkyError::InvalidRange { name: "speed", .. })
        ));

        let mut pool = ShootingStarPool::new(4, &ShootingStarConfig::default(), &mut rng).unwrap();
        let mut peak_active = 0;
        // Slowest cycle: 80 waiting ticks plus 1.3 / 0.0005 = 2600 flying ticks
        for _ in 0..10_000 {
            pool.update(&mut rng);
            assert_eq!(pool.stars().len(), 4);
            let active = pool.active_count();
            assert!(active <= 4);
            peak_active = peak_active.max(active);
        }
        assert!(peak_active >= 1);
        // The initial reset counts as one cycle, so three more means three flights
        assert!(
            pool.stars().iter().all(|s| s.cycles() >= 4),
            "cycles {:?}",
            pool.stars().iter().map(|s| s.cycles()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn ribbon_mesh_layout() {
        let mesh = ribbon_mesh(0.3, 32);
        assert_eq!(mesh.count_vertices(), 66);
        assert_eq!(mesh.indices().map(|i| i.len()), Some(32 * 6));
    }
}
