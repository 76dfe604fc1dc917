use std::path::PathBuf;

use bevy::camera::visibility::NoFrustumCulling;
use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::prelude::*;
use bevy::render::RenderApp;
use bevy_glow_material::{ArcRibbonMaterial, GlowMaterialPlugin, GlowPointMaterial};

use crate::config::SkyConfig;
use crate::error::{SkyError, SkyResult};
use crate::field::ParticleField;
use crate::layer::{LayerDraw, RenderableLayer};
use crate::scene::SkyScene;
use crate::shooting_star::{ShootingStar, ShootingStarPool, ribbon_mesh};
use crate::surface::{SkySurfacePlugin, SkySystems, SkyViewCamera};

/// Adds the ambient sky overlay to an app that already has `DefaultPlugins`.
#[derive(Default)]
pub struct SkyPlugin {
    pub config: SkyConfig,
    /// RON file read at build time; `config` is the fallback.
    pub config_path: Option<PathBuf>,
}

impl SkyPlugin {
    pub fn new(config: SkyConfig) -> Self {
        Self {
            config,
            config_path: None,
        }
    }

    /// Load the config from `path` when the plugin is built, falling back to
    /// `fallback` if the file is missing or invalid.
    pub fn from_file(path: impl Into<PathBuf>, fallback: SkyConfig) -> Self {
        Self {
            config: fallback,
            config_path: Some(path.into()),
        }
    }
}

impl Plugin for SkyPlugin {
    fn build(&self, app: &mut App) {
        if let Err(e) = check_render_capability(app) {
            error!("{}; ambient sky disabled", e);
            return;
        }

        let config = match &self.config_path {
            Some(path) => SkyConfig::load_or(path, self.config.clone()),
            None => self.config.clone(),
        };
        let seed = config.resolve_seed();
        app.register_type::<SkyConfig>()
            .insert_resource(SkyScene::new(config.camera, config.max_pixel_ratio))
            .insert_resource(config)
            .insert_resource(SkyRng::new(seed))
            .add_plugins((GlowMaterialPlugin, SkySurfacePlugin))
            .add_systems(Startup, spawn_sky.in_set(SkySystems::Spawn))
            .add_systems(Update, advance_sky);
    }
}

/// The sky needs Bevy's render sub-app for its materials.
pub fn check_render_capability(app: &App) -> SkyResult<()> {
    if app.get_sub_app(RenderApp).is_none() {
        return Err(SkyError::MissingRenderCapability(
            "no render sub-app (is RenderPlugin enabled?)".into(),
        ));
    }
    Ok(())
}

/// Seeded random source shared by every sky system.
#[derive(Resource, Debug)]
pub struct SkyRng {
    pub rng: fastrand::Rng,
    pub seed: u64,
}

impl SkyRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
            seed,
        }
    }
}

/// A particle field drawn by this entity's [`GlowPointMaterial`].
#[derive(Component, Debug)]
pub struct SkyFieldLayer {
    pub field: ParticleField,
}

/// A shooting star drawn by this entity's [`ArcRibbonMaterial`].
#[derive(Component, Debug)]
pub struct ShootingStarActor {
    pub star: ShootingStar,
}

fn spawn_sky(
    mut commands: Commands,
    config: Res<SkyConfig>,
    scene: Res<SkyScene>,
    mut rng: ResMut<SkyRng>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut point_materials: ResMut<Assets<GlowPointMaterial>>,
    mut ribbon_materials: ResMut<Assets<ArcRibbonMaterial>>,
) {
    let camera = scene.camera();
    commands.spawn((
        Name::new("Sky Camera"),
        SkyViewCamera,
        Camera3d::default(),
        Camera {
            clear_color: ClearColorConfig::Custom(Color::NONE),
            ..default()
        },
        Tonemapping::None,
        camera.projection(),
        camera.transform(),
    ));

    let mut layer_count = 0;
    let mut particle_count = 0;
    for layer in &config.layers {
        let field = match ParticleField::generate(layer, &mut rng.rng) {
            Ok(field) => field,
            Err(e) => {
                error!("Skipping sky layer '{}': {}", layer.name, e);
                continue;
            }
        };
        layer_count += 1;
        particle_count += field.len();

        let material = GlowPointMaterial::new(field.motion().uniform(0.0, scene.pixel_ratio()));
        commands.spawn((
            Name::new(field.name().to_string()),
            Mesh3d(meshes.add(field.build_mesh())),
            MeshMaterial3d(point_materials.add(material)),
            Transform::IDENTITY,
            NoFrustumCulling,
            SkyFieldLayer { field },
        ));
    }

    let mut star_count = 0;
    if config.shooting_star_count > 0 {
        let stars = &config.shooting_stars;
        match ShootingStarPool::new(config.shooting_star_count, stars, &mut rng.rng) {
            Ok(pool) => {
                let mesh = meshes.add(ribbon_mesh(stars.ribbon_width, stars.ribbon_segments));
                for (i, star) in pool.into_stars().into_iter().enumerate() {
                    let material = ArcRibbonMaterial {
                        uniform: star.uniform(),
                    };
                    commands.spawn((
                        Name::new(format!("Shooting Star {}", i)),
                        Mesh3d(mesh.clone()),
                        MeshMaterial3d(ribbon_materials.add(material)),
                        Transform::IDENTITY,
                        Visibility::Hidden,
                        NoFrustumCulling,
                        ShootingStarActor { star },
                    ));
                    star_count += 1;
                }
            }
            Err(e) => error!("Skipping shooting stars: {}", e),
        }
    }

    info!(
        "Ambient sky ready: {} layers, {} particles, {} shooting stars (seed {})",
        layer_count, particle_count, star_count, rng.seed
    );
}

/// Run one composer pass and copy the draw snapshots into material assets.
fn advance_sky(
    time: Res<Time>,
    mut scene: ResMut<SkyScene>,
    mut rng: ResMut<SkyRng>,
    mut fields: Query<(&mut SkyFieldLayer, &MeshMaterial3d<GlowPointMaterial>)>,
    mut stars: Query<(
        &mut ShootingStarActor,
        &MeshMaterial3d<ArcRibbonMaterial>,
        &mut Visibility,
    )>,
    mut point_materials: ResMut<Assets<GlowPointMaterial>>,
    mut ribbon_materials: ResMut<Assets<ArcRibbonMaterial>>,
) {
    let mut field_handles = Vec::new();
    let mut layers: Vec<&mut dyn RenderableLayer> = Vec::new();
    for (layer, material) in fields.iter_mut() {
        field_handles.push(material.0.clone());
        layers.push(&mut layer.into_inner().field);
    }

    let mut star_targets = Vec::new();
    let mut actors: Vec<&mut ShootingStar> = Vec::new();
    for (actor, material, visibility) in stars.iter_mut() {
        star_targets.push((material.0.clone(), visibility));
        actors.push(&mut actor.into_inner().star);
    }

    let rng = &mut rng.rng;
    let composed = scene.compose(time.elapsed_secs(), &mut layers, &mut actors, rng);

    for (handle, draw) in field_handles.iter().zip(composed.layers) {
        if let (Some(mat), LayerDraw::Points(uniform)) = (point_materials.get_mut(handle), draw) {
            mat.uniform = uniform;
        }
    }

    for ((handle, mut visibility), draw) in star_targets.into_iter().zip(composed.stars) {
        match draw {
            LayerDraw::Ribbon(uniform) => {
                if let Some(mat) = ribbon_materials.get_mut(&handle) {
                    mat.uniform = uniform;
                }
                visibility.set_if_neq(Visibility::Inherited);
            }
            _ => {
                visibility.set_if_neq(Visibility::Hidden);
            }
        }
    }
}
