use bevy::{
    mesh::{MeshVertexAttribute, MeshVertexBufferLayoutRef},
    pbr::{MaterialPipeline, MaterialPipelineKey},
    prelude::*,
    render::render_resource::{
        AsBindGroup, RenderPipelineDescriptor, ShaderType, SpecializedMeshPipelineError,
        VertexFormat,
    },
    shader::ShaderRef,
};

/// Per-particle static attributes packed as `(scale, phase, kind)`.
///
/// `kind` is 0.0 for twinkling particles and 1.0 for steady ones; values in
/// between blend the two behaviours.
pub const ATTRIBUTE_PARTICLE: MeshVertexAttribute =
    MeshVertexAttribute::new("GlowParticle", 917_406_231, VertexFormat::Float32x3);

/// Wobble driven by the particle's phase offset.
pub const WOBBLE_FROM_PHASE: u32 = 0;
/// Wobble driven by the particle's own world position.
pub const WOBBLE_FROM_POSITION: u32 = 1;

/// Uniform data sent to the GPU for the glow point shader.
///
/// Field order matches `GlowPointUniform` in `glow_point.wgsl`.
#[derive(Clone, Copy, ShaderType, Debug, PartialEq)]
pub struct GlowPointUniform {
    /// Shared animation time in seconds
    pub time: f32,
    /// Clamped device pixel ratio
    pub pixel_ratio: f32,
    /// Sprite diameter in pixels at unit view depth
    pub base_size: f32,
    /// Angular rate of the twinkle/pulse oscillator
    pub pulse_rate: f32,
    pub wobble_amplitude: Vec2,
    pub wobble_frequency: Vec2,
    /// Position multipliers used by [`WOBBLE_FROM_POSITION`]
    pub position_seed: Vec2,
    /// [`WOBBLE_FROM_PHASE`] or [`WOBBLE_FROM_POSITION`]
    pub wobble_mode: u32,
    /// Non-zero to scale wobble amplitude by the particle scale
    pub scale_wobble: u32,
    /// Size multiplier at zero pulse (1.0 = constant size)
    pub size_floor: f32,
    pub alpha_floor: f32,
    pub alpha_ceiling: f32,
    /// Alpha used by steady particles
    pub steady_alpha: f32,
    /// Radial falloff `k / d - c`
    pub glow_k: f32,
    pub glow_c: f32,
}

impl Default for GlowPointUniform {
    fn default() -> Self {
        Self {
            time: 0.0,
            pixel_ratio: 1.0,
            base_size: 6.4,
            pulse_rate: 1.5,
            wobble_amplitude: Vec2::splat(0.05),
            wobble_frequency: Vec2::splat(0.02),
            position_seed: Vec2::ZERO,
            wobble_mode: WOBBLE_FROM_PHASE,
            scale_wobble: 0,
            size_floor: 0.6,
            alpha_floor: 0.2,
            alpha_ceiling: 1.0,
            steady_alpha: 0.85,
            glow_k: 0.05,
            glow_c: 0.1,
        }
    }
}

/// Renders each four-vertex quad of a mesh as a glowing point sprite.
///
/// Every vertex of a quad carries the particle center in `POSITION`, its
/// corner in `UV_0`, the packed [`ATTRIBUTE_PARTICLE`] and a color in
/// `COLOR`. Blending is additive and depth writes are disabled.
#[derive(Asset, AsBindGroup, TypePath, Debug, Clone, Default)]
pub struct GlowPointMaterial {
    #[uniform(0)]
    pub uniform: GlowPointUniform,
}

impl GlowPointMaterial {
    pub fn new(uniform: GlowPointUniform) -> Self {
        Self { uniform }
    }
}

impl Material for GlowPointMaterial {
    fn vertex_shader() -> ShaderRef {
        "embedded://bevy_glow_material/glow_point.wgsl".into()
    }

    fn fragment_shader() -> ShaderRef {
        "embedded://bevy_glow_material/glow_point.wgsl".into()
    }

    fn alpha_mode(&self) -> AlphaMode {
        AlphaMode::Add
    }

    fn specialize(
        _pipeline: &MaterialPipeline,
        descriptor: &mut RenderPipelineDescriptor,
        layout: &MeshVertexBufferLayoutRef,
        _key: MaterialPipelineKey<Self>,
    ) -> Result<(), SpecializedMeshPipelineError> {
        let vertex_layout = layout.0.get_layout(&[
            Mesh::ATTRIBUTE_POSITION.at_shader_location(0),
            Mesh::ATTRIBUTE_UV_0.at_shader_location(1),
            ATTRIBUTE_PARTICLE.at_shader_location(2),
            Mesh::ATTRIBUTE_COLOR.at_shader_location(3),
        ])?;
        descriptor.vertex.buffers = vec![vertex_layout];
        // Billboards are double-sided
        descriptor.primitive.cull_mode = None;
        if let Some(depth_stencil) = descriptor.depth_stencil.as_mut() {
            depth_stencil.depth_write_enabled = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_material_is_additive() {
        let material = GlowPointMaterial::default();
        assert_eq!(material.alpha_mode(), AlphaMode::Add);
        assert_eq!(material.uniform.wobble_mode, WOBBLE_FROM_PHASE);
        assert_eq!(ATTRIBUTE_PARTICLE.format, VertexFormat::Float32x3);
    }
}
