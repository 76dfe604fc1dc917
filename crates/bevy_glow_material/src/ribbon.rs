use bevy::{
    mesh::MeshVertexBufferLayoutRef,
    pbr::{MaterialPipeline, MaterialPipelineKey},
    prelude::*,
    render::render_resource::{
        AsBindGroup, RenderPipelineDescriptor, ShaderType, SpecializedMeshPipelineError,
    },
    shader::ShaderRef,
};

/// Uniform data for the arc ribbon shader.
///
/// The ribbon head sits at progress `t` on the arc
/// `x = start_x + p * arc_width`, `y = start_y + peak_height * (1 - (2p - 1)^2)`
/// and the tail trails back to `t - trail_length`.
#[derive(Clone, Copy, ShaderType, Debug, PartialEq)]
pub struct ArcRibbonUniform {
    pub color: LinearRgba,
    /// Head progress along the arc
    pub t: f32,
    pub start_x: f32,
    pub start_y: f32,
    /// Signed horizontal span; negative arcs travel right to left
    pub arc_width: f32,
    pub peak_height: f32,
    /// Arc progress covered by the tail
    pub trail_length: f32,
    pub opacity: f32,
    /// Ribbon width multiplier at the tail end (1.0 = no taper)
    pub tail_width: f32,
}

impl Default for ArcRibbonUniform {
    fn default() -> Self {
        Self {
            color: LinearRgba::WHITE,
            t: 0.0,
            start_x: 0.0,
            start_y: 0.0,
            arc_width: 0.0,
            peak_height: 0.0,
            trail_length: 0.1,
            opacity: 0.0,
            tail_width: 0.25,
        }
    }
}

/// Bends a strip mesh along a parabolic arc and shades it as a streak.
///
/// The strip's `POSITION.x` is the offset across the ribbon, `UV_0.y` runs
/// from 0 at the head to 1 at the tail.
#[derive(Asset, AsBindGroup, TypePath, Debug, Clone, Default)]
pub struct ArcRibbonMaterial {
    #[uniform(0)]
    pub uniform: ArcRibbonUniform,
}

impl Material for ArcRibbonMaterial {
    fn vertex_shader() -> ShaderRef {
        "embedded://bevy_glow_material/arc_ribbon.wgsl".into()
    }

    fn fragment_shader() -> ShaderRef {
        "embedded://bevy_glow_material/arc_ribbon.wgsl".into()
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
        ])?;
        descriptor.vertex.buffers = vec![vertex_layout];
        descriptor.primitive.cull_mode = None;
        if let Some(depth_stencil) = descriptor.depth_stencil.as_mut() {
            depth_stencil.depth_write_enabled = false;
        }
        Ok(())
    }
}
