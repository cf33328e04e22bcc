//! GPU mesh: immutable geometry buffers plus the effect and texture set
//! the mesh exclusively owns.

use glam::Mat4;
use spinel_common::{CullMode, Vertex};
use spinel_scene::{EffectKind, MeshData, MeshPaths};
use wgpu::util::DeviceExt;

use crate::effect::{Effect, EffectError, EffectSource};
use crate::texture::TextureSet;

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
    0 => Float32x3, // position
    1 => Float32x3, // normal
    2 => Float32x3, // tangent
    3 => Float32x2, // uv
];

/// Input layout matching the attribute set the shading effects consume.
pub(crate) fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRIBUTES,
    }
}

pub struct Mesh {
    data: MeshData,
    effect: Effect,
    textures: TextureSet,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl Mesh {
    /// Upload geometry, compile the effect from its asset path, and load
    /// the texture set. A missing shader is a typed error; missing
    /// textures degrade to placeholders.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        data: MeshData,
        paths: &MeshPaths,
        kind: EffectKind,
        sampler: &wgpu::Sampler,
        cull_mode: CullMode,
    ) -> Result<Self, EffectError> {
        let source = EffectSource::load(&paths.shader)?;
        let mut effect = Effect::new(
            device,
            surface_format,
            source,
            kind,
            cull_mode,
            vertex_layout(),
        );

        let textures = TextureSet::load(device, queue, paths);
        effect.bind_textures(device, sampler, &textures);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_vertex_buffer"),
            contents: bytemuck::cast_slice(data.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_index_buffer"),
            contents: bytemuck::cast_slice(data.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });
        let index_count = data.index_count();

        Ok(Self {
            data,
            effect,
            textures,
            vertex_buffer,
            index_buffer,
            index_count,
        })
    }

    /// Push the camera-derived matrices together with this mesh's world
    /// rotation into the owned effect.
    pub fn set_matrices(&self, queue: &wgpu::Queue, view_proj: Mat4, inv_view: Mat4) {
        let world = self.data.world_matrix();
        self.effect
            .set_matrices(queue, world, view_proj * world, inv_view);
    }

    pub fn rotate_y(&mut self, radians: f32) {
        self.data.rotate_y(radians);
    }

    /// Rebuild the sampler-dependent bind group after a filter change.
    pub fn rebind_textures(&mut self, device: &wgpu::Device, sampler: &wgpu::Sampler) {
        self.effect.bind_textures(device, sampler, &self.textures);
    }

    /// Rebuild pipelines after a cull mode change.
    pub fn rebuild_pipelines(
        &mut self,
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        cull_mode: CullMode,
    ) {
        self.effect
            .rebuild_pipelines(device, surface_format, cull_mode, vertex_layout());
    }

    /// Bind buffers and issue one indexed draw per technique pass.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        let Some(texture_bind_group) = self.effect.texture_bind_group() else {
            // Textures were never bound; drawing would trip validation.
            return;
        };
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        for pipeline in self.effect.passes() {
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, self.effect.uniform_bind_group(), &[]);
            pass.set_bind_group(1, texture_bind_group, &[]);
            pass.draw_indexed(0..self.index_count, 0, 0..1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layout_covers_the_full_stride() {
        let layout = vertex_layout();
        assert_eq!(layout.array_stride, 44);
        assert_eq!(layout.attributes.len(), 4);
        let last = layout.attributes.last().unwrap();
        assert_eq!(last.offset + 8, layout.array_stride);
    }

    #[test]
    fn vertex_layout_attribute_offsets_are_packed() {
        let layout = vertex_layout();
        let mut expected = 0;
        for attribute in layout.attributes {
            assert_eq!(attribute.offset, expected);
            expected += attribute.format.size();
        }
    }
}
