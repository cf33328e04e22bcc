//! Compiled shader programs and their parameter plumbing.
//!
//! An `Effect` owns one shader module, the matrix uniform buffer, the
//! sampler+texture bind group, and its technique: an ordered list of render
//! pipelines drawn one indexed call per pass.

use std::path::{Path, PathBuf};

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use spinel_common::CullMode;
use spinel_scene::EffectKind;
use wgpu::util::DeviceExt;

use crate::renderer::DEPTH_FORMAT;
use crate::texture::{TextureSet, TextureSlot};

/// Errors from effect construction. A failed effect fails its mesh; the
/// process keeps running.
#[derive(Debug, thiserror::Error)]
pub enum EffectError {
    #[error("failed to read shader source {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Matrix parameters every effect exposes, laid out as the shaders expect.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MatrixUniforms {
    pub world_view_proj: [[f32; 4]; 4],
    pub world: [[f32; 4]; 4],
    pub view_inverse: [[f32; 4]; 4],
}

impl MatrixUniforms {
    fn identity() -> Self {
        Self {
            world_view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            world: Mat4::IDENTITY.to_cols_array_2d(),
            view_inverse: Mat4::IDENTITY.to_cols_array_2d(),
        }
    }
}

/// WGSL source read from an asset path, decoupled from the device so load
/// failures surface before any GPU object exists.
#[derive(Debug, Clone)]
pub struct EffectSource {
    pub label: String,
    pub source: String,
}

impl EffectSource {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EffectError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| EffectError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let label = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "effect".to_string());
        Ok(Self { label, source })
    }
}

/// Texture slots a given effect kind consumes.
pub fn consumed_slots(kind: EffectKind) -> &'static [TextureSlot] {
    match kind {
        EffectKind::Opaque => &TextureSlot::ALL,
        EffectKind::Transparent => &[TextureSlot::Diffuse],
    }
}

/// The left-handed projection mirrors winding: faces that wind
/// counter-clockwise in model space come out clockwise in clip space, so
/// clockwise is front.
fn primitive_state(cull: Option<wgpu::Face>) -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        front_face: wgpu::FrontFace::Cw,
        cull_mode: cull,
        ..Default::default()
    }
}

fn wgpu_cull(mode: CullMode) -> Option<wgpu::Face> {
    match mode {
        CullMode::Back => Some(wgpu::Face::Back),
        CullMode::Front => Some(wgpu::Face::Front),
        CullMode::None => None,
    }
}

pub struct Effect {
    kind: EffectKind,
    label: String,
    shader: wgpu::ShaderModule,
    pipeline_layout: wgpu::PipelineLayout,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    texture_layout: wgpu::BindGroupLayout,
    texture_bind_group: Option<wgpu::BindGroup>,
    passes: Vec<wgpu::RenderPipeline>,
    warned_slots: [bool; 4],
}

impl Effect {
    /// Compile `source` and build the technique for the given cull mode.
    /// Texture bindings are attached later via [`Effect::bind_textures`].
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        source: EffectSource,
        kind: EffectKind,
        cull_mode: CullMode,
        vertex_layout: wgpu::VertexBufferLayout<'_>,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&source.label),
            source: wgpu::ShaderSource::Wgsl(source.source.into()),
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("matrix_uniforms"),
            contents: bytemuck::bytes_of(&MatrixUniforms::identity()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("matrix_uniform_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("matrix_uniform_bind_group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        // One sampler plus one texture binding per consumed slot.
        let mut texture_entries = vec![wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        }];
        for (i, _) in consumed_slots(kind).iter().enumerate() {
            texture_entries.push(wgpu::BindGroupLayoutEntry {
                binding: 1 + i as u32,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            });
        }
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("effect_texture_layout"),
            entries: &texture_entries,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("effect_pipeline_layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let label = source.label;
        let passes = build_passes(
            device,
            &label,
            &shader,
            &pipeline_layout,
            surface_format,
            kind,
            cull_mode,
            vertex_layout,
        );

        Self {
            kind,
            label,
            shader,
            pipeline_layout,
            uniform_buffer,
            uniform_bind_group,
            texture_layout,
            texture_bind_group: None,
            passes,
            warned_slots: [false; 4],
        }
    }

    /// Push the three matrix parameters in one write.
    pub fn set_matrices(
        &self,
        queue: &wgpu::Queue,
        world: Mat4,
        world_view_proj: Mat4,
        view_inverse: Mat4,
    ) {
        let uniforms = MatrixUniforms {
            world_view_proj: world_view_proj.to_cols_array_2d(),
            world: world.to_cols_array_2d(),
            view_inverse: view_inverse.to_cols_array_2d(),
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    /// Bind the consumed texture slots with the given sampler. Slots the
    /// shader does not consume are inert; a provided-but-unconsumed asset
    /// logs a warning once.
    pub fn bind_textures(
        &mut self,
        device: &wgpu::Device,
        sampler: &wgpu::Sampler,
        textures: &TextureSet,
    ) {
        let consumed = consumed_slots(self.kind);
        for (i, slot) in TextureSlot::ALL.iter().enumerate() {
            if textures.is_provided(*slot) && !consumed.contains(slot) && !self.warned_slots[i] {
                tracing::warn!(
                    "effect '{}' does not consume texture slot '{}', ignoring",
                    self.label,
                    slot.name()
                );
                self.warned_slots[i] = true;
            }
        }

        let mut entries = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Sampler(sampler),
        }];
        for (i, slot) in consumed.iter().enumerate() {
            entries.push(wgpu::BindGroupEntry {
                binding: 1 + i as u32,
                resource: wgpu::BindingResource::TextureView(textures.view(*slot)),
            });
        }

        self.texture_bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("effect_texture_bind_group"),
            layout: &self.texture_layout,
            entries: &entries,
        }));
    }

    /// Recreate the technique pipelines for a new cull mode. Transparent
    /// effects are never culled, so only the opaque technique changes.
    pub fn rebuild_pipelines(
        &mut self,
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        cull_mode: CullMode,
        vertex_layout: wgpu::VertexBufferLayout<'_>,
    ) {
        self.passes = build_passes(
            device,
            &self.label,
            &self.shader,
            &self.pipeline_layout,
            surface_format,
            self.kind,
            cull_mode,
            vertex_layout,
        );
    }

    pub fn passes(&self) -> &[wgpu::RenderPipeline] {
        &self.passes
    }

    pub fn uniform_bind_group(&self) -> &wgpu::BindGroup {
        &self.uniform_bind_group
    }

    pub fn texture_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.texture_bind_group.as_ref()
    }
}

#[allow(clippy::too_many_arguments)]
fn build_passes(
    device: &wgpu::Device,
    label: &str,
    shader: &wgpu::ShaderModule,
    layout: &wgpu::PipelineLayout,
    surface_format: wgpu::TextureFormat,
    kind: EffectKind,
    cull_mode: CullMode,
    vertex_layout: wgpu::VertexBufferLayout<'_>,
) -> Vec<wgpu::RenderPipeline> {
    let (blend, depth_write, cull) = match kind {
        EffectKind::Opaque => (wgpu::BlendState::REPLACE, true, wgpu_cull(cull_mode)),
        EffectKind::Transparent => (wgpu::BlendState::ALPHA_BLENDING, false, None),
    };

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[vertex_layout],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: primitive_state(cull),
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: depth_write,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    });

    vec![pipeline]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_shader_source_is_a_typed_error() {
        let err = EffectSource::load("/nope/shader.wgsl").unwrap_err();
        assert!(matches!(err, EffectError::Read { .. }));
    }

    #[test]
    fn source_label_is_the_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flame.wgsl");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"// wgsl").unwrap();
        let source = EffectSource::load(&path).unwrap();
        assert_eq!(source.label, "flame");
        assert_eq!(source.source, "// wgsl");
    }

    #[test]
    fn opaque_consumes_all_four_slots() {
        assert_eq!(consumed_slots(EffectKind::Opaque).len(), 4);
        assert_eq!(
            consumed_slots(EffectKind::Transparent),
            &[TextureSlot::Diffuse][..]
        );
    }

    #[test]
    fn uniforms_are_three_packed_matrices() {
        assert_eq!(std::mem::size_of::<MatrixUniforms>(), 3 * 64);
    }

    #[test]
    fn cull_mode_mapping() {
        assert_eq!(wgpu_cull(CullMode::Back), Some(wgpu::Face::Back));
        assert_eq!(wgpu_cull(CullMode::Front), Some(wgpu::Face::Front));
        assert_eq!(wgpu_cull(CullMode::None), None);
    }

    #[test]
    fn pipelines_treat_clockwise_as_front() {
        let state = primitive_state(Some(wgpu::Face::Back));
        assert_eq!(state.front_face, wgpu::FrontFace::Cw);
        assert_eq!(state.cull_mode, Some(wgpu::Face::Back));
        assert_eq!(primitive_state(None).cull_mode, None);
    }
}
