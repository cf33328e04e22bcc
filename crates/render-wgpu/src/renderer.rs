//! Frame loop orchestration: device/surface setup, per-frame update and
//! render across all owned meshes.

use std::sync::Arc;

use spinel_common::{CullMode, FilterMode, RenderSettings};
use spinel_scene::{Camera, EffectKind, MeshData, MeshPaths};
use winit::window::Window;

use crate::effect::EffectError;
use crate::mesh::Mesh;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

/// Auto-rotation angular speed, degrees per second.
const ROTATE_SPEED_DEG: f32 = 45.0;

/// Fatal initialization failures. If any setup step fails no renderer
/// exists, and the caller's render path becomes a no-op.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to create rendering surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible GPU adapter found")]
    NoAdapter,
    #[error("failed to create device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
}

/// Owns the device/queue/surface chain, the depth buffer, the shared
/// sampler, and the mesh collection (insertion order = draw order).
pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    bound_filter: FilterMode,
    bound_cull: CullMode,
    meshes: Vec<Mesh>,
}

impl Renderer {
    /// Initialize the GPU chain in strict order: instance, surface,
    /// adapter, device, surface configuration, depth buffer, sampler.
    /// The first failing step aborts with a typed error.
    pub fn new(window: Arc<Window>, settings: &RenderSettings) -> Result<Self, RenderError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or(RenderError::NoAdapter)?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("spinel_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_view = create_depth_view(&device, config.width, config.height);
        let sampler = create_sampler(&device, settings.filter_mode);

        tracing::info!(
            "renderer initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_view,
            sampler,
            bound_filter: settings.filter_mode,
            bound_cull: settings.cull_mode,
            meshes: Vec::new(),
        })
    }

    /// Create a mesh from geometry plus its asset bundle and append it to
    /// the draw list.
    pub fn add_mesh(
        &mut self,
        data: MeshData,
        paths: &MeshPaths,
        kind: EffectKind,
    ) -> Result<(), EffectError> {
        let mesh = Mesh::new(
            &self.device,
            &self.queue,
            self.config.format,
            data,
            paths,
            kind,
            &self.sampler,
            self.bound_cull,
        )?;
        self.meshes.push(mesh);
        Ok(())
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, self.config.width, self.config.height);
    }

    /// Per-frame update: apply settings changes, advance auto-rotation,
    /// and push the camera matrices into every mesh.
    pub fn update(&mut self, dt: f32, camera: &Camera, settings: &RenderSettings) {
        self.apply_settings(settings);

        let view_proj = camera.view_projection();
        let inv_view = camera.inv_view_matrix();
        for mesh in &mut self.meshes {
            if settings.rotate_meshes {
                mesh.rotate_y(ROTATE_SPEED_DEG.to_radians() * dt);
            }
            mesh.set_matrices(&self.queue, view_proj, inv_view);
        }
    }

    /// Rebuild the sampler and texture bindings when the filter mode
    /// changed, and the pipelines when the cull mode changed. These are the
    /// only GPU objects recreated after startup.
    pub fn apply_settings(&mut self, settings: &RenderSettings) {
        if settings.filter_mode != self.bound_filter {
            self.sampler = create_sampler(&self.device, settings.filter_mode);
            for mesh in &mut self.meshes {
                mesh.rebind_textures(&self.device, &self.sampler);
            }
            self.bound_filter = settings.filter_mode;
            tracing::info!("sampler filter set to {:?}", settings.filter_mode);
        }
        if settings.cull_mode != self.bound_cull {
            for mesh in &mut self.meshes {
                mesh.rebuild_pipelines(&self.device, self.config.format, settings.cull_mode);
            }
            self.bound_cull = settings.cull_mode;
            tracing::info!("cull mode set to {:?}", settings.cull_mode);
        }
    }

    /// Render one frame: clear color and depth/stencil, draw meshes in
    /// insertion order, present. A lost or outdated surface reconfigures
    /// and skips the frame.
    pub fn render(&mut self, settings: &RenderSettings) {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        {
            let clear = settings.clear_color();
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: clear[0],
                            g: clear[1],
                            b: clear[2],
                            a: clear[3],
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(0),
                        store: wgpu::StoreOp::Store,
                    }),
                }),
                ..Default::default()
            });

            for (i, mesh) in self.meshes.iter().enumerate() {
                if i > 0 && !settings.show_secondary {
                    break;
                }
                mesh.draw(&mut pass);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
    }
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_stencil"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}

fn create_sampler(device: &wgpu::Device, mode: FilterMode) -> wgpu::Sampler {
    let (filter, anisotropy) = match mode {
        FilterMode::Nearest => (wgpu::FilterMode::Nearest, 1),
        FilterMode::Linear => (wgpu::FilterMode::Linear, 1),
        FilterMode::Anisotropic => (wgpu::FilterMode::Linear, 16),
    };
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("effect_sampler"),
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: filter,
        min_filter: filter,
        mipmap_filter: filter,
        anisotropy_clamp: anisotropy,
        ..Default::default()
    })
}
