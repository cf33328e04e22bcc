use anyhow::Result;
use clap::Parser;
use glam::{Vec2, Vec3};
use spinel_common::RenderSettings;
use spinel_render_wgpu::Renderer;
use spinel_scene::{geometry, Camera, EffectKind, InputState, MeshData, MeshPaths};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "spinel-viewer", about = "Fly-camera viewer for textured demo meshes")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Asset directory, expected to hold shaders/*.wgsl and textures/*.png
    #[arg(long, default_value = "./assets")]
    assets: PathBuf,
}

/// Translate polled key state and accumulated mouse motion into the
/// camera's input snapshot.
fn input_from_keys(
    keys: &HashSet<KeyCode>,
    mouse_delta: Vec2,
    left_button: bool,
    right_button: bool,
) -> InputState {
    InputState {
        move_forward: keys.contains(&KeyCode::KeyW) || keys.contains(&KeyCode::ArrowUp),
        move_backward: keys.contains(&KeyCode::KeyS) || keys.contains(&KeyCode::ArrowDown),
        strafe_left: keys.contains(&KeyCode::KeyA) || keys.contains(&KeyCode::ArrowLeft),
        strafe_right: keys.contains(&KeyCode::KeyD) || keys.contains(&KeyCode::ArrowRight),
        mouse_delta,
        left_button,
        right_button,
    }
}

/// Apply a discrete command key to the render settings. Returns true when
/// the key was a command.
fn apply_command_key(settings: &mut RenderSettings, key: KeyCode) -> bool {
    match key {
        KeyCode::KeyR => {
            settings.rotate_meshes = !settings.rotate_meshes;
            tracing::info!("auto-rotation: {}", settings.rotate_meshes);
        }
        KeyCode::KeyC => {
            settings.alt_clear_color = !settings.alt_clear_color;
            tracing::info!("alternate clear color: {}", settings.alt_clear_color);
        }
        KeyCode::KeyV => {
            settings.show_secondary = !settings.show_secondary;
            tracing::info!("secondary mesh visible: {}", settings.show_secondary);
        }
        KeyCode::KeyF => {
            settings.filter_mode = settings.filter_mode.next();
            tracing::info!("filter mode: {:?}", settings.filter_mode);
        }
        KeyCode::KeyB => {
            settings.cull_mode = settings.cull_mode.next();
            tracing::info!("cull mode: {:?}", settings.cull_mode);
        }
        _ => return false,
    }
    true
}

struct AppState {
    camera: Camera,
    settings: RenderSettings,
    keys_held: HashSet<KeyCode>,
    mouse_delta: Vec2,
    left_button: bool,
    right_button: bool,
    last_frame: Instant,
}

impl AppState {
    fn new() -> Self {
        Self {
            camera: Camera::new(16.0 / 9.0, 45.0, Vec3::new(0.0, 0.0, -50.0)),
            settings: RenderSettings::default(),
            keys_held: HashSet::new(),
            mouse_delta: Vec2::ZERO,
            left_button: false,
            right_button: false,
            last_frame: Instant::now(),
        }
    }

    fn step(&mut self) -> f32 {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32().min(0.1);
        self.last_frame = now;

        let input = input_from_keys(
            &self.keys_held,
            self.mouse_delta,
            self.left_button,
            self.right_button,
        );
        self.mouse_delta = Vec2::ZERO;
        self.camera.update(dt, &input);
        dt
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            self.keys_held.insert(key);
            apply_command_key(&mut self.settings, key);
        } else {
            self.keys_held.remove(&key);
        }
    }
}

/// Build the demo scene: a shaded cube plus a transparent billboard,
/// both at the origin. Asset failures degrade, they never abort.
fn create_meshes(renderer: &mut Renderer, assets: &Path) {
    let shaders = assets.join("shaders");
    let textures = assets.join("textures");

    let (vertices, indices) = geometry::cube(10.0);
    let paths = MeshPaths::new(shaders.join("shaded.wgsl"))
        .with_diffuse(textures.join("crate_diffuse.png"))
        .with_normal(textures.join("crate_normal.png"))
        .with_specular(textures.join("crate_specular.png"))
        .with_gloss(textures.join("crate_gloss.png"));
    if let Err(e) = renderer.add_mesh(MeshData::new(vertices, indices), &paths, EffectKind::Opaque)
    {
        tracing::warn!("skipping shaded mesh: {e}");
    }

    let (vertices, indices) = geometry::quad(8.0, 12.0);
    let paths = MeshPaths::new(shaders.join("flame.wgsl"))
        .with_diffuse(textures.join("flame_diffuse.png"));
    if let Err(e) = renderer.add_mesh(
        MeshData::new(vertices, indices),
        &paths,
        EffectKind::Transparent,
    ) {
        tracing::warn!("skipping transparent mesh: {e}");
    }
}

struct ViewerApp {
    assets: PathBuf,
    state: AppState,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
}

impl ViewerApp {
    fn new(assets: PathBuf) -> Self {
        Self {
            assets,
            state: AppState::new(),
            window: None,
            renderer: None,
        }
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("spinel viewer")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                tracing::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        self.state
            .camera
            .set_aspect_ratio(size.width as f32 / size.height.max(1) as f32);

        match Renderer::new(window.clone(), &self.state.settings) {
            Ok(mut renderer) => {
                create_meshes(&mut renderer, &self.assets);
                self.renderer = Some(renderer);
            }
            Err(e) => {
                // Rendering stays disabled; the window keeps running so the
                // failure is visible in the logs rather than a crash.
                tracing::error!("renderer initialization failed: {e}");
            }
        }

        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.state
                    .camera
                    .set_aspect_ratio(new_size.width as f32 / new_size.height.max(1) as f32);
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                self.state
                    .handle_key(key, key_state == ElementState::Pressed);
            }
            WindowEvent::MouseInput { button, state, .. } => {
                let pressed = state == ElementState::Pressed;
                match button {
                    MouseButton::Left => self.state.left_button = pressed,
                    MouseButton::Right => self.state.right_button = pressed,
                    _ => {}
                }
                if let Some(window) = &self.window {
                    let dragging = self.state.left_button || self.state.right_button;
                    window.set_cursor_visible(!dragging);
                }
            }
            WindowEvent::RedrawRequested => {
                let dt = self.state.step();
                if let Some(renderer) = &mut self.renderer {
                    renderer.update(dt, &self.state.camera, &self.state.settings);
                    renderer.render(&self.state.settings);
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.state.left_button || self.state.right_button {
                self.state.mouse_delta += Vec2::new(delta.0 as f32, delta.1 as f32);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("spinel-viewer starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ViewerApp::new(cli.assets);
    event_loop.run_app(&mut app)?;

    Ok(())
}
