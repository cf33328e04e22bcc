//! wgpu render backend for the spinel viewer.
//!
//! Wraps the fixed create-device -> configure-surface -> bind-views ->
//! compile-effect -> draw object model behind exclusive-ownership types:
//! the renderer owns its meshes, each mesh owns its effect and textures.
//!
//! # Invariants
//! - All GPU resources are created at startup; only the sampler and the
//!   effect pipelines are recreated, and only when the user cycles filter
//!   or cull modes.
//! - Draw order is mesh insertion order.
//! - A failed initialization yields no renderer at all; callers hold
//!   `Option<Renderer>` and skip rendering.

pub mod effect;
pub mod mesh;
pub mod renderer;
pub mod texture;

pub use effect::{Effect, EffectError, EffectSource};
pub use mesh::Mesh;
pub use renderer::{RenderError, Renderer};
pub use texture::{Texture, TextureError, TextureImage, TextureSet, TextureSlot};
