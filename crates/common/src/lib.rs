//! Shared types for the spinel viewer.
//!
//! # Invariants
//! - `Vertex` layout is the single source of truth for vertex buffers and
//!   shader input layouts; both sides derive from it.
//! - Render toggles live in an explicit `RenderSettings` value, never in
//!   ambient globals.

pub mod settings;
pub mod types;

pub use settings::{CullMode, FilterMode, RenderSettings};
pub use types::Vertex;
