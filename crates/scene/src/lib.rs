//! CPU-side scene state for the spinel viewer.
//!
//! Everything here is plain math over plain data: the fly camera, the
//! per-frame input snapshot it consumes, and mesh geometry with its
//! accumulated world rotation. No GPU types cross this boundary.
//!
//! # Invariants
//! - The camera basis stays orthonormal and right-handed after every update.
//! - The projection matrix is a pure function of (fov, aspect, near, far).
//! - Mesh world rotation only ever accumulates through `rotate_y`.

pub mod camera;
pub mod geometry;
pub mod input;
pub mod mesh;

pub use camera::Camera;
pub use input::InputState;
pub use mesh::{EffectKind, MeshData, MeshPaths};
