use std::path::PathBuf;

use glam::Mat4;
use spinel_common::Vertex;

/// Which shading program a mesh uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    /// Full shading: diffuse, normal, specular, and glossiness maps,
    /// depth-written, culled per the render settings.
    Opaque,
    /// Alpha-blended single-texture effect, no depth writes, never culled.
    Transparent,
}

/// Asset configuration bundle for one mesh: the shader source path and up
/// to four texture paths. Absent paths leave the slot on its fallback.
#[derive(Debug, Clone, Default)]
pub struct MeshPaths {
    pub shader: PathBuf,
    pub diffuse: Option<PathBuf>,
    pub normal: Option<PathBuf>,
    pub specular: Option<PathBuf>,
    pub gloss: Option<PathBuf>,
}

impl MeshPaths {
    pub fn new(shader: impl Into<PathBuf>) -> Self {
        Self {
            shader: shader.into(),
            ..Self::default()
        }
    }

    pub fn with_diffuse(mut self, path: impl Into<PathBuf>) -> Self {
        self.diffuse = Some(path.into());
        self
    }

    pub fn with_normal(mut self, path: impl Into<PathBuf>) -> Self {
        self.normal = Some(path.into());
        self
    }

    pub fn with_specular(mut self, path: impl Into<PathBuf>) -> Self {
        self.specular = Some(path.into());
        self
    }

    pub fn with_gloss(mut self, path: impl Into<PathBuf>) -> Self {
        self.gloss = Some(path.into());
        self
    }

    /// Number of texture slots that have an asset path.
    pub fn texture_count(&self) -> usize {
        [&self.diffuse, &self.normal, &self.specular, &self.gloss]
            .iter()
            .filter(|p| p.is_some())
            .count()
    }
}

/// CPU-side mesh state: immutable geometry plus the accumulated world
/// rotation mutated once per frame.
#[derive(Debug, Clone)]
pub struct MeshData {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    world: Mat4,
}

impl MeshData {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self {
            vertices,
            indices,
            world: Mat4::IDENTITY,
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Accumulated world transform (rotation only in this demo).
    pub fn world_matrix(&self) -> Mat4 {
        self.world
    }

    /// Left-multiply a Y-axis rotation onto the world matrix. Accumulates
    /// over the mesh's lifetime.
    pub fn rotate_y(&mut self, radians: f32) {
        self.world = Mat4::from_rotation_y(radians) * self.world;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry;
    use glam::Vec3;

    const TOL: f32 = 1e-5;

    fn mats_close(a: Mat4, b: Mat4) -> bool {
        (0..4).all(|c| (a.col(c) - b.col(c)).length() < TOL)
    }

    #[test]
    fn rotation_composes_additively() {
        let (vertices, indices) = geometry::cube(0.5);
        let mut split = MeshData::new(vertices.clone(), indices.clone());
        let mut single = MeshData::new(vertices, indices);

        split.rotate_y(0.3);
        split.rotate_y(0.9);
        single.rotate_y(1.2);

        assert!(mats_close(split.world_matrix(), single.world_matrix()));
    }

    #[test]
    fn rotation_accumulates_over_lifetime() {
        let (vertices, indices) = geometry::quad(1.0, 1.0);
        let mut mesh = MeshData::new(vertices, indices);
        let quarter = std::f32::consts::FRAC_PI_2;
        for _ in 0..4 {
            mesh.rotate_y(quarter);
        }
        assert!(mats_close(mesh.world_matrix(), Mat4::IDENTITY));
    }

    #[test]
    fn rotation_moves_points_around_y() {
        let (vertices, indices) = geometry::cube(1.0);
        let mut mesh = MeshData::new(vertices, indices);
        mesh.rotate_y(std::f32::consts::PI);
        let rotated = mesh.world_matrix().transform_point3(Vec3::new(1.0, 2.0, 0.0));
        assert!((rotated - Vec3::new(-1.0, 2.0, 0.0)).length() < TOL);
    }

    #[test]
    fn paths_count_present_slots() {
        let paths = MeshPaths::new("assets/shaders/shaded.wgsl")
            .with_diffuse("assets/textures/diffuse.png")
            .with_normal("assets/textures/normal.png");
        assert_eq!(paths.texture_count(), 2);
        assert!(paths.specular.is_none());
    }
}
