//! Procedural demo geometry with the full position/normal/tangent/UV
//! attribute set.

use spinel_common::Vertex;

/// Unit cube centered at the origin, 24 vertices / 36 indices.
///
/// Outward faces project clockwise in clip space under the left-handed
/// camera; the render pipelines treat clockwise as front.
pub fn cube(half_extent: f32) -> (Vec<Vertex>, Vec<u32>) {
    let p = half_extent;
    #[rustfmt::skip]
    let vertices = vec![
        // +Z face
        Vertex::new([-p, -p,  p], [0.0, 0.0,  1.0], [-1.0, 0.0, 0.0], [0.0, 1.0]),
        Vertex::new([ p, -p,  p], [0.0, 0.0,  1.0], [-1.0, 0.0, 0.0], [1.0, 1.0]),
        Vertex::new([ p,  p,  p], [0.0, 0.0,  1.0], [-1.0, 0.0, 0.0], [1.0, 0.0]),
        Vertex::new([-p,  p,  p], [0.0, 0.0,  1.0], [-1.0, 0.0, 0.0], [0.0, 0.0]),
        // -Z face
        Vertex::new([ p, -p, -p], [0.0, 0.0, -1.0], [ 1.0, 0.0, 0.0], [0.0, 1.0]),
        Vertex::new([-p, -p, -p], [0.0, 0.0, -1.0], [ 1.0, 0.0, 0.0], [1.0, 1.0]),
        Vertex::new([-p,  p, -p], [0.0, 0.0, -1.0], [ 1.0, 0.0, 0.0], [1.0, 0.0]),
        Vertex::new([ p,  p, -p], [0.0, 0.0, -1.0], [ 1.0, 0.0, 0.0], [0.0, 0.0]),
        // +X face
        Vertex::new([ p, -p,  p], [ 1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0]),
        Vertex::new([ p, -p, -p], [ 1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [1.0, 1.0]),
        Vertex::new([ p,  p, -p], [ 1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [1.0, 0.0]),
        Vertex::new([ p,  p,  p], [ 1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 0.0]),
        // -X face
        Vertex::new([-p, -p, -p], [-1.0, 0.0, 0.0], [0.0, 0.0,  1.0], [0.0, 1.0]),
        Vertex::new([-p, -p,  p], [-1.0, 0.0, 0.0], [0.0, 0.0,  1.0], [1.0, 1.0]),
        Vertex::new([-p,  p,  p], [-1.0, 0.0, 0.0], [0.0, 0.0,  1.0], [1.0, 0.0]),
        Vertex::new([-p,  p, -p], [-1.0, 0.0, 0.0], [0.0, 0.0,  1.0], [0.0, 0.0]),
        // +Y face
        Vertex::new([-p,  p,  p], [0.0,  1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0]),
        Vertex::new([ p,  p,  p], [0.0,  1.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0]),
        Vertex::new([ p,  p, -p], [0.0,  1.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0]),
        Vertex::new([-p,  p, -p], [0.0,  1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0]),
        // -Y face
        Vertex::new([-p, -p, -p], [0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0]),
        Vertex::new([ p, -p, -p], [0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0]),
        Vertex::new([ p, -p,  p], [0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0]),
        Vertex::new([-p, -p,  p], [0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0]),
    ];
    #[rustfmt::skip]
    let indices: Vec<u32> = vec![
        0,1,2, 2,3,0,       // +Z
        4,5,6, 6,7,4,       // -Z
        8,9,10, 10,11,8,    // +X
        12,13,14, 14,15,12, // -X
        16,17,18, 18,19,16, // +Y
        20,21,22, 22,23,20, // -Y
    ];
    (vertices, indices)
}

/// Axis-aligned quad in the XY plane facing -Z, for billboard-style
/// transparent effects. Winds clockwise toward the camera, like the cube.
pub fn quad(half_width: f32, half_height: f32) -> (Vec<Vertex>, Vec<u32>) {
    let w = half_width;
    let h = half_height;
    #[rustfmt::skip]
    let vertices = vec![
        Vertex::new([-w, -h, 0.0], [0.0, 0.0, -1.0], [1.0, 0.0, 0.0], [0.0, 1.0]),
        Vertex::new([ w, -h, 0.0], [0.0, 0.0, -1.0], [1.0, 0.0, 0.0], [1.0, 1.0]),
        Vertex::new([ w,  h, 0.0], [0.0, 0.0, -1.0], [1.0, 0.0, 0.0], [1.0, 0.0]),
        Vertex::new([-w,  h, 0.0], [0.0, 0.0, -1.0], [1.0, 0.0, 0.0], [0.0, 0.0]),
    ];
    let indices: Vec<u32> = vec![2, 1, 0, 0, 3, 2];
    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_counts() {
        let (vertices, indices) = cube(0.5);
        assert_eq!(vertices.len(), 24);
        assert_eq!(indices.len(), 36);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }

    #[test]
    fn cube_normals_are_unit_axes() {
        let (vertices, _) = cube(1.0);
        for v in &vertices {
            let sum: f32 = v.normal.iter().map(|n| n * n).sum();
            assert!((sum - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn cube_tangents_orthogonal_to_normals() {
        let (vertices, _) = cube(1.0);
        for v in &vertices {
            let dot: f32 = v
                .normal
                .iter()
                .zip(v.tangent.iter())
                .map(|(n, t)| n * t)
                .sum();
            assert!(dot.abs() < 1e-6);
        }
    }

    #[test]
    fn quad_counts() {
        let (vertices, indices) = quad(1.0, 2.0);
        assert_eq!(vertices.len(), 4);
        assert_eq!(indices.len(), 6);
    }

    // The render pipelines declare clockwise front faces; if this winding
    // ever flips, back-face culling removes the faces the camera sees.
    #[test]
    fn camera_facing_triangles_project_clockwise() {
        use crate::Camera;
        use glam::{Vec2, Vec3};

        let camera = Camera::new(16.0 / 9.0, 45.0, Vec3::new(0.0, 0.0, -50.0));
        let vp = camera.view_projection();

        let ndc = |position: [f32; 3]| {
            let clip = vp * Vec3::from(position).extend(1.0);
            Vec2::new(clip.x / clip.w, clip.y / clip.w)
        };

        // First triangle of the cube's -Z face, the one facing the camera.
        let (vertices, indices) = cube(10.0);
        let tri: Vec<Vec2> = indices[6..9]
            .iter()
            .map(|&i| ndc(vertices[i as usize].position))
            .collect();
        let area = (tri[1] - tri[0]).perp_dot(tri[2] - tri[0]);
        assert!(area < 0.0, "cube front face winds CCW in NDC, area {area}");

        // The quad faces -Z as well and must agree.
        let (vertices, indices) = quad(8.0, 12.0);
        let tri: Vec<Vec2> = indices[0..3]
            .iter()
            .map(|&i| ndc(vertices[i as usize].position))
            .collect();
        let area = (tri[1] - tri[0]).perp_dot(tri[2] - tri[0]);
        assert!(area < 0.0, "quad winds CCW in NDC, area {area}");
    }
}
