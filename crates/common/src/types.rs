use bytemuck::{Pod, Zeroable};

/// One vertex as consumed by the shading effects.
///
/// Position, normal, and tangent are object-space; the tangent carries the
/// texture U direction for normal mapping. Stride is 44 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tangent: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const fn new(position: [f32; 3], normal: [f32; 3], tangent: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tangent,
            uv,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_stride_matches_attribute_set() {
        // 3 + 3 + 3 + 2 floats, tightly packed
        assert_eq!(std::mem::size_of::<Vertex>(), 44);
    }

    #[test]
    fn vertex_is_pod() {
        let v = Vertex::new([1.0, 2.0, 3.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.5, 0.5]);
        let bytes = bytemuck::bytes_of(&v);
        assert_eq!(bytes.len(), 44);
    }
}
