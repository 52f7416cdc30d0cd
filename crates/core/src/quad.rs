//! Full-screen quad geometry.
//!
//! Four `(x, y, z)` vertices spanning normalized device coordinates, drawn as
//! a triangle strip: `(-1,-1) (-1,1) (1,-1)` and `(-1,1) (1,-1) (1,1)`.

/// Components per vertex (x, y, z).
pub const POSITION_COMPONENTS: i32 = 3;

/// Number of vertices in the strip.
pub const QUAD_VERTEX_COUNT: i32 = 4;

/// Vertex data for the quad, tightly packed.
pub const QUAD_VERTICES: [f32; 12] = [
    -1.0, -1.0, 0.0, //
    -1.0, 1.0, 0.0, //
    1.0, -1.0, 0.0, //
    1.0, 1.0, 0.0,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_count_matches_data() {
        assert_eq!(
            QUAD_VERTICES.len(),
            (QUAD_VERTEX_COUNT * POSITION_COMPONENTS) as usize
        );
    }

    #[test]
    fn quad_covers_ndc_square_in_plane_z0() {
        let corners: Vec<[f32; 3]> = QUAD_VERTICES
            .chunks_exact(3)
            .map(|v| [v[0], v[1], v[2]])
            .collect();
        for corner in [[-1.0, -1.0], [-1.0, 1.0], [1.0, -1.0], [1.0, 1.0]] {
            assert!(
                corners.iter().any(|c| c[0] == corner[0] && c[1] == corner[1]),
                "missing corner {corner:?}"
            );
        }
        assert!(corners.iter().all(|c| c[2] == 0.0));
    }
}
