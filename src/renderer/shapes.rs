//! Local-space shape tables. All shapes are unit-sized and centered on the
//! origin (extents -0.5..0.5); the renderer transforms them into world space
//! on the CPU before staging.

use glam::{Vec2, Vec3, Vec4};

use crate::renderer::VertexRecord;

pub const QUAD_VERTEX_COUNT: u32 = 4;
pub const QUAD_INDEX_COUNT: u32 = 6;
pub const TRIANGLE_VERTEX_COUNT: u32 = 3;
pub const TRIANGLE_INDEX_COUNT: u32 = 3;
pub const CUBOID_VERTEX_COUNT: u32 = 24;
pub const CUBOID_INDEX_COUNT: u32 = 36;

const QUAD_POSITIONS: [[f32; 3]; 4] = [
    [-0.5, -0.5, 0.0],
    [0.5, -0.5, 0.0],
    [0.5, 0.5, 0.0],
    [-0.5, 0.5, 0.0],
];

const QUAD_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

const TRIANGLE_POSITIONS: [[f32; 3]; 3] =
    [[-0.5, -0.5, 0.0], [0.5, -0.5, 0.0], [0.0, 0.5, 0.0]];

const TRIANGLE_UVS: [[f32; 2]; 3] = [[0.0, 0.0], [1.0, 0.0], [0.5, 1.0]];

pub const TRIANGLE_INDICES: [u32; 3] = [0, 1, 2];

// Six faces, four vertices each, wound counter-clockwise seen from outside.
const CUBOID_POSITIONS: [[f32; 3]; 24] = [
    // front (+z)
    [-0.5, -0.5, 0.5],
    [0.5, -0.5, 0.5],
    [0.5, 0.5, 0.5],
    [-0.5, 0.5, 0.5],
    // back (-z)
    [0.5, -0.5, -0.5],
    [-0.5, -0.5, -0.5],
    [-0.5, 0.5, -0.5],
    [0.5, 0.5, -0.5],
    // left (-x)
    [-0.5, -0.5, -0.5],
    [-0.5, -0.5, 0.5],
    [-0.5, 0.5, 0.5],
    [-0.5, 0.5, -0.5],
    // right (+x)
    [0.5, -0.5, 0.5],
    [0.5, -0.5, -0.5],
    [0.5, 0.5, -0.5],
    [0.5, 0.5, 0.5],
    // top (+y)
    [-0.5, 0.5, 0.5],
    [0.5, 0.5, 0.5],
    [0.5, 0.5, -0.5],
    [-0.5, 0.5, -0.5],
    // bottom (-y)
    [-0.5, -0.5, -0.5],
    [0.5, -0.5, -0.5],
    [0.5, -0.5, 0.5],
    [-0.5, -0.5, 0.5],
];

const CUBOID_FACE_NORMALS: [[f32; 3]; 6] = [
    [0.0, 0.0, 1.0],
    [0.0, 0.0, -1.0],
    [-1.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, -1.0, 0.0],
];

const fn cuboid_indices() -> [u32; 36] {
    let mut indices = [0u32; 36];
    let mut face = 0;
    while face < 6 {
        let base = (face * 4) as u32;
        let i = face * 6;
        indices[i] = base;
        indices[i + 1] = base + 1;
        indices[i + 2] = base + 2;
        indices[i + 3] = base + 2;
        indices[i + 4] = base + 3;
        indices[i + 5] = base;
        face += 1;
    }
    indices
}

pub const CUBOID_INDICES: [u32; 36] = cuboid_indices();

/// A shape's local-space vertex records plus its index list. Indices are
/// relative to the record run, as the batch buffer expects.
pub struct ShapeData {
    pub vertices: Vec<VertexRecord>,
    pub indices: &'static [u32],
}

impl ShapeData {
    pub fn quad(color: Vec4) -> Self {
        let mut vertices = planar_vertices(&QUAD_POSITIONS, &QUAD_UVS, color);
        compute_tangents(&mut vertices, &QUAD_INDICES);
        Self {
            vertices,
            indices: &QUAD_INDICES,
        }
    }

    pub fn triangle(color: Vec4) -> Self {
        let mut vertices = planar_vertices(&TRIANGLE_POSITIONS, &TRIANGLE_UVS, color);
        compute_tangents(&mut vertices, &TRIANGLE_INDICES);
        Self {
            vertices,
            indices: &TRIANGLE_INDICES,
        }
    }

    pub fn cuboid(color: Vec4) -> Self {
        let mut vertices = Vec::with_capacity(CUBOID_POSITIONS.len());
        for (i, position) in CUBOID_POSITIONS.iter().enumerate() {
            let normal = CUBOID_FACE_NORMALS[i / 4];
            let uv = QUAD_UVS[i % 4];
            vertices.push(VertexRecord::new(
                Vec3::from_array(*position).extend(1.0),
                Vec3::from_array(normal),
                color,
                Vec2::from_array(uv),
            ));
        }
        compute_tangents(&mut vertices, &CUBOID_INDICES);
        Self {
            vertices,
            indices: &CUBOID_INDICES,
        }
    }
}

fn planar_vertices(
    positions: &[[f32; 3]],
    uvs: &[[f32; 2]],
    color: Vec4,
) -> Vec<VertexRecord> {
    positions
        .iter()
        .zip(uvs)
        .map(|(position, uv)| {
            VertexRecord::new(
                Vec3::from_array(*position).extend(1.0),
                Vec3::Z,
                color,
                Vec2::from_array(*uv),
            )
        })
        .collect()
}

/// Per-vertex tangents from triangle edges and UV deltas, accumulated over
/// every triangle touching the vertex and normalized. Triangles with a
/// degenerate UV mapping contribute nothing.
pub fn compute_tangents(vertices: &mut [VertexRecord], indices: &[u32]) {
    let mut accumulated = vec![Vec3::ZERO; vertices.len()];

    for triangle in indices.chunks_exact(3) {
        let [i0, i1, i2] = [triangle[0] as usize, triangle[1] as usize, triangle[2] as usize];

        let p0 = Vec3::from_slice(&vertices[i0].position[..3]);
        let p1 = Vec3::from_slice(&vertices[i1].position[..3]);
        let p2 = Vec3::from_slice(&vertices[i2].position[..3]);

        let uv0 = Vec2::from_array(vertices[i0].uv);
        let uv1 = Vec2::from_array(vertices[i1].uv);
        let uv2 = Vec2::from_array(vertices[i2].uv);

        let edge1 = p1 - p0;
        let edge2 = p2 - p0;
        let delta1 = uv1 - uv0;
        let delta2 = uv2 - uv0;

        let det = delta1.x * delta2.y - delta2.x * delta1.y;
        if det.abs() < f32::EPSILON {
            continue;
        }

        let tangent = (edge1 * delta2.y - edge2 * delta1.y) / det;
        accumulated[i0] += tangent;
        accumulated[i1] += tangent;
        accumulated[i2] += tangent;
    }

    for (vertex, tangent) in vertices.iter_mut().zip(accumulated) {
        vertex.tangent = tangent.normalize_or_zero().to_array();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cuboid_tables_cover_six_faces() {
        assert_eq!(CUBOID_POSITIONS.len(), CUBOID_VERTEX_COUNT as usize);
        assert_eq!(CUBOID_INDICES.len(), CUBOID_INDEX_COUNT as usize);
        // Every index stays within the face it belongs to.
        for (i, chunk) in CUBOID_INDICES.chunks_exact(6).enumerate() {
            let base = (i * 4) as u32;
            for &index in chunk {
                assert!(index >= base && index < base + 4);
            }
        }
    }

    #[test]
    fn shapes_are_centered_with_unit_extents() {
        for shape in [
            ShapeData::quad(Vec4::ONE),
            ShapeData::triangle(Vec4::ONE),
            ShapeData::cuboid(Vec4::ONE),
        ] {
            for vertex in &shape.vertices {
                for &coordinate in &vertex.position[..3] {
                    assert!(coordinate.abs() <= 0.5);
                }
                assert_eq!(vertex.position[3], 1.0);
            }
        }
    }

    #[test]
    fn quad_tangent_follows_the_u_direction() {
        let quad = ShapeData::quad(Vec4::ONE);
        for vertex in &quad.vertices {
            let tangent = Vec3::from_array(vertex.tangent);
            assert!((tangent - Vec3::X).length() < 1e-5);
        }
    }

    #[test]
    fn cuboid_tangents_are_perpendicular_to_their_normals() {
        let cuboid = ShapeData::cuboid(Vec4::ONE);
        for vertex in &cuboid.vertices {
            let tangent = Vec3::from_array(vertex.tangent);
            let normal = Vec3::from_array(vertex.normal);
            assert!((tangent.length() - 1.0).abs() < 1e-5);
            assert!(tangent.dot(normal).abs() < 1e-5);
        }
    }

    #[test]
    fn degenerate_uv_mapping_yields_zero_tangent() {
        let mut vertices = vec![
            VertexRecord::new(Vec3::ZERO.extend(1.0), Vec3::Z, Vec4::ONE, Vec2::ZERO),
            VertexRecord::new(Vec3::X.extend(1.0), Vec3::Z, Vec4::ONE, Vec2::ZERO),
            VertexRecord::new(Vec3::Y.extend(1.0), Vec3::Z, Vec4::ONE, Vec2::ZERO),
        ];
        compute_tangents(&mut vertices, &[0, 1, 2]);
        assert_eq!(vertices[0].tangent, [0.0; 3]);
    }
}
