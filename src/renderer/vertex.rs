use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3, Vec4};

use crate::graphics::{AttributeKind, VertexLayout};

/// One staged vertex, copied by value into the batch buffer. All fields are
/// 4-byte aligned so the `#[repr(C)]` layout has no padding and the struct
/// can be uploaded with a straight byte copy.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
pub struct VertexRecord {
    pub position: [f32; 4],
    pub normal: [f32; 3],
    pub color: [f32; 4],
    pub uv: [f32; 2],
    /// Slot indices for diffuse, specular, emission, normal and
    /// displacement maps, in that order. `-1` means "map not present".
    pub texture_slots: [i32; 5],
    pub shininess: f32,
    pub tangent: [f32; 3],
}

/// Marks an absent texture map in `texture_slots`. Distinct from slot 0,
/// which is a real binding (the reserved white texture).
pub const NO_TEXTURE_SLOT: i32 = -1;

impl VertexRecord {
    pub fn new(position: Vec4, normal: Vec3, color: Vec4, uv: Vec2) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            color: color.to_array(),
            uv: uv.to_array(),
            texture_slots: [NO_TEXTURE_SLOT; 5],
            shininess: 32.0,
            tangent: [0.0; 3],
        }
    }

    pub fn layout() -> VertexLayout {
        VertexLayout::new(&[
            ("a_Position", AttributeKind::Float4),
            ("a_Normal", AttributeKind::Float3),
            ("a_Color", AttributeKind::Float4),
            ("a_TextureCoords", AttributeKind::Float2),
            ("a_DiffuseSlot", AttributeKind::Int),
            ("a_SpecularSlot", AttributeKind::Int),
            ("a_EmissionSlot", AttributeKind::Int),
            ("a_NormalSlot", AttributeKind::Int),
            ("a_DisplacementSlot", AttributeKind::Int),
            ("a_Shininess", AttributeKind::Float),
            ("a_Tangent", AttributeKind::Float3),
        ])
    }
}
