use bitflags::bitflags;
use glam::{Vec2, Vec4};

use crate::graphics::Texture;

bitflags! {
    /// Which texture maps a material carries. Matches the per-vertex slot
    /// order: diffuse, specular, emission, normal, displacement.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct MaterialMaps: u32 {
        const DIFFUSE = 1 << 0;
        const SPECULAR = 1 << 1;
        const EMISSION = 1 << 2;
        const NORMAL = 1 << 3;
        const DISPLACEMENT = 1 << 4;
    }
}

/// Surface description attached to a shape submission. Every map is
/// optional; a material with no diffuse map is tinted with the default
/// white texture.
#[derive(Clone)]
pub struct Material<T: Texture> {
    pub diffuse_map: Option<T>,
    pub specular_map: Option<T>,
    pub emission_map: Option<T>,
    pub normal_map: Option<T>,
    pub displacement_map: Option<T>,
    pub tint: Vec4,
    pub shininess: f32,
    pub casts_shadows: bool,
}

impl<T: Texture> Default for Material<T> {
    fn default() -> Self {
        Self {
            diffuse_map: None,
            specular_map: None,
            emission_map: None,
            normal_map: None,
            displacement_map: None,
            tint: Vec4::ONE,
            shininess: 32.0,
            casts_shadows: true,
        }
    }
}

impl<T: Texture> Material<T> {
    pub fn with_diffuse(texture: T) -> Self {
        Self {
            diffuse_map: Some(texture),
            ..Self::default()
        }
    }

    pub fn available_maps(&self) -> MaterialMaps {
        let mut maps = MaterialMaps::empty();
        if self.diffuse_map.is_some() {
            maps |= MaterialMaps::DIFFUSE;
        }
        if self.specular_map.is_some() {
            maps |= MaterialMaps::SPECULAR;
        }
        if self.emission_map.is_some() {
            maps |= MaterialMaps::EMISSION;
        }
        if self.normal_map.is_some() {
            maps |= MaterialMaps::NORMAL;
        }
        if self.displacement_map.is_some() {
            maps |= MaterialMaps::DISPLACEMENT;
        }
        maps
    }
}

/// A rectangular sub-area of a texture in normalized UV space, for drawing
/// one cell of an atlas or sprite sheet without a texture per cell.
#[derive(Clone)]
pub struct TextureRegion<T: Texture> {
    pub texture: T,
    pub uv_min: Vec2,
    pub uv_max: Vec2,
}

impl<T: Texture> TextureRegion<T> {
    pub fn new(texture: T, uv_min: Vec2, uv_max: Vec2) -> Self {
        Self {
            texture,
            uv_min,
            uv_max,
        }
    }

    /// Region covering cell `(column, row)` of a uniform grid. Sizes are in
    /// pixels; row 0 is the bottom row, matching the UV origin.
    pub fn from_grid(texture: T, column: u32, row: u32, cell_size: Vec2, atlas_size: Vec2) -> Self {
        let uv_min = Vec2::new(column as f32 * cell_size.x, row as f32 * cell_size.y) / atlas_size;
        let uv_max = uv_min + cell_size / atlas_size;
        Self::new(texture, uv_min, uv_max)
    }

    /// Maps a shape-local UV in `[0, 1]` into the region's rectangle.
    pub fn remap(&self, uv: Vec2) -> Vec2 {
        self.uv_min + uv * (self.uv_max - self.uv_min)
    }
}
