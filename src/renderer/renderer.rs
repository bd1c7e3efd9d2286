use std::mem;
use std::rc::Rc;

use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};
use log::{error, info};

use crate::error::RendererError;
use crate::graphics::{
    Camera, GraphicsContext, IndexBuffer, PolygonMode, Texture, VertexBuffer,
};
use crate::renderer::batch::{BatchBuffer, WriteResult};
use crate::renderer::lights::{DirectionalLight, LightRig, PointLight, SpotLight};
use crate::renderer::material::{Material, TextureRegion};
use crate::renderer::pipeline::{PassKind, PassPipeline, StagedDraw};
use crate::renderer::shapes::ShapeData;
use crate::renderer::texture_slots::{SlotResolution, TextureSlotTable};
use crate::renderer::uniforms::{shared_frame_layout, SharedUniforms};
use crate::renderer::vertex::{VertexRecord, NO_TEXTURE_SLOT};
use crate::settings::RenderSettings;

/// Binding point of the shared per-frame uniform buffer.
const SHARED_UNIFORMS_BINDING: u32 = 0;

/// Batching renderer over an abstract graphics context.
///
/// Shape submissions are transformed into world space on the CPU and staged
/// into one vertex/index accumulation; the multi-pass pipeline runs once per
/// flush instead of once per shape. Flushes happen when either staging array
/// or the texture slot table fills up, and at `end_scene`.
pub struct BatchRenderer<G: GraphicsContext> {
    context: G,
    settings: RenderSettings,
    batch: BatchBuffer,
    slots: TextureSlotTable<G::Texture>,
    uniforms: SharedUniforms<G::UniformBuffer>,
    lights: LightRig<G>,
    pipeline: PassPipeline<G>,
    vertex_buffer: Rc<G::VertexBuffer>,
    index_buffer: Rc<G::IndexBuffer>,
    shadow_index_buffer: Rc<G::IndexBuffer>,
}

impl<G: GraphicsContext> BatchRenderer<G> {
    pub fn new(mut context: G, settings: RenderSettings) -> Result<Self, RendererError> {
        let settings = settings.validate();

        let vertex_buffer = context.create_vertex_buffer(
            settings.max_vertices() * mem::size_of::<VertexRecord>() as u32,
        );
        vertex_buffer.set_layout(&VertexRecord::layout());
        let index_buffer = context.create_index_buffer(settings.max_indices());
        let shadow_index_buffer = context.create_index_buffer(settings.max_indices());

        let layout = shared_frame_layout();
        let uniform_buffer =
            context.create_uniform_buffer(SHARED_UNIFORMS_BINDING, layout.size());
        let uniforms = SharedUniforms::new(layout, uniform_buffer);

        // Slot 0 holds a 1x1 white texture so untextured geometry samples
        // pure white. Bound once; reserved slots are never rebound.
        let white = context.create_texture(1, 1, &[255, 255, 255, 255]);
        white.bind(0);
        let slots = TextureSlotTable::new(settings.max_texture_slots, vec![white]);

        let lights = LightRig::new(settings.shadow_map_resolution);
        let pipeline = PassPipeline::new(&mut context, &settings)?;

        info!(
            "Renderer initialized: {} quads, {} texture slots, {}px shadow maps",
            settings.max_quads, settings.max_texture_slots, settings.shadow_map_resolution
        );

        Ok(Self {
            batch: BatchBuffer::new(settings.max_vertices(), settings.max_indices()),
            context,
            settings,
            slots,
            uniforms,
            lights,
            pipeline,
            vertex_buffer,
            index_buffer,
            shadow_index_buffer,
        })
    }

    /// Uploads the camera state and opens a fresh accumulation. Must be
    /// called before any submission in a frame.
    pub fn begin_scene(&mut self, camera: &impl Camera) {
        self.uniforms.set("u_ViewProjection", camera.view_projection());
        self.uniforms.set("u_View", camera.view());
        self.uniforms.set("u_Projection", camera.projection());
        self.uniforms.set("u_CameraPosition", camera.position());
        self.batch.reset();
        self.slots.reset();
    }

    /// Flushes whatever is still staged. The accumulation is reopened by
    /// the next `begin_scene`.
    pub fn end_scene(&mut self) {
        self.flush();
    }

    pub fn submit_triangle(&mut self, transform: Mat4, color: Vec4) -> Result<(), RendererError> {
        self.submit_shape(transform, ShapeData::triangle(color), None)
    }

    pub fn submit_quad(&mut self, transform: Mat4, color: Vec4) -> Result<(), RendererError> {
        self.submit_shape(transform, ShapeData::quad(color), None)
    }

    pub fn submit_cuboid(&mut self, transform: Mat4, color: Vec4) -> Result<(), RendererError> {
        self.submit_shape(transform, ShapeData::cuboid(color), None)
    }

    pub fn submit_textured_triangle(
        &mut self,
        transform: Mat4,
        texture: &G::Texture,
        tint: Vec4,
    ) -> Result<(), RendererError> {
        let material = Material {
            tint,
            ..Material::with_diffuse(texture.clone())
        };
        self.submit_triangle_with_material(transform, &material)
    }

    pub fn submit_textured_quad(
        &mut self,
        transform: Mat4,
        texture: &G::Texture,
        tint: Vec4,
    ) -> Result<(), RendererError> {
        let material = Material {
            tint,
            ..Material::with_diffuse(texture.clone())
        };
        self.submit_quad_with_material(transform, &material)
    }

    pub fn submit_textured_cuboid(
        &mut self,
        transform: Mat4,
        texture: &G::Texture,
        tint: Vec4,
    ) -> Result<(), RendererError> {
        let material = Material {
            tint,
            ..Material::with_diffuse(texture.clone())
        };
        self.submit_cuboid_with_material(transform, &material)
    }

    pub fn submit_triangle_with_region(
        &mut self,
        transform: Mat4,
        region: &TextureRegion<G::Texture>,
        tint: Vec4,
    ) -> Result<(), RendererError> {
        self.submit_region_shape(transform, ShapeData::triangle(tint), region)
    }

    pub fn submit_quad_with_region(
        &mut self,
        transform: Mat4,
        region: &TextureRegion<G::Texture>,
        tint: Vec4,
    ) -> Result<(), RendererError> {
        self.submit_region_shape(transform, ShapeData::quad(tint), region)
    }

    pub fn submit_cuboid_with_region(
        &mut self,
        transform: Mat4,
        region: &TextureRegion<G::Texture>,
        tint: Vec4,
    ) -> Result<(), RendererError> {
        self.submit_region_shape(transform, ShapeData::cuboid(tint), region)
    }

    pub fn submit_triangle_with_material(
        &mut self,
        transform: Mat4,
        material: &Material<G::Texture>,
    ) -> Result<(), RendererError> {
        self.submit_shape(transform, ShapeData::triangle(material.tint), Some(material))
    }

    pub fn submit_quad_with_material(
        &mut self,
        transform: Mat4,
        material: &Material<G::Texture>,
    ) -> Result<(), RendererError> {
        self.submit_shape(transform, ShapeData::quad(material.tint), Some(material))
    }

    pub fn submit_cuboid_with_material(
        &mut self,
        transform: Mat4,
        material: &Material<G::Texture>,
    ) -> Result<(), RendererError> {
        self.submit_shape(transform, ShapeData::cuboid(material.tint), Some(material))
    }

    pub fn add_directional_light(&mut self, light: DirectionalLight) -> Result<(), RendererError> {
        self.lights
            .add_directional(&mut self.context, &self.uniforms, light)
    }

    pub fn add_point_light(&mut self, light: PointLight) -> Result<(), RendererError> {
        self.lights.add_point(&mut self.context, &self.uniforms, light)
    }

    pub fn add_spot_light(&mut self, light: SpotLight) -> Result<(), RendererError> {
        self.lights.add_spot(&self.uniforms, light)
    }

    pub fn set_skybox(&mut self, cubemap: Option<G::Texture>) {
        self.pipeline.set_skybox(cubemap);
    }

    pub fn set_wireframe(&mut self, enabled: bool) {
        self.context.set_polygon_mode(if enabled {
            PolygonMode::Line
        } else {
            PolygonMode::Fill
        });
    }

    pub fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> G::Texture {
        self.context.create_texture(width, height, rgba)
    }

    pub fn planned_passes(&self) -> Vec<PassKind> {
        self.pipeline.planned_passes()
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn staged_vertices(&self) -> u32 {
        self.batch.vertex_count()
    }

    pub fn staged_indices(&self) -> u32 {
        self.batch.index_count()
    }

    pub fn context(&self) -> &G {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut G {
        &mut self.context
    }

    /// Rewrites the shape's UVs into the region's rectangle before staging.
    /// The shapes carry `[0, 1]` UVs per face, so the remap addresses the
    /// region on every face of a cuboid as well.
    fn submit_region_shape(
        &mut self,
        transform: Mat4,
        mut shape: ShapeData,
        region: &TextureRegion<G::Texture>,
    ) -> Result<(), RendererError> {
        for vertex in &mut shape.vertices {
            vertex.uv = region.remap(Vec2::from_array(vertex.uv)).to_array();
        }
        let material = Material::with_diffuse(region.texture.clone());
        self.submit_shape(transform, shape, Some(&material))
    }

    fn submit_shape(
        &mut self,
        transform: Mat4,
        mut shape: ShapeData,
        material: Option<&Material<G::Texture>>,
    ) -> Result<(), RendererError> {
        let slot_indices = match material {
            Some(material) => self.resolve_material_slots(material),
            None => [NO_TEXTURE_SLOT; 5],
        };
        let casts_shadows = material.map_or(true, |material| material.casts_shadows);

        // Vertices are transformed into world space here so one batch can
        // carry every shape regardless of its transform.
        let normal_matrix = Mat3::from_mat4(transform.inverse().transpose());
        for vertex in &mut shape.vertices {
            let position = transform * Vec4::from_array(vertex.position);
            vertex.position = position.to_array();
            vertex.normal = (normal_matrix * Vec3::from_array(vertex.normal))
                .normalize_or_zero()
                .to_array();
            vertex.tangent = (normal_matrix * Vec3::from_array(vertex.tangent))
                .normalize_or_zero()
                .to_array();
            vertex.texture_slots = slot_indices;
            if let Some(material) = material {
                vertex.shininess = material.shininess;
            }
        }

        self.stage(&shape.vertices, shape.indices, casts_shadows)
    }

    /// Resolves every map of the material to a slot. If any resolution
    /// reports exhaustion the staged batch is flushed and all maps are
    /// resolved again against the emptied table, so the returned indices
    /// are consistent with one batch.
    fn resolve_material_slots(&mut self, material: &Material<G::Texture>) -> [i32; 5] {
        if material.available_maps().is_empty() {
            return [NO_TEXTURE_SLOT; 5];
        }
        if let Some(indices) = self.try_resolve_material_slots(material) {
            return indices;
        }
        self.next_batch();
        match self.try_resolve_material_slots(material) {
            Some(indices) => indices,
            None => {
                // More maps than the table can hold even when empty. The
                // shape falls back to untextured rather than looping.
                error!(
                    "Material needs more texture slots than the table holds ({}).",
                    self.slots.max_slots()
                );
                [NO_TEXTURE_SLOT; 5]
            }
        }
    }

    fn try_resolve_material_slots(&mut self, material: &Material<G::Texture>) -> Option<[i32; 5]> {
        let maps = [
            &material.diffuse_map,
            &material.specular_map,
            &material.emission_map,
            &material.normal_map,
            &material.displacement_map,
        ];

        let mut indices = [NO_TEXTURE_SLOT; 5];
        for (index, map) in maps.into_iter().enumerate() {
            if let Some(texture) = map {
                match self.slots.resolve(texture) {
                    SlotResolution::Slot(slot) => indices[index] = slot as i32,
                    SlotResolution::NeedsFlush => return None,
                }
            }
        }
        Some(indices)
    }

    /// Appends one shape's records, flushing once if the accumulation is
    /// full. A shape that cannot fit in an empty batch is an error, never a
    /// partial write.
    fn stage(
        &mut self,
        vertices: &[VertexRecord],
        indices: &[u32],
        casts_shadows: bool,
    ) -> Result<(), RendererError> {
        if self.batch.append(vertices, indices, casts_shadows) == WriteResult::Overflow {
            self.next_batch();
            if self.batch.append(vertices, indices, casts_shadows) == WriteResult::Overflow {
                return Err(RendererError::ShapeTooLarge {
                    vertices: vertices.len() as u32,
                    indices: indices.len() as u32,
                    max_vertices: self.batch.max_vertices(),
                    max_indices: self.batch.max_indices(),
                });
            }
        }
        Ok(())
    }

    fn next_batch(&mut self) {
        self.flush();
        self.batch.reset();
        self.slots.reset();
    }

    /// Uploads the staged arrays and runs the full pass pipeline over them.
    /// A no-op when nothing is staged.
    fn flush(&mut self) {
        if self.batch.is_empty() {
            return;
        }

        self.slots.bind_all();

        let (vertices, indices) = self.batch.snapshot();
        self.vertex_buffer.bind();
        self.vertex_buffer.set_data(bytemuck::cast_slice(vertices));
        self.index_buffer.bind();
        self.index_buffer.set_data(indices);
        self.shadow_index_buffer.bind();
        self.shadow_index_buffer.set_data(self.batch.shadow_snapshot());

        self.pipeline.run(
            &mut self.context,
            &self.lights,
            &self.uniforms,
            &StagedDraw {
                index_buffer: &*self.index_buffer,
                index_count: self.batch.index_count(),
                shadow_index_buffer: &*self.shadow_index_buffer,
                shadow_index_count: self.batch.shadow_index_count(),
            },
        );
    }
}
