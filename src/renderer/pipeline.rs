use std::rc::Rc;

use crate::error::RendererError;
use crate::graphics::{
    ClearFlags, CullMode, DepthFunc, Framebuffer, FramebufferSpec, GraphicsContext, IndexBuffer,
    Shader, Texture, UniformValue,
};
use crate::renderer::lights::LightRig;
use crate::renderer::uniforms::SharedUniforms;
use crate::renderer::{MAX_DIRECTIONAL_LIGHTS, MAX_POINT_LIGHTS};
use crate::settings::RenderSettings;

const SHADOW_SHADER: (&str, &str) = ("shaders/shadow.vert", "shaders/shadow.frag");
const OMNI_SHADOW_SHADER: (&str, &str) = ("shaders/shadow_omni.vert", "shaders/shadow_omni.frag");
const GEOMETRY_SHADER: (&str, &str) = ("shaders/geometry.vert", "shaders/geometry.frag");
const OVERLAY_SHADER: (&str, &str) = ("shaders/overlay.vert", "shaders/overlay.frag");
const SKYBOX_SHADER: (&str, &str) = ("shaders/skybox.vert", "shaders/skybox.frag");
const POST_PROCESS_SHADER: (&str, &str) = ("shaders/post.vert", "shaders/post.frag");

const SKYBOX_CUBE_VERTICES: u32 = 36;
const FULLSCREEN_TRIANGLE_VERTICES: u32 = 6;

/// The uploaded batch a flush hands to the pipeline. The shadow passes draw
/// from the shadow index list, which holds only shadow-casting submissions;
/// the geometry and overlay passes draw the full index list.
pub struct StagedDraw<'a, G: GraphicsContext> {
    pub index_buffer: &'a G::IndexBuffer,
    pub index_count: u32,
    pub shadow_index_buffer: &'a G::IndexBuffer,
    pub shadow_index_count: u32,
}

/// One stage of a frame, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassKind {
    ShadowDirectional,
    ShadowOmnidirectional,
    Geometry,
    Overlay,
    Skybox,
    PostProcess,
    BlitToScreen,
}

/// Pass order for one flush. The shadow passes always precede geometry so
/// its depth lookups see this batch; the frame ends on the screen either
/// through the post-process shader or a plain blit.
fn plan_passes(has_skybox: bool, post_processing: bool) -> Vec<PassKind> {
    let mut passes = vec![
        PassKind::ShadowDirectional,
        PassKind::ShadowOmnidirectional,
        PassKind::Geometry,
        PassKind::Overlay,
    ];
    if has_skybox {
        passes.push(PassKind::Skybox);
    }
    passes.push(if post_processing {
        PassKind::PostProcess
    } else {
        PassKind::BlitToScreen
    });
    passes
}

/// The fixed multi-pass sequence every flush runs through. All GPU targets
/// and shaders are created once here; `run` only binds and draws.
pub struct PassPipeline<G: GraphicsContext> {
    scene_target: Rc<G::Framebuffer>,
    shadow_shader: Rc<G::Shader>,
    omni_shadow_shader: Rc<G::Shader>,
    geometry_shader: Rc<G::Shader>,
    overlay_shader: Rc<G::Shader>,
    skybox_shader: Rc<G::Shader>,
    post_process_shader: Option<Rc<G::Shader>>,
    skybox_cubemap: Option<G::Texture>,
    post_processing: bool,
    /// First sampler slot past the batch range; shadow maps and other
    /// pipeline-owned textures bind from here up.
    first_free_slot: u32,
}

impl<G: GraphicsContext> PassPipeline<G> {
    pub fn new(context: &mut G, settings: &RenderSettings) -> Result<Self, RendererError> {
        let (width, height) = context.surface_size();
        let scene_target =
            context.create_framebuffer("scene", width, height, FramebufferSpec::COLOR_DEPTH);
        if !scene_target.is_complete() {
            return Err(RendererError::IncompleteFramebuffer { label: "scene" });
        }

        let post_process_shader = if settings.post_processing {
            Some(context.create_shader(POST_PROCESS_SHADER.0, POST_PROCESS_SHADER.1)?)
        } else {
            None
        };

        Ok(Self {
            scene_target,
            shadow_shader: context.create_shader(SHADOW_SHADER.0, SHADOW_SHADER.1)?,
            omni_shadow_shader: context.create_shader(OMNI_SHADOW_SHADER.0, OMNI_SHADOW_SHADER.1)?,
            geometry_shader: context.create_shader(GEOMETRY_SHADER.0, GEOMETRY_SHADER.1)?,
            overlay_shader: context.create_shader(OVERLAY_SHADER.0, OVERLAY_SHADER.1)?,
            skybox_shader: context.create_shader(SKYBOX_SHADER.0, SKYBOX_SHADER.1)?,
            post_process_shader,
            skybox_cubemap: None,
            post_processing: settings.post_processing,
            first_free_slot: settings.max_texture_slots,
        })
    }

    pub fn set_skybox(&mut self, cubemap: Option<G::Texture>) {
        self.skybox_cubemap = cubemap;
    }

    pub fn scene_target(&self) -> &Rc<G::Framebuffer> {
        &self.scene_target
    }

    pub fn planned_passes(&self) -> Vec<PassKind> {
        plan_passes(self.skybox_cubemap.is_some(), self.post_processing)
    }

    /// Executes every planned pass against the staged batch. The batch
    /// buffers are already uploaded; each pass binds the index list it
    /// draws from.
    pub fn run(
        &self,
        context: &mut G,
        lights: &LightRig<G>,
        uniforms: &SharedUniforms<G::UniformBuffer>,
        draw: &StagedDraw<'_, G>,
    ) {
        uniforms.bind();
        for pass in self.planned_passes() {
            match pass {
                PassKind::ShadowDirectional => self.run_directional_shadows(context, lights, draw),
                PassKind::ShadowOmnidirectional => self.run_omni_shadows(context, lights, draw),
                PassKind::Geometry => self.run_geometry(context, lights, draw),
                PassKind::Overlay => self.run_overlay(context, draw),
                PassKind::Skybox => self.run_skybox(context),
                PassKind::PostProcess => self.run_post_process(context),
                PassKind::BlitToScreen => {
                    self.scene_target.unbind();
                    context.blit_to_screen(&self.scene_target);
                }
            }
        }
    }

    /// Front-face culling while rendering depth reduces peter-panning on
    /// the sampled shadow. Only shadow-casting submissions are drawn; the
    /// targets are still cleared so dropped casters leave no stale depth.
    fn run_directional_shadows(&self, context: &mut G, lights: &LightRig<G>, draw: &StagedDraw<'_, G>) {
        self.shadow_shader.bind();
        draw.shadow_index_buffer.bind();
        context.set_face_culling(CullMode::Front);
        for (index, (_, target)) in lights.directional_lights().iter().enumerate() {
            let Some(target) = target else { continue };
            target.bind();
            context.set_viewport(target.width(), target.height());
            context.clear(ClearFlags::DEPTH);
            self.shadow_shader
                .set_uniform("u_CurrentLight", UniformValue::Int(index as i32));
            if draw.shadow_index_count > 0 {
                context.draw_indexed(draw.shadow_index_count);
            }
        }
        context.set_face_culling(CullMode::Back);
    }

    fn run_omni_shadows(&self, context: &mut G, lights: &LightRig<G>, draw: &StagedDraw<'_, G>) {
        self.omni_shadow_shader.bind();
        draw.shadow_index_buffer.bind();
        context.set_face_culling(CullMode::Front);
        for (index, (_, target)) in lights.point_lights().iter().enumerate() {
            let Some(target) = target else { continue };
            target.bind();
            context.set_viewport(target.width(), target.height());
            context.clear(ClearFlags::DEPTH);
            self.omni_shadow_shader
                .set_uniform("u_CurrentLight", UniformValue::Int(index as i32));
            if draw.shadow_index_count > 0 {
                context.draw_indexed(draw.shadow_index_count);
            }
        }
        context.set_face_culling(CullMode::Back);
    }

    fn run_geometry(&self, context: &mut G, lights: &LightRig<G>, draw: &StagedDraw<'_, G>) {
        self.scene_target.bind();
        context.set_viewport(self.scene_target.width(), self.scene_target.height());
        context.clear(ClearFlags::COLOR | ClearFlags::DEPTH);
        self.geometry_shader.bind();
        draw.index_buffer.bind();
        self.bind_shadow_maps(lights);
        context.draw_indexed(draw.index_count);
    }

    /// Shadow depth textures live above the batch's sampler range so a full
    /// slot table never collides with them. The sampler uniforms are
    /// optional; a shader without shadows simply ignores them.
    fn bind_shadow_maps(&self, lights: &LightRig<G>) {
        for (index, (_, target)) in lights.directional_lights().iter().enumerate() {
            let depth = target.as_ref().and_then(|t| t.depth_attachment());
            if let Some(depth) = depth {
                let slot = self.directional_shadow_slot(index as u32);
                depth.bind(slot);
                let _ = self.geometry_shader.try_set_uniform(
                    &format!("u_DirectionalShadowMaps[{index}]"),
                    UniformValue::Int(slot as i32),
                );
            }
        }
        for (index, (_, target)) in lights.point_lights().iter().enumerate() {
            let depth = target.as_ref().and_then(|t| t.depth_attachment());
            if let Some(depth) = depth {
                let slot = self.omni_shadow_slot(index as u32);
                depth.bind(slot);
                let _ = self.geometry_shader.try_set_uniform(
                    &format!("u_OmniShadowMaps[{index}]"),
                    UniformValue::Int(slot as i32),
                );
            }
        }
    }

    /// Redraws the batch on top of the lit result with depth testing
    /// disabled, for outlines and markers that must never be occluded.
    fn run_overlay(&self, context: &mut G, draw: &StagedDraw<'_, G>) {
        self.overlay_shader.bind();
        draw.index_buffer.bind();
        context.set_depth_func(DepthFunc::Always);
        context.set_depth_write(false);
        context.draw_indexed(draw.index_count);
        context.set_depth_write(true);
        context.set_depth_func(DepthFunc::Less);
    }

    fn run_skybox(&self, context: &mut G) {
        let Some(cubemap) = &self.skybox_cubemap else {
            return;
        };
        self.skybox_shader.bind();
        let slot = self.skybox_slot();
        cubemap.bind(slot);
        let _ = self
            .skybox_shader
            .try_set_uniform("u_Skybox", UniformValue::Int(slot as i32));
        // Lequal lets the unit cube pass the depth test at the far plane.
        context.set_depth_func(DepthFunc::Lequal);
        context.set_depth_write(false);
        context.draw_vertices(SKYBOX_CUBE_VERTICES);
        context.set_depth_write(true);
        context.set_depth_func(DepthFunc::Less);
    }

    fn run_post_process(&self, context: &mut G) {
        let Some(shader) = &self.post_process_shader else {
            return;
        };
        self.scene_target.unbind();
        context.bind_screen();
        let (width, height) = context.surface_size();
        context.set_viewport(width, height);
        context.clear(ClearFlags::COLOR);
        shader.bind();
        if let Some(color) = self.scene_target.color_attachment() {
            let slot = self.post_process_slot();
            color.bind(slot);
            let _ = shader.try_set_uniform("u_SceneColor", UniformValue::Int(slot as i32));
        }
        context.set_depth_write(false);
        context.draw_vertices(FULLSCREEN_TRIANGLE_VERTICES);
        context.set_depth_write(true);
    }

    fn directional_shadow_slot(&self, index: u32) -> u32 {
        self.first_free_slot + index
    }

    fn omni_shadow_slot(&self, index: u32) -> u32 {
        self.first_free_slot + MAX_DIRECTIONAL_LIGHTS + index
    }

    fn skybox_slot(&self) -> u32 {
        self.first_free_slot + MAX_DIRECTIONAL_LIGHTS + MAX_POINT_LIGHTS
    }

    fn post_process_slot(&self) -> u32 {
        self.skybox_slot() + 1
    }
}
