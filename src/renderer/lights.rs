use std::rc::Rc;

use glam::{Mat4, Vec2, Vec3, Vec4};
use log::debug;

use crate::error::RendererError;
use crate::graphics::{Framebuffer, FramebufferSpec, GraphicsContext};
use crate::renderer::uniforms::SharedUniforms;
use crate::renderer::{MAX_DIRECTIONAL_LIGHTS, MAX_POINT_LIGHTS, MAX_SPOT_LIGHTS};

/// Half-extent of the orthographic volume a directional shadow map covers.
const SHADOW_ORTHO_EXTENT: f32 = 20.0;

#[derive(Clone, Debug)]
pub struct DirectionalLight {
    pub color: Vec4,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub intensity: f32,
    pub direction: Vec3,
    pub casts_shadows: bool,
    pub bias: f32,
    pub near_plane: f32,
    pub far_plane: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            color: Vec4::ONE,
            ambient: Vec3::splat(0.1),
            diffuse: Vec3::splat(0.8),
            specular: Vec3::ONE,
            intensity: 1.0,
            direction: Vec3::new(0.0, -1.0, 0.0),
            casts_shadows: true,
            bias: 0.005,
            near_plane: 0.1,
            far_plane: 100.0,
        }
    }
}

impl DirectionalLight {
    /// Orthographic projection looking down the light direction at the
    /// scene origin. When the direction is nearly parallel to world up,
    /// the view basis falls back to the X axis to stay well defined.
    pub fn light_space_matrix(&self) -> Mat4 {
        let direction = self.direction.normalize_or_zero();
        let up = if direction.dot(Vec3::Y).abs() > 0.999 {
            Vec3::X
        } else {
            Vec3::Y
        };
        let eye = -direction * self.far_plane * 0.5;
        let view = Mat4::look_at_rh(eye, Vec3::ZERO, up);
        let projection = Mat4::orthographic_rh(
            -SHADOW_ORTHO_EXTENT,
            SHADOW_ORTHO_EXTENT,
            -SHADOW_ORTHO_EXTENT,
            SHADOW_ORTHO_EXTENT,
            self.near_plane,
            self.far_plane,
        );
        projection * view
    }
}

#[derive(Clone, Debug)]
pub struct PointLight {
    pub color: Vec4,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub intensity: f32,
    pub position: Vec3,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
    pub casts_shadows: bool,
    pub far_plane: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            color: Vec4::ONE,
            ambient: Vec3::splat(0.1),
            diffuse: Vec3::splat(0.8),
            specular: Vec3::ONE,
            intensity: 1.0,
            position: Vec3::ZERO,
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
            casts_shadows: true,
            far_plane: 50.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SpotLight {
    pub color: Vec4,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub intensity: f32,
    pub position: Vec3,
    pub direction: Vec3,
    /// Cosines of the cone angles, inner >= outer.
    pub inner_cutoff: f32,
    pub outer_cutoff: f32,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Default for SpotLight {
    fn default() -> Self {
        Self {
            color: Vec4::ONE,
            ambient: Vec3::splat(0.1),
            diffuse: Vec3::splat(0.8),
            specular: Vec3::ONE,
            intensity: 1.0,
            position: Vec3::ZERO,
            direction: Vec3::new(0.0, -1.0, 0.0),
            inner_cutoff: 0.95,
            outer_cutoff: 0.9,
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
        }
    }
}

/// The scene's lights plus their shadow map targets. Adding a light writes
/// its packed fields into the shared buffer immediately and, for shadow
/// casters, allocates the depth target up front so an incomplete one fails
/// at setup rather than mid-frame.
pub struct LightRig<G: GraphicsContext> {
    directional: Vec<(DirectionalLight, Option<Rc<G::Framebuffer>>)>,
    points: Vec<(PointLight, Option<Rc<G::Framebuffer>>)>,
    spots: Vec<SpotLight>,
    shadow_map_resolution: u32,
}

impl<G: GraphicsContext> LightRig<G> {
    pub fn new(shadow_map_resolution: u32) -> Self {
        Self {
            directional: Vec::new(),
            points: Vec::new(),
            spots: Vec::new(),
            shadow_map_resolution,
        }
    }

    pub fn add_directional(
        &mut self,
        context: &mut G,
        uniforms: &SharedUniforms<G::UniformBuffer>,
        light: DirectionalLight,
    ) -> Result<(), RendererError> {
        if self.directional.len() as u32 >= MAX_DIRECTIONAL_LIGHTS {
            return Err(RendererError::TooManyLights {
                kind: "directional",
                max: MAX_DIRECTIONAL_LIGHTS,
            });
        }

        let index = self.directional.len();
        let base = format!("u_DirectionalLights[{index}]");
        uniforms.set(&format!("{base}.Color"), light.color);
        uniforms.set(&format!("{base}.Ambient"), light.ambient);
        uniforms.set(&format!("{base}.Diffuse"), light.diffuse);
        uniforms.set(&format!("{base}.Specular"), light.specular);
        uniforms.set(&format!("{base}.Intensity"), light.intensity);
        uniforms.set(&format!("{base}.Enabled"), true);
        uniforms.set(&format!("{base}.Direction"), light.direction);
        uniforms.set(&format!("{base}.CastsShadows"), light.casts_shadows);
        uniforms.set(&format!("{base}.Bias"), light.bias);
        uniforms.set(
            &format!("{base}.NearFarPlane"),
            Vec2::new(light.near_plane, light.far_plane),
        );
        uniforms.set(
            &format!("{base}.LightSpaceMatrix"),
            light.light_space_matrix(),
        );

        let shadow_map = if light.casts_shadows {
            Some(self.create_shadow_target(context, "directional shadow map", FramebufferSpec::DEPTH_ONLY)?)
        } else {
            None
        };

        debug!("Added directional light {index}");
        self.directional.push((light, shadow_map));
        uniforms.set("u_DirectionalLightCount", self.directional.len() as i32);
        Ok(())
    }

    pub fn add_point(
        &mut self,
        context: &mut G,
        uniforms: &SharedUniforms<G::UniformBuffer>,
        light: PointLight,
    ) -> Result<(), RendererError> {
        if self.points.len() as u32 >= MAX_POINT_LIGHTS {
            return Err(RendererError::TooManyLights {
                kind: "point",
                max: MAX_POINT_LIGHTS,
            });
        }

        let index = self.points.len();
        let base = format!("u_PointLights[{index}]");
        uniforms.set(&format!("{base}.Color"), light.color);
        uniforms.set(&format!("{base}.Ambient"), light.ambient);
        uniforms.set(&format!("{base}.Diffuse"), light.diffuse);
        uniforms.set(&format!("{base}.Specular"), light.specular);
        uniforms.set(&format!("{base}.Intensity"), light.intensity);
        uniforms.set(&format!("{base}.Enabled"), true);
        uniforms.set(&format!("{base}.Position"), light.position);
        uniforms.set(&format!("{base}.Constant"), light.constant);
        uniforms.set(&format!("{base}.Linear"), light.linear);
        uniforms.set(&format!("{base}.Quadratic"), light.quadratic);
        uniforms.set(&format!("{base}.CastsShadows"), light.casts_shadows);
        uniforms.set(&format!("{base}.FarPlane"), light.far_plane);

        let shadow_map = if light.casts_shadows {
            Some(self.create_shadow_target(context, "omni shadow map", FramebufferSpec::DEPTH_CUBEMAP)?)
        } else {
            None
        };

        debug!("Added point light {index}");
        self.points.push((light, shadow_map));
        uniforms.set("u_PointLightCount", self.points.len() as i32);
        Ok(())
    }

    /// Spot lights do not cast shadows; no depth target is allocated.
    pub fn add_spot(
        &mut self,
        uniforms: &SharedUniforms<G::UniformBuffer>,
        light: SpotLight,
    ) -> Result<(), RendererError> {
        if self.spots.len() as u32 >= MAX_SPOT_LIGHTS {
            return Err(RendererError::TooManyLights {
                kind: "spot",
                max: MAX_SPOT_LIGHTS,
            });
        }

        let index = self.spots.len();
        let base = format!("u_SpotLights[{index}]");
        uniforms.set(&format!("{base}.Color"), light.color);
        uniforms.set(&format!("{base}.Ambient"), light.ambient);
        uniforms.set(&format!("{base}.Diffuse"), light.diffuse);
        uniforms.set(&format!("{base}.Specular"), light.specular);
        uniforms.set(&format!("{base}.Intensity"), light.intensity);
        uniforms.set(&format!("{base}.Enabled"), true);
        uniforms.set(&format!("{base}.Position"), light.position);
        uniforms.set(&format!("{base}.Direction"), light.direction);
        uniforms.set(&format!("{base}.InnerCutoff"), light.inner_cutoff);
        uniforms.set(&format!("{base}.OuterCutoff"), light.outer_cutoff);
        uniforms.set(&format!("{base}.Constant"), light.constant);
        uniforms.set(&format!("{base}.Linear"), light.linear);
        uniforms.set(&format!("{base}.Quadratic"), light.quadratic);

        self.spots.push(light);
        uniforms.set("u_SpotLightCount", self.spots.len() as i32);
        Ok(())
    }

    fn create_shadow_target(
        &self,
        context: &mut G,
        label: &'static str,
        spec: FramebufferSpec,
    ) -> Result<Rc<G::Framebuffer>, RendererError> {
        let target = context.create_framebuffer(
            label,
            self.shadow_map_resolution,
            self.shadow_map_resolution,
            spec,
        );
        if !target.is_complete() {
            return Err(RendererError::IncompleteFramebuffer { label });
        }
        Ok(target)
    }

    pub fn directional_lights(&self) -> &[(DirectionalLight, Option<Rc<G::Framebuffer>>)] {
        &self.directional
    }

    pub fn point_lights(&self) -> &[(PointLight, Option<Rc<G::Framebuffer>>)] {
        &self.points
    }

    pub fn spot_lights(&self) -> &[SpotLight] {
        &self.spots
    }

    pub fn directional_count(&self) -> u32 {
        self.directional.len() as u32
    }

    pub fn point_count(&self) -> u32 {
        self.points.len() as u32
    }

    pub fn spot_count(&self) -> u32 {
        self.spots.len() as u32
    }
}
