use std::rc::Rc;

use log::error;

use crate::graphics::{UniformBuffer, UniformValue};
use crate::renderer::uniform_layout::{UniformKind, UniformLayout};
use crate::renderer::{MAX_DIRECTIONAL_LIGHTS, MAX_POINT_LIGHTS, MAX_SPOT_LIGHTS};

/// Write-through view over a packed uniform buffer. Paths are resolved
/// against the layout and forwarded to the backend as byte writes; the
/// backend never sees field names.
pub struct SharedUniforms<U: UniformBuffer> {
    layout: UniformLayout,
    buffer: Rc<U>,
}

impl<U: UniformBuffer> SharedUniforms<U> {
    pub fn new(layout: UniformLayout, buffer: Rc<U>) -> Self {
        Self { layout, buffer }
    }

    pub fn layout(&self) -> &UniformLayout {
        &self.layout
    }

    pub fn bind(&self) {
        self.buffer.bind();
    }

    /// Writes a field the layout is known to declare. An unresolvable path
    /// is a programmer error: logged, asserted in debug builds, and skipped
    /// in release builds.
    pub fn set(&self, path: &str, value: impl Into<UniformValue>) {
        let value = value.into();
        match self.layout.resolve(path) {
            Some(field) => {
                if value.byte_len() > field.size {
                    error!(
                        "Uniform value for '{}' is {} bytes but the field holds {}.",
                        path,
                        value.byte_len(),
                        field.size
                    );
                    debug_assert!(false, "oversized uniform write: {path}");
                    return;
                }
                self.buffer.write(field.offset, value.to_std140().as_slice());
            }
            None => {
                error!("Uniform path '{}' does not exist in the shared layout.", path);
                debug_assert!(false, "unknown uniform path: {path}");
            }
        }
    }

    /// Like `set` but silent: returns whether the path resolved and the
    /// write happened. For fields that are only present in some layouts.
    pub fn try_set(&self, path: &str, value: impl Into<UniformValue>) -> bool {
        let value = value.into();
        match self.layout.resolve(path) {
            Some(field) if value.byte_len() <= field.size => {
                self.buffer.write(field.offset, value.to_std140().as_slice());
                true
            }
            _ => false,
        }
    }
}

fn directional_light_kind() -> UniformKind {
    UniformKind::struct_of(vec![
        ("Color", UniformKind::Vec4),
        ("Ambient", UniformKind::Vec3),
        ("Diffuse", UniformKind::Vec3),
        ("Specular", UniformKind::Vec3),
        ("Intensity", UniformKind::Scalar),
        ("Enabled", UniformKind::Scalar),
        ("Direction", UniformKind::Vec3),
        ("CastsShadows", UniformKind::Scalar),
        ("Bias", UniformKind::Scalar),
        ("NearFarPlane", UniformKind::Vec2),
        ("LightSpaceMatrix", UniformKind::Mat4),
    ])
}

fn point_light_kind() -> UniformKind {
    UniformKind::struct_of(vec![
        ("Color", UniformKind::Vec4),
        ("Ambient", UniformKind::Vec3),
        ("Diffuse", UniformKind::Vec3),
        ("Specular", UniformKind::Vec3),
        ("Intensity", UniformKind::Scalar),
        ("Enabled", UniformKind::Scalar),
        ("Position", UniformKind::Vec3),
        ("Constant", UniformKind::Scalar),
        ("Linear", UniformKind::Scalar),
        ("Quadratic", UniformKind::Scalar),
        ("CastsShadows", UniformKind::Scalar),
        ("FarPlane", UniformKind::Scalar),
    ])
}

fn spot_light_kind() -> UniformKind {
    UniformKind::struct_of(vec![
        ("Color", UniformKind::Vec4),
        ("Ambient", UniformKind::Vec3),
        ("Diffuse", UniformKind::Vec3),
        ("Specular", UniformKind::Vec3),
        ("Intensity", UniformKind::Scalar),
        ("Enabled", UniformKind::Scalar),
        ("Position", UniformKind::Vec3),
        ("Direction", UniformKind::Vec3),
        ("InnerCutoff", UniformKind::Scalar),
        ("OuterCutoff", UniformKind::Scalar),
        ("Constant", UniformKind::Scalar),
        ("Linear", UniformKind::Scalar),
        ("Quadratic", UniformKind::Scalar),
    ])
}

/// Layout of the per-frame shared buffer every pipeline shader reads:
/// camera matrices followed by the light counts and the three light arrays.
pub fn shared_frame_layout() -> UniformLayout {
    UniformLayout::new(vec![
        ("u_ViewProjection", UniformKind::Mat4),
        ("u_View", UniformKind::Mat4),
        ("u_Projection", UniformKind::Mat4),
        ("u_CameraPosition", UniformKind::Vec3),
        ("u_DirectionalLightCount", UniformKind::Scalar),
        ("u_PointLightCount", UniformKind::Scalar),
        ("u_SpotLightCount", UniformKind::Scalar),
        (
            "u_DirectionalLights",
            UniformKind::array_of(directional_light_kind(), MAX_DIRECTIONAL_LIGHTS),
        ),
        (
            "u_PointLights",
            UniformKind::array_of(point_light_kind(), MAX_POINT_LIGHTS),
        ),
        (
            "u_SpotLights",
            UniformKind::array_of(spot_light_kind(), MAX_SPOT_LIGHTS),
        ),
    ])
}
