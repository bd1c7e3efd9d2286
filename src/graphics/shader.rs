use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

/// A value destined for a shader uniform or a packed uniform buffer field.
///
/// Collapsing the per-type overloads into one enum keeps the `Shader` trait
/// object-safe and gives the uniform buffer a single serialization path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Bool(bool),
    Int(i32),
    UInt(u32),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat3(Mat3),
    Mat4(Mat4),
}

/// std140 serialization of a single `UniformValue`. 64 bytes covers the
/// largest case (mat4); mat3 columns are padded out to vec4 stride.
pub struct Std140Bytes {
    buf: [u8; 64],
    len: usize,
}

impl Std140Bytes {
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl UniformValue {
    /// Number of bytes `to_std140` produces. Vec3 serializes as 12 bytes;
    /// the 16-byte slot padding is the layout's concern, not the value's.
    pub fn byte_len(&self) -> u32 {
        match self {
            UniformValue::Bool(_)
            | UniformValue::Int(_)
            | UniformValue::UInt(_)
            | UniformValue::Float(_) => 4,
            UniformValue::Vec2(_) => 8,
            UniformValue::Vec3(_) => 12,
            UniformValue::Vec4(_) => 16,
            UniformValue::Mat3(_) => 48,
            UniformValue::Mat4(_) => 64,
        }
    }

    pub fn to_std140(&self) -> Std140Bytes {
        let mut buf = [0u8; 64];
        let len = match self {
            UniformValue::Bool(v) => {
                buf[..4].copy_from_slice(&u32::from(*v).to_le_bytes());
                4
            }
            UniformValue::Int(v) => {
                buf[..4].copy_from_slice(&v.to_le_bytes());
                4
            }
            UniformValue::UInt(v) => {
                buf[..4].copy_from_slice(&v.to_le_bytes());
                4
            }
            UniformValue::Float(v) => {
                buf[..4].copy_from_slice(&v.to_le_bytes());
                4
            }
            UniformValue::Vec2(v) => {
                buf[..8].copy_from_slice(bytemuck::cast_slice(&v.to_array()));
                8
            }
            UniformValue::Vec3(v) => {
                buf[..12].copy_from_slice(bytemuck::cast_slice(&v.to_array()));
                12
            }
            UniformValue::Vec4(v) => {
                buf[..16].copy_from_slice(bytemuck::cast_slice(&v.to_array()));
                16
            }
            UniformValue::Mat3(m) => {
                // Each column occupies a full vec4 stride in std140.
                for (i, col) in [m.x_axis, m.y_axis, m.z_axis].iter().enumerate() {
                    let start = i * 16;
                    buf[start..start + 12].copy_from_slice(bytemuck::cast_slice(&col.to_array()));
                }
                48
            }
            UniformValue::Mat4(m) => {
                buf[..64].copy_from_slice(bytemuck::cast_slice(&m.to_cols_array()));
                64
            }
        };
        Std140Bytes { buf, len }
    }
}

impl From<bool> for UniformValue {
    fn from(v: bool) -> Self {
        UniformValue::Bool(v)
    }
}

impl From<i32> for UniformValue {
    fn from(v: i32) -> Self {
        UniformValue::Int(v)
    }
}

impl From<u32> for UniformValue {
    fn from(v: u32) -> Self {
        UniformValue::UInt(v)
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::Float(v)
    }
}

impl From<Vec2> for UniformValue {
    fn from(v: Vec2) -> Self {
        UniformValue::Vec2(v)
    }
}

impl From<Vec3> for UniformValue {
    fn from(v: Vec3) -> Self {
        UniformValue::Vec3(v)
    }
}

impl From<Vec4> for UniformValue {
    fn from(v: Vec4) -> Self {
        UniformValue::Vec4(v)
    }
}

impl From<Mat3> for UniformValue {
    fn from(v: Mat3) -> Self {
        UniformValue::Mat3(v)
    }
}

impl From<Mat4> for UniformValue {
    fn from(v: Mat4) -> Self {
        UniformValue::Mat4(v)
    }
}

/// A compiled shader program exposing named-uniform writes.
///
/// `set_uniform` is for uniforms the core knows the shader declares; an
/// unknown name is a programmer error and implementations should report it
/// loudly. `try_set_uniform` is for optional, shader-dependent uniforms and
/// returns whether the name existed.
pub trait Shader {
    fn bind(&self);
    fn set_uniform(&self, name: &str, value: UniformValue);
    fn try_set_uniform(&self, name: &str, value: UniformValue) -> bool;
}
