pub mod camera;
pub mod context;
pub mod layout;
pub mod shader;
pub mod texture;

pub use camera::Camera;
pub use context::{
    ClearFlags, CullMode, DepthAttachment, DepthFunc, Framebuffer, FramebufferSpec,
    GraphicsContext, IndexBuffer, PolygonMode, UniformBuffer, VertexBuffer,
};
pub use layout::{AttributeKind, VertexAttribute, VertexLayout};
pub use shader::{Shader, Std140Bytes, UniformValue};
pub use texture::{Texture, TextureId};
