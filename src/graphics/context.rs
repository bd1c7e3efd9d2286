use std::rc::Rc;

use bitflags::bitflags;

use crate::error::RendererError;
use crate::graphics::{Shader, Texture, VertexLayout};

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ClearFlags: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CullMode {
    None,
    Front,
    Back,
}

/// Depth comparison function, GL-style.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DepthFunc {
    Never,
    Less,
    Equal,
    Lequal,
    Greater,
    NotEqual,
    Gequal,
    Always,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolygonMode {
    Fill,
    Line,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DepthAttachment {
    None,
    Texture,
    Cubemap,
}

/// What a framebuffer is built from. Depth-only targets (shadow maps)
/// disable color entirely.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FramebufferSpec {
    pub color: bool,
    pub depth: DepthAttachment,
}

impl FramebufferSpec {
    pub const COLOR_DEPTH: Self = Self {
        color: true,
        depth: DepthAttachment::Texture,
    };
    pub const DEPTH_ONLY: Self = Self {
        color: false,
        depth: DepthAttachment::Texture,
    };
    pub const DEPTH_CUBEMAP: Self = Self {
        color: false,
        depth: DepthAttachment::Cubemap,
    };
}

pub trait VertexBuffer {
    fn bind(&self);
    fn set_layout(&self, layout: &VertexLayout);
    fn set_data(&self, bytes: &[u8]);
}

pub trait IndexBuffer {
    fn bind(&self);
    fn set_data(&self, indices: &[u32]);
}

/// A GPU-visible packed buffer the core addresses by byte offset. Offset
/// computation lives entirely on the core side (`UniformLayout`); the
/// backend only stores bytes.
pub trait UniformBuffer {
    fn bind(&self);
    fn write(&self, offset: u32, bytes: &[u8]);
}

pub trait Framebuffer {
    type Texture: Texture;

    fn bind(&self);
    fn unbind(&self);
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Whether the backing attachments were created successfully. Checked
    /// once at initialization; an incomplete target is fatal.
    fn is_complete(&self) -> bool;

    fn color_attachment(&self) -> Option<Self::Texture>;
    fn depth_attachment(&self) -> Option<Self::Texture>;
}

/// The 3D API seam. The core creates its resources through this trait once
/// at initialization and issues bind/draw calls through it every flush; it
/// never constructs raw GPU handles itself.
pub trait GraphicsContext {
    type Shader: Shader;
    type Texture: Texture;
    type Framebuffer: Framebuffer<Texture = Self::Texture>;
    type VertexBuffer: VertexBuffer;
    type IndexBuffer: IndexBuffer;
    type UniformBuffer: UniformBuffer;

    fn create_vertex_buffer(&mut self, byte_size: u32) -> Rc<Self::VertexBuffer>;
    fn create_index_buffer(&mut self, capacity: u32) -> Rc<Self::IndexBuffer>;
    fn create_uniform_buffer(&mut self, binding: u32, byte_size: u32) -> Rc<Self::UniformBuffer>;
    fn create_framebuffer(
        &mut self,
        label: &'static str,
        width: u32,
        height: u32,
        spec: FramebufferSpec,
    ) -> Rc<Self::Framebuffer>;

    /// `vertex_src`/`fragment_src` are opaque to the core; whether they are
    /// file paths or source text is the backend's business.
    fn create_shader(
        &mut self,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<Rc<Self::Shader>, RendererError>;

    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> Self::Texture;

    fn set_face_culling(&mut self, mode: CullMode);
    fn set_depth_func(&mut self, func: DepthFunc);
    fn set_depth_write(&mut self, enabled: bool);
    fn set_polygon_mode(&mut self, mode: PolygonMode);
    fn set_viewport(&mut self, width: u32, height: u32);
    fn clear(&mut self, flags: ClearFlags);

    fn draw_indexed(&mut self, count: u32);
    fn draw_vertices(&mut self, count: u32);

    /// Binds the default framebuffer (the window surface).
    fn bind_screen(&mut self);
    fn blit_to_screen(&mut self, source: &Self::Framebuffer);
    fn surface_size(&self) -> (u32, u32);
}
