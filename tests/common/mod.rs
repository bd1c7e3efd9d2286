//! Recording in-memory graphics stack. Every state change, bind and draw is
//! appended to a shared operation log so tests can assert on the exact GPU
//! command sequence a renderer action produces.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use basalt::error::RendererError;
use basalt::graphics::{
    Camera, ClearFlags, CullMode, DepthFunc, Framebuffer, FramebufferSpec, GraphicsContext,
    IndexBuffer, PolygonMode, Shader, Texture, TextureId, UniformBuffer, UniformValue,
    VertexBuffer, VertexLayout,
};
use glam::{Mat4, Vec3};

#[derive(Clone, Debug, PartialEq)]
pub enum GpuOp {
    BindFramebuffer(&'static str),
    BindScreen,
    Clear(ClearFlags),
    SetViewport(u32, u32),
    SetCulling(CullMode),
    SetDepthFunc(DepthFunc),
    SetDepthWrite(bool),
    SetPolygonMode(PolygonMode),
    BindShader(String),
    ShaderUniform(String),
    BindTexture(u64, u32),
    VertexUpload(usize),
    IndexUpload(Vec<u32>),
    DrawIndexed(u32),
    DrawVertices(u32),
    Blit(&'static str),
}

pub type OpLog = Rc<RefCell<Vec<GpuOp>>>;

pub fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Clone)]
pub struct FakeTexture {
    id: u64,
    log: OpLog,
}

impl Texture for FakeTexture {
    fn id(&self) -> TextureId {
        TextureId(self.id)
    }

    fn bind(&self, slot: u32) {
        self.log.borrow_mut().push(GpuOp::BindTexture(self.id, slot));
    }
}

pub struct FakeShader {
    name: String,
    log: OpLog,
}

impl Shader for FakeShader {
    fn bind(&self) {
        self.log.borrow_mut().push(GpuOp::BindShader(self.name.clone()));
    }

    fn set_uniform(&self, name: &str, _value: UniformValue) {
        self.log
            .borrow_mut()
            .push(GpuOp::ShaderUniform(format!("{}:{}", self.name, name)));
    }

    fn try_set_uniform(&self, name: &str, value: UniformValue) -> bool {
        self.set_uniform(name, value);
        true
    }
}

pub struct FakeVertexBuffer {
    pub uploads: RefCell<Vec<Vec<u8>>>,
    log: OpLog,
}

impl VertexBuffer for FakeVertexBuffer {
    fn bind(&self) {}

    fn set_layout(&self, _layout: &VertexLayout) {}

    fn set_data(&self, bytes: &[u8]) {
        self.log.borrow_mut().push(GpuOp::VertexUpload(bytes.len()));
        self.uploads.borrow_mut().push(bytes.to_vec());
    }
}

pub struct FakeIndexBuffer {
    pub uploads: RefCell<Vec<Vec<u32>>>,
    log: OpLog,
}

impl IndexBuffer for FakeIndexBuffer {
    fn bind(&self) {}

    fn set_data(&self, indices: &[u32]) {
        self.log.borrow_mut().push(GpuOp::IndexUpload(indices.to_vec()));
        self.uploads.borrow_mut().push(indices.to_vec());
    }
}

pub struct FakeUniformBuffer {
    pub bytes: RefCell<Vec<u8>>,
}

impl FakeUniformBuffer {
    pub fn read(&self, offset: u32, len: usize) -> Vec<u8> {
        let bytes = self.bytes.borrow();
        bytes[offset as usize..offset as usize + len].to_vec()
    }
}

impl UniformBuffer for FakeUniformBuffer {
    fn bind(&self) {}

    fn write(&self, offset: u32, data: &[u8]) {
        let mut bytes = self.bytes.borrow_mut();
        let end = offset as usize + data.len();
        if bytes.len() < end {
            bytes.resize(end, 0);
        }
        bytes[offset as usize..end].copy_from_slice(data);
    }
}

pub struct FakeFramebuffer {
    label: &'static str,
    width: u32,
    height: u32,
    complete: bool,
    color: Option<FakeTexture>,
    depth: Option<FakeTexture>,
    log: OpLog,
}

impl Framebuffer for FakeFramebuffer {
    type Texture = FakeTexture;

    fn bind(&self) {
        self.log.borrow_mut().push(GpuOp::BindFramebuffer(self.label));
    }

    fn unbind(&self) {}

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn is_complete(&self) -> bool {
        self.complete
    }

    fn color_attachment(&self) -> Option<FakeTexture> {
        self.color.clone()
    }

    fn depth_attachment(&self) -> Option<FakeTexture> {
        self.depth.clone()
    }
}

pub struct FakeContext {
    pub log: OpLog,
    pub uniform_buffers: Vec<Rc<FakeUniformBuffer>>,
    pub vertex_buffers: Vec<Rc<FakeVertexBuffer>>,
    pub index_buffers: Vec<Rc<FakeIndexBuffer>>,
    /// Framebuffer labels that should come out incomplete.
    pub failing_framebuffers: HashSet<&'static str>,
    surface: (u32, u32),
    next_texture_id: u64,
}

impl FakeContext {
    pub fn new() -> Self {
        Self {
            log: Rc::new(RefCell::new(Vec::new())),
            uniform_buffers: Vec::new(),
            vertex_buffers: Vec::new(),
            index_buffers: Vec::new(),
            failing_framebuffers: HashSet::new(),
            surface: (1280, 720),
            next_texture_id: 1,
        }
    }

    pub fn ops(&self) -> Vec<GpuOp> {
        self.log.borrow().clone()
    }

    pub fn shared_uniform_bytes(&self) -> &Rc<FakeUniformBuffer> {
        &self.uniform_buffers[0]
    }

    fn new_texture(&mut self) -> FakeTexture {
        let id = self.next_texture_id;
        self.next_texture_id += 1;
        FakeTexture {
            id,
            log: self.log.clone(),
        }
    }
}

impl GraphicsContext for FakeContext {
    type Shader = FakeShader;
    type Texture = FakeTexture;
    type Framebuffer = FakeFramebuffer;
    type VertexBuffer = FakeVertexBuffer;
    type IndexBuffer = FakeIndexBuffer;
    type UniformBuffer = FakeUniformBuffer;

    fn create_vertex_buffer(&mut self, _byte_size: u32) -> Rc<FakeVertexBuffer> {
        let buffer = Rc::new(FakeVertexBuffer {
            uploads: RefCell::new(Vec::new()),
            log: self.log.clone(),
        });
        self.vertex_buffers.push(buffer.clone());
        buffer
    }

    fn create_index_buffer(&mut self, _capacity: u32) -> Rc<FakeIndexBuffer> {
        let buffer = Rc::new(FakeIndexBuffer {
            uploads: RefCell::new(Vec::new()),
            log: self.log.clone(),
        });
        self.index_buffers.push(buffer.clone());
        buffer
    }

    fn create_uniform_buffer(&mut self, _binding: u32, byte_size: u32) -> Rc<FakeUniformBuffer> {
        let buffer = Rc::new(FakeUniformBuffer {
            bytes: RefCell::new(vec![0; byte_size as usize]),
        });
        self.uniform_buffers.push(buffer.clone());
        buffer
    }

    fn create_framebuffer(
        &mut self,
        label: &'static str,
        width: u32,
        height: u32,
        spec: FramebufferSpec,
    ) -> Rc<FakeFramebuffer> {
        let color = spec.color.then(|| self.new_texture());
        let depth = match spec.depth {
            basalt::graphics::DepthAttachment::None => None,
            _ => Some(self.new_texture()),
        };
        Rc::new(FakeFramebuffer {
            label,
            width,
            height,
            complete: !self.failing_framebuffers.contains(label),
            color,
            depth,
            log: self.log.clone(),
        })
    }

    fn create_shader(
        &mut self,
        vertex_src: &str,
        _fragment_src: &str,
    ) -> Result<Rc<FakeShader>, RendererError> {
        let name = vertex_src
            .rsplit('/')
            .next()
            .and_then(|file| file.strip_suffix(".vert"))
            .unwrap_or(vertex_src)
            .to_string();
        Ok(Rc::new(FakeShader {
            name,
            log: self.log.clone(),
        }))
    }

    fn create_texture(&mut self, _width: u32, _height: u32, _rgba: &[u8]) -> FakeTexture {
        self.new_texture()
    }

    fn set_face_culling(&mut self, mode: CullMode) {
        self.log.borrow_mut().push(GpuOp::SetCulling(mode));
    }

    fn set_depth_func(&mut self, func: DepthFunc) {
        self.log.borrow_mut().push(GpuOp::SetDepthFunc(func));
    }

    fn set_depth_write(&mut self, enabled: bool) {
        self.log.borrow_mut().push(GpuOp::SetDepthWrite(enabled));
    }

    fn set_polygon_mode(&mut self, mode: PolygonMode) {
        self.log.borrow_mut().push(GpuOp::SetPolygonMode(mode));
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.log.borrow_mut().push(GpuOp::SetViewport(width, height));
    }

    fn clear(&mut self, flags: ClearFlags) {
        self.log.borrow_mut().push(GpuOp::Clear(flags));
    }

    fn draw_indexed(&mut self, count: u32) {
        self.log.borrow_mut().push(GpuOp::DrawIndexed(count));
    }

    fn draw_vertices(&mut self, count: u32) {
        self.log.borrow_mut().push(GpuOp::DrawVertices(count));
    }

    fn bind_screen(&mut self) {
        self.log.borrow_mut().push(GpuOp::BindScreen);
    }

    fn blit_to_screen(&mut self, source: &FakeFramebuffer) {
        self.log.borrow_mut().push(GpuOp::Blit(source.label));
    }

    fn surface_size(&self) -> (u32, u32) {
        self.surface
    }
}

/// Fixed camera looking down -Z from a known position.
pub struct FakeCamera {
    pub view: Mat4,
    pub projection: Mat4,
    pub position: Vec3,
}

impl FakeCamera {
    pub fn new() -> Self {
        let position = Vec3::new(0.0, 2.0, 5.0);
        Self {
            view: Mat4::look_at_rh(position, Vec3::ZERO, Vec3::Y),
            projection: Mat4::perspective_rh(1.0, 16.0 / 9.0, 0.1, 100.0),
            position,
        }
    }
}

impl Camera for FakeCamera {
    fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    fn view(&self) -> Mat4 {
        self.view
    }

    fn projection(&self) -> Mat4 {
        self.projection
    }

    fn position(&self) -> Vec3 {
        self.position
    }
}
