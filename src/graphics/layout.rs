/// Interleaved vertex attribute description handed to the backend when a
/// vertex buffer is created. Offsets and stride are derived from declaration
/// order, so the layout always matches the `#[repr(C)]` record it describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeKind {
    Float,
    Float2,
    Float3,
    Float4,
    Int,
    Int2,
    Int3,
    Int4,
}

impl AttributeKind {
    pub fn byte_size(self) -> u32 {
        4 * self.component_count()
    }

    pub fn component_count(self) -> u32 {
        match self {
            AttributeKind::Float | AttributeKind::Int => 1,
            AttributeKind::Float2 | AttributeKind::Int2 => 2,
            AttributeKind::Float3 | AttributeKind::Int3 => 3,
            AttributeKind::Float4 | AttributeKind::Int4 => 4,
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            AttributeKind::Int | AttributeKind::Int2 | AttributeKind::Int3 | AttributeKind::Int4
        )
    }
}

#[derive(Clone, Copy, Debug)]
pub struct VertexAttribute {
    pub name: &'static str,
    pub kind: AttributeKind,
    pub offset: u32,
}

#[derive(Clone, Debug)]
pub struct VertexLayout {
    attributes: Vec<VertexAttribute>,
    stride: u32,
}

impl VertexLayout {
    pub fn new(elements: &[(&'static str, AttributeKind)]) -> Self {
        let mut attributes = Vec::with_capacity(elements.len());
        let mut offset = 0;
        for &(name, kind) in elements {
            attributes.push(VertexAttribute { name, kind, offset });
            offset += kind.byte_size();
        }
        Self {
            attributes,
            stride: offset,
        }
    }

    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }
}
