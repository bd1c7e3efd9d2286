//! std140-like uniform buffer layout and field-path resolution.
//!
//! Offsets are computed once at construction and never change. The packing
//! rule mirrors GPU uniform-block packing: scalars align to 4, vec2 to 8,
//! vec3/vec4/matrices to 16; matrix columns occupy full vec4 strides; array
//! elements are padded to a 16-byte-aligned uniform stride; a struct's size
//! is rounded up to 16 and its alignment is its widest member's.

fn align_to(offset: u32, alignment: u32) -> u32 {
    (offset + alignment - 1) & !(alignment - 1)
}

#[derive(Clone, Debug)]
pub enum UniformKind {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat3,
    Mat4,
    Struct(Vec<UniformField>),
    Array { element: Box<UniformKind>, count: u32 },
}

impl UniformKind {
    /// Builds a struct kind, computing member offsets relative to the
    /// struct's own base.
    pub fn struct_of(members: Vec<(&str, UniformKind)>) -> Self {
        UniformKind::Struct(compute_fields(members))
    }

    pub fn array_of(element: UniformKind, count: u32) -> Self {
        UniformKind::Array {
            element: Box::new(element),
            count,
        }
    }

    pub fn base_alignment(&self) -> u32 {
        match self {
            UniformKind::Scalar => 4,
            UniformKind::Vec2 => 8,
            UniformKind::Vec3 | UniformKind::Vec4 => 16,
            UniformKind::Mat3 | UniformKind::Mat4 => 16,
            UniformKind::Struct(fields) => fields
                .iter()
                .map(|f| f.kind.base_alignment())
                .max()
                .unwrap_or(16),
            UniformKind::Array { .. } => 16,
        }
    }

    /// Bytes the field occupies in the buffer, padding included. Note that
    /// vec3 occupies a full vec4 slot.
    pub fn layout_size(&self) -> u32 {
        match self {
            UniformKind::Scalar => 4,
            UniformKind::Vec2 => 8,
            UniformKind::Vec3 | UniformKind::Vec4 => 16,
            UniformKind::Mat3 => 48,
            UniformKind::Mat4 => 64,
            UniformKind::Struct(fields) => {
                let end = fields.last().map(|f| f.offset + f.size).unwrap_or(0);
                align_to(end, 16)
            }
            UniformKind::Array { element, count } => element.array_stride() * count,
        }
    }

    /// Per-element stride when this kind is an array element.
    pub fn array_stride(&self) -> u32 {
        align_to(self.layout_size(), 16)
    }
}

#[derive(Clone, Debug)]
pub struct UniformField {
    name: String,
    kind: UniformKind,
    /// Layout size of the whole field (for arrays: stride * count).
    size: u32,
    /// Aligned offset relative to the enclosing layout or struct base.
    offset: u32,
}

impl UniformField {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &UniformKind {
        &self.kind
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }
}

fn compute_fields(members: Vec<(&str, UniformKind)>) -> Vec<UniformField> {
    let mut offset = 0u32;
    members
        .into_iter()
        .map(|(name, kind)| {
            let size = kind.layout_size();
            offset = align_to(offset, kind.base_alignment());
            let field = UniformField {
                name: name.to_string(),
                kind,
                size,
                offset,
            };
            offset += size;
            field
        })
        .collect()
}

/// A resolved field path: where it lives and how many bytes it spans.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedField {
    pub offset: u32,
    pub size: u32,
}

/// Immutable description of a packed uniform buffer. Built once per buffer.
#[derive(Clone, Debug)]
pub struct UniformLayout {
    fields: Vec<UniformField>,
    size: u32,
}

impl UniformLayout {
    pub fn new(members: Vec<(&str, UniformKind)>) -> Self {
        let fields = compute_fields(members);
        let size = fields.last().map(|f| f.offset + f.size).unwrap_or(0);
        Self { fields, size }
    }

    /// Total buffer size in bytes.
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn fields(&self) -> &[UniformField] {
        &self.fields
    }

    /// Resolves a dotted/bracketed path such as `u_PointLights[3].Position`
    /// to its byte offset and size. Pure: the same layout and path always
    /// produce the same result. Unknown names, out-of-range indices and
    /// malformed paths resolve to `None`.
    pub fn resolve(&self, path: &str) -> Option<ResolvedField> {
        resolve_in(&self.fields, path, 0)
    }
}

fn resolve_in(fields: &[UniformField], path: &str, base: u32) -> Option<ResolvedField> {
    let segment = split_path(path)?;
    let field = fields.iter().find(|f| f.name == segment.name)?;
    let offset = base + field.offset;

    match (&field.kind, segment.index) {
        (UniformKind::Array { element, count }, Some(index)) => {
            if index >= *count {
                return None;
            }
            let element_offset = offset + element.array_stride() * index;
            match segment.rest {
                None => Some(ResolvedField {
                    offset: element_offset,
                    size: element.layout_size(),
                }),
                Some(rest) => match element.as_ref() {
                    UniformKind::Struct(members) => resolve_in(members, rest, element_offset),
                    _ => None,
                },
            }
        }
        // Indexing anything that is not an array is malformed.
        (_, Some(_)) => None,
        (UniformKind::Struct(members), None) => match segment.rest {
            Some(rest) => resolve_in(members, rest, offset),
            None => Some(ResolvedField {
                offset,
                size: field.size,
            }),
        },
        (_, None) => match segment.rest {
            // Dotting into a non-struct is malformed.
            Some(_) => None,
            None => Some(ResolvedField {
                offset,
                size: field.size,
            }),
        },
    }
}

struct PathSegment<'a> {
    name: &'a str,
    index: Option<u32>,
    rest: Option<&'a str>,
}

/// Tokenizes the leading segment of `identifier ('[' uint ']')? ('.' path)?`.
fn split_path(path: &str) -> Option<PathSegment<'_>> {
    let name_end = path
        .find(|c| c == '[' || c == '.')
        .unwrap_or(path.len());
    let name = &path[..name_end];
    if name.is_empty() {
        return None;
    }

    let mut remainder = &path[name_end..];
    let mut index = None;

    if let Some(stripped) = remainder.strip_prefix('[') {
        let close = stripped.find(']')?;
        index = Some(stripped[..close].parse::<u32>().ok()?);
        remainder = &stripped[close + 1..];
    }

    let rest = match remainder {
        "" => None,
        _ => Some(remainder.strip_prefix('.').filter(|r| !r.is_empty())?),
    };

    Some(PathSegment { name, index, rest })
}
