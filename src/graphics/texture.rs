/// Opaque backend handle for a texture. Two textures are the same binding
/// candidate iff their ids are equal; content is never inspected.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TextureId(pub u64);

pub trait Texture: Clone {
    fn id(&self) -> TextureId;

    /// Binds the texture to the given sampler slot.
    fn bind(&self, slot: u32);
}
