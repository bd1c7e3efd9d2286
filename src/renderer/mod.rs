pub mod batch;
pub mod lights;
pub mod material;
pub mod pipeline;
pub mod renderer;
pub mod shapes;
pub mod texture_slots;
pub mod uniform_layout;
pub mod uniforms;
pub mod vertex;

pub use batch::{BatchBuffer, WriteResult};
pub use lights::{DirectionalLight, LightRig, PointLight, SpotLight};
pub use material::{Material, MaterialMaps, TextureRegion};
pub use pipeline::{PassKind, PassPipeline, StagedDraw};
pub use renderer::BatchRenderer;
pub use shapes::ShapeData;
pub use texture_slots::{SlotResolution, TextureSlotTable};
pub use uniform_layout::{ResolvedField, UniformKind, UniformLayout};
pub use uniforms::{shared_frame_layout, SharedUniforms};
pub use vertex::{VertexRecord, NO_TEXTURE_SLOT};

/// Slot 0 is the built-in white texture; batch textures start above it.
pub const RESERVED_TEXTURE_SLOTS: u32 = 1;

pub const MAX_DIRECTIONAL_LIGHTS: u32 = 5;
pub const MAX_POINT_LIGHTS: u32 = 32;
pub const MAX_SPOT_LIGHTS: u32 = 32;
