//! Batched multi-pass 3D renderer core.
//!
//! Shapes submitted between `begin_scene` and `end_scene` accumulate into
//! one vertex/index staging buffer and are drawn in a single pipeline run
//! per flush: shadow maps first, then lit geometry into an offscreen
//! target, an overlay redraw, the optional skybox, and finally the screen
//! via a post-process shader or a plain blit.
//!
//! The GPU is reached exclusively through the [`graphics::GraphicsContext`]
//! trait, so the whole core runs (and is tested) without a device.

pub mod error;
pub mod graphics;
pub mod renderer;
pub mod settings;

pub use error::RendererError;
pub use renderer::BatchRenderer;
pub use settings::RenderSettings;
