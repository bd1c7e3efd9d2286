use thiserror::Error;

/// Fatal conditions. Capacity overflow and texture-slot exhaustion never
/// appear here; those are handled inside the renderer by flushing.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("framebuffer '{label}' is incomplete")]
    IncompleteFramebuffer { label: &'static str },

    #[error("shader creation failed: {reason}")]
    ShaderCreation { reason: String },

    #[error(
        "shape with {vertices} vertices / {indices} indices cannot fit in an empty batch \
         (capacity {max_vertices} vertices / {max_indices} indices)"
    )]
    ShapeTooLarge {
        vertices: u32,
        indices: u32,
        max_vertices: u32,
        max_indices: u32,
    },

    #[error("{kind} light limit reached (max {max})")]
    TooManyLights { kind: &'static str, max: u32 },
}
