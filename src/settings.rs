use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Renderer capacity and pipeline configuration. Values are fixed for the
/// renderer's lifetime; the staging buffers and slot table are sized from
/// them once at init and never reallocated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSettings {
    #[serde(default = "RenderSettings::default_max_quads")]
    pub max_quads: u32,
    #[serde(default = "RenderSettings::default_max_texture_slots")]
    pub max_texture_slots: u32,
    #[serde(default = "RenderSettings::default_shadow_map_resolution")]
    pub shadow_map_resolution: u32,
    #[serde(default)]
    pub post_processing: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            max_quads: Self::default_max_quads(),
            max_texture_slots: Self::default_max_texture_slots(),
            shadow_map_resolution: Self::default_shadow_map_resolution(),
            post_processing: false,
        }
    }
}

impl RenderSettings {
    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Self {
        use std::fs;

        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<RenderSettings>(&contents) {
                Ok(settings) => {
                    info!("Loaded render settings from {:?}", path);
                    settings.validate()
                }
                Err(err) => {
                    warn!(
                        "Failed to parse {:?} ({}). Falling back to default render settings.",
                        path, err
                    );
                    RenderSettings::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "Render settings file {:?} not found. Using default settings.",
                    path
                );
                RenderSettings::default()
            }
            Err(err) => {
                warn!(
                    "Failed to read {:?} ({}). Falling back to default render settings.",
                    path, err
                );
                RenderSettings::default()
            }
        }
    }

    pub fn validate(mut self) -> Self {
        if self.max_quads == 0 {
            warn!("max_quads must be greater than zero. Using default value.");
            self.max_quads = Self::default_max_quads();
        }

        // A cuboid needs 24 vertices and 36 indices; fewer than 6 quads
        // cannot stage one shape and would make every submission fatal.
        if self.max_quads < 6 {
            warn!(
                "max_quads = {} is too small to stage a cuboid. Using 6 instead.",
                self.max_quads
            );
            self.max_quads = 6;
        }

        // Slot 0 is reserved for the white texture; at least one more slot
        // is needed for caller textures.
        if self.max_texture_slots < crate::renderer::RESERVED_TEXTURE_SLOTS + 1 {
            warn!(
                "max_texture_slots = {} leaves no usable slots. Using default value.",
                self.max_texture_slots
            );
            self.max_texture_slots = Self::default_max_texture_slots();
        }

        if self.shadow_map_resolution == 0 {
            warn!("shadow_map_resolution must be greater than zero. Using default value.");
            self.shadow_map_resolution = Self::default_shadow_map_resolution();
        }

        self
    }

    pub fn max_vertices(&self) -> u32 {
        self.max_quads * 4
    }

    pub fn max_indices(&self) -> u32 {
        self.max_quads * 6
    }

    const fn default_max_quads() -> u32 {
        5000
    }

    const fn default_max_texture_slots() -> u32 {
        32
    }

    const fn default_shadow_map_resolution() -> u32 {
        1024
    }
}
