//! Configuration structs with sensible defaults and RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level terrain streaming configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Height field extent and procedural generation settings.
    pub world: WorldConfig,
    /// High level-of-detail tiles close to the focus.
    pub near_lod: LodConfig,
    /// Low level-of-detail tiles for distant terrain.
    pub far_lod: FarLodConfig,
    /// Tolerances used by the cell managers.
    pub streaming: StreamingConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
    /// Headless demo driver settings.
    pub demo: DemoConfig,
}

/// World and height field configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// Vertical world extent: a sample at `u16::MAX` sits at this height.
    pub height_scale: f32,
    /// World units between neighboring height field samples.
    pub horizontal_scale: f32,
    /// Number of height field columns.
    pub width: u32,
    /// Number of height field rows.
    pub height: u32,
    /// Seed for procedural generation.
    pub seed: u64,
    /// fBm octave count for procedural generation.
    pub octaves: u32,
    /// Frequency of the broadest fBm octave, in cycles per sample.
    pub base_frequency: f64,
}

/// Level-of-detail configuration for one cell manager.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LodConfig {
    /// Height field samples (quads) along each edge of a tile.
    pub cell_size: u32,
    /// Tiles on each side of the window center; the window is `2 * half_extent` tiles wide.
    pub half_extent: u32,
}

/// Far level-of-detail configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FarLodConfig {
    /// Height field samples (quads) along each edge of a tile.
    pub cell_size: u32,
    /// Tiles on each side of the window center.
    pub half_extent: u32,
    /// Row count of the down-sampled height field.
    pub resolution: u32,
}

/// Cell manager tolerances, as fractions of a scaled cell dimension.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamingConfig {
    /// Two anchors closer than this fraction of the smaller cell dimension are duplicates.
    pub duplicate_tolerance: f32,
    /// Slack added around the window before a tile counts as out of range.
    pub distant_margin: f32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

/// Headless demo configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DemoConfig {
    /// Number of simulated frames.
    pub frames: u32,
    /// Focus speed in world units per second.
    pub speed: f32,
    /// Direction of travel, in degrees from +x toward +z.
    pub heading_degrees: f32,
    /// Height of the focus above the ground.
    pub eye_height: f32,
}

// --- Default implementations ---

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            height_scale: 1640.0,
            horizontal_scale: 1.0,
            width: 1025,
            height: 1025,
            seed: 0,
            octaves: 6,
            base_frequency: 0.004,
        }
    }
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            cell_size: 64,
            half_extent: 7,
        }
    }
}

impl Default for FarLodConfig {
    fn default() -> Self {
        Self {
            cell_size: 32,
            half_extent: 7,
            resolution: 256,
        }
    }
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            duplicate_tolerance: 0.125,
            distant_margin: 0.125,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            frames: 600,
            speed: 40.0,
            heading_degrees: 30.0,
            eye_height: 2.0,
        }
    }
}

// --- Validation ---

impl Config {
    /// Check the settings that the terrain components take as construction preconditions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world.width < 2 || self.world.height < 2 {
            return Err(invalid("world", "height field must be at least 2x2 samples"));
        }
        if self.world.horizontal_scale <= 0.0 {
            return Err(invalid("world.horizontal_scale", "must be positive"));
        }
        if self.near_lod.cell_size == 0 || self.far_lod.cell_size == 0 {
            return Err(invalid("cell_size", "must be non-zero"));
        }
        if self.near_lod.half_extent == 0 || self.far_lod.half_extent == 0 {
            return Err(invalid("half_extent", "must be non-zero"));
        }
        if self.far_lod.resolution < 2 {
            return Err(invalid("far_lod.resolution", "must be at least 2 rows"));
        }
        for (field, value) in [
            ("streaming.duplicate_tolerance", self.streaming.duplicate_tolerance),
            ("streaming.distant_margin", self.streaming.distant_margin),
        ] {
            if value <= 0.0 || value >= 0.5 {
                return Err(invalid(field, "must lie strictly between 0 and 0.5"));
            }
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &'static str) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
