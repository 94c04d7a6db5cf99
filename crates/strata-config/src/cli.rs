//! Command-line argument parsing for the terrain streaming demo.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Strata command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "strata", about = "Streaming height-field terrain demo")]
pub struct CliArgs {
    /// Seed for procedural height field generation.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Height field size in samples (square).
    #[arg(long)]
    pub size: Option<u32>,

    /// Samples per near tile edge.
    #[arg(long)]
    pub near_cell_size: Option<u32>,

    /// Tiles on each side of the near window center.
    #[arg(long)]
    pub near_half_extent: Option<u32>,

    /// Samples per far tile edge.
    #[arg(long)]
    pub far_cell_size: Option<u32>,

    /// Tiles on each side of the far window center.
    #[arg(long)]
    pub far_half_extent: Option<u32>,

    /// Number of frames to simulate.
    #[arg(long)]
    pub frames: Option<u32>,

    /// Focus speed in world units per second.
    #[arg(long)]
    pub speed: Option<f32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(seed) = args.seed {
            self.world.seed = seed;
        }
        if let Some(size) = args.size {
            self.world.width = size;
            self.world.height = size;
        }
        if let Some(cs) = args.near_cell_size {
            self.near_lod.cell_size = cs;
        }
        if let Some(he) = args.near_half_extent {
            self.near_lod.half_extent = he;
        }
        if let Some(cs) = args.far_cell_size {
            self.far_lod.cell_size = cs;
        }
        if let Some(he) = args.far_half_extent {
            self.far_lod.half_extent = he;
        }
        if let Some(frames) = args.frames {
            self.demo.frames = frames;
        }
        if let Some(speed) = args.speed {
            self.demo.speed = speed;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            size: Some(513),
            near_half_extent: Some(3),
            log_level: Some("debug".to_string()),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.world.width, 513);
        assert_eq!(config.world.height, 513);
        assert_eq!(config.near_lod.half_extent, 3);
        assert_eq!(config.debug.log_level, "debug");
        // Non-overridden fields retain defaults
        assert_eq!(config.near_lod.cell_size, 64);
        assert_eq!(config.far_lod.half_extent, 7);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::parse_from(["strata", "--frames", "10", "--far-cell-size", "16"]);
        assert_eq!(args.frames, Some(10));
        assert_eq!(args.far_cell_size, Some(16));
        assert!(args.seed.is_none());
    }
}
