//! Headless driver that streams terrain tiles around a focus walking across a
//! procedural height field.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p strata-demo` for the default walk.
//! Run with `cargo run -p strata-demo -- --frames 3000 --speed 120` for a longer, faster one.

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use glam::{Vec2, Vec3};
use strata_cells::TerrainLod;
use strata_config::{CliArgs, Config};
use strata_terrain::{HeightmapParams, generate_height_field};
use tracing::{debug, info};

/// Simulated frame time.
const FRAME_SECONDS: f32 = 1.0 / 60.0;

/// Frames between progress summaries.
const REPORT_INTERVAL: u32 = 60;

/// A focus walking in a straight line, bouncing off the field edges.
struct Walker {
    position: Vec2,
    direction: Vec2,
    speed: f32,
    min: Vec2,
    max: Vec2,
}

impl Walker {
    fn new(start: Vec2, heading_degrees: f32, speed: f32, min: Vec2, max: Vec2) -> Self {
        let heading = heading_degrees.to_radians();
        Self {
            position: start,
            direction: Vec2::new(heading.cos(), heading.sin()),
            speed,
            min,
            max,
        }
    }

    fn step(&mut self, dt: f32) -> Vec2 {
        self.position += self.direction * self.speed * dt;
        for axis in 0..2 {
            if self.position[axis] < self.min[axis] || self.position[axis] > self.max[axis] {
                self.direction[axis] = -self.direction[axis];
                self.position[axis] = self.position[axis].clamp(self.min[axis], self.max[axis]);
            }
        }
        self.position
    }
}

/// Lift a ground-plane position to the viewer's eye height above the terrain.
fn eye_position(lod: &TerrainLod, xz: Vec2, eye_height: f32) -> Vec3 {
    let ground = Vec3::new(xz.x, 0.0, xz.y);
    Vec3::new(xz.x, lod.ground_height(ground) + eye_height, xz.y)
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args.config.clone().unwrap_or_else(|| {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("strata")
    });

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);
    config.validate()?;

    let log_dir = config_dir.join("logs");
    strata_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    let world = &config.world;
    let dimensions = Vec3::new(
        (world.width - 1) as f32 * world.horizontal_scale,
        world.height_scale,
        (world.height - 1) as f32 * world.horizontal_scale,
    );
    let params = HeightmapParams {
        seed: world.seed,
        octaves: world.octaves,
        base_frequency: world.base_frequency,
        ..Default::default()
    };

    let started = Instant::now();
    let field = Arc::new(generate_height_field(params, world.width, world.height, dimensions)?);
    info!(
        "Generated {}x{} height field (seed {}) in {:.1?}",
        world.width,
        world.height,
        world.seed,
        started.elapsed()
    );

    let mut lod = TerrainLod::from_config(field, &config)?;

    // Keep the walk half a near window away from the field edges.
    let margin = lod.near().scaled_cell_size() * lod.near().half_extent() as f32;
    let extent = Vec2::new(dimensions.x, dimensions.z);
    let mut walker = Walker::new(
        extent * 0.5,
        config.demo.heading_degrees,
        config.demo.speed,
        margin.min(extent * 0.5),
        (extent - margin).max(extent * 0.5),
    );

    let mut focus = eye_position(&lod, walker.position, config.demo.eye_height);
    let started = Instant::now();
    lod.initialize(focus);
    info!("Initialized terrain windows in {:.1?}", started.elapsed());

    let mut realized = 0;
    let mut busiest_frame = 0;
    let started = Instant::now();
    for frame in 1..=config.demo.frames {
        focus = eye_position(&lod, walker.step(FRAME_SECONDS), config.demo.eye_height);
        let report = lod.update(focus);
        realized += report.realized();
        busiest_frame = busiest_frame.max(report.realized());

        let near_drawn = lod.near_cells(focus).count();
        let far_drawn = lod.far_cells(focus).count();
        if report.realized() > 0 {
            debug!(
                "Frame {frame}: built {} near / {} far tiles, drawing {near_drawn} near / {far_drawn} far",
                report.near.realized, report.far.realized
            );
        }

        if frame % REPORT_INTERVAL == 0 {
            let near = lod.near().stats();
            let far = lod.far().stats();
            let planes = lod.draw_planes(focus);
            info!(
                "Frame {frame}: focus ({:.1}, {:.1}, {:.1}), drawing {near_drawn}/{} near and {far_drawn}/{} far tiles, mid LOD {:.1}, far plane {:.1}",
                focus.x,
                focus.y,
                focus.z,
                near.live,
                far.live,
                planes.mid_lod,
                planes.far
            );
            info!(
                "Frame {frame}: {} KiB near meshes, {} KiB far meshes, {} queued",
                near.mesh_bytes / 1024,
                far.mesh_bytes / 1024,
                near.pending + far.pending
            );
        }
    }

    info!(
        "Streamed {} frames in {:.1?}: {realized} tiles built, at most {busiest_frame} in one frame, windows {}",
        config.demo.frames,
        started.elapsed(),
        if lod.is_stable() { "stable" } else { "drifting" }
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walker_moves_at_speed_along_heading() {
        let mut walker = Walker::new(Vec2::splat(50.0), 0.0, 60.0, Vec2::ZERO, Vec2::splat(100.0));
        let p = walker.step(0.5);
        assert!((p - Vec2::new(80.0, 50.0)).length() < 1e-4, "got {p}");
    }

    #[test]
    fn test_walker_bounces_off_bounds() {
        let mut walker = Walker::new(Vec2::splat(90.0), 0.0, 40.0, Vec2::ZERO, Vec2::splat(100.0));
        let p = walker.step(0.5);
        assert_eq!(p.x, 100.0, "clamped to the edge");
        assert!(walker.direction.x < 0.0, "heading reflected");
        let p = walker.step(0.5);
        assert!(p.x < 100.0);
    }
}
