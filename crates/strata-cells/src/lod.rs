//! Near/far pair of cell managers sharing one focus.
//!
//! The near manager streams full-resolution tiles close to the focus; the far
//! manager streams tiles of a down-sampled copy of the field out to a much
//! larger radius. [`DrawPlanes`] describes how a renderer splits the two
//! passes so the far terrain fades in where the near terrain ends.

use std::sync::Arc;

use glam::Vec3;
use strata_config::Config;
use strata_terrain::HeightField;
use tracing::info;

use crate::cell_manager::{
    CellManager, CellManagerConfig, LoadQueueReport, StreamingTolerances, WindowState,
};
use crate::error::CellManagerError;
use crate::tile::Tile;

/// Per-frame distances used to cull and blend the two LODs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawPlanes {
    /// Reach of the near terrain.
    pub mid_lod: f32,
    /// Reach of the far terrain.
    pub far: f32,
}

impl DrawPlanes {
    /// Far terrain closer than this fraction of `mid_lod` is clipped away.
    pub const FAR_NEAR_CLIP: f32 = 0.25;
    /// Near terrain fades out over `[NEAR_FADE_START, 1] * mid_lod`.
    pub const NEAR_FADE_START: f32 = 0.75;
    /// Far terrain fades out over `[FAR_FADE_START, 1] * far`.
    pub const FAR_FADE_START: f32 = 0.95;

    /// Planes for a viewer at `focus` standing over terrain at `ground_height`.
    ///
    /// Both reaches are just inside each window's guaranteed coverage, lifted
    /// by the viewer's altitude so a high camera still sees to the edge.
    pub fn compute(focus: Vec3, ground_height: f32, near: &CellManager, far: &CellManager) -> Self {
        let altitude = focus.y - ground_height;
        let near_reach = 0.5
            * near.scaled_cell_size().max_element()
            * near.half_extent().saturating_sub(1) as f32;
        let far_reach =
            far.scaled_cell_size().max_element() * far.half_extent().saturating_sub(1) as f32;
        Self {
            mid_lod: near_reach.hypot(altitude),
            far: far_reach.hypot(altitude),
        }
    }

    /// Near clip plane for the far pass.
    pub fn far_near_clip(&self) -> f32 {
        Self::FAR_NEAR_CLIP * self.mid_lod
    }

    /// `(start, end)` distances over which near terrain fades out.
    pub fn near_fade(&self) -> (f32, f32) {
        (Self::NEAR_FADE_START * self.mid_lod, self.mid_lod)
    }

    /// `(start, end)` distances over which far terrain fades out.
    pub fn far_fade(&self) -> (f32, f32) {
        (Self::FAR_FADE_START * self.far, self.far)
    }
}

/// What one [`TerrainLod::update`] did to each manager.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LodFrameReport {
    /// Anchors the near window queued this frame.
    pub near_queued: usize,
    /// Anchors the far window queued this frame.
    pub far_queued: usize,
    /// Near queue processing.
    pub near: LoadQueueReport,
    /// Far queue processing.
    pub far: LoadQueueReport,
}

impl LodFrameReport {
    /// Tiles built across both managers.
    pub fn realized(&self) -> usize {
        self.near.realized + self.far.realized
    }
}

/// Near and far terrain windows driven by the same focus.
pub struct TerrainLod {
    near: CellManager,
    far: CellManager,
}

impl TerrainLod {
    /// Build both managers; the far one gets `field` resampled to `far_rows` rows.
    pub fn new(
        field: Arc<HeightField>,
        near: CellManagerConfig,
        far: CellManagerConfig,
        far_rows: u32,
    ) -> Result<Self, CellManagerError> {
        let far_field = Arc::new(field.downsampled_to_rows(far_rows)?);
        info!(
            near_cell = near.cell_size,
            near_tiles = (2 * near.half_extent).pow(2),
            far_cell = far.cell_size,
            far_tiles = (2 * far.half_extent).pow(2),
            far_width = far_field.width(),
            far_height = far_field.height(),
            "Configured terrain LODs"
        );
        Ok(Self {
            near: CellManager::new(field, near)?,
            far: CellManager::new(far_field, far)?,
        })
    }

    /// Build both managers from the `near_lod`, `far_lod` and `streaming` sections.
    pub fn from_config(field: Arc<HeightField>, config: &Config) -> Result<Self, CellManagerError> {
        let tolerances = StreamingTolerances {
            duplicate: config.streaming.duplicate_tolerance,
            distant_margin: config.streaming.distant_margin,
        };
        let near = CellManagerConfig {
            cell_size: config.near_lod.cell_size,
            half_extent: config.near_lod.half_extent,
            tolerances,
        };
        let far = CellManagerConfig {
            cell_size: config.far_lod.cell_size,
            half_extent: config.far_lod.half_extent,
            tolerances,
        };
        Self::new(field, near, far, config.far_lod.resolution)
    }

    /// Full-resolution manager.
    pub fn near(&self) -> &CellManager {
        &self.near
    }

    /// Down-sampled manager.
    pub fn far(&self) -> &CellManager {
        &self.far
    }

    /// Build both windows around `focus`, far first.
    pub fn initialize(&mut self, focus: Vec3) {
        self.far.initialize_for_position(focus);
        self.near.initialize_for_position(focus);
    }

    /// Run one frame of streaming on both windows.
    pub fn update(&mut self, focus: Vec3) -> LodFrameReport {
        let near_queued = self.near.optimize_for_position(focus);
        let far_queued = self.far.optimize_for_position(focus);
        LodFrameReport {
            near_queued,
            far_queued,
            near: self.near.process_load_queue(),
            far: self.far.process_load_queue(),
        }
    }

    /// Both windows hold exactly their lattices.
    pub fn is_stable(&self) -> bool {
        self.near.state() == WindowState::Stable && self.far.state() == WindowState::Stable
    }

    /// Terrain height under `focus`, sampled from the full-resolution field.
    pub fn ground_height(&self, focus: Vec3) -> f32 {
        self.near.field().sample_height(focus)
    }

    /// Cull and fade distances for a viewer at `focus`.
    pub fn draw_planes(&self, focus: Vec3) -> DrawPlanes {
        DrawPlanes::compute(focus, self.ground_height(focus), &self.near, &self.far)
    }

    /// Near tiles to draw this frame.
    pub fn near_cells(&self, focus: Vec3) -> impl Iterator<Item = &Tile> + Clone + '_ {
        let planes = self.draw_planes(focus);
        self.near.draw_active_cells(focus, planes.mid_lod)
    }

    /// Far tiles to draw this frame.
    pub fn far_cells(&self, focus: Vec3) -> impl Iterator<Item = &Tile> + Clone + '_ {
        let planes = self.draw_planes(focus);
        self.far.draw_active_cells(focus, planes.far)
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;

    fn field() -> Arc<HeightField> {
        Arc::new(HeightField::flat(257, 257, 0, Vec3::new(256.0, 100.0, 256.0)).unwrap())
    }

    /// Near: 16-unit tiles, 4x4. Far: 65 rows (4-unit spacing), 32-unit tiles, 4x4.
    fn lod() -> TerrainLod {
        TerrainLod::new(
            field(),
            CellManagerConfig::new(16, 2),
            CellManagerConfig::new(8, 2),
            65,
        )
        .unwrap()
    }

    #[test]
    fn test_far_manager_uses_downsampled_field() {
        let lod = lod();
        assert_eq!(lod.far().field().height(), 65);
        assert_eq!(lod.far().field().dimensions(), lod.near().field().dimensions());
        assert_eq!(lod.near().scaled_cell_size(), Vec2::splat(16.0));
        assert_eq!(lod.far().scaled_cell_size(), Vec2::splat(32.0));
    }

    #[test]
    fn test_initialize_fills_both_windows() {
        let mut lod = lod();
        lod.initialize(Vec3::new(128.0, 5.0, 128.0));
        assert!(lod.is_stable());
        assert_eq!(lod.near().stats().live, 16);
        assert_eq!(lod.far().stats().live, 16);
    }

    #[test]
    fn test_update_streams_both_windows() {
        let mut lod = lod();
        lod.initialize(Vec3::new(136.0, 5.0, 136.0));
        lod.update(Vec3::new(136.0, 5.0, 136.0));

        let report = lod.update(Vec3::new(232.0, 5.0, 136.0));
        assert!(report.near_queued > 0, "near window should drift");
        assert!(report.far_queued > 0, "far window should drift");
        assert_eq!(report.realized(), report.near_queued + report.far_queued);
        assert!(lod.is_stable());
    }

    #[test]
    fn test_draw_planes_follow_window_reach_and_altitude() {
        let lod = lod();
        let planes = lod.draw_planes(Vec3::new(100.0, 6.0, 100.0));
        // Flat ground at 0: near reach 0.5 * 16 * 1 = 8, far reach 32 * 1 = 32.
        assert!((planes.mid_lod - 10.0).abs() < 1e-4, "hypot(8, 6) = 10");
        assert!((planes.far - 32.0f32.hypot(6.0)).abs() < 1e-4);
        assert!((planes.far_near_clip() - 2.5).abs() < 1e-4);
        let (fade_start, fade_end) = planes.near_fade();
        assert!((fade_start - 7.5).abs() < 1e-4 && (fade_end - 10.0).abs() < 1e-4);
        let (start, end) = planes.far_fade();
        assert!(start < end && (start / end - 0.95).abs() < 1e-5);
    }

    #[test]
    fn test_near_cells_are_subset_of_live_tiles() {
        let mut lod = lod();
        let focus = Vec3::new(136.0, 2.0, 136.0);
        lod.initialize(focus);
        let near: Vec<&Tile> = lod.near_cells(focus).collect();
        assert!(!near.is_empty(), "tile under the focus is always drawn");
        assert!(near.len() < lod.near().pool_size(), "far corners are culled");
        assert!(near.iter().all(|t| t.is_live()));
        let far = lod.far_cells(focus).count();
        assert!(far > 0 && far < lod.far().pool_size(), "far window is culled by its own reach");
    }

    #[test]
    fn test_from_config_rejects_zero_cell_size() {
        let mut config = Config::default();
        config.near_lod.cell_size = 0;
        let field = Arc::new(HeightField::flat(129, 129, 0, Vec3::new(128.0, 10.0, 128.0)).unwrap());
        assert_eq!(
            TerrainLod::from_config(field, &config).err(),
            Some(CellManagerError::ZeroCellSize)
        );
    }
}
