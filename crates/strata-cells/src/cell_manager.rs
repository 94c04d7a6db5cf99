//! Fixed-capacity sliding window of terrain tiles around a moving focus.
//!
//! A [`CellManager`] owns `N x N` tile slots (`N = 2 * half_extent`) and keeps
//! them filled with the tiles of the window nearest the focus. Each frame the
//! driver calls [`CellManager::optimize_for_position`], which moves the window
//! and queues the anchors that became newly needed, and then
//! [`CellManager::process_load_queue`], which frees tiles that left the window
//! and builds queued tiles into free slots. Building is therefore capped at
//! the pool size per call; a large jump drains over several frames.
//!
//! Window origins, anchors and cell footprints are world-space `(x, z)` pairs
//! stored as [`Vec2`]; anchors always lie on the lattice of multiples of
//! [`CellManager::scaled_cell_size`].

use std::collections::VecDeque;
use std::f32::consts::FRAC_1_SQRT_2;
use std::sync::Arc;

use glam::{IVec2, UVec2, Vec2, Vec3};
use strata_mesh::build_terrain_mesh_into;
use strata_terrain::HeightField;
use tracing::{debug, info, trace, warn};

use crate::error::CellManagerError;
use crate::tile::{Tile, TileState};

/// Default duplicate tolerance and out-of-range margin, as fractions of a cell.
pub const DEFAULT_TOLERANCE: f32 = 0.125;

/// Floating-point slack used when comparing anchors.
///
/// Both values are fractions of the scaled cell size. They absorb round-off in
/// anchors computed from different window origins; very small or very large
/// world scales may need them retuned.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StreamingTolerances {
    /// Anchors closer than this fraction of the smaller cell dimension are the same tile.
    pub duplicate: f32,
    /// Slack around the window before a tile counts as out of range.
    pub distant_margin: f32,
}

impl Default for StreamingTolerances {
    fn default() -> Self {
        Self {
            duplicate: DEFAULT_TOLERANCE,
            distant_margin: DEFAULT_TOLERANCE,
        }
    }
}

/// Construction parameters for a [`CellManager`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellManagerConfig {
    /// Height field quads along each tile edge.
    pub cell_size: u32,
    /// Tiles on each side of the window center.
    pub half_extent: u32,
    /// Anchor comparison slack.
    pub tolerances: StreamingTolerances,
}

impl CellManagerConfig {
    /// Config with default tolerances.
    pub fn new(cell_size: u32, half_extent: u32) -> Self {
        Self {
            cell_size,
            half_extent,
            tolerances: StreamingTolerances::default(),
        }
    }
}

/// Lifecycle of the window as a whole.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WindowState {
    /// [`CellManager::initialize_for_position`] has not run yet.
    Uninitialized,
    /// Every window tile is resident and nothing is queued.
    Stable,
    /// The window moved and queued anchors are still waiting to be built.
    Drifting,
}

/// Outcome of one [`CellManager::process_load_queue`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadQueueReport {
    /// Live tiles freed because they left the window.
    pub released: usize,
    /// Queued anchors built into tiles.
    pub realized: usize,
    /// Queued anchors dropped because the window moved past them.
    pub dropped_out_of_range: usize,
    /// Queued anchors dropped because a resident tile already covers them.
    pub dropped_duplicate: usize,
    /// Anchors still queued afterwards.
    pub remaining: usize,
}

/// Snapshot of pool occupancy and mesh memory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Tiles ready to draw.
    pub live: usize,
    /// Tiles mid-build.
    pub loading: usize,
    /// Free slots.
    pub empty: usize,
    /// Queued anchors.
    pub pending: usize,
    /// Vertices across live tiles.
    pub vertices: usize,
    /// Indices across live tiles.
    pub indices: usize,
    /// Vertex and index bytes across live tiles.
    pub mesh_bytes: usize,
}

/// Streams terrain tiles of one height field around a focus point.
pub struct CellManager {
    field: Arc<HeightField>,
    cell_size: u32,
    half_extent: u32,
    tolerances: StreamingTolerances,
    /// World-space footprint of one tile.
    scaled_cell_size: Vec2,
    /// Anchor of the window's lowest (x, z) tile.
    window_origin: Vec2,
    initialized: bool,
    pool: Vec<Tile>,
    pending: VecDeque<Vec2>,
}

impl CellManager {
    /// Create a manager with an `N x N` pool of empty tiles.
    pub fn new(field: Arc<HeightField>, config: CellManagerConfig) -> Result<Self, CellManagerError> {
        if config.cell_size == 0 {
            return Err(CellManagerError::ZeroCellSize);
        }
        if config.half_extent == 0 {
            return Err(CellManagerError::ZeroHalfExtent);
        }
        if config.cell_size > field.width() - 1 || config.cell_size > field.height() - 1 {
            return Err(CellManagerError::CellLargerThanField {
                cell_size: config.cell_size,
                width: field.width(),
                height: field.height(),
            });
        }
        for (name, value) in [
            ("duplicate", config.tolerances.duplicate),
            ("distant margin", config.tolerances.distant_margin),
        ] {
            if value <= 0.0 || value >= 0.5 {
                return Err(CellManagerError::InvalidTolerance { name, value });
            }
        }

        let dimensions = field.dimensions();
        let scaled_cell_size = Vec2::new(dimensions.x, dimensions.z) * config.cell_size as f32
            / field.quad_extent();
        let side = 2 * config.half_extent as usize;

        Ok(Self {
            field,
            cell_size: config.cell_size,
            half_extent: config.half_extent,
            tolerances: config.tolerances,
            scaled_cell_size,
            window_origin: Vec2::ZERO,
            initialized: false,
            pool: vec![Tile::new(); side * side],
            pending: VecDeque::new(),
        })
    }

    /// The height field tiles are built from.
    pub fn field(&self) -> &Arc<HeightField> {
        &self.field
    }

    /// Height field quads along each tile edge.
    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// Tiles on each side of the window center.
    pub fn half_extent(&self) -> u32 {
        self.half_extent
    }

    /// Tiles along each window edge (`N`).
    pub fn tiles_per_side(&self) -> u32 {
        2 * self.half_extent
    }

    /// Number of tile slots (`N * N`).
    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    /// World-space footprint of one tile.
    pub fn scaled_cell_size(&self) -> Vec2 {
        self.scaled_cell_size
    }

    /// Anchor of the window's lowest tile.
    pub fn window_origin(&self) -> Vec2 {
        self.window_origin
    }

    /// Current anchor comparison slack.
    pub fn tolerances(&self) -> StreamingTolerances {
        self.tolerances
    }

    /// Where the window is in its initialize / drift / settle cycle.
    pub fn state(&self) -> WindowState {
        if !self.initialized {
            WindowState::Uninitialized
        } else if self.pending.is_empty() {
            WindowState::Stable
        } else {
            WindowState::Drifting
        }
    }

    /// Number of queued anchors.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Queued anchors, front first.
    pub fn pending(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.pending.iter().copied()
    }

    /// Every slot of the pool, in slot order.
    pub fn tiles(&self) -> &[Tile] {
        &self.pool
    }

    /// Tiles that are ready to draw.
    pub fn live_tiles(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.pool.iter().filter(|tile| tile.is_live())
    }

    /// The `N x N` anchors the window should hold, column by column.
    pub fn window_anchors(&self) -> Vec<Vec2> {
        let side = self.tiles_per_side();
        let mut anchors = Vec::with_capacity(self.pool.len());
        for i in 0..side {
            for j in 0..side {
                anchors.push(self.lattice_anchor(self.window_origin, i, j));
            }
        }
        anchors
    }

    /// Whether a tile at `anchor` belongs to the current window (within the margin).
    pub fn in_window(&self, anchor: Vec2) -> bool {
        !self.is_distant(anchor)
    }

    /// Center the window on the lattice point nearest `focus` and build every tile.
    ///
    /// Blocks for `N * N` mesh builds; meant to run once before the frame loop.
    pub fn initialize_for_position(&mut self, focus: Vec3) {
        let s = self.scaled_cell_size;
        let mid = (horizontal(focus) / s).round();
        self.window_origin = (mid - Vec2::splat(self.half_extent as f32)) * s;
        self.pending.clear();

        let side = self.tiles_per_side();
        for i in 0..side {
            for j in 0..side {
                let anchor = self.lattice_anchor(self.window_origin, i, j);
                let slot = (i * side + j) as usize;
                Self::realize(&self.field, self.cell_size, &mut self.pool[slot], anchor);
            }
        }
        self.initialized = true;

        info!(
            tiles = self.pool.len(),
            origin_x = self.window_origin.x,
            origin_z = self.window_origin.y,
            "Initialized terrain window"
        );
    }

    /// Move the window to keep covering `focus` and queue the tiles it newly needs.
    ///
    /// The window only moves when its origin leaves the one-cell band
    /// `[min_origin, min_origin + cell]` that still covers `focus`, which keeps
    /// a focus oscillating near a tile edge from thrashing. No mesh is built
    /// here. Returns the number of anchors queued.
    pub fn optimize_for_position(&mut self, focus: Vec3) -> usize {
        if !self.initialized {
            warn!("optimize_for_position called before initialize_for_position; ignoring");
            return 0;
        }

        let s = self.scaled_cell_size;
        let min_origin =
            ((horizontal(focus) / s).ceil() - Vec2::splat(self.half_extent as f32)) * s;
        let max_origin = min_origin + s;
        let new_origin = self.window_origin.clamp(min_origin, max_origin);
        if new_origin == self.window_origin {
            return 0;
        }

        // Queue every tile of the new window the old window did not hold. For a
        // one-cell move this is the leading column and/or row, corners once.
        let shift = ((new_origin - self.window_origin) / s).round().as_ivec2();
        let side = self.tiles_per_side();
        let old_range = IVec2::splat(side as i32);
        let mut queued = 0;
        for i in 0..side {
            for j in 0..side {
                let old_index = IVec2::new(i as i32, j as i32) + shift;
                let held = old_index.cmpge(IVec2::ZERO).all() && old_index.cmplt(old_range).all();
                if !held {
                    self.pending.push_back(self.lattice_anchor(new_origin, i, j));
                    queued += 1;
                }
            }
        }

        debug!(
            shift_x = shift.x,
            shift_z = shift.y,
            queued,
            pending = self.pending.len(),
            "Terrain window drifted"
        );
        self.window_origin = new_origin;
        queued
    }

    /// Free tiles outside the window, then build queued anchors into free slots.
    ///
    /// Queued anchors that left the window or are already resident are
    /// dropped without using a slot. At most one build happens per slot, so
    /// the work per call is bounded by the pool size.
    pub fn process_load_queue(&mut self) -> LoadQueueReport {
        let mut report = LoadQueueReport::default();

        for slot in 0..self.pool.len() {
            if self.pool[slot].is_live() && self.is_distant(self.pool[slot].anchor()) {
                self.pool[slot].release();
                report.released += 1;
            }
        }

        let mut slot = 0;
        while let Some(&anchor) = self.pending.front() {
            if self.is_distant(anchor) {
                self.pending.pop_front();
                report.dropped_out_of_range += 1;
                trace!(x = anchor.x, z = anchor.y, "Dropped out-of-range tile request");
                continue;
            }
            if self.is_duplicate(anchor) {
                self.pending.pop_front();
                report.dropped_duplicate += 1;
                trace!(x = anchor.x, z = anchor.y, "Dropped duplicate tile request");
                continue;
            }
            let Some(offset) = self.pool[slot..].iter().position(Tile::is_free) else {
                break;
            };
            slot += offset;
            self.pending.pop_front();
            Self::realize(&self.field, self.cell_size, &mut self.pool[slot], anchor);
            report.realized += 1;
            slot += 1;
        }
        report.remaining = self.pending.len();

        if report != LoadQueueReport::default() {
            debug!(
                released = report.released,
                realized = report.realized,
                dropped = report.dropped_out_of_range + report.dropped_duplicate,
                remaining = report.remaining,
                "Processed tile load queue"
            );
        }
        report
    }

    /// Live tiles whose center lies within `draw_distance` of `focus`, plus half a cell diagonal.
    ///
    /// The returned iterator can be cloned to walk the same tiles again.
    pub fn draw_active_cells(
        &self,
        focus: Vec3,
        draw_distance: f32,
    ) -> impl Iterator<Item = &Tile> + Clone + '_ {
        let s = self.scaled_cell_size;
        let threshold = draw_distance + s.max_element() * FRAC_1_SQRT_2;
        let focus = horizontal(focus);
        self.pool
            .iter()
            .filter(move |tile| tile.is_live() && focus.distance(tile.center(s)) < threshold)
    }

    /// Queue `anchor` for building, subject to the usual checks when it is popped.
    pub fn request_anchor(&mut self, anchor: Vec2) {
        self.pending.push_back(anchor);
    }

    /// Occupancy and memory summary of the pool.
    pub fn stats(&self) -> PoolStats {
        let mut stats = PoolStats {
            pending: self.pending.len(),
            ..Default::default()
        };
        for tile in &self.pool {
            match tile.state() {
                TileState::Empty => stats.empty += 1,
                TileState::Loading => stats.loading += 1,
                TileState::Live => {
                    stats.live += 1;
                    stats.vertices += tile.mesh().vertex_count();
                    stats.indices += tile.mesh().indices.len();
                    stats.mesh_bytes += tile.mesh().byte_size();
                }
            }
        }
        stats
    }

    fn lattice_anchor(&self, origin: Vec2, i: u32, j: u32) -> Vec2 {
        origin + Vec2::new(i as f32, j as f32) * self.scaled_cell_size
    }

    /// Outside the window rectangle grown by the distant margin on every side.
    fn is_distant(&self, anchor: Vec2) -> bool {
        let s = self.scaled_cell_size;
        let margin = self.tolerances.distant_margin;
        let origin = self.window_origin;
        let far_edge = origin + s * (self.tiles_per_side() as f32 + margin);
        anchor.x < origin.x - s.x * margin
            || anchor.y < origin.y - s.y * margin
            || anchor.x + s.x > far_edge.x
            || anchor.y + s.y > far_edge.y
    }

    /// A live or loading tile already sits at `anchor`.
    fn is_duplicate(&self, anchor: Vec2) -> bool {
        let tolerance = self.scaled_cell_size.min_element() * self.tolerances.duplicate;
        self.pool
            .iter()
            .any(|tile| !tile.is_free() && tile.anchor().distance(anchor) < tolerance)
    }

    /// Rebuild `tile` for `anchor`; it is `Loading` for exactly the duration of the build.
    fn realize(field: &HeightField, cell_size: u32, tile: &mut Tile, anchor: Vec2) {
        let mesh = tile.begin_loading(anchor);
        match tile_sample_range(field, cell_size, anchor) {
            Some((start, end)) => {
                build_terrain_mesh_into(mesh, field, start, end, field.sample_spacing());
            }
            None => mesh.clear(),
        }
        tile.finish_loading();
        trace!(
            x = anchor.x,
            z = anchor.y,
            vertices = tile.mesh().vertex_count(),
            "Realized tile"
        );
    }
}

/// Inclusive sample rectangle for the tile anchored at `anchor`, clipped to the field.
///
/// Returns `None` when the tile lies wholly outside the field.
pub fn tile_sample_range(field: &HeightField, cell_size: u32, anchor: Vec2) -> Option<(UVec2, UVec2)> {
    let index = field.world_to_sample(anchor).round();
    if index.x < 0.0 || index.y < 0.0 {
        return None;
    }
    let start = index.as_uvec2();
    let last = field.size() - UVec2::ONE;
    if start.x > last.x || start.y > last.y {
        return None;
    }
    let end = (start + UVec2::splat(cell_size)).min(last);
    Some((start, end))
}

fn horizontal(position: Vec3) -> Vec2 {
    Vec2::new(position.x, position.z)
}
