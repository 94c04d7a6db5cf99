//! A single pool slot: a terrain mesh, its world-space anchor, and its lifecycle state.

use glam::Vec2;
use strata_mesh::TerrainMesh;

/// Lifecycle of a tile slot.
///
/// `Loading` only exists while the mesh is being rebuilt; it keeps a
/// half-built mesh from ever being handed to the renderer and marks the slot
/// as taken while the build is in flight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TileState {
    /// No drawable content; the slot may be reused.
    #[default]
    Empty,
    /// The mesh is being (re)built.
    Loading,
    /// The mesh is complete and may be drawn.
    Live,
}

/// A terrain tile occupying one slot of a cell manager's pool.
#[derive(Clone, Debug, Default)]
pub struct Tile {
    mesh: TerrainMesh,
    anchor: Vec2,
    state: TileState,
}

impl Tile {
    /// Creates an empty tile.
    pub fn new() -> Self {
        Self::default()
    }

    /// The tile mesh. Only meaningful while the tile is [`TileState::Live`].
    pub fn mesh(&self) -> &TerrainMesh {
        &self.mesh
    }

    /// World-space (x, z) corner with the lowest coordinates.
    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TileState {
        self.state
    }

    /// True when the tile may be drawn.
    pub fn is_live(&self) -> bool {
        self.state == TileState::Live
    }

    /// True when the slot can take a new anchor.
    pub fn is_free(&self) -> bool {
        self.state == TileState::Empty
    }

    /// World-space (x, z) center of a tile with footprint `cell_size`.
    pub fn center(&self, cell_size: Vec2) -> Vec2 {
        self.anchor + cell_size * 0.5
    }

    /// Claim the slot for `anchor` and hand out the mesh for rebuilding.
    pub(crate) fn begin_loading(&mut self, anchor: Vec2) -> &mut TerrainMesh {
        self.anchor = anchor;
        self.state = TileState::Loading;
        &mut self.mesh
    }

    /// Publish the rebuilt mesh.
    pub(crate) fn finish_loading(&mut self) {
        debug_assert_eq!(self.state, TileState::Loading);
        self.state = TileState::Live;
    }

    /// Return a live tile to the free pool, keeping its buffers for reuse.
    pub(crate) fn release(&mut self) {
        if self.state == TileState::Live {
            self.state = TileState::Empty;
        }
    }
}
