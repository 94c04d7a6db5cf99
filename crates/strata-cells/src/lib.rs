//! Terrain tile streaming: a fixed pool of height-field tiles kept centered on a moving focus.

pub mod cell_manager;
pub mod error;
pub mod lod;
pub mod tile;

pub use cell_manager::{
    CellManager, CellManagerConfig, DEFAULT_TOLERANCE, LoadQueueReport, PoolStats,
    StreamingTolerances, WindowState, tile_sample_range,
};
pub use error::CellManagerError;
pub use lod::{DrawPlanes, LodFrameReport, TerrainLod};
pub use tile::{Tile, TileState};
