//! Cell manager construction errors.

use strata_terrain::HeightFieldError;

/// Configurations a cell manager refuses to be built with.
///
/// These are caller preconditions; once a manager exists none of its
/// per-frame operations can fail.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CellManagerError {
    /// Tiles must span at least one quad.
    #[error("cell size must be non-zero")]
    ZeroCellSize,

    /// The window must hold at least one tile per side of its center.
    #[error("half extent must be non-zero")]
    ZeroHalfExtent,

    /// A tile may not span more quads than the field has.
    #[error("cell size {cell_size} exceeds the {width}x{height} height field")]
    CellLargerThanField {
        /// Requested quads per tile edge.
        cell_size: u32,
        /// Height field columns.
        width: u32,
        /// Height field rows.
        height: u32,
    },

    /// A streaming tolerance fraction lies outside `(0, 0.5)`.
    #[error("{name} tolerance {value} must lie strictly between 0 and 0.5")]
    InvalidTolerance {
        /// Which tolerance.
        name: &'static str,
        /// The rejected fraction.
        value: f32,
    },

    /// Building the down-sampled field for the far LOD failed.
    #[error("far LOD height field: {0}")]
    HeightField(#[from] HeightFieldError),
}
