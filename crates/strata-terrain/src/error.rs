//! Height field construction errors.

/// Errors raised when a height field is constructed from invalid input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HeightFieldError {
    /// Bilinear sampling needs a 2x2 neighborhood, so both axes need two samples.
    #[error("height field must be at least 2x2 samples, got {width}x{height}")]
    TooSmall {
        /// Requested column count.
        width: u32,
        /// Requested row count.
        height: u32,
    },

    /// The sample buffer does not hold `width * height` values.
    #[error("expected {expected} height samples, got {actual}")]
    SampleCountMismatch {
        /// `width * height`.
        expected: usize,
        /// Length of the supplied buffer.
        actual: usize,
    },

    /// The horizontal world extent must be positive and finite.
    #[error("invalid world dimensions ({x}, {y}, {z})")]
    InvalidDimensions {
        /// East-west extent.
        x: f32,
        /// Vertical extent.
        y: f32,
        /// North-south extent.
        z: f32,
    },
}
