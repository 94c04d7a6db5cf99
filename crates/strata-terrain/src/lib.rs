//! Height fields for terrain streaming: quantized elevation grids, bilinear
//! height queries, down-sampling for distant LODs, and procedural generation.

mod error;
mod height_field;
mod heightmap;

pub use error::HeightFieldError;
pub use height_field::{HeightField, MAX_SAMPLE_VALUE};
pub use heightmap::{HeightmapParams, HeightmapSampler, generate_height_field};
