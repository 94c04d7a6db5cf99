//! Quantized height field with world-space extent and bilinear height queries.
//!
//! A [`HeightField`] stores a `width x height` grid of `u16` elevation samples
//! and the world-space box it spans. Sample `(x, y)` with value `s` sits at
//! `(x * sx, s / u16::MAX * dimensions.y, y * sz)` where `(sx, 1, sz)` is
//! [`HeightField::sample_spacing`].

use glam::{UVec2, Vec2, Vec3};

use crate::error::HeightFieldError;

/// Largest representable sample value, as a float divisor.
pub const MAX_SAMPLE_VALUE: f32 = u16::MAX as f32;

/// An immutable grid of quantized elevation samples.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightField {
    width: u32,
    height: u32,
    /// Row-major: sample `(x, y)` lives at `y * width + x`.
    samples: Vec<u16>,
    /// World-space extent of the whole field (east-west, vertical, north-south).
    dimensions: Vec3,
}

impl HeightField {
    /// Create a height field from row-major samples.
    pub fn new(
        width: u32,
        height: u32,
        samples: Vec<u16>,
        dimensions: Vec3,
    ) -> Result<Self, HeightFieldError> {
        if width < 2 || height < 2 {
            return Err(HeightFieldError::TooSmall { width, height });
        }
        let expected = width as usize * height as usize;
        if samples.len() != expected {
            return Err(HeightFieldError::SampleCountMismatch {
                expected,
                actual: samples.len(),
            });
        }
        let valid = dimensions.is_finite()
            && dimensions.x > 0.0
            && dimensions.z > 0.0
            && dimensions.y >= 0.0;
        if !valid {
            return Err(HeightFieldError::InvalidDimensions {
                x: dimensions.x,
                y: dimensions.y,
                z: dimensions.z,
            });
        }
        Ok(Self {
            width,
            height,
            samples,
            dimensions,
        })
    }

    /// Create a height field by evaluating `f(x, y)` for every sample.
    pub fn from_fn(
        width: u32,
        height: u32,
        dimensions: Vec3,
        mut f: impl FnMut(u32, u32) -> u16,
    ) -> Result<Self, HeightFieldError> {
        let mut samples = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                samples.push(f(x, y));
            }
        }
        Self::new(width, height, samples, dimensions)
    }

    /// Create a height field where every sample has the same value.
    pub fn flat(
        width: u32,
        height: u32,
        value: u16,
        dimensions: Vec3,
    ) -> Result<Self, HeightFieldError> {
        Self::new(
            width,
            height,
            vec![value; width as usize * height as usize],
            dimensions,
        )
    }

    /// Number of sample columns.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of sample rows.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)` as a vector.
    pub fn size(&self) -> UVec2 {
        UVec2::new(self.width, self.height)
    }

    /// World-space extent of the field.
    pub fn dimensions(&self) -> Vec3 {
        self.dimensions
    }

    /// Raw row-major sample buffer.
    pub fn samples(&self) -> &[u16] {
        &self.samples
    }

    /// Quad counts along each axis: `(width - 1, height - 1)`.
    pub fn quad_extent(&self) -> Vec2 {
        Vec2::new((self.width - 1) as f32, (self.height - 1) as f32)
    }

    /// Per-sample world scale `dimensions / (W-1, 1, H-1)`.
    ///
    /// This is the scale the mesh builder applies to `(x, normalized, y)`.
    pub fn sample_spacing(&self) -> Vec3 {
        let quads = self.quad_extent();
        self.dimensions / Vec3::new(quads.x, 1.0, quads.y)
    }

    /// Raw sample at `(x, y)`; indices past the far edges are clamped.
    #[inline]
    pub fn sample(&self, x: u32, y: u32) -> u16 {
        let x = x.min(self.width - 1) as usize;
        let y = y.min(self.height - 1) as usize;
        self.samples[y * self.width as usize + x]
    }

    /// Sample at `(x, y)` mapped to `[0, 1]`.
    #[inline]
    pub fn normalized(&self, x: u32, y: u32) -> f32 {
        self.sample(x, y) as f32 / MAX_SAMPLE_VALUE
    }

    /// Convert a world-space horizontal position (x, z) to continuous sample coordinates.
    pub fn world_to_sample(&self, xz: Vec2) -> Vec2 {
        xz / Vec2::new(self.dimensions.x, self.dimensions.z) * self.quad_extent()
    }

    /// Bilinearly interpolated world-space elevation under `position` (x and z are used).
    ///
    /// Positions outside the field are clamped to its border, so every query succeeds.
    pub fn sample_height(&self, position: Vec3) -> f32 {
        let pixel = self.world_to_sample(Vec2::new(position.x, position.z));
        self.bilinear(pixel) / MAX_SAMPLE_VALUE * self.dimensions.y
    }

    /// Bilinear blend of raw samples at continuous sample coordinates.
    fn bilinear(&self, pixel: Vec2) -> f32 {
        let pixel = pixel.clamp(Vec2::ZERO, self.quad_extent());
        let base_x = (pixel.x.floor() as u32).min(self.width - 2);
        let base_y = (pixel.y.floor() as u32).min(self.height - 2);
        let s = pixel.x - base_x as f32;
        let t = pixel.y - base_y as f32;

        let h00 = self.sample(base_x, base_y) as f32;
        let h01 = self.sample(base_x, base_y + 1) as f32;
        let h10 = self.sample(base_x + 1, base_y) as f32;
        let h11 = self.sample(base_x + 1, base_y + 1) as f32;

        lerp(lerp(h00, h01, t), lerp(h10, h11, t), s)
    }

    /// Resample to a new grid size covering the same world extent.
    pub fn resampled(&self, width: u32, height: u32) -> Result<Self, HeightFieldError> {
        if width < 2 || height < 2 {
            return Err(HeightFieldError::TooSmall { width, height });
        }
        let step = self.quad_extent() / Vec2::new((width - 1) as f32, (height - 1) as f32);
        Self::from_fn(width, height, self.dimensions, |x, y| {
            let pixel = Vec2::new(x as f32, y as f32) * step;
            self.bilinear(pixel).round().clamp(0.0, MAX_SAMPLE_VALUE) as u16
        })
    }

    /// Resample to `rows` rows, choosing the column count that keeps the quad aspect ratio.
    pub fn downsampled_to_rows(&self, rows: u32) -> Result<Self, HeightFieldError> {
        let quads = self.quad_extent();
        let aspect = quads.x / quads.y;
        let columns = ((aspect * rows as f32).round() as u32).max(2);
        self.resampled(columns, rows)
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
