//! Procedural height fields from multi-octave fractal Brownian motion (fBm).
//!
//! Composites octaves of simplex noise and quantizes the result into a
//! [`HeightField`], so the streaming pipeline can run without any asset on disk.

use glam::Vec3;
use noise::{NoiseFn, Simplex};

use crate::error::HeightFieldError;
use crate::height_field::{HeightField, MAX_SAMPLE_VALUE};

/// Configuration for multi-octave fBm noise.
#[derive(Clone, Debug)]
pub struct HeightmapParams {
    /// Seed for deterministic generation.
    pub seed: u64,
    /// Number of noise octaves to composite.
    pub octaves: u32,
    /// Frequency multiplier between successive octaves.
    pub lacunarity: f64,
    /// Amplitude multiplier between successive octaves.
    pub persistence: f64,
    /// Frequency of the broadest octave, in cycles per sample.
    pub base_frequency: f64,
    /// Amplitude of the broadest octave.
    pub amplitude: f64,
}

impl Default for HeightmapParams {
    fn default() -> Self {
        Self {
            seed: 0,
            octaves: 6,
            lacunarity: 2.0,
            persistence: 0.5,
            base_frequency: 0.004,
            amplitude: 1.0,
        }
    }
}

/// Evaluates fBm over simplex noise in sample-space coordinates.
pub struct HeightmapSampler {
    noise: Simplex,
    params: HeightmapParams,
}

impl HeightmapSampler {
    /// Create a new sampler with the given parameters.
    pub fn new(params: HeightmapParams) -> Self {
        let noise = Simplex::new(params.seed as u32);
        Self { noise, params }
    }

    /// Raw fBm value at `(x, y)`, within `[-max_amplitude, max_amplitude]`.
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let mut total = 0.0;
        let mut frequency = self.params.base_frequency;
        let mut amplitude = self.params.amplitude;

        for _ in 0..self.params.octaves {
            total += self.noise.get([x * frequency, y * frequency]) * amplitude;
            frequency *= self.params.lacunarity;
            amplitude *= self.params.persistence;
        }

        total
    }

    /// fBm value at `(x, y)` mapped to a quantized sample.
    pub fn sample_quantized(&self, x: f64, y: f64) -> u16 {
        let max_amp = self.max_amplitude();
        if max_amp == 0.0 {
            return (MAX_SAMPLE_VALUE / 2.0) as u16;
        }
        let normalized = ((self.sample(x, y) / max_amp + 1.0) * 0.5).clamp(0.0, 1.0);
        (normalized * MAX_SAMPLE_VALUE as f64).round() as u16
    }

    /// Geometric sum of all octave amplitudes.
    pub fn max_amplitude(&self) -> f64 {
        let mut sum = 0.0;
        let mut amp = self.params.amplitude;
        for _ in 0..self.params.octaves {
            sum += amp;
            amp *= self.params.persistence;
        }
        sum
    }

    /// Current parameters.
    pub fn params(&self) -> &HeightmapParams {
        &self.params
    }
}

/// Generate a `width x height` field spanning `dimensions` from fBm noise.
pub fn generate_height_field(
    params: HeightmapParams,
    width: u32,
    height: u32,
    dimensions: Vec3,
) -> Result<HeightField, HeightFieldError> {
    let sampler = HeightmapSampler::new(params);
    HeightField::from_fn(width, height, dimensions, |x, y| {
        sampler.sample_quantized(x as f64, y as f64)
    })
}
