//! Compositing the paint surface onto the display surface.
//!
//! The paint surface accumulates raw brush marks; what the viewer sees is
//! the display surface, rebuilt from paint every frame through a
//! [`CompositeFilter`].  [`WatercolorWash`] is the signature look: pixels
//! are fetched through a fractal-noise warp field (bleeding edges), softened
//! with a small tent blur, and given a mild alpha boost so thin glazes read
//! on white paper.  [`PlainBlit`] is the identity filter for tests and
//! debugging.
//!
//! The warp field depends only on the settings and the surface size, so it
//! is built once and cached inside the filter; per-frame work is two cheap
//! full-surface passes, parallelized by rows.

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use rayon::prelude::*;

use crate::surface::Surface;

/// Rebuilds the display surface from the paint surface.
///
/// Implementations must treat `paint` as read-only truth and fully
/// overwrite `display` (it may still hold last frame's pixels).  When the
/// two surfaces disagree in size the filter must leave `display` untouched.
pub trait CompositeFilter: Send + Sync {
    fn composite(&mut self, paint: &Surface, display: &mut Surface);
}

/// Direct copy, no paper effect.
pub struct PlainBlit;

impl CompositeFilter for PlainBlit {
    fn composite(&mut self, paint: &Surface, display: &mut Surface) {
        if paint.width() != display.width() || paint.height() != display.height() {
            return;
        }
        display.data_mut().copy_from_slice(paint.data());
    }
}

/// Knobs for the watercolor paper effect.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WashConfig {
    /// Seed for the warp noise field.
    pub seed: u32,
    /// Spatial frequency of the warp noise, per pixel.
    pub granularity: f64,
    /// Fractal octaves in the warp noise.
    pub octaves: usize,
    /// Maximum pixel offset applied by the warp.
    pub displacement: f32,
    /// Post-blur alpha multiplier; values just above 1 firm up thin glazes.
    pub alpha_gain: f32,
}

impl Default for WashConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            granularity: 0.035,
            octaves: 5,
            displacement: 8.0,
            alpha_gain: 1.1,
        }
    }
}

/// Cached displacement vectors, one per pixel.
#[derive(Clone)]
struct WarpGrid {
    width: u32,
    height: u32,
    config: WashConfig,
    offsets: Vec<(f32, f32)>,
}

impl WarpGrid {
    fn build(config: WashConfig, width: u32, height: u32) -> Self {
        let noise_x = Fbm::<Perlin>::new(config.seed).set_octaves(config.octaves);
        let noise_y = Fbm::<Perlin>::new(config.seed.wrapping_add(100)).set_octaves(config.octaves);

        let mut offsets = vec![(0.0f32, 0.0f32); (width * height) as usize];
        offsets
            .par_chunks_mut(width as usize)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, slot) in row.iter_mut().enumerate() {
                    let sx = x as f64 * config.granularity;
                    let sy = y as f64 * config.granularity;
                    *slot = (
                        noise_x.get([sx, sy]) as f32 * config.displacement,
                        noise_y.get([sx, sy]) as f32 * config.displacement,
                    );
                }
            });

        Self {
            width,
            height,
            config,
            offsets,
        }
    }

    fn fits(&self, config: WashConfig, width: u32, height: u32) -> bool {
        self.width == width && self.height == height && self.config == config
    }
}

/// The paper-texture composite.
pub struct WatercolorWash {
    config: WashConfig,
    grid: Option<WarpGrid>,
}

impl WatercolorWash {
    pub fn new(config: WashConfig) -> Self {
        Self { config, grid: None }
    }

    pub fn config(&self) -> WashConfig {
        self.config
    }

    /// Change settings; the warp field is rebuilt on the next composite.
    pub fn set_config(&mut self, config: WashConfig) {
        self.config = config;
    }
}

impl Default for WatercolorWash {
    fn default() -> Self {
        Self::new(WashConfig::default())
    }
}

impl CompositeFilter for WatercolorWash {
    fn composite(&mut self, paint: &Surface, display: &mut Surface) {
        let (w, h) = (paint.width(), paint.height());
        if w != display.width() || h != display.height() {
            return;
        }

        let grid = match &mut self.grid {
            Some(grid) if grid.fits(self.config, w, h) => grid,
            slot => slot.insert(WarpGrid::build(self.config, w, h)),
        };
        let grid = &*grid;

        let stride = (w * 4) as usize;
        let width = w as usize;
        let height = h as usize;

        // Pass 1: fetch every pixel through the warp field.
        let mut warped = vec![0u8; paint.data().len()];
        warped
            .par_chunks_mut(stride)
            .enumerate()
            .for_each(|(y, row)| {
                for x in 0..width {
                    let (dx, dy) = grid.offsets[y * width + x];
                    let sample =
                        paint.sample_clamped(x as f32 + 0.5 + dx, y as f32 + 0.5 + dy);
                    let at = x * 4;
                    for c in 0..4 {
                        row[at + c] = sample[c].round() as u8;
                    }
                }
            });

        // Pass 2: 3x3 tent blur with edge replication, then the alpha lift.
        let gain = self.config.alpha_gain;
        display
            .data_mut()
            .par_chunks_mut(stride)
            .enumerate()
            .for_each(|(y, row)| {
                for x in 0..width {
                    let mut acc = [0.0f32; 4];
                    for ky in -1i32..=1 {
                        let sy = (y as i32 + ky).clamp(0, height as i32 - 1) as usize;
                        let wy = (2 - ky.abs()) as f32;
                        for kx in -1i32..=1 {
                            let sx = (x as i32 + kx).clamp(0, width as i32 - 1) as usize;
                            let weight = wy * (2 - kx.abs()) as f32;
                            let src = sy * stride + sx * 4;
                            for c in 0..4 {
                                acc[c] += warped[src + c] as f32 * weight;
                            }
                        }
                    }
                    let at = x * 4;
                    for c in 0..3 {
                        row[at + c] = (acc[c] / 16.0).round() as u8;
                    }
                    row[at + 3] = (acc[3] / 16.0 * gain).min(255.0).round() as u8;
                }
            });
    }
}

// --- tests ------------------------------------------------------------------
