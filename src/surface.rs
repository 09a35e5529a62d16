//! CPU-side RGBA8 paint surfaces.
//!
//! A [`Surface`] is a plain `width * height * 4` byte buffer with straight
//! (non-premultiplied) alpha.  Coordinates are y-down with the origin at the
//! top-left pixel, matching screen space.  All brush work happens here; the
//! buffer is uploaded to a GPU texture only at the edge of the crate
//! ([`Surface::to_image`] / [`Surface::copy_into_image`]).

use bevy::asset::RenderAssetUsages;
use bevy::image::{Image, ImageSampler};
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};

/// Hard cap on either surface dimension.  Keeps a typo'd size from
/// attempting a multi-gigabyte allocation.
pub const MAX_DIMENSION: u32 = 8192;

/// Why a surface could not be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// Width or height was zero.
    ZeroDimension { width: u32, height: u32 },
    /// Width or height exceeded [`MAX_DIMENSION`].
    DimensionTooLarge { width: u32, height: u32 },
}

impl std::fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurfaceError::ZeroDimension { width, height } => {
                write!(f, "surface dimensions must be non-zero, got {width}x{height}")
            }
            SurfaceError::DimensionTooLarge { width, height } => {
                write!(
                    f,
                    "surface dimensions {width}x{height} exceed the maximum of {MAX_DIMENSION}"
                )
            }
        }
    }
}

impl std::error::Error for SurfaceError {}

/// An owned RGBA8 pixel buffer that brushes paint into.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Surface {
    /// Allocate a fully transparent surface.
    pub fn new(width: u32, height: u32) -> Result<Self, SurfaceError> {
        if width == 0 || height == 0 {
            return Err(SurfaceError::ZeroDimension { width, height });
        }
        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(SurfaceError::DimensionTooLarge { width, height });
        }
        Ok(Self {
            width,
            height,
            data: vec![0; (width * height * 4) as usize],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 bytes, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Reset every pixel to transparent black.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// RGBA of one pixel.  Out-of-bounds reads come back transparent.
    pub fn pixel(&self, x: i32, y: i32) -> [u8; 4] {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return [0; 4];
        }
        let i = ((y as u32 * self.width + x as u32) * 4) as usize;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    /// Source-over blend one pixel.  `rgb` channels are in [0, 1], `alpha`
    /// is the source coverage in [0, 1].  Writes outside the surface and
    /// fully transparent sources are ignored.
    pub fn blend_pixel(&mut self, x: i32, y: i32, rgb: [f32; 3], alpha: f32) {
        if alpha <= 0.0 || x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let sa = alpha.min(1.0);
        let i = ((y as u32 * self.width + x as u32) * 4) as usize;

        let da = self.data[i + 3] as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        if out_a <= 0.0 {
            return;
        }
        for c in 0..3 {
            let dst = self.data[i + c] as f32 / 255.0;
            let out = (rgb[c] * sa + dst * da * (1.0 - sa)) / out_a;
            self.data[i + c] = (out * 255.0).round() as u8;
        }
        self.data[i + 3] = (out_a * 255.0).round() as u8;
    }

    /// Bilinear sample at a fractional pixel position, channels in [0, 255].
    /// Coordinates are clamped to the surface, so reads past an edge repeat
    /// the border pixel.
    pub fn sample_clamped(&self, x: f32, y: f32) -> [f32; 4] {
        let fx = (x - 0.5).clamp(0.0, (self.width - 1) as f32);
        let fy = (y - 0.5).clamp(0.0, (self.height - 1) as f32);
        let x0 = fx.floor() as i32;
        let y0 = fy.floor() as i32;
        let x1 = (x0 + 1).min(self.width as i32 - 1);
        let y1 = (y0 + 1).min(self.height as i32 - 1);
        let tx = fx - x0 as f32;
        let ty = fy - y0 as f32;

        let p00 = self.pixel(x0, y0);
        let p10 = self.pixel(x1, y0);
        let p01 = self.pixel(x0, y1);
        let p11 = self.pixel(x1, y1);

        let mut out = [0.0f32; 4];
        for c in 0..4 {
            let top = p00[c] as f32 * (1.0 - tx) + p10[c] as f32 * tx;
            let bottom = p01[c] as f32 * (1.0 - tx) + p11[c] as f32 * tx;
            out[c] = top * (1.0 - ty) + bottom * ty;
        }
        out
    }

    /// Build a linearly sampled Bevy [`Image`] holding a copy of this
    /// surface.  The asset keeps its CPU-side data so later frames can be
    /// written back with [`Surface::copy_into_image`].
    pub fn to_image(&self) -> Image {
        let mut image = Image::new(
            Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            self.data.clone(),
            TextureFormat::Rgba8UnormSrgb,
            RenderAssetUsages::default(),
        );
        image.sampler = ImageSampler::linear();
        image
    }

    /// Overwrite `image`'s pixel data with this surface.  Returns `false`
    /// without touching the asset when the extents (or the CPU-side buffer)
    /// do not match, so a stale texture is left intact rather than
    /// corrupted.
    pub fn copy_into_image(&self, image: &mut Image) -> bool {
        let size = image.texture_descriptor.size;
        if size.width != self.width || size.height != self.height {
            return false;
        }
        match image.data.as_mut() {
            Some(data) if data.len() == self.data.len() => {
                data.copy_from_slice(&self.data);
                true
            }
            _ => false,
        }
    }
}

// --- tests ------------------------------------------------------------------
