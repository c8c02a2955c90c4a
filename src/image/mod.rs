//! Image helpers shared by the locator stages.
//!
//! Inputs are `image` crate buffers. `Plane` is an owned single-channel `f64`
//! grid in row-major order used by the similarity metric.

use crate::util::{GapMatchError, GapMatchResult};
use image::{Rgb, RgbImage, RgbaImage};

#[cfg(feature = "image-io")]
pub mod io;

/// Owned single-channel `f64` plane.
#[derive(Clone, Debug, PartialEq)]
pub struct Plane {
    data: Vec<f64>,
    width: usize,
    height: usize,
}

impl Plane {
    /// Creates a plane from a contiguous row-major buffer.
    pub fn new(data: Vec<f64>, width: usize, height: usize) -> GapMatchResult<Self> {
        if width == 0 || height == 0 {
            return Err(GapMatchError::EmptyImage {
                width: width as u32,
                height: height as u32,
            });
        }
        if data.len() != width * height {
            return Err(GapMatchError::InvalidInput("plane buffer length mismatch"));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Extracts channel `channel` of an RGB image.
    pub(crate) fn from_rgb_channel(img: &RgbImage, channel: usize) -> Self {
        debug_assert!(channel < 3);
        let data = img.pixels().map(|p| p.0[channel] as f64).collect();
        Self {
            data,
            width: img.width() as usize,
            height: img.height() as usize,
        }
    }

    /// Returns the plane width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the plane height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the backing slice.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Returns the value at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }

    /// Returns row `y`.
    pub fn row(&self, y: usize) -> Option<&[f64]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.width;
        self.data.get(start..start + self.width)
    }
}

/// Splits an RGB image into three planes.
pub(crate) fn rgb_planes(img: &RgbImage) -> [Plane; 3] {
    [
        Plane::from_rgb_channel(img, 0),
        Plane::from_rgb_channel(img, 1),
        Plane::from_rgb_channel(img, 2),
    ]
}

/// Fails with `EmptyImage` when either dimension is zero.
pub(crate) fn ensure_non_empty(width: u32, height: u32) -> GapMatchResult<()> {
    if width == 0 || height == 0 {
        return Err(GapMatchError::EmptyImage { width, height });
    }
    Ok(())
}

/// Checks that both backgrounds share one non-empty shape and returns it.
pub fn ensure_same_shape(full: &RgbImage, gap: &RgbImage) -> GapMatchResult<(u32, u32)> {
    if full.dimensions() != gap.dimensions() {
        return Err(GapMatchError::ShapeMismatch {
            full: full.dimensions(),
            gap: gap.dimensions(),
        });
    }
    let (width, height) = full.dimensions();
    ensure_non_empty(width, height)?;
    Ok((width, height))
}

/// Drops the alpha channel, keeping the stored color of every pixel.
pub fn strip_alpha(img: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(img.width(), img.height(), |x, y| {
        let [r, g, b, _] = img.get_pixel(x, y).0;
        Rgb([r, g, b])
    })
}
