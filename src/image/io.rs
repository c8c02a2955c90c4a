//! Convenience helpers for loading and saving images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::util::{GapMatchError, GapMatchResult};
use image::{RgbImage, RgbaImage};
use std::path::Path;

fn open<P: AsRef<Path>>(path: P) -> GapMatchResult<image::DynamicImage> {
    image::open(path).map_err(|err| GapMatchError::ImageIo {
        reason: err.to_string(),
    })
}

/// Loads a background image from disk as 8-bit RGB.
pub fn load_rgb_image<P: AsRef<Path>>(path: P) -> GapMatchResult<RgbImage> {
    Ok(open(path)?.to_rgb8())
}

/// Loads a piece image from disk as 8-bit RGBA.
///
/// Images without an alpha channel come back fully opaque.
pub fn load_rgba_image<P: AsRef<Path>>(path: P) -> GapMatchResult<RgbaImage> {
    Ok(open(path)?.to_rgba8())
}

/// Writes an RGB image, choosing the format from the file extension.
pub fn save_rgb_image<P: AsRef<Path>>(img: &RgbImage, path: P) -> GapMatchResult<()> {
    img.save(path).map_err(|err| GapMatchError::ImageIo {
        reason: err.to_string(),
    })
}
