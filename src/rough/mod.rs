//! Coarse gap estimation from the two backgrounds.
//!
//! The structural-similarity map of the full background against the gap
//! background is collapsed to luma, blurred and binarized with Otsu's level.
//! The binary map is reduced to column and row profiles whose first flat,
//! tall windows mark the sides of the gap.

use crate::image::ensure_same_shape;
use crate::metric::{ssim_map, SsimParams};
use crate::region::RoughBounds;
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::{GapMatchError, GapMatchResult};
use image::{GrayImage, Luma, RgbImage};
use imageproc::contrast::otsu_level;
use imageproc::filter::gaussian_blur_f32;

pub mod profile;

pub use profile::{column_profile, row_profile, FlatWindow};

/// Configuration of the rough locator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoughConfig {
    /// Number of consecutive profile samples in the flat-window test.
    pub window: usize,
    /// Minimum profile height inside a qualifying window.
    pub min_height: u32,
    /// Maximum profile spread inside a qualifying window.
    pub max_spread: u32,
    /// Gaussian sigma applied to the similarity image before thresholding.
    pub blur_sigma: f32,
    /// Similarity metric parameters.
    pub ssim: SsimParams,
}

impl Default for RoughConfig {
    fn default() -> Self {
        Self {
            window: 4,
            min_height: 7,
            max_spread: 7,
            // Automatic sigma of a 5x5 Gaussian kernel.
            blur_sigma: 1.1,
            ssim: SsimParams::default(),
        }
    }
}

impl RoughConfig {
    pub(crate) fn validate(&self) -> GapMatchResult<()> {
        if self.window == 0 {
            return Err(GapMatchError::InvalidInput("profile window must be positive"));
        }
        if !(self.blur_sigma.is_finite() && self.blur_sigma > 0.0) {
            return Err(GapMatchError::InvalidInput("blur sigma must be positive"));
        }
        self.ssim.validate()
    }

    fn flat_window(&self) -> FlatWindow {
        FlatWindow {
            window: self.window,
            min_height: self.min_height,
            max_spread: self.max_spread,
        }
    }
}

/// Binary map with `1` where the backgrounds differ and `0` elsewhere.
pub fn difference_mask(
    full_bg: &RgbImage,
    gap_bg: &RgbImage,
    cfg: &RoughConfig,
) -> GapMatchResult<GrayImage> {
    cfg.validate()?;
    ensure_same_shape(full_bg, gap_bg)?;

    let luma = ssim_map(full_bg, gap_bg, cfg.ssim)?.to_luma_u8();
    let blurred = gaussian_blur_f32(&luma, cfg.blur_sigma);

    let (lo, hi) = blurred
        .pixels()
        .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p.0[0]), hi.max(p.0[0])));
    if lo == hi {
        return Ok(GrayImage::new(blurred.width(), blurred.height()));
    }

    let level = otsu_level(&blurred);
    Ok(GrayImage::from_fn(blurred.width(), blurred.height(), |x, y| {
        Luma([u8::from(blurred.get_pixel(x, y).0[0] <= level)])
    }))
}

/// Estimates the gap's bounding sides.
///
/// Sides without a qualifying profile window are `None`; the caller decides
/// how to clamp them.
pub fn rough_locate(
    full_bg: &RgbImage,
    gap_bg: &RgbImage,
    cfg: &RoughConfig,
) -> GapMatchResult<RoughBounds> {
    let _span = trace_span!(
        "rough_locate",
        width = full_bg.width(),
        height = full_bg.height()
    )
    .entered();

    let binary = difference_mask(full_bg, gap_bg, cfg)?;
    let bounds = bounds_from_mask(&binary, cfg);

    trace_event!(
        "rough_bounds",
        left = side(bounds.left),
        up = side(bounds.up),
        right = side(bounds.right),
        down = side(bounds.down)
    );
    if !bounds.is_complete() {
        trace_warn!(
            "rough_bounds_incomplete",
            left = bounds.left.is_some(),
            up = bounds.up.is_some(),
            right = bounds.right.is_some(),
            down = bounds.down.is_some()
        );
    }
    Ok(bounds)
}

/// Runs the flat-window scan over both profiles of a binary map.
pub fn bounds_from_mask(binary: &GrayImage, cfg: &RoughConfig) -> RoughBounds {
    let flat = cfg.flat_window();
    let columns = column_profile(binary);
    let rows = row_profile(binary);
    RoughBounds {
        left: flat.scan_forward(&columns).map(|i| i as u32),
        up: flat.scan_forward(&rows).map(|i| i as u32),
        right: flat.scan_backward(&columns).map(|i| i as u32),
        down: flat.scan_backward(&rows).map(|i| i as u32),
    }
}

fn side(value: Option<u32>) -> i64 {
    value.map_or(-1, i64::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn textured(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            let v = (x * 37 + y * 11) ^ (x * y);
            Rgb([(v & 0xFF) as u8, ((v >> 3) & 0xFF) as u8, ((v * 5) & 0xFF) as u8])
        })
    }

    #[test]
    fn identical_backgrounds_yield_no_bounds() {
        let img = textured(60, 40);
        let mask = difference_mask(&img, &img, &RoughConfig::default()).unwrap();
        assert!(mask.pixels().all(|p| p.0[0] == 0));
        let bounds = rough_locate(&img, &img, &RoughConfig::default()).unwrap();
        assert_eq!(bounds, RoughBounds::default());
    }

    #[test]
    fn mask_marks_a_filled_block() {
        let full = textured(80, 60);
        let mut gap = full.clone();
        for y in 20..40 {
            for x in 30..50 {
                gap.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }
        let mask = difference_mask(&full, &gap, &RoughConfig::default()).unwrap();
        assert_eq!(mask.get_pixel(40, 30).0[0], 1);
        assert_eq!(mask.get_pixel(2, 2).0[0], 0);

        let bounds = rough_locate(&full, &gap, &RoughConfig::default()).unwrap();
        assert!(bounds.is_complete());
        let (left, right) = (bounds.left.unwrap(), bounds.right.unwrap());
        let (up, down) = (bounds.up.unwrap(), bounds.down.unwrap());
        assert!((24..=32).contains(&left), "left {left}");
        assert!((47..=55).contains(&right), "right {right}");
        assert!((14..=22).contains(&up), "up {up}");
        assert!((37..=45).contains(&down), "down {down}");
    }

    #[test]
    fn rejects_shape_mismatch() {
        let a = textured(10, 10);
        let b = textured(10, 11);
        assert!(matches!(
            rough_locate(&a, &b, &RoughConfig::default()),
            Err(GapMatchError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn rejects_zero_window() {
        let img = textured(10, 10);
        let cfg = RoughConfig {
            window: 0,
            ..RoughConfig::default()
        };
        assert_eq!(
            rough_locate(&img, &img, &cfg).err(),
            Some(GapMatchError::InvalidInput("profile window must be positive"))
        );
    }

    #[test]
    fn thin_mask_rows_fail_height_test() {
        let mut mask = GrayImage::new(30, 30);
        for x in 5..25 {
            for y in 10..14 {
                mask.put_pixel(x, y, Luma([1]));
            }
        }
        let bounds = bounds_from_mask(&mask, &RoughConfig::default());
        // Columns only reach a height of 4.
        assert_eq!(bounds.left, None);
        assert_eq!(bounds.right, None);
        assert_eq!(bounds.up, Some(10));
        assert_eq!(bounds.down, Some(13));
    }
}
