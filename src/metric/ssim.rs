//! Structural similarity over RGB images.
//!
//! Local statistics use a uniform square window with sample (unbiased)
//! covariance. Each channel is scored independently; the mean similarity is
//! the average of the per-pixel map after cropping a border of half a window,
//! so reflected border pixels do not contribute.

use crate::image::{ensure_non_empty, rgb_planes};
use crate::metric::filter::uniform_filter;
use crate::util::{GapMatchError, GapMatchResult};
use image::{GrayImage, Luma, RgbImage};

/// Parameters of the structural-similarity metric.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SsimParams {
    /// Side of the square window; shrunk to the largest odd size that fits.
    pub win_size: usize,
    /// Luminance stabilizer coefficient.
    pub k1: f64,
    /// Contrast stabilizer coefficient.
    pub k2: f64,
    /// Dynamic range of the pixel values.
    pub data_range: f64,
}

impl Default for SsimParams {
    fn default() -> Self {
        Self {
            win_size: 7,
            k1: 0.01,
            k2: 0.03,
            data_range: 255.0,
        }
    }
}

impl SsimParams {
    pub(crate) fn validate(&self) -> GapMatchResult<()> {
        if self.win_size == 0 {
            return Err(GapMatchError::InvalidInput("ssim window must be positive"));
        }
        if !(self.data_range.is_finite() && self.data_range > 0.0) {
            return Err(GapMatchError::InvalidInput(
                "ssim data range must be positive",
            ));
        }
        if !(self.k1.is_finite() && self.k1 > 0.0 && self.k2.is_finite() && self.k2 > 0.0) {
            return Err(GapMatchError::InvalidInput(
                "ssim stabilizers must be positive",
            ));
        }
        Ok(())
    }

    /// Window side actually used for a `width`×`height` image.
    pub fn effective_window(&self, width: usize, height: usize) -> usize {
        let win = self.win_size.min(width).min(height).max(1);
        if win % 2 == 0 {
            win - 1
        } else {
            win
        }
    }
}

struct ChannelStats {
    values: Vec<f64>,
    mean: Vec<f64>,
    mean_sq: Vec<f64>,
}

impl ChannelStats {
    fn new(values: Vec<f64>, width: usize, height: usize, win: usize) -> Self {
        let squares: Vec<f64> = values.iter().map(|v| v * v).collect();
        let mean = uniform_filter(&values, width, height, win);
        let mean_sq = uniform_filter(&squares, width, height, win);
        Self {
            values,
            mean,
            mean_sq,
        }
    }
}

/// Precomputed reference statistics for repeated comparisons.
///
/// Scoring many candidates against one reference (the trimmed piece) only
/// filters the candidate side once per call.
pub struct SsimPlan {
    width: usize,
    height: usize,
    win: usize,
    cov_norm: f64,
    c1: f64,
    c2: f64,
    reference: [ChannelStats; 3],
}

impl SsimPlan {
    /// Builds a plan for `reference`.
    pub fn new(reference: &RgbImage, params: SsimParams) -> GapMatchResult<Self> {
        params.validate()?;
        ensure_non_empty(reference.width(), reference.height())?;
        let width = reference.width() as usize;
        let height = reference.height() as usize;
        let win = params.effective_window(width, height);
        let np = (win * win) as f64;
        let cov_norm = if win > 1 { np / (np - 1.0) } else { 1.0 };
        let c1 = (params.k1 * params.data_range).powi(2);
        let c2 = (params.k2 * params.data_range).powi(2);
        let reference =
            rgb_planes(reference).map(|p| ChannelStats::new(p.as_slice().to_vec(), width, height, win));
        Ok(Self {
            width,
            height,
            win,
            cov_norm,
            c1,
            c2,
            reference,
        })
    }

    /// Returns the reference width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the reference height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the window side in use.
    pub fn window(&self) -> usize {
        self.win
    }

    /// Computes the per-pixel similarity map of `other` against the reference.
    pub fn map(&self, other: &RgbImage) -> GapMatchResult<SsimMap> {
        let (w, h) = other.dimensions();
        if (w as usize, h as usize) != (self.width, self.height) {
            return Err(GapMatchError::ShapeMismatch {
                full: (self.width as u32, self.height as u32),
                gap: (w, h),
            });
        }
        let channels = rgb_planes(other).map(|p| p.as_slice().to_vec());
        let mut maps: [Vec<f64>; 3] = Default::default();
        for (c, values) in channels.into_iter().enumerate() {
            maps[c] = self.channel_map(&self.reference[c], values);
        }
        Ok(SsimMap {
            width: self.width,
            height: self.height,
            pad: (self.win - 1) / 2,
            channels: maps,
        })
    }

    /// Mean structural similarity of `other` against the reference.
    pub fn score(&self, other: &RgbImage) -> GapMatchResult<f32> {
        Ok(self.map(other)?.mean() as f32)
    }

    fn channel_map(&self, reference: &ChannelStats, values: Vec<f64>) -> Vec<f64> {
        let (w, h, win) = (self.width, self.height, self.win);
        let other = ChannelStats::new(values, w, h, win);
        let products: Vec<f64> = other
            .values
            .iter()
            .zip(&reference.values)
            .map(|(a, b)| a * b)
            .collect();
        let mean_xy = uniform_filter(&products, w, h, win);

        let mut out = Vec::with_capacity(w * h);
        for i in 0..w * h {
            let ux = other.mean[i];
            let uy = reference.mean[i];
            let vx = self.cov_norm * (other.mean_sq[i] - ux * ux);
            let vy = self.cov_norm * (reference.mean_sq[i] - uy * uy);
            let vxy = self.cov_norm * (mean_xy[i] - ux * uy);
            let a1 = 2.0 * ux * uy + self.c1;
            let a2 = 2.0 * vxy + self.c2;
            let b1 = ux * ux + uy * uy + self.c1;
            let b2 = vx + vy + self.c2;
            out.push((a1 * a2) / (b1 * b2));
        }
        out
    }
}

/// Per-pixel, per-channel structural similarity.
#[derive(Clone, Debug)]
pub struct SsimMap {
    width: usize,
    height: usize,
    pad: usize,
    channels: [Vec<f64>; 3],
}

impl SsimMap {
    /// Returns the map width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the map height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the similarity values of one channel in row-major order.
    pub fn channel(&self, channel: usize) -> Option<&[f64]> {
        self.channels.get(channel).map(Vec::as_slice)
    }

    /// Mean similarity over the border-cropped interior of all channels.
    pub fn mean(&self) -> f64 {
        let (x0, x1) = (self.pad, self.width - self.pad);
        let (y0, y1) = (self.pad, self.height - self.pad);
        let mut sum = 0.0;
        for channel in &self.channels {
            for y in y0..y1 {
                sum += channel[y * self.width + x0..y * self.width + x1]
                    .iter()
                    .sum::<f64>();
            }
        }
        let count = 3 * (x1 - x0) * (y1 - y0);
        sum / count as f64
    }

    /// Collapses the map to 8-bit luma.
    ///
    /// Channel values are scaled by 255 and truncated into `[0, 255]` before
    /// the Rec. 601 weighting, so dissimilar regions come out dark.
    pub fn to_luma_u8(&self) -> GrayImage {
        let to_u8 = |v: f64| (v * 255.0).clamp(0.0, 255.0).trunc();
        GrayImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            let i = y as usize * self.width + x as usize;
            let r = to_u8(self.channels[0][i]);
            let g = to_u8(self.channels[1][i]);
            let b = to_u8(self.channels[2][i]);
            let luma = 0.299 * r + 0.587 * g + 0.114 * b;
            Luma([luma.round().clamp(0.0, 255.0) as u8])
        })
    }
}

/// Per-pixel similarity map between two same-shape RGB images.
pub fn ssim_map(a: &RgbImage, b: &RgbImage, params: SsimParams) -> GapMatchResult<SsimMap> {
    SsimPlan::new(a, params)?.map(b)
}

/// Mean similarity between two same-shape RGB images.
pub fn mean_ssim(a: &RgbImage, b: &RgbImage, params: SsimParams) -> GapMatchResult<f32> {
    SsimPlan::new(a, params)?.score(b)
}
