//! Scoring of individual placements.

use crate::metric::SsimPlan;
use crate::piece::TrimmedPiece;
use crate::util::{GapMatchError, GapMatchResult};
use image::RgbImage;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Composites the piece over the background window at `(x, y)`.
///
/// Transparent piece pixels keep the piece's own color; the silhouette takes
/// the background, so a perfect fit reproduces the piece exactly.
pub fn composite_at(
    piece: &TrimmedPiece,
    background: &RgbImage,
    x: u32,
    y: u32,
) -> GapMatchResult<RgbImage> {
    let (pw, ph) = piece.rgb.dimensions();
    let fits_x = x.checked_add(pw).is_some_and(|end| end <= background.width());
    let fits_y = y.checked_add(ph).is_some_and(|end| end <= background.height());
    if !(fits_x && fits_y) {
        return Err(GapMatchError::InvalidInput("placement exceeds background"));
    }
    Ok(RgbImage::from_fn(pw, ph, |px, py| {
        if piece.mask.is_transparent(px, py) {
            *piece.rgb.get_pixel(px, py)
        } else {
            *background.get_pixel(x + px, y + py)
        }
    }))
}

/// Similarity of the composite at `(x, y)` against the piece.
pub fn score_at(
    plan: &SsimPlan,
    piece: &TrimmedPiece,
    background: &RgbImage,
    x: u32,
    y: u32,
) -> GapMatchResult<f32> {
    plan.score(&composite_at(piece, background, x, y)?)
}

/// Scores `offsets` in order, in parallel when requested and available.
pub(crate) fn score_offsets(
    plan: &SsimPlan,
    piece: &TrimmedPiece,
    background: &RgbImage,
    offsets: &[(u32, u32)],
    parallel: bool,
) -> GapMatchResult<Vec<f32>> {
    if parallel {
        return score_offsets_par(plan, piece, background, offsets);
    }
    offsets
        .iter()
        .map(|&(x, y)| score_at(plan, piece, background, x, y))
        .collect()
}

#[cfg(feature = "rayon")]
fn score_offsets_par(
    plan: &SsimPlan,
    piece: &TrimmedPiece,
    background: &RgbImage,
    offsets: &[(u32, u32)],
) -> GapMatchResult<Vec<f32>> {
    offsets
        .par_iter()
        .map(|&(x, y)| score_at(plan, piece, background, x, y))
        .collect()
}

#[cfg(not(feature = "rayon"))]
fn score_offsets_par(
    plan: &SsimPlan,
    piece: &TrimmedPiece,
    background: &RgbImage,
    offsets: &[(u32, u32)],
) -> GapMatchResult<Vec<f32>> {
    score_offsets(plan, piece, background, offsets, false)
}
