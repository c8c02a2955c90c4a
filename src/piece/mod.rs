//! Piece trimming and alpha classification.
//!
//! The piece arrives with transparent margins. Trimming crops to the tight
//! box of pixels whose alpha exceeds the opacity threshold and records how
//! much was removed from the left and top, so search results in the trimmed
//! frame can be mapped back.

use crate::image::strip_alpha;
use crate::util::{GapMatchError, GapMatchResult};
use image::{imageops, RgbImage, RgbaImage};

/// Alpha at or below which a piece pixel is treated as transparent.
pub const DEFAULT_ALPHA_THRESHOLD: u8 = 200;

/// Per-pixel transparency of a trimmed piece.
///
/// `true` marks a pixel at or below the opacity threshold, which keeps the
/// piece's own color when compositing; `false` marks the opaque silhouette.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlphaMask {
    width: u32,
    height: u32,
    transparent: Vec<bool>,
}

impl AlphaMask {
    /// Classifies every pixel of `piece` against `threshold`.
    pub fn from_piece(piece: &RgbaImage, threshold: u8) -> Self {
        Self {
            width: piece.width(),
            height: piece.height(),
            transparent: piece.pixels().map(|p| p.0[3] <= threshold).collect(),
        }
    }

    /// Returns the mask width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the mask height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns true if `(x, y)` is transparent. Out-of-range pixels count as
    /// transparent.
    pub fn is_transparent(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return true;
        }
        self.transparent[(y * self.width + x) as usize]
    }

    /// Number of opaque pixels.
    pub fn opaque_count(&self) -> usize {
        self.transparent.iter().filter(|&&t| !t).count()
    }

    fn column_empty(&self, x: u32) -> bool {
        (0..self.height).all(|y| self.is_transparent(x, y))
    }

    fn row_empty(&self, y: u32) -> bool {
        (0..self.width).all(|x| self.is_transparent(x, y))
    }
}

/// Piece cropped to its opaque extent.
#[derive(Clone, Debug)]
pub struct TrimmedPiece {
    /// Columns removed from the left of the original piece.
    pub left: u32,
    /// Rows removed from the top of the original piece.
    pub up: u32,
    /// Cropped piece without alpha.
    pub rgb: RgbImage,
    /// Transparency of the cropped piece.
    pub mask: AlphaMask,
}

impl TrimmedPiece {
    /// Returns the cropped width.
    pub fn width(&self) -> u32 {
        self.rgb.width()
    }

    /// Returns the cropped height.
    pub fn height(&self) -> u32 {
        self.rgb.height()
    }
}

/// Inclusive opaque extent `(left, up, right, down)` of `piece`.
pub fn opaque_extent(piece: &RgbaImage, threshold: u8) -> Option<(u32, u32, u32, u32)> {
    let mask = AlphaMask::from_piece(piece, threshold);
    let left = (0..mask.width).find(|&x| !mask.column_empty(x))?;
    let right = (0..mask.width).rev().find(|&x| !mask.column_empty(x))?;
    let up = (0..mask.height).find(|&y| !mask.row_empty(y))?;
    let down = (0..mask.height).rev().find(|&y| !mask.row_empty(y))?;
    Some((left, up, right, down))
}

/// Crops `piece` to the pixels whose alpha exceeds `threshold`.
///
/// Fails with `DegeneratePiece` when no pixel is opaque.
pub fn trim_piece(piece: &RgbaImage, threshold: u8) -> GapMatchResult<TrimmedPiece> {
    let (left, up, cropped) = trim_piece_rgba(piece, threshold)?;
    Ok(TrimmedPiece {
        left,
        up,
        rgb: strip_alpha(&cropped),
        mask: AlphaMask::from_piece(&cropped, threshold),
    })
}

/// Crops `piece` like [`trim_piece`] but keeps the alpha channel.
pub fn trim_piece_rgba(piece: &RgbaImage, threshold: u8) -> GapMatchResult<(u32, u32, RgbaImage)> {
    let (left, up, right, down) =
        opaque_extent(piece, threshold).ok_or(GapMatchError::DegeneratePiece {
            width: piece.width(),
            height: piece.height(),
        })?;
    let cropped =
        imageops::crop_imm(piece, left, up, right - left + 1, down - up + 1).to_image();
    Ok((left, up, cropped))
}
