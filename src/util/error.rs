//! Error types for gapmatch.

use thiserror::Error;

/// Result alias for gapmatch operations.
pub type GapMatchResult<T> = std::result::Result<T, GapMatchError>;

/// Errors that can occur while locating a gap.
///
/// A rough box with missing sides and a search that finds no acceptable
/// placement are not errors; they surface in [`crate::RoughBounds`] and as a
/// missing [`crate::Location`] respectively.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GapMatchError {
    /// The full background and the gap background differ in size.
    #[error("background shapes differ: full {full:?}, gap {gap:?}")]
    ShapeMismatch {
        /// `(width, height)` of the full background.
        full: (u32, u32),
        /// `(width, height)` of the gap background.
        gap: (u32, u32),
    },
    /// An image with zero width or height was supplied.
    #[error("empty image: {width}x{height}")]
    EmptyImage { width: u32, height: u32 },
    /// The piece has no pixel above the opacity threshold.
    #[error("piece {width}x{height} has no opaque pixels")]
    DegeneratePiece { width: u32, height: u32 },
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// Image decoding or encoding failed.
    #[error("image io error: {reason}")]
    ImageIo { reason: String },
}
