//! Gapmatch locates the gap of a slider puzzle in its background image.
//!
//! The pipeline takes the full background, the background with the gap cut
//! out and the RGBA piece. A structural-similarity difference of the two
//! backgrounds gives a rough box; the piece is trimmed to its opaque extent
//! and searched for in rings of growing radius around that box. Optional
//! parallel scoring is available via the `rayon` feature.
//!
//! ```no_run
//! # fn run(full: image::RgbImage, gap: image::RgbImage, piece: image::RgbaImage)
//! # -> gapmatch::GapMatchResult<()> {
//! let locator = gapmatch::GapLocator::new();
//! let report = locator.locate(&full, &gap, &piece)?;
//! println!("gap starts at x = {}", report.offset_x());
//! # Ok(())
//! # }
//! ```

pub mod image;
pub mod metric;
pub mod overlay;
pub mod piece;
pub mod region;
pub mod rough;
pub mod search;
mod trace;
pub mod util;

#[cfg(feature = "image-io")]
pub use self::image::io;

pub use metric::{mean_ssim, ssim_map, SsimMap, SsimParams, SsimPlan};
pub use overlay::{render_overlay, OverlayStyle};
pub use piece::{trim_piece, AlphaMask, TrimmedPiece, DEFAULT_ALPHA_THRESHOLD};
pub use region::{BoundingBox, RoughBounds};
pub use rough::{rough_locate, RoughConfig};
pub use search::{
    locate, refine_search, Candidate, GapLocator, LocateConfig, LocateReport, Location,
    ScoreCache, SearchConfig, SearchOutcome, DEFAULT_RADIUS_STEPS,
};
pub use util::{GapMatchError, GapMatchResult};
