//! Gap localization pipeline.
//!
//! [`GapLocator`] runs the rough locator and the piece trimmer, then the
//! expanding-radius search, and maps the result back to the untrimmed piece
//! frame.

pub(crate) mod refine;
pub(crate) mod scan;

use crate::image::ensure_same_shape;
use crate::metric::SsimParams;
use crate::piece::{trim_piece, DEFAULT_ALPHA_THRESHOLD};
use crate::region::{BoundingBox, RoughBounds};
use crate::rough::{rough_locate, RoughConfig};
use crate::trace::{trace_event, trace_span};
use crate::util::{GapMatchError, GapMatchResult};
use image::{RgbImage, RgbaImage};

pub use refine::{refine_search, Candidate, ScoreCache, SearchOutcome};
pub use scan::{composite_at, score_at};

/// Radius steps of the default escalation schedule.
pub const DEFAULT_RADIUS_STEPS: [u32; 5] = [3, 5, 9, 14, 20];

/// Configuration of the refined search.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchConfig {
    /// Minimum similarity a placement needs to be accepted.
    pub accept_score: f32,
    /// Increasing margins added around the rough box, one per round.
    pub radius_steps: Vec<u32>,
    /// Similarity metric parameters.
    pub ssim: SsimParams,
    /// Score the placements of a round in parallel (requires `rayon`).
    pub parallel: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            accept_score: 0.5,
            radius_steps: DEFAULT_RADIUS_STEPS.to_vec(),
            ssim: SsimParams::default(),
            parallel: false,
        }
    }
}

impl SearchConfig {
    pub(crate) fn validate(&self) -> GapMatchResult<()> {
        if self.radius_steps.is_empty() {
            return Err(GapMatchError::InvalidInput("radius schedule is empty"));
        }
        if self.radius_steps.windows(2).any(|w| w[1] <= w[0]) {
            return Err(GapMatchError::InvalidInput("radius steps must increase"));
        }
        if !(self.accept_score.is_finite() && (-1.0..=1.0).contains(&self.accept_score)) {
            return Err(GapMatchError::InvalidInput(
                "acceptance score must lie in [-1, 1]",
            ));
        }
        self.ssim.validate()
    }
}

/// Configuration of the whole pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct LocateConfig {
    /// Alpha at or below which piece pixels are transparent.
    pub alpha_threshold: u8,
    /// Rough locator settings.
    pub rough: RoughConfig,
    /// Refined search settings.
    pub search: SearchConfig,
}

impl Default for LocateConfig {
    fn default() -> Self {
        Self {
            alpha_threshold: DEFAULT_ALPHA_THRESHOLD,
            rough: RoughConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl LocateConfig {
    /// Checks every parameter without touching any image.
    pub fn validate(&self) -> GapMatchResult<()> {
        self.rough.validate()?;
        self.search.validate()
    }
}

/// Located gap in the original piece's frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Location {
    /// Background column of the untrimmed piece's left edge.
    pub x: i64,
    /// Background row of the untrimmed piece's top edge.
    pub y: i64,
    /// Similarity of the accepted placement.
    pub score: f32,
    /// Radius step that produced the match.
    pub radius: u32,
}

/// Everything a locate call found out.
#[derive(Clone, Debug, PartialEq)]
pub struct LocateReport {
    /// Accepted location, or `None` when the search was exhausted.
    pub location: Option<Location>,
    /// Raw sides from the rough locator.
    pub rough: RoughBounds,
    /// Rough box after clamping, the center of every search window.
    pub search_box: BoundingBox,
    /// Search window of every round that ran.
    pub windows: Vec<BoundingBox>,
    /// Columns and rows trimmed from the piece's left and top.
    pub trim: (u32, u32),
    /// Size of the trimmed piece.
    pub trimmed_size: (u32, u32),
    /// Number of placements scored.
    pub evaluated: usize,
}

impl LocateReport {
    /// Horizontal offset of the gap, or `-1` when nothing was accepted.
    pub fn offset_x(&self) -> i64 {
        self.location.map_or(-1, |loc| loc.x)
    }
}

/// Gap locator with a fixed configuration.
#[derive(Clone, Debug, Default)]
pub struct GapLocator {
    cfg: LocateConfig,
}

impl GapLocator {
    /// Creates a locator with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, cfg: LocateConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &LocateConfig {
        &self.cfg
    }

    /// Locates the piece in `full_bg`.
    pub fn locate(
        &self,
        full_bg: &RgbImage,
        gap_bg: &RgbImage,
        piece: &RgbaImage,
    ) -> GapMatchResult<LocateReport> {
        locate(full_bg, gap_bg, piece, &self.cfg)
    }

    /// Horizontal offset of the gap, `-1` if no placement was accepted.
    pub fn locate_offset_x(
        &self,
        full_bg: &RgbImage,
        gap_bg: &RgbImage,
        piece: &RgbaImage,
    ) -> GapMatchResult<i64> {
        Ok(self.locate(full_bg, gap_bg, piece)?.offset_x())
    }
}

/// Runs the full pipeline with `cfg`.
pub fn locate(
    full_bg: &RgbImage,
    gap_bg: &RgbImage,
    piece: &RgbaImage,
    cfg: &LocateConfig,
) -> GapMatchResult<LocateReport> {
    cfg.validate()?;
    let (width, height) = ensure_same_shape(full_bg, gap_bg)?;
    let _span = trace_span!("locate", width = width, height = height).entered();

    let trimmed = trim_piece(piece, cfg.alpha_threshold)?;
    trace_event!(
        "piece_trimmed",
        left = trimmed.left,
        up = trimmed.up,
        width = trimmed.width(),
        height = trimmed.height()
    );

    let rough = rough_locate(full_bg, gap_bg, &cfg.rough)?;
    let search_box = rough.clamp(width, height);

    let mut cache = ScoreCache::new();
    let outcome = refine_search(&trimmed, full_bg, search_box, &cfg.search, &mut cache)?;

    let location = outcome.best.map(|best| Location {
        x: i64::from(best.x) - i64::from(trimmed.left),
        y: i64::from(best.y) - i64::from(trimmed.up),
        score: best.score,
        radius: best.radius,
    });
    if location.is_none() {
        trace_event!("search_exhausted", rounds = outcome.rounds());
    }

    Ok(LocateReport {
        location,
        rough,
        search_box,
        windows: outcome.windows,
        trim: (trimmed.left, trimmed.up),
        trimmed_size: (trimmed.width(), trimmed.height()),
        evaluated: outcome.evaluated,
    })
}
