//! Expanding-radius search around the rough box.
//!
//! Each round widens the rough box by the next radius step and scores every
//! placement that fits the widened window. Rounds share a score cache, so a
//! placement is evaluated at most once per search. The first round with an
//! acceptable placement ends the search.

use crate::metric::SsimPlan;
use crate::piece::TrimmedPiece;
use crate::region::BoundingBox;
use crate::search::scan::score_offsets;
use crate::search::SearchConfig;
use crate::trace::{trace_event, trace_span};
use crate::util::GapMatchResult;
use image::RgbImage;
use std::collections::HashMap;

/// Scores of evaluated placements keyed by top-left `(x, y)` in the
/// background frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScoreCache {
    scores: HashMap<(u32, u32), f32>,
}

impl ScoreCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached placements.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Returns true if nothing has been scored yet.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Cached score at `(x, y)`.
    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        self.scores.get(&(x, y)).copied()
    }

    /// Returns true if `(x, y)` has been scored.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        self.scores.contains_key(&(x, y))
    }

    /// Iterates over cached `((x, y), score)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = ((u32, u32), f32)> + '_ {
        self.scores.iter().map(|(&k, &v)| (k, v))
    }

    fn insert(&mut self, x: u32, y: u32, score: f32) {
        self.scores.insert((x, y), score);
    }
}

/// Best placement in the trimmed piece's frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    /// Left edge of the trimmed piece in the background.
    pub x: u32,
    /// Top edge of the trimmed piece in the background.
    pub y: u32,
    /// Mean structural similarity of the placement.
    pub score: f32,
    /// Radius step of the round that accepted it.
    pub radius: u32,
}

/// Result of [`refine_search`].
#[derive(Clone, Debug, PartialEq)]
pub struct SearchOutcome {
    /// Accepted placement, or `None` when every round came up empty.
    pub best: Option<Candidate>,
    /// Search window of every round that ran, in order.
    pub windows: Vec<BoundingBox>,
    /// Placements scored during this call (cache hits excluded).
    pub evaluated: usize,
}

impl SearchOutcome {
    /// Number of rounds that ran.
    pub fn rounds(&self) -> usize {
        self.windows.len()
    }
}

/// Searches for the trimmed piece around `rough`.
///
/// `cache` may carry scores from earlier calls with the same piece and
/// background; they are reused rather than recomputed.
pub fn refine_search(
    piece: &TrimmedPiece,
    background: &RgbImage,
    rough: BoundingBox,
    cfg: &SearchConfig,
    cache: &mut ScoreCache,
) -> GapMatchResult<SearchOutcome> {
    cfg.validate()?;
    let plan = SsimPlan::new(&piece.rgb, cfg.ssim)?;
    let (width, height) = background.dimensions();
    let (pw, ph) = piece.rgb.dimensions();

    let _span = trace_span!(
        "refine_search",
        piece_width = pw,
        piece_height = ph,
        rounds = cfg.radius_steps.len()
    )
    .entered();

    let mut windows = Vec::with_capacity(cfg.radius_steps.len());
    let mut evaluated = 0usize;
    for &radius in &cfg.radius_steps {
        let _round = trace_span!("search_round", radius = radius).entered();
        let window = rough.expand(radius, width, height);
        windows.push(window);

        let placements: Vec<(u32, u32)> = window.placements(pw, ph).collect();
        let pending: Vec<(u32, u32)> = placements
            .iter()
            .copied()
            .filter(|&(x, y)| !cache.contains(x, y))
            .collect();
        let scores = score_offsets(&plan, piece, background, &pending, cfg.parallel)?;
        for (&(x, y), score) in pending.iter().zip(scores) {
            cache.insert(x, y, score);
        }
        evaluated += pending.len();

        let best = best_accepted(&placements, cache, cfg.accept_score, radius);
        trace_event!(
            "search_round_done",
            radius = radius,
            placements = placements.len(),
            scored = pending.len(),
            accepted = best.is_some()
        );
        if let Some(best) = best {
            trace_event!(
                "search_match",
                x = best.x,
                y = best.y,
                score = best.score as f64
            );
            return Ok(SearchOutcome {
                best: Some(best),
                windows,
                evaluated,
            });
        }
    }

    Ok(SearchOutcome {
        best: None,
        windows,
        evaluated,
    })
}

/// Highest-scoring placement at or above `accept`; ties keep the earliest.
fn best_accepted(
    placements: &[(u32, u32)],
    cache: &ScoreCache,
    accept: f32,
    radius: u32,
) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;
    for &(x, y) in placements {
        let Some(score) = cache.get(x, y) else {
            continue;
        };
        if score.is_nan() || score < accept {
            continue;
        }
        if best.map_or(true, |b| score > b.score) {
            best = Some(Candidate {
                x,
                y,
                score,
                radius,
            });
        }
    }
    best
}
