//! Image similarity metrics.

pub(crate) mod filter;
pub mod ssim;

pub use ssim::{mean_ssim, ssim_map, SsimMap, SsimParams, SsimPlan};
