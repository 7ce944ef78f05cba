//! Binarisation cutoff for a frame.
//!
//! The cutoff is an 8-bit intensity; pixels strictly above it are foreground.
//! Automatic methods work on the 256-bin histogram of the 8-bit frame, the
//! manual policy picks the intensity at a percentile of the pixel values.


mod methods;

use common::Buffer2;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::config::ThresholdPolicy;

pub type Histogram = [u64; 256];

/// Histogram thresholding method.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum ThresholdMethod {
    /// Iterative intermeans, variant of IsoData that ignores the extreme bins.
    Default,
    /// Minimum fuzzy entropy.
    Huang,
    /// Midpoint of the two peaks of the smoothed histogram.
    Intermodes,
    /// Ridler & Calvard iterative selection.
    IsoData,
    /// Minimum cross entropy.
    Li,
    /// Kapur maximum entropy.
    MaxEntropy,
    /// Mean intensity.
    Mean,
    /// Valley between the two peaks of the smoothed histogram.
    Minimum,
    /// Moment preserving.
    Moments,
    Otsu,
    /// Half of the pixels above the cutoff.
    Percentile,
    Triangle,
    Yen,
}

impl ThresholdMethod {
    /// Apply the method to a histogram. `None` when it finds no cutoff,
    /// e.g. a histogram that never becomes bimodal.
    pub fn apply(self, histogram: &Histogram) -> Option<u8> {
        let level = match self {
            Self::Default => methods::ij_iso_data(histogram),
            Self::Huang => methods::huang(histogram),
            Self::Intermodes => methods::intermodes(histogram),
            Self::IsoData => methods::iso_data(histogram),
            Self::Li => methods::li(histogram),
            Self::MaxEntropy => methods::max_entropy(histogram),
            Self::Mean => methods::mean(histogram),
            Self::Minimum => methods::minimum(histogram),
            Self::Moments => methods::moments(histogram),
            Self::Otsu => methods::otsu(histogram),
            Self::Percentile => methods::percentile(histogram),
            Self::Triangle => methods::triangle(histogram),
            Self::Yen => methods::yen(histogram),
        }?;
        Some(level.min(255) as u8)
    }
}

/// 256-bin histogram of an 8-bit frame. Samples are rounded and clamped.
pub fn histogram(gray: &Buffer2<f32>) -> Histogram {
    let mut hist = [0u64; 256];
    for &v in gray.iter() {
        hist[v.round().clamp(0.0, 255.0) as usize] += 1;
    }
    hist
}

/// Intensity at `percentile` (0..=100) of the pixel distribution, nearest rank.
pub fn percentile_threshold(histogram: &Histogram, percentile: f64) -> u8 {
    let total: u64 = histogram.iter().sum();
    if total == 0 {
        return 0;
    }
    let rank = ((percentile / 100.0).clamp(0.0, 1.0) * (total - 1) as f64).round() as u64;
    let mut cumulative = 0u64;
    for (level, &count) in histogram.iter().enumerate() {
        cumulative += count;
        if cumulative > rank {
            return level as u8;
        }
    }
    255
}

/// Binarisation cutoff of an 8-bit frame under `policy`.
///
/// An automatic method that finds no cutoff falls back to [`ThresholdMethod::Default`].
pub fn estimate_threshold(gray: &Buffer2<f32>, policy: &ThresholdPolicy) -> u8 {
    let hist = histogram(gray);
    let threshold = match *policy {
        ThresholdPolicy::Percentile { percentile } => percentile_threshold(&hist, percentile),
        ThresholdPolicy::Auto { method } => match method.apply(&hist) {
            Some(level) => level,
            None => {
                tracing::warn!(%method, "Threshold method found no cutoff, using Default");
                ThresholdMethod::Default.apply(&hist).unwrap_or(128)
            }
        },
    };
    tracing::debug!(threshold, ?policy, "Estimated frame threshold");
    threshold
}
