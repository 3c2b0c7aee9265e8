//! Summary statistics for the study area.
//!
//! The retrieval service does not report these yet, so every value is a fixed
//! stand-in tagged as a placeholder. Callers must check
//! [`Statistic::is_placeholder`] before presenting a value as real data.

use serde::{Deserialize, Serialize};

// TODO: replace with server-computed values once the time-series response carries pixel statistics.
pub const PLACEHOLDER_NUMBER_OF_PIXELS: f64 = 42.0;
pub const PLACEHOLDER_MEAN: f64 = 24.5;
pub const PLACEHOLDER_MEDIAN: f64 = 13.0;
pub const PLACEHOLDER_STD_DEV: f64 = 36.2;

/// A statistic that may not have been computed yet
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Statistic {
    /// A stand-in value, not derived from data
    Placeholder(f64),
    /// A value computed from the data
    Computed(f64),
}

impl Statistic {
    pub fn value(&self) -> f64 {
        match self {
            Statistic::Placeholder(v) | Statistic::Computed(v) => *v,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Statistic::Placeholder(_))
    }

    /// Scale by a factor. Placeholders stay placeholders.
    pub fn scale(&self, factor: f64) -> Statistic {
        match self {
            Statistic::Placeholder(v) => Statistic::Placeholder(v * factor),
            Statistic::Computed(v) => Statistic::Computed(v * factor),
        }
    }
}

/// All summary statistics shown for a study area
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStatistics {
    pub pixel_area: Statistic,
    pub number_of_pixels: Statistic,
    pub mean: Statistic,
    pub median: Statistic,
    pub std_dev: Statistic,
}

impl SummaryStatistics {
    /// The placeholder statistics for a given area per pixel
    pub fn placeholder(area_per_pixel: f64) -> Self {
        let number_of_pixels = Statistic::Placeholder(PLACEHOLDER_NUMBER_OF_PIXELS);
        Self {
            pixel_area: number_of_pixels.scale(area_per_pixel),
            number_of_pixels,
            mean: Statistic::Placeholder(PLACEHOLDER_MEAN),
            median: Statistic::Placeholder(PLACEHOLDER_MEDIAN),
            std_dev: Statistic::Placeholder(PLACEHOLDER_STD_DEV),
        }
    }
}
