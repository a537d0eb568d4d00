//! Normalization curves shared by the category scorers.
//!
//! All functions return unrounded sub-scores; rounding and clamping happen
//! once per category.

use crate::analyzers::types::AmenityMetric;
use crate::scoring::profile::{Component, DistanceFallback, Excellence};

/// Observed count relative to the expected count, scaled to 100 and capped.
pub fn density_score(count: f64, expected: f64) -> f64 {
    (count / expected * 100.0).min(100.0)
}

/// Linear falloff from 100 at distance 0 to 0 at `max_distance`, floored at 0.
pub fn distance_score(distance: f64, max_distance: f64) -> f64 {
    (100.0 - (distance / max_distance) * 100.0).max(0.0)
}

/// Extra points for the part of `ratio` above the excellence threshold.
pub fn excess_bonus(ratio: f64, excellence: &Excellence) -> f64 {
    if ratio <= excellence.ratio_threshold {
        return 0.0;
    }
    ((ratio - excellence.ratio_threshold) * excellence.points_per_ratio).min(excellence.max_points)
}

impl Component {
    /// Observed / expected.
    pub fn ratio(&self, metric: &AmenityMetric) -> f64 {
        metric.count as f64 / self.expected_count
    }

    pub fn density(&self, metric: &AmenityMetric) -> f64 {
        density_score(metric.count as f64, self.expected_count)
    }

    /// Distance sub-score; an unknown or zero mean distance uses the fallback
    /// rather than scoring a perfect 100.
    pub fn distance(&self, metric: &AmenityMetric) -> f64 {
        match metric.mean_distance().filter(|d| *d > 0.0) {
            Some(d) => distance_score(d, self.max_distance),
            None => match self.fallback {
                DistanceFallback::Meters(m) => distance_score(m, self.max_distance),
                DistanceFallback::Score(s) => s,
            },
        }
    }

    /// Weighted density + distance blend.
    pub fn blend(&self, metric: &AmenityMetric) -> f64 {
        self.density(metric) * self.density_weight + self.distance(metric) * self.distance_weight
    }

    /// Excess-ratio bonus, 0 when the component has none.
    pub fn bonus(&self, metric: &AmenityMetric) -> f64 {
        self.excellence
            .as_ref()
            .map_or(0.0, |e| excess_bonus(self.ratio(metric), e))
    }
}
