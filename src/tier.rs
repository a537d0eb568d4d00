//! City size classification.
//!
//! Every threshold table downstream is keyed by [`CityTier`], so a locality
//! without a tier cannot be scored against tier tables.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::debug;

use crate::error::{Result, ScoreError};

/// Ordered city size tier, smallest first.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum CityTier {
    Village,
    SmallTown,
    MidTown,
    LargeCity,
    Metropolis,
}

impl CityTier {
    pub const ALL: [CityTier; 5] = [
        CityTier::Village,
        CityTier::SmallTown,
        CityTier::MidTown,
        CityTier::LargeCity,
        CityTier::Metropolis,
    ];

    /// Classifies a locality from known population and density.
    ///
    /// | Rule (first match wins)             | Tier       |
    /// |-------------------------------------|------------|
    /// | pop < 2 000 and density < 150       | Village    |
    /// | pop < 20 000 and density < 500      | SmallTown  |
    /// | pop < 100 000 and density < 2 000   | MidTown    |
    /// | pop < 500 000                       | LargeCity  |
    /// | otherwise                           | Metropolis |
    pub fn classify(population: u64, density: f64) -> CityTier {
        match (population, density) {
            (p, d) if p < 2_000 && d < 150.0 => CityTier::Village,
            (p, d) if p < 20_000 && d < 500.0 => CityTier::SmallTown,
            (p, d) if p < 100_000 && d < 2_000.0 => CityTier::MidTown,
            (p, _) if p < 500_000 => CityTier::LargeCity,
            _ => CityTier::Metropolis,
        }
    }
}

/// Classifies a locality whose facts may be incomplete.
///
/// # Errors
///
/// [`ScoreError::MissingData`] if population or density is unknown, and
/// [`ScoreError::InvalidMetric`] if density is negative or not finite.
pub fn classify_tier(population: Option<u64>, density: Option<f64>) -> Result<CityTier> {
    let population = population.ok_or(ScoreError::MissingData { field: "population" })?;
    let density = density.ok_or(ScoreError::MissingData { field: "density" })?;

    if !density.is_finite() || density < 0.0 {
        return Err(ScoreError::InvalidMetric {
            field: "density",
            value: density,
        });
    }

    let tier = CityTier::classify(population, density);
    debug!(population, density, %tier, "Classified locality");
    Ok(tier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_each_branch() {
        assert_eq!(CityTier::classify(1_500, 100.0), CityTier::Village);
        assert_eq!(CityTier::classify(15_000, 300.0), CityTier::SmallTown);
        assert_eq!(CityTier::classify(80_000, 1_500.0), CityTier::MidTown);
        assert_eq!(CityTier::classify(300_000, 4_000.0), CityTier::LargeCity);
        assert_eq!(CityTier::classify(2_161_000, 20_000.0), CityTier::Metropolis);
    }

    #[test]
    fn test_boundaries_fall_into_next_branch() {
        assert_eq!(CityTier::classify(2_000, 100.0), CityTier::SmallTown);
        assert_eq!(CityTier::classify(1_000, 150.0), CityTier::SmallTown);
        assert_eq!(CityTier::classify(20_000, 100.0), CityTier::MidTown);
        assert_eq!(CityTier::classify(10_000, 500.0), CityTier::MidTown);
        assert_eq!(CityTier::classify(100_000, 100.0), CityTier::LargeCity);
        assert_eq!(CityTier::classify(50_000, 2_000.0), CityTier::LargeCity);
        assert_eq!(CityTier::classify(500_000, 100.0), CityTier::Metropolis);
    }

    #[test]
    fn test_dense_small_commune_is_large_city() {
        // Density alone pushes a small commune past the first three rules.
        assert_eq!(CityTier::classify(1_000, 5_000.0), CityTier::LargeCity);
    }

    #[test]
    fn test_classify_tier_requires_both_facts() {
        assert_eq!(
            classify_tier(None, Some(100.0)),
            Err(ScoreError::MissingData { field: "population" })
        );
        assert_eq!(
            classify_tier(Some(1_500), None),
            Err(ScoreError::MissingData { field: "density" })
        );
        assert_eq!(classify_tier(Some(1_500), Some(100.0)), Ok(CityTier::Village));
    }

    #[test]
    fn test_classify_tier_rejects_nan_density() {
        assert!(matches!(
            classify_tier(Some(1_500), Some(f64::NAN)),
            Err(ScoreError::InvalidMetric { field: "density", .. })
        ));
    }

    #[test]
    fn test_tier_parses_case_insensitively() {
        assert_eq!("metropolis".parse::<CityTier>().ok(), Some(CityTier::Metropolis));
        assert_eq!("SmallTown".parse::<CityTier>().ok(), Some(CityTier::SmallTown));
        assert!(CityTier::Village < CityTier::Metropolis);
    }
}
