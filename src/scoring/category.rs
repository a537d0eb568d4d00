//! The six category scorers.
//!
//! Each maps typed metrics and a tier to an integer in 0..=100. Missing
//! optional metrics fall back to the profile's calibrated defaults; only
//! malformed (negative or non-finite) inputs are errors.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::debug;

use crate::analyzers::types::{
    AmenityMetric, CommerceMetrics, EducationMetrics, HealthMetrics, LocalityMetrics,
    PublicServicesMetrics, TransportMetrics, WorkMetrics,
};
use crate::analyzers::utility::clamp_score;
use crate::error::{Result, ScoreError};
use crate::scoring::curves::excess_bonus;
use crate::scoring::profile::{ScoringProfile, TierThresholds};
use crate::tier::CityTier;

/// Scoring dimension.
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
pub enum Category {
    Work,
    Transport,
    #[serde(rename = "Public Services")]
    #[strum(to_string = "Public Services", serialize = "PublicServices")]
    PublicServices,
    Education,
    Commerce,
    Health,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Work,
        Category::Transport,
        Category::PublicServices,
        Category::Education,
        Category::Commerce,
        Category::Health,
    ];
}

fn check(field: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ScoreError::InvalidMetric { field, value })
    }
}

fn check_amenity(field: &'static str, metric: &AmenityMetric) -> Result<()> {
    check(field, metric.average_distance).map(|_| ())
}

/// Scores categories against one calibration profile.
#[derive(Debug, Clone, Copy)]
pub struct CategoryScorer<'a> {
    profile: &'a ScoringProfile,
}

impl<'a> CategoryScorer<'a> {
    pub fn new(profile: &'a ScoringProfile) -> Self {
        Self { profile }
    }

    fn thresholds(&self, tier: CityTier) -> Result<&'a TierThresholds> {
        self.profile.thresholds(tier)
    }

    /// Scores one category from the full metrics bag.
    pub fn score(&self, category: Category, metrics: &LocalityMetrics, tier: CityTier) -> Result<u8> {
        let score = match category {
            Category::Work => self.work(&metrics.work, tier),
            Category::Transport => self.transport(&metrics.transport, tier),
            Category::PublicServices => self.public_services(&metrics.public_services, tier),
            Category::Education => self.education(&metrics.education, tier),
            Category::Commerce => self.commerce(&metrics.commerce, tier),
            Category::Health => self.health(&metrics.health, tier),
        }?;
        debug!(%category, %tier, score, "Scored category");
        Ok(score)
    }

    /// Unemployment penalty blended with job offer density.
    ///
    /// Job offer density is offers in the department per hundred inhabitants
    /// of the commune.
    pub fn work(&self, m: &WorkMetrics, tier: CityTier) -> Result<u8> {
        let t = &self.thresholds(tier)?.work;

        let rate = match m.unemployment_rate {
            Some(rate) => check("unemployment_rate", rate)?,
            None => t.fallback_unemployment_rate,
        };
        let unemployment_score = (100.0 - rate * t.unemployment_slope).max(0.0);

        let job_density = match (m.job_offers, m.population) {
            (Some(offers), Some(population)) if population > 0 => {
                Some(offers as f64 / (population as f64 / 100.0))
            }
            _ => None,
        };
        let job_score = job_density
            .map(|d| (d * t.job_offer_factor).min(100.0))
            .unwrap_or(t.fallback_job_score);
        let bonus = match (job_density, &t.excellence) {
            (Some(d), Some(e)) => excess_bonus(d, e),
            _ => 0.0,
        };

        Ok(clamp_score(
            unemployment_score * t.unemployment_weight + job_score * t.job_weight + bonus,
        ))
    }

    /// Stop density and distance, plus a flat bonus when a train station is nearby.
    pub fn transport(&self, m: &TransportMetrics, tier: CityTier) -> Result<u8> {
        let t = &self.thresholds(tier)?.transport;
        check_amenity("transport_average_distance", &m.transport)?;

        let train_bonus = if m.train_stations > 0 { t.train_bonus } else { 0.0 };
        Ok(clamp_score(
            t.transport.blend(&m.transport) + t.transport.bonus(&m.transport) + train_bonus,
        ))
    }

    pub fn public_services(&self, m: &PublicServicesMetrics, tier: CityTier) -> Result<u8> {
        let c = &self.thresholds(tier)?.public_services.services;
        check_amenity("public_services_average_distance", &m.services)?;

        Ok(clamp_score(c.blend(&m.services) + c.bonus(&m.services)))
    }

    /// School density and distance; when occupancy data exists a capacity
    /// sub-score takes part of the weight.
    pub fn education(&self, m: &EducationMetrics, tier: CityTier) -> Result<u8> {
        let t = &self.thresholds(tier)?.education;
        check_amenity("school_average_distance", &m.schools)?;

        let c = &t.schools;
        let base = match &m.load {
            Some(load) if load.total_schools > 0 => {
                let capacity_score = load
                    .histogram
                    .iter()
                    .map(|(status, count)| {
                        *count as f64 * t.capacity_points.get(status).copied().unwrap_or(0.0)
                    })
                    .sum::<f64>()
                    / load.total_schools as f64;
                c.density(&m.schools) * t.loaded_density_weight
                    + c.distance(&m.schools) * t.loaded_distance_weight
                    + capacity_score * t.capacity_weight
            }
            _ => c.blend(&m.schools),
        };

        Ok(clamp_score(base + c.bonus(&m.schools)))
    }

    /// Shops (restaurants) and food stores, each with density and distance.
    pub fn commerce(&self, m: &CommerceMetrics, tier: CityTier) -> Result<u8> {
        let t = &self.thresholds(tier)?.commerce;
        check_amenity("shop_average_distance", &m.shops)?;
        check_amenity("food_store_average_distance", &m.food_stores)?;

        let score = t.shops.blend(&m.shops)
            + t.food_stores.blend(&m.food_stores)
            + t.shops.bonus(&m.shops)
            + t.food_stores.bonus(&m.food_stores);
        Ok(clamp_score(score))
    }

    pub fn health(&self, m: &HealthMetrics, tier: CityTier) -> Result<u8> {
        let t = &self.thresholds(tier)?.health;
        check_amenity("healthcare_average_distance", &m.healthcare)?;
        check_amenity("hospital_average_distance", &m.hospitals)?;

        let healthcare = t.healthcare.blend(&m.healthcare) + t.healthcare.bonus(&m.healthcare);
        let score = match &t.hospital {
            Some(blend) => {
                let hospital = blend.hospital.blend(&m.hospitals) + blend.hospital.bonus(&m.hospitals);
                healthcare * blend.healthcare_share + hospital * blend.hospital_share
            }
            None => healthcare,
        };
        Ok(clamp_score(score))
    }
}
