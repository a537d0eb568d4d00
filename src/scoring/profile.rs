//! Calibration profiles: category weights and per-tier threshold tables.
//!
//! A profile is plain data. It is validated once when constructed and then
//! handed to the scorers, which never consult any other source of constants.

use anyhow::{Context, Result as AnyResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumString};

use crate::analyzers::types::OccupancyStatus;
use crate::error::{Result, ScoreError};
use crate::scoring::profiles;
use crate::tier::CityTier;

const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Largest composite excellence bonus a profile may award.
pub const MAX_COMPOSITE_BONUS: f64 = 10.0;

/// Built-in calibration profiles.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ProfileName {
    /// Current calibration with excess-ratio and composite excellence bonuses.
    Excellence,
    /// First formula set: flat per-tier tables, 25 point train bonus.
    Legacy,
    /// Second formula set: fixed distance scales, clinic/hospital split.
    Revised,
}

impl ProfileName {
    pub const ALL: [ProfileName; 3] = [
        ProfileName::Excellence,
        ProfileName::Legacy,
        ProfileName::Revised,
    ];
}

/// Share of each category in the global score. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryWeights {
    pub work: f64,
    pub transport: f64,
    pub public_services: f64,
    pub education: f64,
    pub commerce: f64,
    pub health: f64,
}

impl CategoryWeights {
    pub fn sum(&self) -> f64 {
        self.work + self.transport + self.public_services + self.education + self.commerce + self.health
    }

    fn values(&self) -> [(&'static str, f64); 6] {
        [
            ("work", self.work),
            ("transport", self.transport),
            ("public_services", self.public_services),
            ("education", self.education),
            ("commerce", self.commerce),
            ("health", self.health),
        ]
    }
}

/// What to score when no mean distance is known.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceFallback {
    /// Score as if the amenities were this many metres away.
    Meters(f64),
    /// Use this distance sub-score directly.
    Score(f64),
}

/// Extra points once observed/expected exceeds `ratio_threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Excellence {
    pub ratio_threshold: f64,
    pub points_per_ratio: f64,
    pub max_points: f64,
}

/// Density + distance blend for one amenity category in one tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub expected_count: f64,
    pub max_distance: f64,
    pub fallback: DistanceFallback,
    pub density_weight: f64,
    pub distance_weight: f64,
    #[serde(default)]
    pub excellence: Option<Excellence>,
}

impl Component {
    pub const fn new(
        expected_count: f64,
        max_distance: f64,
        fallback: DistanceFallback,
        density_weight: f64,
        distance_weight: f64,
    ) -> Self {
        Self {
            expected_count,
            max_distance,
            fallback,
            density_weight,
            distance_weight,
            excellence: None,
        }
    }

    pub const fn with_excellence(mut self, ratio_threshold: f64, points_per_ratio: f64, max_points: f64) -> Self {
        self.excellence = Some(Excellence {
            ratio_threshold,
            points_per_ratio,
            max_points,
        });
        self
    }

    fn validate(&self, label: &str) -> Result<()> {
        if !(self.expected_count > 0.0) {
            return Err(invariant(format!("{label}: expected_count must be positive")));
        }
        if !(self.max_distance > 0.0) {
            return Err(invariant(format!("{label}: max_distance must be positive")));
        }
        if !(self.density_weight >= 0.0 && self.distance_weight >= 0.0) {
            return Err(invariant(format!("{label}: sub-weights must be non-negative")));
        }
        match self.fallback {
            DistanceFallback::Meters(m) if !(m >= 0.0) => {
                return Err(invariant(format!("{label}: fallback distance must be non-negative")));
            }
            DistanceFallback::Score(s) if !(0.0..=100.0).contains(&s) => {
                return Err(invariant(format!("{label}: fallback score must be within 0..=100")));
            }
            _ => {}
        }
        if let Some(e) = self.excellence {
            validate_excellence(&e, label)?;
        }
        Ok(())
    }
}

fn validate_excellence(e: &Excellence, label: &str) -> Result<()> {
    if !(e.ratio_threshold >= 0.0 && e.points_per_ratio >= 0.0 && e.max_points >= 0.0) {
        return Err(invariant(format!("{label}: excellence values must be non-negative")));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkThresholds {
    /// Points lost per percent of unemployment.
    pub unemployment_slope: f64,
    pub unemployment_weight: f64,
    pub job_weight: f64,
    /// Points per job offer per hundred inhabitants.
    pub job_offer_factor: f64,
    pub fallback_unemployment_rate: f64,
    pub fallback_job_score: f64,
    /// Applied to job offers per hundred inhabitants.
    #[serde(default)]
    pub excellence: Option<Excellence>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportThresholds {
    pub transport: Component,
    /// Added when at least one train station is nearby.
    pub train_bonus: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicServicesThresholds {
    pub services: Component,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationThresholds {
    /// Weights inside apply when no occupancy data is available.
    pub schools: Component,
    pub loaded_density_weight: f64,
    pub loaded_distance_weight: f64,
    pub capacity_weight: f64,
    /// Capacity sub-score per occupancy status; missing statuses score 0.
    pub capacity_points: BTreeMap<OccupancyStatus, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommerceThresholds {
    pub shops: Component,
    pub food_stores: Component,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HospitalBlend {
    pub hospital: Component,
    pub healthcare_share: f64,
    pub hospital_share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthThresholds {
    pub healthcare: Component,
    #[serde(default)]
    pub hospital: Option<HospitalBlend>,
}

/// All category thresholds for one tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierThresholds {
    pub work: WorkThresholds,
    pub transport: TransportThresholds,
    pub public_services: PublicServicesThresholds,
    pub education: EducationThresholds,
    pub commerce: CommerceThresholds,
    pub health: HealthThresholds,
}

impl TierThresholds {
    fn validate(&self, tier: CityTier) -> Result<()> {
        let w = &self.work;
        if !(w.unemployment_slope >= 0.0
            && w.unemployment_weight >= 0.0
            && w.job_weight >= 0.0
            && w.job_offer_factor >= 0.0
            && w.fallback_unemployment_rate >= 0.0
            && (0.0..=100.0).contains(&w.fallback_job_score))
        {
            return Err(invariant(format!("{tier} work thresholds out of range")));
        }
        if let Some(e) = w.excellence {
            validate_excellence(&e, &format!("{tier} work"))?;
        }

        self.transport.transport.validate(&format!("{tier} transport"))?;
        if !(self.transport.train_bonus >= 0.0) {
            return Err(invariant(format!("{tier} transport: train bonus must be non-negative")));
        }
        self.public_services.services.validate(&format!("{tier} public services"))?;

        let e = &self.education;
        e.schools.validate(&format!("{tier} education"))?;
        if !(e.loaded_density_weight >= 0.0 && e.loaded_distance_weight >= 0.0 && e.capacity_weight >= 0.0) {
            return Err(invariant(format!("{tier} education: weights must be non-negative")));
        }
        if e.capacity_points.values().any(|p| !(0.0..=100.0).contains(p)) {
            return Err(invariant(format!("{tier} education: capacity points must be within 0..=100")));
        }

        self.commerce.shops.validate(&format!("{tier} shops"))?;
        self.commerce.food_stores.validate(&format!("{tier} food stores"))?;

        self.health.healthcare.validate(&format!("{tier} healthcare"))?;
        if let Some(blend) = &self.health.hospital {
            blend.hospital.validate(&format!("{tier} hospitals"))?;
            if !(blend.healthcare_share >= 0.0 && blend.hospital_share >= 0.0) {
                return Err(invariant(format!("{tier} health: shares must be non-negative")));
            }
        }
        Ok(())
    }
}

/// Step of the composite bonus table: at least `min_factors` density metrics
/// above the threshold earn `points`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BonusStep {
    pub min_factors: u32,
    pub points: f64,
}

/// Tier-gated bonus for localities excelling on several densities at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeBonus {
    pub eligible_tiers: Vec<CityTier>,
    /// Observed/expected ratio a density metric must exceed to count.
    pub ratio_threshold: f64,
    pub steps: Vec<BonusStep>,
}

impl CompositeBonus {
    /// Points for a tally of exceeded factors: the best step reached, or 0.
    pub fn points_for(&self, factors_exceeded: u32) -> f64 {
        self.steps
            .iter()
            .filter(|s| factors_exceeded >= s.min_factors)
            .map(|s| s.points)
            .fold(0.0, f64::max)
    }

    fn validate(&self) -> Result<()> {
        if !(self.ratio_threshold > 0.0) {
            return Err(invariant("composite bonus ratio threshold must be positive".into()));
        }
        for step in &self.steps {
            if step.min_factors == 0 {
                return Err(invariant("composite bonus steps need at least one factor".into()));
            }
            if !(0.0..=MAX_COMPOSITE_BONUS).contains(&step.points) {
                return Err(invariant(format!(
                    "composite bonus step awards {} points, allowed 0..={MAX_COMPOSITE_BONUS}",
                    step.points
                )));
            }
        }
        Ok(())
    }
}

/// A complete, versioned calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringProfile {
    pub name: String,
    pub version: u32,
    pub weights: CategoryWeights,
    pub tiers: BTreeMap<CityTier, TierThresholds>,
    #[serde(default)]
    pub composite_bonus: Option<CompositeBonus>,
}

impl ScoringProfile {
    /// Builds and validates one of the built-in profiles.
    pub fn builtin(name: ProfileName) -> Result<Self> {
        let profile = match name {
            ProfileName::Excellence => profiles::excellence(),
            ProfileName::Legacy => profiles::legacy(),
            ProfileName::Revised => profiles::revised(),
        };
        profile.validate()?;
        Ok(profile)
    }

    /// Resolves a built-in profile by name.
    pub fn named(name: &str) -> Result<Self> {
        let name: ProfileName = name
            .parse()
            .map_err(|_| ScoreError::UnknownProfile(name.to_string()))?;
        Self::builtin(name)
    }

    /// Parses and validates a profile from JSON.
    pub fn from_json_str(json: &str) -> AnyResult<Self> {
        let profile: ScoringProfile =
            serde_json::from_str(json).context("profile is not valid JSON")?;
        profile.validate()?;
        Ok(profile)
    }

    /// Loads a profile from a JSON file at `path`.
    pub fn load(path: &str) -> AnyResult<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read profile '{path}'"))?;
        Self::from_json_str(&content).with_context(|| format!("invalid profile '{path}'"))
    }

    /// Checks every structural invariant of the profile.
    ///
    /// # Errors
    ///
    /// [`ScoreError::ConfigInvariantViolated`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        for (label, weight) in self.weights.values() {
            if !(weight >= 0.0) {
                return Err(invariant(format!("weight {label} must be non-negative")));
            }
        }
        let sum = self.weights.sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(invariant(format!("category weights sum to {sum}, expected 1.0")));
        }

        for tier in CityTier::ALL {
            self.tiers
                .get(&tier)
                .ok_or_else(|| invariant(format!("no thresholds for tier {tier}")))?
                .validate(tier)?;
        }

        if let Some(bonus) = &self.composite_bonus {
            bonus.validate()?;
        }
        Ok(())
    }

    /// Threshold table for `tier`.
    pub fn thresholds(&self, tier: CityTier) -> Result<&TierThresholds> {
        self.tiers
            .get(&tier)
            .ok_or_else(|| invariant(format!("no thresholds for tier {tier}")))
    }
}

fn invariant(message: String) -> ScoreError {
    ScoreError::ConfigInvariantViolated(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_profiles_are_valid() {
        for name in ProfileName::ALL {
            let profile = ScoringProfile::builtin(name).unwrap();
            assert!((profile.weights.sum() - 1.0).abs() < 1e-9, "{name}");
            assert_eq!(profile.tiers.len(), 5);
        }
    }

    #[test]
    fn test_canonical_weights() {
        let profile = ScoringProfile::builtin(ProfileName::Excellence).unwrap();
        assert_eq!(profile.weights.work, 0.25);
        assert_eq!(profile.weights.transport, 0.22);
        assert_eq!(profile.weights.public_services, 0.13);
        assert_eq!(profile.weights.education, 0.12);
        assert_eq!(profile.weights.commerce, 0.20);
        assert_eq!(profile.weights.health, 0.08);
    }

    #[test]
    fn test_weights_not_summing_to_one_are_rejected() {
        // The historical health weight of 0.20 pushed the revised table to 1.05.
        let mut profile = ScoringProfile::builtin(ProfileName::Revised).unwrap();
        profile.weights.health = 0.20;
        assert!(matches!(
            profile.validate(),
            Err(ScoreError::ConfigInvariantViolated(_))
        ));
    }

    #[test]
    fn test_missing_tier_is_rejected() {
        let mut profile = ScoringProfile::builtin(ProfileName::Legacy).unwrap();
        profile.tiers.remove(&CityTier::MidTown);
        let err = profile.validate().unwrap_err();
        assert!(err.to_string().contains("MidTown"));
    }

    #[test]
    fn test_zero_expected_count_is_rejected() {
        let mut profile = ScoringProfile::builtin(ProfileName::Excellence).unwrap();
        if let Some(t) = profile.tiers.get_mut(&CityTier::Village) {
            t.commerce.shops.expected_count = 0.0;
        }
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_oversized_composite_bonus_is_rejected() {
        let mut profile = ScoringProfile::builtin(ProfileName::Excellence).unwrap();
        if let Some(bonus) = profile.composite_bonus.as_mut() {
            bonus.steps.push(BonusStep {
                min_factors: 6,
                points: 15.0,
            });
        }
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_points_for_picks_highest_reached_step() {
        let bonus = CompositeBonus {
            eligible_tiers: vec![CityTier::Metropolis],
            ratio_threshold: 1.5,
            steps: vec![
                BonusStep { min_factors: 2, points: 3.0 },
                BonusStep { min_factors: 3, points: 6.0 },
                BonusStep { min_factors: 4, points: 10.0 },
            ],
        };
        assert_eq!(bonus.points_for(0), 0.0);
        assert_eq!(bonus.points_for(1), 0.0);
        assert_eq!(bonus.points_for(2), 3.0);
        assert_eq!(bonus.points_for(3), 6.0);
        assert_eq!(bonus.points_for(6), 10.0);
    }

    #[test]
    fn test_named_profile_lookup() {
        assert_eq!(ScoringProfile::named("LEGACY").unwrap().name, "legacy");
        assert_eq!(
            ScoringProfile::named("v7"),
            Err(ScoreError::UnknownProfile("v7".into()))
        );
    }

    #[test]
    fn test_profile_json_round_trip_validates() {
        let profile = ScoringProfile::builtin(ProfileName::Excellence).unwrap();
        let json = serde_json::to_string(&profile).unwrap();
        let parsed = ScoringProfile::from_json_str(&json).unwrap();
        assert_eq!(parsed, profile);

        let mut broken = profile.clone();
        broken.weights.work = 0.5;
        let json = serde_json::to_string(&broken).unwrap();
        assert!(ScoringProfile::from_json_str(&json).is_err());
    }
}
