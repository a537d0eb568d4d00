//! Weighted global score with the tier-gated composite excellence bonus.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::analyzers::types::LocalityMetrics;
use crate::analyzers::utility::clamp_score;
use crate::error::Result;
use crate::scoring::category::{Category, CategoryScorer};
use crate::scoring::profile::{CategoryWeights, ScoringProfile};
use crate::tier::CityTier;

/// Per-category sub-scores plus the weighted global score, all in 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreReport {
    #[serde(rename = "Work")]
    pub work: u8,
    #[serde(rename = "Transport")]
    pub transport: u8,
    #[serde(rename = "Public Services")]
    pub public_services: u8,
    #[serde(rename = "Education")]
    pub education: u8,
    #[serde(rename = "Commerce")]
    pub commerce: u8,
    #[serde(rename = "Health")]
    pub health: u8,
    #[serde(rename = "Global")]
    pub global: u8,
}

impl ScoreReport {
    pub fn get(&self, category: Category) -> u8 {
        match category {
            Category::Work => self.work,
            Category::Transport => self.transport,
            Category::PublicServices => self.public_services,
            Category::Education => self.education,
            Category::Commerce => self.commerce,
            Category::Health => self.health,
        }
    }
}

/// A report together with how its excellence bonus was reached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompositeOutcome {
    pub report: ScoreReport,
    pub excellence_bonus: f64,
    pub factors_exceeded: u32,
}

/// Owns a validated profile and turns metrics into a [`ScoreReport`].
#[derive(Debug, Clone)]
pub struct CompositeScorer {
    profile: ScoringProfile,
}

impl CompositeScorer {
    /// Validates `profile` up front; a scorer never holds a broken calibration.
    pub fn new(profile: ScoringProfile) -> Result<Self> {
        profile.validate()?;
        info!(profile = %profile.name, version = profile.version, "Loaded scoring profile");
        Ok(Self { profile })
    }

    pub fn profile(&self) -> &ScoringProfile {
        &self.profile
    }

    /// Scores all six categories and combines them.
    ///
    /// Fails as a whole if any category fails; no partial report is produced.
    pub fn compose(&self, metrics: &LocalityMetrics, tier: CityTier) -> Result<CompositeOutcome> {
        let scorer = CategoryScorer::new(&self.profile);
        let mut scores = [0u8; 6];
        for (slot, category) in scores.iter_mut().zip(Category::ALL) {
            *slot = scorer.score(category, metrics, tier)?;
        }

        let factors_exceeded = self.factors_exceeded(metrics, tier)?;
        let excellence_bonus = self.excellence_bonus(tier, factors_exceeded);
        let global = weighted_global(&self.profile.weights, &scores, excellence_bonus);

        let [work, transport, public_services, education, commerce, health] = scores;
        let report = ScoreReport {
            work,
            transport,
            public_services,
            education,
            commerce,
            health,
            global,
        };
        debug!(%tier, factors_exceeded, excellence_bonus, global, "Composed global score");

        Ok(CompositeOutcome {
            report,
            excellence_bonus,
            factors_exceeded,
        })
    }

    /// Number of density metrics whose observed/expected ratio exceeds the
    /// composite threshold. 0 when the profile has no composite bonus.
    pub fn factors_exceeded(&self, metrics: &LocalityMetrics, tier: CityTier) -> Result<u32> {
        let Some(bonus) = &self.profile.composite_bonus else {
            return Ok(0);
        };
        let t = self.profile.thresholds(tier)?;
        let ratios = [
            t.transport.transport.ratio(&metrics.transport.transport),
            t.public_services.services.ratio(&metrics.public_services.services),
            t.education.schools.ratio(&metrics.education.schools),
            t.commerce.shops.ratio(&metrics.commerce.shops),
            t.commerce.food_stores.ratio(&metrics.commerce.food_stores),
            t.health.healthcare.ratio(&metrics.health.healthcare),
        ];
        Ok(ratios.iter().filter(|r| **r > bonus.ratio_threshold).count() as u32)
    }

    fn excellence_bonus(&self, tier: CityTier, factors_exceeded: u32) -> f64 {
        match &self.profile.composite_bonus {
            Some(bonus) if bonus.eligible_tiers.contains(&tier) => bonus.points_for(factors_exceeded),
            _ => 0.0,
        }
    }
}

/// `round(min(100, weighted_sum + bonus))`, never below 0.
fn weighted_global(weights: &CategoryWeights, scores: &[u8; 6], bonus: f64) -> u8 {
    let w = [
        weights.work,
        weights.transport,
        weights.public_services,
        weights.education,
        weights.commerce,
        weights.health,
    ];
    let weighted: f64 = w.iter().zip(scores).map(|(w, s)| w * f64::from(*s)).sum();
    clamp_score((weighted + bonus).min(100.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::{
        AmenityMetric, CommerceMetrics, EducationMetrics, HealthMetrics, PublicServicesMetrics,
        TransportMetrics, WorkMetrics,
    };
    use crate::error::ScoreError;
    use crate::scoring::profile::ProfileName;

    fn scorer(name: ProfileName) -> CompositeScorer {
        CompositeScorer::new(ScoringProfile::builtin(name).unwrap()).unwrap()
    }

    fn paris_like() -> LocalityMetrics {
        LocalityMetrics {
            work: WorkMetrics {
                population: Some(2_161_000),
                unemployment_rate: Some(8.0),
                job_offers: Some(50_000),
            },
            transport: TransportMetrics {
                transport: AmenityMetric::new(25, 200.0),
                train_stations: 0,
            },
            public_services: PublicServicesMetrics {
                services: AmenityMetric::new(20, 300.0),
            },
            education: EducationMetrics {
                schools: AmenityMetric::new(30, 250.0),
                load: None,
            },
            commerce: CommerceMetrics {
                shops: AmenityMetric::new(300, 100.0),
                food_stores: AmenityMetric::new(16, 200.0),
            },
            health: HealthMetrics {
                healthcare: AmenityMetric::new(40, 200.0),
                hospitals: AmenityMetric::default(),
            },
        }
    }

    #[test]
    fn test_metropolis_report_with_composite_bonus() {
        let outcome = scorer(ProfileName::Excellence)
            .compose(&paris_like(), CityTier::Metropolis)
            .unwrap();

        assert_eq!(
            outcome.report,
            ScoreReport {
                work: 41,
                transport: 86,
                public_services: 86,
                education: 75,
                commerce: 95,
                health: 96,
                global: 86,
            }
        );
        // Schools sit exactly at 1.5x and do not count.
        assert_eq!(outcome.factors_exceeded, 5);
        assert_eq!(outcome.excellence_bonus, 10.0);
    }

    #[test]
    fn test_bonus_is_tier_gated() {
        let s = scorer(ProfileName::Excellence);
        let outcome = s.compose(&paris_like(), CityTier::Village).unwrap();
        assert_eq!(outcome.excellence_bonus, 0.0);
        assert!(outcome.factors_exceeded > 0);
    }

    #[test]
    fn test_historical_profiles_have_no_composite_bonus() {
        let outcome = scorer(ProfileName::Legacy)
            .compose(&paris_like(), CityTier::Metropolis)
            .unwrap();
        assert_eq!(outcome.factors_exceeded, 0);
        assert_eq!(outcome.excellence_bonus, 0.0);
    }

    #[test]
    fn test_global_never_exceeds_100() {
        let weights = ScoringProfile::builtin(ProfileName::Excellence).unwrap().weights;
        assert_eq!(weighted_global(&weights, &[100; 6], 10.0), 100);
        assert_eq!(weighted_global(&weights, &[0; 6], 0.0), 0);
        assert_eq!(weighted_global(&weights, &[0; 6], 3.0), 3);
    }

    #[test]
    fn test_bonus_cannot_push_perfect_scores_past_100() {
        let metrics = LocalityMetrics {
            work: WorkMetrics {
                population: Some(1_000),
                unemployment_rate: Some(0.0),
                job_offers: Some(1_000),
            },
            transport: TransportMetrics {
                transport: AmenityMetric::new(25, 1.0),
                train_stations: 1,
            },
            public_services: PublicServicesMetrics {
                services: AmenityMetric::new(24, 1.0),
            },
            education: EducationMetrics {
                schools: AmenityMetric::new(40, 1.0),
                load: None,
            },
            commerce: CommerceMetrics {
                shops: AmenityMetric::new(300, 1.0),
                food_stores: AmenityMetric::new(16, 1.0),
            },
            health: HealthMetrics {
                healthcare: AmenityMetric::new(40, 1.0),
                hospitals: AmenityMetric::default(),
            },
        };

        let outcome = scorer(ProfileName::Excellence)
            .compose(&metrics, CityTier::Metropolis)
            .unwrap();

        for category in Category::ALL {
            assert_eq!(outcome.report.get(category), 100, "{category}");
        }
        assert_eq!(outcome.factors_exceeded, 6);
        assert_eq!(outcome.excellence_bonus, 10.0);
        assert_eq!(outcome.report.global, 100);
    }

    #[test]
    fn test_compose_is_idempotent() {
        let s = scorer(ProfileName::Excellence);
        let metrics = paris_like();
        assert_eq!(
            s.compose(&metrics, CityTier::LargeCity),
            s.compose(&metrics, CityTier::LargeCity)
        );
    }

    #[test]
    fn test_one_failing_category_fails_the_whole_report() {
        let mut metrics = paris_like();
        metrics.health.healthcare.average_distance = f64::NAN;
        let result = scorer(ProfileName::Excellence).compose(&metrics, CityTier::Metropolis);
        assert!(matches!(result, Err(ScoreError::InvalidMetric { .. })));
    }

    #[test]
    fn test_rejects_weights_not_summing_to_one() {
        let mut profile = ScoringProfile::builtin(ProfileName::Revised).unwrap();
        profile.weights.health = 0.20;
        assert!(matches!(
            CompositeScorer::new(profile),
            Err(ScoreError::ConfigInvariantViolated(_))
        ));
    }

    #[test]
    fn test_report_serializes_with_display_names() {
        let report = ScoreReport {
            work: 1,
            transport: 2,
            public_services: 3,
            education: 4,
            commerce: 5,
            health: 6,
            global: 7,
        };
        let value = serde_json::to_value(report).unwrap();
        assert_eq!(value["Public Services"], 3);
        assert_eq!(value["Global"], 7);
        assert_eq!(report.get(Category::Health), 6);
    }
}
