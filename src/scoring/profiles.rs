//! Built-in calibration tables.
//!
//! Per-tier arrays are indexed Village, SmallTown, MidTown, LargeCity,
//! Metropolis. The constants are calibration, not derivation: change them
//! only together with the expected scores in the tests.

use std::collections::BTreeMap;

use crate::analyzers::types::OccupancyStatus;
use crate::scoring::profile::{
    BonusStep, CategoryWeights, CommerceThresholds, Component, CompositeBonus,
    DistanceFallback::{Meters, Score},
    EducationThresholds, Excellence, HealthThresholds, HospitalBlend, PublicServicesThresholds,
    ScoringProfile, TierThresholds, TransportThresholds, WorkThresholds,
};
use crate::tier::CityTier;

fn per_tier(build: impl Fn(usize) -> TierThresholds) -> BTreeMap<CityTier, TierThresholds> {
    CityTier::ALL
        .iter()
        .enumerate()
        .map(|(i, tier)| (*tier, build(i)))
        .collect()
}

fn capacity_points(points: &[(OccupancyStatus, f64)]) -> BTreeMap<OccupancyStatus, f64> {
    points.iter().copied().collect()
}

/// Capacity points shared by both historical formula sets; overloaded and
/// nearly empty schools earn nothing.
fn historical_capacity_points() -> BTreeMap<OccupancyStatus, f64> {
    capacity_points(&[
        (OccupancyStatus::UnderCapacity, 40.0),
        (OccupancyStatus::Normal, 80.0),
        (OccupancyStatus::Optimal, 100.0),
    ])
}

pub(crate) fn excellence() -> ScoringProfile {
    const UNEMPLOYMENT_SLOPE: [f64; 5] = [3.0, 3.5, 4.0, 4.5, 5.0];
    const JOB_FALLBACK: [f64; 5] = [40.0, 40.0, 45.0, 50.0, 50.0];
    const FALLBACK_SCORE: [f64; 5] = [30.0, 35.0, 40.0, 45.0, 50.0];

    const TRANSPORT_EXPECTED: [f64; 5] = [2.0, 4.0, 6.0, 8.0, 12.0];
    const TRANSPORT_MAX: [f64; 5] = [1_500.0, 1_000.0, 800.0, 600.0, 400.0];
    const SERVICES_EXPECTED: [f64; 5] = [1.0, 2.0, 4.0, 8.0, 12.0];
    const SERVICES_MAX: [f64; 5] = [5_000.0, 3_000.0, 2_000.0, 1_200.0, 800.0];
    const SCHOOLS_EXPECTED: [f64; 5] = [1.0, 3.0, 6.0, 12.0, 20.0];
    const SCHOOLS_MAX: [f64; 5] = [3_000.0, 2_000.0, 1_200.0, 800.0, 500.0];
    const SHOPS_EXPECTED: [f64; 5] = [10.0, 25.0, 50.0, 100.0, 150.0];
    const SHOPS_MAX: [f64; 5] = [4_000.0, 2_500.0, 1_500.0, 800.0, 500.0];
    const FOOD_EXPECTED: [f64; 5] = [1.0, 2.0, 3.0, 5.0, 8.0];
    const FOOD_MAX: [f64; 5] = [5_000.0, 2_000.0, 1_200.0, 800.0, 400.0];
    const HEALTH_EXPECTED: [f64; 5] = [1.0, 2.0, 4.0, 10.0, 20.0];
    const HEALTH_MAX: [f64; 5] = [10_000.0, 5_000.0, 2_500.0, 1_500.0, 1_000.0];

    let tiers = per_tier(|i| TierThresholds {
        work: WorkThresholds {
            unemployment_slope: UNEMPLOYMENT_SLOPE[i],
            unemployment_weight: 0.65,
            job_weight: 0.35,
            job_offer_factor: 2.0,
            fallback_unemployment_rate: 7.5,
            fallback_job_score: JOB_FALLBACK[i],
            excellence: Some(Excellence {
                ratio_threshold: 5.0,
                points_per_ratio: 1.0,
                max_points: 5.0,
            }),
        },
        transport: TransportThresholds {
            transport: Component::new(
                TRANSPORT_EXPECTED[i],
                TRANSPORT_MAX[i],
                Score(FALLBACK_SCORE[i]),
                0.6,
                0.4,
            )
            .with_excellence(1.5, 10.0, 10.0),
            train_bonus: 10.0,
        },
        public_services: PublicServicesThresholds {
            services: Component::new(
                SERVICES_EXPECTED[i],
                SERVICES_MAX[i],
                Score(FALLBACK_SCORE[i]),
                0.6,
                0.4,
            )
            .with_excellence(1.5, 8.0, 8.0),
        },
        education: EducationThresholds {
            schools: Component::new(SCHOOLS_EXPECTED[i], SCHOOLS_MAX[i], Score(40.0), 0.5, 0.5)
                .with_excellence(1.5, 6.0, 6.0),
            loaded_density_weight: 0.3,
            loaded_distance_weight: 0.3,
            capacity_weight: 0.4,
            capacity_points: capacity_points(&[
                (OccupancyStatus::ExceedingCapacity, 20.0),
                (OccupancyStatus::HighOccupancy, 60.0),
                (OccupancyStatus::Optimal, 100.0),
                (OccupancyStatus::Normal, 80.0),
                (OccupancyStatus::UnderCapacity, 50.0),
                (OccupancyStatus::SeverelyUnderutilized, 20.0),
            ]),
        },
        commerce: CommerceThresholds {
            shops: Component::new(
                SHOPS_EXPECTED[i],
                SHOPS_MAX[i],
                Score(FALLBACK_SCORE[i]),
                0.45,
                0.2,
            )
            .with_excellence(1.5, 8.0, 8.0),
            food_stores: Component::new(
                FOOD_EXPECTED[i],
                FOOD_MAX[i],
                Score(FALLBACK_SCORE[i]),
                0.25,
                0.1,
            ),
        },
        health: HealthThresholds {
            healthcare: Component::new(
                HEALTH_EXPECTED[i],
                HEALTH_MAX[i],
                Score(FALLBACK_SCORE[i]),
                0.6,
                0.4,
            )
            .with_excellence(1.5, 8.0, 8.0),
            hospital: None,
        },
    });

    ScoringProfile {
        name: "excellence".to_string(),
        version: 3,
        weights: CategoryWeights {
            work: 0.25,
            transport: 0.22,
            public_services: 0.13,
            education: 0.12,
            commerce: 0.20,
            health: 0.08,
        },
        tiers,
        composite_bonus: Some(CompositeBonus {
            eligible_tiers: vec![CityTier::MidTown, CityTier::LargeCity, CityTier::Metropolis],
            ratio_threshold: 1.5,
            steps: vec![
                BonusStep { min_factors: 2, points: 3.0 },
                BonusStep { min_factors: 3, points: 6.0 },
                BonusStep { min_factors: 4, points: 10.0 },
            ],
        }),
    }
}

pub(crate) fn legacy() -> ScoringProfile {
    const TRANSPORT: [(f64, f64); 5] = [
        (10.0, 1_000.0),
        (10.0, 1_000.0),
        (30.0, 700.0),
        (50.0, 500.0),
        (100.0, 300.0),
    ];
    const SERVICES: [(f64, f64); 5] = [
        (2.0, 5_000.0),
        (2.0, 5_000.0),
        (5.0, 2_000.0),
        (10.0, 1_000.0),
        (10.0, 1_000.0),
    ];
    const SHOPS: [(f64, f64); 5] = [
        (10.0, 4_000.0),
        (25.0, 2_500.0),
        (50.0, 1_500.0),
        (100.0, 800.0),
        (150.0, 500.0),
    ];
    const HEALTH: [(f64, f64); 5] = [
        (5.0, 2_500.0),
        (5.0, 2_500.0),
        (5.0, 2_500.0),
        (10.0, 1_500.0),
        (20.0, 1_000.0),
    ];

    let tiers = per_tier(|i| TierThresholds {
        work: WorkThresholds {
            unemployment_slope: 4.0,
            unemployment_weight: 0.6,
            job_weight: 0.4,
            job_offer_factor: 2.0,
            fallback_unemployment_rate: 0.0,
            fallback_job_score: 0.0,
            excellence: None,
        },
        transport: TransportThresholds {
            transport: Component::new(TRANSPORT[i].0, TRANSPORT[i].1, Meters(2_000.0), 0.4, 0.4),
            train_bonus: 25.0,
        },
        public_services: PublicServicesThresholds {
            services: Component::new(SERVICES[i].0, SERVICES[i].1, Meters(3_000.0), 0.5, 0.5),
        },
        education: EducationThresholds {
            schools: Component::new(20.0, 1_000.0, Meters(1_000.0), 0.5, 0.5),
            loaded_density_weight: 0.3,
            loaded_distance_weight: 0.3,
            capacity_weight: 0.4,
            capacity_points: historical_capacity_points(),
        },
        commerce: CommerceThresholds {
            shops: Component::new(SHOPS[i].0, SHOPS[i].1, Meters(1_000.0), 0.4, 0.2),
            food_stores: Component::new(5.0, 500.0, Meters(500.0), 0.3, 0.1),
        },
        health: HealthThresholds {
            healthcare: Component::new(HEALTH[i].0, HEALTH[i].1, Meters(2_000.0), 0.6, 0.4),
            hospital: None,
        },
    });

    ScoringProfile {
        name: "legacy".to_string(),
        version: 1,
        weights: CategoryWeights {
            work: 0.20,
            transport: 0.20,
            public_services: 0.15,
            education: 0.15,
            commerce: 0.15,
            health: 0.15,
        },
        tiers,
        composite_bonus: None,
    }
}

pub(crate) fn revised() -> ScoringProfile {
    const TRANSPORT_EXPECTED: [f64; 5] = [20.0, 20.0, 20.0, 40.0, 80.0];
    const SERVICES_EXPECTED: [f64; 5] = [2.0, 2.0, 5.0, 8.0, 10.0];
    const HEALTHCARE: [(f64, f64); 5] = [
        (2.0, 3_000.0),
        (2.0, 3_000.0),
        (4.0, 2_000.0),
        (8.0, 1_200.0),
        (12.0, 800.0),
    ];
    const HOSPITAL: [(f64, f64); 5] = [
        (0.5, 10_000.0),
        (0.5, 10_000.0),
        (1.0, 5_000.0),
        (2.0, 3_000.0),
        (3.0, 2_000.0),
    ];

    let tiers = per_tier(|i| TierThresholds {
        work: WorkThresholds {
            unemployment_slope: 3.0,
            unemployment_weight: 0.6,
            job_weight: 0.6,
            job_offer_factor: 2.0,
            fallback_unemployment_rate: 0.0,
            fallback_job_score: 0.0,
            excellence: None,
        },
        transport: TransportThresholds {
            transport: Component::new(TRANSPORT_EXPECTED[i], 1_000.0, Score(50.0), 0.6, 0.3),
            train_bonus: 36.0,
        },
        public_services: PublicServicesThresholds {
            services: Component::new(SERVICES_EXPECTED[i], 3_000.0, Score(40.0), 0.7, 0.3),
        },
        education: EducationThresholds {
            schools: Component::new(25.0, 1_000.0, Meters(1_000.0), 0.5, 0.5),
            loaded_density_weight: 0.3,
            loaded_distance_weight: 0.3,
            capacity_weight: 0.4,
            capacity_points: historical_capacity_points(),
        },
        commerce: CommerceThresholds {
            // 1.1 points per shop.
            shops: Component::new(100.0 / 1.1, 1_500.0, Score(60.0), 0.5, 0.3),
            food_stores: Component::new(4.0, 1_000.0, Score(70.0), 0.3, 0.3),
        },
        health: HealthThresholds {
            healthcare: Component::new(HEALTHCARE[i].0, HEALTHCARE[i].1, Score(50.0), 0.6, 0.4),
            hospital: Some(HospitalBlend {
                hospital: Component::new(HOSPITAL[i].0, HOSPITAL[i].1, Score(40.0), 0.5, 0.3),
                healthcare_share: 0.4,
                hospital_share: 0.6,
            }),
        },
    });

    ScoringProfile {
        name: "revised".to_string(),
        version: 2,
        weights: CategoryWeights {
            work: 0.20,
            transport: 0.20,
            public_services: 0.15,
            education: 0.15,
            commerce: 0.15,
            health: 0.15,
        },
        tiers,
        composite_bonus: None,
    }
}
