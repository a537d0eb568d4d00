//! One scoring pass: facts → tier → metrics → scores.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::analyzers::aggregate::aggregate_amenities;
use crate::analyzers::schools::summarize_school_load;
use crate::analyzers::types::{AmenityMetric, LocalityMetrics, SchoolLoadSummary, WorkMetrics};
use crate::error::Result;
use crate::facts::{AmenityCategory, AmenityObservation, CommuneFacts, LocalityFacts, SchoolObservation};
use crate::geo::schools_within_radius;
use crate::plan::{SearchArea, search_area};
use crate::scoring::composite::{CompositeScorer, ScoreReport};
use crate::tier::CityTier;

/// Aggregated metric for one category and the area it was searched in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoryReport {
    #[serde(flatten)]
    pub metric: AmenityMetric,
    pub search: Option<SearchArea>,
    /// 0 for an administrative-area search.
    pub radius_meters: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmploymentReport {
    pub unemployment_rate: Option<f64>,
    pub unemployment_display: String,
    pub job_offers: Option<u64>,
}

/// Everything known about a locality after one scoring pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalityReport {
    pub commune: CommuneFacts,
    pub tier: CityTier,
    pub profile: String,
    pub amenities: BTreeMap<AmenityCategory, CategoryReport>,
    pub train_stations: usize,
    pub hospitals: AmenityMetric,
    pub skipped_observations: usize,
    pub school_load: Option<SchoolLoadSummary>,
    pub employment: EmploymentReport,
    pub scores: ScoreReport,
    pub excellence_bonus: f64,
    pub factors_exceeded: u32,
}

impl LocalityReport {
    /// Commune name, or `"unknown"`.
    pub fn locality(&self) -> &str {
        self.commune.name.as_deref().unwrap_or("unknown")
    }
}

/// Classifies, aggregates and scores one locality.
///
/// # Errors
///
/// Fails when the commune cannot be classified or any category fails to score.
#[tracing::instrument(
    skip_all,
    fields(commune = facts.commune.name.as_deref().unwrap_or("unknown"), profile = %scorer.profile().name)
)]
pub fn score_locality(facts: &LocalityFacts, scorer: &CompositeScorer) -> Result<LocalityReport> {
    let tier = facts.commune.tier()?;

    let observations = locate_amenities(facts);
    let amenities = aggregate_amenities(&observations);

    let schools = nearby_schools(facts, tier);
    let school_load = summarize_school_load(&schools);

    let employment = employment_report(facts);
    let work = WorkMetrics {
        population: facts.commune.population,
        unemployment_rate: employment.unemployment_rate,
        job_offers: employment.job_offers,
    };

    let metrics = LocalityMetrics::from_parts(work, &amenities, school_load.clone());
    let outcome = scorer.compose(&metrics, tier)?;

    let amenity_reports = [
        AmenityCategory::Shop,
        AmenityCategory::FoodStore,
        AmenityCategory::Healthcare,
        AmenityCategory::PublicServices,
        AmenityCategory::School,
        AmenityCategory::Transport,
    ]
    .into_iter()
    .map(|category| {
        let search = search_area(tier, category);
        let report = CategoryReport {
            metric: amenities.get(category),
            search,
            radius_meters: search.map_or(0, SearchArea::radius_meters),
        };
        (category, report)
    })
    .collect();

    let report = LocalityReport {
        commune: facts.commune.clone(),
        tier,
        profile: scorer.profile().name.clone(),
        amenities: amenity_reports,
        train_stations: amenities.train_stations,
        hospitals: amenities.hospitals,
        skipped_observations: amenities.skipped,
        school_load,
        employment,
        scores: outcome.report,
        excellence_bonus: outcome.excellence_bonus,
        factors_exceeded: outcome.factors_exceeded,
    };

    info!(
        locality = report.locality(),
        %tier,
        global = report.scores.global,
        "Locality scored"
    );
    Ok(report)
}

/// Observations with distances filled in from the reference point where possible.
fn locate_amenities(facts: &LocalityFacts) -> Vec<AmenityObservation> {
    match facts.reference_point() {
        Some(reference) => facts
            .amenities
            .iter()
            .cloned()
            .map(|obs| obs.with_distance_from(reference))
            .collect(),
        None => facts.amenities.clone(),
    }
}

/// Schools inside the tier's school search radius.
///
/// Administrative-area searches, or a missing reference point, keep every
/// school of the commune. Schools without any location are always kept.
fn nearby_schools(facts: &LocalityFacts, tier: CityTier) -> Vec<SchoolObservation> {
    let radius = match search_area(tier, AmenityCategory::School) {
        Some(SearchArea::Radius(r)) => r,
        _ => return facts.schools.clone(),
    };
    match facts.reference_point() {
        Some(reference) => {
            let nearby = schools_within_radius(&facts.schools, reference, f64::from(radius));
            debug!(
                total = facts.schools.len(),
                nearby = nearby.len(),
                radius,
                "Filtered schools by radius"
            );
            nearby
        }
        None => facts.schools.clone(),
    }
}

fn employment_report(facts: &LocalityFacts) -> EmploymentReport {
    let population = facts.commune.population;
    match &facts.employment {
        Some(employment) => {
            let unemployment_rate = match employment.unemployment_rate(population) {
                Ok(rate) => Some(rate),
                Err(e) => {
                    debug!(error = %e, "Unemployment rate unavailable");
                    None
                }
            };
            EmploymentReport {
                unemployment_rate,
                unemployment_display: employment.unemployment_display(population),
                job_offers: employment.job_offer_count,
            }
        }
        None => EmploymentReport {
            unemployment_rate: None,
            unemployment_display: "N/A".to_string(),
            job_offers: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::OccupancyStatus;
    use crate::error::ScoreError;
    use crate::facts::{Coordinates, EmploymentFacts};
    use crate::scoring::profile::{ProfileName, ScoringProfile};

    fn scorer() -> CompositeScorer {
        CompositeScorer::new(ScoringProfile::builtin(ProfileName::Excellence).unwrap()).unwrap()
    }

    fn commune(population: u64, density: f64) -> CommuneFacts {
        CommuneFacts {
            name: Some("Testville".to_string()),
            population: Some(population),
            density: Some(density),
            ..CommuneFacts::default()
        }
    }

    fn shop(distance: f64) -> AmenityObservation {
        AmenityObservation {
            category: AmenityCategory::Shop,
            name: None,
            kind: Some("restaurant".to_string()),
            lat: None,
            lon: None,
            distance: Some(distance),
        }
    }

    #[test]
    fn test_missing_population_fails() {
        let facts = LocalityFacts {
            commune: CommuneFacts {
                density: Some(100.0),
                ..CommuneFacts::default()
            },
            ..LocalityFacts::default()
        };
        assert_eq!(
            score_locality(&facts, &scorer()).unwrap_err(),
            ScoreError::MissingData { field: "population" }
        );
    }

    #[test]
    fn test_report_carries_search_radius() {
        let facts = LocalityFacts {
            commune: commune(2_161_000, 20_000.0),
            amenities: vec![shop(100.0), shop(300.0)],
            ..LocalityFacts::default()
        };
        let report = score_locality(&facts, &scorer()).unwrap();

        assert_eq!(report.tier, CityTier::Metropolis);
        let shops = report.amenities[&AmenityCategory::Shop];
        assert_eq!(shops.metric, AmenityMetric::new(2, 200.0));
        assert_eq!(shops.radius_meters, 500);
        assert_eq!(report.employment.unemployment_display, "N/A");
    }

    #[test]
    fn test_mid_town_searches_health_by_administrative_area() {
        let facts = LocalityFacts {
            commune: commune(30_000, 800.0),
            ..LocalityFacts::default()
        };
        let report = score_locality(&facts, &scorer()).unwrap();
        assert_eq!(report.tier, CityTier::MidTown);
        assert_eq!(
            report.amenities[&AmenityCategory::Healthcare].search,
            Some(SearchArea::AdministrativeArea)
        );
    }

    #[test]
    fn test_distances_filled_from_reference_point() {
        let mut obs = shop(0.0);
        obs.distance = None;
        obs.lat = Some(48.8566);
        obs.lon = Some(2.3532);
        let facts = LocalityFacts {
            commune: commune(2_161_000, 20_000.0),
            amenities: vec![obs],
            reference: Some(Coordinates {
                lat: 48.8566,
                lon: 2.3522,
            }),
            ..LocalityFacts::default()
        };
        let report = score_locality(&facts, &scorer()).unwrap();
        let shops = report.amenities[&AmenityCategory::Shop].metric;
        assert_eq!(shops.count, 1);
        assert!((shops.average_distance - 73.2).abs() < 0.5);
        assert_eq!(report.skipped_observations, 0);
    }

    #[test]
    fn test_schools_outside_radius_are_ignored() {
        let reference = Coordinates {
            lat: 45.0,
            lon: 5.0,
        };
        let near = SchoolObservation {
            commune: "Testville".to_string(),
            total_students: 150,
            class_count: 5,
            lat: Some(45.001),
            lon: Some(5.0),
            distance: None,
        };
        let far = SchoolObservation {
            lat: Some(45.5),
            ..near.clone()
        };
        let facts = LocalityFacts {
            commune: commune(2_000, 100.0),
            schools: vec![near, far],
            reference: Some(reference),
            ..LocalityFacts::default()
        };
        let report = score_locality(&facts, &scorer()).unwrap();
        assert_eq!(report.tier, CityTier::SmallTown);
        assert_eq!(report.school_load.unwrap().total_schools, 1);
    }

    fn unlocated_school() -> SchoolObservation {
        SchoolObservation {
            commune: "Le Havre 76600".to_string(),
            total_students: 150,
            class_count: 5,
            lat: None,
            lon: None,
            distance: None,
        }
    }

    #[test]
    fn test_commune_schools_without_location_survive_centroid() {
        let facts = LocalityFacts {
            commune: CommuneFacts {
                lat: Some(49.4944),
                lon: Some(0.1079),
                ..commune(170_000, 3_600.0)
            },
            schools: vec![unlocated_school(), unlocated_school()],
            ..LocalityFacts::default()
        };
        let report = score_locality(&facts, &scorer()).unwrap();

        assert_eq!(report.tier, CityTier::LargeCity);
        let load = report.school_load.unwrap();
        assert_eq!(load.total_schools, 2);
        assert_eq!(load.dominant_status, OccupancyStatus::HighOccupancy);
    }

    #[test]
    fn test_administrative_area_keeps_distant_schools() {
        let far = SchoolObservation {
            lat: Some(46.0),
            lon: Some(5.0),
            ..unlocated_school()
        };
        let facts = LocalityFacts {
            commune: commune(30_000, 800.0),
            schools: vec![far],
            reference: Some(Coordinates {
                lat: 45.0,
                lon: 5.0,
            }),
            ..LocalityFacts::default()
        };
        let report = score_locality(&facts, &scorer()).unwrap();

        assert_eq!(report.tier, CityTier::MidTown);
        assert_eq!(
            report.amenities[&AmenityCategory::School].search,
            Some(SearchArea::AdministrativeArea)
        );
        assert_eq!(report.school_load.unwrap().total_schools, 1);
    }

    #[test]
    fn test_employment_rate_and_display() {
        let facts = LocalityFacts {
            commune: commune(20_000, 300.0),
            employment: Some(EmploymentFacts {
                unemployed_count: Some(1_234),
                job_offer_count: Some(400),
            }),
            ..LocalityFacts::default()
        };
        let report = score_locality(&facts, &scorer()).unwrap();
        assert_eq!(report.employment.unemployment_rate, Some(6.2));
        assert_eq!(report.employment.unemployment_display, "6.2%");
        assert_eq!(report.employment.job_offers, Some(400));
    }
}
