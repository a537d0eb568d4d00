use crate::analyzers::types::{AmenityMetric, AmenitySummary};
use crate::analyzers::utility::{mean, round_to};
use crate::facts::{AmenityCategory, AmenityObservation, TransportMode};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Returns the observation's distance if it is usable for aggregation.
fn usable_distance(obs: &AmenityObservation) -> Option<f64> {
    match obs.distance {
        Some(d) if d.is_finite() && d >= 0.0 => Some(d),
        other => {
            warn!(
                category = %obs.category,
                name = obs.name.as_deref().unwrap_or("Unknown"),
                distance = ?other,
                "Skipping amenity without usable distance"
            );
            None
        }
    }
}

fn metric_from_series(series: &[f64]) -> AmenityMetric {
    if series.is_empty() {
        return AmenityMetric::default();
    }
    AmenityMetric::new(series.len(), round_to(mean(series), 1))
}

/// Aggregates observations already filtered to a single category.
///
/// Count is the number of observations with a usable distance; the mean
/// distance is rounded to one decimal and 0 when nothing was observed.
pub fn aggregate(observations: &[AmenityObservation]) -> AmenityMetric {
    let series: Vec<f64> = observations.iter().filter_map(usable_distance).collect();
    metric_from_series(&series)
}

/// Aggregates a mixed batch of observations into per-category metrics.
///
/// Bus stops, subway entrances, tram stops and train stations all roll up
/// into the single Transport metric; train stations are additionally
/// counted on their own. Healthcare observations tagged `hospital` also feed
/// a separate hospital metric.
pub fn aggregate_amenities(observations: &[AmenityObservation]) -> AmenitySummary {
    let mut series: HashMap<AmenityCategory, Vec<f64>> = HashMap::new();
    let mut hospital_series = Vec::new();
    let mut train_stations = 0;
    let mut skipped = 0;

    for obs in observations {
        let Some(distance) = usable_distance(obs) else {
            skipped += 1;
            continue;
        };

        series.entry(obs.category).or_default().push(distance);

        match obs.category {
            AmenityCategory::Transport => {
                if obs.transport_mode() == Some(TransportMode::TrainStation) {
                    train_stations += 1;
                }
            }
            AmenityCategory::Healthcare if obs.kind.as_deref() == Some("hospital") => {
                hospital_series.push(distance);
            }
            _ => {}
        }
    }

    let categories = series
        .into_iter()
        .map(|(category, distances)| {
            let metric = metric_from_series(&distances);
            debug!(
                %category,
                count = metric.count,
                average_distance = metric.average_distance,
                "Aggregated category"
            );
            (category, metric)
        })
        .collect();

    AmenitySummary {
        categories,
        train_stations,
        hospitals: metric_from_series(&hospital_series),
        skipped,
    }
}
