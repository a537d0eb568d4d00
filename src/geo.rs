//! Great-circle distances and radius filtering.

use tracing::warn;

use crate::facts::{Coordinates, SchoolObservation};

const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine distance in metres between two points given in degrees.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_phi = (lat2 - lat1).to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Schools within `radius` metres of `reference`, nearest first.
///
/// Located schools (coordinates, or a distance supplied by the register) carry
/// their distance and are dropped when out of range. Schools with no location
/// at all come from a commune lookup and are kept after the located ones.
pub fn schools_within_radius(
    schools: &[SchoolObservation],
    reference: Coordinates,
    radius: f64,
) -> Vec<SchoolObservation> {
    let mut nearby = Vec::new();
    let mut unlocated = Vec::new();

    for school in schools {
        let distance = match (school.lat, school.lon) {
            (Some(lat), Some(lon)) => haversine_distance(reference.lat, reference.lon, lat, lon),
            _ => match school.distance {
                Some(d) => d,
                None => {
                    unlocated.push(school.clone());
                    continue;
                }
            },
        };
        if distance <= radius {
            nearby.push(SchoolObservation {
                distance: Some(distance),
                ..school.clone()
            });
        } else {
            warn!(
                commune = %school.commune,
                distance,
                radius,
                "Dropping school outside search radius"
            );
        }
    }

    nearby.sort_by(|a, b| {
        a.distance
            .unwrap_or_default()
            .total_cmp(&b.distance.unwrap_or_default())
    });
    nearby.extend(unlocated);
    nearby
}
