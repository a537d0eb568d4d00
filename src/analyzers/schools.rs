use crate::analyzers::types::{OccupancyStatus, SchoolLoadSummary};
use crate::facts::SchoolObservation;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Converts an occupancy rate (percent of theoretical capacity) into a status.
///
/// | Range       | Status                 |
/// |-------------|------------------------|
/// | > 100       | Exceeding Capacity     |
/// | >= 95       | High Occupancy         |
/// | >= 80       | Optimal                |
/// | >= 60       | Normal                 |
/// | >= 40       | Under Capacity         |
/// | < 40        | Severely Underutilized |
pub fn occupancy_status(rate: f64) -> OccupancyStatus {
    match rate {
        r if r > 100.0 => OccupancyStatus::ExceedingCapacity,
        r if r >= 95.0 => OccupancyStatus::HighOccupancy,
        r if r >= 80.0 => OccupancyStatus::Optimal,
        r if r >= 60.0 => OccupancyStatus::Normal,
        r if r >= 40.0 => OccupancyStatus::UnderCapacity,
        _ => OccupancyStatus::SeverelyUnderutilized,
    }
}

/// Builds the occupancy histogram for a set of schools.
///
/// Schools declaring no classes are excluded. Returns `None` when no school
/// could be classified, so callers can tell "no data" from a real zero.
/// Ties for the dominant status go to the alphabetically first label.
pub fn summarize_school_load(schools: &[SchoolObservation]) -> Option<SchoolLoadSummary> {
    let mut histogram: BTreeMap<OccupancyStatus, usize> = BTreeMap::new();
    let mut excluded = 0;

    for school in schools {
        match school.occupancy_rate() {
            Ok(rate) => *histogram.entry(occupancy_status(rate)).or_default() += 1,
            Err(e) => {
                warn!(commune = %school.commune, error = %e, "Excluding school from load summary");
                excluded += 1;
            }
        }
    }

    let total_schools: usize = histogram.values().sum();
    if total_schools == 0 {
        return None;
    }

    let (dominant_status, dominant_count) = histogram
        .iter()
        .map(|(status, count)| (*status, *count))
        .max_by(|(sa, ca), (sb, cb)| {
            ca.cmp(cb)
                .then_with(|| sb.to_string().cmp(&sa.to_string()))
        })?;

    let dominant_share = dominant_count as f64 / total_schools as f64 * 100.0;
    debug!(
        total_schools,
        excluded,
        dominant = %dominant_status,
        dominant_share,
        "Summarized school load"
    );

    Some(SchoolLoadSummary {
        total_schools,
        excluded,
        histogram,
        dominant_status,
        dominant_count,
        dominant_share,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn school(total_students: u32, class_count: u32) -> SchoolObservation {
        SchoolObservation {
            commune: "Le Havre 76600".to_string(),
            total_students,
            class_count,
            lat: None,
            lon: None,
            distance: None,
        }
    }

    #[test]
    fn test_status_boundaries() {
        assert_eq!(occupancy_status(100.1), OccupancyStatus::ExceedingCapacity);
        assert_eq!(occupancy_status(100.0), OccupancyStatus::HighOccupancy);
        assert_eq!(occupancy_status(95.0), OccupancyStatus::HighOccupancy);
        assert_eq!(occupancy_status(94.9), OccupancyStatus::Optimal);
        assert_eq!(occupancy_status(80.0), OccupancyStatus::Optimal);
        assert_eq!(occupancy_status(79.9), OccupancyStatus::Normal);
        assert_eq!(occupancy_status(60.0), OccupancyStatus::Normal);
        assert_eq!(occupancy_status(59.9), OccupancyStatus::UnderCapacity);
        assert_eq!(occupancy_status(40.0), OccupancyStatus::UnderCapacity);
        assert_eq!(occupancy_status(39.9), OccupancyStatus::SeverelyUnderutilized);
        assert_eq!(occupancy_status(0.0), OccupancyStatus::SeverelyUnderutilized);
    }

    #[test]
    fn test_full_school_is_high_occupancy() {
        let summary = summarize_school_load(&[school(150, 5)]).unwrap();
        assert_eq!(summary.dominant_status, OccupancyStatus::HighOccupancy);
        assert_eq!(summary.count(OccupancyStatus::ExceedingCapacity), 0);
    }

    #[test]
    fn test_empty_input_is_no_data() {
        assert!(summarize_school_load(&[]).is_none());
    }

    #[test]
    fn test_school_without_classes_is_excluded() {
        let summary = summarize_school_load(&[school(40, 0), school(100, 4)]).unwrap();
        assert_eq!(summary.total_schools, 1);
        assert_eq!(summary.excluded, 1);
        assert_eq!(summary.count(OccupancyStatus::Optimal), 1); // 100 / 120 = 83%

        assert!(summarize_school_load(&[school(40, 0)]).is_none());
    }

    #[test]
    fn test_histogram_and_dominant_share() {
        let schools = vec![
            school(100, 4), // 83% Optimal
            school(90, 4),  // 75% Normal
            school(200, 5), // 133% Exceeding
            school(95, 4),  // 79% Normal
        ];

        let summary = summarize_school_load(&schools).unwrap();

        assert_eq!(summary.total_schools, 4);
        assert_eq!(summary.count(OccupancyStatus::Normal), 2);
        assert_eq!(summary.dominant_status, OccupancyStatus::Normal);
        assert_eq!(summary.dominant_count, 2);
        assert_eq!(summary.dominant_share, 50.0);
    }

    #[test]
    fn test_tie_breaks_alphabetically() {
        // One "Optimal" and one "Normal": "Normal" sorts first.
        let summary = summarize_school_load(&[school(100, 4), school(90, 4)]).unwrap();
        assert_eq!(summary.dominant_status, OccupancyStatus::Normal);

        // Same inputs reversed pick the same status.
        let summary = summarize_school_load(&[school(90, 4), school(100, 4)]).unwrap();
        assert_eq!(summary.dominant_status, OccupancyStatus::Normal);
    }
}
