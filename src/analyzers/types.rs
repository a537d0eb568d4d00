//! Derived metrics produced by aggregation and consumed by the scorers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumString};

use crate::facts::AmenityCategory;

/// Count and mean distance of one amenity category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AmenityMetric {
    pub count: usize,
    /// Metres, rounded to one decimal. 0 when `count` is 0.
    pub average_distance: f64,
}

impl AmenityMetric {
    pub fn new(count: usize, average_distance: f64) -> Self {
        Self {
            count,
            average_distance,
        }
    }

    /// Mean distance, or `None` when nothing was observed.
    pub fn mean_distance(&self) -> Option<f64> {
        (self.count > 0).then_some(self.average_distance)
    }
}

/// Per-category metrics for one locality.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AmenitySummary {
    pub categories: BTreeMap<AmenityCategory, AmenityMetric>,
    /// Train stations counted inside the Transport roll-up.
    pub train_stations: usize,
    /// Healthcare observations tagged as hospitals.
    pub hospitals: AmenityMetric,
    /// Observations dropped for lacking a usable distance.
    pub skipped: usize,
}

impl AmenitySummary {
    /// Metric for `category`, zeroed when nothing was observed.
    pub fn get(&self, category: AmenityCategory) -> AmenityMetric {
        self.categories.get(&category).copied().unwrap_or_default()
    }
}

/// Occupancy label for a school's students-to-capacity ratio.
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
pub enum OccupancyStatus {
    #[serde(rename = "Exceeding Capacity")]
    #[strum(serialize = "Exceeding Capacity")]
    ExceedingCapacity,
    #[serde(rename = "High Occupancy")]
    #[strum(serialize = "High Occupancy")]
    HighOccupancy,
    Optimal,
    Normal,
    #[serde(rename = "Under Capacity")]
    #[strum(serialize = "Under Capacity")]
    UnderCapacity,
    #[serde(rename = "Severely Underutilized")]
    #[strum(serialize = "Severely Underutilized")]
    SeverelyUnderutilized,
}

/// Occupancy histogram over the schools of a locality.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchoolLoadSummary {
    /// Schools that could be classified.
    pub total_schools: usize,
    /// Schools dropped because they declare no classes.
    pub excluded: usize,
    pub histogram: BTreeMap<OccupancyStatus, usize>,
    pub dominant_status: OccupancyStatus,
    pub dominant_count: usize,
    /// Percentage of classified schools carrying the dominant status.
    pub dominant_share: f64,
}

impl SchoolLoadSummary {
    pub fn count(&self, status: OccupancyStatus) -> usize {
        self.histogram.get(&status).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkMetrics {
    pub population: Option<u64>,
    /// Percent of inhabitants.
    pub unemployment_rate: Option<f64>,
    /// Job offers for the whole department.
    pub job_offers: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransportMetrics {
    pub transport: AmenityMetric,
    pub train_stations: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PublicServicesMetrics {
    pub services: AmenityMetric,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EducationMetrics {
    pub schools: AmenityMetric,
    pub load: Option<SchoolLoadSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommerceMetrics {
    pub shops: AmenityMetric,
    pub food_stores: AmenityMetric,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HealthMetrics {
    pub healthcare: AmenityMetric,
    pub hospitals: AmenityMetric,
}

/// Typed metrics for all six scoring categories.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LocalityMetrics {
    pub work: WorkMetrics,
    pub transport: TransportMetrics,
    pub public_services: PublicServicesMetrics,
    pub education: EducationMetrics,
    pub commerce: CommerceMetrics,
    pub health: HealthMetrics,
}

impl LocalityMetrics {
    /// Splits an amenity summary into per-category metrics.
    pub fn from_parts(
        work: WorkMetrics,
        amenities: &AmenitySummary,
        school_load: Option<SchoolLoadSummary>,
    ) -> Self {
        Self {
            work,
            transport: TransportMetrics {
                transport: amenities.get(AmenityCategory::Transport),
                train_stations: amenities.train_stations,
            },
            public_services: PublicServicesMetrics {
                services: amenities.get(AmenityCategory::PublicServices),
            },
            education: EducationMetrics {
                schools: amenities.get(AmenityCategory::School),
                load: school_load,
            },
            commerce: CommerceMetrics {
                shops: amenities.get(AmenityCategory::Shop),
                food_stores: amenities.get(AmenityCategory::FoodStore),
            },
            health: HealthMetrics {
                healthcare: amenities.get(AmenityCategory::Healthcare),
                hospitals: amenities.hospitals,
            },
        }
    }
}
