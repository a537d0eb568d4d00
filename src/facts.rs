//! Facts handed to the scoring core by its collaborators.
//!
//! Commune lookups, employment CSVs, the amenity provider and the school
//! register all live outside this crate. They hand over the plain values below;
//! an absent field means "unknown", never zero.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{Result, ScoreError};
use crate::geo::haversine_distance;
use crate::tier::{CityTier, classify_tier};

/// Fixed seating capacity of one classroom.
pub const CLASSROOM_CAPACITY: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Static demographic facts for one commune.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommuneFacts {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub population: Option<u64>,
    /// Inhabitants per km².
    #[serde(default)]
    pub density: Option<f64>,
    #[serde(default)]
    pub area_km2: Option<f64>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

impl CommuneFacts {
    pub fn tier(&self) -> Result<CityTier> {
        classify_tier(self.population, self.density)
    }

    pub fn centroid(&self) -> Option<Coordinates> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(Coordinates { lat, lon }),
            _ => None,
        }
    }
}

/// Unemployment for the commune and job offers for its department.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmploymentFacts {
    #[serde(default)]
    pub unemployed_count: Option<u64>,
    #[serde(default)]
    pub job_offer_count: Option<u64>,
}

impl EmploymentFacts {
    /// Unemployed people per hundred inhabitants, rounded to one decimal.
    ///
    /// # Errors
    ///
    /// [`ScoreError::MissingData`] when either count is unknown and
    /// [`ScoreError::DivisionUndefined`] for a zero population.
    pub fn unemployment_rate(&self, population: Option<u64>) -> Result<f64> {
        let unemployed = self.unemployed_count.ok_or(ScoreError::MissingData {
            field: "unemployed_count",
        })?;
        let population = population.ok_or(ScoreError::MissingData { field: "population" })?;
        if population == 0 {
            return Err(ScoreError::DivisionUndefined {
                what: "unemployment rate",
            });
        }
        let rate = unemployed as f64 * 100.0 / population as f64;
        Ok((rate * 10.0).round() / 10.0)
    }

    /// `"12.3%"`, or `"N/A"` when the rate cannot be computed.
    pub fn unemployment_display(&self, population: Option<u64>) -> String {
        match self.unemployment_rate(population) {
            Ok(rate) => format!("{rate}%"),
            Err(_) => "N/A".to_string(),
        }
    }
}

/// Amenity category as queried from the map provider.
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
pub enum AmenityCategory {
    Shop,
    #[serde(rename = "Food Store")]
    #[strum(to_string = "Food Store", serialize = "FoodStore")]
    FoodStore,
    Healthcare,
    #[serde(rename = "Public Services")]
    #[strum(to_string = "Public Services", serialize = "PublicServices")]
    PublicServices,
    School,
    Transport,
}

/// Sub-mode of a Transport observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    BusStop,
    Subway,
    Tram,
    TrainStation,
}

impl TransportMode {
    /// Maps the provider's tag value onto a transport mode.
    pub fn from_kind(kind: &str) -> Option<TransportMode> {
        match kind {
            "bus_stop" => Some(TransportMode::BusStop),
            "subway" | "subway_entrance" => Some(TransportMode::Subway),
            "tram_stop" => Some(TransportMode::Tram),
            "station" | "train_station" | "halt" => Some(TransportMode::TrainStation),
            _ => None,
        }
    }
}

/// One amenity returned by the map provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmenityObservation {
    pub category: AmenityCategory,
    #[serde(default)]
    pub name: Option<String>,
    /// Provider tag value, e.g. `bus_stop` or `supermarket`.
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    /// Metres from the reference point. Observations without a usable distance
    /// are skipped during aggregation.
    #[serde(default)]
    pub distance: Option<f64>,
}

impl AmenityObservation {
    pub fn transport_mode(&self) -> Option<TransportMode> {
        self.kind.as_deref().and_then(TransportMode::from_kind)
    }

    /// Fills in a missing distance from the observation's own coordinates.
    pub fn with_distance_from(mut self, reference: Coordinates) -> Self {
        if self.distance.is_none() {
            if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
                self.distance = Some(haversine_distance(reference.lat, reference.lon, lat, lon));
            }
        }
        self
    }
}

/// One school from the school register.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolObservation {
    pub commune: String,
    pub total_students: u32,
    pub class_count: u32,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub distance: Option<f64>,
}

impl SchoolObservation {
    pub fn capacity(&self) -> u32 {
        self.class_count.saturating_mul(CLASSROOM_CAPACITY)
    }

    /// Students as a percentage of theoretical capacity.
    ///
    /// # Errors
    ///
    /// [`ScoreError::DivisionUndefined`] when the school declares no classes.
    pub fn occupancy_rate(&self) -> Result<f64> {
        let capacity = self.capacity();
        if capacity == 0 {
            return Err(ScoreError::DivisionUndefined {
                what: "school occupancy rate",
            });
        }
        Ok(self.total_students as f64 / capacity as f64 * 100.0)
    }
}

/// Everything gathered for one scoring request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalityFacts {
    pub commune: CommuneFacts,
    #[serde(default)]
    pub employment: Option<EmploymentFacts>,
    #[serde(default)]
    pub amenities: Vec<AmenityObservation>,
    #[serde(default)]
    pub schools: Vec<SchoolObservation>,
    /// Point distances are measured from; defaults to the commune centroid.
    #[serde(default)]
    pub reference: Option<Coordinates>,
}

impl LocalityFacts {
    pub fn reference_point(&self) -> Option<Coordinates> {
        self.reference.or_else(|| self.commune.centroid())
    }
}
