//! Aggregation of raw observations into scoring metrics.
//!
//! Amenity observations become per-category counts and mean distances,
//! school observations become an occupancy histogram.

pub mod aggregate;
pub mod schools;
pub mod types;
pub mod utility;
