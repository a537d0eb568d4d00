pub mod analyzers;
pub mod error;
pub mod facts;
pub mod geo;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod plan;
pub mod scoring;
pub mod tier;

pub use error::{Result, ScoreError};
pub use tier::{CityTier, classify_tier};
