//! Error taxonomy for classification, aggregation and scoring.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScoreError {
    /// A required fact is absent. Only tier classification treats this as fatal;
    /// category scorers fall back to calibrated defaults instead.
    #[error("missing required data: {field}")]
    MissingData { field: &'static str },

    #[error("division undefined while computing {what}")]
    DivisionUndefined { what: &'static str },

    /// A collaborator (CSV lookup, geocoder, Overpass) failed. Never raised by the
    /// scoring core itself; callers use it to report what they could not fetch.
    #[error("upstream source '{source_name}' unavailable: {reason}")]
    UpstreamUnavailable { source_name: String, reason: String },

    #[error("configuration invariant violated: {0}")]
    ConfigInvariantViolated(String),

    #[error("invalid metric {field}: {value}")]
    InvalidMetric { field: &'static str, value: f64 },

    #[error("unknown scoring profile '{0}'")]
    UnknownProfile(String),
}

impl ScoreError {
    /// Returns `true` if retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ScoreError::UpstreamUnavailable { .. })
    }
}

pub type Result<T> = std::result::Result<T, ScoreError>;
