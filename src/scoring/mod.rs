pub mod category;
pub mod composite;
pub mod curves;
pub mod profile;
mod profiles;

pub use category::{Category, CategoryScorer};
pub use composite::{CompositeOutcome, CompositeScorer, ScoreReport};
pub use profile::{ProfileName, ScoringProfile};
