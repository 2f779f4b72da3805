pub mod config;
pub mod engine;
pub mod factors;
pub mod validation;

pub use config::{Factor, ScoringConfig};
pub use engine::{calculate_score, score_batch, FactorContribution, ScoreBatch, ScoredProduct, TierFallback};
pub use factors::{BatchRanges, FactorRange, NEUTRAL};
pub use validation::{validate_scoring, ConfigErrors};
