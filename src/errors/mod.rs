use chrono::NaiveDate;
use std::path::Path;
use thiserror::Error;

use crate::domain::{Character, PlayerSlot};

/// The volatility root finder ran out of iterations.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("volatility iteration did not converge within {iterations} iterations")]
pub struct VolatilityDivergence {
    pub iterations: usize,
}

/// A rating update failed for one character in one rating period.
///
/// Carries enough context for callers to log the offending period and retry with different
/// tolerances or skip it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("rating of {slot:?} {character} did not converge in period {period}")]
pub struct RatingConvergenceError {
    pub slot: PlayerSlot,
    pub character: Character,
    pub period: NaiveDate,
    #[source]
    pub source: VolatilityDivergence,
}

/// Context for cache errors
pub fn cache_context(operation: &str, key: &str) -> String {
    format!("Failed to {} cache for key: {}", operation, key)
}

/// Context for match record import errors
pub fn import_context(path: &Path) -> String {
    format!("Failed to import match records from: {}", path.display())
}
