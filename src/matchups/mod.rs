pub mod aggregator;
pub mod grid;
pub mod weighting;

pub use aggregator::{compute_cell, recompute_cell, recompute_matchups};
pub use grid::{MatchupCell, MatchupGrid};
