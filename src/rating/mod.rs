mod convergence;
pub mod driver;
pub mod glicko2;
pub mod periods;
pub mod types;

pub use driver::{PeriodCursor, RatingRun, extend_run, recompute_all};
pub use periods::RatingPeriod;
pub use types::{Encounter, RatingState, RatingTable, RatingTables};
