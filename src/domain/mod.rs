pub mod character;
mod collection;
pub mod models;
pub mod qualification;

pub use character::{CHARACTER_COUNT, Character};
pub use collection::MatchStore;
pub use models::*;
pub use qualification::{ExclusionReason, MatchFilter, QualifiedMatch, Resolution};
