use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::domain::{Character, PlayerSlot, QualifiedMatch};
use crate::rating::RatingTables;

/// Rating movement of the character one player used in a match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingDelta {
    pub character: Character,
    pub before: f64,
    pub after: f64,
}

impl RatingDelta {
    pub fn change(&self) -> f64 {
        self.after - self.before
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentResult {
    pub timestamp: DateTime<Utc>,
    pub winner: PlayerSlot,
    pub p1: RatingDelta,
    pub p2: RatingDelta,
}

impl RecentResult {
    /// Describe a just-rated match by comparing the tables before and after it.
    pub fn between(played: &QualifiedMatch, before: &RatingTables, after: &RatingTables) -> Self {
        let delta = |slot: PlayerSlot| {
            let character = played.character(slot);
            RatingDelta {
                character,
                before: before.get(slot, character).rating,
                after: after.get(slot, character).rating,
            }
        };

        Self {
            timestamp: played.timestamp,
            winner: played.winner(),
            p1: delta(PlayerSlot::P1),
            p2: delta(PlayerSlot::P2),
        }
    }
}

/// Fixed-capacity buffer of the latest rated matches, oldest evicted first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentResults {
    capacity: usize,
    entries: VecDeque<RecentResult>,
}

impl RecentResults {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, result: RecentResult) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(result);
    }

    /// Most recent first
    pub fn iter(&self) -> impl Iterator<Item = &RecentResult> {
        self.entries.iter().rev()
    }

    pub fn latest(&self) -> Option<&RecentResult> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
