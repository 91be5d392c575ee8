use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::settings::RatingSettings;
use crate::domain::{CHARACTER_COUNT, Character, PlayerSlot};

/// Glicko-2 state of one character for one player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingState {
    pub rating: f64,
    pub rd: f64,
    pub volatility: f64,
    /// Lifetime number of rated games
    pub matches: u32,
}

impl RatingState {
    pub fn initial(settings: &RatingSettings) -> Self {
        Self {
            rating: settings.default_rating,
            rd: settings.default_rd,
            volatility: settings.default_volatility,
            matches: 0,
        }
    }
}

impl Default for RatingState {
    fn default() -> Self {
        Self::initial(&RatingSettings::default())
    }
}

/// One game against an opponent within a rating period
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Encounter {
    pub opponent_rating: f64,
    pub opponent_rd: f64,
    /// 1.0 for a win, 0.0 for a loss
    pub score: f64,
}

impl Encounter {
    pub fn new(opponent_rating: f64, opponent_rd: f64, score: f64) -> Self {
        Self {
            opponent_rating,
            opponent_rd,
            score,
        }
    }

    pub fn against(opponent: &RatingState, won: bool) -> Self {
        Self::new(opponent.rating, opponent.rd, if won { 1.0 } else { 0.0 })
    }
}

/// Rating state of every character for one player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    into = "BTreeMap<Character, RatingState>",
    from = "BTreeMap<Character, RatingState>"
)]
pub struct RatingTable {
    states: [RatingState; CHARACTER_COUNT],
}

impl RatingTable {
    pub fn initial(settings: &RatingSettings) -> Self {
        Self {
            states: [RatingState::initial(settings); CHARACTER_COUNT],
        }
    }

    pub fn get(&self, character: Character) -> &RatingState {
        &self.states[character.index()]
    }

    pub fn set(&mut self, character: Character, state: RatingState) {
        self.states[character.index()] = state;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Character, &RatingState)> {
        Character::ALL.iter().copied().zip(self.states.iter())
    }

    /// Characters ordered from highest to lowest rating
    pub fn ranked(&self) -> Vec<(Character, RatingState)> {
        let mut ranked: Vec<_> = self.iter().map(|(c, s)| (c, *s)).collect();
        ranked.sort_by(|a, b| b.1.rating.total_cmp(&a.1.rating));
        ranked
    }
}

impl Default for RatingTable {
    fn default() -> Self {
        Self::initial(&RatingSettings::default())
    }
}

impl From<RatingTable> for BTreeMap<Character, RatingState> {
    fn from(table: RatingTable) -> Self {
        table.iter().map(|(c, s)| (c, *s)).collect()
    }
}

impl From<BTreeMap<Character, RatingState>> for RatingTable {
    fn from(map: BTreeMap<Character, RatingState>) -> Self {
        let mut table = RatingTable::default();
        for (character, state) in map {
            table.set(character, state);
        }
        table
    }
}

/// The two independent per-player rating tables
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RatingTables {
    #[serde(rename = "P1")]
    pub p1: RatingTable,
    #[serde(rename = "P2")]
    pub p2: RatingTable,
}

impl RatingTables {
    pub fn initial(settings: &RatingSettings) -> Self {
        Self {
            p1: RatingTable::initial(settings),
            p2: RatingTable::initial(settings),
        }
    }

    pub fn table(&self, slot: PlayerSlot) -> &RatingTable {
        match slot {
            PlayerSlot::P1 => &self.p1,
            PlayerSlot::P2 => &self.p2,
        }
    }

    pub fn table_mut(&mut self, slot: PlayerSlot) -> &mut RatingTable {
        match slot {
            PlayerSlot::P1 => &mut self.p1,
            PlayerSlot::P2 => &mut self.p2,
        }
    }

    pub fn get(&self, slot: PlayerSlot, character: Character) -> &RatingState {
        self.table(slot).get(character)
    }
}
