use chrono::{DateTime, NaiveDate, Utc};
use log::debug;
use std::fmt;

use super::character::Character;
use super::collection::MatchStore;
use super::models::{MatchRecord, PlayerSlot, SideRecord};
use crate::config::settings::{AppConfig, FilterSettings, PlayerSettings};

/// How the record's sides map onto the tracked players.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Record side 1 is the canonical P1 player
    Direct,
    /// Record side 1 is the P2 player
    Swapped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionReason {
    Ignored,
    OutsideDateRange,
    TooShort,
    QuitDisallowed,
    UnknownPlayers,
    UnknownCharacter,
    AmbiguousResult,
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ExclusionReason::Ignored => "flagged as ignored",
            ExclusionReason::OutsideDateRange => "outside the configured date range",
            ExclusionReason::TooShort => "shorter than the minimum duration",
            ExclusionReason::QuitDisallowed => "ended by a quit",
            ExclusionReason::UnknownPlayers => "players could not be identified",
            ExclusionReason::UnknownCharacter => "unknown character id",
            ExclusionReason::AmbiguousResult => "no single winner",
        };
        f.write_str(text)
    }
}

/// A match that passed every filter, expressed from the tracked players' point of view.
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedMatch {
    pub timestamp: DateTime<Utc>,
    /// Character played by the P1 player
    pub p1_character: Character,
    /// Character played by the P2 player
    pub p2_character: Character,
    pub p1_won: bool,
    pub resolution: Resolution,
    pub quit: bool,
}

impl QualifiedMatch {
    pub fn day(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    pub fn character(&self, slot: PlayerSlot) -> Character {
        match slot {
            PlayerSlot::P1 => self.p1_character,
            PlayerSlot::P2 => self.p2_character,
        }
    }

    pub fn won(&self, slot: PlayerSlot) -> bool {
        match slot {
            PlayerSlot::P1 => self.p1_won,
            PlayerSlot::P2 => !self.p1_won,
        }
    }

    pub fn winner(&self) -> PlayerSlot {
        if self.p1_won {
            PlayerSlot::P1
        } else {
            PlayerSlot::P2
        }
    }

    /// Matchup charts only use matches with the canonical player in the first slot, never quits.
    pub fn counts_for_matchups(&self) -> bool {
        self.resolution == Resolution::Direct && !self.quit
    }
}

/// Win flags of both record sides after the quit override.
///
/// When a side quit out, the side that did not initiate the quit wins regardless of placements.
pub fn effective_result(record: &MatchRecord) -> (bool, bool) {
    match record.lras_initiator {
        Some(initiator) => (record.p1.port != initiator, record.p2.port != initiator),
        None => (record.p1.won, record.p2.won),
    }
}

/// The inclusion policy applied before any rating or matchup computation
#[derive(Debug, Clone)]
pub struct MatchFilter {
    filter: FilterSettings,
    players: PlayerSettings,
}

impl MatchFilter {
    pub fn new(filter: FilterSettings, players: PlayerSettings) -> Self {
        Self { filter, players }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.filter.clone(), config.players.clone())
    }

    pub fn qualify(&self, record: &MatchRecord) -> Result<QualifiedMatch, ExclusionReason> {
        if record.ignore {
            return Err(ExclusionReason::Ignored);
        }

        if !self.within_date_range(record) {
            return Err(ExclusionReason::OutsideDateRange);
        }

        if record.duration_seconds(self.filter.frames_per_second)
            < self.filter.min_game_duration_seconds
        {
            return Err(ExclusionReason::TooShort);
        }

        if record.is_quit() && !self.filter.allow_exit {
            return Err(ExclusionReason::QuitDisallowed);
        }

        let resolution = self.resolve(record)?;
        let first = character_of(&record.p1)?;
        let second = character_of(&record.p2)?;

        let (first_won, second_won) = effective_result(record);
        if first_won == second_won {
            return Err(ExclusionReason::AmbiguousResult);
        }

        let (p1_character, p2_character, p1_won) = match resolution {
            Resolution::Direct => (first, second, first_won),
            Resolution::Swapped => (second, first, second_won),
        };

        Ok(QualifiedMatch {
            timestamp: record.timestamp,
            p1_character,
            p2_character,
            p1_won,
            resolution,
            quit: record.is_quit(),
        })
    }

    /// Map record sides to tracked players, by netplay code when present, otherwise by port.
    pub fn resolve(&self, record: &MatchRecord) -> Result<Resolution, ExclusionReason> {
        let (p1, p2) = (&self.players.p1, &self.players.p2);

        if is_netplay(record) {
            resolve_pair(&record.p1.code, &record.p2.code, &p1.code, &p2.code)
        } else {
            resolve_pair(&record.p1.port, &record.p2.port, &p1.port, &p2.port)
        }
    }

    fn within_date_range(&self, record: &MatchRecord) -> bool {
        match self.filter.date_range {
            Some((start, end)) => record.timestamp >= start && record.timestamp <= end,
            None => true,
        }
    }
}

fn is_netplay(record: &MatchRecord) -> bool {
    !record.p1.code.is_empty() || !record.p2.code.is_empty()
}

fn resolve_pair<T: PartialEq>(
    first: &T,
    second: &T,
    p1: &T,
    p2: &T,
) -> Result<Resolution, ExclusionReason> {
    if first == p1 && second == p2 {
        Ok(Resolution::Direct)
    } else if first == p2 && second == p1 {
        Ok(Resolution::Swapped)
    } else {
        Err(ExclusionReason::UnknownPlayers)
    }
}

fn character_of(side: &SideRecord) -> Result<Character, ExclusionReason> {
    Character::from_id(side.character).ok_or(ExclusionReason::UnknownCharacter)
}

/// Qualify every stored match, in timestamp order, dropping the excluded ones.
pub fn qualify_all(store: &MatchStore, filter: &MatchFilter) -> Vec<QualifiedMatch> {
    store
        .iter()
        .filter_map(|record| match filter.qualify(record) {
            Ok(qualified) => Some(qualified),
            Err(reason) => {
                debug!("Excluding match {}: {}", record.timestamp, reason);
                None
            }
        })
        .collect()
}
