use chrono::NaiveDate;
use log::info;

use super::glicko2;
use super::periods::{RatingPeriod, gap_days, segment};
use super::types::{Encounter, RatingState, RatingTables};
use crate::config::settings::RatingSettings;
use crate::domain::qualification::qualify_all;
use crate::domain::{Character, MatchFilter, MatchStore, PlayerSlot, QualifiedMatch};
use crate::errors::RatingConvergenceError;

/// The latest rating period together with the tables it started from.
///
/// Keeping the opening tables lets a new match on the same day be folded in by redoing only
/// the two affected characters.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodCursor {
    pub day: NaiveDate,
    pub opening: RatingTables,
    pub matches: Vec<QualifiedMatch>,
}

/// Result of running rating periods in order
#[derive(Debug, Clone, PartialEq)]
pub struct RatingRun {
    pub tables: RatingTables,
    pub cursor: Option<PeriodCursor>,
    pub periods: usize,
}

impl RatingRun {
    pub fn initial(settings: &RatingSettings) -> Self {
        Self {
            tables: RatingTables::initial(settings),
            cursor: None,
            periods: 0,
        }
    }
}

/// Rebuild both rating tables from the whole match log.
pub fn recompute_all(
    store: &MatchStore,
    filter: &MatchFilter,
    settings: &RatingSettings,
) -> Result<RatingRun, RatingConvergenceError> {
    let qualified = qualify_all(store, filter);
    info!(
        "Rating {} of {} stored matches",
        qualified.len(),
        store.len()
    );

    let run = run_periods(segment(qualified), settings)?;
    info!("Applied {} rating periods", run.periods);
    Ok(run)
}

/// Apply periods strictly in the given (chronological) order, starting from default states.
pub fn run_periods(
    periods: Vec<RatingPeriod>,
    settings: &RatingSettings,
) -> Result<RatingRun, RatingConvergenceError> {
    let mut run = RatingRun::initial(settings);

    for period in periods {
        let next = apply_period(&run.tables, &period, settings)?;
        let opening = std::mem::replace(&mut run.tables, next);
        run.cursor = Some(PeriodCursor {
            day: period.day,
            opening,
            matches: period.matches,
        });
        run.periods += 1;
    }

    Ok(run)
}

/// Update every character of both players for one period.
///
/// Opponent ratings are read from `prior`, the state at the start of the period.
pub fn apply_period(
    prior: &RatingTables,
    period: &RatingPeriod,
    settings: &RatingSettings,
) -> Result<RatingTables, RatingConvergenceError> {
    let mut next = prior.clone();

    for slot in PlayerSlot::BOTH {
        for character in Character::ALL {
            let state = update_character(prior, &period.matches, slot, character, period.day, settings)?;
            next.table_mut(slot).set(character, state);
        }
    }

    Ok(next)
}

/// Fold one more qualifying match into a run without replaying history.
///
/// Returns `None` when the match predates the run's latest period; only a full recompute
/// can place it correctly.
pub fn extend_run(
    run: &RatingRun,
    new_match: QualifiedMatch,
    settings: &RatingSettings,
) -> Result<Option<RatingRun>, RatingConvergenceError> {
    let Some(cursor) = &run.cursor else {
        return start_period(run.tables.clone(), new_match, run.periods, settings).map(Some);
    };

    let day = new_match.day();
    if day < cursor.day {
        return Ok(None);
    }

    if day > cursor.day {
        let mut tables = run.tables.clone();
        let mut periods = run.periods;
        for gap in gap_days(cursor.day, day) {
            tables = apply_period(&tables, &RatingPeriod::empty(gap), settings)?;
            periods += 1;
        }
        return start_period(tables, new_match, periods, settings).map(Some);
    }

    let mut matches = cursor.matches.clone();
    let position = matches.partition_point(|m| m.timestamp < new_match.timestamp);
    matches.insert(position, new_match.clone());

    let mut tables = run.tables.clone();
    for slot in PlayerSlot::BOTH {
        let character = new_match.character(slot);
        let state = update_character(&cursor.opening, &matches, slot, character, cursor.day, settings)?;
        tables.table_mut(slot).set(character, state);
    }

    Ok(Some(RatingRun {
        tables,
        cursor: Some(PeriodCursor {
            day: cursor.day,
            opening: cursor.opening.clone(),
            matches,
        }),
        periods: run.periods,
    }))
}

fn start_period(
    opening: RatingTables,
    new_match: QualifiedMatch,
    periods: usize,
    settings: &RatingSettings,
) -> Result<RatingRun, RatingConvergenceError> {
    let period = RatingPeriod {
        day: new_match.day(),
        matches: vec![new_match],
    };
    let tables = apply_period(&opening, &period, settings)?;

    Ok(RatingRun {
        tables,
        cursor: Some(PeriodCursor {
            day: period.day,
            opening,
            matches: period.matches,
        }),
        periods: periods + 1,
    })
}

fn update_character(
    opening: &RatingTables,
    matches: &[QualifiedMatch],
    slot: PlayerSlot,
    character: Character,
    day: NaiveDate,
    settings: &RatingSettings,
) -> Result<RatingState, RatingConvergenceError> {
    let encounters = encounters_for(opening, matches, slot, character);

    glicko2::update(opening.get(slot, character), &encounters, settings).map_err(|source| {
        RatingConvergenceError {
            slot,
            character,
            period: day,
            source,
        }
    })
}

/// Games of `character` played by `slot`, rated against the opponents' period-start states
pub fn encounters_for(
    opening: &RatingTables,
    matches: &[QualifiedMatch],
    slot: PlayerSlot,
    character: Character,
) -> Vec<Encounter> {
    let opponent = slot.opponent();

    matches
        .iter()
        .filter(|m| m.character(slot) == character)
        .map(|m| Encounter::against(opening.get(opponent, m.character(opponent)), m.won(slot)))
        .collect()
}
