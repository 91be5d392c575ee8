use log::info;
use std::collections::HashMap;

use super::grid::{MatchupCell, MatchupGrid};
use super::weighting::recency_weights;
use crate::config::settings::{MatchupMode, MatchupSettings};
use crate::domain::qualification::qualify_all;
use crate::domain::{Character, MatchFilter, MatchStore};

/// Rebuild every matchup cell from the match log.
pub fn recompute_matchups(
    store: &MatchStore,
    filter: &MatchFilter,
    settings: &MatchupSettings,
) -> MatchupGrid {
    let outcomes = collect_outcomes(store, filter);
    let mut grid = MatchupGrid::new();

    for (&(first, second), results) in &outcomes {
        grid.set(first, second, compute_cell(results, settings));
    }

    info!(
        "Computed matchups for {} character pairs",
        grid.defined_count()
    );
    grid
}

/// Recompute a single cell, reading only as far back as the window needs.
pub fn recompute_cell(
    store: &MatchStore,
    filter: &MatchFilter,
    first: Character,
    second: Character,
    settings: &MatchupSettings,
) -> MatchupCell {
    let mut recent: Vec<bool> = store
        .iter()
        .rev()
        .filter_map(|record| filter.qualify(record).ok())
        .filter(|m| m.counts_for_matchups())
        .filter(|m| m.p1_character == first && m.p2_character == second)
        .map(|m| m.p1_won)
        .take(settings.window)
        .collect();
    recent.reverse();

    compute_cell(&recent, settings)
}

/// Win-rate over the most recent `window` results, given oldest first.
pub fn compute_cell(results: &[bool], settings: &MatchupSettings) -> MatchupCell {
    let start = results.len().saturating_sub(settings.window);
    let window = &results[start..];

    if window.is_empty() {
        return MatchupCell::undefined();
    }

    let win_rate = match settings.mode {
        MatchupMode::Unweighted => plain_win_rate(window),
        MatchupMode::Weighted => weighted_win_rate(window, settings.decay),
    };

    MatchupCell {
        win_rate: Some(win_rate),
        matches: window.len(),
    }
}

fn collect_outcomes(
    store: &MatchStore,
    filter: &MatchFilter,
) -> HashMap<(Character, Character), Vec<bool>> {
    let mut outcomes: HashMap<(Character, Character), Vec<bool>> = HashMap::new();

    for m in qualify_all(store, filter) {
        if m.counts_for_matchups() {
            outcomes
                .entry((m.p1_character, m.p2_character))
                .or_default()
                .push(m.p1_won);
        }
    }

    outcomes
}

fn plain_win_rate(window: &[bool]) -> f64 {
    let wins = window.iter().filter(|won| **won).count();
    wins as f64 / window.len() as f64
}

fn weighted_win_rate(window: &[bool], decay: f64) -> f64 {
    let weights = recency_weights(window.len(), decay);
    let total: f64 = weights.iter().sum();
    let won: f64 = window
        .iter()
        .zip(&weights)
        .map(|(won, weight)| if *won { *weight } else { 0.0 })
        .sum();
    won / total
}
