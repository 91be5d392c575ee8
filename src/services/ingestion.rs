use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::history::{RecentResult, RecentResults};
use crate::config::settings::AppConfig;
use crate::domain::{ExclusionReason, MatchFilter, MatchRecord, MatchStore, PlayerSlot, QualifiedMatch};
use crate::errors::RatingConvergenceError;
use crate::matchups::{MatchupGrid, recompute_cell, recompute_matchups};
use crate::rating::{RatingRun, RatingTables, extend_run, recompute_all};

/// Everything derived from the match log at one point in time.
///
/// Snapshots are never modified after publication; every successful recompute replaces the
/// pipeline's snapshot wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub ratings: RatingTables,
    pub matchups: MatchupGrid,
    pub recent: RecentResults,
    /// Winner of the latest qualifying match
    pub last_winner: Option<PlayerSlot>,
    pub stored_matches: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecomputeStrategy {
    /// Re-derive everything from the whole store
    Full,
    /// Apply only the new match, falling back to `Full` when it cannot be placed
    Incremental,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Rated,
    /// Stored, but filtered out of every computation
    Excluded(ExclusionReason),
    /// Timestamp already stored; nothing changed
    Duplicate,
}

/// Owns the match log and keeps the published snapshot in sync with it.
///
/// Takes `&mut self` for every mutation, so exactly one recompute can be in flight.
pub struct IngestionPipeline {
    config: AppConfig,
    filter: MatchFilter,
    store: MatchStore,
    run: RatingRun,
    snapshot: Arc<Snapshot>,
}

impl IngestionPipeline {
    pub fn new(config: AppConfig, store: MatchStore) -> Result<Self, RatingConvergenceError> {
        let filter = MatchFilter::from_config(&config);
        let run = recompute_all(&store, &filter, &config.rating)?;
        let matchups = recompute_matchups(&store, &filter, &config.matchups);
        let recent = RecentResults::new(config.history.capacity);

        let snapshot = Snapshot {
            ratings: run.tables.clone(),
            matchups,
            recent,
            last_winner: latest_winner(&store, &filter),
            stored_matches: store.len(),
        };

        Ok(Self {
            config,
            filter,
            store,
            run,
            snapshot: Arc::new(snapshot),
        })
    }

    /// The latest published snapshot
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot)
    }

    pub fn store(&self) -> &MatchStore {
        &self.store
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Store a record and bring the snapshot up to date.
    ///
    /// On error the record is taken out of the store again and the previous snapshot stays
    /// published.
    pub fn ingest(
        &mut self,
        record: MatchRecord,
        strategy: RecomputeStrategy,
    ) -> Result<IngestOutcome, RatingConvergenceError> {
        let timestamp = record.timestamp;
        let qualified = self.filter.qualify(&record);

        if !self.store.insert(record) {
            debug!("Match {} already stored", timestamp);
            return Ok(IngestOutcome::Duplicate);
        }

        let result = match (strategy, qualified) {
            (_, Err(reason)) => {
                debug!("Stored match {} excluded: {}", timestamp, reason);
                if strategy == RecomputeStrategy::Full {
                    self.rebuild(None).map(|_| IngestOutcome::Excluded(reason))
                } else {
                    self.republish();
                    Ok(IngestOutcome::Excluded(reason))
                }
            }
            (RecomputeStrategy::Full, Ok(played)) => {
                self.rebuild(Some(&played)).map(|_| IngestOutcome::Rated)
            }
            (RecomputeStrategy::Incremental, Ok(played)) => {
                self.extend(&played).map(|_| IngestOutcome::Rated)
            }
        };

        if let Err(e) = &result {
            error!("Recompute after match {} failed, keeping previous snapshot: {}", timestamp, e);
            self.rollback(&timestamp);
        }

        result
    }

    /// Re-derive the snapshot from the whole store.
    pub fn recompute_full(&mut self) -> Result<(), RatingConvergenceError> {
        self.rebuild(None).inspect_err(|e| {
            error!("Full recompute failed, keeping previous snapshot: {}", e);
        })
    }

    fn rebuild(&mut self, played: Option<&QualifiedMatch>) -> Result<(), RatingConvergenceError> {
        let run = recompute_all(&self.store, &self.filter, &self.config.rating)?;
        let matchups = recompute_matchups(&self.store, &self.filter, &self.config.matchups);
        self.publish(run, matchups, played);
        Ok(())
    }

    fn extend(&mut self, played: &QualifiedMatch) -> Result<(), RatingConvergenceError> {
        let Some(run) = extend_run(&self.run, played.clone(), &self.config.rating)? else {
            warn!(
                "Match {} predates the latest rating period, recomputing from scratch",
                played.timestamp
            );
            return self.rebuild(Some(played));
        };

        let mut matchups = self.snapshot.matchups.clone();
        if played.counts_for_matchups() {
            let (first, second) = (played.p1_character, played.p2_character);
            let cell = recompute_cell(&self.store, &self.filter, first, second, &self.config.matchups);
            matchups.set(first, second, cell);
        }

        self.publish(run, matchups, Some(played));
        info!("Applied match {} incrementally", played.timestamp);
        Ok(())
    }

    fn publish(&mut self, run: RatingRun, matchups: MatchupGrid, played: Option<&QualifiedMatch>) {
        let mut recent = self.snapshot.recent.clone();
        if let Some(played) = played {
            recent.push(RecentResult::between(played, &self.run.tables, &run.tables));
        }

        let snapshot = Snapshot {
            ratings: run.tables.clone(),
            matchups,
            recent,
            last_winner: latest_winner(&self.store, &self.filter),
            stored_matches: self.store.len(),
        };

        self.run = run;
        self.snapshot = Arc::new(snapshot);
    }

    /// Publish a copy that only reflects the new store size.
    fn republish(&mut self) {
        let mut snapshot = Snapshot::clone(&self.snapshot);
        snapshot.stored_matches = self.store.len();
        self.snapshot = Arc::new(snapshot);
    }

    fn rollback(&mut self, timestamp: &DateTime<Utc>) {
        self.store.remove(timestamp);
    }
}

fn latest_winner(store: &MatchStore, filter: &MatchFilter) -> Option<PlayerSlot> {
    store
        .iter()
        .rev()
        .find_map(|record| filter.qualify(record).ok())
        .map(|played| played.winner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Character, EndType, MatchKind, SideRecord};
    use crate::rating::RatingState;
    use chrono::TimeZone;

    fn side(code: &str, port: i32, character: Character, won: bool) -> SideRecord {
        SideRecord {
            code: code.to_string(),
            port,
            character: character.id(),
            stocks: if won { 1 } else { 0 },
            won,
        }
    }

    fn record(day: u32, hour: u32, p1: Character, p2: Character, p1_won: bool) -> MatchRecord {
        MatchRecord {
            timestamp: Utc.with_ymd_and_hms(2024, 12, day, hour, 0, 0).unwrap(),
            stage: 32,
            p1: side("LY＃863", 1, p1, p1_won),
            p2: side("KEKW＃849", 2, p2, !p1_won),
            end_type: EndType::Normal,
            lras_initiator: None,
            frames: 60 * 150,
            ignore: false,
            kind: MatchKind::Netplay,
        }
    }

    fn session() -> Vec<MatchRecord> {
        let mut swapped = record(2, 19, Character::Sheik, Character::Fox, true);
        std::mem::swap(&mut swapped.p1, &mut swapped.p2);
        let mut quit = record(4, 22, Character::Fox, Character::Falco, true);
        quit.end_type = EndType::Quit;
        quit.lras_initiator = Some(1);
        let mut short = record(4, 23, Character::Fox, Character::Falco, true);
        short.frames = 100;

        vec![
            record(1, 18, Character::Fox, Character::Falco, true),
            record(1, 19, Character::Fox, Character::Falco, false),
            record(1, 20, Character::Marth, Character::Sheik, true),
            swapped,
            record(2, 20, Character::Fox, Character::Falco, true),
            quit,
            short,
            record(7, 12, Character::Peach, Character::Falco, false),
            record(7, 13, Character::Fox, Character::Falco, true),
        ]
    }

    fn pipeline(config: AppConfig) -> IngestionPipeline {
        IngestionPipeline::new(config, MatchStore::new()).unwrap()
    }

    fn allow_exit() -> AppConfig {
        let mut config = AppConfig::new();
        config.filter.allow_exit = true;
        config
    }

    #[test]
    fn empty_log_publishes_defaults() {
        let snapshot = pipeline(AppConfig::new()).snapshot();

        assert_eq!(snapshot.ratings, RatingTables::initial(&AppConfig::new().rating));
        assert_eq!(snapshot.matchups.defined_count(), 0);
        assert!(snapshot.recent.is_empty());
        assert_eq!(snapshot.last_winner, None);
    }

    #[test]
    fn duplicate_ingest_changes_nothing() {
        let mut pipeline = pipeline(AppConfig::new());
        let first = record(1, 18, Character::Fox, Character::Falco, true);

        assert_eq!(
            pipeline.ingest(first.clone(), RecomputeStrategy::Incremental).unwrap(),
            IngestOutcome::Rated
        );
        let before = pipeline.snapshot();

        assert_eq!(
            pipeline.ingest(first, RecomputeStrategy::Incremental).unwrap(),
            IngestOutcome::Duplicate
        );
        assert!(Arc::ptr_eq(&before, &pipeline.snapshot()));
        assert_eq!(pipeline.store().len(), 1);
    }

    #[test]
    fn incremental_ingest_matches_full_recompute() {
        for config in [AppConfig::new(), allow_exit()] {
            let mut incremental = pipeline(config.clone());
            for record in session() {
                incremental.ingest(record, RecomputeStrategy::Incremental).unwrap();
            }

            let full = IngestionPipeline::new(config, MatchStore::from_records(session())).unwrap();

            let (a, b) = (incremental.snapshot(), full.snapshot());
            assert_eq!(a.ratings, b.ratings);
            assert_eq!(a.matchups, b.matchups);
            assert_eq!(a.last_winner, b.last_winner);
            assert_eq!(a.stored_matches, b.stored_matches);
        }
    }

    #[test]
    fn late_arrival_from_an_earlier_day_falls_back_to_full() {
        let mut records = session();
        let late = records.remove(0);

        let mut incremental = pipeline(AppConfig::new());
        for record in records {
            incremental.ingest(record, RecomputeStrategy::Incremental).unwrap();
        }
        incremental.ingest(late, RecomputeStrategy::Incremental).unwrap();

        let full = IngestionPipeline::new(AppConfig::new(), MatchStore::from_records(session())).unwrap();
        assert_eq!(incremental.snapshot().ratings, full.snapshot().ratings);
        assert_eq!(incremental.snapshot().matchups, full.snapshot().matchups);
    }

    #[test]
    fn full_strategy_agrees_with_incremental() {
        let mut full = pipeline(AppConfig::new());
        let mut incremental = pipeline(AppConfig::new());
        for record in session() {
            full.ingest(record.clone(), RecomputeStrategy::Full).unwrap();
            incremental.ingest(record, RecomputeStrategy::Incremental).unwrap();
        }

        assert_eq!(full.snapshot().ratings, incremental.snapshot().ratings);
        assert_eq!(full.snapshot().matchups, incremental.snapshot().matchups);
        assert_eq!(full.snapshot().recent, incremental.snapshot().recent);
    }

    #[test]
    fn short_match_is_stored_but_ignored() {
        let mut pipeline = pipeline(AppConfig::new());
        let mut short = record(1, 18, Character::Fox, Character::Falco, true);
        short.frames = 60 * 5;

        let outcome = pipeline.ingest(short, RecomputeStrategy::Incremental).unwrap();

        assert_eq!(outcome, IngestOutcome::Excluded(ExclusionReason::TooShort));
        assert_eq!(pipeline.store().len(), 1);
        let snapshot = pipeline.snapshot();
        assert_eq!(snapshot.stored_matches, 1);
        assert_eq!(
            *snapshot.ratings.get(PlayerSlot::P1, Character::Fox),
            RatingState::initial(&AppConfig::new().rating)
        );
        assert_eq!(snapshot.matchups.defined_count(), 0);
        assert!(snapshot.recent.is_empty());
    }

    #[test]
    fn convergence_failure_keeps_the_previous_snapshot() {
        let mut config = AppConfig::new();
        config.rating.max_iterations = 0;
        let mut pipeline = pipeline(config);
        let before = pipeline.snapshot();

        for strategy in [RecomputeStrategy::Incremental, RecomputeStrategy::Full] {
            let record = record(1, 18, Character::Fox, Character::Falco, true);
            let error = pipeline.ingest(record, strategy).unwrap_err();

            assert_eq!(error.character, Character::Fox);
            assert!(Arc::ptr_eq(&before, &pipeline.snapshot()));
            assert!(pipeline.store().is_empty());
        }
    }

    #[test]
    fn records_rating_deltas_of_rated_matches() {
        let mut config = AppConfig::new();
        config.history.capacity = 2;
        let mut pipeline = pipeline(config);

        for record in session().into_iter().take(3) {
            pipeline.ingest(record, RecomputeStrategy::Incremental).unwrap();
        }

        let snapshot = pipeline.snapshot();
        assert_eq!(snapshot.recent.len(), 2);
        let latest = snapshot.recent.latest().unwrap();
        assert_eq!(latest.p1.character, Character::Marth);
        assert!(latest.p1.change() > 0.0);
        assert!(latest.p2.change() < 0.0);
        assert_eq!(snapshot.last_winner, Some(PlayerSlot::P1));
    }

    #[test]
    fn quit_initiated_by_p1_hands_the_win_to_p2() {
        let mut pipeline = pipeline(allow_exit());
        let mut quit = record(1, 18, Character::Fox, Character::Falco, true);
        quit.end_type = EndType::Quit;
        quit.lras_initiator = Some(quit.p1.port);

        pipeline.ingest(quit, RecomputeStrategy::Incremental).unwrap();

        let snapshot = pipeline.snapshot();
        assert_eq!(snapshot.last_winner, Some(PlayerSlot::P2));
        assert!(snapshot.ratings.get(PlayerSlot::P2, Character::Falco).rating > 1500.0);
        assert_eq!(snapshot.matchups.defined_count(), 0);
    }
}
