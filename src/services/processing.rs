use anyhow::{Context, Result};
use log::info;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use super::ingestion::{IngestOutcome, IngestionPipeline, RecomputeStrategy, Snapshot};
use crate::cache::Cache;
use crate::config::settings::AppConfig;
use crate::database::{self, DbPool, matches};
use crate::domain::{MatchRecord, MatchStore};
use crate::errors::import_context;

pub const SNAPSHOT_KEY: &str = "snapshot";

/// Counts of what happened to imported records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub rated: usize,
    pub excluded: usize,
    pub duplicates: usize,
}

impl IngestSummary {
    fn record(&mut self, outcome: IngestOutcome) {
        match outcome {
            IngestOutcome::Rated => self.rated += 1,
            IngestOutcome::Excluded(_) => self.excluded += 1,
            IngestOutcome::Duplicate => self.duplicates += 1,
        }
    }
}

/// Wires the stored match log, the pipeline and the snapshot cache together.
pub struct ProcessingService {
    config: AppConfig,
    pool: DbPool,
    cache: Cache,
}

impl ProcessingService {
    pub fn new(config: AppConfig, database_path: &str, cache_dir: &Path) -> Result<Self> {
        let pool = database::create_pool(database_path)?;
        Self::with_pool(config, pool, Cache::new(cache_dir)?)
    }

    pub fn with_pool(config: AppConfig, pool: DbPool, cache: Cache) -> Result<Self> {
        let mut conn = database::get_connection(&pool)?;
        database::setup::initialize_database(&mut conn)?;
        drop(conn);

        Ok(Self {
            config,
            pool,
            cache,
        })
    }

    pub fn reset(&self) -> Result<()> {
        let mut conn = database::get_connection(&self.pool)?;
        database::setup::reset_database(&mut conn)
    }

    /// Rebuild everything from the stored matches and export the snapshot.
    pub fn recalculate(&self) -> Result<Arc<Snapshot>> {
        info!("=== Starting Full Recompute ===");

        let pipeline = self.build_pipeline()?;
        let snapshot = pipeline.snapshot();
        self.export(&snapshot)?;

        info!("=== Recompute Complete ===");
        Ok(snapshot)
    }

    /// Feed every record of every file through the pipeline, storing the new ones.
    pub fn ingest_files<P: AsRef<Path>>(
        &self,
        files: &[P],
        strategy: RecomputeStrategy,
    ) -> Result<IngestSummary> {
        info!("=== Starting Ingestion of {} file(s) ===", files.len());

        let mut pipeline = self.build_pipeline()?;
        let mut conn = database::get_connection(&self.pool)?;
        let mut summary = IngestSummary::default();

        for path in files {
            let records = read_records(path.as_ref())?;
            info!("  → {} record(s) in {}", records.len(), path.as_ref().display());

            for record in records {
                let outcome = pipeline
                    .ingest(record.clone(), strategy)
                    .with_context(|| format!("Failed to ingest match {}", record.timestamp))?;
                if outcome != IngestOutcome::Duplicate {
                    matches::insert_match(&mut conn, &record)?;
                }
                summary.record(outcome);
            }
        }

        self.export(&pipeline.snapshot())?;

        info!(
            "=== Ingestion Complete: {} rated, {} excluded, {} duplicate ===",
            summary.rated, summary.excluded, summary.duplicates
        );
        Ok(summary)
    }

    /// The last exported snapshot, if any
    pub fn load_snapshot(&self) -> Result<Option<Snapshot>> {
        self.cache.load(SNAPSHOT_KEY)
    }

    fn build_pipeline(&self) -> Result<IngestionPipeline> {
        let mut conn = database::get_connection(&self.pool)?;
        let records = matches::list_all(&mut conn)?;
        info!("  → Loaded {} stored matches", records.len());

        let pipeline = IngestionPipeline::new(self.config.clone(), MatchStore::from_records(records))
            .context("Failed to compute ratings from stored matches")?;
        Ok(pipeline)
    }

    fn export(&self, snapshot: &Snapshot) -> Result<()> {
        self.cache.save(SNAPSHOT_KEY, snapshot)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RecordFile {
    Many(Vec<MatchRecord>),
    One(MatchRecord),
}

/// Read normalized match records from a JSON file holding one record or an array of them.
pub fn read_records(path: &Path) -> Result<Vec<MatchRecord>> {
    let json = fs::read_to_string(path).with_context(|| import_context(path))?;
    let parsed: RecordFile = serde_json::from_str(&json).with_context(|| import_context(path))?;

    Ok(match parsed {
        RecordFile::Many(records) => records,
        RecordFile::One(record) => vec![record],
    })
}
