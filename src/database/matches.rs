use anyhow::{Context, Result};
use rusqlite::types::Type;
use rusqlite::{Connection, params};

use super::connection::DbConn;
use crate::domain::{EndType, MatchKind, MatchRecord, SideRecord};

const SELECT_COLUMNS: &str = "timestamp, stage, p1_code, p1_port, p1_character, p1_stocks, p1_won, p2_code, p2_port, p2_character, p2_stocks, p2_won, end_method, lras_initiator, frames, ignored, kind";

/// Store a record unless its timestamp is already present. Returns whether a row was written.
pub fn insert_match(conn: &mut DbConn, record: &MatchRecord) -> Result<bool> {
    insert_row(conn, record)
        .with_context(|| format!("Failed to insert match {}", record.timestamp))
}

/// Store several records in one transaction, returning how many were new.
pub fn insert_matches(conn: &mut DbConn, records: &[MatchRecord]) -> Result<usize> {
    let tx = conn.transaction().context("Failed to start transaction")?;

    let mut inserted = 0;
    for record in records {
        if insert_row(&tx, record)
            .with_context(|| format!("Failed to insert match {}", record.timestamp))?
        {
            inserted += 1;
        }
    }

    tx.commit().context("Failed to commit inserted matches")?;
    Ok(inserted)
}

fn insert_row(conn: &Connection, record: &MatchRecord) -> rusqlite::Result<bool> {
    let sql = "INSERT OR IGNORE INTO matches (timestamp, stage, p1_code, p1_port, p1_character, p1_stocks, p1_won, p2_code, p2_port, p2_character, p2_stocks, p2_won, end_method, lras_initiator, frames, ignored, kind) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)";

    let changed = conn.execute(
        sql,
        params![
            record.timestamp,
            record.stage,
            record.p1.code,
            record.p1.port,
            record.p1.character,
            record.p1.stocks,
            record.p1.won,
            record.p2.code,
            record.p2.port,
            record.p2.character,
            record.p2.stocks,
            record.p2.won,
            record.end_type.code(),
            record.lras_initiator,
            record.frames,
            record.ignore,
            record.kind.as_str(),
        ],
    )?;

    Ok(changed == 1)
}

fn parse_match_row(row: &rusqlite::Row) -> rusqlite::Result<MatchRecord> {
    let kind: String = row.get(16)?;
    let kind = MatchKind::parse(&kind).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            16,
            Type::Text,
            format!("unknown match kind: {kind}").into(),
        )
    })?;

    Ok(MatchRecord {
        timestamp: row.get(0)?,
        stage: row.get(1)?,
        p1: SideRecord {
            code: row.get(2)?,
            port: row.get(3)?,
            character: row.get(4)?,
            stocks: row.get(5)?,
            won: row.get(6)?,
        },
        p2: SideRecord {
            code: row.get(7)?,
            port: row.get(8)?,
            character: row.get(9)?,
            stocks: row.get(10)?,
            won: row.get(11)?,
        },
        end_type: EndType::from_code(row.get(12)?),
        lras_initiator: row.get(13)?,
        frames: row.get(14)?,
        ignore: row.get(15)?,
        kind,
    })
}

pub fn list_all(conn: &mut DbConn) -> Result<Vec<MatchRecord>> {
    let sql = format!("SELECT {SELECT_COLUMNS} FROM matches ORDER BY timestamp");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], parse_match_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to load matches")?;

    Ok(rows)
}

pub fn count(conn: &mut DbConn) -> Result<usize> {
    let total: i64 = conn
        .query_row("SELECT COUNT(*) FROM matches", [], |row| row.get(0))
        .context("Failed to count matches")?;
    Ok(total as usize)
}
