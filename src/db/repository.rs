use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::{info, warn};
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{CompletionRecord, PrayerName};

pub const STREAK_KEY: &str = "prayer_streak";

pub fn completion_key(date: NaiveDate) -> String {
    format!("prayers_{}", date.format("%Y-%m-%d"))
}

// ─── Key-value store ────────────────────────────────────────────────────────

pub struct KvRepo;

impl KvRepo {
    pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        conn.query_row(
            "SELECT value FROM kv_store WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }
}

// ─── Completions ─────────────────────────────────────────────────────────────

pub struct CompletionRepo;

impl CompletionRepo {
    /// Missing or malformed entries read as an empty record.
    pub fn load(conn: &Connection, date: NaiveDate) -> Result<CompletionRecord> {
        let raw = KvRepo::get(conn, &completion_key(date))?;
        Ok(raw
            .map(|raw| CompletionRecord::from_json(&raw))
            .unwrap_or_default())
    }

    pub fn save(conn: &Connection, date: NaiveDate, record: &CompletionRecord) -> Result<()> {
        let json = record.to_json().context("Serializing completion list")?;
        KvRepo::set(conn, &completion_key(date), &json)
    }
}

// ─── Streak ──────────────────────────────────────────────────────────────────

pub struct StreakRepo;

impl StreakRepo {
    /// Missing or malformed values read as zero.
    pub fn load(conn: &Connection) -> Result<u64> {
        let raw = KvRepo::get(conn, STREAK_KEY)?;
        Ok(match raw {
            None => 0,
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!("Ignoring malformed streak value {:?}", raw);
                0
            }),
        })
    }

    pub fn save(conn: &Connection, streak: u64) -> Result<()> {
        KvRepo::set(conn, STREAK_KEY, &streak.to_string())
    }
}

// ─── Completion log ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Added { added: usize, streak: u64 },
    AlreadyCompleted { streak: u64 },
}

impl RecordOutcome {
    pub fn streak(&self) -> u64 {
        match self {
            RecordOutcome::Added { streak, .. } | RecordOutcome::AlreadyCompleted { streak } => {
                *streak
            }
        }
    }
}

/// Writes the completion list and the streak as one transaction.
pub struct CompletionLog;

impl CompletionLog {
    /// Add `names` to the record of `date`; the streak grows by the number
    /// of names that were not there yet. Merging the same names again
    /// changes nothing.
    pub fn merge(
        conn: &Connection,
        date: NaiveDate,
        names: impl IntoIterator<Item = PrayerName>,
    ) -> Result<RecordOutcome> {
        let tx = conn
            .unchecked_transaction()
            .context("Starting completion transaction")?;

        let existing = CompletionRepo::load(&tx, date)?;
        let mut merged = existing.clone();
        merged.extend(names);
        let added = existing.newly_added(&merged);
        let streak = StreakRepo::load(&tx)?;

        if added == 0 {
            return Ok(RecordOutcome::AlreadyCompleted { streak });
        }

        let streak = streak.saturating_add(added as u64);
        CompletionRepo::save(&tx, date, &merged)?;
        StreakRepo::save(&tx, streak)?;
        tx.commit().context("Committing completion")?;

        info!(
            "Logged {} prayer(s) on {}; streak is now {}",
            added, date, streak
        );
        Ok(RecordOutcome::Added { added, streak })
    }

    pub fn record(conn: &Connection, date: NaiveDate, prayer: PrayerName) -> Result<RecordOutcome> {
        Self::merge(conn, date, [prayer])
    }
}
