//! Bounded, most-recent-first calculation history and its JSON file.
//!
//! The file is a pretty-printed JSON array of entries, newest first:
//!
//! ```json
//! [
//!   { "type": "calc", "expr": "2+2*3", "result": 8.0, "at": "2024-05-01T10:00:00.000000" }
//! ]
//! ```

use crate::format::format_value;
use crate::interest::{CompoundInterest, SimpleInterest};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Number of entries kept; older ones are dropped.
pub const MAX_HISTORY: usize = 50;

pub const DEFAULT_HISTORY_FILE: &str = "calc_history.json";

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to access history file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid history file: {0}")]
    Json(#[from] serde_json::Error),
    /// JSON has no representation for infinity or NaN.
    #[error("cannot record a non-finite value: {0}")]
    NonFinite(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimpleInputs {
    #[serde(rename = "P")]
    pub principal: f64,
    #[serde(rename = "R")]
    pub rate: f64,
    #[serde(rename = "T")]
    pub time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompoundInputs {
    #[serde(rename = "P")]
    pub principal: f64,
    pub rate_percent: f64,
    #[serde(rename = "T")]
    pub time: f64,
    pub n: i64,
}

/// What was calculated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HistoryRecord {
    Calc {
        expr: String,
        result: f64,
    },
    Simple {
        inputs: SimpleInputs,
        result: SimpleInterest,
    },
    Compound {
        inputs: CompoundInputs,
        result: CompoundInterest,
    },
}

impl HistoryRecord {
    /// Whether every number in the record can be written to the file.
    pub fn is_finite(&self) -> bool {
        match self {
            Self::Calc { result, .. } => result.is_finite(),
            Self::Simple { inputs, result } => [
                inputs.principal,
                inputs.rate,
                inputs.time,
                result.si,
                result.total,
            ]
            .iter()
            .all(|v| v.is_finite()),
            Self::Compound { inputs, result } => [
                inputs.principal,
                inputs.rate_percent,
                inputs.time,
                result.ci,
                result.total,
            ]
            .iter()
            .all(|v| v.is_finite()),
        }
    }

    /// One-line listing, e.g. `Calc: 2+2*3 = 8`.
    pub fn summary(&self) -> String {
        match self {
            Self::Calc { expr, result } => {
                format!("Calc: {} = {}", expr, format_value(*result, 6))
            }
            Self::Simple { inputs, result } => {
                format!("Simple: {} -> {}", to_json(inputs), to_json(result))
            }
            Self::Compound { inputs, result } => {
                format!("Compound: {} -> {}", to_json(inputs), to_json(result))
            }
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

/// A record stamped with the local time it was added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub record: HistoryRecord,
    pub at: String,
}

impl HistoryEntry {
    pub fn now(record: HistoryRecord) -> Self {
        Self {
            record,
            at: chrono::Local::now()
                .naive_local()
                .format("%Y-%m-%dT%H:%M:%S%.6f")
                .to_string(),
        }
    }
}

/// In-memory history, newest first, capped at a fixed capacity.
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_capacity(MAX_HISTORY)
    }
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Build from entries already ordered newest first, dropping any beyond
    /// the capacity.
    pub fn from_entries(entries: Vec<HistoryEntry>) -> Self {
        let mut history = Self::new();
        history.entries = entries.into_iter().take(history.capacity).collect();
        history
    }

    /// Add a record stamped with the current time.
    pub fn push(&mut self, record: HistoryRecord) -> &HistoryEntry {
        self.push_entry(HistoryEntry::now(record))
    }

    pub fn push_entry(&mut self, entry: HistoryEntry) -> &HistoryEntry {
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
        &self.entries[0]
    }

    /// Up to `limit` entries, newest first.
    pub fn recent(&self, limit: usize) -> Vec<HistoryEntry> {
        self.entries.iter().take(limit).cloned().collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// A [`History`] persisted to a JSON file after every change.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    history: History,
}

impl HistoryStore {
    /// Load the history at `path`. A missing or empty file is an empty history.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, HistoryError> {
        let path = path.into();
        let history = if path.exists() {
            let text = std::fs::read_to_string(&path)?;
            if text.trim().is_empty() {
                History::new()
            } else {
                History::from_entries(serde_json::from_str(&text)?)
            }
        } else {
            History::new()
        };
        Ok(Self { path, history })
    }

    /// An empty store that will write to `path`, ignoring what is there now.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            history: History::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Add a record without writing the file. Records holding infinity or NaN
    /// are refused, since they would not survive a reload.
    pub fn push(&mut self, record: HistoryRecord) -> Result<(), HistoryError> {
        if !record.is_finite() {
            return Err(HistoryError::NonFinite(record.summary()));
        }
        self.history.push(record);
        Ok(())
    }

    pub fn clear_entries(&mut self) {
        self.history.clear();
    }

    /// Add a record and write the file. The record is kept in memory even if
    /// the write fails.
    pub fn record(&mut self, record: HistoryRecord) -> Result<(), HistoryError> {
        self.push(record)?;
        self.save()
    }

    pub fn clear(&mut self) -> Result<(), HistoryError> {
        self.clear_entries();
        self.save()
    }

    /// Serialize the current entries so they can be written without holding
    /// on to the store.
    pub fn snapshot(&self) -> Result<Snapshot, HistoryError> {
        let entries: Vec<&HistoryEntry> = self.history.entries().collect();
        Ok(Snapshot {
            path: self.path.clone(),
            json: serde_json::to_string_pretty(&entries)?,
        })
    }

    pub fn save(&self) -> Result<(), HistoryError> {
        self.snapshot()?.write()
    }
}

/// Serialized history contents bound for a file.
#[derive(Debug, Clone)]
pub struct Snapshot {
    path: PathBuf,
    json: String,
}

impl Snapshot {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(self) -> Result<(), HistoryError> {
        std::fs::write(&self.path, self.json)?;
        Ok(())
    }
}
