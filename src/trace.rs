/// Reasoning trace for the convergence engine.
///
/// Each analysis appends a short sequence of entries (ANALYZE, VERIFY,
/// CONVERGE, CONCLUDE) describing what the engine looked at and what it
/// decided. The trace keeps only a trailing window so a long-lived engine
/// stays bounded; the UI panel typically shows the last ten.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Default number of entries retained per engine.
pub const DEFAULT_TRACE_CAPACITY: usize = 50;

/// Largest window a trace will keep.
pub const MAX_TRACE_CAPACITY: usize = 10_000;

/// Slots reserved up front; larger windows grow as entries arrive.
const PREALLOCATED_ENTRIES: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasoningStage {
    Analyze,
    Verify,
    Converge,
    Conclude,
}

impl fmt::Display for ReasoningStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReasoningStage::Analyze => write!(f, "ANALYZE"),
            ReasoningStage::Verify => write!(f, "VERIFY"),
            ReasoningStage::Converge => write!(f, "CONVERGE"),
            ReasoningStage::Conclude => write!(f, "CONCLUDE"),
        }
    }
}

/// One step of reasoning. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningLogEntry {
    pub stage: ReasoningStage,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

/// Append-only ring of the most recent entries.
#[derive(Debug, Clone)]
pub struct ReasoningTrace {
    entries: VecDeque<ReasoningLogEntry>,
    capacity: usize,
}

impl ReasoningTrace {
    /// Creates an empty trace keeping at most `capacity` entries, clamped to
    /// `1..=MAX_TRACE_CAPACITY`.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, MAX_TRACE_CAPACITY);
        Self {
            entries: VecDeque::with_capacity(capacity.min(PREALLOCATED_ENTRIES)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends an entry, dropping the oldest one when the window is full.
    pub fn push(&mut self, entry: ReasoningLogEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Owned snapshot, most recent first.
    pub fn snapshot(&self) -> Vec<ReasoningLogEntry> {
        self.entries.iter().rev().cloned().collect()
    }

    /// At most `n` entries, most recent first.
    pub fn recent(&self, n: usize) -> Vec<ReasoningLogEntry> {
        self.entries.iter().rev().take(n).cloned().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for ReasoningTrace {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_TRACE_CAPACITY)
    }
}
