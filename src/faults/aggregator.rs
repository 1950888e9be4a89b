//! # FaultAggregator: per-source counting with an ordered log.
//!
//! The aggregator keeps one [`AggregateRecord`] per source and an append-only
//! log of [`LogEntry`] values in delivery order.
//!
//! ## Architecture
//! ```text
//! Dispatcher ──► HomeLoop ──► FaultAggregator::report(source)
//!                                  │
//!                                  ├─► HashMap<name, AggregateRecord>   (count += 1)
//!                                  ├─► Severity::from_count(count)
//!                                  └─► Vec<LogEntry>                    (push)
//! ```
//!
//! ## Rules
//! - **Single writer**: `report` takes `&mut self` and the aggregator lives in
//!   home-thread state; there is no internal locking.
//! - **Exact counts**: a record's count equals the number of reports for its
//!   source; records are created lazily and never removed.
//! - **Append-only**: log order is report order; entries are never mutated.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Local, Timelike};

use super::severity::Severity;

/// Per-source fault counter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggregateRecord {
    /// Source name.
    pub source: Arc<str>,
    /// Number of faults reported for this source so far.
    pub count: u64,
}

/// One reported fault, as it appears in the log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    /// Local time of the report.
    pub at: DateTime<Local>,
    /// Source name.
    pub source: Arc<str>,
    /// The source's count after this report.
    pub count: u64,
    /// Tier derived from `count`.
    pub severity: Severity,
}

impl LogEntry {
    /// Renders the entry as one line: `[HH:MM:SS:cc] <source> Errors=<count>`.
    ///
    /// `cc` is hundredths of a second.
    pub fn render(&self) -> String {
        let hundredths = (self.at.nanosecond() / 10_000_000).min(99);
        format!(
            "[{}:{:02}] {} Errors={}",
            self.at.format("%H:%M:%S"),
            hundredths,
            self.source,
            self.count
        )
    }
}

/// Counts faults per source and keeps the ordered log.
#[derive(Debug, Default)]
pub struct FaultAggregator {
    records: HashMap<Arc<str>, AggregateRecord>,
    log: Vec<LogEntry>,
}

impl FaultAggregator {
    /// Creates an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one fault from `source`, stamped with the current local time.
    pub fn report(&mut self, source: &str) -> LogEntry {
        self.report_at(source, Local::now())
    }

    /// Records one fault from `source` at the given time.
    ///
    /// Returns the appended entry.
    pub fn report_at(&mut self, source: &str, at: DateTime<Local>) -> LogEntry {
        let record = self
            .records
            .entry(Arc::from(source))
            .or_insert_with_key(|name| AggregateRecord {
                source: Arc::clone(name),
                count: 0,
            });
        record.count += 1;

        let entry = LogEntry {
            at,
            source: Arc::clone(&record.source),
            count: record.count,
            severity: Severity::from_count(record.count),
        };
        self.log.push(entry.clone());
        entry
    }

    /// Faults reported so far for `source` (0 if never seen).
    pub fn count(&self, source: &str) -> u64 {
        self.records.get(source).map(|r| r.count).unwrap_or(0)
    }

    /// All records, sorted by source name.
    pub fn records(&self) -> Vec<AggregateRecord> {
        let mut records: Vec<AggregateRecord> = self.records.values().cloned().collect();
        records.sort_unstable_by(|a, b| a.source.cmp(&b.source));
        records
    }

    /// The log in report order.
    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    /// Number of log entries (= total reports).
    pub fn len(&self) -> usize {
        self.log.len()
    }

    /// True if nothing was reported yet.
    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }
}
