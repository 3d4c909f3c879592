//! In-memory fakes for fetch collaborators (testing only)
//!
//! Provides `MemoryReportSource` and `MemoryScoreSource` that satisfy the
//! trait contracts without any network access, and count the calls they
//! receive so tests can assert on the fetch path.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{EventTable, FetchError, ReportFights, ScoreSheet};
use crate::source::{FetchResult, ReportSource, ScoreSource, TableCategory};

// ---------------------------------------------------------------------------
// MemoryReportSource
// ---------------------------------------------------------------------------

type TableKey = (TableCategory, String, u64, u64);

/// In-memory report source.
///
/// Tables that were never registered come back empty, which matches an API
/// answer for a window with no events.
#[derive(Debug, Default)]
pub struct MemoryReportSource {
    fights: Mutex<HashMap<String, ReportFights>>,
    tables: Mutex<HashMap<TableKey, EventTable>>,
    failing: Mutex<HashSet<TableCategory>>,
    calls: AtomicUsize,
}

impl MemoryReportSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fights(self, report_code: &str, fights: ReportFights) -> Self {
        self.fights
            .lock()
            .unwrap()
            .insert(report_code.to_string(), fights);
        self
    }

    pub fn with_table(
        self,
        category: TableCategory,
        report_code: &str,
        start: u64,
        end: u64,
        table: EventTable,
    ) -> Self {
        self.tables
            .lock()
            .unwrap()
            .insert((category, report_code.to_string(), start, end), table);
        self
    }

    /// Make every fetch of `category` fail with a transient error.
    pub fn failing(self, category: TableCategory) -> Self {
        self.failing.lock().unwrap().insert(category);
        self
    }

    /// Number of fetch calls received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReportSource for MemoryReportSource {
    async fn fetch_fights(&self, report_code: &str) -> FetchResult<ReportFights> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.fights
            .lock()
            .unwrap()
            .get(report_code)
            .cloned()
            .ok_or_else(|| {
                FetchError::permanent(format!("report/fights/{report_code}"), "no such report")
            })
    }

    async fn fetch_table(
        &self,
        category: TableCategory,
        report_code: &str,
        start: u64,
        end: u64,
    ) -> FetchResult<EventTable> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().unwrap().contains(&category) {
            return Err(FetchError::transient(
                format!("report/tables/{category}/{report_code}"),
                1,
                "simulated outage",
            ));
        }
        Ok(self
            .tables
            .lock()
            .unwrap()
            .get(&(category, report_code.to_string(), start, end))
            .cloned()
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// MemoryScoreSource
// ---------------------------------------------------------------------------

/// In-memory score source keyed by `(report_code, fight_id)`.
#[derive(Debug, Default)]
pub struct MemoryScoreSource {
    sheets: Mutex<HashMap<(String, u64), ScoreSheet>>,
    calls: AtomicUsize,
}

impl MemoryScoreSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(self, report_code: &str, fight_id: u64, sheet: ScoreSheet) -> Self {
        self.sheets
            .lock()
            .unwrap()
            .insert((report_code.to_string(), fight_id), sheet);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScoreSource for MemoryScoreSource {
    async fn fetch_scores(&self, report_code: &str, fight_id: u64) -> FetchResult<ScoreSheet> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .sheets
            .lock()
            .unwrap()
            .get(&(report_code.to_string(), fight_id))
            .cloned()
            .unwrap_or_default())
    }
}
