//! Fetch collaborator traits.
//!
//! - `ReportSource`: fight metadata and per-fight tables
//! - `ScoreSource`: ranked performance scores per fight
//!
//! Implementations own their transport, credentials and retry policy. The
//! builder awaits each call in order and treats it as atomic. In-memory fakes
//! live in the `fakes` module.

use std::fmt;

use async_trait::async_trait;

use crate::domain::{EventTable, FetchError, ReportFights, ScoreSheet};

/// Result type for fetch collaborators.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Table categories requested per fight window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TableCategory {
    DamageDone,
    /// Reserved; not consumed by the builder.
    DamageTaken,
    Healing,
    Deaths,
}

impl TableCategory {
    /// Path segment used by the report API.
    pub fn as_str(&self) -> &'static str {
        match self {
            TableCategory::DamageDone => "damage-done",
            TableCategory::DamageTaken => "damage-taken",
            TableCategory::Healing => "healing",
            TableCategory::Deaths => "deaths",
        }
    }
}

impl fmt::Display for TableCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of raw report records.
#[async_trait]
pub trait ReportSource: Send + Sync {
    /// Fight listing for a report.
    async fn fetch_fights(&self, report_code: &str) -> FetchResult<ReportFights>;

    /// One table for the window `[start, end]` (report-relative milliseconds).
    async fn fetch_table(
        &self,
        category: TableCategory,
        report_code: &str,
        start: u64,
        end: u64,
    ) -> FetchResult<EventTable>;
}

/// Source of ranked performance scores.
#[async_trait]
pub trait ScoreSource: Send + Sync {
    /// Scores for one fight. An empty sheet is a valid answer.
    async fn fetch_scores(&self, report_code: &str, fight_id: u64) -> FetchResult<ScoreSheet>;
}
