//! Raidnight Core Library
//!
//! Snapshot building and caching, leaderboards and week-over-week deltas for
//! raid nights. Network access lives behind the `ReportSource` and
//! `ScoreSource` traits; see the `raidnight-wcl` crate for the HTTP client.

pub mod builder;
pub mod cache;
pub mod differential;
pub mod domain;
#[cfg(any(test, feature = "test-support"))]
pub mod fakes;
pub mod metrics;
pub mod obs;
pub mod ranking;
pub mod report;
pub mod source;
pub mod telemetry;

pub use builder::SnapshotBuilder;
pub use cache::fs::{report_code_from_file_name, FsSnapshotStore};
pub use cache::{SnapshotCache, SnapshotStore};
pub use differential::{
    compute_deltas, prior_nights, AugmentedScore, BaselineSource, DeltaRecord,
    DifferentialReport, PeriodAverages, ScoreCategory,
};
pub use domain::{
    attempt_key, encounter_key, group_label, per_second, weeks_since, Catalog, Difficulty,
    EventTable, FetchError, Fight, PerformanceScore, RaidNight, RaidnightError, ReportFights,
    Result, ScoreSheet, Snapshot, SubEvent, TableEntry, Zone,
};
#[cfg(any(test, feature = "test-support"))]
pub use fakes::{MemoryReportSource, MemoryScoreSource};
pub use metrics::METRICS;
pub use obs::{
    emit_build_finished, emit_build_started, emit_cache_hit, emit_cache_miss,
    emit_differential_computed, emit_snapshot_persisted, ReportSpan,
};
pub use ranking::{
    rank, rank_lockout_output, split_by_gear_score, top_lockout_output, top_n, GearSplit,
    GearStanding, LockoutStanding, RankedRecord, RankingMetric, NON_OUTPUT_SPECS,
    QUALIFYING_GEAR_MEDIAN,
};
pub use report::{pretty_duration, pretty_number, pretty_time, write_report, RaidReport};
pub use source::{FetchResult, ReportSource, ScoreSource, TableCategory};
pub use telemetry::init_tracing;

/// Crate version, for `--version` style output.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
