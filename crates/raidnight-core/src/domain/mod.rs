//! Domain models for raidnight.
//!
//! - `Snapshot`: persisted record of one raid night
//! - `RaidNight`: a snapshot with its derived lockout period
//! - `Catalog`: zone names and release dates
//! - `Difficulty`: raid difficulty tiers

pub mod catalog;
pub mod difficulty;
pub mod error;
pub mod raid_night;
pub mod snapshot;

pub use catalog::{group_label, weeks_since, Catalog, Zone};
pub use difficulty::Difficulty;
pub use error::{FetchError, RaidnightError, Result};
pub use raid_night::RaidNight;
pub use snapshot::{
    attempt_key, encounter_key, per_second, EventTable, Fight, PerformanceScore, ReportFights,
    ScoreSheet, Snapshot, SubEvent, TableEntry,
};
