//! A snapshot paired with its derived lockout period.

use super::catalog::Catalog;
use super::error::Result;
use super::snapshot::Snapshot;

/// A loaded or freshly built night.
///
/// `period` is derived from the snapshot date and the catalog's release date
/// for its zone; it is never written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct RaidNight {
    pub snapshot: Snapshot,
    pub period: i64,
}

impl RaidNight {
    /// Derive the lockout period for `snapshot`. Unknown zones are an error.
    pub fn from_snapshot(snapshot: Snapshot, catalog: &Catalog) -> Result<Self> {
        let period = catalog.period_for(snapshot.fights.zone, snapshot.raidnight_date)?;
        Ok(Self { snapshot, period })
    }

    pub fn event_id(&self) -> &str {
        self.snapshot.event_id()
    }

    pub fn group_name(&self) -> &str {
        self.snapshot.group_name()
    }
}
