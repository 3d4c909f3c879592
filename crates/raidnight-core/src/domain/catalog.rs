//! Zone directory and release calendar.
//!
//! Loaded from two JSON files in the data root:
//! - `zones.json`: `[{"id": 17, "name": "Antorus, the Burning Throne", ...}]`
//! - `raid-release-dates.json`: `{"Antorus, the Burning Throne": 1511236800}`

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{RaidnightError, Result};

pub const ZONES_FILE: &str = "zones.json";
pub const RELEASE_DATES_FILE: &str = "raid-release-dates.json";

/// A zone as listed by the report API. Extra fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Zone {
    pub id: i64,
    pub name: String,
}

/// Lookup tables for zone names and release dates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    zones: Vec<Zone>,
    release_dates: BTreeMap<String, i64>,
}

impl Catalog {
    pub fn new(zones: Vec<Zone>, release_dates: BTreeMap<String, i64>) -> Self {
        Self {
            zones,
            release_dates,
        }
    }

    /// Read `zones.json` and `raid-release-dates.json` from `data_dir`.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let zones = serde_json::from_slice(&std::fs::read(data_dir.join(ZONES_FILE))?)?;
        let release_dates =
            serde_json::from_slice(&std::fs::read(data_dir.join(RELEASE_DATES_FILE))?)?;
        Ok(Self::new(zones, release_dates))
    }

    /// Display name of a zone id.
    pub fn zone_name(&self, zone_id: i64) -> Result<&str> {
        self.zones
            .iter()
            .find(|z| z.id == zone_id)
            .map(|z| z.name.as_str())
            .ok_or_else(|| RaidnightError::UnknownGroup(format!("zone id {zone_id}")))
    }

    /// Release timestamp (epoch seconds) of a zone by display name.
    pub fn release_date(&self, zone_name: &str) -> Result<i64> {
        self.release_dates
            .get(zone_name)
            .copied()
            .ok_or_else(|| RaidnightError::UnknownGroup(format!("no release date for {zone_name}")))
    }

    /// Lockout period of a night in `zone_id` that started at `occurred_at`.
    pub fn period_for(&self, zone_id: i64, occurred_at: i64) -> Result<i64> {
        let released = self.release_date(self.zone_name(zone_id)?)?;
        Ok(weeks_since(occurred_at, released))
    }
}

/// Group label for a zone display name: commas dropped, spaces to underscores.
pub fn group_label(zone_name: &str) -> String {
    zone_name.replace(',', "").split(' ').collect::<Vec<_>>().join("_")
}

/// Whole weeks between the calendar dates of two epoch-second timestamps,
/// floored. Week 0 is release week.
pub fn weeks_since(occurred_at: i64, released_at: i64) -> i64 {
    let day = |secs: i64| {
        DateTime::<Utc>::from_timestamp(secs, 0)
            .unwrap_or_default()
            .date_naive()
    };
    (day(occurred_at) - day(released_at)).num_days().div_euclid(7)
}
