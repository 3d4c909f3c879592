//! Persisted per-night snapshot of a single report.
//!
//! Field names follow the on-disk JSON layout (`damage-done`, `parse-scrapes`,
//! ...). Raw API objects keep any fields we do not model in a flattened
//! `extra` map so a persist/reload cycle does not lose data.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::difficulty::Difficulty;

/// Ranked performance scores for one encounter, keyed by participant name.
pub type ScoreSheet = BTreeMap<String, PerformanceScore>;

/// Build the key a successful encounter is stored under: `"{difficulty} {name}"`.
pub fn encounter_key(difficulty: Difficulty, name: &str) -> String {
    format!("{} {}", difficulty.label(), name)
}

/// Build the key an individual attempt is stored under:
/// `"{difficulty} {name} {fight_id}"`.
pub fn attempt_key(difficulty: Difficulty, name: &str, fight_id: u64) -> String {
    format!("{} {}", encounter_key(difficulty, name), fight_id)
}

/// Output per second, truncated. Zero when the fight time is unknown.
pub fn per_second(total: f64, time_ms: u64) -> u64 {
    if time_ms == 0 {
        return 0;
    }
    (total / time_ms as f64 * 1000.0) as u64
}

// ---------------------------------------------------------------------------
// Fight metadata
// ---------------------------------------------------------------------------

/// One fight (pull) from the report fight listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Fight {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<u8>,
    pub start_time: u64,
    pub end_time: u64,
    /// Encounter id; zero for trash pulls.
    #[serde(default)]
    pub boss: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kill: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Fight {
    /// Whether this pull counts toward kill and wipe tallies.
    pub fn is_countable(&self) -> bool {
        self.boss != 0
    }

    pub fn is_kill(&self) -> bool {
        self.kill.unwrap_or(false)
    }

    /// Parsed difficulty, `None` when absent or not a raid tier.
    pub fn tier(&self) -> Option<Difficulty> {
        self.difficulty.and_then(|t| Difficulty::try_from(t).ok())
    }
}

/// Fight listing for a whole report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportFights {
    /// Report start, epoch milliseconds.
    pub start: i64,
    /// Report end, epoch milliseconds.
    pub end: i64,
    /// Zone id, resolved to a group name through the catalog.
    pub zone: i64,
    #[serde(default)]
    pub fights: Vec<Fight>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ReportFights {
    /// Highest difficulty tier among the fights, starting from tier 1.
    pub fn highest_tier(&self) -> u8 {
        self.fights
            .iter()
            .filter_map(|f| f.difficulty)
            .fold(1, |acc, tier| acc.max(tier))
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// One row of a report table (damage-done, healing, deaths).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(rename = "itemLevel", default, skip_serializing_if = "Option::is_none")]
    pub item_level: Option<f64>,
    /// Class-spec icon name, e.g. `Priest-Holy`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TableEntry {
    pub fn total_output(&self) -> f64 {
        self.total.unwrap_or(0.0)
    }
}

/// A report table for one fight window.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EventTable {
    /// Active fight time in milliseconds.
    #[serde(rename = "totalTime", default)]
    pub total_time: u64,
    #[serde(default)]
    pub entries: Vec<TableEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EventTable {
    pub fn entry(&self, participant: &str) -> Option<&TableEntry> {
        self.entries.iter().find(|e| e.name == participant)
    }

    /// Names present in the table.
    pub fn participants(&self) -> BTreeSet<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }
}

/// Overall and gear-adjusted score for one participant on one encounter.
///
/// Both values are always present together.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PerformanceScore {
    #[serde(rename = "overall-performance")]
    pub overall_score: i64,
    #[serde(rename = "ilvl-performance")]
    pub gear_score: i64,
}

impl PerformanceScore {
    pub fn new(overall_score: i64, gear_score: i64) -> Self {
        Self {
            overall_score,
            gear_score,
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Normalized record of one raid night.
///
/// Successful encounters are keyed `"{difficulty} {name}"` in `damage_done`,
/// `healing` and `parse_scrapes`; every countable attempt (kill or wipe) has
/// its deaths table keyed `"{difficulty} {name} {fight_id}"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    /// Report code. Older files lack it; the store fills it from the filename.
    #[serde(rename = "report-code", default, skip_serializing_if = "String::is_empty")]
    pub report_code: String,
    pub fights: ReportFights,
    #[serde(rename = "damage-done")]
    pub damage_done: BTreeMap<String, EventTable>,
    pub healing: BTreeMap<String, EventTable>,
    pub deaths: BTreeMap<String, EventTable>,
    /// Failed attempts per encounter key. Only present when at least one wipe.
    pub wipes: BTreeMap<String, u32>,
    #[serde(rename = "parse-scrapes")]
    pub parse_scrapes: BTreeMap<String, ScoreSheet>,
    /// Report start, epoch seconds.
    #[serde(rename = "raidnight-date")]
    pub raidnight_date: i64,
    /// Group (zone) label used to match nights across lockouts.
    #[serde(rename = "raid-name")]
    pub raid_name: String,
    #[serde(rename = "raid-difficulty")]
    pub raid_difficulty: String,
}

/// Borrowed view of one successful encounter.
#[derive(Debug, Clone, Copy)]
pub struct SubEvent<'a> {
    pub key: &'a str,
    pub total_time_ms: u64,
    pub damage: &'a EventTable,
    pub healing: Option<&'a EventTable>,
    pub scores: Option<&'a ScoreSheet>,
}

impl<'a> SubEvent<'a> {
    /// `(participant, total_output, item_level)` rows of the damage table.
    pub fn entries(&self) -> impl Iterator<Item = (&'a str, f64, Option<f64>)> + 'a {
        self.damage
            .entries
            .iter()
            .map(|e| (e.name.as_str(), e.total_output(), e.item_level))
    }
}

impl Snapshot {
    pub fn event_id(&self) -> &str {
        &self.report_code
    }

    pub fn group_name(&self) -> &str {
        &self.raid_name
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.raidnight_date, 0).unwrap_or_default()
    }

    /// Whole-second duration between report start and end.
    pub fn duration_secs(&self) -> i64 {
        (self.fights.end / 1000 - self.fights.start / 1000).max(0)
    }

    /// `"{group}-{difficulty}-{yy-mm-dd}"`.
    pub fn name(&self) -> String {
        format!(
            "{}-{}-{}",
            self.raid_name,
            self.raid_difficulty,
            self.occurred_at().format("%y-%m-%d")
        )
    }

    /// `"{name}({report_code}).json"`.
    pub fn file_name(&self) -> String {
        format!("{}({}).json", self.name(), self.report_code)
    }

    pub fn failure_counts(&self) -> &BTreeMap<String, u32> {
        &self.wipes
    }

    /// Successful encounters in key order.
    pub fn sub_events(&self) -> impl Iterator<Item = SubEvent<'_>> {
        self.damage_done.iter().map(|(key, damage)| SubEvent {
            key: key.as_str(),
            total_time_ms: damage.total_time,
            damage,
            healing: self.healing.get(key),
            scores: self.parse_scrapes.get(key),
        })
    }

    pub fn sub_event(&self, key: &str) -> Option<SubEvent<'_>> {
        self.damage_done
            .get_key_value(key)
            .map(|(key, damage)| SubEvent {
                key: key.as_str(),
                total_time_ms: damage.total_time,
                damage,
                healing: self.healing.get(key),
                scores: self.parse_scrapes.get(key),
            })
    }

    /// Fight time of a successful encounter in milliseconds.
    pub fn encounter_duration_ms(&self, key: &str) -> Option<u64> {
        self.damage_done
            .get(key)
            .or_else(|| self.healing.get(key))
            .map(|t| t.total_time)
    }

    /// Damage per second of `participant` on encounter `key`.
    pub fn output_rate(&self, participant: &str, key: &str) -> Option<u64> {
        let table = self.damage_done.get(key)?;
        let entry = table.entry(participant)?;
        Some(per_second(entry.total_output(), table.total_time))
    }

    /// Healing per second of `participant` on encounter `key`.
    pub fn support_rate(&self, participant: &str, key: &str) -> Option<u64> {
        let entry = self.healing.get(key)?.entry(participant)?;
        let time = self.encounter_duration_ms(key)?;
        Some(per_second(entry.total_output(), time))
    }

    pub fn kill_count(&self) -> usize {
        self.fights
            .fights
            .iter()
            .filter(|f| f.is_countable() && f.is_kill())
            .count()
    }

    pub fn total_wipes(&self) -> u32 {
        self.wipes.values().sum()
    }

    /// Deaths per participant across every recorded attempt.
    pub fn death_tally(&self) -> BTreeMap<String, u32> {
        let mut tally = BTreeMap::new();
        for table in self.deaths.values() {
            for entry in &table.entries {
                *tally.entry(entry.name.clone()).or_insert(0) += 1;
            }
        }
        tally
    }

    /// Participants who died during a *successful* attempt, keyed by
    /// encounter key. A later kill of the same encounter replaces the set.
    pub fn nonwipe_deaths(&self) -> BTreeMap<String, BTreeSet<String>> {
        let mut out = BTreeMap::new();
        for fight in &self.fights.fights {
            if !fight.is_countable() || !fight.is_kill() {
                continue;
            }
            let Some(tier) = fight.tier() else {
                continue;
            };
            let died = self
                .deaths
                .get(&attempt_key(tier, &fight.name, fight.id))
                .map(EventTable::participants)
                .unwrap_or_default();
            out.insert(encounter_key(tier, &fight.name), died);
        }
        out
    }
}
