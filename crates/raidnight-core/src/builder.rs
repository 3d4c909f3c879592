//! Event builder: turns a report's fight listing plus per-fight tables and
//! scores into one `Snapshot`.
//!
//! For every countable fight the deaths table is fetched first, kill or wipe.
//! Wipes only bump the failure count. Kills additionally fetch scores,
//! damage-done and healing and are stored under `"{difficulty} {name}"`; a
//! second kill of the same encounter replaces the first.
//!
//! The zone and release date are resolved before any table is fetched, so an
//! unknown group fails fast. Any fetch failure aborts the build; nothing is
//! persisted from here.

use std::collections::BTreeMap;
use std::time::Instant;

use tracing::debug;

use crate::domain::{
    attempt_key, encounter_key, group_label, Catalog, Difficulty, EventTable, Fight,
    RaidNight, RaidnightError, ReportFights, Result, Snapshot,
};
use crate::metrics::METRICS;
use crate::obs::{emit_build_finished, emit_build_started};
use crate::source::{ReportSource, ScoreSource, TableCategory};

/// Builds snapshots from a report source and a score source.
pub struct SnapshotBuilder<'a> {
    catalog: &'a Catalog,
    reports: &'a dyn ReportSource,
    scores: &'a dyn ScoreSource,
}

impl<'a> SnapshotBuilder<'a> {
    pub fn new(
        catalog: &'a Catalog,
        reports: &'a dyn ReportSource,
        scores: &'a dyn ScoreSource,
    ) -> Self {
        Self {
            catalog,
            reports,
            scores,
        }
    }

    /// Fetch the fight listing for `report_code` and build from it.
    pub async fn build(&self, report_code: &str) -> Result<RaidNight> {
        let fights = self.reports.fetch_fights(report_code).await?;
        METRICS.inc_fetches();
        self.build_from_fights(report_code, fights).await
    }

    /// Build from an already fetched fight listing.
    pub async fn build_from_fights(
        &self,
        report_code: &str,
        fights: ReportFights,
    ) -> Result<RaidNight> {
        let started = Instant::now();
        emit_build_started(report_code);

        let raidnight_date = fights.start / 1000;
        let raid_name = group_label(self.catalog.zone_name(fights.zone)?);
        let period = self.catalog.period_for(fights.zone, raidnight_date)?;
        let raid_difficulty = Difficulty::try_from(fights.highest_tier())?;

        let mut damage_done = BTreeMap::new();
        let mut healing = BTreeMap::new();
        let mut deaths = BTreeMap::new();
        let mut wipes: BTreeMap<String, u32> = BTreeMap::new();
        let mut parse_scrapes = BTreeMap::new();

        for fight in fights.fights.iter().filter(|f| f.is_countable()) {
            let tier = match fight.difficulty {
                Some(tier) => Difficulty::try_from(tier)?,
                None => {
                    return Err(RaidnightError::MalformedReport {
                        report: report_code.to_string(),
                        reason: format!("fight {} ({}) has no difficulty", fight.id, fight.name),
                    })
                }
            };
            let key = encounter_key(tier, &fight.name);

            let died = self.fetch(TableCategory::Deaths, report_code, fight).await?;
            deaths.insert(attempt_key(tier, &fight.name, fight.id), died);

            if !fight.is_kill() {
                *wipes.entry(key).or_insert(0) += 1;
                continue;
            }

            let sheet = self.scores.fetch_scores(report_code, fight.id).await?;
            METRICS.inc_fetches();

            let damage = self
                .fetch(TableCategory::DamageDone, report_code, fight)
                .await?;
            if damage.total_time == 0 {
                return Err(RaidnightError::MalformedReport {
                    report: report_code.to_string(),
                    reason: format!("kill {} ({}) has zero fight time", fight.id, key),
                });
            }
            let healed = self.fetch(TableCategory::Healing, report_code, fight).await?;

            if damage_done.insert(key.clone(), damage).is_some() {
                debug!(report = %report_code, encounter = %key, fight_id = fight.id, "later kill replaces earlier one");
            }
            healing.insert(key.clone(), healed);
            parse_scrapes.insert(key, sheet);
        }

        let snapshot = Snapshot {
            report_code: report_code.to_string(),
            fights,
            damage_done,
            healing,
            deaths,
            wipes,
            parse_scrapes,
            raidnight_date,
            raid_name,
            raid_difficulty: raid_difficulty.label().to_string(),
        };

        METRICS.inc_snapshots_built();
        emit_build_finished(
            report_code,
            snapshot.damage_done.len(),
            snapshot.total_wipes(),
            started.elapsed().as_millis() as u64,
        );

        Ok(RaidNight { snapshot, period })
    }

    async fn fetch(
        &self,
        category: TableCategory,
        report_code: &str,
        fight: &Fight,
    ) -> Result<EventTable> {
        let table = self
            .reports
            .fetch_table(category, report_code, fight.start_time, fight.end_time)
            .await?;
        METRICS.inc_fetches();
        Ok(table)
    }
}
