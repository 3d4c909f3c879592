//! Plain-text night summary.
//!
//! The block is fenced with triple backticks so it pastes cleanly into chat,
//! followed by a link to the report logs. Section order is fixed: title,
//! lockout number, duration, kills, wipes, top fight, most improved, top
//! gear-adjusted output, top spec-wide output, top healing.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use crate::differential::{DifferentialReport, ScoreCategory};
use crate::domain::RaidNight;
use crate::ranking::{top_n, RankedRecord, RankingMetric};

pub const LOGS_BASE_URL: &str = "http://www.warcraftlogs.com/reports";

const TOP_GEAR_COUNT: usize = 10;
const TOP_OVERALL_COUNT: usize = 5;
const TOP_HEALING_COUNT: usize = 5;
const IMPROVED_COUNT: usize = 5;

/// Fight time as `m:ss`, rounded to the nearest second.
pub fn pretty_time(milliseconds: u64) -> String {
    let seconds = (milliseconds as f64 / 1000.0).round() as u64;
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Whole-second duration as `H:MM:SS`.
pub fn pretty_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!(
        "{}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

/// Per-second rate as `1.04M DPS` or `11.2k  DPS`.
pub fn pretty_number(value: u64, unit: &str) -> String {
    if value >= 1_000_000 {
        let hundredths = (value as f64 / 10_000.0).round() as u64;
        return format!("{}.{:02}M {}", hundredths / 100, hundredths % 100, unit);
    }
    format!("{:>4.1}k  {}", value as f64 / 1000.0, unit)
}

/// Text report for one night, optionally with the week-over-week section.
pub struct RaidReport<'a> {
    pub night: &'a RaidNight,
    /// Zone display name, e.g. `Antorus, the Burning Throne`.
    pub zone_name: &'a str,
    /// `None` skips the most-improved sections.
    pub differential: Option<&'a DifferentialReport>,
    pub logs_base_url: &'a str,
}

impl<'a> RaidReport<'a> {
    pub fn new(night: &'a RaidNight, zone_name: &'a str) -> Self {
        Self {
            night,
            zone_name,
            differential: None,
            logs_base_url: LOGS_BASE_URL,
        }
    }

    /// Reports root for the footer link, e.g. a regional or classic site.
    pub fn with_logs_base_url(mut self, logs_base_url: &'a str) -> Self {
        self.logs_base_url = logs_base_url;
        self
    }

    pub fn with_differential(mut self, differential: &'a DifferentialReport) -> Self {
        self.differential = Some(differential);
        self
    }

    pub fn logs_url(&self) -> String {
        format!(
            "{}/{}",
            self.logs_base_url.trim_end_matches('/'),
            self.night.event_id()
        )
    }

    pub fn title(&self) -> String {
        format!(
            "{} {} {}",
            self.night.snapshot.raid_difficulty,
            self.zone_name,
            self.date()
        )
    }

    fn date(&self) -> String {
        self.night
            .snapshot
            .occurred_at()
            .format("%A %m/%d/%y")
            .to_string()
    }

    pub fn render_text(&self) -> String {
        let snap = &self.night.snapshot;
        let mut out = String::from("```\n");

        let title = self.title();
        let _ = writeln!(out, "{title}");
        let _ = writeln!(out, "{}", "=".repeat(title.chars().count()));
        let _ = writeln!(out, "Raid Week (Lockout Number): {}", self.night.period);
        let _ = writeln!(out, "Raid Duration: {}", pretty_duration(snap.duration_secs()));
        let _ = writeln!(out, "Bosses Down: {}", snap.kill_count());
        let wipes: Vec<String> = snap
            .failure_counts()
            .iter()
            .map(|(name, count)| format!("{name} {count}"))
            .collect();
        let _ = write!(out, "Wipes: {} total ({})", snap.total_wipes(), wipes.join(", "));

        out.push_str("\n\nTONIGHT'S TOP FIGHT:\n");
        for record in top_n(snap, RankingMetric::GroupAverageGearScore, 1) {
            let _ = writeln!(
                out,
                "{}: {:.1} raid average ilvl parse",
                record.encounter, record.value
            );
        }

        if let Some(diff) = self.differential {
            self.render_improved(&mut out, diff);
        }

        out.push_str("\nTOP ILVL DPS PERFORMANCES:\n");
        for (rank, record) in top_n(snap, RankingMetric::GearScore, TOP_GEAR_COUNT)
            .iter()
            .enumerate()
        {
            let _ = writeln!(out, "{}.) {}", rank + 1, score_line(record));
        }

        out.push_str("\nTOP SPEC-WIDE DPS PERFORMANCES:\n");
        for (rank, record) in top_n(snap, RankingMetric::OverallScore, TOP_OVERALL_COUNT)
            .iter()
            .enumerate()
        {
            let _ = writeln!(out, "{}.) {}", rank + 1, score_line(record));
        }

        out.push_str("\nBEST HPS (SINGLE FIGHT):\n");
        for (rank, record) in top_n(snap, RankingMetric::SupportOutputRate, TOP_HEALING_COUNT)
            .iter()
            .enumerate()
        {
            let _ = writeln!(
                out,
                "{}.) {:<17} -- {} ({}, {})",
                rank + 1,
                participant(record),
                pretty_number(record.value as u64, "HPS"),
                record.encounter,
                pretty_time(record.duration_ms)
            );
        }

        out.push_str("```\n");
        let _ = write!(out, "{} logs: {}", self.date(), self.logs_url());
        out
    }

    fn render_improved(&self, out: &mut String, diff: &DifferentialReport) {
        out.push_str("\nMOST IMPROVED ACROSS ALL FIGHTS:\n");
        for (i, (name, avg)) in diff
            .best_average_improvements(ScoreCategory::Gear, 1)
            .iter()
            .enumerate()
        {
            let _ = writeln!(
                out,
                "{}.) {:<15} ({:>+5.1})      {:.1}->{:.1} avg",
                i + 1,
                name,
                avg.gear_difference,
                avg.last_gear,
                avg.this_gear
            );
        }

        out.push_str("\nMOST IMPROVED ILVL DPS PERFORMANCES:\n");
        for (rank, record) in diff
            .best_improvements(ScoreCategory::Gear, IMPROVED_COUNT)
            .iter()
            .enumerate()
        {
            let _ = writeln!(
                out,
                "{}.) {:<15}{:+} ({}) {}->{}",
                rank + 1,
                record.participant,
                record.delta_value,
                record.encounter,
                record.prior_value,
                record.current_value
            );
        }
    }
}

fn participant(record: &RankedRecord) -> &str {
    record.participant.as_deref().unwrap_or("")
}

fn score_line(record: &RankedRecord) -> String {
    format!(
        "({}) {:<12} -- {} ({}, {})",
        record.value as i64,
        participant(record),
        pretty_number(record.output_rate.unwrap_or(0), "DPS"),
        record.encounter,
        pretty_time(record.duration_ms)
    )
}

/// Write rendered report text to `path`.
pub fn write_report(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("create {:?}", parent))?;
    }
    std::fs::write(path, text).with_context(|| format!("write {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_time_rounds_to_seconds() {
        assert_eq!(pretty_time(240_000), "4:00");
        assert_eq!(pretty_time(305_600), "5:06");
        assert_eq!(pretty_time(59_400), "0:59");
    }

    #[test]
    fn pretty_duration_pads_minutes_and_seconds() {
        assert_eq!(pretty_duration(10_800), "3:00:00");
        assert_eq!(pretty_duration(3_725), "1:02:05");
        assert_eq!(pretty_duration(-5), "0:00:00");
    }

    #[test]
    fn pretty_number_switches_to_millions() {
        assert_eq!(pretty_number(1_040_000, "DPS"), "1.04M DPS");
        assert_eq!(pretty_number(2_000_000, "HPS"), "2.00M HPS");
        assert_eq!(pretty_number(11_234, "DPS"), "11.2k  DPS");
        assert_eq!(pretty_number(5_000, "HPS"), " 5.0k  HPS");
    }

    #[test]
    fn write_report_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("night.txt");
        write_report(&path, "hello").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "hello");
    }
}
