//! Top-N leaderboards over one snapshot, plus lockout-wide standings.
//!
//! Records are collected in snapshot iteration order (encounter key order,
//! then table or score-sheet order) and sorted descending with a stable sort,
//! so ties keep that order.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::{per_second, Difficulty, RaidNight, RaidnightError, Snapshot};

/// Tank and healer spec icons. Their damage rows never enter lockout output
/// standings.
pub const NON_OUTPUT_SPECS: [&str; 11] = [
    "Monk-Mistweaver",
    "Paladin-Holy",
    "Druid-Restoration",
    "Priest-Discipline",
    "Priest-Holy",
    "Shaman-Restoration",
    "Warrior-Protection",
    "Paladin-Protection",
    "Monk-Brewmaster",
    "DeathKnight-Blood",
    "Druid-Guardian",
];

/// Median best gear score a participant needs to count as qualified.
pub const QUALIFYING_GEAR_MEDIAN: f64 = 25.0;

/// Metric a leaderboard is ranked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RankingMetric {
    /// Damage per second, one record per participant per encounter.
    OutputRate,
    /// Healing per second, one record per participant per encounter.
    SupportOutputRate,
    OverallScore,
    GearScore,
    /// Mean overall score of everyone scored on an encounter.
    GroupAverageOverallScore,
    /// Mean gear-adjusted score of everyone scored on an encounter.
    GroupAverageGearScore,
}

impl RankingMetric {
    pub const ALL: [RankingMetric; 6] = [
        RankingMetric::OutputRate,
        RankingMetric::SupportOutputRate,
        RankingMetric::OverallScore,
        RankingMetric::GearScore,
        RankingMetric::GroupAverageOverallScore,
        RankingMetric::GroupAverageGearScore,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RankingMetric::OutputRate => "output_rate",
            RankingMetric::SupportOutputRate => "support_output_rate",
            RankingMetric::OverallScore => "overall_score",
            RankingMetric::GearScore => "gear_score",
            RankingMetric::GroupAverageOverallScore => "group_average_overall_score",
            RankingMetric::GroupAverageGearScore => "group_average_gear_score",
        }
    }

    /// Whether records of this metric name a participant.
    pub fn is_per_participant(&self) -> bool {
        !matches!(
            self,
            RankingMetric::GroupAverageOverallScore | RankingMetric::GroupAverageGearScore
        )
    }
}

impl fmt::Display for RankingMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankingMetric {
    type Err = RaidnightError;

    /// Accepts the snake_case names plus the short aliases used by older
    /// report scripts (`dps`, `hps`, `overall-parse`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "output_rate" | "dps" => Ok(RankingMetric::OutputRate),
            "support_output_rate" | "hps" => Ok(RankingMetric::SupportOutputRate),
            "overall_score" | "overall-parse" => Ok(RankingMetric::OverallScore),
            "gear_score" | "ilvl-parse" => Ok(RankingMetric::GearScore),
            "group_average_overall_score" | "raid-overall-parse" => {
                Ok(RankingMetric::GroupAverageOverallScore)
            }
            "group_average_gear_score" | "raid-ilvl-parse" => {
                Ok(RankingMetric::GroupAverageGearScore)
            }
            other => Err(RaidnightError::UnknownMetric(other.to_string())),
        }
    }
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedRecord {
    /// `None` for group-average metrics.
    pub participant: Option<String>,
    pub encounter: String,
    pub duration_ms: u64,
    pub value: f64,
    /// Participant's damage per second on the encounter, when known.
    pub output_rate: Option<u64>,
}

/// Every record for `metric`, best first.
pub fn rank(snapshot: &Snapshot, metric: RankingMetric) -> Vec<RankedRecord> {
    let mut records = collect(snapshot, metric);
    records.sort_by(|a, b| b.value.total_cmp(&a.value));
    records
}

/// The best `n` records for `metric`. Length is `min(n, available)`.
pub fn top_n(snapshot: &Snapshot, metric: RankingMetric, n: usize) -> Vec<RankedRecord> {
    let mut records = rank(snapshot, metric);
    records.truncate(n);
    records
}

fn collect(snapshot: &Snapshot, metric: RankingMetric) -> Vec<RankedRecord> {
    let mut out = Vec::new();
    match metric {
        RankingMetric::OutputRate => {
            for event in snapshot.sub_events() {
                for (name, total, _) in event.entries() {
                    let rate = per_second(total, event.total_time_ms);
                    out.push(RankedRecord {
                        participant: Some(name.to_string()),
                        encounter: event.key.to_string(),
                        duration_ms: event.total_time_ms,
                        value: rate as f64,
                        output_rate: Some(rate),
                    });
                }
            }
        }
        RankingMetric::SupportOutputRate => {
            for (key, table) in &snapshot.healing {
                let duration_ms = snapshot.encounter_duration_ms(key).unwrap_or(0);
                for entry in &table.entries {
                    let rate = snapshot.support_rate(&entry.name, key).unwrap_or(0);
                    out.push(RankedRecord {
                        participant: Some(entry.name.clone()),
                        encounter: key.clone(),
                        duration_ms,
                        value: rate as f64,
                        output_rate: snapshot.output_rate(&entry.name, key),
                    });
                }
            }
        }
        RankingMetric::OverallScore | RankingMetric::GearScore => {
            for (key, sheet) in &snapshot.parse_scrapes {
                let event = snapshot.sub_event(key);
                let duration_ms = event
                    .as_ref()
                    .map(|e| e.total_time_ms)
                    .or_else(|| snapshot.encounter_duration_ms(key))
                    .unwrap_or(0);
                for (name, score) in sheet {
                    let value = if metric == RankingMetric::OverallScore {
                        score.overall_score
                    } else {
                        score.gear_score
                    };
                    let output_rate = event
                        .as_ref()
                        .and_then(|e| e.damage.entry(name))
                        .map(|row| per_second(row.total_output(), duration_ms));
                    out.push(RankedRecord {
                        participant: Some(name.clone()),
                        encounter: key.clone(),
                        duration_ms,
                        value: value as f64,
                        output_rate,
                    });
                }
            }
        }
        RankingMetric::GroupAverageOverallScore | RankingMetric::GroupAverageGearScore => {
            for (key, sheet) in &snapshot.parse_scrapes {
                if sheet.is_empty() {
                    continue;
                }
                let sum: i64 = sheet
                    .values()
                    .map(|s| {
                        if metric == RankingMetric::GroupAverageOverallScore {
                            s.overall_score
                        } else {
                            s.gear_score
                        }
                    })
                    .sum();
                out.push(RankedRecord {
                    participant: None,
                    encounter: key.clone(),
                    duration_ms: snapshot.encounter_duration_ms(key).unwrap_or(0),
                    value: sum as f64 / sheet.len() as f64,
                    output_rate: None,
                });
            }
        }
    }
    out
}

/// A participant's place across every night of a lockout.
#[derive(Debug, Clone, PartialEq)]
pub struct LockoutStanding {
    pub participant: String,
    /// Mean of per-encounter damage ranks; 1.0 is first on every encounter.
    pub mean_rank: f64,
    pub encounters: usize,
}

/// Rank damage dealers across `nights` by their mean per-encounter damage
/// rank, best first.
///
/// Only encounters of `difficulty` count, and rows whose spec icon is in
/// `NON_OUTPUT_SPECS` are skipped. Equal totals on an encounter share the
/// better rank (1, 1, 3). Equal means keep first-seen order.
pub fn rank_lockout_output(nights: &[RaidNight], difficulty: Difficulty) -> Vec<LockoutStanding> {
    let prefix = format!("{} ", difficulty.label());
    let mut slots: BTreeMap<&str, usize> = BTreeMap::new();
    let mut ranks: Vec<(&str, Vec<usize>)> = Vec::new();

    for night in nights {
        let events = night
            .snapshot
            .sub_events()
            .filter(|event| event.key.starts_with(&prefix));
        for event in events {
            let mut rows: Vec<(&str, f64)> = event
                .damage
                .entries
                .iter()
                .filter(|row| {
                    !row.icon
                        .as_deref()
                        .is_some_and(|icon| NON_OUTPUT_SPECS.contains(&icon))
                })
                .map(|row| (row.name.as_str(), row.total_output()))
                .collect();
            rows.sort_by(|a, b| b.1.total_cmp(&a.1));

            let mut rank = 0;
            let mut previous = None;
            for (position, (name, total)) in rows.into_iter().enumerate() {
                if previous != Some(total) {
                    rank = position + 1;
                    previous = Some(total);
                }
                let slot = *slots.entry(name).or_insert_with(|| {
                    ranks.push((name, Vec::new()));
                    ranks.len() - 1
                });
                ranks[slot].1.push(rank);
            }
        }
    }

    let mut standings: Vec<LockoutStanding> = ranks
        .into_iter()
        .map(|(name, ranks)| LockoutStanding {
            participant: name.to_string(),
            mean_rank: ranks.iter().sum::<usize>() as f64 / ranks.len() as f64,
            encounters: ranks.len(),
        })
        .collect();
    standings.sort_by(|a, b| a.mean_rank.total_cmp(&b.mean_rank));
    standings
}

/// The `n` best lockout standings.
pub fn top_lockout_output(
    nights: &[RaidNight],
    difficulty: Difficulty,
    n: usize,
) -> Vec<LockoutStanding> {
    let mut standings = rank_lockout_output(nights, difficulty);
    standings.truncate(n);
    standings
}

/// A participant's best gear score per encounter across nights.
#[derive(Debug, Clone, PartialEq)]
pub struct GearStanding {
    pub participant: String,
    /// Encounter key to best gear score seen.
    pub best_scores: BTreeMap<String, i64>,
    pub median_best: f64,
}

/// Participants split on their median best gear score.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GearSplit {
    /// Median best at or above the threshold.
    pub qualified: Vec<GearStanding>,
    pub unqualified: Vec<GearStanding>,
}

/// Take each participant's best gear score per encounter over `nights`, then
/// split on whether the median of those bests reaches `threshold`.
///
/// Both halves are ordered by participant name. Encounters a participant was
/// never scored on do not count toward their median.
pub fn split_by_gear_score(nights: &[RaidNight], threshold: f64) -> GearSplit {
    let mut best: BTreeMap<&str, BTreeMap<String, i64>> = BTreeMap::new();
    for night in nights {
        for (key, sheet) in &night.snapshot.parse_scrapes {
            for (name, score) in sheet {
                best.entry(name.as_str())
                    .or_default()
                    .entry(key.clone())
                    .and_modify(|b| *b = (*b).max(score.gear_score))
                    .or_insert(score.gear_score);
            }
        }
    }

    let mut split = GearSplit::default();
    for (name, best_scores) in best {
        let median_best = median(best_scores.values().copied());
        let standing = GearStanding {
            participant: name.to_string(),
            best_scores,
            median_best,
        };
        if median_best >= threshold {
            split.qualified.push(standing);
        } else {
            split.unqualified.push(standing);
        }
    }
    split
}

fn median(values: impl Iterator<Item = i64>) -> f64 {
    let mut values: Vec<i64> = values.collect();
    if values.is_empty() {
        return 0.0;
    }
    values.sort_unstable();
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) as f64 / 2.0
    } else {
        values[mid] as f64
    }
}
