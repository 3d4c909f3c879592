//! Week-over-week score deltas.
//!
//! `compute_deltas` compares a night against every stored night of the same
//! group from the immediately preceding lockout period. Prior scores are
//! merged into two baselines per encounter:
//!
//! - *filtered*: participants who died during a successful attempt are left
//!   out for that encounter
//! - *shadow*: every prior score, deaths included
//!
//! A current participant is compared against the filtered value when there is
//! one and against the shadow value otherwise. When several prior nights score
//! the same participant, the night with the latest start wins.
//!
//! The input nights are never modified; the result is a separate view.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::{PerformanceScore, RaidNight, RaidnightError};
use crate::obs::emit_differential_computed;

/// Which score a delta or average refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreCategory {
    Overall,
    /// Gear-adjusted score.
    Gear,
}

impl ScoreCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreCategory::Overall => "overall",
            ScoreCategory::Gear => "gear",
        }
    }

    pub fn of(&self, score: &PerformanceScore) -> i64 {
        match self {
            ScoreCategory::Overall => score.overall_score,
            ScoreCategory::Gear => score.gear_score,
        }
    }
}

impl fmt::Display for ScoreCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScoreCategory {
    type Err = RaidnightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "overall" => Ok(ScoreCategory::Overall),
            "gear" | "ilvl" => Ok(ScoreCategory::Gear),
            other => Err(RaidnightError::UnknownMetric(other.to_string())),
        }
    }
}

/// Which baseline a prior value was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaselineSource {
    Filtered,
    Shadow,
}

/// A current score paired with its prior-period baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AugmentedScore {
    pub current: PerformanceScore,
    pub prior: PerformanceScore,
    pub overall_delta: i64,
    pub gear_delta: i64,
    pub source: BaselineSource,
}

impl AugmentedScore {
    fn new(current: PerformanceScore, prior: PerformanceScore, source: BaselineSource) -> Self {
        Self {
            current,
            prior,
            overall_delta: delta(current.overall_score, prior.overall_score),
            gear_delta: delta(current.gear_score, prior.gear_score),
            source,
        }
    }

    pub fn delta(&self, category: ScoreCategory) -> i64 {
        match category {
            ScoreCategory::Overall => self.overall_delta,
            ScoreCategory::Gear => self.gear_delta,
        }
    }
}

/// A baseline of exactly zero means the score was never established.
fn delta(current: i64, prior: i64) -> i64 {
    if prior == 0 {
        0
    } else {
        current - prior
    }
}

/// Per-participant means across every encounter that had a baseline.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PeriodAverages {
    pub samples: usize,
    pub this_overall: f64,
    pub last_overall: f64,
    pub overall_difference: f64,
    pub this_gear: f64,
    pub last_gear: f64,
    pub gear_difference: f64,
}

impl PeriodAverages {
    pub fn this_period(&self, category: ScoreCategory) -> f64 {
        match category {
            ScoreCategory::Overall => self.this_overall,
            ScoreCategory::Gear => self.this_gear,
        }
    }

    pub fn last_period(&self, category: ScoreCategory) -> f64 {
        match category {
            ScoreCategory::Overall => self.last_overall,
            ScoreCategory::Gear => self.last_gear,
        }
    }

    pub fn difference(&self, category: ScoreCategory) -> f64 {
        match category {
            ScoreCategory::Overall => self.overall_difference,
            ScoreCategory::Gear => self.gear_difference,
        }
    }
}

#[derive(Default)]
struct Accumulator {
    samples: usize,
    this_overall: i64,
    last_overall: i64,
    this_gear: i64,
    last_gear: i64,
}

impl Accumulator {
    fn add(&mut self, current: &PerformanceScore, prior: &PerformanceScore) {
        self.samples += 1;
        self.this_overall += current.overall_score;
        self.last_overall += prior.overall_score;
        self.this_gear += current.gear_score;
        self.last_gear += prior.gear_score;
    }

    fn finish(&self) -> PeriodAverages {
        let n = self.samples.max(1) as f64;
        let this_overall = self.this_overall as f64 / n;
        let last_overall = self.last_overall as f64 / n;
        let this_gear = self.this_gear as f64 / n;
        let last_gear = self.last_gear as f64 / n;
        PeriodAverages {
            samples: self.samples,
            this_overall,
            last_overall,
            overall_difference: this_overall - last_overall,
            this_gear,
            last_gear,
            gear_difference: this_gear - last_gear,
        }
    }
}

/// One participant's change on one encounter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaRecord {
    pub participant: String,
    pub category: ScoreCategory,
    pub delta_value: i64,
    pub current_value: i64,
    pub prior_value: i64,
    pub encounter: String,
}

/// Result of comparing a night to the previous lockout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DifferentialReport {
    pub current_period: i64,
    /// Report codes of the prior nights used, oldest first.
    pub prior_reports: Vec<String>,
    /// Encounter key, then participant.
    pub scores: BTreeMap<String, BTreeMap<String, AugmentedScore>>,
    pub averages: BTreeMap<String, PeriodAverages>,
}

impl DifferentialReport {
    /// True when no participant had a baseline anywhere.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty() && self.averages.is_empty()
    }

    pub fn score(&self, encounter: &str, participant: &str) -> Option<&AugmentedScore> {
        self.scores.get(encounter)?.get(participant)
    }

    /// Every per-encounter delta for `category`, in encounter then participant order.
    pub fn delta_records(&self, category: ScoreCategory) -> Vec<DeltaRecord> {
        self.scores
            .iter()
            .flat_map(|(encounter, players)| {
                players.iter().map(move |(participant, score)| DeltaRecord {
                    participant: participant.clone(),
                    category,
                    delta_value: score.delta(category),
                    current_value: category.of(&score.current),
                    prior_value: category.of(&score.prior),
                    encounter: encounter.clone(),
                })
            })
            .collect()
    }

    /// Largest single-encounter improvements, best first.
    pub fn best_improvements(&self, category: ScoreCategory, n: usize) -> Vec<DeltaRecord> {
        let mut records = self.delta_records(category);
        records.sort_by(|a, b| b.delta_value.cmp(&a.delta_value));
        records.truncate(n);
        records
    }

    /// Largest improvements of the per-participant averages, best first.
    pub fn best_average_improvements(
        &self,
        category: ScoreCategory,
        n: usize,
    ) -> Vec<(&str, &PeriodAverages)> {
        let mut rows: Vec<_> = self
            .averages
            .iter()
            .map(|(name, avg)| (name.as_str(), avg))
            .collect();
        rows.sort_by(|a, b| b.1.difference(category).total_cmp(&a.1.difference(category)));
        rows.truncate(n);
        rows
    }
}

type Sheets = BTreeMap<String, BTreeMap<String, PerformanceScore>>;

/// Filtered and shadow baselines merged from the prior nights.
struct Baseline {
    filtered: Sheets,
    shadow: Sheets,
}

impl Baseline {
    /// `priors` must be ordered oldest first so later nights overwrite.
    fn merge(priors: &[&RaidNight]) -> Self {
        let mut filtered = Sheets::new();
        let mut shadow = Sheets::new();
        for night in priors {
            let died = night.snapshot.nonwipe_deaths();
            for (key, sheet) in &night.snapshot.parse_scrapes {
                let excluded = died.get(key);
                let kept = filtered.entry(key.clone()).or_default();
                let all = shadow.entry(key.clone()).or_default();
                for (participant, score) in sheet {
                    if !excluded.is_some_and(|set| set.contains(participant)) {
                        kept.insert(participant.clone(), *score);
                    }
                    all.insert(participant.clone(), *score);
                }
            }
        }
        Self { filtered, shadow }
    }

    fn lookup(&self, key: &str, participant: &str) -> Option<(PerformanceScore, BaselineSource)> {
        if let Some(score) = self.filtered.get(key).and_then(|s| s.get(participant)) {
            return Some((*score, BaselineSource::Filtered));
        }
        self.shadow
            .get(key)
            .and_then(|s| s.get(participant))
            .map(|score| (*score, BaselineSource::Shadow))
    }
}

/// Nights in `pool` from the lockout directly before `current`, same group,
/// oldest first.
pub fn prior_nights<'a>(current: &RaidNight, pool: &'a [RaidNight]) -> Vec<&'a RaidNight> {
    let mut priors: Vec<&RaidNight> = pool
        .iter()
        .filter(|night| {
            night.group_name() == current.group_name()
                && night.period + 1 == current.period
                && night.event_id() != current.event_id()
        })
        .collect();
    priors.sort_by(|a, b| {
        a.snapshot
            .raidnight_date
            .cmp(&b.snapshot.raidnight_date)
            .then_with(|| a.event_id().cmp(b.event_id()))
    });
    priors
}

/// Compare `current` against the previous lockout found in `pool`.
///
/// No prior night is not an error: the report comes back empty.
pub fn compute_deltas(current: &RaidNight, pool: &[RaidNight]) -> DifferentialReport {
    let priors = prior_nights(current, pool);
    let mut report = DifferentialReport {
        current_period: current.period,
        prior_reports: priors.iter().map(|n| n.event_id().to_string()).collect(),
        ..DifferentialReport::default()
    };
    if priors.is_empty() {
        emit_differential_computed(current.event_id(), current.period, 0, 0);
        return report;
    }

    let baseline = Baseline::merge(&priors);
    let mut accumulators: BTreeMap<String, Accumulator> = BTreeMap::new();

    for (key, sheet) in &current.snapshot.parse_scrapes {
        if !baseline.filtered.contains_key(key) {
            continue;
        }
        for (participant, now) in sheet {
            let Some((prior, source)) = baseline.lookup(key, participant) else {
                continue;
            };
            accumulators
                .entry(participant.clone())
                .or_default()
                .add(now, &prior);
            report
                .scores
                .entry(key.clone())
                .or_default()
                .insert(participant.clone(), AugmentedScore::new(*now, prior, source));
        }
    }

    report.averages = accumulators
        .iter()
        .map(|(name, acc)| (name.clone(), acc.finish()))
        .collect();

    emit_differential_computed(
        current.event_id(),
        current.period,
        priors.len(),
        report.averages.len(),
    );
    report
}
