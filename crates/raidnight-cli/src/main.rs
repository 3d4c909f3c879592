//! raidnight - raid night snapshots, leaderboards and lockout deltas
//!
//! ## Commands
//!
//! - `fetch`: Build and cache the snapshot for a report
//! - `report`: Render the night summary, with most-improved sections
//! - `top`: Leaderboard for one ranking metric
//! - `improved`: Score changes against the previous lockout
//! - `history`: Every cached night of the guild
//! - `lockout`: Damage standings and gear-score split across a lockout

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use raidnight_core::{
    compute_deltas, pretty_time, split_by_gear_score, top_lockout_output, top_n, write_report,
    Catalog, Difficulty, FsSnapshotStore, RaidNight, RaidReport, RankingMetric, ReportSpan,
    ScoreCategory, SnapshotCache, METRICS, QUALIFYING_GEAR_MEDIAN,
};
use raidnight_wcl::{PageSource, ScorePageScraper, WclClient, WclConfig};
use serde::Serialize;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "raidnight")]
#[command(author = "Raidnight Maintainers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Raid night snapshots, leaderboards and lockout deltas", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Directory holding zones.json, raid-release-dates.json and snapshots
    #[arg(long, global = true, env = "RAIDNIGHT_DATA_DIR", default_value = ".")]
    data_dir: PathBuf,

    /// Guild whose snapshots to use; each guild gets its own subdirectory
    #[arg(long, global = true, env = "RAIDNIGHT_GUILD", default_value = "guild")]
    guild: String,

    /// Warcraft Logs API key
    #[arg(long, global = true, env = "WCL_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and cache the snapshot for a report
    Fetch {
        /// Report code
        code: String,
    },

    /// Render the night summary and write it next to the snapshots
    Report {
        /// Report code
        code: String,

        /// Output path (default: <guild dir>/reports/<snapshot name>.txt)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip the most-improved sections
        #[arg(long)]
        no_improved: bool,
    },

    /// Leaderboard for one ranking metric
    Top {
        /// Report code
        code: String,

        /// output_rate, support_output_rate, overall_score, gear_score,
        /// group_average_overall_score or group_average_gear_score
        #[arg(short, long, default_value = "output_rate")]
        metric: String,

        /// Number of rows
        #[arg(short = 'n', long, default_value = "10")]
        count: usize,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Score changes against the previous lockout
    Improved {
        /// Report code
        code: String,

        /// overall or gear
        #[arg(short, long, default_value = "gear")]
        category: String,

        /// Number of rows
        #[arg(short = 'n', long, default_value = "5")]
        count: usize,
    },

    /// Every cached night of the guild, oldest first
    History {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Damage standings and gear-score split across one lockout
    Lockout {
        /// Lockout period (default: that of the latest cached night)
        #[arg(short, long)]
        period: Option<i64>,

        /// Only encounters of this difficulty count toward damage standings
        #[arg(short, long, default_value = "heroic")]
        difficulty: String,

        /// Number of standings rows
        #[arg(short = 'n', long, default_value = "5")]
        count: usize,

        /// Median best gear score needed to qualify
        #[arg(long, default_value_t = QUALIFYING_GEAR_MEDIAN)]
        threshold: f64,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// The `limit` participants with the most deaths, e.g. `Beta 4, Alpha 2`.
fn death_summary(night: &RaidNight, limit: usize) -> Option<String> {
    let mut tally: Vec<(String, u32)> = night.snapshot.death_tally().into_iter().collect();
    if tally.is_empty() {
        return None;
    }
    tally.sort_by(|a, b| b.1.cmp(&a.1));
    let shown: Vec<String> = tally
        .into_iter()
        .take(limit)
        .map(|(name, deaths)| format!("{name} {deaths}"))
        .collect();
    Some(shown.join(", "))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Where snapshots live and how to fetch missing ones.
struct Workspace {
    cache: SnapshotCache<FsSnapshotStore>,
    config: WclConfig,
}

impl Workspace {
    fn open(data_dir: &Path, guild: &str, config: WclConfig) -> Result<Self> {
        let catalog = Catalog::load(data_dir)
            .with_context(|| format!("Failed to load zone catalog from {}", data_dir.display()))?;
        let store = FsSnapshotStore::scoped(data_dir, guild)
            .with_context(|| format!("Failed to open snapshot store for {guild}"))?;
        Ok(Self {
            cache: SnapshotCache::new(store, catalog),
            config,
        })
    }

    fn guild_dir(&self) -> &Path {
        self.cache.store().dir()
    }

    /// Cached night, or build it through the report API.
    async fn night(&self, code: &str) -> Result<RaidNight> {
        if let Some(night) = self.cache.load(code)? {
            return Ok(night);
        }

        let client = WclClient::new(self.config.clone())
            .context("Report not cached; an API key (--api-key or WCL_API_KEY) is required")?;
        let pages = PageSource::from_config(&self.config, self.guild_dir().join("pages"));
        let scraper = ScorePageScraper::new(pages, &self.config)?;

        self.cache
            .resolve(code, &client, &scraper)
            .await
            .with_context(|| format!("Failed to build snapshot for {code}"))
    }

    fn zone_name(&self, night: &RaidNight) -> Result<String> {
        Ok(self
            .cache
            .catalog()
            .zone_name(night.snapshot.fights.zone)?
            .to_string())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    raidnight_core::init_tracing(cli.json, level);

    let mut config = WclConfig::from_env();
    if let Some(key) = &cli.api_key {
        config = config.with_api_key(key);
    }
    let ws = Workspace::open(&cli.data_dir, &cli.guild, config)?;

    let result = match cli.command {
        Commands::Fetch { code } => cmd_fetch(&ws, &code).await,
        Commands::Report {
            code,
            output,
            no_improved,
        } => cmd_report(&ws, &code, output.as_deref(), !no_improved)
            .await
            .map(|text| println!("{text}")),
        Commands::Top {
            code,
            metric,
            count,
            format,
        } => cmd_top(&ws, &code, &metric, count, format).await,
        Commands::Improved {
            code,
            category,
            count,
        } => cmd_improved(&ws, &code, &category, count).await,
        Commands::History { format } => cmd_history(&ws, format),
        Commands::Lockout {
            period,
            difficulty,
            count,
            threshold,
            format,
        } => cmd_lockout(&ws, period, &difficulty, count, threshold, format),
    };

    METRICS.flush();
    result
}

/// Build and cache a snapshot
async fn cmd_fetch(ws: &Workspace, code: &str) -> Result<()> {
    let night = ws.night(code).await?;
    let snap = &night.snapshot;

    println!("Snapshot: {}", snap.name());
    println!("Lockout:  {}", night.period);
    println!("Kills:    {}", snap.kill_count());
    println!("Wipes:    {}", snap.total_wipes());
    if let Some(deaths) = death_summary(&night, 3) {
        println!("Deaths:   {deaths}");
    }
    if let Some(path) = ws.cache.store().path_for(code) {
        println!("Stored:   {}", path.display());
    }
    Ok(())
}

/// Render the night summary and write it to disk. Returns the text.
async fn cmd_report(
    ws: &Workspace,
    code: &str,
    output: Option<&Path>,
    improved: bool,
) -> Result<String> {
    let night = ws.night(code).await?;
    let _span = ReportSpan::enter(night.event_id());
    let zone_name = ws.zone_name(&night)?;

    let differential = if improved {
        let pool = ws.cache.pool_for(&night)?;
        Some(compute_deltas(&night, &pool)).filter(|d| !d.is_empty())
    } else {
        None
    };

    let reports_url = ws.config.reports_url();
    let mut report = RaidReport::new(&night, &zone_name).with_logs_base_url(&reports_url);
    if let Some(diff) = &differential {
        report = report.with_differential(diff);
    }
    let text = report.render_text();

    let path = match output {
        Some(p) => p.to_path_buf(),
        None => ws
            .guild_dir()
            .join("reports")
            .join(format!("{}.txt", night.snapshot.name())),
    };
    write_report(&path, &text)?;
    info!(path = %path.display(), "report written");

    Ok(text)
}

#[derive(Debug, Serialize)]
struct TopRow {
    rank: usize,
    participant: Option<String>,
    encounter: String,
    value: f64,
    fight_time: String,
}

/// Leaderboard for one metric
async fn cmd_top(
    ws: &Workspace,
    code: &str,
    metric: &str,
    count: usize,
    format: OutputFormat,
) -> Result<()> {
    let metric: RankingMetric = metric.parse()?;
    let night = ws.night(code).await?;

    let rows: Vec<TopRow> = top_n(&night.snapshot, metric, count)
        .into_iter()
        .enumerate()
        .map(|(i, record)| TopRow {
            rank: i + 1,
            participant: record.participant,
            encounter: record.encounter,
            value: record.value,
            fight_time: pretty_time(record.duration_ms),
        })
        .collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Text => {
            println!("{} ({})", metric, night.snapshot.name());
            for row in &rows {
                println!(
                    "{:>2}.) {:<15} {:>12.1}  ({}, {})",
                    row.rank,
                    row.participant.as_deref().unwrap_or("raid"),
                    row.value,
                    row.encounter,
                    row.fight_time
                );
            }
        }
    }
    Ok(())
}

/// Score changes against the previous lockout
async fn cmd_improved(ws: &Workspace, code: &str, category: &str, count: usize) -> Result<()> {
    let category: ScoreCategory = category.parse()?;
    let night = ws.night(code).await?;
    let pool = ws.cache.pool_for(&night)?;
    let diff = compute_deltas(&night, &pool);

    if diff.is_empty() {
        println!(
            "No lockout {} nights cached for {}",
            night.period - 1,
            night.group_name()
        );
        return Ok(());
    }

    println!(
        "Lockout {} vs {} ({} prior report(s))",
        diff.current_period,
        diff.current_period - 1,
        diff.prior_reports.len()
    );
    println!();
    println!("Averages:");
    for (i, (name, avg)) in diff
        .best_average_improvements(category, count)
        .iter()
        .enumerate()
    {
        println!(
            "{}.) {:<15} ({:>+5.1})  {:.1}->{:.1} over {} fight(s)",
            i + 1,
            name,
            avg.difference(category),
            avg.last_period(category),
            avg.this_period(category),
            avg.samples
        );
    }
    println!();
    println!("Single fights:");
    for (i, record) in diff.best_improvements(category, count).iter().enumerate() {
        println!(
            "{}.) {:<15} {:+} ({}) {}->{}",
            i + 1,
            record.participant,
            record.delta_value,
            record.encounter,
            record.prior_value,
            record.current_value
        );
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct HistoryRow {
    report: String,
    group: String,
    period: i64,
    date: String,
    kills: usize,
    best_fight: Option<String>,
    best_group_gear_score: Option<f64>,
}

fn history_rows(ws: &Workspace) -> Result<Vec<HistoryRow>> {
    let rows = ws
        .cache
        .nights()?
        .into_iter()
        .map(|night| {
            let best = top_n(&night.snapshot, RankingMetric::GroupAverageGearScore, 1)
                .into_iter()
                .next();
            HistoryRow {
                report: night.event_id().to_string(),
                group: night.group_name().to_string(),
                period: night.period,
                date: night.snapshot.occurred_at().format("%Y-%m-%d").to_string(),
                kills: night.snapshot.kill_count(),
                best_fight: best.as_ref().map(|r| r.encounter.clone()),
                best_group_gear_score: best.map(|r| r.value),
            }
        })
        .collect();
    Ok(rows)
}

/// List every cached night
fn cmd_history(ws: &Workspace, format: OutputFormat) -> Result<()> {
    let rows = history_rows(ws)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Text => {
            if rows.is_empty() {
                println!("No snapshots in {}", ws.guild_dir().display());
                return Ok(());
            }
            for row in &rows {
                let best = match (&row.best_fight, row.best_group_gear_score) {
                    (Some(fight), Some(score)) => format!("{score:.1} ({fight})"),
                    _ => "-".to_string(),
                };
                println!(
                    "{}  {:<32} week {:>2}  {:>2} kill(s)  best {}  [{}]",
                    row.date, row.group, row.period, row.kills, best, row.report
                );
            }
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct StandingRow {
    rank: usize,
    participant: String,
    mean_rank: f64,
    encounters: usize,
}

#[derive(Debug, Serialize)]
struct GearRow {
    participant: String,
    median_best: f64,
    encounters: usize,
}

#[derive(Debug, Serialize)]
struct LockoutSummary {
    group: String,
    period: i64,
    difficulty: String,
    nights: Vec<String>,
    standings: Vec<StandingRow>,
    qualified: Vec<GearRow>,
    unqualified: Vec<GearRow>,
}

fn lockout_summary(
    ws: &Workspace,
    period: Option<i64>,
    difficulty: Difficulty,
    count: usize,
    threshold: f64,
) -> Result<Option<LockoutSummary>> {
    let nights = ws.cache.nights()?;
    let Some(latest) = nights.last() else {
        return Ok(None);
    };
    let group = latest.group_name().to_string();
    let period = period.unwrap_or(latest.period);

    let group_nights: Vec<RaidNight> = nights
        .into_iter()
        .filter(|n| n.group_name() == group && n.period <= period)
        .collect();
    let lockout: Vec<RaidNight> = group_nights
        .iter()
        .filter(|n| n.period == period)
        .cloned()
        .collect();

    let standings = top_lockout_output(&lockout, difficulty, count)
        .into_iter()
        .enumerate()
        .map(|(i, s)| StandingRow {
            rank: i + 1,
            participant: s.participant,
            mean_rank: s.mean_rank,
            encounters: s.encounters,
        })
        .collect();

    // Gear bests look back over every lockout of the group up to this one.
    let split = split_by_gear_score(&group_nights, threshold);
    let gear_rows = |rows: Vec<raidnight_core::GearStanding>| -> Vec<GearRow> {
        rows.into_iter()
            .map(|s| GearRow {
                encounters: s.best_scores.len(),
                participant: s.participant,
                median_best: s.median_best,
            })
            .collect()
    };

    Ok(Some(LockoutSummary {
        group,
        period,
        difficulty: difficulty.to_string(),
        nights: lockout.iter().map(|n| n.event_id().to_string()).collect(),
        standings,
        qualified: gear_rows(split.qualified),
        unqualified: gear_rows(split.unqualified),
    }))
}

/// Damage standings and gear-score split for one lockout
fn cmd_lockout(
    ws: &Workspace,
    period: Option<i64>,
    difficulty: &str,
    count: usize,
    threshold: f64,
    format: OutputFormat,
) -> Result<()> {
    let difficulty: Difficulty = difficulty.parse()?;
    let Some(summary) = lockout_summary(ws, period, difficulty, count, threshold)? else {
        println!("No snapshots in {}", ws.guild_dir().display());
        return Ok(());
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Text => {
            println!(
                "{} lockout {} ({} night(s), {})",
                summary.group,
                summary.period,
                summary.nights.len(),
                summary.difficulty
            );
            println!();
            println!("Damage standings:");
            for row in &summary.standings {
                println!(
                    "{:>2}.) {:<15} mean rank {:.2} over {} fight(s)",
                    row.rank, row.participant, row.mean_rank, row.encounters
                );
            }
            println!();
            println!("Below {threshold} median gear score:");
            for row in &summary.unqualified {
                println!(
                    "    {:<15} {:.1} over {} boss(es)",
                    row.participant, row.median_best, row.encounters
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use raidnight_core::{Snapshot, SnapshotStore};
    use serde_json::json;
    use tracing_test::traced_test;

    /// Wednesday 2018-01-10 23:00 UTC, lockout 7 of Antorus.
    const DATE: i64 = 1_515_625_200;

    fn snapshot(code: &str, date: i64, alpha_gear: i64) -> Snapshot {
        serde_json::from_value(json!({
            "report-code": code,
            "fights": {
                "start": date * 1000,
                "end": date * 1000 + 10_800_000,
                "zone": 17,
                "fights": [
                    {"id": 3, "name": "Aggramar", "difficulty": 4, "start_time": 300000,
                     "end_time": 600000, "boss": 2063, "kill": true}
                ]
            },
            "damage-done": {"Heroic Aggramar": {"totalTime": 300000, "entries": [
                {"name": "Alpha", "total": 312000000.0},
                {"name": "Beta", "total": 3360000.0}
            ]}},
            "healing": {"Heroic Aggramar": {"totalTime": 300000, "entries": []}},
            "deaths": {"Heroic Aggramar 3": {"totalTime": 0, "entries": []}},
            "wipes": {},
            "parse-scrapes": {"Heroic Aggramar": {
                "Alpha": {"overall-performance": 80, "ilvl-performance": alpha_gear},
                "Beta": {"overall-performance": 40, "ilvl-performance": 55}
            }},
            "raidnight-date": date,
            "raid-name": "Antorus_the_Burning_Throne",
            "raid-difficulty": "Heroic"
        }))
        .unwrap()
    }

    fn workspace(dir: &Path) -> Workspace {
        std::fs::write(
            dir.join("zones.json"),
            r#"[{"id": 17, "name": "Antorus, the Burning Throne"}]"#,
        )
        .unwrap();
        std::fs::write(
            dir.join("raid-release-dates.json"),
            r#"{"Antorus, the Burning Throne": 1511222400}"#,
        )
        .unwrap();
        Workspace::open(dir, "testguild", WclConfig::default()).unwrap()
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "raidnight",
            "top",
            "aBcD1234",
            "--metric",
            "gear_score",
            "-n",
            "3",
            "--data-dir",
            "/tmp/rn",
            "--guild",
            "nightshift",
        ])
        .unwrap();

        assert_eq!(cli.data_dir, PathBuf::from("/tmp/rn"));
        assert_eq!(cli.guild, "nightshift");
        match cli.command {
            Commands::Top {
                code,
                metric,
                count,
                format,
            } => {
                assert_eq!(code, "aBcD1234");
                assert_eq!(metric, "gear_score");
                assert_eq!(count, 3);
                assert_eq!(format, OutputFormat::Text);
            }
            _ => panic!("expected top"),
        }
    }

    #[test]
    fn report_requires_a_code() {
        assert!(Cli::try_parse_from(["raidnight", "report"]).is_err());
    }

    #[tokio::test]
    async fn report_on_cached_night_needs_no_api_key() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        ws.cache
            .store()
            .persist(&snapshot("prior1", DATE - 7 * 86_400, 60))
            .unwrap();
        ws.cache
            .store()
            .persist(&snapshot("aBcD1234", DATE, 90))
            .unwrap();

        let text = cmd_report(&ws, "aBcD1234", None, true).await.unwrap();

        assert!(text.contains("Raid Week (Lockout Number): 7"));
        assert!(text.contains("MOST IMPROVED ACROSS ALL FIGHTS"));
        let written = ws
            .guild_dir()
            .join("reports")
            .join("Antorus_the_Burning_Throne-Heroic-18-01-10.txt");
        assert_eq!(std::fs::read_to_string(written).unwrap(), text);
    }

    #[tokio::test]
    async fn uncached_night_without_key_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());

        assert!(ws.night("notcached").await.is_err());
    }

    #[test]
    fn history_lists_nights_oldest_first() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        ws.cache
            .store()
            .persist(&snapshot("later", DATE, 90))
            .unwrap();
        ws.cache
            .store()
            .persist(&snapshot("earlier", DATE - 7 * 86_400, 60))
            .unwrap();

        let rows = history_rows(&ws).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].report, "earlier");
        assert_eq!(rows[0].period, 6);
        assert_eq!(rows[1].period, 7);
        assert_eq!(rows[1].kills, 1);
        assert_eq!(rows[1].best_fight.as_deref(), Some("Heroic Aggramar"));
        assert_eq!(rows[1].best_group_gear_score, Some(72.5));
    }

    #[traced_test]
    #[tokio::test]
    async fn report_footer_links_to_configured_site() {
        let dir = tempfile::tempdir().unwrap();
        let mut ws = workspace(dir.path());
        ws.config = WclConfig::default().with_site_url("https://classic.warcraftlogs.com");
        ws.cache
            .store()
            .persist(&snapshot("aBcD1234", DATE, 90))
            .unwrap();

        let text = cmd_report(&ws, "aBcD1234", None, false).await.unwrap();

        assert!(text
            .trim_end()
            .ends_with("https://classic.warcraftlogs.com/reports/aBcD1234"));
        assert!(!text.contains("www.warcraftlogs.com"));
        assert!(logs_contain("report written"));
        assert!(logs_contain("report_code=aBcD1234"));
    }

    #[test]
    fn death_summary_lists_most_deaths_first() {
        let mut snap = snapshot("aBcD1234", DATE, 90);
        snap.deaths = serde_json::from_value(json!({
            "Heroic Aggramar 3": {"totalTime": 0, "entries": [{"name": "Alpha"}]},
            "Heroic Aggramar 2": {"totalTime": 0, "entries": [
                {"name": "Beta"}, {"name": "Alpha"}, {"name": "Gamma"}
            ]}
        }))
        .unwrap();
        let night = RaidNight {
            snapshot: snap,
            period: 7,
        };

        assert_eq!(
            death_summary(&night, 2).as_deref(),
            Some("Alpha 2, Beta 1")
        );

        let quiet = RaidNight {
            snapshot: snapshot("quiet", DATE, 90),
            period: 7,
        };
        assert_eq!(death_summary(&quiet, 3), None);
    }

    #[test]
    fn lockout_parses_difficulty_and_threshold() {
        let cli = Cli::try_parse_from([
            "raidnight",
            "lockout",
            "--period",
            "6",
            "-d",
            "mythic",
            "--threshold",
            "30",
        ])
        .unwrap();
        match cli.command {
            Commands::Lockout {
                period,
                difficulty,
                count,
                threshold,
                ..
            } => {
                assert_eq!(period, Some(6));
                assert_eq!(difficulty, "mythic");
                assert_eq!(count, 5);
                assert_eq!(threshold, 30.0);
            }
            _ => panic!("expected lockout"),
        }
    }

    #[test]
    fn lockout_summary_covers_latest_period() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        ws.cache
            .store()
            .persist(&snapshot("earlier", DATE - 7 * 86_400, 10))
            .unwrap();
        ws.cache
            .store()
            .persist(&snapshot("later", DATE, 20))
            .unwrap();

        let summary = lockout_summary(&ws, None, Difficulty::Heroic, 5, QUALIFYING_GEAR_MEDIAN)
            .unwrap()
            .unwrap();

        assert_eq!(summary.period, 7);
        assert_eq!(summary.nights, vec!["later".to_string()]);
        let standings: Vec<(&str, f64)> = summary
            .standings
            .iter()
            .map(|r| (r.participant.as_str(), r.mean_rank))
            .collect();
        assert_eq!(standings, vec![("Alpha", 1.0), ("Beta", 2.0)]);

        // Alpha's best over both lockouts is 20; Beta scored 55 both times.
        assert_eq!(summary.qualified.len(), 1);
        assert_eq!(summary.qualified[0].participant, "Beta");
        assert_eq!(summary.unqualified[0].participant, "Alpha");
        assert_eq!(summary.unqualified[0].median_best, 20.0);

        let earlier = lockout_summary(&ws, Some(6), Difficulty::Heroic, 5, 25.0)
            .unwrap()
            .unwrap();
        assert_eq!(earlier.nights, vec!["earlier".to_string()]);
        assert_eq!(earlier.unqualified[0].median_best, 10.0);
    }

    #[test]
    fn lockout_on_empty_store_has_no_summary() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        assert!(lockout_summary(&ws, None, Difficulty::Heroic, 5, 25.0)
            .unwrap()
            .is_none());
    }
}
