//! Structured observability hooks for snapshot and report lifecycle events.
//!
//! This module provides:
//! - Report-scoped tracing spans via the `ReportSpan` RAII guard
//! - Emission functions for build, cache and differential events
//!
//! Events are emitted at `info!` level (filter with `RUST_LOG`).

use std::path::Path;

use tracing::info;

/// RAII guard that enters a report-scoped tracing span.
///
/// ```ignore
/// let _span = ReportSpan::enter("aBcD1234");
/// // every event below carries report_code = "aBcD1234"
/// ```
pub struct ReportSpan {
    _span: tracing::span::EnteredSpan,
}

impl ReportSpan {
    pub fn enter(report_code: &str) -> Self {
        let span = tracing::info_span!("raidnight.report", report_code = %report_code);
        Self {
            _span: span.entered(),
        }
    }
}

pub fn emit_build_started(report_code: &str) {
    info!(event = "snapshot.build_started", report_code = %report_code);
}

/// Emit event: snapshot built with kill and wipe counts.
pub fn emit_build_finished(report_code: &str, kills: usize, wipes: u32, duration_ms: u64) {
    info!(
        event = "snapshot.build_finished",
        report_code = %report_code,
        kills = kills,
        wipes = wipes,
        duration_ms = duration_ms,
    );
}

pub fn emit_cache_hit(report_code: &str) {
    info!(event = "cache.hit", report_code = %report_code);
}

pub fn emit_cache_miss(report_code: &str) {
    info!(event = "cache.miss", report_code = %report_code);
}

pub fn emit_snapshot_persisted(report_code: &str, path: &Path) {
    info!(
        event = "cache.persisted",
        report_code = %report_code,
        path = %path.display(),
    );
}

/// Emit event: differential computed against the prior lockout.
pub fn emit_differential_computed(
    report_code: &str,
    period: i64,
    prior_reports: usize,
    participants: usize,
) {
    info!(
        event = "differential.computed",
        report_code = %report_code,
        period = period,
        prior_reports = prior_reports,
        participants = participants,
    );
}
