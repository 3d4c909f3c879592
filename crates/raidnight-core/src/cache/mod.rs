//! Snapshot cache: persisted nights keyed by report code.
//!
//! `SnapshotCache::resolve` is the single entry point that turns a report code
//! into a `RaidNight`: an indexed snapshot is loaded from the store, otherwise
//! the night is built from the fetch sources and persisted before returning.

pub mod fs;

use std::path::PathBuf;

use crate::builder::SnapshotBuilder;
use crate::domain::{Catalog, RaidNight, Result, Snapshot};
use crate::metrics::METRICS;
use crate::obs::{emit_cache_hit, emit_cache_miss, emit_snapshot_persisted};
use crate::source::{ReportSource, ScoreSource};

/// Persistent snapshot storage interface.
pub trait SnapshotStore: Send + Sync {
    /// Snapshot stored under `report_code`, if indexed.
    fn load(&self, report_code: &str) -> Result<Option<Snapshot>>;

    /// Write `snapshot` and index it. Returns where it landed.
    fn persist(&self, snapshot: &Snapshot) -> Result<PathBuf>;

    /// Every indexed report code.
    fn report_codes(&self) -> Vec<String>;
}

/// Cache of built nights over a `SnapshotStore`.
pub struct SnapshotCache<S> {
    store: S,
    catalog: Catalog,
}

impl<S: SnapshotStore> SnapshotCache<S> {
    pub fn new(store: S, catalog: Catalog) -> Self {
        Self { store, catalog }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Load a stored night without touching the network.
    pub fn load(&self, report_code: &str) -> Result<Option<RaidNight>> {
        self.store
            .load(report_code)?
            .map(|snapshot| RaidNight::from_snapshot(snapshot, &self.catalog))
            .transpose()
    }

    /// Load `report_code` from the store, or build and persist it.
    ///
    /// On a hit no fetch is issued. On a miss the build runs to completion
    /// before anything is written; a failed build leaves the store untouched.
    pub async fn resolve(
        &self,
        report_code: &str,
        reports: &dyn ReportSource,
        scores: &dyn ScoreSource,
    ) -> Result<RaidNight> {
        if let Some(night) = self.load(report_code)? {
            METRICS.inc_cache_hits();
            emit_cache_hit(report_code);
            return Ok(night);
        }

        METRICS.inc_cache_misses();
        emit_cache_miss(report_code);

        let night = SnapshotBuilder::new(&self.catalog, reports, scores)
            .build(report_code)
            .await?;
        let path = self.store.persist(&night.snapshot)?;
        emit_snapshot_persisted(report_code, &path);
        Ok(night)
    }

    /// Every stored night, oldest first.
    pub fn nights(&self) -> Result<Vec<RaidNight>> {
        let mut nights = self
            .snapshots()?
            .into_iter()
            .map(|snapshot| RaidNight::from_snapshot(snapshot, &self.catalog))
            .collect::<Result<Vec<_>>>()?;
        sort_nights(&mut nights);
        Ok(nights)
    }

    /// Stored nights of the same group as `night`, excluding `night` itself,
    /// oldest first. Snapshots of other groups are never period-resolved.
    pub fn pool_for(&self, night: &RaidNight) -> Result<Vec<RaidNight>> {
        let mut pool = Vec::new();
        for snapshot in self.snapshots()? {
            if snapshot.group_name() != night.group_name()
                || snapshot.event_id() == night.event_id()
            {
                continue;
            }
            pool.push(RaidNight::from_snapshot(snapshot, &self.catalog)?);
        }
        sort_nights(&mut pool);
        Ok(pool)
    }

    fn snapshots(&self) -> Result<Vec<Snapshot>> {
        let mut out = Vec::new();
        for code in self.store.report_codes() {
            if let Some(snapshot) = self.store.load(&code)? {
                out.push(snapshot);
            }
        }
        Ok(out)
    }
}

fn sort_nights(nights: &mut [RaidNight]) {
    nights.sort_by(|a, b| {
        a.snapshot
            .raidnight_date
            .cmp(&b.snapshot.raidnight_date)
            .then_with(|| a.event_id().cmp(b.event_id()))
    });
}
