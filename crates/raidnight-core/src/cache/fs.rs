use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use regex::Regex;
use tempfile::NamedTempFile;
use tracing::warn;

use super::SnapshotStore;
use crate::domain::{RaidnightError, Result, Snapshot};

/// Filesystem-backed snapshot store.
///
/// Layout: `<root>/<name>(<report_code>).json`. The directory is scanned once
/// on open and an exact code-to-path index is kept in memory; files whose name
/// carries no report code are ignored.
pub struct FsSnapshotStore {
    dir: PathBuf,
    index: Mutex<BTreeMap<String, PathBuf>>,
}

impl FsSnapshotStore {
    /// Open the store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let dir = root.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        let index = scan(&dir)?;
        Ok(Self {
            dir,
            index: Mutex::new(index),
        })
    }

    /// Open the per-scope store `<data_dir>/<scope>`.
    pub fn scoped(data_dir: impl AsRef<Path>, scope: &str) -> Result<Self> {
        Self::open(data_dir.as_ref().join(scope))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Indexed path for `report_code`.
    pub fn path_for(&self, report_code: &str) -> Option<PathBuf> {
        self.lock_index().get(report_code).cloned()
    }

    fn lock_index(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, PathBuf>> {
        // A poisoned index is still a valid map.
        self.index.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Report code embedded in a snapshot filename, `"{name}({code}).json"`.
pub fn report_code_from_file_name(file_name: &str) -> Option<&str> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"^(?P<stem>.*)\((?P<code>[^()]+)\)\.json$").expect("filename pattern is valid")
    });
    pattern
        .captures(file_name)
        .and_then(|c| c.name("code"))
        .map(|m| m.as_str())
}

fn scan(dir: &Path) -> Result<BTreeMap<String, PathBuf>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();

    let mut index = BTreeMap::new();
    for name in names {
        let Some(code) = report_code_from_file_name(&name) else {
            if name.ends_with(".json") {
                warn!(file = %name, "snapshot file without report code ignored");
            }
            continue;
        };
        if let Some(kept) = index.get(code) {
            warn!(file = %name, kept = ?kept, code = %code, "duplicate snapshot for report code ignored");
            continue;
        }
        index.insert(code.to_string(), dir.join(&name));
    }
    Ok(index)
}

impl SnapshotStore for FsSnapshotStore {
    fn load(&self, report_code: &str) -> Result<Option<Snapshot>> {
        let Some(path) = self.path_for(report_code) else {
            return Ok(None);
        };
        let malformed = |reason: String| RaidnightError::MalformedSnapshot {
            path: path.display().to_string(),
            reason,
        };
        let bytes = fs::read(&path).map_err(|e| malformed(e.to_string()))?;
        let mut snapshot: Snapshot =
            serde_json::from_slice(&bytes).map_err(|e| malformed(e.to_string()))?;
        if snapshot.report_code.is_empty() {
            snapshot.report_code = report_code.to_string();
        }
        Ok(Some(snapshot))
    }

    fn persist(&self, snapshot: &Snapshot) -> Result<PathBuf> {
        let path = self.dir.join(snapshot.file_name());
        if snapshot.report_code.is_empty() {
            return Err(RaidnightError::MalformedSnapshot {
                path: path.display().to_string(),
                reason: "snapshot has no report code".to_string(),
            });
        }

        let data = serde_json::to_vec_pretty(snapshot)?;

        // Atomic write: temp file in the same directory, then rename.
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&data)?;
        tmp.persist(&path).map_err(|e| e.error)?;

        self.lock_index()
            .insert(snapshot.report_code.clone(), path.clone());
        Ok(path)
    }

    fn report_codes(&self) -> Vec<String> {
        self.lock_index().keys().cloned().collect()
    }
}
