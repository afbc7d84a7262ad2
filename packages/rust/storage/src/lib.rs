//! Persistent set of job titles that have already been reported.
//!
//! The set lives in a single JSON file (a sorted array of titles). Both
//! directions fail soft: an unreadable file loads as an empty set, and a failed
//! save leaves whatever was on disk before.

use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use careerwatch_shared::{CareerWatchError, Result};

/// Titles already reported. Ordered so serialization is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeenSet(BTreeSet<String>);

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, title: &str) -> bool {
        self.0.contains(title)
    }

    /// Mark `title` as seen. Returns `true` if it was not already present.
    pub fn add(&mut self, title: impl Into<String>) -> bool {
        self.0.insert(title.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for SeenSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// File-backed [`SeenSet`] storage.
#[derive(Debug, Clone)]
pub struct SeenJobStore {
    path: PathBuf,
}

impl SeenJobStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the seen set. Never fails: a missing, unreadable, or corrupt file
    /// yields an empty set.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> SeenSet {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("no seen-jobs file yet, starting empty");
                return SeenSet::new();
            }
            Err(e) => {
                error!(error = %e, "failed to read seen-jobs file, starting empty");
                return SeenSet::new();
            }
        };

        match serde_json::from_str::<SeenSet>(&raw) {
            Ok(set) => {
                debug!(count = set.len(), "seen jobs loaded");
                set
            }
            Err(e) => {
                error!(error = %e, "seen-jobs file is corrupt, starting empty");
                SeenSet::new()
            }
        }
    }

    /// Persist `set`, logging instead of returning the error. Returns whether
    /// the write landed.
    pub fn save(&self, set: &SeenSet) -> bool {
        match self.try_save(set) {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, path = %self.path.display(), "failed to save seen jobs");
                false
            }
        }
    }

    /// Persist `set` atomically: the target is only replaced once the full
    /// contents are on disk.
    #[instrument(skip_all, fields(path = %self.path.display(), count = set.len()))]
    pub fn try_save(&self, set: &SeenSet) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| CareerWatchError::io(parent, e))?;
        }

        let mut json = serde_json::to_string_pretty(set)
            .map_err(|e| CareerWatchError::Storage(format!("failed to serialize seen set: {e}")))?;
        json.push('\n');

        let tmp = self.temp_path();
        if let Err(e) = write_synced(&tmp, json.as_bytes()) {
            let _ = fs::remove_file(&tmp);
            return Err(CareerWatchError::io(&tmp, e));
        }

        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            warn!(tmp = %tmp.display(), "rename over seen-jobs file failed");
            CareerWatchError::io(&self.path, e)
        })?;

        debug!("seen jobs saved");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "known_jobs.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
