use std::{
    fmt,
    future::Future,
    io::Error,
    path::{Path, PathBuf},
};

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Serialize, de::DeserializeOwned};

use crate::{utils, warning};

#[derive(Debug)]
pub enum StoreError {
    IoError(Error),
    CriticalError(String),
    SerdeError(serde_json::Error),
}

impl From<Error> for StoreError {
    fn from(err: Error) -> Self {
        StoreError::IoError(err)
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::IoError(e) => write!(f, "{}", e),
            StoreError::CriticalError(message) => write!(f, "{}", message),
            StoreError::SerdeError(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for StoreError {}

/// A persisted value together with the time it was taken.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    pub path: PathBuf,
    pub taken_at: NaiveDateTime,
    pub value: T,
}

/// Whether a snapshot taken at `taken_at` may be reused at `now`.
///
/// No cutoff or a cutoff of zero always means stale.
pub fn is_fresh(taken_at: NaiveDateTime, now: NaiveDateTime, cutoff: Option<TimeDelta>) -> bool {
    match cutoff {
        Some(cutoff) if cutoff > TimeDelta::zero() => now - taken_at <= cutoff,
        _ => false,
    }
}

/// Key-value store of timestamped snapshots, one directory per kind.
///
/// Each value lives in `{dir}/{key}-{YYYYMMDD-HHMM}.json`.
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The newest snapshot for `key`, if any.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<Snapshot<T>>, StoreError> {
        let Some((taken_at, path)) = self.entries(key).await?.pop() else {
            return Ok(None);
        };

        let content = async_fs::read_to_string(&path).await?;
        let value = serde_json::from_str(&content).map_err(StoreError::SerdeError)?;
        Ok(Some(Snapshot {
            path,
            taken_at,
            value,
        }))
    }

    /// Writes a snapshot for `key` stamped with `taken_at`.
    pub async fn put<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        taken_at: NaiveDateTime,
    ) -> Result<PathBuf, StoreError> {
        async_fs::create_dir_all(&self.dir).await?;

        let path = self.dir.join(utils::snapshot_file_name(key, taken_at));
        let json = serde_json::to_string_pretty(value).map_err(StoreError::SerdeError)?;
        async_fs::write(&path, json).await?;
        Ok(path)
    }

    /// Deletes every snapshot of `key` except the newest `keep_latest`.
    /// Returns the number of files removed.
    pub async fn evict_older_than(&self, key: &str, keep_latest: usize) -> Result<usize, StoreError> {
        let entries = self.entries(key).await?;
        let stale = entries.len().saturating_sub(keep_latest);
        for (_, path) in entries.iter().take(stale) {
            async_fs::remove_file(path).await?;
        }
        Ok(stale)
    }

    /// Replaces all snapshots of `key` with a single new one.
    pub async fn replace<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        taken_at: NaiveDateTime,
    ) -> Result<PathBuf, StoreError> {
        self.evict_older_than(key, 0).await?;
        self.put(key, value, taken_at).await
    }

    /// Returns the snapshot for `key` when it is fresh, otherwise calls
    /// `fetch` and replaces the stored snapshots with its result.
    ///
    /// A failed fetch leaves the stored snapshots untouched. An unreadable
    /// snapshot counts as missing.
    pub async fn load_or_refresh<T, E, F, Fut>(
        &self,
        key: &str,
        cutoff: Option<TimeDelta>,
        now: NaiveDateTime,
        fetch: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<StoreError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match self.get::<T>(key).await {
            Ok(Some(snapshot)) if is_fresh(snapshot.taken_at, now, cutoff) => {
                return Ok(snapshot.value);
            }
            Ok(_) => {}
            Err(StoreError::SerdeError(e)) => {
                warning!("Ignoring unreadable snapshot for {}: {}", key, e);
            }
            Err(e) => return Err(e.into()),
        }

        let value = fetch().await?;
        self.replace(key, &value, now).await?;
        Ok(value)
    }

    /// Snapshot files of `key`, oldest first.
    async fn entries(&self, key: &str) -> Result<Vec<(NaiveDateTime, PathBuf)>, StoreError> {
        let mut dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if let Some(taken_at) = utils::parse_snapshot_file_name(file_name, key) {
                entries.push((taken_at, entry.path()));
            }
        }

        entries.sort();
        Ok(entries)
    }
}
