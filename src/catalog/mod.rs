//! # Master Game Table Maintenance
//!
//! Two batch passes keep the master table current while staying under the
//! API's rate limit:
//!
//! - [`discover`] requests every id in `[1, guard)` that is not in the table
//!   yet and appends whatever comes back.
//! - [`refresh`] re-requests a window of existing ids and replaces the records
//!   that come back. Records whose ids fail to come back are kept as they were.
//!
//! Ids are requested in batches of [`BatchSettings::batch_size`] with a pause of
//! [`BatchSettings::delay`] after each batch. A batch that fails as a whole is
//! reported and treated like a batch that returned nothing.
//!
//! Both passes only work on in-memory tables; persisting the table, the guard
//! and the cursor is left to the caller (see `cli::games`).

mod discover;
mod refresh;

use std::time::Duration;

use tokio::time::sleep;

pub use discover::{DiscoveryReport, discover, unknown_ids};
pub use refresh::{RefreshReport, advance_cursor, refresh, refresh_window};

use crate::{
    bgg::{BggClient, BggError},
    config::Config,
    types::GameRecord,
    warning,
};

/// Anything that can turn a list of ids into game records.
#[allow(async_fn_in_trait)]
pub trait GameSource {
    /// Records for the ids that exist; others are left out.
    async fn fetch_games(&self, ids: &[u32]) -> Result<Vec<GameRecord>, BggError>;
}

impl GameSource for BggClient {
    async fn fetch_games(&self, ids: &[u32]) -> Result<Vec<GameRecord>, BggError> {
        self.get_games(ids).await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchSettings {
    pub batch_size: usize,
    pub delay: Duration,
    /// Number of table positions covered by one refresh run.
    pub window: usize,
    /// Added to the highest id to form the next discovery guard.
    pub headroom: u32,
}

impl From<&Config> for BatchSettings {
    fn from(config: &Config) -> Self {
        Self {
            batch_size: config.batch_size,
            delay: config.batch_delay,
            window: config.refresh_window,
            headroom: config.guard_headroom,
        }
    }
}

/// Progress of a running pass, reported after every batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    pub batch: usize,
    pub batches: usize,
    pub records: usize,
}

/// Requests `ids` batch by batch and returns every record obtained.
///
/// Sleeps [`BatchSettings::delay`] after every batch, so any caller that
/// requests more than one batch stays under the rate limit.
pub async fn fetch_in_batches<S, P>(
    source: &S,
    ids: &[u32],
    settings: &BatchSettings,
    mut on_batch: P,
) -> Vec<GameRecord>
where
    S: GameSource,
    P: FnMut(BatchProgress),
{
    let batch_size = settings.batch_size.max(1);
    let batches = ids.len().div_ceil(batch_size);
    let mut records = Vec::new();

    for (index, chunk) in ids.chunks(batch_size).enumerate() {
        match source.fetch_games(chunk).await {
            Ok(games) => records.extend(games),
            Err(e) => warning!(
                "Batch starting at id {} failed, skipping {} ids: {}",
                chunk[0],
                chunk.len(),
                e
            ),
        }

        on_batch(BatchProgress {
            batch: index + 1,
            batches,
            records: records.len(),
        });
        sleep(settings.delay).await;
    }

    records
}
