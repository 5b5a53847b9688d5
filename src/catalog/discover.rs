use std::collections::HashSet;

use crate::{
    catalog::{BatchProgress, BatchSettings, GameSource, fetch_in_batches},
    types::GameTable,
};

#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryReport {
    /// Number of unknown ids requested.
    pub requested: usize,
    /// Number of new records added to the table.
    pub found: usize,
    /// Requested ids that came back empty. Deleted ids and ids lost to a
    /// failed batch both end up here.
    pub unconfirmed: Vec<u32>,
    /// Next guard value; `None` when nothing was found.
    pub new_guard: Option<u32>,
}

/// Ids in `[1, guard)` not yet in `table`, ascending.
pub fn unknown_ids(table: &GameTable, guard: u32) -> Vec<u32> {
    (1..guard).filter(|id| !table.contains_key(id)).collect()
}

/// Requests every unknown id below `guard` and adds the records that come back.
///
/// When at least one record is found the new guard is the table's highest id
/// plus the configured headroom. Running it again with nothing new upstream
/// leaves the table alone and yields no new guard.
pub async fn discover<S, P>(
    table: &mut GameTable,
    guard: u32,
    source: &S,
    settings: &BatchSettings,
    on_batch: P,
) -> DiscoveryReport
where
    S: GameSource,
    P: FnMut(BatchProgress),
{
    let requested = unknown_ids(table, guard);
    let records = fetch_in_batches(source, &requested, settings, on_batch).await;

    let wanted: HashSet<u32> = requested.iter().copied().collect();
    let mut found = 0;
    for record in records {
        if wanted.contains(&record.id) && !table.contains_key(&record.id) {
            table.insert(record.id, record);
            found += 1;
        }
    }

    let unconfirmed: Vec<u32> = requested
        .iter()
        .copied()
        .filter(|id| !table.contains_key(id))
        .collect();

    let new_guard = if found > 0 {
        table
            .keys()
            .next_back()
            .map(|max| max.saturating_add(settings.headroom))
    } else {
        None
    };

    DiscoveryReport {
        requested: requested.len(),
        found,
        unconfirmed,
        new_guard,
    }
}
