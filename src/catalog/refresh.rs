use crate::{
    catalog::{BatchProgress, BatchSettings, GameSource, fetch_in_batches},
    types::GameTable,
};

#[derive(Debug, Clone, PartialEq)]
pub struct RefreshReport {
    /// Number of ids in the window.
    pub requested: usize,
    /// Number of records replaced with fresh data.
    pub updated: usize,
    /// Window ids that did not come back and kept their old record.
    pub preserved: Vec<u32>,
    /// Start of the next window; unchanged when nothing was updated, 0 when
    /// the window was empty.
    pub next_cursor: usize,
}

/// Ids at table positions `[cursor, cursor + window)`.
pub fn refresh_window(table: &GameTable, cursor: usize, window: usize) -> Vec<u32> {
    table.keys().skip(cursor).take(window).copied().collect()
}

/// Moves the cursor one window ahead, back to 0 once it reaches the table end.
pub fn advance_cursor(cursor: usize, window: usize, table_len: usize) -> usize {
    let next = cursor.saturating_add(window);
    if next >= table_len { 0 } else { next }
}

/// Re-requests one window of existing ids and replaces the records that
/// come back. The table never grows or shrinks.
pub async fn refresh<S, P>(
    table: &mut GameTable,
    cursor: usize,
    source: &S,
    settings: &BatchSettings,
    on_batch: P,
) -> RefreshReport
where
    S: GameSource,
    P: FnMut(BatchProgress),
{
    let requested = refresh_window(table, cursor, settings.window);
    let records = fetch_in_batches(source, &requested, settings, on_batch).await;

    let mut refreshed = Vec::with_capacity(records.len());
    for record in records {
        // only ids of this window, never new ones
        if requested.binary_search(&record.id).is_ok() {
            if let Some(slot) = table.get_mut(&record.id) {
                refreshed.push(record.id);
                *slot = record;
            }
        }
    }
    refreshed.sort_unstable();
    refreshed.dedup();

    let preserved = requested
        .iter()
        .copied()
        .filter(|id| refreshed.binary_search(id).is_err())
        .collect();

    // a cursor past the end (e.g. after the table shrank) starts over
    let next_cursor = if requested.is_empty() {
        0
    } else if refreshed.is_empty() {
        cursor
    } else {
        advance_cursor(cursor, settings.window, table.len())
    };

    RefreshReport {
        requested: requested.len(),
        updated: refreshed.len(),
        preserved,
        next_cursor,
    }
}
