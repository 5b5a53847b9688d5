use chrono::Local;
use tabled::Table;

use crate::{
    bgg::BggClient,
    catalog::{self, BatchProgress, BatchSettings},
    cli::spinner,
    config::Config,
    error, info,
    management::{GameTableStore, StateFile},
    success,
    types::{GameTable, GameTableRow},
    utils, warning,
};

pub async fn show_games(config: &Config, ids: Vec<u32>) {
    let client = BggClient::new(config);

    let settings = BatchSettings::from(config);
    let pb = spinner(&format!("Fetching {} games...", ids.len()));
    let games = catalog::fetch_in_batches(&client, &ids, &settings, |p| {
        pb.set_message(progress_message("Games", p))
    })
    .await;
    pb.finish_and_clear();

    if games.is_empty() {
        warning!("None of the requested ids exist.");
        return;
    }

    let found = games.len();
    let rows: Vec<GameTableRow> = games.iter().map(GameTableRow::from).collect();
    println!("{}", Table::new(rows));
    success!("Found {} of {} requested games.", found, ids.len());
}

/// Requests every id below the guard that is not in the master table yet.
pub async fn discover_games(config: &Config) {
    let client = BggClient::new(config);
    let store = GameTableStore::new(config);
    let guard_file = StateFile::new(config.guard_path());

    let mut table = load_table(&store).await.map(|(_, t)| t).unwrap_or_default();
    let guard = match guard_file.load_or(config.initial_guard as u64).await {
        Ok(guard) => u32::try_from(guard).unwrap_or(u32::MAX),
        Err(e) => error!("Cannot read discovery guard. Err: {}", e),
    };

    let start = Local::now();
    println!("----------------------");
    info!("Start time: {}", start);
    info!("{} games in the starting collection, guard at {}.", table.len(), guard);

    let settings = BatchSettings::from(config);
    let pb = spinner("Looking for new games...");
    let report = catalog::discover(&mut table, guard, &client, &settings, |p| {
        pb.set_message(progress_message("New games", p))
    })
    .await;
    pb.finish_and_clear();

    let end = Local::now();
    info!("End time: {}", end);

    let Some(new_guard) = report.new_guard else {
        success!("Found no new games.");
        return;
    };

    success!(
        "Found {} games in {}",
        report.found,
        utils::format_elapsed(end - start)
    );
    if !report.unconfirmed.is_empty() {
        info!(
            "{} requested ids returned nothing and stay unknown.",
            report.unconfirmed.len()
        );
    }

    match store.publish(&table).await {
        Ok(path) => success!("Wrote {} games to {}", table.len(), path.display()),
        Err(e) => error!("Cannot write the master table. Err: {}", e),
    }
    match guard_file.persist(new_guard as u64).await {
        Ok(_) => info!("Next discovery guard: {}", new_guard),
        Err(e) => error!("Cannot persist discovery guard. Err: {}", e),
    }
}

/// Re-fetches the next window of the master table.
pub async fn refresh_games(config: &Config) {
    let client = BggClient::new(config);
    let store = GameTableStore::new(config);
    let cursor_file = StateFile::new(config.cursor_path());

    let Some((path, mut table)) = load_table(&store).await else {
        error!("No master game table found. Run bggcache games discover first.");
    };
    let cursor = match cursor_file.load_or(0).await {
        Ok(cursor) => usize::try_from(cursor).unwrap_or(0),
        Err(e) => error!("Cannot read refresh cursor. Err: {}", e),
    };

    let start = Local::now();
    println!("---------------------------");
    info!("Start time: {}", start);
    info!("{} games in the starting collection.", table.len());

    let settings = BatchSettings::from(config);
    let pb = spinner("Updating games...");
    let report = catalog::refresh(&mut table, cursor, &client, &settings, |p| {
        pb.set_message(progress_message("Updated games", p))
    })
    .await;
    pb.finish_and_clear();

    let end = Local::now();
    info!("End time: {}", end);

    if report.updated == 0 {
        if report.requested == 0 {
            warning!("Cursor {} is past the end of the table, starting over.", cursor);
            if let Err(e) = cursor_file.persist(report.next_cursor as u64).await {
                error!("Cannot persist refresh cursor. Err: {}", e);
            }
        } else {
            warning!("No games could be updated, cursor stays at {}.", cursor);
        }
        return;
    }

    success!(
        "Updated {} games in {}.",
        report.updated,
        utils::format_elapsed(end - start)
    );
    if !report.preserved.is_empty() {
        info!(
            "{} games did not come back and keep their previous data.",
            report.preserved.len()
        );
    }
    info!("{} games in the updated collection.", table.len());

    if let Err(e) = store.overwrite(&path, &table).await {
        error!("Cannot write the master table. Err: {}", e);
    }
    match cursor_file.persist(report.next_cursor as u64).await {
        Ok(_) => info!("Next refresh starts at position {}", report.next_cursor),
        Err(e) => error!("Cannot persist refresh cursor. Err: {}", e),
    }
}

async fn load_table(store: &GameTableStore) -> Option<(std::path::PathBuf, GameTable)> {
    match store.load().await {
        Ok(loaded) => loaded,
        Err(e) => error!("Cannot read the master game table. Err: {}", e),
    }
}

fn progress_message(label: &str, progress: BatchProgress) -> String {
    format!(
        "{label}: {records} (batch {batch}/{batches})",
        label = label,
        records = progress.records,
        batch = progress.batch,
        batches = progress.batches
    )
}
