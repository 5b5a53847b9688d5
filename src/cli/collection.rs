use chrono::TimeDelta;
use tabled::Table;

use crate::{
    bgg::BggClient,
    cli::spinner,
    config::Config,
    error,
    filter::CollectionFilter,
    management::{SnapshotStore, User, get_buddies},
    success,
    types::CollectionTableRow,
    warning,
};

pub async fn collection(
    config: &Config,
    username: String,
    cutoff: Option<TimeDelta>,
    refresh: bool,
    filter: CollectionFilter,
) {
    let client = BggClient::new(config);
    let store = SnapshotStore::new(config.users_dir());

    // a forced refresh is a load with a zero cutoff
    let cutoff = if refresh { Some(TimeDelta::zero()) } else { cutoff };

    let pb = spinner(&format!("Loading collection of {}...", username.trim()));
    let user = match User::load(&client, &store, &username, cutoff).await {
        Ok(user) => user,
        Err(e) => {
            pb.finish_and_clear();
            error!("Cannot load collection of {}. Err: {}", username.trim(), e);
        }
    };
    pb.finish_and_clear();

    let entries = user.filter(&filter);
    if entries.is_empty() {
        warning!("{}: no games match.", user);
        return;
    }

    let rows: Vec<CollectionTableRow> = entries.iter().map(CollectionTableRow::from).collect();
    println!("{}", Table::new(rows));
    success!(
        "{}: {} of {} games shown.",
        user,
        entries.len(),
        user.collection().len()
    );
}

pub async fn buddies(config: &Config, username: String, cutoff: Option<TimeDelta>) {
    let client = BggClient::new(config);
    let store = SnapshotStore::new(config.buddies_dir());

    let pb = spinner(&format!("Loading geekbuddies of {}...", username.trim()));
    let result = get_buddies(&client, &store, &username, cutoff).await;
    pb.finish_and_clear();

    match result {
        Ok(buddies) if buddies.is_empty() => warning!("{} has no geekbuddies.", username.trim()),
        Ok(buddies) => {
            let count = buddies.len();
            println!("{}", Table::new(buddies));
            success!("{} geekbuddies.", count);
        }
        Err(e) => error!("Cannot load geekbuddies of {}. Err: {}", username.trim(), e),
    }
}
