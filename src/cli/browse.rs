use tabled::Table;

use crate::{
    bgg::{
        BggClient,
        browse::{ClassificationKind, save_classifications},
    },
    cli::spinner,
    config::Config,
    error, success, warning,
};

pub async fn classifications(config: &Config, kind: ClassificationKind, save: bool) {
    let client = BggClient::new(config);

    let pb = spinner(&format!("Fetching {}...", kind.label()));
    let rows = match client.classifications(kind).await {
        Ok(rows) => rows,
        Err(e) => {
            pb.finish_and_clear();
            error!("Cannot fetch {}. Err: {}", kind.label(), e);
        }
    };
    pb.finish_and_clear();

    if rows.is_empty() {
        warning!("No {} found on the browse page.", kind.label());
        return;
    }

    if save {
        match save_classifications(config, kind, &rows).await {
            Ok(path) => success!("Saved {} {} to {}", rows.len(), kind.label(), path.display()),
            Err(e) => warning!("Cannot save {}. Err: {}", kind.label(), e),
        }
    }

    let count = rows.len();
    println!("{}", Table::new(rows));
    success!("{} {}.", count, kind.label());
}
