use std::path::PathBuf;

use crate::{
    config::Config,
    management::StoreError,
    types::{GameRecord, GameTable},
    utils,
};

/// Storage of the master game table.
///
/// The working directory holds one current `all-to-{maxid}.json`; every
/// published table is also copied into the backup directory.
pub struct GameTableStore {
    dir: PathBuf,
    backup_dir: PathBuf,
}

impl GameTableStore {
    pub fn new(config: &Config) -> Self {
        Self {
            dir: config.games_dir(),
            backup_dir: config.backups_dir(),
        }
    }

    /// Master files in the working directory, ordered by their max id.
    pub async fn master_files(&self) -> Result<Vec<(u32, PathBuf)>, StoreError> {
        let mut dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            if let Some(max_id) = file_name.to_str().and_then(utils::parse_master_file_name) {
                files.push((max_id, entry.path()));
            }
        }

        files.sort();
        Ok(files)
    }

    /// Loads the newest master table with its path. `None` if none exists.
    pub async fn load(&self) -> Result<Option<(PathBuf, GameTable)>, StoreError> {
        let Some((_, path)) = self.master_files().await?.pop() else {
            return Ok(None);
        };

        let content = async_fs::read_to_string(&path).await?;
        let games: Vec<GameRecord> =
            serde_json::from_str(&content).map_err(StoreError::SerdeError)?;
        let table = games.into_iter().map(|g| (g.id, g)).collect();
        Ok(Some((path, table)))
    }

    /// Writes `table` to `path`, sorted by id.
    pub async fn overwrite(&self, path: &PathBuf, table: &GameTable) -> Result<(), StoreError> {
        async_fs::create_dir_all(&self.dir).await?;

        let games: Vec<&GameRecord> = table.values().collect();
        let json = serde_json::to_string_pretty(&games).map_err(StoreError::SerdeError)?;
        async_fs::write(path, json).await?;
        Ok(())
    }

    /// Writes `table` as a new master file named after its highest id, copies
    /// it into the backup directory and removes every other master file from
    /// the working directory.
    pub async fn publish(&self, table: &GameTable) -> Result<PathBuf, StoreError> {
        let max_id = table.keys().next_back().copied().ok_or_else(|| {
            StoreError::CriticalError("Refusing to publish an empty game table".to_string())
        })?;

        let file_name = utils::master_file_name(max_id);
        let path = self.dir.join(&file_name);
        self.overwrite(&path, table).await?;

        async_fs::create_dir_all(&self.backup_dir).await?;
        async_fs::copy(&path, self.backup_dir.join(&file_name)).await?;

        for (_, old) in self.master_files().await? {
            if old != path {
                async_fs::remove_file(&old).await?;
            }
        }

        Ok(path)
    }
}
