use std::{io::Error, path::PathBuf};

#[derive(Debug)]
pub enum StateError {
    IoError(Error),
    CriticalError(String),
}

impl From<Error> for StateError {
    fn from(err: Error) -> Self {
        StateError::IoError(err)
    }
}

impl std::fmt::Display for StateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateError::IoError(e) => write!(f, "{}", e),
            StateError::CriticalError(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for StateError {}

/// A plain-text file holding a single integer, used for the discovery guard
/// and the refresh cursor.
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// The stored value, `None` if the file does not exist yet.
    pub async fn load(&self) -> Result<Option<u64>, StateError> {
        let content = match async_fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StateError::IoError(e)),
        };

        let line = content.lines().next().unwrap_or_default().trim();
        line.parse::<u64>().map(Some).map_err(|_| {
            StateError::CriticalError(format!(
                "Invalid value {:?} in {}",
                line,
                self.path.display()
            ))
        })
    }

    pub async fn load_or(&self, default: u64) -> Result<u64, StateError> {
        Ok(self.load().await?.unwrap_or(default))
    }

    pub async fn persist(&self, value: u64) -> Result<(), StateError> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        async_fs::write(&self.path, value.to_string()).await?;
        Ok(())
    }
}
