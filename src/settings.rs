//! User settings: the key-value service column selections are persisted in.

use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, trace, warn};

use crate::domain::CFError;

/// Key-value store for user settings.
///
/// A key that was never written reads as `None`.
#[async_trait]
pub trait UserSettings: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<String>>, CFError>;

    async fn set(&self, key: &str, value: &[String]) -> Result<(), CFError>;
}

/// Settings kept in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: RwLock<HashMap<String, Vec<String>>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<String>)>,
        K: Into<String>,
    {
        Self {
            values: RwLock::new(entries.into_iter().map(|(k, v)| (k.into(), v)).collect()),
        }
    }
}

#[async_trait]
impl UserSettings for MemorySettings {
    async fn get(&self, key: &str) -> Result<Option<Vec<String>>, CFError> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[String]) -> Result<(), CFError> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

/// Settings stored as one JSON object in a file.
///
/// A missing file holds no settings. Writes within the process are serialized
/// and replace the file through a temporary file.
#[derive(Debug)]
pub struct FileSettings {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<BTreeMap<String, Vec<String>>, CFError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                trace!("No settings file at {}", self.path.display());
                Ok(BTreeMap::new())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl UserSettings for FileSettings {
    async fn get(&self, key: &str) -> Result<Option<Vec<String>>, CFError> {
        Ok(self.read_all().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &[String]) -> Result<(), CFError> {
        let _guard = self.write_lock.lock().await;

        let mut values = match self.read_all().await {
            Ok(values) => values,
            Err(CFError::Json(e)) => {
                warn!("Replacing unreadable settings file {}: {e}", self.path.display());
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        values.insert(key.to_string(), value.to_vec());

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(&values)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!("Saved {key} to {}", self.path.display());
        Ok(())
    }
}
