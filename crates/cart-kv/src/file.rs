//! JSON file-backed store.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::{fs, sync::Mutex};

use crate::{CacheError, KvStore};

/// Key-value store persisted as a single JSON object on disk.
///
/// Every stored document must be UTF-8 text (the cart layer writes JSON).
/// The whole file is rewritten on each save or remove, through a temporary
/// file and a rename so a crash never leaves a half-written file behind.
/// The in-memory view only changes once the file has been written.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store at `path`, reading existing entries if the file exists.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let path = path.into();
        let entries = match fs::read(&path).await {
            Ok(bytes) if bytes.is_empty() => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                CacheError::Open(format!("{}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(path = %path.display(), keys = entries.len(), "opened json file store");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    async fn write_file(&self, entries: &BTreeMap<String, String>) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let data = serde_json::to_vec_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl KvStore for JsonFileStore {
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let entries = self.entries.lock().await;
        Ok(entries.get(key).map(|v| v.clone().into_bytes()))
    }

    async fn save(&self, key: &str, bytes: &[u8]) -> Result<(), CacheError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| CacheError::Store(format!("{key}: value is not UTF-8: {e}")))?;
        let mut entries = self.entries.lock().await;
        let mut next = entries.clone();
        next.insert(key.to_string(), text.to_string());
        self.write_file(&next).await?;
        *entries = next;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().await;
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(key);
        self.write_file(&next).await?;
        *entries = next;
        Ok(())
    }
}
