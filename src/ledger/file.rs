// JSON-file world state
//
// The whole world state lives in one JSON object keyed by record id. Every
// mutation holds an exclusive fd-lock on a sidecar `.lock` file for its
// read-modify-write, and replaces the data file through a rename.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::ledger::store::{RecordStore, WorldState};
use crate::model::Record;

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    lock_path: PathBuf,
    local: Arc<Mutex<()>>,
}

impl FileStore {
    /// Open the ledger file, creating an empty one when missing
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        if !path.exists() {
            persist(&path, &WorldState::default())?;
            info!(path = %path.display(), "Created empty ledger file");
        }
        let mut lock_path = path.clone().into_os_string();
        lock_path.push(".lock");
        Ok(Self {
            path,
            lock_path: PathBuf::from(lock_path),
            local: Arc::new(Mutex::new(())),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load_shared(&self) -> Result<WorldState, StoreError> {
        let path = self.path.clone();
        let lock_path = self.lock_path.clone();
        tokio::task::spawn_blocking(move || -> Result<WorldState, StoreError> {
            let lock = fd_lock::RwLock::new(open_lock_file(&lock_path)?);
            let _held = lock.read()?;
            load(&path)
        })
        .await
        .map_err(|e| StoreError::Io(std::io::Error::other(e)))?
    }

    /// Run `change` against the current state and persist the result if it succeeds
    async fn mutate<R, F>(&self, change: F) -> Result<R, StoreError>
    where
        R: Send + 'static,
        F: FnOnce(&mut WorldState) -> Result<R, StoreError> + Send + 'static,
    {
        let _local = self.local.lock().await;
        let path = self.path.clone();
        let lock_path = self.lock_path.clone();
        tokio::task::spawn_blocking(move || -> Result<R, StoreError> {
            let mut lock = fd_lock::RwLock::new(open_lock_file(&lock_path)?);
            let _held = lock.write()?;
            let mut state = load(&path)?;
            let result = change(&mut state)?;
            persist(&path, &state)?;
            Ok(result)
        })
        .await
        .map_err(|e| StoreError::Io(std::io::Error::other(e)))?
    }
}

fn open_lock_file(lock_path: &Path) -> Result<fs::File, StoreError> {
    Ok(OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(lock_path)?)
}

fn load(path: &Path) -> Result<WorldState, StoreError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(WorldState::default()),
        Err(e) => return Err(e.into()),
    };
    if raw.trim().is_empty() {
        return Ok(WorldState::default());
    }
    let documents: BTreeMap<String, Value> =
        serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
            id: path.display().to_string(),
            reason: e.to_string(),
        })?;
    Ok(WorldState::from_documents(documents))
}

fn persist(path: &Path, state: &WorldState) -> Result<(), StoreError> {
    let mut tmp = path.to_path_buf().into_os_string();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, serde_json::to_vec_pretty(state.documents())?)?;
    fs::rename(&tmp, path)?;
    debug!(path = %path.display(), records = state.documents().len(), "Ledger file written");
    Ok(())
}

#[async_trait]
impl RecordStore for FileStore {
    async fn read(&self, id: &str) -> Result<Record, StoreError> {
        self.load_shared().await?.get(id)
    }

    async fn read_all(&self) -> Result<Vec<Record>, StoreError> {
        Ok(self.load_shared().await?.all())
    }

    async fn write(
        &self,
        id: &str,
        record: &Record,
        expected_version: Option<u64>,
    ) -> Result<(), StoreError> {
        let id = id.to_string();
        let record = record.clone();
        self.mutate(move |state| state.put(&id, &record, expected_version))
            .await
    }

    async fn delete(&self, id: &str, expected_version: u64) -> Result<(), StoreError> {
        let id = id.to_string();
        self.mutate(move |state| state.remove(&id, expected_version))
            .await
    }

    async fn insert_raw(&self, id: &str, document: Value) -> Result<bool, StoreError> {
        let id = id.to_string();
        self.mutate(move |state| Ok(state.insert_if_absent(&id, document)))
            .await
    }
}
