use crate::errors::StorageError;
use crate::models::{Habit, Profile, Settings};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::{collections::BTreeMap, path::Path, path::PathBuf};
use tokio::{fs, sync::Mutex};
use tracing::{debug, error};

/// Key-value persistence. Values are overwritten wholesale on `set` and
/// returned unchanged by the next `get`.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;
    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError>;
}

/// All keys live in one JSON object, rewritten to disk on every `set`.
pub struct JsonFileStore {
    path: Option<PathBuf>,
    entries: Mutex<BTreeMap<String, Value>>,
}

impl JsonFileStore {
    pub async fn open(path: PathBuf) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let entries = load_entries(&path).await;
        Ok(Self {
            path: Some(path),
            entries: Mutex::new(entries),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: Mutex::new(BTreeMap::new()),
        }
    }
}

#[async_trait]
impl KvStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().await;
        let Some(path) = &self.path else {
            entries.insert(key.to_string(), value);
            return Ok(());
        };

        // Memory only changes once the file does.
        let mut next = entries.clone();
        next.insert(key.to_string(), value);
        persist_entries(path, &next).await?;
        *entries = next;
        debug!(key, "persisted store");
        Ok(())
    }
}

async fn load_entries(path: &Path) -> BTreeMap<String, Value> {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(entries) => entries,
            Err(err) => {
                error!("failed to parse data file: {err}");
                BTreeMap::new()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
        Err(err) => {
            error!("failed to read data file: {err}");
            BTreeMap::new()
        }
    }
}

async fn persist_entries(path: &Path, entries: &BTreeMap<String, Value>) -> Result<(), StorageError> {
    let payload = serde_json::to_vec_pretty(entries)?;
    let staging = path.with_extension("json.tmp");
    fs::write(&staging, payload).await?;
    fs::rename(&staging, path).await?;
    Ok(())
}

fn habits_key(user: &str) -> String {
    format!("habits:{user}")
}

fn profile_key(user: &str) -> String {
    format!("profile:{user}")
}

fn settings_key(user: &str) -> String {
    format!("settings:{user}")
}

async fn get_typed<T: DeserializeOwned>(store: &dyn KvStore, key: &str) -> Result<Option<T>, StorageError> {
    match store.get(key).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

async fn set_typed<T: Serialize + ?Sized>(store: &dyn KvStore, key: &str, value: &T) -> Result<(), StorageError> {
    store.set(key, serde_json::to_value(value)?).await
}

/// Stored habits, empty when the user has none yet.
pub async fn load_habits(store: &dyn KvStore, user: &str) -> Result<Vec<Habit>, StorageError> {
    Ok(get_typed(store, &habits_key(user)).await?.unwrap_or_default())
}

pub async fn save_habits(store: &dyn KvStore, user: &str, habits: &[Habit]) -> Result<(), StorageError> {
    set_typed(store, &habits_key(user), habits).await
}

pub async fn load_profile(store: &dyn KvStore, user: &str) -> Result<Option<Profile>, StorageError> {
    get_typed(store, &profile_key(user)).await
}

pub async fn save_profile(store: &dyn KvStore, user: &str, profile: &Profile) -> Result<(), StorageError> {
    set_typed(store, &profile_key(user), profile).await
}

/// Stored settings, or the defaults when the user never saved any.
pub async fn load_settings(store: &dyn KvStore, user: &str) -> Result<Settings, StorageError> {
    Ok(get_typed(store, &settings_key(user)).await?.unwrap_or_default())
}

pub async fn save_settings(store: &dyn KvStore, user: &str, settings: &Settings) -> Result<(), StorageError> {
    set_typed(store, &settings_key(user), settings).await
}
