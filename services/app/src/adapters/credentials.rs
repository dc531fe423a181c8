//! services/app/src/adapters/credentials.rs
//!
//! File-backed implementation of the `CredentialStore` port, standing in for
//! the device's preference storage. A single JSON object of string keys,
//! rewritten whole on every change.

use async_trait::async_trait;
use lms_core::ports::{CredentialStore, PortError, PortResult};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::Mutex;

pub struct FileCredentialStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles; reads alone don't need it.
    write_guard: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_guard: Mutex::new(()),
        }
    }

    /// A missing or corrupt file reads as an empty store. Preference storage
    /// never fails a read with stale data; neither do we.
    async fn load(&self) -> HashMap<String, String> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_default(),
            Err(_) => HashMap::new(),
        }
    }

    async fn save(&self, map: &HashMap<String, String>) -> PortResult<()> {
        let json = serde_json::to_string_pretty(map)
            .map_err(|e| PortError::Unexpected(format!("failed to serialize store: {e}")))?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| PortError::Unexpected(e.to_string()))?;
            }
        }
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.load().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> PortResult<()> {
        let _guard = self.write_guard.lock().await;
        let mut map = self.load().await;
        map.insert(key.to_string(), value.to_string());
        self.save(&map).await
    }

    async fn remove(&self, key: &str) -> PortResult<()> {
        let _guard = self.write_guard.lock().await;
        let mut map = self.load().await;
        if map.remove(key).is_some() {
            self.save(&map).await?;
        }
        Ok(())
    }
}
