//! # Keyed Stores
//!
//! [`StringMap`] implementations for the custom command table.
//! `JsonFileStringMap` rewrites a JSON file (default `data/commands.json`) after every
//! mutation. Tests use the process-local `InMemoryStringMap`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::domain::traits::StringMap;

#[cfg(test)]
#[derive(Debug, Default)]
pub struct InMemoryStringMap {
    entries: Mutex<BTreeMap<String, String>>,
}

#[cfg(test)]
impl InMemoryStringMap {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
#[async_trait]
impl StringMap for InMemoryStringMap {
    async fn has(&self, key: &str) -> Result<bool> {
        Ok(self.entries.lock().await.contains_key(key))
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }

    async fn all(&self) -> Result<BTreeMap<String, String>> {
        Ok(self.entries.lock().await.clone())
    }
}

/// Persists the whole table as pretty JSON on every change.
#[derive(Debug)]
pub struct JsonFileStringMap {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStringMap {
    /// Loads `path` if it exists, otherwise starts empty.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries: BTreeMap<String, String> = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            BTreeMap::new()
        };
        tracing::info!("Loaded {} custom commands from {}", entries.len(), path.display());
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    async fn save(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let content = serde_json::to_string_pretty(entries)?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, content)
            .await
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }
}

#[async_trait]
impl StringMap for JsonFileStringMap {
    async fn has(&self, key: &str) -> Result<bool> {
        Ok(self.entries.lock().await.contains_key(key))
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().await;
        let mut updated = entries.clone();
        updated.insert(key.to_string(), value.to_string());
        // Memory only changes once the file agrees with it.
        self.save(&updated).await?;
        *entries = updated;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().await;
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut updated = entries.clone();
        updated.remove(key);
        self.save(&updated).await?;
        *entries = updated;
        Ok(())
    }

    async fn all(&self) -> Result<BTreeMap<String, String>> {
        Ok(self.entries.lock().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_in_memory_map() {
        let map = InMemoryStringMap::new();
        assert!(!map.has("a").await.unwrap());
        map.set("b", "2").await.unwrap();
        map.set("a", "1").await.unwrap();
        assert_eq!(map.get("a").await.unwrap().as_deref(), Some("1"));

        let keys: Vec<_> = map.all().await.unwrap().into_keys().collect();
        assert_eq!(keys, vec!["a", "b"]);

        map.delete("a").await.unwrap();
        assert!(!map.has("a").await.unwrap());
    }

    #[tokio::test]
    async fn test_json_file_map_persists() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("commands.json");

        let map = JsonFileStringMap::open(&path).unwrap();
        map.set("hello", "world").await.unwrap();
        map.set("bye", "now").await.unwrap();
        map.delete("bye").await.unwrap();
        assert!(path.exists());

        let reopened = JsonFileStringMap::open(&path).unwrap();
        assert_eq!(reopened.get("hello").await.unwrap().as_deref(), Some("world"));
        assert!(!reopened.has("bye").await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_save_leaves_table_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let good = temp_dir.path().join("commands.json");
        std::fs::write(&good, r#"{"keep": "me"}"#).unwrap();
        let map = JsonFileStringMap::open(&good).unwrap();

        // Point the map at a path whose parent is a regular file so every write fails.
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let broken = JsonFileStringMap {
            path: blocker.join("commands.json"),
            entries: Mutex::new(map.all().await.unwrap()),
        };

        assert!(broken.set("hello", "world").await.is_err());
        assert!(!broken.has("hello").await.unwrap());
        assert!(!blocker.join("commands.json").exists());

        assert!(broken.delete("keep").await.is_err());
        assert_eq!(broken.get("keep").await.unwrap().as_deref(), Some("me"));
    }

    #[test]
    fn test_json_file_map_rejects_garbage() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("commands.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(JsonFileStringMap::open(&path).is_err());
    }
}
