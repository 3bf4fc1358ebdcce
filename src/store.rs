//! Palette persistence collaborator and its two local implementations
//!
//! Stores are owner-agnostic document collections. Listing is filtered by
//! owner and ordered most-recent-first; deleting an unknown id succeeds.

use crate::{
    error::{PaletteError, Result},
    types::{ColorEntry, Palette, PaletteId},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Fields supplied by the caller when creating a palette document
#[derive(Debug, Clone, PartialEq)]
pub struct NewPalette {
    pub owner_id: String,
    pub owner_name: String,
    pub name: String,
    pub colors: Vec<ColorEntry>,
}

/// Durable palette storage
#[async_trait]
pub trait PaletteStore: Send + Sync {
    /// Persist a palette; the store assigns the id and timestamp
    async fn create(&self, palette: NewPalette) -> Result<PaletteId>;

    /// All palettes owned by `owner_id`, most recent first
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Palette>>;

    /// Remove a palette; missing ids are not an error
    async fn delete_by_id(&self, id: &PaletteId) -> Result<()>;
}

/// Stored document shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct PaletteDocument {
    id: PaletteId,
    owner_id: String,
    #[serde(default)]
    owner_name: Option<String>,
    name: String,
    colors: Vec<ColorEntry>,
    #[serde(default)]
    color_count: usize,
    created_at: DateTime<Utc>,
    /// Insertion sequence, breaks timestamp ties
    #[serde(default)]
    seq: u64,
}

impl PaletteDocument {
    fn new(palette: NewPalette, created_at: DateTime<Utc>, seq: u64) -> Self {
        Self {
            id: PaletteId::generate(),
            color_count: palette.colors.len(),
            owner_id: palette.owner_id,
            owner_name: Some(palette.owner_name),
            name: palette.name,
            colors: palette.colors,
            created_at,
            seq,
        }
    }

    fn to_palette(&self) -> Palette {
        Palette {
            id: Some(self.id.clone()),
            name: self.name.clone(),
            owner_id: Some(self.owner_id.clone()),
            owner_name: self.owner_name.clone(),
            colors: self.colors.clone(),
            created_at: Some(self.created_at),
        }
    }
}

fn list_owned(documents: &[PaletteDocument], owner_id: &str) -> Vec<Palette> {
    let mut owned: Vec<&PaletteDocument> =
        documents.iter().filter(|d| d.owner_id == owner_id).collect();
    owned.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.seq.cmp(&a.seq))
    });
    owned.into_iter().map(PaletteDocument::to_palette).collect()
}

fn next_seq(documents: &[PaletteDocument]) -> u64 {
    documents.iter().map(|d| d.seq).max().map_or(0, |s| s + 1)
}

/// Store holding documents in process memory
#[derive(Default)]
pub struct InMemoryPaletteStore {
    documents: Mutex<Vec<PaletteDocument>>,
}

impl InMemoryPaletteStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents across all owners
    pub async fn len(&self) -> usize {
        self.documents.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl PaletteStore for InMemoryPaletteStore {
    async fn create(&self, palette: NewPalette) -> Result<PaletteId> {
        let mut documents = self.documents.lock().await;
        let document = PaletteDocument::new(palette, Utc::now(), next_seq(&documents));
        let id = document.id.clone();
        documents.push(document);
        Ok(id)
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Palette>> {
        Ok(list_owned(&self.documents.lock().await, owner_id))
    }

    async fn delete_by_id(&self, id: &PaletteId) -> Result<()> {
        self.documents.lock().await.retain(|d| &d.id != id);
        Ok(())
    }
}

/// Store persisting every document to a single JSON file
///
/// Writes go to a sibling temporary file which is then renamed over the
/// store, so a crash never leaves a truncated document.
pub struct JsonFilePaletteStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFilePaletteStore {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<PaletteDocument>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(Vec::new()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                PaletteError::persistence(format!(
                    "Corrupt palette store '{}': {}",
                    self.path.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(PaletteError::persistence(format!(
                "Failed to read '{}': {}",
                self.path.display(),
                e
            ))),
        }
    }

    async fn save(&self, documents: &[PaletteDocument]) -> Result<()> {
        let write_err = |e: std::io::Error| {
            PaletteError::persistence(format!("Failed to write '{}': {}", self.path.display(), e))
        };

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        let json = serde_json::to_vec_pretty(documents)
            .map_err(|e| PaletteError::persistence(e.to_string()))?;
        let temp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, json).await.map_err(write_err)?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(write_err)?;
        Ok(())
    }
}

#[async_trait]
impl PaletteStore for JsonFilePaletteStore {
    async fn create(&self, palette: NewPalette) -> Result<PaletteId> {
        let _guard = self.lock.lock().await;
        let mut documents = self.load().await?;
        let document = PaletteDocument::new(palette, Utc::now(), next_seq(&documents));
        let id = document.id.clone();
        documents.push(document);
        self.save(&documents).await?;
        log::debug!("Stored palette {} in {}", id, self.path.display());
        Ok(id)
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Palette>> {
        let _guard = self.lock.lock().await;
        Ok(list_owned(&self.load().await?, owner_id))
    }

    async fn delete_by_id(&self, id: &PaletteId) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut documents = self.load().await?;
        let before = documents.len();
        documents.retain(|d| &d.id != id);
        if documents.len() != before {
            self.save(&documents).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn new_palette(owner: &str, name: &str) -> NewPalette {
        NewPalette {
            owner_id: owner.to_string(),
            owner_name: "Ana".to_string(),
            name: name.to_string(),
            colors: vec![ColorEntry {
                hex: "#F5F5DC".to_string(),
                name: "Beige".to_string(),
                percentage: 100.0,
            }],
        }
    }

    async fn exercise(store: &dyn PaletteStore) {
        let first = store.create(new_palette("u1", "Primera")).await.unwrap();
        let second = store.create(new_palette("u1", "Segunda")).await.unwrap();
        store.create(new_palette("u2", "Ajena")).await.unwrap();
        assert_ne!(first, second);

        let listed = store.list_by_owner("u1").await.unwrap();
        let names: Vec<&str> = listed.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Segunda", "Primera"]);
        assert_eq!(listed[0].owner_name.as_deref(), Some("Ana"));
        assert!(listed[0].created_at.is_some());

        store.delete_by_id(&first).await.unwrap();
        store.delete_by_id(&first).await.unwrap();
        store.delete_by_id(&PaletteId::new("missing")).await.unwrap();

        let listed = store.list_by_owner("u1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id.as_ref(), Some(&second));
        assert_eq!(store.list_by_owner("u2").await.unwrap().len(), 1);
        assert!(store.list_by_owner("u3").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_in_memory_store() {
        let store = InMemoryPaletteStore::new();
        exercise(&store).await;
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_json_file_store() {
        let dir = TempDir::new().unwrap();
        let store = JsonFilePaletteStore::new(dir.path().join("nested").join("palettes.json"));
        exercise(&store).await;

        let reopened = JsonFilePaletteStore::new(store.path());
        assert_eq!(reopened.list_by_owner("u1").await.unwrap().len(), 1);

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"color_count\": 1"));
    }

    #[tokio::test]
    async fn test_json_file_store_reports_corruption() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("palettes.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = JsonFilePaletteStore::new(&path)
            .list_by_owner("u1")
            .await
            .unwrap_err();
        assert!(matches!(err, PaletteError::Persistence(_)));
    }
}
