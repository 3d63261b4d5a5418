//! Persistence-client seam for view records.
//!
//! The backend is an external collaborator consumed by UI-layer code; the
//! collection coordinator never talks to it directly. The trait is defined
//! here so UI consumers and tests share one seam, with an in-memory
//! implementation standing in for the HTTP client.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use cellview_core::{CellviewError, Result, View, ViewPatch};

/// Asynchronous CRUD interface for persisted views, scoped by entry.
#[async_trait]
pub trait ViewStore: Send + Sync {
    /// Persists a new view under `entry_id`, returning the stored record.
    async fn create(&self, entry_id: &str, view: View) -> Result<View>;

    /// Applies a partial update to a persisted view.
    async fn update(&self, id: &str, patch: ViewPatch) -> Result<View>;

    /// Deletes a persisted view.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Lists the persisted views for an entry, in stored order.
    async fn list_by_entry(&self, entry_id: &str) -> Result<Vec<View>>;
}

/// In-memory [`ViewStore`] for tests and demos.
#[derive(Debug, Default)]
pub struct MemoryViewStore {
    records: Mutex<Vec<(String, View)>>,
}

impl MemoryViewStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ViewStore for MemoryViewStore {
    async fn create(&self, entry_id: &str, mut view: View) -> Result<View> {
        let mut records = self.records.lock().expect("store lock poisoned");
        if records.iter().any(|(_, stored)| stored.id == view.id) {
            return Err(CellviewError::ViewExists(view.id));
        }
        let now = Utc::now();
        view.created_at.get_or_insert(now);
        view.updated_at.get_or_insert(now);
        records.push((entry_id.to_string(), view.clone()));
        Ok(view)
    }

    async fn update(&self, id: &str, patch: ViewPatch) -> Result<View> {
        let mut records = self.records.lock().expect("store lock poisoned");
        let Some((_, view)) = records.iter_mut().find(|(_, stored)| stored.id == id) else {
            return Err(CellviewError::ViewNotFound(id.to_string()));
        };
        if let Some(name) = patch.name {
            view.name = name;
        }
        if let Some(description) = patch.description {
            view.description = description;
        }
        if let Some(snapshot) = patch.snapshot {
            view.snapshot = Some(snapshot);
        }
        view.updated_at = Some(Utc::now());
        Ok(view.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut records = self.records.lock().expect("store lock poisoned");
        let before = records.len();
        records.retain(|(_, stored)| stored.id != id);
        if records.len() == before {
            return Err(CellviewError::ViewNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn list_by_entry(&self, entry_id: &str) -> Result<Vec<View>> {
        let records = self.records.lock().expect("store lock poisoned");
        Ok(records
            .iter()
            .filter(|(entry, _)| entry == entry_id)
            .map(|(_, view)| view.clone())
            .collect())
    }
}
