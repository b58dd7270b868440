//! Persistence boundary for authored assets.
//!
//! The backend that actually stores events and templates is an external collaborator.
//! [`AssetStore`] is the seam; [`InMemoryStore`] is a local implementation used by tests and
//! the CLI.

use crate::event::{AssetSource, Event};
use crate::template::SymptomTemplate;
use crate::{AuthoringError, AuthoringResult};
use medsim_uuid::AssetId;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// A record that can be held by an [`AssetStore`].
pub trait Asset: Clone + Send + Sync {
    /// Human-readable kind used in error messages.
    const KIND: &'static str;

    fn id(&self) -> &str;
    fn assign_id(&mut self, id: String);
    fn key(&self) -> &str;
    fn display_name(&self) -> &str;
    fn source(&self) -> AssetSource;
}

impl Asset for Event {
    const KIND: &'static str = "event";

    fn id(&self) -> &str {
        &self.id
    }

    fn assign_id(&mut self, id: String) {
        self.id = id;
    }

    fn key(&self) -> &str {
        &self.key
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn source(&self) -> AssetSource {
        self.source
    }
}

impl Asset for SymptomTemplate {
    const KIND: &'static str = "symptom template";

    fn id(&self) -> &str {
        &self.id
    }

    fn assign_id(&mut self, id: String) {
        self.id = id;
    }

    fn key(&self) -> &str {
        &self.key
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn source(&self) -> AssetSource {
        self.source
    }
}

/// Request/response seam to the asset backend.
pub trait AssetStore<T: Asset>: Send + Sync {
    /// Inserts or replaces a record and returns the stored copy. A record with an empty id is
    /// assigned one.
    fn save(&self, record: T) -> AuthoringResult<T>;

    /// Removes a record and returns it.
    fn delete(&self, id: &str) -> AuthoringResult<T>;

    fn get(&self, id: &str) -> AuthoringResult<Option<T>>;

    fn find_by_key(&self, key: &str) -> AuthoringResult<Option<T>>;

    fn list(&self) -> AuthoringResult<Vec<T>>;
}

/// Thread-safe in-memory store keyed by asset id.
#[derive(Debug)]
pub struct InMemoryStore<T> {
    records: RwLock<BTreeMap<String, T>>,
}

impl<T> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<T: Asset> InMemoryStore<T> {
    /// Seeds a store with existing records (for example shipped presets). Records with an
    /// empty id are assigned one.
    pub fn with_records(records: impl IntoIterator<Item = T>) -> Self {
        let map = records
            .into_iter()
            .map(|mut record| {
                if record.id().is_empty() {
                    record.assign_id(AssetId::new().to_string());
                }
                (record.id().to_string(), record)
            })
            .collect();
        Self {
            records: RwLock::new(map),
        }
    }

    pub fn len(&self) -> AuthoringResult<usize> {
        Ok(self.records.read().map_err(poisoned)?.len())
    }

    pub fn is_empty(&self) -> AuthoringResult<bool> {
        Ok(self.len()? == 0)
    }
}

fn poisoned<E>(_: E) -> AuthoringError {
    AuthoringError::Store("asset store lock poisoned".into())
}

impl<T: Asset> AssetStore<T> for InMemoryStore<T> {
    fn save(&self, mut record: T) -> AuthoringResult<T> {
        let mut records = self.records.write().map_err(poisoned)?;

        if record.id().is_empty() {
            record.assign_id(AssetId::new().to_string());
        }
        let key = record.key().trim();
        if !key.is_empty() {
            let clash = records
                .values()
                .any(|other| other.id() != record.id() && other.key().trim() == key);
            if clash {
                return Err(AuthoringError::DuplicateKey {
                    kind: T::KIND,
                    key: key.to_string(),
                });
            }
        }

        records.insert(record.id().to_string(), record.clone());
        tracing::info!(kind = T::KIND, id = record.id(), "asset saved");
        Ok(record)
    }

    fn delete(&self, id: &str) -> AuthoringResult<T> {
        let mut records = self.records.write().map_err(poisoned)?;
        let removed = records.remove(id).ok_or_else(|| AuthoringError::NotFound {
            kind: T::KIND,
            id: id.to_string(),
        })?;
        tracing::info!(kind = T::KIND, id, "asset deleted");
        Ok(removed)
    }

    fn get(&self, id: &str) -> AuthoringResult<Option<T>> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records.get(id).cloned())
    }

    fn find_by_key(&self, key: &str) -> AuthoringResult<Option<T>> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records.values().find(|r| r.key() == key).cloned())
    }

    fn list(&self) -> AuthoringResult<Vec<T>> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records.values().cloned().collect())
    }
}
