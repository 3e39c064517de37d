//! In-memory reference implementation of the destination store.
//!
//! Not a production backend: it exists so the engine's full live path can be
//! exercised without a CMS, and so tests have a destination with inspectable
//! state.

use super::{ContentStore, Document, MetaScope, StoredEntity};
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Debug, Clone)]
struct Entry {
    id: i64,
    scope: MetaScope,
    fields: serde_json::Map<String, Value>,
    modified: Option<String>,
    natural_key: Option<String>,
    meta: BTreeMap<String, Value>,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    entries: Vec<Entry>,
    // Stand-in for the object cache a real store accumulates per write.
    transient: Vec<i64>,
}

/// Reference [`ContentStore`] backed by process memory.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entities in a scope.
    #[must_use]
    pub fn len(&self, scope: MetaScope) -> usize {
        self.inner
            .lock()
            .unwrap()
            .entries
            .iter()
            .filter(|e| e.scope == scope)
            .count()
    }

    #[must_use]
    pub fn is_empty(&self, scope: MetaScope) -> bool {
        self.len(scope) == 0
    }

    /// Number of meta entries with the given key in a scope.
    #[must_use]
    pub fn count_meta(&self, scope: MetaScope, meta_key: &str) -> u64 {
        self.inner
            .lock()
            .unwrap()
            .entries
            .iter()
            .filter(|e| e.scope == scope && e.meta.contains_key(meta_key))
            .count() as u64
    }

    /// A meta value on one entity, if present.
    #[must_use]
    pub fn meta_value(&self, scope: MetaScope, id: i64, meta_key: &str) -> Option<Value> {
        self.inner
            .lock()
            .unwrap()
            .entries
            .iter()
            .find(|e| e.scope == scope && e.id == id)
            .and_then(|e| e.meta.get(meta_key).cloned())
    }

    /// A body field on one entity, if present.
    #[must_use]
    pub fn field_value(&self, scope: MetaScope, id: i64, field: &str) -> Option<Value> {
        self.inner
            .lock()
            .unwrap()
            .entries
            .iter()
            .find(|e| e.scope == scope && e.id == id)
            .and_then(|e| e.fields.get(field).cloned())
    }

    /// Size of the accumulated transient cache. Grows with writes, cleared
    /// by [`ContentStore::reset_transient_state`].
    #[must_use]
    pub fn transient_len(&self) -> usize {
        self.inner.lock().unwrap().transient.len()
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn find_by_legacy_id(
        &self,
        scope: MetaScope,
        id_key: &str,
        legacy_id: i64,
    ) -> Result<Option<StoredEntity>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .entries
            .iter()
            .find(|e| {
                e.scope == scope
                    && e.meta.get(id_key).and_then(Value::as_i64) == Some(legacy_id)
            })
            .map(|e| StoredEntity {
                id: e.id,
                modified: e.modified.clone(),
            }))
    }

    async fn find_by_natural_key(
        &self,
        scope: MetaScope,
        key: &str,
    ) -> Result<Option<StoredEntity>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .entries
            .iter()
            .find(|e| e.scope == scope && e.natural_key.as_deref() == Some(key))
            .map(|e| StoredEntity {
                id: e.id,
                modified: e.modified.clone(),
            }))
    }

    async fn insert(&self, scope: MetaScope, doc: Document) -> Result<i64> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.entries.push(Entry {
            id,
            scope,
            fields: doc.fields,
            modified: doc.modified,
            natural_key: doc.natural_key,
            meta: doc.meta.into_iter().collect(),
        });
        inner.transient.push(id);
        Ok(id)
    }

    async fn update(&self, scope: MetaScope, id: i64, doc: Document) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        let entry = inner
            .entries
            .iter_mut()
            .find(|e| e.scope == scope && e.id == id)
            .ok_or_else(|| {
                crate::error::MigrateError::write(
                    scope.as_str(),
                    format!("no entity with id {id}"),
                )
            })?;

        entry.fields = doc.fields;
        entry.modified = doc.modified;
        if doc.natural_key.is_some() {
            entry.natural_key = doc.natural_key;
        }
        for (key, value) in doc.meta {
            entry.meta.insert(key, value);
        }
        inner.transient.push(id);
        Ok(())
    }

    async fn delete_meta(&self, scope: MetaScope, meta_key: &str, limit: u64) -> Result<u64> {
        let mut inner = self.inner.lock().unwrap();
        let mut affected = 0u64;
        for entry in inner.entries.iter_mut() {
            if affected >= limit {
                break;
            }
            if entry.scope == scope && entry.meta.remove(meta_key).is_some() {
                affected += 1;
            }
        }
        Ok(affected)
    }

    async fn reset_transient_state(&self) {
        self.inner.lock().unwrap().transient.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(key: &str) -> Document {
        Document::new()
            .with_field("title", key)
            .with_natural_key(key)
    }

    #[tokio::test]
    async fn insert_then_lookup_by_natural_key() {
        let store = MemoryStore::new();
        let id = store.insert(MetaScope::Term, doc("news")).await.unwrap();
        let found = store
            .find_by_natural_key(MetaScope::Term, "news")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, id);
        assert!(store
            .find_by_natural_key(MetaScope::User, "news")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn legacy_id_lookup_reads_meta() {
        let store = MemoryStore::new();
        let doc = Document::new()
            .with_field("title", "a")
            .with_modified(Some("2020-01-01 00:00:00".into()));
        let mut doc = doc;
        doc.meta.push(("_old_article_id".into(), Value::from(42)));
        let id = store.insert(MetaScope::Post, doc).await.unwrap();

        let found = store
            .find_by_legacy_id(MetaScope::Post, "_old_article_id", 42)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.modified.as_deref(), Some("2020-01-01 00:00:00"));
    }

    #[tokio::test]
    async fn update_refreshes_meta_and_modified() {
        let store = MemoryStore::new();
        let mut first = doc("a");
        first.meta.push(("_legacy".into(), Value::from("v1")));
        let id = store.insert(MetaScope::Post, first).await.unwrap();

        let mut second = doc("a2");
        second.modified = Some("2021-05-05 10:00:00".into());
        second.meta.push(("_legacy".into(), Value::from("v2")));
        store.update(MetaScope::Post, id, second).await.unwrap();

        assert_eq!(
            store.meta_value(MetaScope::Post, id, "_legacy"),
            Some(Value::from("v2"))
        );
        assert_eq!(
            store.field_value(MetaScope::Post, id, "title"),
            Some(Value::from("a2"))
        );
    }

    #[tokio::test]
    async fn update_of_missing_entity_is_a_write_error() {
        let store = MemoryStore::new();
        let err = store.update(MetaScope::User, 99, doc("x")).await.unwrap_err();
        assert!(err.is_record_level());
    }

    #[tokio::test]
    async fn delete_meta_is_bounded_by_limit() {
        let store = MemoryStore::new();
        for i in 0..5 {
            let mut d = doc(&format!("t{i}"));
            d.meta.push(("_old_id".into(), Value::from(i)));
            store.insert(MetaScope::Term, d).await.unwrap();
        }

        assert_eq!(store.delete_meta(MetaScope::Term, "_old_id", 2).await.unwrap(), 2);
        assert_eq!(store.count_meta(MetaScope::Term, "_old_id"), 3);
        assert_eq!(store.delete_meta(MetaScope::Term, "_old_id", 10).await.unwrap(), 3);
        assert_eq!(store.delete_meta(MetaScope::Term, "_old_id", 10).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn reset_clears_transient_state() {
        let store = MemoryStore::new();
        store.insert(MetaScope::Post, doc("a")).await.unwrap();
        store.insert(MetaScope::Post, doc("b")).await.unwrap();
        assert_eq!(store.transient_len(), 2);
        store.reset_transient_state().await;
        assert_eq!(store.transient_len(), 0);
    }
}
