// HashMap-based adapter implementing the core `Adapter` trait.
//
// Documents live in `HashMap<String, Vec<serde_json::Value>>` keyed by
// collection name, behind a `tokio::sync::RwLock`. Unique indexes from
// `schema::SCHEMA` are enforced on insert, so this adapter exhibits the same
// duplicate-rejection behavior as the MongoDB one.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use tokio::sync::RwLock;

use notekeep_core::db::adapter::{
    Adapter, FindQuery, SortDirection, StoreError, StoreResult, Where,
};
use notekeep_core::db::schema;

type Store = HashMap<String, Vec<serde_json::Value>>;

/// In-memory document store. Data is lost when the adapter is dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryAdapter {
    store: Arc<RwLock<Store>>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record count for one collection, for test assertions.
    pub async fn count(&self, collection: &str) -> usize {
        self.store
            .read()
            .await
            .get(collection)
            .map(|v| v.len())
            .unwrap_or(0)
    }

    pub async fn clear(&self) {
        self.store.write().await.clear();
    }
}

fn matches_filters(doc: &serde_json::Value, filters: &[Where]) -> bool {
    filters.iter().all(|w| {
        doc.get(&w.field)
            .map(|v| *v == w.value)
            .unwrap_or(w.value.is_null())
    })
}

/// Compare two field values for sorting. Strings that parse as RFC 3339
/// timestamps are compared as instants, not lexicographically; fractional
/// seconds make the string ordering unreliable.
fn compare_values(a: &serde_json::Value, b: &serde_json::Value) -> std::cmp::Ordering {
    match (a, b) {
        (serde_json::Value::String(a_s), serde_json::Value::String(b_s)) => {
            match (
                DateTime::<FixedOffset>::parse_from_rfc3339(a_s),
                DateTime::<FixedOffset>::parse_from_rfc3339(b_s),
            ) {
                (Ok(a_t), Ok(b_t)) => a_t.cmp(&b_t),
                _ => a_s.cmp(b_s),
            }
        }
        (serde_json::Value::Number(a_n), serde_json::Value::Number(b_n)) => a_n
            .as_f64()
            .partial_cmp(&b_n.as_f64())
            .unwrap_or(std::cmp::Ordering::Equal),
        _ => std::cmp::Ordering::Equal,
    }
}

/// Unique fields declared for this collection in the store schema.
fn unique_fields(collection: &str) -> &'static [&'static str] {
    schema::SCHEMA
        .iter()
        .find(|c| c.name == collection)
        .map(|c| c.unique)
        .unwrap_or(&[])
}

#[async_trait]
impl Adapter for MemoryAdapter {
    async fn create(
        &self,
        collection: &str,
        doc: serde_json::Value,
    ) -> StoreResult<serde_json::Value> {
        let mut store = self.store.write().await;
        let docs = store.entry(collection.to_string()).or_default();

        for field in unique_fields(collection) {
            if let Some(value) = doc.get(*field) {
                if docs.iter().any(|existing| existing.get(*field) == Some(value)) {
                    return Err(StoreError::Duplicate((*field).to_string()));
                }
            }
        }

        docs.push(doc.clone());
        Ok(doc)
    }

    async fn find_one(
        &self,
        collection: &str,
        filters: &[Where],
    ) -> StoreResult<Option<serde_json::Value>> {
        let store = self.store.read().await;
        Ok(store
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| matches_filters(d, filters)).cloned()))
    }

    async fn find_many(
        &self,
        collection: &str,
        query: FindQuery,
    ) -> StoreResult<Vec<serde_json::Value>> {
        let store = self.store.read().await;
        let mut results: Vec<_> = store
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| matches_filters(d, &query.filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(sort) = &query.sort {
            results.sort_by(|a, b| {
                let a_v = a.get(&sort.field).unwrap_or(&serde_json::Value::Null);
                let b_v = b.get(&sort.field).unwrap_or(&serde_json::Value::Null);
                let ord = compare_values(a_v, b_v);
                match sort.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            });
        }

        if let Some(limit) = query.limit {
            results.truncate(limit.max(0) as usize);
        }

        Ok(results)
    }

    async fn delete_one(
        &self,
        collection: &str,
        filters: &[Where],
    ) -> StoreResult<Option<serde_json::Value>> {
        let mut store = self.store.write().await;
        let Some(docs) = store.get_mut(collection) else {
            return Ok(None);
        };

        match docs.iter().position(|d| matches_filters(d, filters)) {
            Some(idx) => Ok(Some(docs.remove(idx))),
            None => Ok(None),
        }
    }

    async fn ensure_schema(&self) -> StoreResult<()> {
        let mut store = self.store.write().await;
        for collection in schema::SCHEMA {
            store.entry(collection.name.to_string()).or_default();
        }
        Ok(())
    }
}
