// MongoDB implementation of the core `Adapter` trait.

use async_trait::async_trait;
use futures_util::StreamExt;
use mongodb::bson::{doc, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{FindOptions, IndexOptions};
use mongodb::{Client, Collection, Database, IndexModel};

use notekeep_core::db::adapter::{Adapter, FindQuery, StoreError, StoreResult, Where};
use notekeep_core::db::schema;

use crate::query;

const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Debug, Clone)]
pub struct MongoAdapter {
    db: Database,
}

impl MongoAdapter {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Connect to a MongoDB URI and select the given database.
    pub async fn connect(uri: &str, db_name: &str) -> StoreResult<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| StoreError::Backend(format!("MongoDB connection failed: {e}")))?;
        Ok(Self {
            db: client.database(db_name),
        })
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection(name)
    }
}

/// A unique-index rejection on insert. Everything else is a backend error.
fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match &*err.kind {
        ErrorKind::Write(WriteFailure::WriteError(we)) => we.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}

/// The unique field a duplicate-key rejection points at. `StoreError::
/// Duplicate` carries a field name, never a collection name, so log lines
/// read the same across backends.
fn duplicate_field(collection: &str) -> String {
    schema::SCHEMA
        .iter()
        .find(|c| c.name == collection)
        .and_then(|c| c.unique.first())
        .map_or_else(|| collection.to_string(), |field| (*field).to_string())
}

#[async_trait]
impl Adapter for MongoAdapter {
    async fn create(
        &self,
        collection: &str,
        data: serde_json::Value,
    ) -> StoreResult<serde_json::Value> {
        let coll = self.collection(collection);
        let document = query::build_insert_doc(&data);

        coll.insert_one(document).await.map_err(|e| {
            if is_duplicate_key(&e) {
                StoreError::Duplicate(duplicate_field(collection))
            } else {
                StoreError::Backend(format!("MongoDB insert failed: {e}"))
            }
        })?;

        Ok(data)
    }

    async fn find_one(
        &self,
        collection: &str,
        filters: &[Where],
    ) -> StoreResult<Option<serde_json::Value>> {
        let coll = self.collection(collection);
        let result = coll
            .find_one(query::build_filter(filters))
            .await
            .map_err(|e| StoreError::Backend(format!("MongoDB find_one failed: {e}")))?;

        Ok(result.map(|document| query::doc_to_json(&document)))
    }

    async fn find_many(
        &self,
        collection: &str,
        find: FindQuery,
    ) -> StoreResult<Vec<serde_json::Value>> {
        let coll = self.collection(collection);

        let mut opts = FindOptions::default();
        if let Some(limit) = find.limit {
            opts.limit = Some(limit);
        }
        if let Some(sort) = &find.sort {
            opts.sort = Some(query::build_sort(sort));
        }

        let mut cursor = coll
            .find(query::build_filter(&find.filters))
            .with_options(opts)
            .await
            .map_err(|e| StoreError::Backend(format!("MongoDB find failed: {e}")))?;

        let mut results = Vec::new();
        while let Some(document) = cursor.next().await {
            let document =
                document.map_err(|e| StoreError::Backend(format!("cursor error: {e}")))?;
            results.push(query::doc_to_json(&document));
        }

        Ok(results)
    }

    async fn delete_one(
        &self,
        collection: &str,
        filters: &[Where],
    ) -> StoreResult<Option<serde_json::Value>> {
        let coll = self.collection(collection);
        let deleted = coll
            .find_one_and_delete(query::build_filter(filters))
            .await
            .map_err(|e| StoreError::Backend(format!("MongoDB delete failed: {e}")))?;

        Ok(deleted.map(|document| query::doc_to_json(&document)))
    }

    async fn ensure_schema(&self) -> StoreResult<()> {
        for collection in schema::SCHEMA {
            let coll = self.collection(collection.name);

            for field in collection.unique {
                let index = IndexModel::builder()
                    .keys(doc! { *field: 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build();
                coll.create_index(index).await.map_err(|e| {
                    StoreError::Backend(format!(
                        "index creation failed on {}.{field}: {e}",
                        collection.name
                    ))
                })?;
            }

            for field in collection.indexed {
                let index = IndexModel::builder().keys(doc! { *field: 1 }).build();
                coll.create_index(index).await.map_err(|e| {
                    StoreError::Backend(format!(
                        "index creation failed on {}.{field}: {e}",
                        collection.name
                    ))
                })?;
            }
        }

        Ok(())
    }
}
