// Document store adapter trait.
//
// Every backend (MongoDB, in-memory) implements this trait. The adapter
// works with `serde_json::Value` documents to stay schema-agnostic; the
// typed models in `db::models` convert to and from those documents.
//
// The query surface is deliberately small: equality filters, a single sort
// key, and a limit. Nothing in the notes domain needs more, and adapters
// must not be asked for more.

use std::fmt;

use async_trait::async_trait;

/// Result type for adapter operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by a store backend.
///
/// `Duplicate` is load-bearing: a unique-index violation during user
/// creation is the backstop for the check-then-insert race and must map to
/// the "already exists" outcome, not a 500.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    Duplicate(String),

    #[error("malformed record: {0}")]
    Malformed(String),

    #[error("store backend error: {0}")]
    Backend(String),
}

/// A single equality filter.
#[derive(Debug, Clone)]
pub struct Where {
    pub field: String,
    pub value: serde_json::Value,
}

impl Where {
    pub fn eq(field: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Sort specification (field + direction).
#[derive(Debug, Clone)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Query parameters for `find_many`.
#[derive(Debug, Clone, Default)]
pub struct FindQuery {
    pub filters: Vec<Where>,
    pub sort: Option<Sort>,
    pub limit: Option<i64>,
}

/// The document store adapter.
#[async_trait]
pub trait Adapter: Send + Sync + fmt::Debug {
    /// Insert a document. Returns the stored document. Fails with
    /// `StoreError::Duplicate` when a unique index rejects the insert.
    async fn create(
        &self,
        collection: &str,
        doc: serde_json::Value,
    ) -> StoreResult<serde_json::Value>;

    /// Find the first document matching all filters.
    async fn find_one(
        &self,
        collection: &str,
        filters: &[Where],
    ) -> StoreResult<Option<serde_json::Value>>;

    /// Find all documents matching the query.
    async fn find_many(
        &self,
        collection: &str,
        query: FindQuery,
    ) -> StoreResult<Vec<serde_json::Value>>;

    /// Delete the first document matching all filters, returning it.
    /// `None` means nothing matched (and nothing was deleted).
    async fn delete_one(
        &self,
        collection: &str,
        filters: &[Where],
    ) -> StoreResult<Option<serde_json::Value>>;

    /// Create collections/indexes described by `db::schema::SCHEMA`.
    async fn ensure_schema(&self) -> StoreResult<()>;
}
