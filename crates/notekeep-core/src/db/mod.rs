// Document store abstraction: the adapter trait, query types, the collection
// schema, and the typed records stored in it.

pub mod adapter;
pub mod models;
pub mod schema;

pub use adapter::{Adapter, FindQuery, Sort, SortDirection, StoreError, StoreResult, Where};
pub use models::{Note, User, UserSummary};
