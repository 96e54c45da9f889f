// MongoDB store adapter for notekeep.
//
// Implements the core `Adapter` trait with the official MongoDB Rust driver.
// Collections map one-to-one to the store schema; the `id` field is stored
// as `_id`.

pub mod adapter;
pub mod query;

pub use adapter::MongoAdapter;
