// In-memory store adapter for notekeep.
//
// HashMap-backed, ephemeral, thread-safe. Used by the test suites and for
// local development without a MongoDB instance.

pub mod adapter;

pub use adapter::MemoryAdapter;
