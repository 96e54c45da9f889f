// Collection layout consumed by `Adapter::ensure_schema`.

/// A single collection and the indexes it needs.
#[derive(Debug, Clone, Copy)]
pub struct Collection {
    pub name: &'static str,
    /// Fields that carry a unique index.
    pub unique: &'static [&'static str],
    /// Fields that carry a plain lookup index.
    pub indexed: &'static [&'static str],
}

pub const USERS: &str = "users";
pub const NOTES: &str = "notes";

/// The full store layout. Email uniqueness lives here, not in application
/// checks: the unique index is the backstop for concurrent sign-ups.
pub const SCHEMA: &[Collection] = &[
    Collection {
        name: USERS,
        unique: &["email"],
        indexed: &[],
    },
    Collection {
        name: NOTES,
        unique: &[],
        indexed: &["createdBy"],
    },
];
