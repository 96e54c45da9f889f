// Typed records stored in the document store.
//
// `User` and `Note` serialize to the camelCase documents the adapters hold.
// API responses never serialize a full `User`: handlers go through
// `UserSummary`, which is how the password hash stays server-side.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::adapter::StoreError;
use crate::id::generate_id;

/// Fixed-width RFC 3339 serialization with microsecond precision.
///
/// Timestamps are stored as strings and the backends sort them with plain
/// string comparison. `chrono`'s default formatting trims trailing zeros,
/// so its fractional part varies between 0 and 9 digits and lexicographic
/// order stops matching chronological order. Pinning the width keeps the
/// two orders identical.
mod rfc3339_micros {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// An identity record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    /// Stored lowercase; uniqueness enforced by the store.
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    /// scrypt hash in `salt:key` hex form. Absent for OTP-mode and
    /// OAuth-provisioned users.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(with = "rfc3339_micros")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "rfc3339_micros")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a fresh record. The email is normalized to lowercase here so
    /// every lookup and the unique index agree on the key.
    pub fn new(
        name: impl Into<String>,
        email: &str,
        date_of_birth: Option<String>,
        password_hash: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            name: name.into(),
            email: email.trim().to_lowercase(),
            date_of_birth,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }

    /// The client-facing projection. Never includes the password hash.
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }

    pub fn to_doc(&self) -> Result<serde_json::Value, StoreError> {
        serde_json::to_value(self).map_err(|e| StoreError::Malformed(e.to_string()))
    }

    pub fn from_doc(doc: serde_json::Value) -> Result<Self, StoreError> {
        serde_json::from_value(doc).map_err(|e| StoreError::Malformed(e.to_string()))
    }
}

/// The user fields returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// An owner-scoped note.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    /// The free-text body. Immutable after creation.
    pub note: String,
    /// Owning user id.
    pub created_by: String,
    #[serde(with = "rfc3339_micros")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "rfc3339_micros")]
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn new(body: impl Into<String>, owner_id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            note: body.into(),
            created_by: owner_id.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn to_doc(&self) -> Result<serde_json::Value, StoreError> {
        serde_json::to_value(self).map_err(|e| StoreError::Malformed(e.to_string()))
    }

    pub fn from_doc(doc: serde_json::Value) -> Result<Self, StoreError> {
        serde_json::from_value(doc).map_err(|e| StoreError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_normalized() {
        let user = User::new("A", "  A@Example.COM ", None, None);
        assert_eq!(user.email, "a@example.com");
    }

    #[test]
    fn summary_has_no_hash() {
        let user = User::new("A", "a@example.com", None, Some("salt:key".into()));
        let summary = serde_json::to_value(user.summary()).unwrap();
        assert!(summary.get("passwordHash").is_none());
        assert_eq!(summary["email"], "a@example.com");
    }

    #[test]
    fn user_doc_round_trip() {
        let user = User::new("A", "a@example.com", Some("2000-01-01".into()), None);
        let doc = user.to_doc().unwrap();
        assert_eq!(doc["dateOfBirth"], "2000-01-01");
        assert!(doc.get("passwordHash").is_none());
        let back = User::from_doc(doc).unwrap();
        assert_eq!(back.id, user.id);
        assert_eq!(back.email, user.email);
    }

    #[test]
    fn note_doc_uses_camel_case_owner() {
        let note = Note::new("buy milk", "user-1");
        let doc = note.to_doc().unwrap();
        assert_eq!(doc["createdBy"], "user-1");
        assert_eq!(doc["note"], "buy milk");
        assert!(doc.get("createdAt").is_some());
    }

    #[test]
    fn timestamps_serialize_fixed_width() {
        // A timestamp whose nanoseconds chrono would otherwise trim.
        let round = DateTime::parse_from_rfc3339("2026-08-29T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let mut note = Note::new("a", "user-1");
        note.created_at = round;

        let doc = note.to_doc().unwrap();
        let created = doc["createdAt"].as_str().unwrap();
        let updated = doc["updatedAt"].as_str().unwrap();
        assert_eq!(created, "2026-08-29T10:00:00.000000Z");
        assert_eq!(created.len(), "2026-08-29T10:00:00.000000Z".len());
        assert_eq!(updated.len(), created.len());

        let back = Note::from_doc(doc).unwrap();
        assert_eq!(back.created_at, round);
    }
}
