// One-time challenge store.
//
// A keyed issue/verify/expire store holding at most one live challenge per
// key. The auth flows use it for email OTP codes (key = lowercased email)
// and for OAuth CSRF state (key = the state string). Issuing overwrites any
// previous challenge for the key; verification consumes the challenge on an
// exact match and leaves it untouched on a mismatch so the real code stays
// usable for a retry. Entries older than the TTL are treated as absent and
// dropped lazily.
//
// Shared mutable state across concurrent requests; the races here are
// benign: concurrent issues for one key resolve last-write-wins, and a
// verify racing a re-issue only ever sees the newest challenge.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rand::Rng;
use tokio::sync::RwLock;

/// Default challenge lifetime: the "expires in 5 minutes" shown to users.
pub const DEFAULT_CHALLENGE_TTL: Duration = Duration::from_secs(5 * 60);

/// Generate a 6-digit numeric OTP, uniformly drawn from 100000..=999999.
pub fn generate_otp() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

/// Keyed one-shot challenge store. Injected into `AppContext`; backends
/// other than the in-process map (a distributed cache, a database table)
/// only need to implement this trait.
#[async_trait]
pub trait ChallengeStore: Send + Sync + fmt::Debug {
    /// Store `value` under `key`, replacing any previous challenge.
    /// The previous challenge becomes invalid immediately.
    async fn issue(&self, key: &str, value: String);

    /// Returns true and removes the challenge iff `value` matches exactly
    /// and the challenge has not expired. On mismatch the stored challenge
    /// is left untouched.
    async fn verify(&self, key: &str, value: &str) -> bool;

    /// Drop any challenge for `key`.
    async fn expire(&self, key: &str);
}

struct Entry {
    value: String,
    issued_at: Instant,
}

/// In-process challenge store: a `HashMap` behind `tokio::sync::RwLock`.
pub struct MemoryChallengeStore {
    entries: RwLock<HashMap<String, Entry>>,
    ttl: Duration,
}

impl fmt::Debug for MemoryChallengeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryChallengeStore")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl Default for MemoryChallengeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryChallengeStore {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_CHALLENGE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Shift a stored challenge's issue time into the past (tests only).
    #[cfg(test)]
    async fn backdate(&self, key: &str, by: Duration) {
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get_mut(key) {
            if let Some(earlier) = entry.issued_at.checked_sub(by) {
                entry.issued_at = earlier;
            }
        }
    }
}

#[async_trait]
impl ChallengeStore for MemoryChallengeStore {
    async fn issue(&self, key: &str, value: String) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            Entry {
                value,
                issued_at: Instant::now(),
            },
        );
    }

    async fn verify(&self, key: &str, value: &str) -> bool {
        let mut entries = self.entries.write().await;
        let Some(entry) = entries.get(key) else {
            return false;
        };

        if entry.issued_at.elapsed() > self.ttl {
            entries.remove(key);
            return false;
        }

        if entry.value == value {
            entries.remove(key);
            true
        } else {
            false
        }
    }

    async fn expire(&self, key: &str) {
        self.entries.write().await.remove(key);
    }
}
