use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};

/// In-memory sliding-window rate limiter keyed by (bucket, client hash).
pub struct RateLimiter {
    entries: Mutex<HashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        RateLimiter {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Record an attempt and return true if it is allowed (under the limit).
    /// `key` should be something like "contact:<client_hash>".
    pub fn check_and_record(&self, key: &str, max_attempts: u64, window: Duration) -> bool {
        let mut map = self.entries.lock().unwrap();
        let now = Instant::now();
        let cutoff = now - window;

        let attempts = map.entry(key.to_string()).or_default();
        attempts.retain(|t| *t > cutoff);

        if (attempts.len() as u64) < max_attempts {
            attempts.push(now);
            true
        } else {
            false
        }
    }

    /// Drop entries older than `max_age` to keep the map bounded.
    pub fn cleanup(&self, max_age: Duration) {
        let mut map = self.entries.lock().unwrap();
        let cutoff = Instant::now() - max_age;
        map.retain(|_, attempts| {
            attempts.retain(|t| *t > cutoff);
            !attempts.is_empty()
        });
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash a client address before using it as a limiter key.
pub fn hash_client(addr: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(addr.as_bytes());
    hex::encode(hasher.finalize())
}
