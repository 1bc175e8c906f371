//! Resolution cache, shared by every request the server is handling.
use crate::name::normalise;
use crate::types::Type;
use dashmap::DashMap;
use std::time::{Duration, Instant};

/// A previously obtained response and when it stops being valid.
#[derive(Clone, Debug)]
struct Entry {
    response: Vec<u8>,
    expires: Instant,
}

/// Maps (name, type) to the raw bytes of a response that answered it.
///
/// Entries are valid until `now + ttl` where the ttl is taken from the first
/// answer record at insertion time. Expired entries are never evicted, they
/// are ignored on read and replaced by the next `put`.
///
/// ```
/// use iterdns::cache::Cache;
/// use iterdns::Type;
/// use std::time::Duration;
///
/// let cache = Cache::new();
/// cache.put("example.com.", Type::A, vec![1, 2, 3], Duration::from_secs(60));
/// assert_eq!(cache.get("EXAMPLE.com", Type::A), Some(vec![1, 2, 3]));
/// assert_eq!(cache.get("example.com.", Type::AAAA), None);
/// ```
#[derive(Debug, Default)]
pub struct Cache {
    entries: DashMap<(String, Type), Entry>,
}

impl Cache {
    pub fn new() -> Cache {
        Cache::default()
    }

    /// Returns the stored response, if there is one and it has not expired.
    pub fn get(&self, name: &str, r#type: Type) -> Option<Vec<u8>> {
        self.get_at(name, r#type, Instant::now())
    }

    /// Same as [`Cache::get`] but as if the current time is `now`.
    pub fn get_at(&self, name: &str, r#type: Type, now: Instant) -> Option<Vec<u8>> {
        let entry = self.entries.get(&(normalise(name), r#type))?;
        if now < entry.expires {
            Some(entry.response.clone())
        } else {
            None
        }
    }

    /// Stores the response, valid for `ttl`.
    pub fn put(&self, name: &str, r#type: Type, response: Vec<u8>, ttl: Duration) {
        self.put_at(name, r#type, response, ttl, Instant::now())
    }

    /// Same as [`Cache::put`] but as if the current time is `now`.
    pub fn put_at(&self, name: &str, r#type: Type, response: Vec<u8>, ttl: Duration, now: Instant) {
        let expires = match now.checked_add(ttl) {
            Some(expires) => expires,
            None => return,
        };

        self.entries
            .insert((normalise(name), r#type), Entry { response, expires });
    }

    /// Number of entries, including expired ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
