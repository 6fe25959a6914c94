use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Memo of token strings that already passed verification.
///
/// Expiry is generational: once `expiration` is reached the next lookup
/// clears every entry and starts a new window of `lifetime`. Entries never
/// expire on their own. Within a window the set is bounded by `max_size`,
/// evicting the least recently used token.
#[derive(Debug)]
pub struct TokenCache {
    entries: HashMap<String, u64>,
    tick: u64,
    expiration: Instant,
    lifetime: Duration,
    max_size: usize,
}

impl TokenCache {
    pub fn new(lifetime: Duration, max_size: usize, now: Instant) -> Self {
        Self {
            entries: HashMap::with_capacity(max_size),
            tick: 0,
            expiration: now + lifetime,
            lifetime,
            max_size: max_size.max(1),
        }
    }

    /// Returns true when `token` is memoized in the current window. If the
    /// window has elapsed the whole set is dropped first.
    pub fn lookup_or_clear(&mut self, token: &str, now: Instant) -> bool {
        if now >= self.expiration {
            self.entries.clear();
            self.expiration = now + self.lifetime;
            return false;
        }

        self.tick += 1;
        match self.entries.get_mut(token) {
            Some(last_used) => {
                *last_used = self.tick;
                true
            }
            None => false,
        }
    }

    pub fn insert(&mut self, token: &str) {
        self.tick += 1;
        if !self.entries.contains_key(token) && self.entries.len() >= self.max_size {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, last_used)| **last_used)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                self.entries.remove(&oldest);
            }
        }
        self.entries.insert(token.to_string(), self.tick);
    }

    pub fn expiration(&self) -> Instant {
        self.expiration
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
