//! Short-lived catalog cache.
//!
//! The control channel can only carry a small opaque payload on a format
//! selection, so the source URL and its built catalog are parked here behind
//! a random token. The token travels in the selection payload itself; there
//! is no shared "current URL" state, so concurrent users can never resolve
//! each other's requests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use uuid::Uuid;

use super::types::FormatCatalog;

/// Default lifetime of a cached catalog.
pub const DEFAULT_CATALOG_TTL: Duration = Duration::from_secs(30 * 60);

/// A cached catalog together with the URL it was built for.
#[derive(Debug, Clone)]
pub struct CachedCatalog {
    /// The source URL the catalog belongs to.
    pub source_url: String,
    /// The built catalog.
    pub catalog: FormatCatalog,
}

struct CacheSlot {
    cached: CachedCatalog,
    inserted_at: Instant,
}

/// Token-addressed store of recently built catalogs.
///
/// Entries stay resolvable until their TTL elapses, so a user can pick more
/// than one format from the same keyboard. Expired entries are pruned on
/// every insert.
pub struct CatalogCache {
    ttl: Duration,
    slots: Mutex<HashMap<String, CacheSlot>>,
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::new(DEFAULT_CATALOG_TTL)
    }
}

impl CatalogCache {
    /// Creates a cache with the given entry lifetime.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Stores a catalog and returns the token that resolves it.
    pub fn insert(&self, source_url: impl Into<String>, catalog: FormatCatalog) -> String {
        let token = Uuid::new_v4().to_string();
        let mut slots = self.slots.lock().expect("catalog cache lock poisoned");
        slots.retain(|_, slot| slot.inserted_at.elapsed() < self.ttl);
        slots.insert(
            token.clone(),
            CacheSlot {
                cached: CachedCatalog {
                    source_url: source_url.into(),
                    catalog,
                },
                inserted_at: Instant::now(),
            },
        );
        token
    }

    /// Resolves a token, or `None` when it is unknown or expired.
    pub fn resolve(&self, token: &str) -> Option<CachedCatalog> {
        let slots = self.slots.lock().expect("catalog cache lock poisoned");
        let slot = slots.get(token)?;
        if slot.inserted_at.elapsed() >= self.ttl {
            return None;
        }
        Some(slot.cached.clone())
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.slots.lock().expect("catalog cache lock poisoned").len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
