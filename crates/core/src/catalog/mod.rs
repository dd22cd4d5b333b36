//! Format catalog: the bounded, ranked, user-facing list of selectable
//! formats for one source URL.
//!
//! [`build_catalog`] turns the unordered probe output into at most twelve
//! deduplicated, resolution-ranked entries plus exactly one synthetic
//! best-audio entry. [`CatalogCache`] holds built catalogs behind short-lived
//! tokens so a later format selection resolves back to its source URL through
//! explicit state instead of a shared "last seen URL" field, which would
//! break under concurrent users.

mod builder;
mod cache;
mod types;

pub use builder::{build_catalog, MAX_REAL_ENTRIES};
pub use cache::{CachedCatalog, CatalogCache, DEFAULT_CATALOG_TTL};
pub use types::{CatalogEntry, FormatCatalog, AUDIO_ENTRY_ID, AUDIO_ENTRY_LABEL};
