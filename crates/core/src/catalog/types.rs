//! Types for the catalog module.

use serde::{Deserialize, Serialize};

use crate::extractor::FormatSelection;

/// Reserved identifier for the synthetic best-audio entry.
///
/// Real extractor format ids never contain a colon, so this can never
/// collide with one.
pub const AUDIO_ENTRY_ID: &str = "audio:mp3";

/// Button label for the synthetic best-audio entry.
pub const AUDIO_ENTRY_LABEL: &str = "Audio (MP3)";

/// One selectable entry in a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Format identifier, or [`AUDIO_ENTRY_ID`] for the synthetic entry.
    pub id: String,
    /// Human-readable label; never empty.
    pub label: String,
}

/// The bounded, ranked list of selectable formats for one source.
///
/// Built once per probe and read-only afterwards. Always contains the
/// synthetic audio entry, so it is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatCatalog {
    entries: Vec<CatalogEntry>,
}

impl FormatCatalog {
    pub(crate) fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// The entries in presentation order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Number of entries, synthetic audio entry included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// A catalog always carries at least the synthetic audio entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up an entry by identifier.
    pub fn find(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Resolves an entry identifier to the selection the extractor runs.
    ///
    /// Returns `None` for identifiers not present in this catalog, so stale
    /// or forged callback data cannot trigger arbitrary downloads.
    pub fn selection_for(&self, id: &str) -> Option<FormatSelection> {
        let entry = self.find(id)?;
        if entry.id == AUDIO_ENTRY_ID {
            Some(FormatSelection::AudioTranscode)
        } else {
            Some(FormatSelection::Format(entry.id.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> FormatCatalog {
        FormatCatalog::new(vec![
            CatalogEntry {
                id: "22".to_string(),
                label: "720p".to_string(),
            },
            CatalogEntry {
                id: AUDIO_ENTRY_ID.to_string(),
                label: AUDIO_ENTRY_LABEL.to_string(),
            },
        ])
    }

    #[test]
    fn test_selection_for_real_format() {
        assert_eq!(
            catalog().selection_for("22"),
            Some(FormatSelection::Format("22".to_string()))
        );
    }

    #[test]
    fn test_selection_for_audio_entry() {
        assert_eq!(
            catalog().selection_for(AUDIO_ENTRY_ID),
            Some(FormatSelection::AudioTranscode)
        );
    }

    #[test]
    fn test_selection_for_unknown_id() {
        assert_eq!(catalog().selection_for("999"), None);
    }
}
