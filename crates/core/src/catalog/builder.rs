//! Format Catalog Builder.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::extractor::FormatDescriptor;
use crate::progress::human_size;

use super::types::{CatalogEntry, FormatCatalog, AUDIO_ENTRY_ID, AUDIO_ENTRY_LABEL};

/// Maximum number of real (non-synthetic) entries in a catalog.
pub const MAX_REAL_ENTRIES: usize = 12;

/// Builds the presentable catalog from raw probe descriptors.
///
/// Duplicated identifiers keep the descriptor with the greater height
/// (sources sometimes repeat an id with inconsistent metadata; higher
/// resolution is taken as more representative), first one wins on ties.
/// The deduplicated set is stably sorted descending by (height, bitrate),
/// truncated to [`MAX_REAL_ENTRIES`], and the synthetic best-audio entry is
/// appended unconditionally, so even an empty input still yields a catalog
/// the user can choose from.
pub fn build_catalog(formats: &[FormatDescriptor]) -> FormatCatalog {
    let mut unique: Vec<FormatDescriptor> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for format in formats {
        match index.get(format.id.as_str()) {
            Some(&at) => {
                if format.height.unwrap_or(0) > unique[at].height.unwrap_or(0) {
                    unique[at] = format.clone();
                }
            }
            None => {
                index.insert(format.id.as_str(), unique.len());
                unique.push(format.clone());
            }
        }
    }

    // Stable sort keeps original probe order for full ties, so identical
    // inputs always produce identical catalogs.
    unique.sort_by(|a, b| {
        b.height
            .unwrap_or(0)
            .cmp(&a.height.unwrap_or(0))
            .then_with(|| {
                b.bitrate_kbps
                    .unwrap_or(0.0)
                    .partial_cmp(&a.bitrate_kbps.unwrap_or(0.0))
                    .unwrap_or(Ordering::Equal)
            })
    });
    unique.truncate(MAX_REAL_ENTRIES);

    let mut entries: Vec<CatalogEntry> = unique
        .iter()
        .map(|f| CatalogEntry {
            id: f.id.clone(),
            label: label_for(f),
        })
        .collect();

    entries.push(CatalogEntry {
        id: AUDIO_ENTRY_ID.to_string(),
        label: AUDIO_ENTRY_LABEL.to_string(),
    });

    FormatCatalog::new(entries)
}

/// Builds the label for one entry: resolution, frame rate and container when
/// present, then size, falling back to bitrate, falling back to the raw
/// identifier. Never empty.
fn label_for(format: &FormatDescriptor) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(height) = format.height {
        parts.push(format!("{}p", height));
    }
    if let Some(fps) = format.fps {
        parts.push(format!("{:.0}fps", fps));
    }
    if let Some(ext) = &format.ext {
        parts.push(format!(".{}", ext));
    }
    if let Some(size) = format.size_bytes {
        parts.push(human_size(size));
    } else if let Some(kbps) = format.bitrate_kbps {
        parts.push(format!("{}kbps", kbps as u64));
    }
    if parts.is_empty() {
        format.id.clone()
    } else {
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_yields_audio_only() {
        let catalog = build_catalog(&[]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.entries()[0].id, AUDIO_ENTRY_ID);
    }

    #[test]
    fn test_sorted_descending_by_height() {
        let formats = vec![
            FormatDescriptor::new("a").with_height(144),
            FormatDescriptor::new("b").with_height(720),
            FormatDescriptor::new("c").with_height(360),
        ];
        let catalog = build_catalog(&formats);
        let ids: Vec<&str> = catalog.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a", AUDIO_ENTRY_ID]);
    }

    #[test]
    fn test_bitrate_breaks_height_ties() {
        let formats = vec![
            FormatDescriptor::new("low").with_height(720).with_bitrate(800.0),
            FormatDescriptor::new("high").with_height(720).with_bitrate(2500.0),
        ];
        let catalog = build_catalog(&formats);
        assert_eq!(catalog.entries()[0].id, "high");
        assert_eq!(catalog.entries()[1].id, "low");
    }

    #[test]
    fn test_full_ties_keep_input_order() {
        let formats = vec![
            FormatDescriptor::new("first").with_height(480),
            FormatDescriptor::new("second").with_height(480),
        ];
        let catalog = build_catalog(&formats);
        assert_eq!(catalog.entries()[0].id, "first");
    }

    #[test]
    fn test_duplicate_ids_keep_greater_height() {
        let formats = vec![
            FormatDescriptor::new("22").with_height(480),
            FormatDescriptor::new("22").with_height(720),
            FormatDescriptor::new("22").with_height(360),
        ];
        let catalog = build_catalog(&formats);
        // One real entry plus the audio entry.
        assert_eq!(catalog.len(), 2);
        assert!(catalog.entries()[0].label.starts_with("720p"));
    }

    #[test]
    fn test_duplicate_equal_height_keeps_first() {
        let formats = vec![
            FormatDescriptor::new("22").with_height(720).with_ext("mp4"),
            FormatDescriptor::new("22").with_height(720).with_ext("webm"),
        ];
        let catalog = build_catalog(&formats);
        assert!(catalog.entries()[0].label.contains(".mp4"));
    }

    #[test]
    fn test_truncated_to_max_plus_audio() {
        let formats: Vec<FormatDescriptor> = (0..40)
            .map(|i| FormatDescriptor::new(format!("f{}", i)).with_height(100 + i))
            .collect();
        let catalog = build_catalog(&formats);
        assert_eq!(catalog.len(), MAX_REAL_ENTRIES + 1);
        let audio_entries = catalog
            .entries()
            .iter()
            .filter(|e| e.id == AUDIO_ENTRY_ID)
            .count();
        assert_eq!(audio_entries, 1);
    }

    #[test]
    fn test_label_full() {
        let format = FormatDescriptor::new("22")
            .with_height(720)
            .with_fps(30.0)
            .with_ext("mp4")
            .with_size(12 * 1024 * 1024);
        assert_eq!(label_for(&format), "720p 30fps .mp4 12.0MB");
    }

    #[test]
    fn test_label_falls_back_to_bitrate() {
        let format = FormatDescriptor::new("140").with_bitrate(129.7);
        assert_eq!(label_for(&format), "129kbps");
    }

    #[test]
    fn test_label_falls_back_to_id() {
        let format = FormatDescriptor::new("raw-id");
        assert_eq!(label_for(&format), "raw-id");
    }

    #[test]
    fn test_entries_without_metadata_never_crash() {
        let formats = vec![
            FormatDescriptor::new("bare"),
            FormatDescriptor::new("sized").with_size(1024),
        ];
        let catalog = build_catalog(&formats);
        assert_eq!(catalog.len(), 3);
        assert!(catalog.entries().iter().all(|e| !e.label.is_empty()));
    }
}
