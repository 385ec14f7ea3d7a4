use crate::materialize::SplitMarkers;
use crate::types::*;
use std::collections::HashSet;

/// Calculate statistics for a reorganization without building documents
pub fn calculate_statistics(
    source_pages: usize,
    sequence: &[PageIndex],
    markers: &SplitMarkers,
) -> ReorganizeStatistics {
    let output_documents = markers.segments(sequence).len();

    let mut seen = HashSet::new();
    let mut output_pages = 0;
    let mut skipped_indices = 0;
    let mut duplicated_pages = 0;

    for &idx in sequence {
        if idx >= source_pages {
            skipped_indices += 1;
            continue;
        }
        output_pages += 1;
        if !seen.insert(idx) {
            duplicated_pages += 1;
        }
    }

    ReorganizeStatistics {
        source_pages,
        output_pages,
        output_documents,
        skipped_indices,
        duplicated_pages,
    }
}
