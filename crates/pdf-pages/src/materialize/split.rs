//! Split markers between positions of an index sequence

use crate::types::PageIndex;
use std::collections::BTreeSet;

/// Positions in an index sequence after which a new output document begins.
///
/// Markers refer to positions in the sequence, not to page indices, so a
/// page that appears twice can be split after only one of its occurrences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SplitMarkers(BTreeSet<usize>);

impl SplitMarkers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split after every position except the last
    pub fn after_every_page(len: usize) -> Self {
        Self((0..len.saturating_sub(1)).collect())
    }

    pub fn insert(&mut self, position: usize) -> bool {
        self.0.insert(position)
    }

    /// Add the marker if absent, remove it otherwise. Returns whether it is now set.
    pub fn toggle(&mut self, position: usize) -> bool {
        if self.0.remove(&position) {
            false
        } else {
            self.0.insert(position);
            true
        }
    }

    /// Toggle "split all": clears the markers when every split of a
    /// `len`-long sequence is already set, sets all of them otherwise
    pub fn toggle_all(&mut self, len: usize) {
        let all = Self::after_every_page(len);
        if !all.0.is_empty() && all.0.is_subset(&self.0) {
            self.0.clear();
        } else {
            *self = all;
        }
    }

    pub fn contains(&self, position: usize) -> bool {
        self.0.contains(&position)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    /// Markers that actually split a sequence of `len` positions.
    /// Markers at or past the last position are no-ops.
    pub fn effective(&self, len: usize) -> impl Iterator<Item = usize> + '_ {
        self.0.range(..len.saturating_sub(1)).copied()
    }

    /// Partition `sequence` into contiguous segments at the markers.
    ///
    /// Always returns at least one segment; an empty sequence gives one
    /// empty segment.
    pub fn segments<'a>(&self, sequence: &'a [PageIndex]) -> Vec<&'a [PageIndex]> {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        let mut start = 0;
        for position in self.effective(sequence.len()) {
            segments.push(&sequence[start..=position]);
            start = position + 1;
        }
        segments.push(&sequence[start..]);
        segments
    }
}

impl FromIterator<usize> for SplitMarkers {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
