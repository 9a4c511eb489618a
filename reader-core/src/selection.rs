//! Token layer: the detected regions of the current page and which of them are selected.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::region::DetectedRegion;

/// Detected regions for one page plus the set of selected indices.
///
/// Every selected index refers to an entry of `regions`; replacing the
/// regions always clears the selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenLayer {
    regions: Vec<DetectedRegion>,
    selected: BTreeSet<usize>,
}

impl TokenLayer {
    /// Create a layer over a fresh region list with nothing selected.
    #[must_use]
    pub fn new(regions: Vec<DetectedRegion>) -> Self {
        Self {
            regions,
            selected: BTreeSet::new(),
        }
    }

    /// Replace the region list (new page or rerun detection) and clear the selection.
    pub fn replace_regions(&mut self, regions: Vec<DetectedRegion>) {
        self.regions = regions;
        self.selected.clear();
    }

    /// Select `index` if unselected, deselect it otherwise.
    ///
    /// Out-of-range indices are ignored. Returns whether the index is selected afterwards.
    pub fn toggle(&mut self, index: usize) -> bool {
        if index >= self.regions.len() {
            tracing::debug!(index, len = self.regions.len(), "Ignoring toggle out of range");
            return false;
        }
        if self.selected.remove(&index) {
            false
        } else {
            self.selected.insert(index);
            true
        }
    }

    /// Deselect everything.
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Whether `index` is selected.
    #[must_use]
    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    /// Selected regions in ascending index order.
    pub fn selected_regions(&self) -> impl Iterator<Item = &DetectedRegion> {
        self.selected.iter().filter_map(|&i| self.regions.get(i))
    }

    /// Selected indices in ascending order.
    pub fn selected_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.selected.iter().copied()
    }

    /// Number of selected regions.
    #[must_use]
    pub fn selection_len(&self) -> usize {
        self.selected.len()
    }

    /// Whether at least one region is selected.
    #[must_use]
    pub fn has_selection(&self) -> bool {
        !self.selected.is_empty()
    }

    /// All regions in detection order.
    #[must_use]
    pub fn regions(&self) -> &[DetectedRegion] {
        &self.regions
    }

    /// Number of regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether the layer holds no regions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
