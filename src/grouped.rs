use alloc::vec::Vec;

use crate::types::{GroupedEntry, ItemRange};

/// Maps the flat super-index space of a grouped list onto (group, item)
/// pairs and back.
///
/// Super-index 0 is group 0's header, followed by its children, then group
/// 1's header, and so on. An empty group still occupies exactly one
/// super-index (its header).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GroupIndexMapper {
    counts: Vec<usize>,
    /// Super-index of each group's header: `g + Σ counts[..g]`.
    header_offsets: Vec<usize>,
    /// `item_prefix[g]` = number of child items strictly before group `g`.
    item_prefix: Vec<usize>,
    total_entries: usize,
    total_items: usize,
}

impl GroupIndexMapper {
    pub fn new(counts: &[usize]) -> Self {
        let mut header_offsets = Vec::with_capacity(counts.len());
        let mut item_prefix = Vec::with_capacity(counts.len() + 1);
        let mut items = 0usize;
        item_prefix.push(0);
        for (group, &count) in counts.iter().enumerate() {
            header_offsets.push(group + items);
            items += count;
            item_prefix.push(items);
        }
        Self {
            counts: counts.to_vec(),
            header_offsets,
            item_prefix,
            total_entries: counts.len() + items,
            total_items: items,
        }
    }

    pub fn group_count(&self) -> usize {
        self.counts.len()
    }

    /// Headers plus children; the render-total of the grouped list.
    pub fn total_entries(&self) -> usize {
        self.total_entries
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    /// Group owning `super_index` (its header or one of its children).
    pub fn group_of(&self, super_index: usize) -> usize {
        self.header_offsets
            .partition_point(|&h| h <= super_index)
            .saturating_sub(1)
    }

    /// Resolves a super-index to a header or a (group, transposed) item.
    pub fn entry_at(&self, super_index: usize) -> GroupedEntry {
        let super_index = super_index.min(self.total_entries.saturating_sub(1));
        let group = self.group_of(super_index);
        let header = self.header_offsets[group];
        if super_index == header {
            GroupedEntry::Group { group }
        } else {
            GroupedEntry::Item {
                group,
                index_in_group: super_index - header - 1,
            }
        }
    }

    /// Super-index of a group's header slot.
    pub fn super_index_of_group(&self, group: usize) -> usize {
        let group = group.min(self.counts.len().saturating_sub(1));
        self.header_offsets.get(group).copied().unwrap_or(0)
    }

    /// Super-index of a flat child index (header slots ignored), used to
    /// target scroll-to-index requests in the grouped variant.
    pub fn super_index_of_item(&self, item_index: usize) -> usize {
        if self.total_items == 0 {
            return 0;
        }
        let item_index = item_index.min(self.total_items - 1);
        // Skip groups fully before the item; empty groups collapse in the
        // prefix and are stepped over automatically.
        let group = self.item_prefix[1..].partition_point(|&p| p <= item_index);
        item_index + group + 1
    }

    /// Sorted groups whose header or any child falls inside `range`.
    pub fn groups_in_range(&self, range: ItemRange) -> Vec<usize> {
        if self.counts.is_empty() {
            return Vec::new();
        }
        let first = self.group_of(range.start);
        let last = self.group_of(range.end);
        (first..=last).collect()
    }
}
