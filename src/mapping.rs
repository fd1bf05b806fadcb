//! Gap-filling ID mapping.
//!
//! Gaps below the maximum ID are filled by relocating the highest IDs. The
//! pairing runs from the top: the largest gap receives the largest mover, the
//! next largest gap the next largest mover, and so on. This does not always
//! make the result contiguous: `{1, 2, 4, 6}` has gaps `{3, 5}`, moves
//! `6 -> 5` and `4 -> 3`, and ends up as `{1, 2, 3, 5}`.

use indexmap::IndexMap;

use crate::scan::IdSet;

/// Old ID to new ID for every ID of one entity type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GapMapping {
    /// Ascending by old ID.
    entries: IndexMap<u64, u64>,
    gap_count: u64,
}

impl GapMapping {
    /// Build the mapping for `ids`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sql_id_compact::{GapMapping, IdSet};
    ///
    /// let ids: IdSet = [1, 2, 4, 6].into_iter().collect();
    /// let mapping = GapMapping::build(&ids);
    /// assert_eq!(mapping.gap_count(), 2);
    /// assert_eq!(mapping.moves().collect::<Vec<_>>(), vec![(4, 3), (6, 5)]);
    /// ```
    #[must_use]
    pub fn build(ids: &IdSet) -> Self {
        let mut entries: IndexMap<u64, u64> = ids.iter().map(|&id| (id, id)).collect();
        let Some(&max_id) = ids.last() else {
            return Self::default();
        };

        // Zero is never a gap but can still be moved.
        let positive = u64::try_from(ids.range(1..).count()).unwrap_or(max_id);
        let gap_count = max_id - positive;

        let mover_count = usize::try_from(gap_count).map_or(ids.len(), |gaps| gaps.min(ids.len()));
        let movers = ids.iter().rev().take(mover_count);
        let gaps = (1..=max_id).rev().filter(|candidate| !ids.contains(candidate));
        for (gap, &mover) in gaps.zip(movers) {
            entries.insert(mover, gap);
        }

        Self { entries, gap_count }
    }

    /// New ID for `old`, if `old` was one of the mapped IDs.
    #[must_use]
    pub fn get(&self, old: u64) -> Option<u64> {
        self.entries.get(&old).copied()
    }

    /// Number of IDs in the mapping.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping covers no IDs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of gaps in `[1, max]` of the original IDs.
    #[must_use]
    pub fn gap_count(&self) -> u64 {
        self.gap_count
    }

    /// Every `(old, new)` pair, ascending by old ID.
    pub fn iter(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.entries.iter().map(|(&old, &new)| (old, new))
    }

    /// The `(old, new)` pairs that actually change, ascending by old ID.
    pub fn moves(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.iter().filter(|(old, new)| old != new)
    }

    /// IDs after applying the mapping.
    #[must_use]
    pub fn mapped_ids(&self) -> IdSet {
        self.entries.values().copied().collect()
    }
}

/// Integers in `[1, max]` missing from `ids`, ascending.
#[must_use]
pub fn find_gaps(ids: &IdSet) -> Vec<u64> {
    let Some(&max_id) = ids.last() else {
        return Vec::new();
    };
    (1..=max_id).filter(|candidate| !ids.contains(candidate)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[u64]) -> IdSet {
        values.iter().copied().collect()
    }

    fn pairs(mapping: &GapMapping) -> Vec<(u64, u64)> {
        mapping.iter().collect()
    }

    #[test]
    fn test_empty_set() {
        let mapping = GapMapping::build(&IdSet::new());
        assert!(mapping.is_empty());
        assert_eq!(mapping.gap_count(), 0);
    }

    #[test]
    fn test_contiguous_is_identity() {
        let mapping = GapMapping::build(&ids(&[1, 2, 3]));
        assert_eq!(pairs(&mapping), vec![(1, 1), (2, 2), (3, 3)]);
        assert_eq!(mapping.moves().count(), 0);
    }

    #[test]
    fn test_pairs_from_the_top() {
        let mapping = GapMapping::build(&ids(&[1, 2, 4, 6]));
        assert_eq!(pairs(&mapping), vec![(1, 1), (2, 2), (4, 3), (6, 5)]);
        assert_eq!(mapping.mapped_ids(), ids(&[1, 2, 3, 5]));
    }

    #[test]
    fn test_single_gap_becomes_contiguous() {
        let mapping = GapMapping::build(&ids(&[1, 3, 4]));
        assert_eq!(mapping.moves().collect::<Vec<_>>(), vec![(4, 2)]);
        assert_eq!(mapping.mapped_ids(), ids(&[1, 2, 3]));
    }

    #[test]
    fn test_kept_ids_between_movers() {
        let mapping = GapMapping::build(&ids(&[1, 2, 5, 6, 7]));
        assert_eq!(mapping.moves().collect::<Vec<_>>(), vec![(6, 3), (7, 4)]);
        assert_eq!(mapping.mapped_ids(), ids(&[1, 2, 3, 4, 5]));
    }

    #[test]
    fn test_more_gaps_than_ids() {
        // Every ID moves and the pairing stops at the shortest list.
        let mapping = GapMapping::build(&ids(&[1, 10]));
        assert_eq!(mapping.gap_count(), 8);
        assert_eq!(pairs(&mapping), vec![(1, 8), (10, 9)]);
    }

    #[test]
    fn test_zero_is_not_a_gap() {
        let mapping = GapMapping::build(&ids(&[0, 1, 3]));
        assert_eq!(mapping.gap_count(), 1);
        assert_eq!(mapping.moves().collect::<Vec<_>>(), vec![(3, 2)]);
    }

    #[test]
    fn test_sparse_large_ids() {
        let mapping = GapMapping::build(&ids(&[1, u64::MAX]));
        assert_eq!(mapping.gap_count(), u64::MAX - 2);
        assert_eq!(pairs(&mapping), vec![(1, u64::MAX - 2), (u64::MAX, u64::MAX - 1)]);
    }

    #[test]
    fn test_find_gaps() {
        assert_eq!(find_gaps(&ids(&[1, 2, 4, 6])), vec![3, 5]);
        assert!(find_gaps(&ids(&[1, 2])).is_empty());
        assert!(find_gaps(&IdSet::new()).is_empty());
    }
}
