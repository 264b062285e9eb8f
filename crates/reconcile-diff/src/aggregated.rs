//! Flattened view over a sectioned diff.
//!
//! A consumer that issues batched insert/delete/move operations against a
//! two-level structure usually wants every section change and every item
//! change in one place, without walking the matched sections itself.

use crate::sectioned_diff::{
    ItemAdded, ItemPair, ItemRemoved, SectionAdded, SectionChanges, SectionPair, SectionRemoved,
};

/// Every section-level and item-level change of a [`SectionChanges`].
///
/// Item changes are collected from moved sections first, then from
/// unchanged sections.
#[derive(Debug)]
pub struct AggregatedChanges<'a, S, SI, It, II> {
    pub deleted_sections: Vec<&'a SectionRemoved<S, SI>>,
    pub inserted_sections: Vec<&'a SectionAdded<S, SI>>,
    pub moved_sections: Vec<&'a SectionPair<S, SI, It, II>>,

    pub deleted_items: Vec<&'a ItemRemoved<It, II>>,
    pub inserted_items: Vec<&'a ItemAdded<It, II>>,
    pub updated_items: Vec<&'a ItemPair<It, II>>,
    pub moved_items: Vec<&'a ItemPair<It, II>>,
}

impl<'a, S, SI, It, II> AggregatedChanges<'a, S, SI, It, II> {
    pub fn new(changes: &'a SectionChanges<S, SI, It, II>) -> Self {
        let matched = || changes.moved.iter().chain(&changes.no_change);

        Self {
            deleted_sections: changes.removed.iter().collect(),
            inserted_sections: changes.added.iter().collect(),
            moved_sections: changes.moved.iter().collect(),

            deleted_items: matched().flat_map(|s| &s.item_changes.removed).collect(),
            inserted_items: matched().flat_map(|s| &s.item_changes.added).collect(),
            updated_items: matched().flat_map(|s| &s.item_changes.updated).collect(),
            moved_items: matched().flat_map(|s| &s.item_changes.moved).collect(),
        }
    }

    /// Whether applying these changes shifts any section or item position.
    pub fn has_index_affecting_changes(&self) -> bool {
        !self.deleted_sections.is_empty()
            || !self.inserted_sections.is_empty()
            || !self.moved_sections.is_empty()
            || !self.deleted_items.is_empty()
            || !self.inserted_items.is_empty()
            || !self.moved_items.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_index_affecting_changes() && self.updated_items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use reconcile_types::IndexPath;

    use crate::sectioned_diff::{ItemProviders, SectionProviders, SectionedConfig, SectionedDiff};

    type Section = (&'static str, Vec<(&'static str, u32)>);

    fn config() -> SectionedConfig<Section, &'static str, (&'static str, u32), &'static str> {
        SectionedConfig::new(
            SectionProviders::new(|s: &Section| s.0, |s: &Section| s.1.as_slice()),
            ItemProviders::new(
                |i: &(&'static str, u32)| i.0,
                |a: &(&'static str, u32), b: &(&'static str, u32)| a.1 != b.1,
            ),
        )
    }

    #[test]
    fn flattens_item_changes_across_sections() {
        let old = vec![
            ("s1", vec![("a", 1), ("b", 1)]),
            ("s2", vec![("c", 1)]),
            ("s3", vec![]),
        ];
        let new = vec![
            ("s2", vec![("c", 2), ("d", 1)]),
            ("s1", vec![("b", 1)]),
            ("s4", vec![]),
        ];

        let diff = SectionedDiff::new(old, new, &config());
        let agg = diff.aggregated();

        assert_eq!(agg.deleted_sections.len(), 1);
        assert_eq!(agg.deleted_sections[0].identifier, "s3");
        assert_eq!(agg.inserted_sections.len(), 1);
        assert_eq!(agg.inserted_sections[0].identifier, "s4");
        assert_eq!(agg.moved_sections.len(), 1);

        assert_eq!(agg.deleted_items.len(), 1);
        assert_eq!(agg.deleted_items[0].identifier, "a");
        assert_eq!(agg.inserted_items.len(), 1);
        assert_eq!(agg.inserted_items[0].new_index, IndexPath::new(0, 1));
        assert_eq!(agg.updated_items.len(), 1);
        assert_eq!(agg.updated_items[0].identifier, "c");
        assert!(agg.moved_items.is_empty());

        assert!(agg.has_index_affecting_changes());
        assert!(!agg.is_empty());
    }

    #[test]
    fn update_only_diff_is_not_index_affecting() {
        let old = vec![("s1", vec![("a", 1)])];
        let new = vec![("s1", vec![("a", 2)])];

        let diff = SectionedDiff::new(old, new, &config());
        let agg = diff.aggregated();

        assert!(!agg.has_index_affecting_changes());
        assert!(!agg.is_empty());
        assert_eq!(agg.updated_items.len(), 1);
    }

    #[test]
    fn identical_snapshots_aggregate_to_nothing() {
        let sections = vec![("s1", vec![("a", 1)]), ("s2", vec![("b", 1)])];
        let diff = SectionedDiff::new(sections.clone(), sections, &config());
        assert!(diff.aggregated().is_empty());
    }
}
