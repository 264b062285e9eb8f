//! Two-level diff: sections of items.
//!
//! Sections are diffed first. Every section present in both snapshots (moved
//! or unchanged) then gets an item-level diff whose index paths are
//! expressed relative to that section's old and new positions.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use reconcile_types::{IndexPath, MoveDetection};
use tracing::debug;

use crate::aggregated::AggregatedChanges;
use crate::array_diff::{ArrayDiff, Matched};

type IdentifierFn<T, I> = Arc<dyn Fn(&T) -> I + Send + Sync>;
type PredicateFn<T> = Arc<dyn Fn(&T, &T) -> bool + Send + Sync>;
type ItemsFn<S, It> = Arc<dyn Fn(&S) -> &[It] + Send + Sync>;

/// Section-level callbacks: identity, item access and move hint.
///
/// Sections never report updates; a section's content changes are expressed
/// by its item-level diff.
pub struct SectionProviders<S, SI, It> {
    identifier: IdentifierFn<S, SI>,
    items: ItemsFn<S, It>,
    moved_hint: Option<PredicateFn<S>>,
}

impl<S, SI, It> SectionProviders<S, SI, It> {
    /// Providers with no move hint.
    pub fn new(
        identifier: impl Fn(&S) -> SI + Send + Sync + 'static,
        items: impl Fn(&S) -> &[It] + Send + Sync + 'static,
    ) -> Self {
        Self {
            identifier: Arc::new(identifier),
            items: Arc::new(items),
            moved_hint: None,
        }
    }

    /// Replace the move hint.
    pub fn with_moved_hint(
        mut self,
        hint: impl Fn(&S, &S) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.moved_hint = Some(Arc::new(hint));
        self
    }

    pub fn identifier(&self, section: &S) -> SI {
        (self.identifier)(section)
    }

    pub fn items<'s>(&self, section: &'s S) -> &'s [It] {
        (self.items)(section)
    }

    pub fn moved_hint(&self, old: &S, new: &S) -> bool {
        self.moved_hint.as_ref().is_some_and(|hint| hint(old, new))
    }
}

impl<S, SI, It> Clone for SectionProviders<S, SI, It> {
    fn clone(&self) -> Self {
        Self {
            identifier: Arc::clone(&self.identifier),
            items: Arc::clone(&self.items),
            moved_hint: self.moved_hint.clone(),
        }
    }
}

impl<S, SI, It> fmt::Debug for SectionProviders<S, SI, It> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SectionProviders").finish_non_exhaustive()
    }
}

/// Item-level callbacks: identity, update check and move hint.
pub struct ItemProviders<It, II> {
    identifier: IdentifierFn<It, II>,
    updated: PredicateFn<It>,
    moved_hint: Option<PredicateFn<It>>,
}

impl<It, II> ItemProviders<It, II> {
    /// Providers with no move hint.
    pub fn new(
        identifier: impl Fn(&It) -> II + Send + Sync + 'static,
        updated: impl Fn(&It, &It) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            identifier: Arc::new(identifier),
            updated: Arc::new(updated),
            moved_hint: None,
        }
    }

    /// Replace the move hint.
    pub fn with_moved_hint(
        mut self,
        hint: impl Fn(&It, &It) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.moved_hint = Some(Arc::new(hint));
        self
    }

    pub fn identifier(&self, item: &It) -> II {
        (self.identifier)(item)
    }

    pub fn updated(&self, old: &It, new: &It) -> bool {
        (self.updated)(old, new)
    }

    pub fn moved_hint(&self, old: &It, new: &It) -> bool {
        self.moved_hint.as_ref().is_some_and(|hint| hint(old, new))
    }
}

impl<It, II> Clone for ItemProviders<It, II> {
    fn clone(&self) -> Self {
        Self {
            identifier: Arc::clone(&self.identifier),
            updated: Arc::clone(&self.updated),
            moved_hint: self.moved_hint.clone(),
        }
    }
}

impl<It, II> fmt::Debug for ItemProviders<It, II> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemProviders").finish_non_exhaustive()
    }
}

/// Everything a sectioned diff needs besides the two snapshots.
#[derive(Debug)]
pub struct SectionedConfig<S, SI, It, II> {
    /// Applies to both the section and the item level.
    pub move_detection: MoveDetection,
    pub section: SectionProviders<S, SI, It>,
    pub item: ItemProviders<It, II>,
}

impl<S, SI, It, II> SectionedConfig<S, SI, It, II> {
    /// A configuration using [`MoveDetection::CheckAll`].
    pub fn new(section: SectionProviders<S, SI, It>, item: ItemProviders<It, II>) -> Self {
        Self {
            move_detection: MoveDetection::default(),
            section,
            item,
        }
    }

    pub fn with_move_detection(mut self, move_detection: MoveDetection) -> Self {
        self.move_detection = move_detection;
        self
    }
}

impl<S, SI, It, II> Clone for SectionedConfig<S, SI, It, II> {
    fn clone(&self) -> Self {
        Self {
            move_detection: self.move_detection,
            section: self.section.clone(),
            item: self.item.clone(),
        }
    }
}

/// A section present only in the new snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct SectionAdded<S, SI> {
    pub identifier: SI,
    pub new_index: usize,
    pub new_value: S,
}

/// A section present only in the old snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct SectionRemoved<S, SI> {
    pub identifier: SI,
    pub old_index: usize,
    pub old_value: S,
}

/// A section present in both snapshots, with the diff of its items.
#[derive(Clone, Debug, PartialEq)]
pub struct SectionPair<S, SI, It, II> {
    pub identifier: SI,
    pub old_index: usize,
    pub new_index: usize,
    pub old_value: S,
    pub new_value: S,
    pub item_changes: ItemChanges<It, II>,
}

/// An item present only in the new snapshot of its section.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemAdded<It, II> {
    pub identifier: II,
    pub new_index: IndexPath,
    pub new_value: It,
}

/// An item present only in the old snapshot of its section.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemRemoved<It, II> {
    pub identifier: II,
    pub old_index: IndexPath,
    pub old_value: It,
}

/// An item present in both snapshots of its section.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemPair<It, II> {
    pub identifier: II,
    pub old_index: IndexPath,
    pub new_index: IndexPath,
    pub old_value: It,
    pub new_value: It,
}

/// Item-level diff of one matched section pair.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemChanges<It, II> {
    pub added: Vec<ItemAdded<It, II>>,
    pub removed: Vec<ItemRemoved<It, II>>,
    pub moved: Vec<ItemPair<It, II>>,
    pub updated: Vec<ItemPair<It, II>>,
    pub no_change: Vec<ItemPair<It, II>>,
    pub change_count: usize,
    old_count: usize,
}

impl<It: Clone, II: Hash + Eq + Clone> ItemChanges<It, II> {
    /// Diff the items of one section pair.
    ///
    /// `old_section` and `new_section` become the `section` component of the
    /// resulting old and new index paths.
    pub fn new(
        old: &[It],
        old_section: usize,
        new: &[It],
        new_section: usize,
        move_detection: MoveDetection,
        providers: &ItemProviders<It, II>,
    ) -> Self {
        let diff = ArrayDiff::new(
            old,
            new,
            move_detection,
            |item| providers.identifier(item),
            |a, b| providers.moved_hint(a, b),
            |a, b| providers.updated(a, b),
        );

        let pair = |m: Matched<It, II>| ItemPair {
            identifier: m.identifier,
            old_index: IndexPath::new(old_section, m.old_index),
            new_index: IndexPath::new(new_section, m.new_index),
            old_value: m.old,
            new_value: m.new,
        };

        let old_count = diff.old_count();

        Self {
            added: diff
                .added
                .into_iter()
                .map(|a| ItemAdded {
                    identifier: a.identifier,
                    new_index: IndexPath::new(new_section, a.new_index),
                    new_value: a.new,
                })
                .collect(),
            removed: diff
                .removed
                .into_iter()
                .map(|r| ItemRemoved {
                    identifier: r.identifier,
                    old_index: IndexPath::new(old_section, r.old_index),
                    old_value: r.old,
                })
                .collect(),
            moved: diff.moved.into_iter().map(pair).collect(),
            updated: diff.updated.into_iter().map(pair).collect(),
            no_change: diff.no_change.into_iter().map(pair).collect(),
            change_count: diff.change_count,
            old_count,
        }
    }
}

impl<It, II> ItemChanges<It, II> {
    /// Number of items in the section's old snapshot.
    pub fn old_count(&self) -> usize {
        self.old_count
    }

    pub fn is_empty(&self) -> bool {
        self.change_count == 0
    }
}

/// Section-level diff, with nested item diffs for matched sections.
#[derive(Clone, Debug)]
pub struct SectionChanges<S, SI, It, II> {
    pub added: Vec<SectionAdded<S, SI>>,
    pub removed: Vec<SectionRemoved<S, SI>>,
    pub moved: Vec<SectionPair<S, SI, It, II>>,
    pub no_change: Vec<SectionPair<S, SI, It, II>>,
    /// Item identities present somewhere in the new snapshot but nowhere in the old.
    pub added_item_identifiers: HashSet<II>,
    /// Item identities present somewhere in the old snapshot but nowhere in the new.
    pub removed_item_identifiers: HashSet<II>,
    pub sections_change_count: usize,
    pub items_change_count: usize,
}

impl<S, SI, It, II> SectionChanges<S, SI, It, II>
where
    S: Clone,
    SI: Hash + Eq + Clone,
    It: Clone,
    II: Hash + Eq + Clone,
{
    /// Diff `old` sections against `new` sections.
    ///
    /// # Panics
    ///
    /// Panics if the section-level diff reports an update. Sections can only
    /// be added, removed, moved or left in place.
    pub fn new(old: &[S], new: &[S], config: &SectionedConfig<S, SI, It, II>) -> Self {
        let diff = ArrayDiff::new(
            old,
            new,
            config.move_detection,
            |section| config.section.identifier(section),
            |a, b| config.section.moved_hint(a, b),
            |_, _| false,
        );

        assert!(
            diff.updated.is_empty(),
            "sections must not report updates; sections can only move"
        );

        let pair = |m: Matched<S, SI>| {
            let item_changes = ItemChanges::new(
                config.section.items(&m.old),
                m.old_index,
                config.section.items(&m.new),
                m.new_index,
                config.move_detection,
                &config.item,
            );

            SectionPair {
                identifier: m.identifier,
                old_index: m.old_index,
                new_index: m.new_index,
                old_value: m.old,
                new_value: m.new,
                item_changes,
            }
        };

        let added: Vec<SectionAdded<S, SI>> = diff
            .added
            .into_iter()
            .map(|a| SectionAdded {
                identifier: a.identifier,
                new_index: a.new_index,
                new_value: a.new,
            })
            .collect();

        let removed: Vec<SectionRemoved<S, SI>> = diff
            .removed
            .into_iter()
            .map(|r| SectionRemoved {
                identifier: r.identifier,
                old_index: r.old_index,
                old_value: r.old,
            })
            .collect();

        let moved: Vec<SectionPair<S, SI, It, II>> = diff.moved.into_iter().map(pair).collect();
        let no_change: Vec<SectionPair<S, SI, It, II>> =
            diff.no_change.into_iter().map(pair).collect();

        let sections_change_count = added.len() + removed.len() + moved.len();
        let items_change_count = moved
            .iter()
            .chain(&no_change)
            .map(|p| p.item_changes.change_count)
            .sum();

        let (added_item_identifiers, removed_item_identifiers) =
            if sections_change_count > 0 || items_change_count > 0 {
                let old_ids = Self::item_identifiers(old, config);
                let new_ids = Self::item_identifiers(new, config);
                (
                    new_ids.difference(&old_ids).cloned().collect(),
                    old_ids.difference(&new_ids).cloned().collect(),
                )
            } else {
                (HashSet::new(), HashSet::new())
            };

        Self {
            added,
            removed,
            moved,
            no_change,
            added_item_identifiers,
            removed_item_identifiers,
            sections_change_count,
            items_change_count,
        }
    }

    fn item_identifiers(sections: &[S], config: &SectionedConfig<S, SI, It, II>) -> HashSet<II> {
        sections
            .iter()
            .flat_map(|section| config.section.items(section))
            .map(|item| config.item.identifier(item))
            .collect()
    }
}

impl<S, SI, It, II> SectionChanges<S, SI, It, II> {
    pub fn total_change_count(&self) -> usize {
        self.sections_change_count + self.items_change_count
    }

    pub fn is_empty(&self) -> bool {
        self.total_change_count() == 0
    }
}

/// A complete two-level diff between an old and a new sectioned snapshot.
#[derive(Clone, Debug)]
pub struct SectionedDiff<S, SI, It, II> {
    pub old: Vec<S>,
    pub new: Vec<S>,
    pub changes: SectionChanges<S, SI, It, II>,
    old_item_counts: Vec<usize>,
}

impl<S, SI, It, II> SectionedDiff<S, SI, It, II>
where
    S: Clone,
    SI: Hash + Eq + Clone,
    It: Clone,
    II: Hash + Eq + Clone,
{
    /// Diff two sectioned snapshots.
    pub fn new(old: Vec<S>, new: Vec<S>, config: &SectionedConfig<S, SI, It, II>) -> Self {
        let changes = SectionChanges::new(&old, &new, config);
        let old_item_counts = old.iter().map(|s| config.section.items(s).len()).collect();

        debug!(
            old_sections = old.len(),
            new_sections = new.len(),
            sections_changed = changes.sections_change_count,
            items_changed = changes.items_change_count,
            "sectioned diff computed"
        );

        Self {
            old,
            new,
            changes,
            old_item_counts,
        }
    }
}

impl<S, SI, It, II> SectionedDiff<S, SI, It, II> {
    /// All section and item changes, flattened across sections.
    pub fn aggregated(&self) -> AggregatedChanges<'_, S, SI, It, II> {
        AggregatedChanges::new(&self.changes)
    }

    /// Item counts of the old snapshot's sections, in section order.
    pub fn old_item_counts(&self) -> &[usize] {
        &self.old_item_counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Item {
        id: &'static str,
        text: &'static str,
    }

    #[derive(Clone, Debug, PartialEq)]
    struct Section {
        id: &'static str,
        items: Vec<Item>,
    }

    fn item(id: &'static str) -> Item {
        Item { id, text: "" }
    }

    fn section(id: &'static str, items: &[&'static str]) -> Section {
        Section {
            id,
            items: items.iter().copied().map(item).collect(),
        }
    }

    type Config = SectionedConfig<Section, &'static str, Item, &'static str>;

    fn config() -> Config {
        SectionedConfig::new(
            SectionProviders::new(|s: &Section| s.id, |s: &Section| s.items.as_slice()),
            ItemProviders::new(|i: &Item| i.id, |a: &Item, b: &Item| a.text != b.text),
        )
    }

    fn diff(
        old: Vec<Section>,
        new: Vec<Section>,
    ) -> SectionedDiff<Section, &'static str, Item, &'static str> {
        SectionedDiff::new(old, new, &config())
    }

    #[test]
    fn identical_snapshots_are_empty() {
        let sections = vec![section("s1", &["a", "b"]), section("s2", &["c"])];
        let d = diff(sections.clone(), sections);

        assert!(d.changes.is_empty());
        assert_eq!(d.changes.no_change.len(), 2);
        assert!(d.changes.added_item_identifiers.is_empty());
        assert!(d.changes.removed_item_identifiers.is_empty());
        assert_eq!(d.old_item_counts(), &[2, 1]);
    }

    #[test]
    fn section_added_and_removed() {
        let d = diff(
            vec![section("s1", &["a"]), section("gone", &["x"])],
            vec![section("s1", &["a"]), section("fresh", &["y"])],
        );

        assert_eq!(d.changes.added.len(), 1);
        assert_eq!(d.changes.added[0].identifier, "fresh");
        assert_eq!(d.changes.removed.len(), 1);
        assert_eq!(d.changes.removed[0].identifier, "gone");
        assert_eq!(d.changes.sections_change_count, 2);
        assert_eq!(d.changes.items_change_count, 0);
        assert!(d.changes.added_item_identifiers.contains("y"));
        assert!(d.changes.removed_item_identifiers.contains("x"));
    }

    #[test]
    fn item_paths_use_section_positions() {
        let d = diff(
            vec![section("s1", &["a"]), section("s2", &["b", "c"])],
            vec![section("s2", &["c", "b", "d"]), section("s1", &["a"])],
        );

        assert_eq!(d.changes.moved.len(), 1);
        let moved = &d.changes.moved[0];
        assert_eq!((moved.old_index, moved.new_index), (1, 0));
        assert_eq!(moved.identifier, "s2");

        let items = &moved.item_changes;
        assert_eq!(items.added.len(), 1);
        assert_eq!(items.added[0].new_index, IndexPath::new(0, 2));
        assert_eq!(items.moved.len(), 1);
        let m = &items.moved[0];
        assert_eq!(m.old_index.section, 1);
        assert_eq!(m.new_index.section, 0);
        assert_eq!(items.no_change.len(), 1);
        assert_eq!(items.old_count(), 2);

        assert_eq!(d.changes.no_change.len(), 1);
        assert_eq!(d.changes.no_change[0].identifier, "s1");
        assert!(d.changes.no_change[0].item_changes.is_empty());
    }

    #[test]
    fn item_updates_are_counted() {
        let old = vec![section("s1", &["a", "b"])];
        let mut new = old.clone();
        new[0].items[1].text = "edited";

        let d = diff(old, new);
        assert_eq!(d.changes.sections_change_count, 0);
        assert_eq!(d.changes.items_change_count, 1);
        assert_eq!(d.changes.total_change_count(), 1);

        let items = &d.changes.no_change[0].item_changes;
        assert_eq!(items.updated.len(), 1);
        assert_eq!(items.updated[0].new_index, IndexPath::new(0, 1));
        assert_eq!(items.updated[0].new_value.text, "edited");
    }

    #[test]
    fn item_moving_between_sections_is_remove_and_add() {
        let d = diff(
            vec![section("s1", &["a", "b"]), section("s2", &[])],
            vec![section("s1", &["a"]), section("s2", &["b"])],
        );

        let s1 = &d.changes.no_change[0].item_changes;
        let s2 = &d.changes.no_change[1].item_changes;
        assert_eq!(s1.removed.len(), 1);
        assert_eq!(s2.added.len(), 1);
        // Present in both snapshots overall, so not a snapshot-wide addition.
        assert!(d.changes.added_item_identifiers.is_empty());
        assert!(d.changes.removed_item_identifiers.is_empty());
    }

    #[test]
    fn only_hinted_applies_to_both_levels() {
        let config = config().with_move_detection(MoveDetection::OnlyHinted);
        let d = SectionedDiff::new(
            vec![section("s1", &["a", "b"]), section("s2", &[])],
            vec![section("s2", &[]), section("s1", &["b", "a"])],
            &config,
        );

        assert!(d.changes.moved.is_empty());
        assert_eq!(d.changes.no_change.len(), 2);
        let s1 = d
            .changes
            .no_change
            .iter()
            .find(|p| p.identifier == "s1")
            .unwrap();
        assert!(s1.item_changes.moved.is_empty());
        assert_eq!(s1.old_index, 0);
        assert_eq!(s1.new_index, 1);
    }

    #[test]
    fn section_move_hint_is_respected() {
        let config = Config::new(
            SectionProviders::new(|s: &Section| s.id, |s: &Section| s.items.as_slice())
                .with_moved_hint(|old: &Section, _: &Section| old.id == "s1"),
            ItemProviders::new(|i: &Item| i.id, |_: &Item, _: &Item| false),
        );

        let d = SectionedDiff::new(
            vec![section("s1", &[]), section("s2", &[])],
            vec![section("s2", &[]), section("s1", &[])],
            &config,
        );

        assert_eq!(d.changes.moved.len(), 1);
        assert_eq!(d.changes.moved[0].identifier, "s1");
    }

    #[test]
    fn providers_are_cloneable_and_shared() {
        let c = config();
        let cloned = c.clone();
        let s = section("s9", &["q"]);
        assert_eq!(cloned.section.identifier(&s), "s9");
        assert_eq!(cloned.section.items(&s).len(), 1);
        assert!(!cloned.item.moved_hint(&s.items[0], &s.items[0]));
    }
}
