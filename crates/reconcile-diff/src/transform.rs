//! Applying a diff to a structure kept parallel to the old snapshot.
//!
//! The parallel structure holds one consumer value per old element (view
//! state, cached layout, anything). Application happens in two phases:
//!
//! 1. Every removed or moved value is taken out, highest old index first,
//!    then every added or moved value is inserted, lowest new index first.
//!    Neither pass can shift an index that is still pending.
//! 2. With positions settled, updated and unchanged values are visited in
//!    place at their new indices.

use crate::array_diff::ArrayDiff;
use crate::error::{DiffError, DiffResult};
use crate::sectioned_diff::{ItemChanges, SectionChanges, SectionedDiff};

/// Callbacks for applying an [`ArrayDiff`] or [`ItemChanges`].
///
/// `T` is the diffed element type; [`Mapped`](Self::Mapped) is the type of
/// the consumer's parallel values.
pub trait Transformer<T> {
    type Mapped;

    /// Create the parallel value for a newly added element.
    fn added(&mut self, new: &T) -> Self::Mapped;

    /// Dispose of the parallel value of a removed element.
    fn removed(&mut self, _old: &T, _mapped: Self::Mapped) {}

    /// Adjust a parallel value that is being relocated.
    fn moved(&mut self, _old: &T, _new: &T, _mapped: &mut Self::Mapped) {}

    fn updated(&mut self, _old: &T, _new: &T, _mapped: &mut Self::Mapped) {}

    fn no_change(&mut self, _old: &T, _new: &T, _mapped: &mut Self::Mapped) {}
}

/// Callbacks for applying a [`SectionedDiff`] to a per-section structure.
///
/// Matched sections receive their [`ItemChanges`], which the implementation
/// typically applies to the section's own parallel items with
/// [`ItemChanges::transform`].
pub trait SectionTransformer<S, It, II> {
    type Mapped;

    /// Number of items the parallel value holds, checked against the old
    /// snapshot before anything is mutated.
    fn item_count(&self, mapped: &Self::Mapped) -> usize;

    fn added(&mut self, new: &S) -> Self::Mapped;

    fn removed(&mut self, _old: &S, _mapped: Self::Mapped) {}

    fn moved(
        &mut self,
        old: &S,
        new: &S,
        items: &ItemChanges<It, II>,
        mapped: &mut Self::Mapped,
    );

    fn no_change(
        &mut self,
        old: &S,
        new: &S,
        items: &ItemChanges<It, II>,
        mapped: &mut Self::Mapped,
    );
}

impl<T, I> ArrayDiff<T, I> {
    /// Apply this diff to `old`, a structure parallel to the old sequence.
    pub fn transform<X>(
        &self,
        old: Vec<X::Mapped>,
        transformer: &mut X,
    ) -> DiffResult<Vec<X::Mapped>>
    where
        X: Transformer<T>,
    {
        check_len(self.old_count(), old.len())?;

        let script = EditScript {
            removed: self.removed.iter().map(|r| r.old_index).collect(),
            added: self.added.iter().map(|a| a.new_index).collect(),
            moved: self.moved.iter().map(|m| (m.old_index, m.new_index)).collect(),
        };

        let mut sink = ArraySink { diff: self, transformer: &mut *transformer };
        let mut new = relocate(old, &script, &mut sink);

        for u in &self.updated {
            transformer.updated(&u.old, &u.new, &mut new[u.new_index]);
        }
        for n in &self.no_change {
            transformer.no_change(&n.old, &n.new, &mut new[n.new_index]);
        }

        Ok(new)
    }
}

impl<It, II> ItemChanges<It, II> {
    /// Apply these item changes to `old`, a structure parallel to the
    /// section's old items. Only the `item` component of each index path is
    /// used.
    pub fn transform<X>(
        &self,
        old: Vec<X::Mapped>,
        transformer: &mut X,
    ) -> DiffResult<Vec<X::Mapped>>
    where
        X: Transformer<It>,
    {
        check_len(self.old_count(), old.len())?;

        let script = EditScript {
            removed: self.removed.iter().map(|r| r.old_index.item).collect(),
            added: self.added.iter().map(|a| a.new_index.item).collect(),
            moved: self
                .moved
                .iter()
                .map(|m| (m.old_index.item, m.new_index.item))
                .collect(),
        };

        let mut sink = ItemSink { changes: self, transformer: &mut *transformer };
        let mut new = relocate(old, &script, &mut sink);

        for u in &self.updated {
            transformer.updated(&u.old_value, &u.new_value, &mut new[u.new_index.item]);
        }
        for n in &self.no_change {
            transformer.no_change(&n.old_value, &n.new_value, &mut new[n.new_index.item]);
        }

        Ok(new)
    }
}

impl<S, SI, It, II> SectionedDiff<S, SI, It, II> {
    /// Apply the section-level changes to `input`, a per-section structure
    /// parallel to the old snapshot.
    ///
    /// Fails without touching `input` if its shape (section count, then item
    /// count per section) differs from the old snapshot, which means the
    /// diff is stale.
    pub fn transform<X>(
        &self,
        input: Vec<X::Mapped>,
        transformer: &mut X,
    ) -> DiffResult<Vec<X::Mapped>>
    where
        X: SectionTransformer<S, It, II>,
    {
        let counts = self.old_item_counts();
        check_len(counts.len(), input.len())?;

        for (section, (mapped, &expected)) in input.iter().zip(counts).enumerate() {
            let actual = transformer.item_count(mapped);
            if actual != expected {
                return Err(DiffError::SectionShapeMismatch {
                    section,
                    expected,
                    actual,
                });
            }
        }

        Ok(self.changes.transform(input, transformer))
    }
}

impl<S, SI, It, II> SectionChanges<S, SI, It, II> {
    fn transform<X>(&self, input: Vec<X::Mapped>, transformer: &mut X) -> Vec<X::Mapped>
    where
        X: SectionTransformer<S, It, II>,
    {
        let script = EditScript {
            removed: self.removed.iter().map(|r| r.old_index).collect(),
            added: self.added.iter().map(|a| a.new_index).collect(),
            moved: self.moved.iter().map(|m| (m.old_index, m.new_index)).collect(),
        };

        let mut sink = SectionSink { changes: self, transformer: &mut *transformer };
        let mut new = relocate(input, &script, &mut sink);

        for n in &self.no_change {
            transformer.no_change(
                &n.old_value,
                &n.new_value,
                &n.item_changes,
                &mut new[n.new_index],
            );
        }

        new
    }
}

fn check_len(expected: usize, actual: usize) -> DiffResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(DiffError::LengthMismatch { expected, actual })
    }
}

/// Index-only form of a diff level. Entries of `moved` are `(old, new)`.
struct EditScript {
    removed: Vec<usize>,
    added: Vec<usize>,
    moved: Vec<(usize, usize)>,
}

/// Receives the callbacks of [`relocate`], addressed by position within the
/// corresponding list of the [`EditScript`].
trait Relocate {
    type Mapped;

    fn removed(&mut self, index: usize, mapped: Self::Mapped);
    fn added(&mut self, index: usize) -> Self::Mapped;
    fn moved(&mut self, index: usize, mapped: &mut Self::Mapped);
}

enum Removal {
    Removed(usize),
    Moved(usize),
}

enum Insertion {
    Added(usize),
    Moved(usize),
}

fn relocate<R: Relocate>(
    mut mapped: Vec<R::Mapped>,
    script: &EditScript,
    sink: &mut R,
) -> Vec<R::Mapped> {
    let mut removals: Vec<(usize, Removal)> =
        Vec::with_capacity(script.removed.len() + script.moved.len());
    removals.extend(
        script
            .removed
            .iter()
            .enumerate()
            .map(|(i, &at)| (at, Removal::Removed(i))),
    );
    removals.extend(
        script
            .moved
            .iter()
            .enumerate()
            .map(|(i, &(from, _))| (from, Removal::Moved(i))),
    );
    removals.sort_by(|a, b| b.0.cmp(&a.0));

    let mut in_flight: Vec<Option<R::Mapped>> = script.moved.iter().map(|_| None).collect();

    for (at, removal) in removals {
        let value = mapped.remove(at);
        match removal {
            Removal::Removed(i) => sink.removed(i, value),
            Removal::Moved(i) => in_flight[i] = Some(value),
        }
    }

    let mut insertions: Vec<(usize, Insertion)> =
        Vec::with_capacity(script.added.len() + script.moved.len());
    insertions.extend(
        script
            .added
            .iter()
            .enumerate()
            .map(|(i, &at)| (at, Insertion::Added(i))),
    );
    insertions.extend(
        script
            .moved
            .iter()
            .enumerate()
            .map(|(i, &(_, to))| (to, Insertion::Moved(i))),
    );
    insertions.sort_by(|a, b| a.0.cmp(&b.0));

    for (at, insertion) in insertions {
        let value = match insertion {
            Insertion::Added(i) => sink.added(i),
            Insertion::Moved(i) => {
                let mut value = in_flight[i]
                    .take()
                    .expect("each moved value is reinserted exactly once");
                sink.moved(i, &mut value);
                value
            }
        };
        mapped.insert(at, value);
    }

    mapped
}

struct ArraySink<'a, T, I, X> {
    diff: &'a ArrayDiff<T, I>,
    transformer: &'a mut X,
}

impl<T, I, X: Transformer<T>> Relocate for ArraySink<'_, T, I, X> {
    type Mapped = X::Mapped;

    fn removed(&mut self, index: usize, mapped: X::Mapped) {
        self.transformer.removed(&self.diff.removed[index].old, mapped);
    }

    fn added(&mut self, index: usize) -> X::Mapped {
        self.transformer.added(&self.diff.added[index].new)
    }

    fn moved(&mut self, index: usize, mapped: &mut X::Mapped) {
        let m = &self.diff.moved[index];
        self.transformer.moved(&m.old, &m.new, mapped);
    }
}

struct ItemSink<'a, It, II, X> {
    changes: &'a ItemChanges<It, II>,
    transformer: &'a mut X,
}

impl<It, II, X: Transformer<It>> Relocate for ItemSink<'_, It, II, X> {
    type Mapped = X::Mapped;

    fn removed(&mut self, index: usize, mapped: X::Mapped) {
        self.transformer.removed(&self.changes.removed[index].old_value, mapped);
    }

    fn added(&mut self, index: usize) -> X::Mapped {
        self.transformer.added(&self.changes.added[index].new_value)
    }

    fn moved(&mut self, index: usize, mapped: &mut X::Mapped) {
        let m = &self.changes.moved[index];
        self.transformer.moved(&m.old_value, &m.new_value, mapped);
    }
}

struct SectionSink<'a, S, SI, It, II, X> {
    changes: &'a SectionChanges<S, SI, It, II>,
    transformer: &'a mut X,
}

impl<S, SI, It, II, X> Relocate for SectionSink<'_, S, SI, It, II, X>
where
    X: SectionTransformer<S, It, II>,
{
    type Mapped = X::Mapped;

    fn removed(&mut self, index: usize, mapped: X::Mapped) {
        self.transformer.removed(&self.changes.removed[index].old_value, mapped);
    }

    fn added(&mut self, index: usize) -> X::Mapped {
        self.transformer.added(&self.changes.added[index].new_value)
    }

    fn moved(&mut self, index: usize, mapped: &mut X::Mapped) {
        let m = &self.changes.moved[index];
        self.transformer.moved(&m.old_value, &m.new_value, &m.item_changes, mapped);
    }
}
