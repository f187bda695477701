//! Changelog types.
//!
//! A `Changelog` lists, per dApp of the tree, the field-level differences
//! between two snapshots. Changes and differences are ordered
//! deterministically: dApps depth-first in name order, fields in a fixed
//! order within each dApp, map keys sorted.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Placeholder for a value absent on one side
pub const NIL: &str = "<nil>";

/// Placeholder for a whole sub-structure present on one side
pub const PRESENT: &str = "{...}";

bitflags! {
    /// What a difference is about; combine with `|` to filter on several
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Kind: u32 {
        const APP = 1 << 0;
        const NODE = 1 << 1;
        const META = 1 << 2;
        const CHANNEL = 1 << 3;
        const TYPE = 1 << 4;
        const BOUNDARY = 1 << 5;
        const ANNOTATION = 1 << 6;
        const ALIAS = 1 << 7;
        const ENVIRONMENT = 1 << 8;
    }
}

bitflags! {
    /// What happened to the differing element
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Operation: u32 {
        const DELETE = 1 << 0;
        const UPDATE = 1 << 1;
        const CREATE = 1 << 2;
    }
}

/// One attribute-level delta
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Difference {
    pub field: String,
    pub from: String,
    pub to: String,
    pub kind: Kind,
    /// Key of the element inside its map, when the field addresses one
    pub name: String,
    pub operation: Operation,
}

/// All differences found at one dApp of the tree
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Change {
    /// Dotted path of the dApp, rooted at `*`
    pub context: String,
    pub diff: Vec<Difference>,
    /// Union of the kinds of `diff`
    pub kind: Kind,
    /// Union of the operations of `diff`
    pub operation: Operation,
}

impl Change {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            ..Default::default()
        }
    }

    pub(crate) fn push(&mut self, difference: Difference) {
        self.kind |= difference.kind;
        self.operation |= difference.operation;
        self.diff.push(difference);
    }

    /// Copy of this change keeping only the differences accepted by `f`
    pub fn filter<F>(&self, f: F) -> Change
    where
        F: Fn(&Difference) -> bool,
    {
        let mut out = Change::new(self.context.clone());
        for d in self.diff.iter().filter(|d| f(d)) {
            out.push(d.clone());
        }
        out
    }

    /// Copy of this change keeping differences of any of the given kinds
    pub fn filter_kind(&self, kind: Kind) -> Change {
        self.filter(|d| d.kind.intersects(kind))
    }
}

/// Ordered list of changes between two trees
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Changelog(pub Vec<Change>);

impl Changelog {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Change> {
        self.0.iter()
    }

    /// Total number of differences across all changes
    pub fn difference_count(&self) -> usize {
        self.0.iter().map(|c| c.diff.len()).sum()
    }

    /// Keep differences accepted by `f`; changes left empty are dropped
    pub fn filter_diffs<F>(&self, f: F) -> Changelog
    where
        F: Fn(&str, &Difference) -> bool,
    {
        Changelog(
            self.0
                .iter()
                .map(|c| c.filter(|d| f(&c.context, d)))
                .filter(|c| !c.diff.is_empty())
                .collect(),
        )
    }

    /// Keep differences of any of the given kinds
    ///
    /// ```
    /// # use inspr_core::diff::{Changelog, Kind};
    /// let cl = Changelog::default();
    /// assert!(cl.filter_by_kind(Kind::APP | Kind::CHANNEL).is_empty());
    /// ```
    pub fn filter_by_kind(&self, kind: Kind) -> Changelog {
        self.filter_diffs(|_, d| d.kind.intersects(kind))
    }

    /// Run every operation whose filter accepts a difference, for each
    /// difference in order
    pub fn for_each_diff_filtered(&self, operations: &mut [DifferenceOperation<'_>]) {
        for change in &self.0 {
            for d in &change.diff {
                for op in operations.iter_mut() {
                    if (op.filter)(&change.context, d) {
                        (op.apply)(&change.context, d);
                    }
                }
            }
        }
    }

    /// Run every operation whose filter accepts a change, for each change
    pub fn for_each_filtered(&self, operations: &mut [ChangeOperation<'_>]) {
        for change in &self.0 {
            for op in operations.iter_mut() {
                if (op.filter)(change) {
                    (op.apply)(change);
                }
            }
        }
    }
}

impl IntoIterator for Changelog {
    type Item = Change;
    type IntoIter = std::vec::IntoIter<Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Changelog {
    type Item = &'a Change;
    type IntoIter = std::slice::Iter<'a, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

type DiffFilter<'a> = Box<dyn Fn(&str, &Difference) -> bool + 'a>;
type DiffApply<'a> = Box<dyn FnMut(&str, &Difference) + 'a>;

/// A filter plus the action run on each difference it accepts
pub struct DifferenceOperation<'a> {
    filter: DiffFilter<'a>,
    apply: DiffApply<'a>,
}

impl<'a> DifferenceOperation<'a> {
    pub fn new<F, A>(filter: F, apply: A) -> Self
    where
        F: Fn(&str, &Difference) -> bool + 'a,
        A: FnMut(&str, &Difference) + 'a,
    {
        Self {
            filter: Box::new(filter),
            apply: Box::new(apply),
        }
    }

    /// Operation applied to differences of any of the given kinds
    pub fn by_kind<A>(kind: Kind, apply: A) -> Self
    where
        A: FnMut(&str, &Difference) + 'a,
    {
        Self::new(move |_, d| d.kind.intersects(kind), apply)
    }
}

type ChangeFilter<'a> = Box<dyn Fn(&Change) -> bool + 'a>;
type ChangeApply<'a> = Box<dyn FnMut(&Change) + 'a>;

/// A filter plus the action run on each change it accepts
pub struct ChangeOperation<'a> {
    filter: ChangeFilter<'a>,
    apply: ChangeApply<'a>,
}

impl<'a> ChangeOperation<'a> {
    pub fn new<F, A>(filter: F, apply: A) -> Self
    where
        F: Fn(&Change) -> bool + 'a,
        A: FnMut(&Change) + 'a,
    {
        Self {
            filter: Box::new(filter),
            apply: Box::new(apply),
        }
    }

    pub fn by_kind<A>(kind: Kind, apply: A) -> Self
    where
        A: FnMut(&Change) + 'a,
    {
        Self::new(move |c| c.kind.intersects(kind), apply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diff(field: &str, kind: Kind, op: Operation) -> Difference {
        Difference {
            field: field.to_string(),
            from: NIL.to_string(),
            to: PRESENT.to_string(),
            kind,
            name: String::new(),
            operation: op,
        }
    }

    fn sample() -> Changelog {
        let mut root = Change::new("*");
        root.push(diff("Spec.Apps[a]", Kind::APP, Operation::CREATE));
        root.push(diff("Spec.Channels[c]", Kind::CHANNEL, Operation::CREATE));
        let mut child = Change::new("*.Spec.Apps.b");
        child.push(diff("Spec.Types[t]", Kind::TYPE, Operation::DELETE));
        Changelog(vec![root, child])
    }

    #[test]
    fn test_push_accumulates_flags() {
        let cl = sample();
        assert_eq!(cl.0[0].kind, Kind::APP | Kind::CHANNEL);
        assert_eq!(cl.0[0].operation, Operation::CREATE);
        assert_eq!(cl.difference_count(), 3);
    }

    #[test]
    fn test_filter_by_kind_drops_empty_changes() {
        let cl = sample().filter_by_kind(Kind::CHANNEL | Kind::TYPE);
        assert_eq!(cl.len(), 2);
        assert_eq!(cl.0[0].diff.len(), 1);
        assert_eq!(cl.0[0].kind, Kind::CHANNEL);

        let only_apps = sample().filter_by_kind(Kind::APP);
        assert_eq!(only_apps.len(), 1);
    }

    #[test]
    fn test_for_each_diff_filtered_runs_matching_operations() {
        let cl = sample();
        let mut created = Vec::new();
        let mut deleted = 0;
        {
            let mut ops = [
                DifferenceOperation::new(
                    |_, d| d.operation.contains(Operation::CREATE),
                    |_, d| created.push(d.field.clone()),
                ),
                DifferenceOperation::by_kind(Kind::TYPE, |_, _| deleted += 1),
            ];
            cl.for_each_diff_filtered(&mut ops);
        }
        assert_eq!(created, vec!["Spec.Apps[a]", "Spec.Channels[c]"]);
        assert_eq!(deleted, 1);
    }

    #[test]
    fn test_for_each_filtered_on_changes() {
        let cl = sample();
        let mut contexts = Vec::new();
        {
            let mut ops = [ChangeOperation::by_kind(Kind::TYPE, |c| {
                contexts.push(c.context.clone())
            })];
            cl.for_each_filtered(&mut ops);
        }
        assert_eq!(contexts, vec!["*.Spec.Apps.b"]);
    }

    #[test]
    fn test_change_filter_kind() {
        let change = sample().0[0].filter_kind(Kind::APP);
        assert_eq!(change.diff.len(), 1);
        assert_eq!(change.context, "*");
    }
}
