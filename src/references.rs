//! Per-entry reference sets: the document objects citing a table entry.
//!
//! Each entry records the handles of its dependents; removal is gated on
//! the set being empty.

use crate::handle::Handle;
use hashbrown::HashSet;

/// Handles of the document objects that currently cite one table entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceSet {
    by: HashSet<Handle>,
}

impl ReferenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by.is_empty()
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.by.contains(&handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = Handle> + '_ {
        self.by.iter().copied()
    }

    /// Returns true if `handle` was not already present.
    pub(crate) fn insert(&mut self, handle: Handle) -> bool {
        self.by.insert(handle)
    }

    /// Returns true if `handle` was present.
    pub(crate) fn remove(&mut self, handle: Handle) -> bool {
        self.by.remove(&handle)
    }
}

/// A stored entity together with its reference set. Keeping both in one
/// slot means entries and references are re-keyed and dropped together.
#[derive(Debug)]
pub(crate) struct Tracked<T> {
    pub entity: T,
    pub references: ReferenceSet,
}

impl<T> Tracked<T> {
    pub fn new(entity: T) -> Self {
        Self {
            entity,
            references: ReferenceSet::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(v: u64) -> Handle {
        Handle::new(v).unwrap()
    }

    #[test]
    fn insert_and_remove_report_changes() {
        let mut refs = ReferenceSet::new();
        assert!(refs.is_empty());
        assert!(refs.insert(h(5)));
        assert!(!refs.insert(h(5)), "second insert is a no-op");
        assert!(refs.insert(h(6)));
        assert_eq!(refs.len(), 2);
        assert!(refs.contains(h(5)));

        assert!(refs.remove(h(5)));
        assert!(!refs.remove(h(5)));
        let mut left: Vec<_> = refs.iter().collect();
        left.sort();
        assert_eq!(left, vec![h(6)]);
    }
}
