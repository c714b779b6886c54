//! NameMap: structural layer keyed by case-insensitive names, with stable
//! slot keys and an atomic re-key.
//!
//! The key is not stored separately: it is read from the value through
//! [`Named`], so the index and the value's own name field cannot disagree.
//! Each entry keeps the hash of its name; indexing always uses that stored
//! hash, and `rename` is the only operation that recomputes it.

use core::hash::{BuildHasher, Hasher};
use hashbrown::HashTable;
use slotmap::{DefaultKey, SlotMap};
use std::collections::hash_map::RandomState;

/// Values stored in a [`NameMap`] expose the name they are indexed under.
pub trait Named {
    fn name(&self) -> &str;
}

/// Case-insensitive name equality, consistent with the map's hashing.
pub fn names_eq(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Stable key of a live entry. Stays valid across renames; after removal it
/// never resolves again, even if the slot is reused.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Slot(DefaultKey);

#[derive(Debug)]
struct Entry<V> {
    value: V,
    hash: u64,
}

#[derive(Debug)]
pub enum InsertError<V> {
    /// An entry with an equal name exists; the rejected value is handed back.
    DuplicateName { existing: Slot, value: V },
}

#[derive(Debug, Eq, PartialEq)]
pub enum RenameError {
    Missing,
    DuplicateName { existing: Slot },
}

pub struct NameMap<V, S = RandomState> {
    hasher: S,
    index: HashTable<DefaultKey>,
    slots: SlotMap<DefaultKey, Entry<V>>,
}

impl<V: Named> NameMap<V> {
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }
}

impl<V: Named> Default for NameMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, S> NameMap<V, S>
where
    V: Named,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            index: HashTable::new(),
            slots: SlotMap::with_key(),
        }
    }

    fn make_hash(&self, name: &str) -> u64 {
        let mut state = self.hasher.build_hasher();
        for c in name.chars().flat_map(char::to_lowercase) {
            state.write_u32(c as u32);
        }
        state.finish()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<Slot> {
        let hash = self.make_hash(name);
        self.index
            .find(hash, |&k| {
                self.slots
                    .get(k)
                    .map(|e| names_eq(e.value.name(), name))
                    .unwrap_or(false)
            })
            .map(|&k| Slot(k))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn insert(&mut self, value: V) -> Result<Slot, InsertError<V>> {
        let hash = self.make_hash(value.name());
        let slots = &mut self.slots;
        match self.index.entry(
            hash,
            |&k| {
                slots
                    .get(k)
                    .map(|e| names_eq(e.value.name(), value.name()))
                    .unwrap_or(false)
            },
            |&k| slots.get(k).map(|e| e.hash).unwrap_or(0),
        ) {
            hashbrown::hash_table::Entry::Occupied(o) => Err(InsertError::DuplicateName {
                existing: Slot(*o.get()),
                value,
            }),
            hashbrown::hash_table::Entry::Vacant(v) => {
                let k = slots.insert(Entry { value, hash });
                let _ = v.insert(k);
                Ok(Slot(k))
            }
        }
    }

    pub fn remove(&mut self, slot: Slot) -> Option<V> {
        let k = slot.0;
        let entry = self.slots.remove(k)?;
        if let Ok(occupied) = self.index.find_entry(entry.hash, |&kk| kk == k) {
            let _ = occupied.remove();
        }
        Some(entry.value)
    }

    /// Re-key `slot` under `new_name`.
    ///
    /// Fails without touching anything when `slot` is dead or another entry
    /// already owns `new_name`. On success `apply` is called with the value
    /// unlinked from the index and must leave `value.name()` equal to
    /// `new_name`; the entry is then relinked under the new hash.
    pub fn rename<F>(&mut self, slot: Slot, new_name: &str, apply: F) -> Result<(), RenameError>
    where
        F: FnOnce(&mut V),
    {
        let k = slot.0;
        let old_hash = match self.slots.get(k) {
            Some(e) => e.hash,
            None => return Err(RenameError::Missing),
        };
        if let Some(existing) = self.find(new_name) {
            if existing != slot {
                return Err(RenameError::DuplicateName { existing });
            }
        }

        let new_hash = self.make_hash(new_name);
        if let Ok(occupied) = self.index.find_entry(old_hash, |&kk| kk == k) {
            let _ = occupied.remove();
        }
        let slots = &mut self.slots;
        let entry = slots
            .get_mut(k)
            .expect("slot checked live at the start of rename");
        apply(&mut entry.value);
        debug_assert!(
            names_eq(entry.value.name(), new_name),
            "rename callback must set the requested name"
        );
        entry.hash = new_hash;
        let _ = self.index.insert_unique(new_hash, k, |&kk| {
            slots.get(kk).map(|e| e.hash).unwrap_or(0)
        });
        Ok(())
    }

    pub fn get(&self, slot: Slot) -> Option<&V> {
        self.slots.get(slot.0).map(|e| &e.value)
    }

    /// Mutable access to a value. Callers must not change the value's name;
    /// use [`NameMap::rename`] for that.
    pub fn get_mut(&mut self, slot: Slot) -> Option<&mut V> {
        self.slots.get_mut(slot.0).map(|e| &mut e.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Slot, &V)> {
        self.slots.iter().map(|(k, e)| (Slot(k), &e.value))
    }
}
