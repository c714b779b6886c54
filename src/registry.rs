//! TableObjectRegistry: a named table of handle-bearing entries.
//!
//! Entries and their reference sets share one slot of a [`NameMap`], so the
//! two are always keyed by the same name. Every structural check runs
//! before any mutation; a failing `add` or `rename` leaves the registry and
//! the owning document exactly as they were.

use crate::document::{ObjectLocation, ObjectOwner};
use crate::error::TableError;
use crate::handle::Handle;
use crate::name_map::{InsertError, NameMap, Named, RenameError, Slot};
use crate::references::{ReferenceSet, Tracked};
use crate::table_object::{is_valid_name, TableKind, TableObject};
use core::hash::BuildHasher;
use core::num::NonZeroU64;
use core::sync::atomic::{AtomicU64, Ordering};
use std::collections::hash_map::RandomState;

/// Process-unique identity of a registry. Entities record it as their owner.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct RegistryId(NonZeroU64);

impl RegistryId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        let id = NEXT.fetch_add(1, Ordering::Relaxed);
        RegistryId(NonZeroU64::new(id).expect("registry id counter wrapped"))
    }
}

/// Stable reference to an entry of a specific registry. Survives renames;
/// resolves to `None` once the entry is removed or against another registry.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct EntryRef {
    registry: RegistryId,
    slot: Slot,
}

impl EntryRef {
    pub fn registry(&self) -> RegistryId {
        self.registry
    }

    pub fn get<'a, T, S>(&self, registry: &'a TableObjectRegistry<T, S>) -> Option<&'a T>
    where
        T: TableObject,
        S: BuildHasher,
    {
        registry.entry(*self)
    }
}

/// Outcome of [`TableObjectRegistry::add`].
#[derive(Debug)]
pub enum Added<T> {
    Inserted(EntryRef),
    /// An entry with the same name already existed. Nothing was changed;
    /// the caller's instance is handed back untouched.
    Existing { entry: EntryRef, rejected: T },
}

impl<T> Added<T> {
    /// The entry now registered under the requested name.
    pub fn entry(&self) -> EntryRef {
        match self {
            Added::Inserted(entry) | Added::Existing { entry, .. } => *entry,
        }
    }

    pub fn is_inserted(&self) -> bool {
        matches!(self, Added::Inserted(_))
    }
}

impl<T: TableObject> Named for Tracked<T> {
    fn name(&self) -> &str {
        self.entity.name()
    }
}

pub struct TableObjectRegistry<T, S = RandomState> {
    id: RegistryId,
    max_capacity: usize,
    entries: NameMap<Tracked<T>, S>,
}

impl<T: TableObject> TableObjectRegistry<T> {
    /// An empty registry bounded by the kind's default capacity.
    pub fn new() -> Self {
        Self::with_max_capacity(T::MAX_CAPACITY)
    }

    pub fn with_max_capacity(max_capacity: usize) -> Self {
        Self::with_max_capacity_and_hasher(max_capacity, RandomState::new())
    }
}

impl<T: TableObject> Default for TableObjectRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S> TableObjectRegistry<T, S>
where
    T: TableObject,
    S: BuildHasher,
{
    pub fn with_max_capacity_and_hasher(max_capacity: usize, hasher: S) -> Self {
        Self {
            id: RegistryId::next(),
            max_capacity,
            entries: NameMap::with_hasher(hasher),
        }
    }

    pub fn id(&self) -> RegistryId {
        self.id
    }

    pub fn kind(&self) -> TableKind {
        T::KIND
    }

    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry_ref(&self, slot: Slot) -> EntryRef {
        EntryRef {
            registry: self.id,
            slot,
        }
    }

    fn not_found(name: &str) -> TableError {
        TableError::NotFound {
            kind: T::KIND,
            name: name.to_string(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains(name)
    }

    pub fn lookup(&self, name: &str) -> Option<EntryRef> {
        self.entries.find(name).map(|slot| self.entry_ref(slot))
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        let slot = self.entries.find(name)?;
        self.entries.get(slot).map(|t| &t.entity)
    }

    /// Run `f` on the entry named `name` and return its result.
    ///
    /// Anything but identity may be changed. Name, handle and owner are put
    /// back once `f` returns or unwinds, and a reserved entry stays reserved.
    /// Renames go through [`rename`](Self::rename).
    pub fn modify<R>(&mut self, name: &str, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let slot = self.entries.find(name)?;
        self.modify_slot(slot, f)
    }

    pub fn entry(&self, entry: EntryRef) -> Option<&T> {
        if entry.registry != self.id {
            return None;
        }
        self.entries.get(entry.slot).map(|t| &t.entity)
    }

    /// Like [`modify`](Self::modify), addressing the entry by reference.
    pub fn modify_entry<R>(&mut self, entry: EntryRef, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        if entry.registry != self.id {
            return None;
        }
        self.modify_slot(entry.slot, f)
    }

    fn modify_slot<R>(&mut self, slot: Slot, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let tracked = self.entries.get_mut(slot)?;
        let mut guard = IdentityGuard::new(&mut tracked.entity);
        Some(f(&mut *guard.entity))
    }

    /// Whether `entity` is currently held by this registry.
    pub fn owns(&self, entity: &T) -> bool {
        entity.owner() == Some(self.id)
    }

    /// Add `entity`, assigning it a handle from `owner` when `assign_handle`
    /// is set or it has none.
    ///
    /// Adding a name that is already present changes nothing and returns
    /// [`Added::Existing`] with the caller's entity.
    ///
    /// # Errors
    ///
    /// - [`TableError::CapacityExceeded`] if the table is full.
    /// - [`TableError::InvalidEntity`] if the name is empty, or contains a
    ///   forbidden character and the entity is not reserved.
    /// - [`TableError::DuplicateHandle`] if a kept pre-assigned handle is
    ///   already registered in `owner`.
    pub fn add<O>(&mut self, owner: &mut O, mut entity: T, assign_handle: bool) -> Result<Added<T>, TableError>
    where
        O: ObjectOwner + ?Sized,
    {
        if self.entries.len() >= self.max_capacity {
            tracing::debug!(table = %T::KIND, name = entity.name(), max = self.max_capacity, "table full");
            return Err(TableError::CapacityExceeded {
                kind: T::KIND,
                max: self.max_capacity,
            });
        }

        let name_ok = if entity.is_reserved() {
            !entity.name().is_empty()
        } else {
            is_valid_name(entity.name())
        };
        if !name_ok {
            return Err(TableError::InvalidEntity {
                name: entity.name().to_string(),
            });
        }

        if let Some(slot) = self.entries.find(entity.name()) {
            tracing::trace!(table = %T::KIND, name = entity.name(), "name already present; returning existing entry");
            return Ok(Added::Existing {
                entry: self.entry_ref(slot),
                rejected: entity,
            });
        }

        let kept = if assign_handle { None } else { entity.handle() };
        if let Some(handle) = kept {
            if owner.contains_handle(handle) {
                return Err(TableError::DuplicateHandle(handle));
            }
        }

        // All checks passed; nothing below can fail.
        let handle = kept.unwrap_or_else(|| owner.allocate_handle());
        let core = entity.core_mut();
        core.set_handle(Some(handle));
        core.set_owner(Some(self.id));
        tracing::debug!(table = %T::KIND, name = entity.name(), %handle, "adding table entry");

        let slot = match self.entries.insert(Tracked::new(entity)) {
            Ok(slot) => slot,
            Err(InsertError::DuplicateName { .. }) => unreachable!("name checked free above"),
        };
        let entry = self.entry_ref(slot);
        owner.register(handle, ObjectLocation { kind: T::KIND, entry });
        Ok(Added::Inserted(entry))
    }

    /// Whether the entry named `name` exists and may be removed now.
    pub fn can_remove(&self, name: &str) -> bool {
        self.entries
            .find(name)
            .and_then(|slot| self.entries.get(slot))
            .is_some_and(Self::removable)
    }

    fn removable(tracked: &Tracked<T>) -> bool {
        !tracked.entity.is_reserved() && tracked.references.is_empty()
    }

    /// Remove the entry named `name`. Returns false, changing nothing, if it
    /// is absent, reserved or still referenced, or if `owner` is not the
    /// document that indexes it.
    pub fn remove<O>(&mut self, owner: &mut O, name: &str) -> bool
    where
        O: ObjectOwner + ?Sized,
    {
        self.take(owner, name).is_some()
    }

    /// Like [`remove`](Self::remove), addressing the entry by reference.
    pub fn remove_entry<O>(&mut self, owner: &mut O, entry: EntryRef) -> bool
    where
        O: ObjectOwner + ?Sized,
    {
        entry.registry == self.id && self.take_slot(owner, entry.slot).is_some()
    }

    /// Remove the entry named `name` and hand it back detached: no handle,
    /// no owner.
    pub fn take<O>(&mut self, owner: &mut O, name: &str) -> Option<T>
    where
        O: ObjectOwner + ?Sized,
    {
        let slot = self.entries.find(name)?;
        self.take_slot(owner, slot)
    }

    fn take_slot<O>(&mut self, owner: &mut O, slot: Slot) -> Option<T>
    where
        O: ObjectOwner + ?Sized,
    {
        let tracked = self.entries.get(slot)?;
        if !Self::removable(tracked) {
            tracing::debug!(
                table = %T::KIND,
                name = tracked.name(),
                reserved = tracked.entity.is_reserved(),
                references = tracked.references.len(),
                "entry not removable"
            );
            return None;
        }
        let location = ObjectLocation {
            kind: T::KIND,
            entry: self.entry_ref(slot),
        };
        let handle = tracked.entity.handle();
        if let Some(handle) = handle {
            if owner.location(handle) != Some(location) {
                tracing::debug!(table = %T::KIND, name = tracked.name(), %handle, "entry not indexed by this owner; not removed");
                return None;
            }
        }

        let Tracked { mut entity, .. } = self.entries.remove(slot)?;
        if let Some(handle) = handle {
            let unregistered = owner.unregister(handle);
            debug_assert_eq!(unregistered, Some(location));
        }
        let core = entity.core_mut();
        core.set_handle(None);
        core.set_owner(None);
        tracing::debug!(table = %T::KIND, name = entity.name(), "removed table entry");
        Some(entity)
    }

    /// Rename the entry `name` to `new_name`, keeping its handle, its
    /// references and every [`EntryRef`] to it.
    ///
    /// # Errors
    ///
    /// - [`TableError::NotFound`] if `name` is absent.
    /// - [`TableError::Reserved`] if the entry is reserved.
    /// - [`TableError::InvalidEntity`] if `new_name` is not a valid name.
    /// - [`TableError::DuplicateName`] if another entry is named `new_name`.
    pub fn rename(&mut self, name: &str, new_name: &str) -> Result<(), TableError> {
        let slot = self.entries.find(name).ok_or_else(|| Self::not_found(name))?;
        let current = match self.entries.get(slot) {
            Some(t) => &t.entity,
            None => return Err(Self::not_found(name)),
        };
        if current.is_reserved() {
            return Err(TableError::Reserved {
                kind: T::KIND,
                name: current.name().to_string(),
            });
        }
        if !is_valid_name(new_name) {
            return Err(TableError::InvalidEntity {
                name: new_name.to_string(),
            });
        }
        if current.name() == new_name {
            return Ok(());
        }

        let owned = new_name.to_string();
        match self
            .entries
            .rename(slot, new_name, |t| t.entity.core_mut().set_name(owned))
        {
            Ok(()) => {
                tracing::debug!(table = %T::KIND, from = name, to = new_name, "renamed table entry");
                Ok(())
            }
            Err(RenameError::DuplicateName { .. }) => {
                tracing::debug!(table = %T::KIND, from = name, to = new_name, "rename rejected: name taken");
                Err(TableError::DuplicateName {
                    kind: T::KIND,
                    name: new_name.to_string(),
                })
            }
            Err(RenameError::Missing) => Err(Self::not_found(name)),
        }
    }

    /// Record that the document object `by` cites the entry `name`.
    /// Returns whether `by` was newly added.
    pub fn add_reference(&mut self, name: &str, by: Handle) -> Result<bool, TableError> {
        let slot = self.entries.find(name).ok_or_else(|| Self::not_found(name))?;
        let tracked = self
            .entries
            .get_mut(slot)
            .ok_or_else(|| Self::not_found(name))?;
        Ok(tracked.references.insert(by))
    }

    /// Forget that `by` cites the entry `name`. Returns whether it did.
    pub fn remove_reference(&mut self, name: &str, by: Handle) -> bool {
        let Some(slot) = self.entries.find(name) else {
            return false;
        };
        self.entries
            .get_mut(slot)
            .is_some_and(|t| t.references.remove(by))
    }

    pub fn references(&self, name: &str) -> Option<&ReferenceSet> {
        let slot = self.entries.find(name)?;
        self.entries.get(slot).map(|t| &t.references)
    }

    pub fn is_referenced(&self, name: &str) -> bool {
        self.references(name).is_some_and(|r| !r.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntryRef, &T)> + '_ {
        let registry = self.id;
        self.entries
            .iter()
            .map(move |(slot, t)| (EntryRef { registry, slot }, &t.entity))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(_, t)| t.name())
    }

    pub fn iter_references(&self) -> impl Iterator<Item = (&T, &ReferenceSet)> + '_ {
        self.entries.iter().map(|(_, t)| (&t.entity, &t.references))
    }
}

/// Snapshot of a registered entity's identity, restored on drop.
///
/// Never leaves `modify_slot`, so it always runs: on return and on unwind.
struct IdentityGuard<'a, T: TableObject> {
    entity: &'a mut T,
    name: String,
    handle: Option<Handle>,
    owner: Option<RegistryId>,
    reserved: bool,
}

impl<'a, T: TableObject> IdentityGuard<'a, T> {
    fn new(entity: &'a mut T) -> Self {
        let name = entity.name().to_string();
        let handle = entity.handle();
        let owner = entity.owner();
        let reserved = entity.is_reserved();
        Self {
            entity,
            name,
            handle,
            owner,
            reserved,
        }
    }
}

impl<T: TableObject> Drop for IdentityGuard<'_, T> {
    fn drop(&mut self) {
        let core = self.entity.core_mut();
        if core.name() != self.name || core.handle() != self.handle || core.owner() != self.owner {
            tracing::warn!(table = %T::KIND, name = %self.name, "entry identity changed outside the registry; restoring");
            core.set_name(std::mem::take(&mut self.name));
            core.set_handle(self.handle);
            core.set_owner(self.owner);
        }
        if self.reserved && !core.is_reserved() {
            tracing::warn!(table = %T::KIND, name = core.name(), "reserved entry cannot be unreserved; restoring");
            core.set_reserved(true);
        }
    }
}
