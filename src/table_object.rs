//! Table objects: named, handle-bearing entries of a document table.

use crate::handle::Handle;
use crate::registry::RegistryId;
use core::fmt;

/// Largest number of entries a table may hold. DXF table entry counts are
/// 16-bit signed integers.
pub const MAX_TABLE_CAPACITY: usize = i16::MAX as usize;

/// Characters a table object name may not contain.
pub const INVALID_NAME_CHARS: [char; 13] =
    ['\\', '/', ':', '*', '?', '"', '<', '>', '|', ';', ',', '=', '`'];

/// The kind of table an entry belongs to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TableKind {
    ApplicationRegistry,
    Layer,
    Linetype,
    TextStyle,
}

impl TableKind {
    /// Table name as written in the TABLES section (group code 2).
    pub const fn code_name(self) -> &'static str {
        match self {
            TableKind::ApplicationRegistry => "APPID",
            TableKind::Layer => "LAYER",
            TableKind::Linetype => "LTYPE",
            TableKind::TextStyle => "STYLE",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code_name())
    }
}

/// Whether `name` may be used for a table object.
///
/// Reserved baseline entries skip the character check (DXF has reserved
/// names such as `*Model_Space`); every name must be non-empty.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(&INVALID_NAME_CHARS[..])
}

/// Identity fields shared by every table object.
///
/// Name, handle and owner are only changed by the registry holding the
/// object; the reserved flag is free to set.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableObjectCore {
    name: String,
    handle: Option<Handle>,
    reserved: bool,
    #[cfg_attr(feature = "serde", serde(skip))]
    owner: Option<RegistryId>,
}

impl TableObjectCore {
    /// A detached, unreserved object without a handle.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handle: None,
            reserved: false,
            owner: None,
        }
    }

    /// Pre-assign a handle, e.g. one read from a file. The registry keeps it
    /// unless asked to assign a fresh one.
    pub fn with_handle(mut self, handle: Handle) -> Self {
        self.handle = Some(handle);
        self
    }

    pub fn with_reserved(mut self, reserved: bool) -> Self {
        self.reserved = reserved;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self) -> Option<Handle> {
        self.handle
    }

    pub fn is_reserved(&self) -> bool {
        self.reserved
    }

    pub fn set_reserved(&mut self, reserved: bool) {
        self.reserved = reserved;
    }

    /// The registry currently holding this object, if any.
    pub fn owner(&self) -> Option<RegistryId> {
        self.owner
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_handle(&mut self, handle: Option<Handle>) {
        self.handle = handle;
    }

    pub(crate) fn set_owner(&mut self, owner: Option<RegistryId>) {
        self.owner = owner;
    }
}

/// An entry kind storable in a [`TableObjectRegistry`](crate::TableObjectRegistry).
///
/// Implementors embed a [`TableObjectCore`] and must return the same core
/// from both accessors for the object's whole life.
pub trait TableObject {
    const KIND: TableKind;
    const MAX_CAPACITY: usize = MAX_TABLE_CAPACITY;

    fn core(&self) -> &TableObjectCore;
    fn core_mut(&mut self) -> &mut TableObjectCore;

    fn name(&self) -> &str {
        self.core().name()
    }

    fn handle(&self) -> Option<Handle> {
        self.core().handle()
    }

    fn is_reserved(&self) -> bool {
        self.core().is_reserved()
    }

    fn owner(&self) -> Option<RegistryId> {
        self.core().owner()
    }
}
