//! dxf-tables: named table-object registries for a CAD interchange
//! document, with document-wide handles and reference-gated removal.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep the invariants of a symbol table (unique names, unique
//!   handles, bounded size, protected reserved entries, no removal while
//!   referenced) true across every add, rename and remove.
//! - Layers:
//!   - NameMap<V, S>: structural map keyed by case-insensitive names read
//!     from the values themselves; stable slot keys; atomic re-key.
//!   - Tracked<T>: an entity plus its reference set, stored in one slot so
//!     entries and references can never disagree about keys.
//!   - TableObjectRegistry<T, S>: public API. Validates, coordinates handle
//!     issuance and indexing with the owning document, and exposes
//!     `EntryRef`s that survive renames.
//!
//! Constraints
//! - Single-threaded: all mutation goes through `&mut self`; no locks.
//! - Every failing call leaves the registry and the document unchanged.
//! - Entity identity (name, handle, owner) changes only through the
//!   registry. `modify` runs a closure on an entry and puts identity back
//!   when it returns or unwinds; a reserved entry stays reserved.
//! - Removal goes through the document that indexes the entry; any other
//!   `ObjectOwner` is refused.
//! - Duplicate adds are idempotent: nothing changes and the caller gets the
//!   existing entry plus their own instance back.
//!
//! Ownership
//! - The registry owns its entities. An entity's `owner` is a `RegistryId`,
//!   usable only for identity checks; it never keeps anything alive.
//! - The owning document is passed to the calls that need it through the
//!   `ObjectOwner` trait. `ObjectIndex` is the bundled implementation;
//!   `Document` groups it with the four standard tables.
//!
//! Handles
//! - `HandleSeed::allocate` is a pure function returning the next handle
//!   and the advanced seed; `ObjectIndex` threads the seed through its own
//!   state and advances it past handles registered from elsewhere.
//!
//! Notes and non-goals
//! - No file reading or writing. `TableKind::code_name` and the hex form of
//!   `Handle` are what a table-section reader/writer needs.
//! - No undo history and no cross-thread sharing.
//! - Iteration follows slot order: insertion order until a removal frees a
//!   slot for reuse.

mod document;
mod error;
mod handle;
mod kinds;
mod name_map;
mod name_map_proptest;
mod references;
mod registry;
mod table_object;

// Public surface
pub use document::{Document, ObjectIndex, ObjectLocation, ObjectOwner};
pub use error::TableError;
pub use handle::{Handle, HandleSeed, ParseHandleError};
pub use kinds::{ApplicationRegistry, Layer, Linetype, TextStyle};
pub use references::ReferenceSet;
pub use registry::{Added, EntryRef, RegistryId, TableObjectRegistry};
pub use table_object::{
    is_valid_name, TableKind, TableObject, TableObjectCore, INVALID_NAME_CHARS, MAX_TABLE_CAPACITY,
};
