use crate::handle::Handle;
use crate::table_object::TableKind;

/// Errors from structural table operations. Every failing call leaves the
/// registry and the owning document unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("table overflow: the {kind} table can hold at most {max} entries")]
    CapacityExceeded { kind: TableKind, max: usize },

    #[error("{name:?} is not a valid table object name")]
    InvalidEntity { name: String },

    #[error("another {kind} entry is already named {name:?}")]
    DuplicateName { kind: TableKind, name: String },

    #[error("handle {0} is already in use in this document")]
    DuplicateHandle(Handle),

    #[error("no {kind} entry named {name:?}")]
    NotFound { kind: TableKind, name: String },

    #[error("reserved {kind} entry {name:?} cannot be renamed")]
    Reserved { kind: TableKind, name: String },
}
