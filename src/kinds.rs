//! The standard symbol-table entry kinds.
//!
//! Only the generic table-object fields are modelled. An entry is reserved
//! when it is created with one of its kind's baseline names.

use crate::handle::Handle;
use crate::name_map::names_eq;
use crate::table_object::{TableKind, TableObject, TableObjectCore};

macro_rules! table_object_kind {
    ($ty:ident, $kind:expr) => {
        impl $ty {
            /// Keep `handle` when added, unless a fresh one is requested.
            pub fn with_handle(mut self, handle: Handle) -> Self {
                self.core = self.core.with_handle(handle);
                self
            }

            pub fn set_reserved(&mut self, reserved: bool) {
                self.core.set_reserved(reserved);
            }
        }

        impl TableObject for $ty {
            const KIND: TableKind = $kind;

            fn core(&self) -> &TableObjectCore {
                &self.core
            }

            fn core_mut(&mut self) -> &mut TableObjectCore {
                &mut self.core
            }
        }
    };
}

fn core_for(name: String, reserved_names: &[&str]) -> TableObjectCore {
    let reserved = reserved_names.iter().any(|r| names_eq(&name, r));
    TableObjectCore::new(name).with_reserved(reserved)
}

/// An application id (APPID table), registering an application that
/// attaches extended data to document objects.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ApplicationRegistry {
    core: TableObjectCore,
}

impl ApplicationRegistry {
    pub const DEFAULT_NAME: &'static str = "ACAD";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            core: core_for(name.into(), &[Self::DEFAULT_NAME]),
        }
    }

    pub fn default_registry() -> Self {
        Self::new(Self::DEFAULT_NAME)
    }
}

table_object_kind!(ApplicationRegistry, TableKind::ApplicationRegistry);

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Layer {
    core: TableObjectCore,
}

impl Layer {
    pub const DEFAULT_NAME: &'static str = "0";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            core: core_for(name.into(), &[Self::DEFAULT_NAME]),
        }
    }

    pub fn default_layer() -> Self {
        Self::new(Self::DEFAULT_NAME)
    }
}

table_object_kind!(Layer, TableKind::Layer);

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Linetype {
    core: TableObjectCore,
}

impl Linetype {
    pub const BY_LAYER_NAME: &'static str = "ByLayer";
    pub const BY_BLOCK_NAME: &'static str = "ByBlock";
    pub const CONTINUOUS_NAME: &'static str = "Continuous";

    const RESERVED_NAMES: [&'static str; 3] = [
        Self::BY_LAYER_NAME,
        Self::BY_BLOCK_NAME,
        Self::CONTINUOUS_NAME,
    ];

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            core: core_for(name.into(), &Self::RESERVED_NAMES),
        }
    }

    pub fn by_layer() -> Self {
        Self::new(Self::BY_LAYER_NAME)
    }

    pub fn by_block() -> Self {
        Self::new(Self::BY_BLOCK_NAME)
    }

    pub fn continuous() -> Self {
        Self::new(Self::CONTINUOUS_NAME)
    }
}

table_object_kind!(Linetype, TableKind::Linetype);

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextStyle {
    core: TableObjectCore,
}

impl TextStyle {
    pub const DEFAULT_NAME: &'static str = "Standard";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            core: core_for(name.into(), &[Self::DEFAULT_NAME]),
        }
    }

    pub fn default_style() -> Self {
        Self::new(Self::DEFAULT_NAME)
    }
}

table_object_kind!(TextStyle, TableKind::TextStyle);
