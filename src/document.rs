//! The owning document: handle issuance and the document-wide object index.

use crate::error::TableError;
use crate::handle::{Handle, HandleSeed};
use crate::kinds::{ApplicationRegistry, Layer, Linetype, TextStyle};
use crate::registry::{EntryRef, TableObjectRegistry};
use crate::table_object::{TableKind, TableObject};
use hashbrown::HashMap;

/// Where a handle lives: the table kind and the entry inside that table.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ObjectLocation {
    pub kind: TableKind,
    pub entry: EntryRef,
}

/// What a registry needs from the document that owns it.
pub trait ObjectOwner {
    /// Issue a handle that has never been issued or registered before.
    fn allocate_handle(&mut self) -> Handle;

    /// Where `handle` is indexed, if it is.
    fn location(&self, handle: Handle) -> Option<ObjectLocation>;

    /// Whether `handle` is registered. Handles that were allocated but never
    /// registered are not covered: an object holding one must be registered
    /// before a table can be stopped from keeping the same handle.
    fn contains_handle(&self, handle: Handle) -> bool {
        self.location(handle).is_some()
    }

    /// Record `handle` in the document-wide index.
    fn register(&mut self, handle: Handle, location: ObjectLocation);

    fn unregister(&mut self, handle: Handle) -> Option<ObjectLocation>;
}

/// Handle seed plus handle → object index.
#[derive(Debug, Default)]
pub struct ObjectIndex {
    seed: HandleSeed,
    objects: HashMap<Handle, ObjectLocation>,
}

impl ObjectIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start issuing handles at `seed`, e.g. the `$HANDSEED` of a loaded file.
    pub fn with_seed(seed: HandleSeed) -> Self {
        Self {
            seed,
            objects: HashMap::new(),
        }
    }

    pub fn handle_seed(&self) -> HandleSeed {
        self.seed
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, handle: Handle) -> Option<&ObjectLocation> {
        self.objects.get(&handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle, &ObjectLocation)> {
        self.objects.iter().map(|(h, l)| (*h, l))
    }
}

impl ObjectOwner for ObjectIndex {
    fn allocate_handle(&mut self) -> Handle {
        let (handle, next) = self.seed.allocate();
        self.seed = next;
        handle
    }

    fn location(&self, handle: Handle) -> Option<ObjectLocation> {
        self.objects.get(&handle).copied()
    }

    fn contains_handle(&self, handle: Handle) -> bool {
        self.objects.contains_key(&handle)
    }

    fn register(&mut self, handle: Handle, location: ObjectLocation) {
        self.seed = self.seed.observe(handle);
        if let Some(prev) = self.objects.insert(handle, location) {
            tracing::warn!(%handle, ?prev, "handle re-registered; previous object dropped from index");
        }
    }

    fn unregister(&mut self, handle: Handle) -> Option<ObjectLocation> {
        self.objects.remove(&handle)
    }
}

/// A document with the standard symbol tables.
///
/// Fields are public so a table and the index can be borrowed at the same
/// time: `doc.layers.add(&mut doc.objects, layer, false)`.
pub struct Document {
    pub objects: ObjectIndex,
    pub app_registries: TableObjectRegistry<ApplicationRegistry>,
    pub layers: TableObjectRegistry<Layer>,
    pub linetypes: TableObjectRegistry<Linetype>,
    pub text_styles: TableObjectRegistry<TextStyle>,
}

impl Document {
    /// A document holding the reserved entries every DXF file must have.
    pub fn new() -> Self {
        let mut doc = Self::empty();
        doc.add_reserved_defaults()
            .expect("empty tables accept their reserved defaults");
        doc
    }

    /// Add each table's reserved baseline entries. Entries already present
    /// are left as they are, so this also completes a loaded document.
    pub fn add_reserved_defaults(&mut self) -> Result<(), TableError> {
        let objects = &mut self.objects;
        self.app_registries
            .add(objects, ApplicationRegistry::default_registry(), true)?;
        self.layers.add(objects, Layer::default_layer(), true)?;
        self.linetypes.add(objects, Linetype::by_layer(), true)?;
        self.linetypes.add(objects, Linetype::by_block(), true)?;
        self.linetypes.add(objects, Linetype::continuous(), true)?;
        self.text_styles
            .add(objects, TextStyle::default_style(), true)?;
        Ok(())
    }

    /// A document with empty tables, e.g. as the target of a file reader.
    pub fn empty() -> Self {
        Self {
            objects: ObjectIndex::new(),
            app_registries: TableObjectRegistry::new(),
            layers: TableObjectRegistry::new(),
            linetypes: TableObjectRegistry::new(),
            text_styles: TableObjectRegistry::new(),
        }
    }

    /// Resolve a handle through the object index to the entry's name.
    pub fn name_of(&self, handle: Handle) -> Option<&str> {
        let loc = self.objects.get(handle)?;
        match loc.kind {
            TableKind::ApplicationRegistry => self.app_registries.entry(loc.entry).map(|e| e.name()),
            TableKind::Layer => self.layers.entry(loc.entry).map(|e| e.name()),
            TableKind::Linetype => self.linetypes.entry(loc.entry).map(|e| e.name()),
            TableKind::TextStyle => self.text_styles.entry(loc.entry).map(|e| e.name()),
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
