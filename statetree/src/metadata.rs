//! Identity-keyed metadata records for registered modules.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::core::accessor::Accessor;
use crate::module::ModuleHandle;

/// Mutable per-module record owned by the metadata store.
///
/// The graph builder, resolver, and sorter operate on derived snapshots of
/// this data; only the registry writes the computed `path`, qualified
/// actions, and cached getter back in.
#[derive(Clone, Default)]
pub struct ModuleRecord {
    pub name: String,
    /// Declared action name -> path-qualified action type.
    pub actions: BTreeMap<String, String>,
    /// Initial value for the module's state slice.
    pub defaults: Value,
    /// Full dotted path; written back once resolution succeeds.
    pub path: Option<String>,
    pub children: Vec<ModuleHandle>,
    /// Accessor cached per distinct path; recompiled only when the path
    /// changes, which does not happen after registration completes.
    pub getter: Option<Accessor>,
}

impl fmt::Debug for ModuleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRecord")
            .field("name", &self.name)
            .field("actions", &self.actions)
            .field("defaults", &self.defaults)
            .field("path", &self.path)
            .field(
                "children",
                &self.children.iter().map(|child| child.name.as_str()).collect::<Vec<_>>(),
            )
            .field("getter", &self.getter.as_ref().map(|_| "<accessor>"))
            .finish()
    }
}

#[derive(Debug)]
struct Entry {
    /// Keeps the handle alive so its address can never be reused by a new
    /// allocation while the record exists.
    _module: ModuleHandle,
    record: ModuleRecord,
}

/// Identity-keyed store associating a mutable record with each module handle.
///
/// Owned by the registry, with explicit teardown via [`MetadataStore::clear`]
/// (intended only for full application restart). Absence of a record is a
/// valid, representable state.
#[derive(Debug, Default)]
pub struct MetadataStore {
    entries: HashMap<usize, Entry>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the record for `module`, first attaching a fresh default record
    /// if none exists.
    ///
    /// Attachment happens exactly once per module; subsequent calls return
    /// the same record.
    pub fn ensure(&mut self, module: &ModuleHandle) -> &mut ModuleRecord {
        let entry = self.entries.entry(key_of(module)).or_insert_with(|| Entry {
            _module: Arc::clone(module),
            record: ModuleRecord::default(),
        });
        &mut entry.record
    }

    /// Return the existing record without creating one.
    pub fn get(&self, module: &ModuleHandle) -> Option<&ModuleRecord> {
        self.entries.get(&key_of(module)).map(|entry| &entry.record)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every record. Intended for full application teardown only.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn key_of(module: &ModuleHandle) -> usize {
    Arc::as_ptr(module) as usize
}
