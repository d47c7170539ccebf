//! Registration, planning, and snapshot publication.
//!
//! The registry is the single-writer front door: modules are registered and
//! the plan rebuilt during the application's bootstrap sequence (`&mut`
//! methods), while the published [`Snapshot`] is immutable and cheaply shared
//! by any number of concurrent readers through `Arc` clones.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::core::accessor::{Accessor, prop_getter};
use crate::core::graph::{GraphError, ModuleGraph, build_graph};
use crate::core::paths::{PathError, find_full_parent_path};
use crate::core::sort::{SortError, topological_sort};
use crate::metadata::MetadataStore;
use crate::module::ModuleHandle;

/// Fatal conditions while rebuilding the plan.
///
/// These are programming errors in module declarations, not transient
/// conditions: the whole pass aborts, nothing is written back or published,
/// and there is no retry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    Sort(#[from] SortError),
}

/// Immutable published plan: graph, path map, initialization order, and the
/// per-module accessors.
pub struct Snapshot {
    graph: ModuleGraph,
    paths: BTreeMap<String, String>,
    order: Vec<String>,
    getters: BTreeMap<String, Accessor>,
}

impl Snapshot {
    pub fn graph(&self) -> &ModuleGraph {
        &self.graph
    }

    /// Module name -> full dotted path.
    pub fn paths(&self) -> &BTreeMap<String, String> {
        &self.paths
    }

    /// Initialization order, children before the modules that contain them.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn path_of(&self, name: &str) -> Option<&str> {
        self.paths.get(name).map(String::as_str)
    }

    pub fn getter(&self, name: &str) -> Option<&Accessor> {
        self.getters.get(name)
    }

    /// Read `name`'s state slice out of `root` using its cached accessor.
    pub fn read<'a>(&self, name: &str, root: &'a Value) -> Option<&'a Value> {
        self.getter(name).and_then(|getter| getter(root))
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("graph", &self.graph)
            .field("paths", &self.paths)
            .field("order", &self.order)
            .field("getters", &self.getters.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Single-writer module registry and initialization planner.
///
/// Rebuilding constructs the next snapshot in full before replacing the
/// published one in a single assignment, so readers holding an `Arc` never
/// observe a partial plan; they keep a consistent old view until they
/// re-fetch.
pub struct Registry {
    config: StoreConfig,
    modules: Vec<ModuleHandle>,
    metadata: MetadataStore,
    published: Option<Arc<Snapshot>>,
}

impl Registry {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            modules: Vec::new(),
            metadata: MetadataStore::new(),
            published: None,
        }
    }

    /// Register `module`, seeding its metadata record from the descriptor.
    ///
    /// Idempotent by handle identity. Registration order is preserved; it
    /// drives key order in the graph and therefore every deterministic
    /// computation downstream.
    pub fn register(&mut self, module: &ModuleHandle) {
        if self.modules.iter().any(|existing| Arc::ptr_eq(existing, module)) {
            return;
        }
        let record = self.metadata.ensure(module);
        record.name = module.name.clone();
        record.defaults = module.defaults.clone();
        record.children = module.children.clone();
        self.modules.push(Arc::clone(module));
        debug!(module = %module.name, "registered module");
    }

    /// Recompute graph, paths, and order from scratch and publish the result.
    ///
    /// On error nothing is written back to metadata records and the
    /// previously published snapshot (if any) stays visible.
    pub fn rebuild(&mut self) -> Result<Arc<Snapshot>, BuildError> {
        let graph = build_graph(&self.modules)?;
        let paths = find_full_parent_path(&graph)?;
        let order = topological_sort(&graph)?;
        debug!(modules = graph.len(), "resolved module graph");

        let mut getters = BTreeMap::new();
        for module in &self.modules {
            // Every registered module is a graph key, so resolution produced
            // a path for it; the fallback is unreachable.
            let path = paths
                .get(&module.name)
                .cloned()
                .unwrap_or_else(|| module.name.clone());

            let record = self.metadata.ensure(module);
            let path_unchanged = record.path.as_deref() == Some(path.as_str());
            if !path_unchanged || record.getter.is_none() {
                let segments: Vec<String> = path.split('.').map(str::to_string).collect();
                record.getter = Some(prop_getter(&segments, &self.config));
            }
            record.path = Some(path.clone());
            record.actions = module
                .actions
                .iter()
                .map(|action| (action.clone(), format!("{path}/{action}")))
                .collect();
            if let Some(getter) = &record.getter {
                getters.insert(module.name.clone(), Arc::clone(getter));
            }
        }

        let snapshot = Arc::new(Snapshot {
            graph,
            paths,
            order,
            getters,
        });
        self.published = Some(Arc::clone(&snapshot));
        info!(modules = self.modules.len(), "published initialization plan");
        Ok(snapshot)
    }

    /// The currently published plan, if a rebuild has succeeded.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.published.clone()
    }

    /// Assemble the initial state tree from module defaults.
    ///
    /// Slices are inserted parents-before-children (reverse initialization
    /// order) so a child's slice grafts into its parent's object and wins
    /// over any same-named key the parent's defaults carried. Returns
    /// `Value::Null` when no plan is published.
    pub fn initial_state(&self) -> Value {
        let Some(snapshot) = &self.published else {
            return Value::Null;
        };
        let mut root = Value::Object(Map::new());
        for name in snapshot.order().iter().rev() {
            let Some(path) = snapshot.path_of(name) else {
                continue;
            };
            let defaults = self
                .modules
                .iter()
                .find(|module| module.name == *name)
                .map(|module| module.defaults.clone())
                .unwrap_or(Value::Null);
            insert_at_path(&mut root, path, defaults);
        }
        root
    }

    pub fn metadata(&self) -> &MetadataStore {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut MetadataStore {
        &mut self.metadata
    }
}

/// Insert `value` at the dotted `path`, creating (or overwriting non-object)
/// intermediate objects along the way.
fn insert_at_path(root: &mut Value, path: &str, value: Value) {
    let mut current = root;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        let Value::Object(map) = current else {
            return;
        };
        if segments.peek().is_none() {
            map.insert(segment.to_string(), value);
            return;
        }
        let next = map.entry(segment).or_insert_with(|| Value::Object(Map::new()));
        if !next.is_object() {
            *next = Value::Object(Map::new());
        }
        current = next;
    }
}
