use std::sync::Arc;

use serde_json::Value;

/// Shared handle to a module descriptor.
///
/// Module identity is handle identity (`Arc::ptr_eq`); the same descriptor
/// value registered twice under different handles is two distinct modules.
pub type ModuleHandle = Arc<Module>;

/// A unit of state with optional nested child modules.
#[derive(Debug, Clone)]
pub struct Module {
    /// Unique module name; becomes the final segment of the dotted path.
    pub name: String,
    /// Direct children nested beneath this module's state slice.
    pub children: Vec<ModuleHandle>,
    /// Initial value for this module's state slice. Opaque to the planner.
    pub defaults: Value,
    /// Declared action names. Opaque to the planner; the registry qualifies
    /// them with the module's resolved path.
    pub actions: Vec<String>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            defaults: Value::Null,
            actions: Vec::new(),
        }
    }

    pub fn with_defaults(mut self, defaults: Value) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_child(mut self, child: &ModuleHandle) -> Self {
        self.children.push(Arc::clone(child));
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.actions.push(action.into());
        self
    }

    pub fn into_handle(self) -> ModuleHandle {
        Arc::new(self)
    }
}
