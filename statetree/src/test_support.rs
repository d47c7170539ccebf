//! Test-only helpers for constructing module descriptors.

use serde_json::Value;

use crate::module::{Module, ModuleHandle};

/// Create a module with no children and null defaults.
pub fn module(name: &str) -> ModuleHandle {
    Module::new(name).into_handle()
}

/// Create a module nesting the given children, in order.
pub fn module_with_children(name: &str, children: &[&ModuleHandle]) -> ModuleHandle {
    let mut module = Module::new(name);
    for child in children {
        module = module.with_child(child);
    }
    module.into_handle()
}

/// Create a leaf module with explicit defaults.
pub fn module_with_defaults(name: &str, defaults: Value) -> ModuleHandle {
    Module::new(name).with_defaults(defaults).into_handle()
}
