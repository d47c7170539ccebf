//! Adjacency-map construction from the registered module list.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::module::ModuleHandle;

/// Fatal conditions while building the module graph.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GraphError {
    /// A declared child is missing from the registered module list.
    #[error(
        "module '{parent}' declares child '{child}' which is not in the registered module list; did you forget to register it?"
    )]
    UnknownChild { parent: String, child: String },
    /// Two registered modules share a name. The adjacency map is name-keyed,
    /// so the collision would silently merge them.
    #[error("module name '{name}' is registered more than once; module names must be unique")]
    DuplicateName { name: String },
}

/// Insertion-ordered adjacency map: module name -> ordered direct child names.
///
/// Key iteration follows insertion order so every derived computation (paths,
/// initialization order) is deterministic for identical input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleGraph {
    names: Vec<String>,
    children: HashMap<String, Vec<String>>,
}

impl ModuleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph directly from `(name, children)` pairs.
    ///
    /// Enforces the closed-world invariant: every name referenced as a child
    /// must also appear as a node.
    pub fn from_pairs<S>(pairs: impl IntoIterator<Item = (S, Vec<S>)>) -> Result<Self, GraphError>
    where
        S: Into<String>,
    {
        let mut graph = Self::new();
        for (name, children) in pairs {
            graph.insert(name, children.into_iter().map(Into::into).collect())?;
        }
        for name in graph.names() {
            for child in graph.children_of(name).unwrap_or(&[]) {
                if !graph.contains(child) {
                    return Err(GraphError::UnknownChild {
                        parent: name.to_string(),
                        child: child.clone(),
                    });
                }
            }
        }
        Ok(graph)
    }

    /// Insert a node with its ordered child names.
    pub fn insert(&mut self, name: impl Into<String>, children: Vec<String>) -> Result<(), GraphError> {
        let name = name.into();
        if self.children.contains_key(&name) {
            return Err(GraphError::DuplicateName { name });
        }
        self.names.push(name.clone());
        self.children.insert(name, children);
        Ok(())
    }

    /// Node names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Ordered direct children of `name`, or `None` if the node is unknown.
    pub fn children_of(&self, name: &str) -> Option<&[String]> {
        self.children.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.children.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Build the name-keyed adjacency map from the full registered module list.
///
/// Each declared child is resolved to its name by identity-searching the full
/// list. An unregistered child is a fatal error; continuing would produce a
/// silently incomplete tree.
pub fn build_graph(modules: &[ModuleHandle]) -> Result<ModuleGraph, GraphError> {
    let mut graph = ModuleGraph::new();
    for module in modules {
        let mut child_names = Vec::with_capacity(module.children.len());
        for child in &module.children {
            match modules.iter().find(|candidate| Arc::ptr_eq(candidate, child)) {
                Some(registered) => child_names.push(registered.name.clone()),
                None => {
                    return Err(GraphError::UnknownChild {
                        parent: module.name.clone(),
                        child: child.name.clone(),
                    });
                }
            }
        }
        graph.insert(module.name.clone(), child_names)?;
    }
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{module, module_with_children};

    /// Nested cart modules produce a name-keyed adjacency map.
    #[test]
    fn build_graph_maps_names_to_child_names() {
        let items = module("items");
        let saved = module_with_children("saved", &[&items]);
        let cart = module_with_children("cart", &[&saved]);

        let graph = build_graph(&[cart, saved, items]).expect("graph");

        assert_eq!(graph.children_of("cart").expect("cart"), &["saved"]);
        assert_eq!(graph.children_of("saved").expect("saved"), &["items"]);
        assert_eq!(graph.children_of("items").expect("items"), &[] as &[&str]);
    }

    /// Key order follows the order modules were registered in.
    #[test]
    fn build_graph_preserves_registration_order() {
        let items = module("items");
        let saved = module_with_children("saved", &[&items]);
        let cart = module_with_children("cart", &[&saved]);

        let graph = build_graph(&[cart, saved, items]).expect("graph");

        let names: Vec<&str> = graph.names().collect();
        assert_eq!(names, ["cart", "saved", "items"]);
    }

    /// A declared child that was never registered fails at build time.
    #[test]
    fn build_graph_errors_on_unregistered_child() {
        let orphan = module("orphan");
        let cart = module_with_children("cart", &[&orphan]);

        let err = build_graph(&[cart]).expect_err("expected error");

        assert_eq!(
            err,
            GraphError::UnknownChild {
                parent: "cart".to_string(),
                child: "orphan".to_string(),
            }
        );
        assert!(err.to_string().contains("did you forget to register it?"));
    }

    /// Children are matched by handle identity, not by name.
    #[test]
    fn build_graph_errors_when_child_is_a_different_instance() {
        let registered_items = module("items");
        let unregistered_items = module("items");
        let cart = module_with_children("cart", &[&unregistered_items]);

        let err = build_graph(&[cart, registered_items]).expect_err("expected error");
        assert!(matches!(err, GraphError::UnknownChild { .. }));
    }

    /// Duplicate module names would silently merge nodes in a name-keyed map.
    #[test]
    fn build_graph_errors_on_duplicate_name() {
        let first = module("cart");
        let second = module("cart");

        let err = build_graph(&[first, second]).expect_err("expected error");
        assert_eq!(
            err,
            GraphError::DuplicateName {
                name: "cart".to_string()
            }
        );
    }

    /// `from_pairs` rejects edges pointing at names with no node.
    #[test]
    fn from_pairs_enforces_closed_world() {
        let err = ModuleGraph::from_pairs([("cart", vec!["saved"])]).expect_err("expected error");
        assert_eq!(
            err,
            GraphError::UnknownChild {
                parent: "cart".to_string(),
                child: "saved".to_string(),
            }
        );
    }
}
