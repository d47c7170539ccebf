//! Full dotted-path resolution over the module graph.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use crate::core::graph::ModuleGraph;

/// Fatal conditions while resolving module paths.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PathError {
    /// Nested modules must form a tree: one parent per module. Two parents
    /// would leave the child's state reachable under two different paths.
    #[error(
        "module '{child}' is declared as a child of both '{first}' and '{second}'; nested modules must form a tree"
    )]
    MultipleParents {
        child: String,
        first: String,
        second: String,
    },
    /// Closed-world violation: an edge references a name with no node.
    #[error("module '{parent}' references child '{child}' which has no node in the graph")]
    UnknownChild { parent: String, child: String },
    /// Parent links loop back on themselves, so no root ancestor exists.
    #[error("module '{name}' has cyclic ancestry; its full path cannot be resolved")]
    CyclicAncestry { name: String },
}

/// Compute each node's full dotted path from its ancestors.
///
/// Walks parent links root-ward for every node and joins the discovered
/// ancestry root-to-leaf with `.`; a parentless node's path is its own name.
/// Pure function of the graph; callers write the result back into module
/// metadata records.
pub fn find_full_parent_path(graph: &ModuleGraph) -> Result<BTreeMap<String, String>, PathError> {
    let parents = parent_index(graph)?;
    let mut paths = BTreeMap::new();
    for name in graph.names() {
        let mut segments = vec![name];
        let mut current = name;
        while let Some(parent) = parents.get(current) {
            // An upward walk longer than the node count means the parent
            // links loop; bail out instead of spinning forever.
            if segments.len() > graph.len() {
                return Err(PathError::CyclicAncestry {
                    name: name.to_string(),
                });
            }
            segments.push(parent);
            current = parent;
        }
        segments.reverse();
        paths.insert(name.to_string(), segments.join("."));
    }
    Ok(paths)
}

/// Build the child -> parent index, rejecting multi-parent claims.
fn parent_index<'a>(graph: &'a ModuleGraph) -> Result<HashMap<&'a str, &'a str>, PathError> {
    let mut parents: HashMap<&str, &str> = HashMap::new();
    for name in graph.names() {
        for child in graph.children_of(name).unwrap_or(&[]) {
            if !graph.contains(child) {
                return Err(PathError::UnknownChild {
                    parent: name.to_string(),
                    child: child.clone(),
                });
            }
            if let Some(first) = parents.get(child.as_str()) {
                return Err(PathError::MultipleParents {
                    child: child.clone(),
                    first: (*first).to_string(),
                    second: name.to_string(),
                });
            }
            parents.insert(child, name);
        }
    }
    Ok(parents)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(pairs: &[(&str, &[&str])]) -> ModuleGraph {
        ModuleGraph::from_pairs(
            pairs
                .iter()
                .map(|(name, children)| (name.to_string(), children.iter().map(|c| c.to_string()).collect())),
        )
        .expect("graph")
    }

    /// Paths are assembled root-to-leaf with `.` separators.
    #[test]
    fn resolves_nested_paths_from_ancestors() {
        let graph = graph(&[("cart", &["saved"]), ("saved", &["items"]), ("items", &[])]);

        let paths = find_full_parent_path(&graph).expect("paths");

        assert_eq!(paths["cart"], "cart");
        assert_eq!(paths["saved"], "cart.saved");
        assert_eq!(paths["items"], "cart.saved.items");
    }

    /// A parentless node's path is its own name.
    #[test]
    fn root_path_is_node_name() {
        let graph = graph(&[("session", &[])]);

        let paths = find_full_parent_path(&graph).expect("paths");
        assert_eq!(paths["session"], "session");
    }

    /// Independent trees resolve side by side.
    #[test]
    fn resolves_a_forest_of_roots() {
        let graph = graph(&[
            ("cart", &["items"]),
            ("items", &[]),
            ("session", &["user"]),
            ("user", &[]),
        ]);

        let paths = find_full_parent_path(&graph).expect("paths");

        assert_eq!(paths["items"], "cart.items");
        assert_eq!(paths["user"], "session.user");
        assert_eq!(paths.len(), 4);
    }

    /// A node claimed by two parents is ambiguous and rejected.
    #[test]
    fn rejects_multiple_parents() {
        let graph = graph(&[("cart", &["items"]), ("wishlist", &["items"]), ("items", &[])]);

        let err = find_full_parent_path(&graph).expect_err("expected error");

        assert_eq!(
            err,
            PathError::MultipleParents {
                child: "items".to_string(),
                first: "cart".to_string(),
                second: "wishlist".to_string(),
            }
        );
    }

    /// Dangling edges violate the closed-world invariant.
    #[test]
    fn rejects_unknown_child_names() {
        let mut graph = ModuleGraph::new();
        graph.insert("cart", vec!["ghost".to_string()]).expect("insert");

        let err = find_full_parent_path(&graph).expect_err("expected error");
        assert_eq!(
            err,
            PathError::UnknownChild {
                parent: "cart".to_string(),
                child: "ghost".to_string(),
            }
        );
    }

    /// Looping parent links fail instead of walking forever.
    #[test]
    fn rejects_cyclic_ancestry() {
        let mut graph = ModuleGraph::new();
        graph.insert("a", vec!["b".to_string()]).expect("insert");
        graph.insert("b", vec!["a".to_string()]).expect("insert");

        let err = find_full_parent_path(&graph).expect_err("expected error");
        assert!(matches!(err, PathError::CyclicAncestry { .. }));
    }

    /// Identical input graphs resolve to identical path maps.
    #[test]
    fn resolution_is_deterministic() {
        let first = graph(&[("cart", &["saved"]), ("saved", &["items"]), ("items", &[])]);
        let second = graph(&[("cart", &["saved"]), ("saved", &["items"]), ("items", &[])]);

        assert_eq!(
            find_full_parent_path(&first).expect("paths"),
            find_full_parent_path(&second).expect("paths"),
        );
    }
}
