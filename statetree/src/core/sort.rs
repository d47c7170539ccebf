//! Children-before-parents initialization ordering with cycle detection.

use std::collections::HashSet;

use thiserror::Error;

use crate::core::graph::ModuleGraph;

/// A module transitively depends on itself.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error(
    "circular module dependency '{from}' -> '{to}' (dependency chain: {})",
    .chain.join(" -> ")
)]
pub struct CycleError {
    /// Tail of the edge that closed the cycle.
    pub from: String,
    /// Head of the edge that closed the cycle.
    pub to: String,
    /// Ancestor chain active when the cycle was found, outermost first.
    pub chain: Vec<String>,
}

/// Fatal conditions while ordering modules.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SortError {
    #[error(transparent)]
    Cycle(#[from] CycleError),
    /// Closed-world violation: an edge references a name with no node.
    #[error("module '{parent}' references child '{child}' which has no node in the graph")]
    UnknownChild { parent: String, child: String },
}

/// Order module names so every child precedes the module that contains it.
///
/// Depth-first from each node in declaration order, traversing children in
/// their declared order; fully-processed nodes are memoized and never
/// revisited, so diamonds reached via multiple parents appear once. Nodes are
/// appended after their children, which yields the children-before-parents
/// sequence directly. The sort is stable: identical input order produces
/// identical output on every run.
pub fn topological_sort(graph: &ModuleGraph) -> Result<Vec<String>, SortError> {
    let mut sorted = Vec::with_capacity(graph.len());
    let mut visited = HashSet::new();
    let mut ancestors = Vec::new();
    for name in graph.names() {
        visit(graph, name, &mut ancestors, &mut visited, &mut sorted)?;
    }
    Ok(sorted)
}

fn visit(
    graph: &ModuleGraph,
    name: &str,
    ancestors: &mut Vec<String>,
    visited: &mut HashSet<String>,
    sorted: &mut Vec<String>,
) -> Result<(), SortError> {
    if visited.contains(name) {
        return Ok(());
    }
    let Some(children) = graph.children_of(name) else {
        let parent = ancestors.last().cloned().unwrap_or_else(|| name.to_string());
        return Err(SortError::UnknownChild {
            parent,
            child: name.to_string(),
        });
    };

    ancestors.push(name.to_string());
    for child in children {
        if ancestors.iter().any(|ancestor| ancestor == child) {
            return Err(SortError::Cycle(CycleError {
                from: name.to_string(),
                to: child.clone(),
                chain: ancestors.clone(),
            }));
        }
        visit(graph, child, ancestors, visited, sorted)?;
    }
    ancestors.pop();

    visited.insert(name.to_string());
    sorted.push(name.to_string());
    Ok(())
}
