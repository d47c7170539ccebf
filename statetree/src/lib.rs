//! Hierarchical module registry and dependency-ordered initialization planner
//! for a tree-structured application state container.
//!
//! State modules declare parent/child relationships; this crate assigns each
//! module a unique dotted path, derives a children-before-parents
//! initialization order (rejecting cycles), and compiles per-path accessor
//! closures for reading nested values out of the global state tree. The
//! architecture enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (graph building, path resolution,
//!   topological sorting, accessor compilation). No I/O, fully testable in
//!   isolation.
//! - **[`registry`] / [`metadata`]**: Single-writer bootstrap state. The
//!   registry recomputes the whole plan from scratch and publishes it as an
//!   immutable snapshot shared by concurrent readers.
//! - **[`config`] / [`logging`]**: Ambient concerns — the strict-CSP
//!   compatibility flag with its TOML form, and `RUST_LOG`-driven dev
//!   diagnostics.

pub mod config;
pub mod core;
pub mod logging;
pub mod metadata;
pub mod module;
pub mod registry;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
