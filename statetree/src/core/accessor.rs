//! Path accessor compilation: reading a nested value out of a root state value.

use std::sync::Arc;

use serde_json::Value;

use crate::config::StoreConfig;

/// Reader closure returning the value at a fixed dotted path, or `None` when
/// any intermediate segment is missing or falsy.
pub type Accessor = Arc<dyn for<'a> Fn(&'a Value) -> Option<&'a Value> + Send + Sync>;

/// How accessors evaluate their path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorStrategy {
    /// Fold the segments into a closure chain once; cheapest per call.
    Compiled,
    /// Walk the segment list on every call; no build-time cost.
    Interpreted,
}

impl AccessorStrategy {
    /// Strategy selection is a pure function of configuration; no other
    /// component decides.
    pub fn for_config(config: &StoreConfig) -> Self {
        if config.strict_content_security_policy {
            Self::Interpreted
        } else {
            Self::Compiled
        }
    }
}

/// Compile an accessor for `segments` using the configured strategy.
///
/// Both strategies are referentially equivalent: a missing *or falsy* value
/// at any non-terminal segment yields `None` (a `0`, `""`, or `false`
/// intermediate short-circuits even though the key exists — legacy behavior
/// that callers rely on), while a falsy value at the terminal segment is
/// returned as-is. An empty segment list yields the root itself.
pub fn prop_getter(segments: &[String], config: &StoreConfig) -> Accessor {
    match AccessorStrategy::for_config(config) {
        AccessorStrategy::Compiled => compiled_getter(segments),
        AccessorStrategy::Interpreted => interpreted_getter(segments),
    }
}

/// Walk `segments` against the root object on every invocation.
pub fn interpreted_getter(segments: &[String]) -> Accessor {
    let segments = segments.to_vec();
    Arc::new(move |root: &Value| {
        let mut current = root;
        for (index, segment) in segments.iter().enumerate() {
            let next = current.get(segment)?;
            if index + 1 < segments.len() && !is_truthy(next) {
                return None;
            }
            current = next;
        }
        Some(current)
    })
}

/// Fold `segments` into a chain of step closures, once, at build time.
///
/// The legacy system synthesized a guarded `store.a && store.a.b && ...`
/// expression from a string here. Runtime code generation is not available
/// (nor wanted) in Rust, so the chain is built as nested closures instead:
/// compilation cost is paid once and each call runs the pre-bound steps
/// without touching the segment list again.
pub fn compiled_getter(segments: &[String]) -> Accessor {
    type Step = Box<dyn for<'a> Fn(&'a Value) -> Option<&'a Value> + Send + Sync>;

    let Some((last, inner)) = segments.split_last() else {
        return Arc::new(|root: &Value| Some(root));
    };

    let mut chain: Step = Box::new(|root: &Value| Some(root));
    for segment in inner {
        let segment = segment.clone();
        let prev = chain;
        chain = Box::new(move |root: &Value| {
            let value = prev(root)?.get(&segment)?;
            if is_truthy(value) { Some(value) } else { None }
        });
    }

    let last = last.clone();
    Arc::new(move |root: &Value| chain(root)?.get(&last))
}

/// Truthiness as the legacy accessor expressions saw it: `null`, `false`,
/// numeric zero, and the empty string are falsy; containers are always truthy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
