//! Request-scoped key/value context.
//!
//! # Design
//! An immutable chain of layers: `with_value` never mutates, it returns a
//! new context whose head layer references the previous chain. Lookups walk
//! from the innermost layer outward, so a later binding shadows an earlier
//! one with the same key. The empty chain is the always-open root context.
//!
//! The whole chain is `Clone + Send + Sync`, so a context can be attached
//! to a request through `http::Extensions` and read back by the handler
//! under test.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// An immutable chain of request-scoped key/value bindings.
#[derive(Clone, Default)]
pub struct RequestContext {
    head: Option<Arc<Layer>>,
}

struct Layer {
    key: String,
    value: Arc<dyn Any + Send + Sync>,
    parent: Option<Arc<Layer>>,
}

impl RequestContext {
    /// The root context: no bindings, never cancelled, always open.
    pub fn background() -> Self {
        Self { head: None }
    }

    /// Returns a new context with `key` bound to `value`, layered on top of
    /// `self`. The previous binding for `key`, if any, is shadowed but not
    /// removed.
    #[must_use]
    pub fn with_value<V>(&self, key: impl Into<String>, value: V) -> Self
    where
        V: Any + Send + Sync,
    {
        Self {
            head: Some(Arc::new(Layer {
                key: key.into(),
                value: Arc::new(value),
                parent: self.head.clone(),
            })),
        }
    }

    /// Looks up the innermost binding for `key` and downcasts it to `V`.
    ///
    /// Returns `None` when the key is unbound, or when the innermost
    /// binding for the key holds a different type.
    pub fn value<V: Any>(&self, key: &str) -> Option<&V> {
        let mut layer = self.head.as_deref();
        while let Some(current) = layer {
            if current.key == key {
                return current.value.downcast_ref::<V>();
            }
            layer = current.parent.as_deref();
        }
        None
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys = Vec::new();
        let mut layer = self.head.as_deref();
        while let Some(current) = layer {
            keys.push(current.key.as_str());
            layer = current.parent.as_deref();
        }
        f.debug_struct("RequestContext").field("keys", &keys).finish()
    }
}
