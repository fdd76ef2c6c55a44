//! Per-request execution context.
//!
//! A [`Context`] is an immutable chain of key/value entries. Deriving a child
//! never touches the parent, so a context can be cloned into any number of
//! tasks without locks:
//!
//! ```text
//! Context::new()                      ← empty, the root of every chain
//!        ↓ with_value::<A>(a)
//! [A = a] ──→ root
//!        ↓ with_value::<B>(b)
//! [B = b] ──→ [A = a] ──→ root        ← lookups walk towards the root
//! ```
//!
//! Keys are *types*. A key type that is private to a module is a token no
//! other crate or module can name, so entries never collide.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A type usable as a context key.
///
/// ```rust
/// use rlog::context::{Context, Key};
///
/// struct TenantKey;
///
/// impl Key for TenantKey {
///     type Value = String;
/// }
///
/// let ctx = Context::new().with_value::<TenantKey>("acme".to_owned());
/// assert_eq!(ctx.value::<TenantKey>().map(String::as_str), Some("acme"));
/// ```
pub trait Key: 'static {
    type Value: Send + Sync + 'static;
}

struct Entry {
    key: TypeId,
    value: Box<dyn Any + Send + Sync>,
    parent: Option<Arc<Entry>>,
}

/// An immutable, derivable key/value carrier attached to each request.
#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Entry>>,
}

impl Context {
    pub fn new() -> Self {
        Self { head: None }
    }

    /// Returns a child context holding `value` under `K`.
    ///
    /// `self` is left untouched. If an ancestor already holds `K`, the child's
    /// entry shadows it.
    pub fn with_value<K: Key>(&self, value: K::Value) -> Self {
        let entry = Entry {
            key: TypeId::of::<K>(),
            value: Box::new(value),
            parent: self.head.clone(),
        };
        Self { head: Some(Arc::new(entry)) }
    }

    /// Returns the value stored under `K` by the nearest ancestor, if any.
    pub fn value<K: Key>(&self) -> Option<&K::Value> {
        let key = TypeId::of::<K>();
        let mut cursor = self.head.as_deref();
        while let Some(entry) = cursor {
            if entry.key == key {
                return entry.value.downcast_ref();
            }
            cursor = entry.parent.as_deref();
        }
        None
    }

    fn depth(&self) -> usize {
        let mut depth = 0;
        let mut cursor = self.head.as_deref();
        while let Some(entry) = cursor {
            depth += 1;
            cursor = entry.parent.as_deref();
        }
        depth
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context").field("entries", &self.depth()).finish()
    }
}
