//! Immutable key/value context carrier
//!
//! `Context` is a persistent linked list of key/value associations. Deriving a
//! child with [`Context::with_value`] never changes the parent, and lookups
//! walk from the newest association to the oldest so nested values shadow
//! outer ones. A logger can be attached under a private key with
//! [`Logger::with_context`](crate::Logger::with_context) and recovered with
//! [`from_context`].

use super::logger::Logger;
use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

type ContextValue = Arc<dyn Any + Send + Sync>;

/// Key under which a value is stored in a [`Context`].
///
/// Named keys compare by name. Type keys are built from a Rust type and
/// cannot collide with any named key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextKey(KeyRepr);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum KeyRepr {
    Named(Cow<'static, str>),
    Typed(TypeId, &'static str),
}

impl ContextKey {
    pub const fn named(name: &'static str) -> Self {
        ContextKey(KeyRepr::Named(Cow::Borrowed(name)))
    }

    /// A key derived from the type `T`, unique to that type.
    pub fn of<T: Any>() -> Self {
        ContextKey(KeyRepr::Typed(TypeId::of::<T>(), std::any::type_name::<T>()))
    }
}

impl From<&'static str> for ContextKey {
    fn from(name: &'static str) -> Self {
        ContextKey::named(name)
    }
}

impl From<String> for ContextKey {
    fn from(name: String) -> Self {
        ContextKey(KeyRepr::Named(Cow::Owned(name)))
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            KeyRepr::Named(name) => f.write_str(name),
            KeyRepr::Typed(_, name) => write!(f, "<{}>", name),
        }
    }
}

struct Node {
    key: ContextKey,
    value: Option<ContextValue>,
    parent: Option<Arc<Node>>,
}

/// Cheaply clonable, immutable context.
#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Node>>,
}

impl Context {
    /// An empty root context.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a child context carrying `value` under `key`.
    #[must_use]
    pub fn with_value<T>(&self, key: impl Into<ContextKey>, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        self.push(key.into(), Some(Arc::new(value)))
    }

    /// Derive a child context carrying an explicit nil under `key`.
    #[must_use]
    pub fn with_nil(&self, key: impl Into<ContextKey>) -> Self {
        self.push(key.into(), None)
    }

    fn push(&self, key: ContextKey, value: Option<ContextValue>) -> Self {
        Self {
            head: Some(Arc::new(Node {
                key,
                value,
                parent: self.head.clone(),
            })),
        }
    }

    fn lookup(&self, key: &ContextKey) -> Option<&Node> {
        let mut current = self.head.as_deref();
        while let Some(node) = current {
            if &node.key == key {
                return Some(node);
            }
            current = node.parent.as_deref();
        }
        None
    }

    /// The value stored under `key`; absent keys and explicit nils both yield `None`.
    pub fn value(&self, key: &ContextKey) -> Option<&(dyn Any + Send + Sync)> {
        self.lookup(key).and_then(|node| node.value.as_deref())
    }

    /// The value under `key` if it has type `T`.
    pub fn value_as<T: Any>(&self, key: &ContextKey) -> Option<&T> {
        self.value(key).and_then(|value| value.downcast_ref::<T>())
    }

    /// Whether `key` was ever associated, including with an explicit nil.
    pub fn contains_key(&self, key: &ContextKey) -> bool {
        self.lookup(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys = Vec::new();
        let mut current = self.head.as_deref();
        while let Some(node) = current {
            keys.push(node.key.to_string());
            current = node.parent.as_deref();
        }
        f.debug_struct("Context").field("keys", &keys).finish()
    }
}

/// Marker type for the logger slot in a context.
struct LoggerSlot;

pub(crate) fn logger_key() -> ContextKey {
    ContextKey::of::<LoggerSlot>()
}

/// Attach `logger` to a child of `ctx`.
pub fn attach_logger(ctx: &Context, logger: Arc<Logger>) -> Context {
    ctx.with_value(logger_key(), logger)
}

/// The logger most recently attached to `ctx`.
///
/// Returns `None` for a missing context, a context that never carried a
/// logger, or a slot holding a value of another type.
pub fn from_context(ctx: Option<&Context>) -> Option<Arc<Logger>> {
    ctx?.value_as::<Arc<Logger>>(&logger_key()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::log_level::LogLevel;
    use crate::writers::MemoryWriter;

    fn shared_logger() -> Arc<Logger> {
        Arc::new(Logger::new(
            LogLevel::Info,
            Some(Arc::new(MemoryWriter::new())),
            Vec::new(),
        ))
    }

    #[test]
    fn test_values_and_shadowing() {
        let root = Context::background().with_value("user", "alice");
        let child = root.with_value("user", "bob").with_value("role", 7u32);

        assert_eq!(root.value_as::<&str>(&"user".into()), Some(&"alice"));
        assert_eq!(child.value_as::<&str>(&"user".into()), Some(&"bob"));
        assert_eq!(child.value_as::<u32>(&"role".into()), Some(&7));
        assert!(root.value(&"role".into()).is_none());
    }

    #[test]
    fn test_explicit_nil() {
        let ctx = Context::background().with_nil("trace_id");
        assert!(ctx.contains_key(&"trace_id".into()));
        assert!(ctx.value(&"trace_id".into()).is_none());
    }

    #[test]
    fn test_typed_key_does_not_collide_with_names() {
        let ctx = Context::background().with_value(ContextKey::of::<u8>(), 1u8);
        let named = ContextKey::from(std::any::type_name::<u8>().to_string());
        assert!(ctx.value(&named).is_none());
        assert!(ctx.value(&ContextKey::of::<u8>()).is_some());
    }

    #[test]
    fn test_from_context_not_found() {
        assert!(from_context(None).is_none());
        assert!(from_context(Some(&Context::background())).is_none());
        let other = Context::background().with_value("logger", 5i32);
        assert!(from_context(Some(&other)).is_none());
    }

    #[test]
    fn test_from_context_wrong_type() {
        let ctx = Context::background().with_value(logger_key(), "not a logger");
        assert!(from_context(Some(&ctx)).is_none());
    }

    #[test]
    fn test_attach_and_retrieve_same_instance() {
        let logger = shared_logger();
        let ctx = attach_logger(&Context::background(), Arc::clone(&logger));
        let found = from_context(Some(&ctx)).expect("logger attached");
        assert!(Arc::ptr_eq(&found, &logger));
    }

    #[test]
    fn test_nested_attachment_shadows() {
        let first = shared_logger();
        let second = shared_logger();

        let outer = attach_logger(&Context::background().with_value("request", 1i32), Arc::clone(&first));
        let inner = attach_logger(&outer, Arc::clone(&second));

        assert!(Arc::ptr_eq(&from_context(Some(&outer)).unwrap(), &first));
        assert!(Arc::ptr_eq(&from_context(Some(&inner)).unwrap(), &second));
        assert_eq!(inner.value_as::<i32>(&"request".into()), Some(&1));
    }
}
