//! Dynamically shaped module objects produced by loaders.

use crate::error::CallError;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Name of the member a module system uses to wrap its primary value.
pub const DEFAULT_EXPORT: &str = "default";

/// A native function exposed by a module, using JSON values for arguments and results.
pub type NativeFn = Arc<dyn Fn(&[Value]) -> Result<Value, CallError> + Send + Sync>;

/// A member exposed on a [`ModuleObject`].
#[derive(Clone)]
pub enum Member {
    /// A nested object. It is of "function" kind when the object is callable.
    Object(Arc<ModuleObject>),
    /// Plain data.
    Value(Value),
}

impl Member {
    pub fn as_object(&self) -> Option<&Arc<ModuleObject>> {
        match self {
            Member::Object(object) => Some(object),
            Member::Value(_) => None,
        }
    }

    pub fn is_function(&self) -> bool {
        self.as_object().is_some_and(|object| object.is_callable())
    }

    pub fn is_object(&self) -> bool {
        self.as_object().is_some_and(|object| !object.is_callable())
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Member::Object(object) => object.fmt(f),
            Member::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

/// A module as seen by callers: optionally callable, with named members.
///
/// # Example
///
/// ```
/// use runtime_import::ModuleObject;
/// use serde_json::json;
///
/// let module = ModuleObject::new().with_function("run", |_| Ok(json!(1)));
/// assert!(module.has_function("run"));
/// assert_eq!(module.invoke("run", &[]).unwrap(), json!(1));
/// ```
#[derive(Clone, Default)]
pub struct ModuleObject {
    call: Option<NativeFn>,
    members: BTreeMap<String, Member>,
}

impl ModuleObject {
    /// Create an empty, non-callable module object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a module object that can itself be called.
    pub fn callable<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        Self {
            call: Some(Arc::new(f)),
            members: BTreeMap::new(),
        }
    }

    pub fn with_function<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        self.with_object(name, Arc::new(Self::callable(f)))
    }

    pub fn with_object(mut self, name: impl Into<String>, object: Arc<ModuleObject>) -> Self {
        self.members.insert(name.into(), Member::Object(object));
        self
    }

    pub fn with_value(mut self, name: impl Into<String>, value: Value) -> Self {
        self.members.insert(name.into(), Member::Value(value));
        self
    }

    /// Wrap `object` as this module's default export.
    pub fn with_default(self, object: Arc<ModuleObject>) -> Self {
        self.with_object(DEFAULT_EXPORT, object)
    }

    pub fn is_callable(&self) -> bool {
        self.call.is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Member> {
        self.members.get(name)
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.get(name).is_some_and(Member::is_function)
    }

    pub fn has_object(&self, name: &str) -> bool {
        self.get(name).is_some_and(Member::is_object)
    }

    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    /// Call the module object itself.
    pub fn call(&self, args: &[Value]) -> Result<Value, CallError> {
        match &self.call {
            Some(f) => f(args),
            None => Err(CallError::NotCallable),
        }
    }

    /// Call the function member `name`.
    pub fn invoke(&self, name: &str, args: &[Value]) -> Result<Value, CallError> {
        match self.get(name).and_then(Member::as_object) {
            Some(object) if object.is_callable() => object.call(args),
            _ => Err(CallError::NotAFunction(name.to_string())),
        }
    }
}

impl fmt::Debug for ModuleObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleObject")
            .field("callable", &self.is_callable())
            .field("members", &self.members)
            .finish()
    }
}

/// Replace a raw module by its default export when it has one.
///
/// Only an object-valued default export is unwrapped; otherwise the raw
/// module itself is returned unchanged.
pub fn unwrap_default(raw: Arc<ModuleObject>) -> Arc<ModuleObject> {
    match raw.get(DEFAULT_EXPORT) {
        Some(Member::Object(inner)) => inner.clone(),
        _ => raw,
    }
}
