//! Shape validation of loaded modules.

use crate::module::ModuleObject;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// A predicate checking that a module exposes the members callers rely on.
pub type Validator = Arc<dyn Fn(&ModuleObject) -> bool + Send + Sync>;

/// Declarative description of the members a module must expose.
///
/// # Example
///
/// ```
/// use runtime_import::{ModuleObject, Shape};
/// use serde_json::Value;
///
/// let shape = Shape::new().callable().function("sync");
/// let glob = ModuleObject::callable(|_| Ok(Value::Null)).with_function("sync", |_| Ok(Value::Null));
/// assert!(shape.matches(&glob));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Shape {
    callable: bool,
    functions: Vec<String>,
    objects: Vec<String>,
}

impl Shape {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require the module itself to be callable.
    pub fn callable(mut self) -> Self {
        self.callable = true;
        self
    }

    /// Require a callable member named `name`.
    pub fn function(mut self, name: impl Into<String>) -> Self {
        self.functions.push(name.into());
        self
    }

    /// Require a non-callable object member named `name`.
    pub fn object(mut self, name: impl Into<String>) -> Self {
        self.objects.push(name.into());
        self
    }

    pub fn matches(&self, module: &ModuleObject) -> bool {
        (!self.callable || module.is_callable())
            && self.functions.iter().all(|name| module.has_function(name))
            && self.objects.iter().all(|name| module.has_object(name))
    }

    pub fn into_validator(self) -> Validator {
        Arc::new(move |module: &ModuleObject| self.matches(module))
    }
}

/// Run `validator` against `module`, treating a panic as a failed validation.
pub(crate) fn run_validator(validator: &Validator, name: &str, module: &ModuleObject) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(|| validator(module))) {
        Ok(passed) => passed,
        Err(_) => {
            log::error!("Import validator for module \"{name}\" panicked");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn noop() -> ModuleObject {
        ModuleObject::callable(|_| Ok(Value::Null))
    }

    #[test]
    fn test_empty_shape_accepts_anything() {
        assert!(Shape::new().matches(&ModuleObject::new()));
    }

    #[test]
    fn test_callable_shape() {
        let shape = Shape::new().callable();
        assert!(shape.matches(&noop()));
        assert!(!shape.matches(&ModuleObject::new()));
    }

    #[test]
    fn test_function_members_required() {
        let shape = Shape::new().function("parse").function("stringify");
        let partial = ModuleObject::new().with_function("parse", |_| Ok(Value::Null));
        let full = partial
            .clone()
            .with_function("stringify", |_| Ok(Value::Null));

        assert!(!shape.matches(&partial));
        assert!(shape.matches(&full));
    }

    #[test]
    fn test_object_member_kind() {
        let shape = Shape::new().object("promises");
        let with_object = ModuleObject::new().with_object("promises", Arc::new(ModuleObject::new()));
        let with_function = ModuleObject::new().with_function("promises", |_| Ok(Value::Null));

        assert!(shape.matches(&with_object));
        assert!(!shape.matches(&with_function));
    }

    #[test]
    fn test_panicking_validator_fails() {
        let validator: Validator = Arc::new(|_: &ModuleObject| -> bool { panic!("validator bug") });
        assert!(!run_validator(&validator, "broken", &ModuleObject::new()));
    }
}
