//! Runtime-aware resolution of named modules.
//!
//! Callers ask for a module by symbolic name and get back a validated
//! [`ModuleObject`], or a single [`ImportError`] naming the module and the
//! runtime when it is unknown, fails to load, or has the wrong shape.
//!
//! # Features
//!
//! - **Two strategies**: [`Importer::import`] suspends on a deferred loader,
//!   [`Importer::import_sync`] calls an immediate one; both cover the same names
//! - **Shape validation**: per-module predicates checked after default-export unwrapping
//! - **Built-in catalogue**: `stream`, `tar`, `ObjectStorage`, `fs`, `form-data`,
//!   `fast-glob`, `@iarna/toml`, `expand-tilde` and `dotenv`
//!
//! # Example
//!
//! ```
//! use runtime_import::{dynamic_import_sync, ImportErrorKind};
//! use serde_json::json;
//!
//! let toml = dynamic_import_sync("@iarna/toml", None).unwrap();
//! let parsed = toml.invoke("parse", &[json!("answer = 42")]).unwrap();
//! assert_eq!(parsed["answer"], json!(42));
//!
//! let err = dynamic_import_sync("left-pad", Some("Setup failed:")).unwrap_err();
//! assert_eq!(err.kind(), ImportErrorKind::UnknownModule);
//! ```

pub mod builtin;
mod error;
mod module;
mod registry;
mod resolver;
mod runtime;
mod validate;

pub use builtin::BuiltinModule;
pub use error::{CallError, ImportError, ImportErrorKind, ImportResult, LoadError};
pub use module::{unwrap_default, Member, ModuleObject, NativeFn, DEFAULT_EXPORT};
pub use registry::{DeferredLoader, ImmediateLoader, ModuleRegistry, RegistryBuilder};
pub use resolver::Importer;
pub use runtime::{Runtime, RUNTIME_ENV_VAR};
pub use validate::{Shape, Validator};

use std::sync::{Arc, OnceLock};

/// The process-wide importer over the built-in registry.
pub fn default_importer() -> &'static Importer {
    static IMPORTER: OnceLock<Importer> = OnceLock::new();
    IMPORTER.get_or_init(|| Importer::new(builtin::registry()))
}

/// Resolve a built-in module through its deferred loader.
pub async fn dynamic_import(
    name: impl AsRef<str>,
    prefix: Option<&str>,
) -> ImportResult<Arc<ModuleObject>> {
    default_importer().import(name, prefix).await
}

/// Resolve a built-in module through its immediate loader.
pub fn dynamic_import_sync(
    name: impl AsRef<str>,
    prefix: Option<&str>,
) -> ImportResult<Arc<ModuleObject>> {
    default_importer().import_sync(name, prefix)
}
