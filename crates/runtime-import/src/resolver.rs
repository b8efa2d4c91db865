//! Resolution of symbolic module names into validated module objects.

use crate::error::{ImportError, ImportResult, LoadError};
use crate::module::{unwrap_default, ModuleObject};
use crate::registry::ModuleRegistry;
use crate::runtime::Runtime;
use crate::validate::run_validator;
use futures::FutureExt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Resolves module names against a [`ModuleRegistry`].
///
/// Both strategies share the same lookup, default-export unwrapping,
/// validation and error normalization. They differ only in how the loader is
/// invoked: [`Importer::import`] suspends on a deferred loader while
/// [`Importer::import_sync`] calls the immediate one.
#[derive(Clone, Debug)]
pub struct Importer {
    registry: Arc<ModuleRegistry>,
    runtime: Runtime,
}

impl Importer {
    /// Create an importer reporting the process-wide [`Runtime::current`].
    pub fn new(registry: impl Into<Arc<ModuleRegistry>>) -> Self {
        Self::with_runtime(registry, Runtime::current())
    }

    /// Create an importer reporting `runtime` in its error messages.
    pub fn with_runtime(registry: impl Into<Arc<ModuleRegistry>>, runtime: Runtime) -> Self {
        Self {
            registry: registry.into(),
            runtime,
        }
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn runtime(&self) -> Runtime {
        self.runtime
    }

    /// Resolve `name` through its deferred loader.
    ///
    /// `prefix` is prepended to the message of any error returned.
    pub async fn import(
        &self,
        name: impl AsRef<str>,
        prefix: Option<&str>,
    ) -> ImportResult<Arc<ModuleObject>> {
        let name = name.as_ref();
        let loader = self
            .registry
            .deferred(name)
            .cloned()
            .ok_or_else(|| self.unknown(name, prefix))?;

        log::debug!("Loading module \"{name}\" (deferred)");
        let loaded = AssertUnwindSafe(loader())
            .catch_unwind()
            .await
            .unwrap_or_else(|_| Err(LoadError::panicked()));
        self.settle(name, prefix, loaded)
    }

    /// Resolve `name` through its immediate loader.
    pub fn import_sync(
        &self,
        name: impl AsRef<str>,
        prefix: Option<&str>,
    ) -> ImportResult<Arc<ModuleObject>> {
        let name = name.as_ref();
        let loader = self
            .registry
            .immediate(name)
            .ok_or_else(|| self.unknown(name, prefix))?;

        log::debug!("Loading module \"{name}\" (immediate)");
        let loaded = panic::catch_unwind(AssertUnwindSafe(|| loader()))
            .unwrap_or_else(|_| Err(LoadError::panicked()));
        self.settle(name, prefix, loaded)
    }

    fn settle(
        &self,
        name: &str,
        prefix: Option<&str>,
        loaded: Result<Arc<ModuleObject>, LoadError>,
    ) -> ImportResult<Arc<ModuleObject>> {
        let raw = loaded.map_err(|err| {
            log::debug!("Module \"{name}\" failed to load: {err}");
            ImportError::LoadFailed {
                prefix: prefix.unwrap_or_default().to_string(),
                name: name.to_string(),
                runtime: self.runtime,
                message: err.to_string(),
            }
        })?;

        let module = unwrap_default(raw);

        match self.registry.validator(name) {
            Some(validator) => {
                if !run_validator(validator, name, &module) {
                    return Err(ImportError::ValidationFailed {
                        prefix: prefix.unwrap_or_default().to_string(),
                        name: name.to_string(),
                        runtime: self.runtime,
                    });
                }
            }
            None => log::debug!("No import validator registered for module \"{name}\""),
        }

        Ok(module)
    }

    fn unknown(&self, name: &str, prefix: Option<&str>) -> ImportError {
        ImportError::UnknownModule {
            prefix: prefix.unwrap_or_default().to_string(),
            name: name.to_string(),
            runtime: self.runtime,
        }
    }
}
