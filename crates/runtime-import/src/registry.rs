//! The table mapping symbolic module names to their loaders.

use crate::error::LoadError;
use crate::module::ModuleObject;
use crate::validate::{Shape, Validator};
use futures::future::{BoxFuture, FutureExt};
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Arc;
use std::thread;
use tokio::runtime::{Handle, RuntimeFlavor};

/// Loader producing a module without suspending the caller.
pub type ImmediateLoader = Arc<dyn Fn() -> Result<Arc<ModuleObject>, LoadError> + Send + Sync>;

/// Loader producing a module the caller suspends on.
pub type DeferredLoader =
    Arc<dyn Fn() -> BoxFuture<'static, Result<Arc<ModuleObject>, LoadError>> + Send + Sync>;

/// Both loading strategies for one name, always registered together.
#[derive(Clone)]
struct Entry {
    deferred: DeferredLoader,
    immediate: ImmediateLoader,
}

/// Builder for a [`ModuleRegistry`].
///
/// Each registration supplies one loader and derives the other strategy from
/// it, so both strategies always cover the same names.
#[derive(Default)]
pub struct RegistryBuilder {
    entries: BTreeMap<String, Entry>,
    validators: HashMap<String, Validator>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module through an immediate loader.
    ///
    /// The deferred form calls the same loader when first polled.
    pub fn module<F>(self, name: impl Into<String>, loader: F) -> Self
    where
        F: Fn() -> Result<Arc<ModuleObject>, LoadError> + Send + Sync + 'static,
    {
        let immediate: ImmediateLoader = Arc::new(loader);
        let inline = immediate.clone();
        let deferred: DeferredLoader = Arc::new(move || {
            let loader = inline.clone();
            async move { loader() }.boxed()
        });

        self.insert(name.into(), Entry { deferred, immediate })
    }

    /// Register a module through a deferred loader.
    ///
    /// The immediate form blocks the calling thread until the future settles.
    pub fn deferred_module<F, Fut>(self, name: impl Into<String>, loader: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Arc<ModuleObject>, LoadError>> + Send + 'static,
    {
        let deferred: DeferredLoader = Arc::new(move || loader().boxed());
        let blocking = deferred.clone();
        let immediate: ImmediateLoader = Arc::new(move || wait_for(blocking()));

        self.insert(name.into(), Entry { deferred, immediate })
    }

    /// Attach a validator predicate to `name`.
    pub fn validator<F>(mut self, name: impl Into<String>, validator: F) -> Self
    where
        F: Fn(&ModuleObject) -> bool + Send + Sync + 'static,
    {
        self.validators.insert(name.into(), Arc::new(validator));
        self
    }

    /// Attach a declarative [`Shape`] as the validator for `name`.
    pub fn shape(mut self, name: impl Into<String>, shape: Shape) -> Self {
        self.validators.insert(name.into(), shape.into_validator());
        self
    }

    pub fn build(self) -> ModuleRegistry {
        let RegistryBuilder {
            entries,
            mut validators,
        } = self;

        validators.retain(|name, _| {
            let known = entries.contains_key(name);
            if !known {
                log::warn!("Dropping import validator for unregistered module \"{name}\"");
            }
            known
        });

        ModuleRegistry {
            entries,
            validators,
        }
    }

    fn insert(mut self, name: String, entry: Entry) -> Self {
        if self.entries.insert(name.clone(), entry).is_some() {
            log::warn!("Module \"{name}\" registered twice, keeping the last loader");
        }
        self
    }
}

/// Drive a deferred loader to completion from synchronous code.
///
/// On a multi-thread tokio runtime the future runs on the caller's runtime via
/// `block_in_place`. Anywhere else, including a current-thread runtime whose
/// only thread is the caller, it runs on a fresh current-thread runtime on its
/// own thread so timers and IO still get driven.
fn wait_for(
    future: BoxFuture<'static, Result<Arc<ModuleObject>, LoadError>>,
) -> Result<Arc<ModuleObject>, LoadError> {
    if let Ok(handle) = Handle::try_current() {
        if handle.runtime_flavor() == RuntimeFlavor::MultiThread {
            return tokio::task::block_in_place(|| handle.block_on(future));
        }
    }

    thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| LoadError::Runtime(e.to_string()))?;
        runtime.block_on(future)
    })
    .join()
    .unwrap_or_else(|_| Err(LoadError::panicked()))
}

/// Immutable table of loaders and validators keyed by module name.
pub struct ModuleRegistry {
    entries: BTreeMap<String, Entry>,
    validators: HashMap<String, Validator>,
}

impl ModuleRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn has_validator(&self, name: &str) -> bool {
        self.validators.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn deferred(&self, name: &str) -> Option<&DeferredLoader> {
        self.entries.get(name).map(|entry| &entry.deferred)
    }

    pub(crate) fn immediate(&self, name: &str) -> Option<&ImmediateLoader> {
        self.entries.get(name).map(|entry| &entry.immediate)
    }

    pub(crate) fn validator(&self, name: &str) -> Option<&Validator> {
        self.validators.get(name)
    }
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut validated: Vec<&str> = self.validators.keys().map(String::as_str).collect();
        validated.sort_unstable();

        f.debug_struct("ModuleRegistry")
            .field("modules", &self.names().collect::<Vec<_>>())
            .field("validated", &validated)
            .finish()
    }
}
