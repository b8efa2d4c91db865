//! The built-in module catalogue and its registry.

mod dotenv;
mod form_data;
mod fs;
mod glob;
mod object_storage;
mod stream;
mod tar;
mod tilde;
mod toml;

use crate::error::{CallError, LoadError};
use crate::module::ModuleObject;
use crate::registry::ModuleRegistry;
use crate::validate::Shape;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

type Loader = fn() -> Result<Arc<ModuleObject>, LoadError>;

macro_rules! define_builtin_modules {
    ( $( $variant:ident => $name:literal ),* $(,)? ) => {
        /// Names of the modules shipped with the default registry.
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum BuiltinModule {
            $( #[serde(rename = $name)] $variant, )*
        }

        impl BuiltinModule {
            pub const ALL: &'static [BuiltinModule] = &[ $( BuiltinModule::$variant, )* ];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( BuiltinModule::$variant => $name, )*
                }
            }
        }

        impl std::str::FromStr for BuiltinModule {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $name => Ok(Self::$variant), )*
                    _ => Err(format!("Unknown module: {}", s)),
                }
            }
        }
    };
}

define_builtin_modules! {
    Stream => "stream",
    Tar => "tar",
    ObjectStorage => "ObjectStorage",
    Fs => "fs",
    FormData => "form-data",
    FastGlob => "fast-glob",
    Toml => "@iarna/toml",
    ExpandTilde => "expand-tilde",
    Dotenv => "dotenv",
}

impl BuiltinModule {
    fn loader(self) -> Loader {
        match self {
            BuiltinModule::Stream => stream::load,
            BuiltinModule::Tar => tar::load,
            BuiltinModule::ObjectStorage => object_storage::load,
            BuiltinModule::Fs => fs::load,
            BuiltinModule::FormData => form_data::load,
            BuiltinModule::FastGlob => glob::load,
            BuiltinModule::Toml => toml::load,
            BuiltinModule::ExpandTilde => tilde::load,
            BuiltinModule::Dotenv => dotenv::load,
        }
    }

    /// The members callers rely on, or `None` when the module is trusted as-is.
    pub fn shape(self) -> Option<Shape> {
        let shape = match self {
            BuiltinModule::Stream => Shape::new().function("Readable").function("Writable"),
            BuiltinModule::Tar => Shape::new().function("extract").function("create"),
            BuiltinModule::ObjectStorage => return None,
            BuiltinModule::Fs => Shape::new()
                .function("createReadStream")
                .function("readFile"),
            BuiltinModule::FormData => Shape::new().callable(),
            BuiltinModule::FastGlob => Shape::new().callable().function("sync"),
            BuiltinModule::Toml => Shape::new().function("parse").function("stringify"),
            BuiltinModule::ExpandTilde => Shape::new().callable(),
            BuiltinModule::Dotenv => Shape::new().function("config"),
        };
        Some(shape)
    }
}

impl std::fmt::Display for BuiltinModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for BuiltinModule {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Build the registry holding every [`BuiltinModule`].
pub fn registry() -> ModuleRegistry {
    BuiltinModule::ALL
        .iter()
        .fold(ModuleRegistry::builder(), |builder, module| {
            let builder = builder.module(module.as_str(), module.loader());
            match module.shape() {
                Some(shape) => builder.shape(module.as_str(), shape),
                None => builder,
            }
        })
        .build()
}

pub(crate) fn require_filesystem() -> Result<(), LoadError> {
    if cfg!(all(target_arch = "wasm32", not(target_os = "wasi"))) {
        Err(LoadError::Unsupported {
            feature: "Filesystem access",
        })
    } else {
        Ok(())
    }
}

pub(crate) fn str_arg<'a>(
    args: &'a [Value],
    index: usize,
    name: &'static str,
) -> Result<&'a str, CallError> {
    match args.get(index) {
        Some(Value::String(s)) => Ok(s.as_str()),
        None | Some(Value::Null) => Err(CallError::MissingArgument(name)),
        Some(_) => Err(CallError::InvalidArgument {
            name,
            expected: "a string",
        }),
    }
}

/// Options object at `index`; absent or null options are `None`.
pub(crate) fn options_arg(
    args: &[Value],
    index: usize,
) -> Result<Option<&Map<String, Value>>, CallError> {
    match args.get(index) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(CallError::InvalidArgument {
            name: "options",
            expected: "an object",
        }),
    }
}

pub(crate) fn opt_str<'a>(
    options: Option<&'a Map<String, Value>>,
    name: &'static str,
) -> Result<Option<&'a str>, CallError> {
    match options.and_then(|map| map.get(name)) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(CallError::InvalidArgument {
            name,
            expected: "a string",
        }),
    }
}

pub(crate) fn opt_bool(
    options: Option<&Map<String, Value>>,
    name: &'static str,
) -> Result<Option<bool>, CallError> {
    match options.and_then(|map| map.get(name)) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(CallError::InvalidArgument {
            name,
            expected: "a boolean",
        }),
    }
}

/// A string or an array of strings.
pub(crate) fn string_list(value: &Value, name: &'static str) -> Result<Vec<String>, CallError> {
    let invalid = || CallError::InvalidArgument {
        name,
        expected: "a string or an array of strings",
    };

    match value {
        Value::String(s) => Ok(vec![s.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(String::from).ok_or_else(invalid))
            .collect(),
        _ => Err(invalid()),
    }
}
