//! Error types for module resolution.

use crate::runtime::Runtime;
use thiserror::Error;

/// Failure reported by a loader when the module cannot be produced.
///
/// The `Display` output is embedded verbatim in [`ImportError::LoadFailed`].
#[derive(Error, Debug)]
pub enum LoadError {
    /// The host runtime lacks a capability the module needs
    #[error("{feature} is not supported in this runtime")]
    Unsupported { feature: &'static str },

    /// No tokio runtime could be set up to drive a deferred loader
    #[error("Failed to create tokio runtime: {0}")]
    Runtime(String),

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Failed(String),
}

impl LoadError {
    /// The loader panicked instead of returning.
    pub(crate) fn panicked() -> Self {
        Self::Failed("Loader panicked".to_string())
    }
}

/// Failure reported by a function exposed on a module object.
#[derive(Error, Debug)]
pub enum CallError {
    #[error("Value is not callable")]
    NotCallable,

    #[error("Member '{0}' is not a function")]
    NotAFunction(String),

    #[error("Missing argument '{0}'")]
    MissingArgument(&'static str),

    #[error("Invalid argument '{name}': expected {expected}")]
    InvalidArgument {
        name: &'static str,
        expected: &'static str,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Failed(String),
}

/// Discriminates the three ways a resolution can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportErrorKind {
    /// The name is not in the registry; no loader was invoked.
    UnknownModule,
    /// The loader succeeded but the module has the wrong shape.
    ValidationFailed,
    /// The loader itself failed.
    LoadFailed,
}

/// The single error every resolution failure is normalized into.
///
/// Messages are `"<prefix> <body>"`, with an empty prefix when the caller
/// supplied none.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("{prefix} Unknown module \"{name}\"")]
    UnknownModule {
        prefix: String,
        name: String,
        runtime: Runtime,
    },

    #[error("{prefix} Module \"{name}\" didn't pass import validation in the \"{runtime}\" runtime")]
    ValidationFailed {
        prefix: String,
        name: String,
        runtime: Runtime,
    },

    #[error("{prefix} Module \"{name}\" is not available in the \"{runtime}\" runtime: {message}")]
    LoadFailed {
        prefix: String,
        name: String,
        runtime: Runtime,
        message: String,
    },
}

impl ImportError {
    pub fn kind(&self) -> ImportErrorKind {
        match self {
            ImportError::UnknownModule { .. } => ImportErrorKind::UnknownModule,
            ImportError::ValidationFailed { .. } => ImportErrorKind::ValidationFailed,
            ImportError::LoadFailed { .. } => ImportErrorKind::LoadFailed,
        }
    }

    pub fn module_name(&self) -> &str {
        match self {
            ImportError::UnknownModule { name, .. }
            | ImportError::ValidationFailed { name, .. }
            | ImportError::LoadFailed { name, .. } => name,
        }
    }

    pub fn runtime(&self) -> Runtime {
        match self {
            ImportError::UnknownModule { runtime, .. }
            | ImportError::ValidationFailed { runtime, .. }
            | ImportError::LoadFailed { runtime, .. } => *runtime,
        }
    }
}

/// Result type for module resolution.
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_module_message_without_prefix() {
        let err = ImportError::UnknownModule {
            prefix: String::new(),
            name: "nope".to_string(),
            runtime: Runtime::Native,
        };
        assert_eq!(err.to_string(), " Unknown module \"nope\"");
        assert_eq!(err.kind(), ImportErrorKind::UnknownModule);
    }

    #[test]
    fn test_validation_message() {
        let err = ImportError::ValidationFailed {
            prefix: "Upload failed:".to_string(),
            name: "tar".to_string(),
            runtime: Runtime::Wasm,
        };
        assert_eq!(
            err.to_string(),
            "Upload failed: Module \"tar\" didn't pass import validation in the \"wasm\" runtime"
        );
        assert_eq!(err.module_name(), "tar");
        assert_eq!(err.runtime(), Runtime::Wasm);
    }

    #[test]
    fn test_load_failed_embeds_underlying_message() {
        let err = ImportError::LoadFailed {
            prefix: String::new(),
            name: "fs".to_string(),
            runtime: Runtime::Native,
            message: LoadError::Failed("boom".to_string()).to_string(),
        };
        assert!(err
            .to_string()
            .ends_with("is not available in the \"native\" runtime: boom"));
        assert_eq!(err.kind(), ImportErrorKind::LoadFailed);
    }

    #[test]
    fn test_unsupported_load_error_message() {
        let err = LoadError::Unsupported {
            feature: "Filesystem access",
        };
        assert_eq!(err.to_string(), "Filesystem access is not supported in this runtime");
    }
}
