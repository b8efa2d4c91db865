//! Identification of the host execution environment.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Environment variable that overrides the detected runtime label.
pub const RUNTIME_ENV_VAR: &str = "RUNTIME_IMPORT_RUNTIME";

/// The execution environment the process is running in.
///
/// Only used to enrich diagnostics. Resolution never branches on it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Runtime {
    /// A regular operating system process with full std support.
    Native,
    /// WebAssembly with a WASI host.
    Wasi,
    /// WebAssembly embedded in a browser-like host, no filesystem.
    Wasm,
}

impl Runtime {
    /// Detect the runtime from the compilation target.
    pub fn detect() -> Self {
        if cfg!(target_os = "wasi") {
            Runtime::Wasi
        } else if cfg!(target_arch = "wasm32") {
            Runtime::Wasm
        } else {
            Runtime::Native
        }
    }

    /// The process-wide runtime, honoring [`RUNTIME_ENV_VAR`] on first access.
    pub fn current() -> Self {
        static CURRENT: OnceLock<Runtime> = OnceLock::new();

        *CURRENT.get_or_init(|| match std::env::var(RUNTIME_ENV_VAR) {
            Ok(value) => value.parse().unwrap_or_else(|err| {
                log::warn!("Ignoring {RUNTIME_ENV_VAR}: {err}");
                Runtime::detect()
            }),
            Err(_) => Runtime::detect(),
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Runtime::Native => "native",
            Runtime::Wasi => "wasi",
            Runtime::Wasm => "wasm",
        }
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Runtime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "native" => Ok(Self::Native),
            "wasi" => Ok(Self::Wasi),
            "wasm" | "browser" => Ok(Self::Wasm),
            _ => Err(format!("Unknown runtime: {}", s)),
        }
    }
}
