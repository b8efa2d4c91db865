//! `expand-tilde`: home directory expansion.

use super::str_arg;
use crate::error::{CallError, LoadError};
use crate::module::ModuleObject;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

pub(super) fn load() -> Result<Arc<ModuleObject>, LoadError> {
    Ok(Arc::new(ModuleObject::callable(expand)))
}

fn expand(args: &[Value]) -> Result<Value, CallError> {
    let path = str_arg(args, 0, "path")?;
    Ok(Value::String(expand_with(path, dirs::home_dir().as_deref())))
}

/// Paths without a leading `~`, or with no known home, come back unchanged.
fn expand_with(path: &str, home: Option<&Path>) -> String {
    let Some(home) = home else {
        return path.to_string();
    };

    if path == "~" {
        home.to_string_lossy().into_owned()
    } else if let Some(rest) = path.strip_prefix("~/") {
        home.join(rest).to_string_lossy().into_owned()
    } else {
        path.to_string()
    }
}
