//! `dotenv`: `.env` parsing and loading into the process environment.

use super::{opt_bool, opt_str, options_arg, require_filesystem, str_arg};
use crate::error::{CallError, LoadError};
use crate::module::ModuleObject;
use serde_json::{json, Map, Value};
use std::sync::Arc;

pub(super) fn load() -> Result<Arc<ModuleObject>, LoadError> {
    require_filesystem()?;

    Ok(Arc::new(
        ModuleObject::new()
            .with_function("config", config)
            .with_function("parse", parse),
    ))
}

fn parse(args: &[Value]) -> Result<Value, CallError> {
    Ok(Value::Object(parse_env(str_arg(args, 0, "text")?)))
}

/// `config({ path?, override? })`, returning `{ parsed }` or `{ error }`.
///
/// Variables already present in the environment are kept unless `override` is set.
fn config(args: &[Value]) -> Result<Value, CallError> {
    let options = options_arg(args, 0)?;
    let path = opt_str(options, "path")?.unwrap_or(".env");
    let override_existing = opt_bool(options, "override")?.unwrap_or(false);

    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            log::debug!("Could not read env file {path}: {err}");
            return Ok(json!({ "error": err.to_string() }));
        }
    };

    let parsed = parse_env(&text);
    for (key, value) in &parsed {
        if override_existing || std::env::var_os(key).is_none() {
            std::env::set_var(key, value.as_str().unwrap_or_default());
        }
    }

    Ok(json!({ "parsed": parsed }))
}

fn parse_env(text: &str) -> Map<String, Value> {
    let mut vars = Map::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, raw)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }

        vars.insert(key.to_string(), Value::String(parse_value(raw.trim())));
    }

    vars
}

fn parse_value(raw: &str) -> String {
    for quote in ['"', '\'', '`'] {
        if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
            let inner = &raw[1..raw.len() - 1];
            return if quote == '"' {
                inner.replace("\\n", "\n").replace("\\r", "\r")
            } else {
                inner.to_string()
            };
        }
    }

    match raw.find(" #") {
        Some(index) => raw[..index].trim_end().to_string(),
        None => raw.to_string(),
    }
}
