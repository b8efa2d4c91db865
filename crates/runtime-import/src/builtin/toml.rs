//! `@iarna/toml`: TOML parsing and serialization.

use super::str_arg;
use crate::error::{CallError, LoadError};
use crate::module::ModuleObject;
use serde_json::Value;
use std::sync::Arc;

pub(super) fn load() -> Result<Arc<ModuleObject>, LoadError> {
    Ok(Arc::new(
        ModuleObject::new()
            .with_function("parse", parse)
            .with_function("stringify", stringify),
    ))
}

fn parse(args: &[Value]) -> Result<Value, CallError> {
    let text = str_arg(args, 0, "text")?;
    toml_edit::de::from_str::<Value>(text).map_err(|e| CallError::Failed(e.to_string()))
}

fn stringify(args: &[Value]) -> Result<Value, CallError> {
    let value = args.first().ok_or(CallError::MissingArgument("value"))?;
    if !value.is_object() {
        return Err(CallError::InvalidArgument {
            name: "value",
            expected: "an object",
        });
    }

    toml_edit::ser::to_string(value)
        .map(Value::String)
        .map_err(|e| CallError::Failed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_tables() {
        let module = load().unwrap();
        let parsed = module
            .invoke(
                "parse",
                &[json!("name = \"sandbox\"\n[resources]\ncpu = 2\n")],
            )
            .unwrap();
        assert_eq!(parsed, json!({ "name": "sandbox", "resources": { "cpu": 2 } }));
    }

    #[test]
    fn test_stringify_parses_back() {
        let module = load().unwrap();
        let value = json!({ "image": "python:3.12", "ports": [8080, 3000] });
        let text = module.invoke("stringify", &[value.clone()]).unwrap();
        let parsed = module.invoke("parse", &[text]).unwrap();
        assert_eq!(parsed, value);
    }

    #[test]
    fn test_parse_error_is_reported() {
        let module = load().unwrap();
        assert!(matches!(
            module.invoke("parse", &[json!("= broken")]),
            Err(CallError::Failed(_))
        ));
        assert!(module.invoke("stringify", &[json!([1])]).is_err());
    }
}
