//! `form-data`: multipart/form-data encoding of a field map.

use super::options_arg;
use crate::error::{CallError, LoadError};
use crate::module::ModuleObject;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use uuid::Uuid;

pub(super) fn load() -> Result<Arc<ModuleObject>, LoadError> {
    Ok(Arc::new(ModuleObject::callable(encode)))
}

/// Encode `{ name: value }` where a value is a scalar, an array of values, or a
/// file part `{ filename, content, contentType? }`.
fn encode(args: &[Value]) -> Result<Value, CallError> {
    let empty = Map::new();
    let fields = options_arg(args, 0)?.unwrap_or(&empty);
    let boundary = format!("----RuntimeImportBoundary{}", Uuid::new_v4().simple());

    let mut body = String::new();
    for (name, value) in fields {
        match value {
            Value::Array(items) => {
                for item in items {
                    write_part(&mut body, &boundary, name, item)?;
                }
            }
            _ => write_part(&mut body, &boundary, name, value)?,
        }
    }
    body.push_str(&format!("--{boundary}--\r\n"));

    Ok(json!({
        "boundary": boundary,
        "contentType": format!("multipart/form-data; boundary={boundary}"),
        "body": body,
    }))
}

fn write_part(body: &mut String, boundary: &str, name: &str, value: &Value) -> Result<(), CallError> {
    body.push_str(&format!("--{boundary}\r\n"));

    let part = match value {
        Value::Object(file) => {
            let filename = file
                .get("filename")
                .and_then(Value::as_str)
                .ok_or(CallError::MissingArgument("filename"))?;
            let content = file.get("content").and_then(Value::as_str).unwrap_or_default();
            let content_type = file
                .get("contentType")
                .and_then(Value::as_str)
                .unwrap_or("application/octet-stream");

            format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                 Content-Type: {content_type}\r\n\r\n{content}\r\n"
            )
        }
        Value::String(text) => {
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{text}\r\n")
        }
        Value::Null => format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n\r\n"),
        other => format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{other}\r\n"),
    };
    body.push_str(&part);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_fields_and_files() {
        let module = load().unwrap();
        let encoded = module
            .call(&[json!({
                "name": "snapshot",
                "retries": 3,
                "file": { "filename": "ctx.tar", "content": "data", "contentType": "application/x-tar" },
            })])
            .unwrap();

        let boundary = encoded["boundary"].as_str().unwrap();
        let body = encoded["body"].as_str().unwrap();

        assert_eq!(
            encoded["contentType"],
            json!(format!("multipart/form-data; boundary={boundary}"))
        );
        assert!(body.contains("name=\"name\"\r\n\r\nsnapshot\r\n"));
        assert!(body.contains("name=\"retries\"\r\n\r\n3\r\n"));
        assert!(body.contains("filename=\"ctx.tar\"\r\nContent-Type: application/x-tar\r\n\r\ndata\r\n"));
        assert!(body.ends_with(&format!("--{boundary}--\r\n")));
    }

    #[test]
    fn test_array_values_repeat_parts() {
        let module = load().unwrap();
        let encoded = module.call(&[json!({ "tag": ["a", "b"] })]).unwrap();
        let body = encoded["body"].as_str().unwrap();
        assert_eq!(body.matches("name=\"tag\"").count(), 2);
    }

    #[test]
    fn test_single_field_body_is_exact() {
        let module = load().unwrap();
        let encoded = module.call(&[json!({ "empty": null })]).unwrap();
        let boundary = encoded["boundary"].as_str().unwrap();

        assert_eq!(
            encoded["body"],
            json!(format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"empty\"\r\n\r\n\r\n--{boundary}--\r\n"
            ))
        );
    }

    #[test]
    fn test_file_part_requires_filename() {
        let module = load().unwrap();
        let err = module.call(&[json!({ "file": { "content": "x" } })]).unwrap_err();
        assert!(matches!(err, CallError::MissingArgument("filename")));
    }
}
