//! `fs`: filesystem access.

use super::stream::{chunk_str, readable_descriptor};
use super::{require_filesystem, str_arg};
use crate::error::{CallError, LoadError};
use crate::module::ModuleObject;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

const STREAM_CHUNK_SIZE: usize = 64 * 1024;

pub(super) fn load() -> Result<Arc<ModuleObject>, LoadError> {
    require_filesystem()?;

    Ok(Arc::new(
        ModuleObject::new()
            .with_function("readFile", read_file)
            .with_function("writeFile", write_file)
            .with_function("exists", exists)
            .with_function("createReadStream", create_read_stream),
    ))
}

fn read_file(args: &[Value]) -> Result<Value, CallError> {
    let path = str_arg(args, 0, "path")?;
    Ok(Value::String(std::fs::read_to_string(path)?))
}

fn write_file(args: &[Value]) -> Result<Value, CallError> {
    let path = str_arg(args, 0, "path")?;
    let data = str_arg(args, 1, "data")?;
    std::fs::write(path, data)?;
    Ok(Value::Null)
}

fn exists(args: &[Value]) -> Result<Value, CallError> {
    let path = str_arg(args, 0, "path")?;
    Ok(Value::Bool(Path::new(path).exists()))
}

fn create_read_stream(args: &[Value]) -> Result<Value, CallError> {
    let path = str_arg(args, 0, "path")?;
    let content = std::fs::read_to_string(path)?;
    log::debug!("Streaming {} bytes from {}", content.len(), path);
    Ok(readable_descriptor(chunk_str(&content, STREAM_CHUNK_SIZE)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("note.txt");
        let path = json!(path.to_str().unwrap());
        let module = load().unwrap();

        assert_eq!(module.invoke("exists", &[path.clone()]).unwrap(), json!(false));
        module
            .invoke("writeFile", &[path.clone(), json!("hello")])
            .unwrap();
        assert_eq!(module.invoke("exists", &[path.clone()]).unwrap(), json!(true));
        assert_eq!(module.invoke("readFile", &[path]).unwrap(), json!("hello"));
    }

    #[test]
    fn test_read_stream_chunks() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big.txt");
        std::fs::write(&path, "x".repeat(STREAM_CHUNK_SIZE + 1)).unwrap();

        let module = load().unwrap();
        let stream = module
            .invoke("createReadStream", &[json!(path.to_str().unwrap())])
            .unwrap();

        assert_eq!(stream["kind"], json!("readable"));
        assert_eq!(stream["chunks"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.txt");
        let module = load().unwrap();

        let err = module
            .invoke("readFile", &[json!(path.to_str().unwrap())])
            .unwrap_err();
        assert!(matches!(err, CallError::Io(_)));
    }
}
