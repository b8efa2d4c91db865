//! `stream`: readable and writable stream descriptors.

use super::string_list;
use crate::error::{CallError, LoadError};
use crate::module::ModuleObject;
use serde_json::{json, Value};
use std::sync::Arc;

pub(super) fn load() -> Result<Arc<ModuleObject>, LoadError> {
    Ok(Arc::new(
        ModuleObject::new()
            .with_function("Readable", readable)
            .with_function("Writable", writable)
            .with_function("pipeline", pipeline),
    ))
}

/// Descriptor of a readable stream over `chunks`.
pub(super) fn readable_descriptor(chunks: Vec<String>) -> Value {
    json!({ "kind": "readable", "chunks": chunks })
}

/// Split `text` into chunks of at most `size` bytes on char boundaries.
pub(super) fn chunk_str(text: &str, size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let mut end = size.min(rest.len());
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        if end == 0 {
            // a single char wider than `size`
            end = rest.chars().next().map_or(rest.len(), char::len_utf8);
        }
        let (head, tail) = rest.split_at(end);
        chunks.push(head.to_string());
        rest = tail;
    }

    chunks
}

fn readable(args: &[Value]) -> Result<Value, CallError> {
    let chunks = match args.first() {
        None | Some(Value::Null) => Vec::new(),
        Some(value) => string_list(value, "chunks")?,
    };
    Ok(readable_descriptor(chunks))
}

fn writable(_args: &[Value]) -> Result<Value, CallError> {
    Ok(json!({ "kind": "writable", "chunks": [] }))
}

fn pipeline(args: &[Value]) -> Result<Value, CallError> {
    let source = descriptor_chunks(args, 0, "readable", "source")?;
    let mut sink = descriptor_chunks(args, 1, "writable", "destination")?;

    let bytes_written: usize = source.iter().map(String::len).sum();
    sink.extend(source);

    Ok(json!({
        "kind": "writable",
        "chunks": sink,
        "bytesWritten": bytes_written,
    }))
}

fn descriptor_chunks(
    args: &[Value],
    index: usize,
    kind: &str,
    name: &'static str,
) -> Result<Vec<String>, CallError> {
    let descriptor = args.get(index).ok_or(CallError::MissingArgument(name))?;
    if descriptor.get("kind").and_then(Value::as_str) != Some(kind) {
        return Err(CallError::InvalidArgument {
            name,
            expected: "a stream descriptor of the matching kind",
        });
    }

    match descriptor.get("chunks") {
        Some(chunks) => string_list(chunks, name),
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_moves_chunks() {
        let module = load().unwrap();
        let source = module.invoke("Readable", &[json!(["ab", "c"])]).unwrap();
        let sink = module.invoke("Writable", &[]).unwrap();

        let drained = module.invoke("pipeline", &[source, sink]).unwrap();
        assert_eq!(drained["chunks"], json!(["ab", "c"]));
        assert_eq!(drained["bytesWritten"], json!(3));
    }

    #[test]
    fn test_pipeline_rejects_swapped_arguments() {
        let module = load().unwrap();
        let source = module.invoke("Readable", &[json!("x")]).unwrap();
        let sink = module.invoke("Writable", &[]).unwrap();

        assert!(module.invoke("pipeline", &[sink, source]).is_err());
    }

    #[test]
    fn test_chunk_str_respects_char_boundaries() {
        assert_eq!(chunk_str("abcdef", 4), vec!["abcd", "ef"]);
        assert_eq!(chunk_str("", 4), Vec::<String>::new());
        assert_eq!(chunk_str("ééé", 3), vec!["é", "é", "é"]);
        assert_eq!(chunk_str("é", 1), vec!["é"]);
    }
}
