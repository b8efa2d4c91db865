//! `ObjectStorage`: object-storage client configuration and content hashing.
//!
//! Registered without a validator.

use super::{opt_str, options_arg, str_arg};
use crate::error::{CallError, LoadError};
use crate::module::ModuleObject;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use walkdir::WalkDir;

pub(super) fn load() -> Result<Arc<ModuleObject>, LoadError> {
    Ok(Arc::new(
        ModuleObject::new()
            .with_function("ObjectStorage", client_config)
            .with_function("computeHashForPath", compute_hash_for_path),
    ))
}

/// Normalize `{ endpointUrl, bucketName, accessKeyId?, secretAccessKey?, sessionToken? }`.
fn client_config(args: &[Value]) -> Result<Value, CallError> {
    let options = options_arg(args, 0)?;
    let endpoint = opt_str(options, "endpointUrl")?.ok_or(CallError::MissingArgument("endpointUrl"))?;
    let bucket = opt_str(options, "bucketName")?.ok_or(CallError::MissingArgument("bucketName"))?;

    if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
        return Err(CallError::InvalidArgument {
            name: "endpointUrl",
            expected: "an http(s) URL",
        });
    }
    if bucket.is_empty() {
        return Err(CallError::InvalidArgument {
            name: "bucketName",
            expected: "a non-empty bucket name",
        });
    }

    let access_key_id = opt_str(options, "accessKeyId")?;
    let has_secret = opt_str(options, "secretAccessKey")?.is_some();
    let has_session_token = opt_str(options, "sessionToken")?.is_some();

    Ok(json!({
        "endpointUrl": endpoint.trim_end_matches('/'),
        "bucketName": bucket,
        "accessKeyId": access_key_id,
        "authenticated": access_key_id.is_some() && has_secret,
        "temporaryCredentials": has_session_token,
    }))
}

/// SHA-256 over a file, or over every file of a directory tree in path order.
///
/// Directory hashes cover relative paths as well as contents, so renames change them.
fn compute_hash_for_path(args: &[Value]) -> Result<Value, CallError> {
    let root = Path::new(str_arg(args, 0, "path")?);
    let mut hasher = Sha256::new();

    if root.is_file() {
        hash_file(&mut hasher, root)?;
    } else {
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| CallError::Failed(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            hasher.update(relative.to_string_lossy().replace('\\', "/").as_bytes());
            hasher.update([0u8]);
            hash_file(&mut hasher, entry.path())?;
        }
    }

    Ok(Value::String(format!("{:x}", hasher.finalize())))
}

fn hash_file(hasher: &mut Sha256, path: &Path) -> Result<(), CallError> {
    let mut file = std::fs::File::open(path)?;
    let mut buffer = [0u8; 8192];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            return Ok(());
        }
        hasher.update(&buffer[..read]);
    }
}
