//! `tar`: archive creation and extraction, optionally gzip-compressed.

use super::{opt_bool, opt_str, options_arg, require_filesystem, string_list};
use crate::error::{CallError, LoadError};
use crate::module::ModuleObject;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;

pub(super) fn load() -> Result<Arc<ModuleObject>, LoadError> {
    require_filesystem()?;

    Ok(Arc::new(
        ModuleObject::new()
            .with_function("create", create)
            .with_function("extract", extract),
    ))
}

fn is_gzip(options: Option<&Map<String, Value>>, file: &str) -> Result<bool, CallError> {
    Ok(opt_bool(options, "gzip")?
        .unwrap_or_else(|| file.ends_with(".tgz") || file.ends_with(".tar.gz")))
}

/// `create({ file, cwd?, files?, gzip? })`, returning the number of entries appended.
fn create(args: &[Value]) -> Result<Value, CallError> {
    let options = options_arg(args, 0)?;
    let file = opt_str(options, "file")?.ok_or(CallError::MissingArgument("file"))?;
    let cwd = Path::new(opt_str(options, "cwd")?.unwrap_or("."));
    let gzip = is_gzip(options, file)?;

    let files = match options.and_then(|map| map.get("files")) {
        None | Some(Value::Null) => top_level_entries(cwd)?,
        Some(value) => string_list(value, "files")?,
    };

    let out = File::create(file)?;
    if gzip {
        let encoder = append_entries(GzEncoder::new(out, Compression::default()), cwd, &files)?;
        encoder.finish()?;
    } else {
        append_entries(out, cwd, &files)?.flush()?;
    }

    log::debug!("Archived {} entries from {:?} into {}", files.len(), cwd, file);
    Ok(Value::from(files.len()))
}

/// `extract({ file, cwd?, gzip? })`
fn extract(args: &[Value]) -> Result<Value, CallError> {
    let options = options_arg(args, 0)?;
    let file = opt_str(options, "file")?.ok_or(CallError::MissingArgument("file"))?;
    let cwd = Path::new(opt_str(options, "cwd")?.unwrap_or("."));
    let gzip = is_gzip(options, file)?;

    std::fs::create_dir_all(cwd)?;
    let input = File::open(file)?;
    if gzip {
        unpack(GzDecoder::new(input), cwd)?;
    } else {
        unpack(input, cwd)?;
    }

    Ok(Value::Null)
}

fn top_level_entries(cwd: &Path) -> Result<Vec<String>, CallError> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(cwd)? {
        names.push(entry?.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

fn append_entries<W: Write>(writer: W, cwd: &Path, files: &[String]) -> Result<W, CallError> {
    let mut builder = tar::Builder::new(writer);
    for name in files {
        let path = cwd.join(name);
        if path.is_dir() {
            builder.append_dir_all(name, &path)?;
        } else {
            builder.append_path_with_name(&path, name)?;
        }
    }
    Ok(builder.into_inner()?)
}

fn unpack<R: Read>(reader: R, cwd: &Path) -> Result<(), CallError> {
    tar::Archive::new(reader).unpack(cwd)?;
    Ok(())
}
