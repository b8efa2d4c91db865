//! `fast-glob`: pattern matching over a directory tree.
//!
//! Patterns follow gitignore glob rules: a pattern without a slash matches at
//! any depth and a leading `!` excludes.

use super::{opt_bool, opt_str, options_arg, require_filesystem, string_list};
use crate::error::{CallError, LoadError};
use crate::module::ModuleObject;
use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

pub(super) fn load() -> Result<Arc<ModuleObject>, LoadError> {
    require_filesystem()?;

    Ok(Arc::new(
        ModuleObject::callable(glob).with_function("sync", glob),
    ))
}

/// `(patterns, { cwd?, dot?, onlyFiles? })`, returning sorted paths relative to `cwd`.
fn glob(args: &[Value]) -> Result<Value, CallError> {
    let patterns = string_list(
        args.first().ok_or(CallError::MissingArgument("patterns"))?,
        "patterns",
    )?;
    let options = options_arg(args, 1)?;
    let cwd = Path::new(opt_str(options, "cwd")?.unwrap_or("."));
    let dot = opt_bool(options, "dot")?.unwrap_or(false);
    let only_files = opt_bool(options, "onlyFiles")?.unwrap_or(true);

    let mut builder = OverrideBuilder::new(cwd);
    for pattern in &patterns {
        builder
            .add(pattern)
            .map_err(|e| CallError::Failed(format!("Invalid glob '{pattern}': {e}")))?;
    }
    let overrides = builder
        .build()
        .map_err(|e| CallError::Failed(format!("Failed to build glob overrides: {e}")))?;

    // Whitelisted overrides bypass the walker's own hidden filter.
    let walker = WalkBuilder::new(cwd)
        .standard_filters(false)
        .overrides(overrides.clone())
        .filter_entry(move |entry| {
            dot || entry.depth() == 0 || !entry.file_name().to_string_lossy().starts_with('.')
        })
        .build();

    let mut matches = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                log::debug!("Skipping unreadable glob entry: {err}");
                continue;
            }
        };
        if entry.depth() == 0 {
            continue;
        }

        let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
        if is_dir && (only_files || !overrides.matched(entry.path(), true).is_whitelist()) {
            continue;
        }

        let relative = entry.path().strip_prefix(cwd).unwrap_or(entry.path());
        matches.push(relative.to_string_lossy().replace('\\', "/"));
    }

    matches.sort();
    Ok(Value::from(matches))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.ts"), "").unwrap();
        std::fs::write(dir.path().join("b.js"), "").unwrap();
        std::fs::write(dir.path().join(".hidden.ts"), "").unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src").join("c.ts"), "").unwrap();
        dir
    }

    #[test]
    fn test_glob_matches_at_any_depth() {
        let dir = fixture();
        let module = load().unwrap();
        let found = module
            .call(&[json!("*.ts"), json!({ "cwd": dir.path().to_str().unwrap() })])
            .unwrap();
        assert_eq!(found, json!(["a.ts", "src/c.ts"]));
    }

    #[test]
    fn test_sync_member_and_dot_option() {
        let dir = fixture();
        let module = load().unwrap();
        let found = module
            .invoke(
                "sync",
                &[
                    json!(["*.ts", "!src/**"]),
                    json!({ "cwd": dir.path().to_str().unwrap(), "dot": true }),
                ],
            )
            .unwrap();
        assert_eq!(found, json!([".hidden.ts", "a.ts"]));
    }

    #[test]
    fn test_glob_requires_patterns() {
        let module = load().unwrap();
        assert!(matches!(
            module.call(&[]),
            Err(CallError::MissingArgument("patterns"))
        ));
    }
}
