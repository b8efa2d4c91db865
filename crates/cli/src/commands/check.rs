use anyhow::{bail, Result};
use clap::Args;
use runtime_import::{ImportErrorKind, ImportResult, Importer, ModuleObject};
use serde::Serialize;
use std::sync::Arc;
use tabled::Tabled;

use super::{print_rows, OutputFormat};

#[derive(Args, Debug)]
pub struct Command {
    /// Modules to check; every registered module when omitted
    #[arg(value_name = "MODULE")]
    modules: Vec<String>,

    /// Use the immediate loading strategy instead of the deferred one
    #[arg(long)]
    sync: bool,

    /// Prefix prepended to error messages
    #[arg(long)]
    prefix: Option<String>,

    /// Output format
    #[arg(long, default_value = "table")]
    format: OutputFormat,
}

#[derive(Serialize, Tabled)]
struct CheckRow {
    #[tabled(rename = "Module")]
    module: String,

    #[tabled(rename = "Status")]
    status: &'static str,

    #[tabled(rename = "Detail")]
    detail: String,
}

fn status_label(kind: ImportErrorKind) -> &'static str {
    match kind {
        ImportErrorKind::UnknownModule => "unknown",
        ImportErrorKind::ValidationFailed => "invalid",
        ImportErrorKind::LoadFailed => "unavailable",
    }
}

fn describe(module: &ModuleObject) -> String {
    let members = module.member_names().collect::<Vec<_>>().join(", ");
    match (module.is_callable(), members.is_empty()) {
        (true, true) => "(callable)".to_string(),
        (true, false) => format!("(callable) {members}"),
        (false, _) => members,
    }
}

pub async fn handler(args: &Command, importer: &Importer) -> Result<()> {
    let names: Vec<String> = if args.modules.is_empty() {
        importer.registry().names().map(String::from).collect()
    } else {
        args.modules.clone()
    };
    let prefix = args.prefix.as_deref();

    let mut rows = Vec::with_capacity(names.len());
    for name in names {
        let result: ImportResult<Arc<ModuleObject>> = if args.sync {
            importer.import_sync(&name, prefix)
        } else {
            importer.import(&name, prefix).await
        };

        rows.push(match result {
            Ok(module) => CheckRow {
                module: name,
                status: "available",
                detail: describe(&module),
            },
            Err(err) => CheckRow {
                module: name,
                status: status_label(err.kind()),
                detail: err.to_string().trim_start().to_string(),
            },
        });
    }

    let failed = rows.iter().filter(|row| row.status != "available").count();
    print_rows(rows, &args.format)?;

    if failed > 0 {
        bail!(
            "{failed} module(s) could not be resolved in the \"{}\" runtime",
            importer.runtime()
        );
    }
    Ok(())
}
