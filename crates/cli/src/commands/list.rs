use anyhow::Result;
use clap::Args;
use runtime_import::Importer;
use serde::Serialize;
use tabled::Tabled;

use super::{print_rows, OutputFormat};

#[derive(Args, Debug)]
pub struct Command {
    /// Output format
    #[arg(long, default_value = "table")]
    format: OutputFormat,
}

#[derive(Serialize, Tabled)]
struct ModuleRow {
    #[tabled(rename = "Module")]
    name: String,

    #[tabled(rename = "Validated")]
    validated: bool,
}

pub fn handler(args: &Command, importer: &Importer) -> Result<()> {
    let registry = importer.registry();
    let rows = registry
        .names()
        .map(|name| ModuleRow {
            name: name.to_string(),
            validated: registry.has_validator(name),
        })
        .collect();

    print_rows::<ModuleRow>(rows, &args.format)
}
