use anyhow::Result;
use clap::Args;
use runtime_import::Importer;
use serde_json::Value;

#[derive(Args, Debug)]
pub struct Command {
    /// Module to resolve
    #[arg(value_name = "MODULE")]
    module: String,

    /// Member function to call; the module itself is called when omitted
    #[arg(long)]
    member: Option<String>,

    /// Arguments as JSON; anything that is not valid JSON is passed as a string
    #[arg(value_name = "ARGS", allow_hyphen_values = true)]
    args: Vec<String>,

    /// Use the immediate loading strategy instead of the deferred one
    #[arg(long)]
    sync: bool,
}

fn parse_arg(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

pub async fn handler(args: &Command, importer: &Importer) -> Result<()> {
    let module = if args.sync {
        importer.import_sync(&args.module, None)?
    } else {
        importer.import(&args.module, None).await?
    };

    let values: Vec<Value> = args.args.iter().map(|raw| parse_arg(raw)).collect();
    let result = match &args.member {
        Some(member) => module.invoke(member, &values)?,
        None => module.call(&values)?,
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_arg() {
        assert_eq!(parse_arg("{\"cwd\": \".\"}"), json!({ "cwd": "." }));
        assert_eq!(parse_arg("3"), json!(3));
        assert_eq!(parse_arg("*.ts"), json!("*.ts"));
        assert_eq!(parse_arg("\"quoted\""), json!("quoted"));
    }
}
