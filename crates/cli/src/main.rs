use anyhow::Result;
use clap::{Parser, Subcommand};
use log::debug;
use runtime_import::{builtin, Importer, Runtime};

mod commands;

#[derive(Parser)]
#[command(name = "runtime-import")]
#[command(
    about = "Resolve named modules the way the current runtime sees them",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Runtime label reported in error messages (native, wasi, wasm)
    #[arg(long, global = true)]
    runtime: Option<Runtime>,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered modules
    List(commands::list::Command),

    /// Resolve modules and report which are available
    Check(commands::check::Command),

    /// Resolve a module and call one of its functions
    Call(commands::call::Command),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::init_from_env(env_logger::Env::default().default_filter_or(default_filter));

    let runtime = cli.runtime.unwrap_or_else(Runtime::current);
    let importer = Importer::with_runtime(builtin::registry(), runtime);
    debug!("Using {:?}", importer.registry());

    match &cli.command {
        Commands::List(args) => commands::list::handler(args, &importer)?,
        Commands::Check(args) => commands::check::handler(args, &importer).await?,
        Commands::Call(args) => commands::call::handler(args, &importer).await?,
    }

    Ok(())
}
