//! Callopt CLI
//!
//! Runs the call-site specializer on scenario files and lists the natives it
//! knows how to specialize.

use anyhow::{Context, Result};
use callopt::inline::DispatchTable;
use callopt::{InliningStatus, Scenario, SharedStubs, VERSION};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "callopt")]
#[command(author, version, about = "Call-site specialization of JavaScript natives", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Specialize the call described by a scenario file and dump the graph
    Inspect {
        /// Scenario JSON file
        file: PathBuf,
        /// Print only the outcome
        #[arg(short, long)]
        quiet: bool,
    },

    /// List natives with a specializer
    Natives,
}

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let result = match cli.command {
        Commands::Inspect { file, quiet } => inspect(&file, quiet),
        Commands::Natives => {
            list_natives();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn setup_logging(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn inspect(path: &Path, quiet: bool) -> Result<()> {
    let scenario = Scenario::from_file(path)
        .with_context(|| format!("loading scenario '{}'", path.display()))?;
    let mut built = scenario.build().context("building call site")?;

    let stubs = SharedStubs::new();
    let status = built
        .specialize(&stubs)
        .with_context(|| format!("specializing call site {}", built.call.site))?;

    let name = scenario.name.as_deref().unwrap_or("scenario");
    match status {
        InliningStatus::Inlined => println!("{}: inlined", name),
        InliningStatus::NotInlined => println!("{}: not inlined", name),
    }
    if !quiet {
        print!("{}", built.builder.graph());
    }
    Ok(())
}

fn list_natives() {
    let table = DispatchTable::global();
    println!("callopt v{}: {} specializers", VERSION, table.len());
    for (native, specializer) in table.entries() {
        println!("  {:<36} {:?}", native.name(), specializer);
    }
}
