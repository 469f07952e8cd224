mod commands;

use clap::{Parser, Subcommand};
use commands::{BundleArgs, ExportArgs, ImportArgs, NormalizeArgs};

/// UI Builder CLI: move projects and canonical documents around
#[derive(Parser, Debug)]
#[command(name = "uib")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export one screen of a project as a canonical document
    Export(ExportArgs),

    /// Import a canonical document as a new one-screen project
    Import(ImportArgs),

    /// Rewrite a project file in normalized form
    Normalize(NormalizeArgs),

    /// Write a project as project.json plus one file per screen
    Bundle(BundleArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Command::Export(args) => commands::export(args),
        Command::Import(args) => commands::import(args),
        Command::Normalize(args) => commands::normalize(args),
        Command::Bundle(args) => commands::bundle(args),
    }
}
