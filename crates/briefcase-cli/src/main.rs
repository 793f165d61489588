mod cmd_inspect;
mod cmd_serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "briefcase", version, about = "Branch, commit and pull-request automation")]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP API server
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        /// Port to listen on
        #[arg(long, env = "PORT", default_value = "3000")]
        port: u16,
        /// Extra directory to scan for repositories (repeatable)
        #[arg(long = "search-root")]
        search_roots: Vec<PathBuf>,
        /// Default working directory for requests (defaults to the current directory)
        #[arg(long)]
        cwd: Option<PathBuf>,
    },
    /// Print a repository snapshot as JSON
    Inspect {
        /// Repository path (defaults to the current directory)
        path: Option<PathBuf>,
    },
    /// Print the suggested branch, commit and merge strategy for pending changes
    Suggest {
        /// Repository path (defaults to the current directory)
        path: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "briefcase=debug" } else { "briefcase=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cwd = std::env::current_dir()?;

    match cli.cmd {
        Command::Serve {
            bind,
            port,
            search_roots,
            cwd: serve_cwd,
        } => cmd_serve::execute(&serve_cwd.unwrap_or(cwd), &bind, port, &search_roots),
        Command::Inspect { path } => cmd_inspect::inspect_repo(&path.unwrap_or(cwd)),
        Command::Suggest { path } => cmd_inspect::suggest(&path.unwrap_or(cwd)),
    }
}
