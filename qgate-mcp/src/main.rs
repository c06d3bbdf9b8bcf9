//! Agent tool server: exposes `run-quality-checks` over stdio JSON-RPC.

mod protocol;
mod server;
mod tool;

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use qgate::ProcessStepRunner;
use tracing::info;

use crate::server::McpServer;

#[derive(Parser)]
#[command(name = "qgate-mcp")]
#[command(about = "Serve the quality check tool to agents over stdio")]
struct Args {
    /// Project directory the tool checks
    #[arg(long, default_value = ".")]
    project_dir: PathBuf,
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries protocol messages only.
    qgate::logging::init();

    let args = Args::parse();
    let project_dir = args.project_dir.canonicalize().unwrap_or(args.project_dir);
    info!(project_dir = %project_dir.display(), "starting qgate-mcp");

    let server = McpServer::new(project_dir, ProcessStepRunner)?;
    let stdin = io::stdin();
    let stdout = io::stdout();
    server.serve(stdin.lock(), stdout.lock())
}
