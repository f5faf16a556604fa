use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use log::{info, warn};
use tokio::io::BufReader;

use oxitex_core::engine::detect_distribution;
use oxitex_core::runner::TokioCommandRunner;
use oxitex_workspace::Workspace;
use oxitexd::session::Session;
use oxitexd::tools::ToolHost;

#[derive(Parser)]
#[command(name = "oxitexd")]
#[command(about = "LaTeX tool server speaking JSON-RPC over stdio", long_about = None)]
struct Cli {
    /// Workspace directory for LaTeX projects (default: current directory)
    #[arg(long, value_name = "DIR")]
    workspace: Option<PathBuf>,

    /// Log filter, e.g. info, debug, oxitexd=trace
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries only protocol traffic.
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&cli.log_level),
    )
    .init();

    let root = match cli.workspace {
        Some(dir) => dir,
        None => std::env::current_dir().context("failed to determine current directory")?,
    };
    let workspace = Arc::new(
        Workspace::new(&root)
            .with_context(|| format!("failed to create workspace root {}", root.display()))?,
    );
    info!(
        "starting oxitexd with workspace: {}",
        workspace.root().display()
    );

    match detect_distribution(&TokioCommandRunner).await {
        Some(distribution) => info!("detected TeX distribution: {distribution}"),
        None => warn!("no TeX distribution detected, compilation tools may not work"),
    }

    let session = Session::new(ToolHost::new(workspace));
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    session.run(stdin, &mut stdout).await
}
