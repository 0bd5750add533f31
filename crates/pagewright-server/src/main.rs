use clap::Parser;
use pagewright_core::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "pagewright",
    about = "Turns a task brief into a generated static site, published and reported",
    version
)]
struct Cli {
    /// Port to bind (overrides PORT from the environment)
    #[arg(long)]
    port: Option<u16>,

    /// Root directory for per-task workspaces
    #[arg(long)]
    workspace_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(dir) = cli.workspace_dir {
        config.workspace_dir = dir;
    }

    pagewright_server::serve(config).await
}
