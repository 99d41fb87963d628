//! Repostats server - HTTP front end for the repository stats pipeline.

mod config;
mod error;
mod routes;
mod shutdown;

use std::sync::Arc;

use clap::Parser;
use repostats::{GitHubClient, StatsPipeline, WorkerPool};
use tracing_subscriber::EnvFilter;

use crate::routes::AppState;

#[derive(Parser)]
#[command(name = "repostats")]
#[command(version)]
#[command(about = "Statistics for the newest public GitHub repositories")]
#[command(after_long_help = r#"ROUTES
    GET /ping
    GET /repos?license=<key>&language=<name>&since=<id>
    GET /stats?license=<key>&language=<name>&since=<id>

    The Authorization header of each request is forwarded to GitHub.

CONFIGURATION
    Repostats reads configuration from:
      1. ~/.config/repostats/config.toml (or $XDG_CONFIG_HOME/repostats/config.toml)
      2. ./repostats.toml
      3. Environment variables (REPOSTATS_* prefix, e.g., REPOSTATS_SERVER__PORT)
      4. .env file in current directory
"#)]
struct Cli {
    /// Port to listen on (default from config or 5000)
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Number of enrichment workers (default from config or 16)
    #[arg(short, long)]
    workers: Option<usize>,

    /// GitHub API base URL (default from config or https://api.github.com)
    #[arg(long)]
    api_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("repostats=info,repostats_server=info,tower_http=info"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    // Load configuration (config file -> env vars -> defaults), then apply flags
    let mut config = config::Config::load();
    let cli = Cli::parse();

    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(workers) = cli.workers {
        config.pipeline.workers = workers;
    }
    if let Some(api_url) = cli.api_url {
        config.github.api_url = api_url;
    }

    let mut client = GitHubClient::new(&config.github.api_url, config.http_timeout())?;
    if let Some(user_agent) = &config.github.user_agent {
        client = client.with_user_agent(user_agent.as_str());
    }
    let client = Arc::new(client);

    let (pool, workers) = WorkerPool::start(client.clone(), &config.pool_options());
    let pipeline = StatsPipeline::new(client, pool, &config.pipeline_options());
    let app = routes::router(AppState { pipeline });

    let addr = config.listen_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, api_url = %config.github.api_url, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::shutdown_signal())
        .await?;

    // The router (and with it every pool handle) is gone; drain the workers.
    workers.shutdown().await;

    Ok(())
}
