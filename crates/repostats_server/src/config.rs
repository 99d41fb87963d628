//! Configuration file support for repostats.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `REPOSTATS_`, sections split by `__`,
//!    e.g., `REPOSTATS_PIPELINE__WORKERS`)
//! 3. Config file (./repostats.toml or ~/.config/repostats/config.toml)
//! 4. Built-in defaults
//!
//! Example config file:
//! ```toml
//! [server]
//! bind = "0.0.0.0"
//! port = 5000
//!
//! [github]
//! api_url = "https://api.github.com"
//! user_agent = "repostats"      # optional
//! http_timeout_secs = 30
//!
//! [pipeline]
//! workers = 16
//! queue_capacity = 1000
//! page_size = 100
//! deadline_secs = 10
//! max_probes = 128
//! ```

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use repostats::github::{DEFAULT_HTTP_TIMEOUT, GITHUB_API_URL};
use repostats::pipeline::{
    DEFAULT_FETCH_DEADLINE, DEFAULT_MAX_PROBES, DEFAULT_PAGE_SIZE, DEFAULT_QUEUE_CAPACITY,
    DEFAULT_WORKER_COUNT,
};
use repostats::{PipelineOptions, PoolOptions};
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Listening socket.
    pub server: ServerConfig,
    /// Upstream API settings.
    pub github: GitHubConfig,
    /// Worker pool and fetch tuning.
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind, e.g. "0.0.0.0" or "127.0.0.1".
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// API base URL; point at a GitHub Enterprise host or a local fake.
    pub api_url: String,
    /// `User-Agent` sent upstream. Defaults to `repostats/<version>`.
    pub user_agent: Option<String>,
    /// Per-request transport timeout.
    pub http_timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: GITHUB_API_URL.to_string(),
            user_agent: None,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT.as_secs(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Long-lived enrichment workers.
    pub workers: usize,
    /// Shared task queue capacity.
    pub queue_capacity: usize,
    /// Repositories per located page (2..=100).
    pub page_size: usize,
    /// Deadline for one /repos or /stats request.
    pub deadline_secs: u64,
    /// Listing calls allowed while locating a page.
    pub max_probes: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKER_COUNT,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            page_size: DEFAULT_PAGE_SIZE,
            deadline_secs: DEFAULT_FETCH_DEADLINE.as_secs(),
            max_probes: DEFAULT_MAX_PROBES,
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/repostats/config.toml)
    /// 3. Local config file (./repostats.toml)
    /// 4. Environment variables with REPOSTATS_ prefix
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(xdg_config) = Self::default_config_path()
            && xdg_config.exists()
        {
            tracing::debug!("Loading config from {:?}", xdg_config);
            builder = builder.add_source(
                File::from(xdg_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let local_config = PathBuf::from("repostats.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./repostats.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // e.g., REPOSTATS_PIPELINE__QUEUE_CAPACITY -> pipeline.queue_capacity
        builder = builder.add_source(Self::environment());

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    fn environment() -> Environment {
        Environment::with_prefix("REPOSTATS")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "repostats").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Socket address to listen on.
    pub fn listen_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        let ip: IpAddr = self.server.bind.parse()?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    pub fn http_timeout(&self) -> Duration {
        if self.github.http_timeout_secs == 0 {
            tracing::warn!("github.http_timeout_secs must be positive, using the default");
            return DEFAULT_HTTP_TIMEOUT;
        }
        Duration::from_secs(self.github.http_timeout_secs)
    }

    pub fn pool_options(&self) -> PoolOptions {
        let mut options = PoolOptions {
            workers: self.pipeline.workers,
            queue_capacity: self.pipeline.queue_capacity,
        };
        if options.workers == 0 {
            tracing::warn!("pipeline.workers must be positive, using the default");
            options.workers = DEFAULT_WORKER_COUNT;
        }
        if options.queue_capacity == 0 {
            tracing::warn!("pipeline.queue_capacity must be positive, using the default");
            options.queue_capacity = DEFAULT_QUEUE_CAPACITY;
        }
        options
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        let mut options = PipelineOptions {
            page_size: self.pipeline.page_size,
            deadline: Duration::from_secs(self.pipeline.deadline_secs),
            max_probes: self.pipeline.max_probes,
        };
        if options.deadline.is_zero() {
            tracing::warn!("pipeline.deadline_secs must be positive, using the default");
            options.deadline = DEFAULT_FETCH_DEADLINE;
        }
        if options.max_probes == 0 {
            tracing::warn!("pipeline.max_probes must be positive, using the default");
            options.max_probes = DEFAULT_MAX_PROBES;
        }
        options
    }
}
