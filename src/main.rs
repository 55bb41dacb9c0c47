use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use form_relay::config::{load_config, read_config, validate_config, ConfigError, RelayConfig};
use form_relay::lifecycle::{wait_for_signal, Shutdown};
use form_relay::observability::{logging, metrics};
use form_relay::HttpServer;

#[derive(Parser)]
#[command(name = "form-relay", version)]
#[command(about = "Relays multipart form submissions to a downstream JSON service", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "FORM_RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(long)]
    bind: Option<String>,

    /// Override upstream.url.
    #[arg(long)]
    upstream: Option<String>,
}

impl Cli {
    fn load(&self) -> Result<RelayConfig, ConfigError> {
        if let (Some(path), None, None) = (&self.config, &self.bind, &self.upstream) {
            return load_config(path);
        }

        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => RelayConfig::default(),
        };
        if let Some(bind) = &self.bind {
            config.listener.bind_address = bind.clone();
        }
        if let Some(upstream) = &self.upstream {
            config.upstream.url = upstream.clone();
        }
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.load()?;

    logging::init_logging(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        route = %config.listener.route_path,
        upstream = %config.upstream.url,
        request_timeout_secs = ?config.upstream.request_timeout_secs,
        "form-relay starting"
    );

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
