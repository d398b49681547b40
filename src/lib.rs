pub mod cli;
pub mod config;
pub mod constants;
pub mod db;
pub mod entities;
pub mod forms;
pub mod services;
pub mod state;
pub mod web;

use anyhow::Context;
use clap::Parser;
use std::path::Path;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
pub use config::Config;
use db::Store;
use state::AppState;

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let command = cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
    });

    match command {
        Commands::InitConfig { path } => {
            init_tracing("info", false);
            cmd_init_config(&path)
        }
        Commands::Migrate => {
            let config = load_config()?;
            init_tracing(&config.general.log_level, config.observability.json_logs);
            cmd_migrate(&config).await
        }
        Commands::Serve { host, port } => {
            let mut config = load_config()?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;
            init_tracing(&config.general.log_level, config.observability.json_logs);
            run_server(config).await
        }
    }
}

fn load_config() -> anyhow::Result<Config> {
    let config = Config::load()?;
    config.validate()?;
    Ok(config)
}

fn init_tracing(log_level: &str, json: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(fmt::layer))
        .init();
}

fn cmd_init_config(path: &Path) -> anyhow::Result<()> {
    if Config::create_default_if_missing(path)? {
        println!("Created {}", path.display());
    } else {
        println!("{} already exists, leaving it untouched", path.display());
    }
    Ok(())
}

async fn cmd_migrate(config: &Config) -> anyhow::Result<()> {
    let store = Store::with_pool_options(
        &config.general.database_url,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;
    store.ping().await?;
    info!("Migrations up to date");
    Ok(())
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        info!("Prometheus metrics recorder initialized");
        Some(handle)
    } else {
        None
    };

    let addr = config.bind_address();
    let state = AppState::from_config(config, prometheus_handle).await?;
    let app = web::router(state).await?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Warbler listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Error listening for shutdown: {}", e),
    }
}
