//! `rosterd` — the roster server binary.
//!
//! Usage:
//!   rosterd -c <context-name-or-path> [--listen <addr>]
//!
//! The context name resolves to `/etc/roster/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod bootstrap;
mod config;
mod routes;

use std::sync::Arc;

use clap::Parser;
use roster_core::Module;
use tracing::info;

use config::ServerConfig;

/// Roster server.
#[derive(Parser, Debug)]
#[command(name = "rosterd", about = "Roster accounts server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address.
    #[arg(long = "listen", default_value = "0.0.0.0:8080")]
    listen: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;

    bootstrap::verify_config(&server_config)?;

    let data_dir = std::path::PathBuf::from(&server_config.storage.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    // Embedded stores shared by all modules.
    let kv: Arc<dyn roster_kv::KVStore> = Arc::new(
        roster_kv::RedbStore::open(&data_dir.join("roster.redb"))
            .map_err(|e| anyhow::anyhow!("failed to open KV store: {}", e))?,
    );
    let sql: Arc<dyn roster_sql::SQLStore> = Arc::new(
        roster_sql::SqliteStore::open(&data_dir.join("roster.db"))
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );

    let accounts_config = accounts::service::AccountsConfig {
        jwt_secret: server_config.jwt.secret.clone(),
        access_token_ttl: server_config.jwt.access_ttl_secs,
        refresh_token_ttl: server_config.jwt.refresh_ttl_secs,
    };
    let accounts_module = accounts::AccountsModule::new(
        Arc::clone(&sql),
        Arc::clone(&kv),
        accounts_config,
    )?;
    info!("Accounts module initialized");

    bootstrap::ensure_super_admin(accounts_module.service(), &server_config)?;

    let app = routes::build_router(vec![accounts_module.routes()]);

    let listener = tokio::net::TcpListener::bind(&cli.listen).await?;
    info!("Roster server listening on {}", cli.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
