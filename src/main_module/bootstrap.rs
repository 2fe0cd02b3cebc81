//! Bootstrap and application initialization logic

use anyhow::{anyhow, Result};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::core::config::{AppConfig, AuthSettings, IdentityBackend, StoreBackend, StoreConfig};
use crate::core::shared::state::{AppState, Stores};
use crate::directory::{IdentityProvider, LocalDirectory, RestIdentityProvider};

/// What the binary was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Serve,
    HashPassword(String),
    Help,
}

pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// `args` excludes the program name.
pub fn parse_cli_args(args: &[String]) -> Result<Command> {
    match args.first().map(String::as_str) {
        None | Some("serve") => Ok(Command::Serve),
        Some("hash-password") => match args.get(1) {
            Some(secret) if !secret.is_empty() => Ok(Command::HashPassword(secret.clone())),
            _ => Err(anyhow!("usage: analyst-portal hash-password <secret>")),
        },
        Some("-h" | "--help" | "help") => Ok(Command::Help),
        Some(other) => Err(anyhow!("unknown command `{other}`")),
    }
}

pub fn build_stores(config: &StoreConfig) -> Result<Stores> {
    let stores = match config.backend {
        StoreBackend::Memory => {
            warn!("Using in-memory store; records are lost on restart");
            Stores::in_memory()
        }
        StoreBackend::Postgres => postgres_stores(config)?,
    };

    if config.cache_collections {
        info!("Reference collections served from snapshot cache");
        Ok(stores.cached())
    } else {
        Ok(stores)
    }
}

#[cfg(feature = "postgres")]
fn postgres_stores(config: &StoreConfig) -> Result<Stores> {
    use crate::core::shared::utils::{create_pool, run_migrations};
    use crate::store::PgStore;

    let url = config
        .database_url
        .as_deref()
        .ok_or_else(|| anyhow!("store.database_url (or DATABASE_URL) is required for postgres"))?;

    let pool = create_pool(url, config.pool_size)?;
    run_migrations(&pool).map_err(|e| anyhow!("Failed to run migrations: {e}"))?;
    info!("Connected to Postgres with pool size {}", config.pool_size);

    Ok(Stores::postgres(PgStore::new(pool)))
}

#[cfg(not(feature = "postgres"))]
fn postgres_stores(_config: &StoreConfig) -> Result<Stores> {
    Err(anyhow!(
        "store.backend = \"postgres\" requires building with the `postgres` feature"
    ))
}

pub fn build_identity(auth: &AuthSettings) -> Result<Arc<dyn IdentityProvider>> {
    match auth.provider {
        IdentityBackend::Local => {
            info!("Local directory with {} accounts", auth.accounts.len());
            Ok(Arc::new(LocalDirectory::new(auth.accounts.clone())))
        }
        IdentityBackend::Rest => {
            let provider = RestIdentityProvider::new(&auth.rest)
                .map_err(|e| anyhow!("Failed to set up identity provider: {e}"))?;
            info!("Identity provider at {}", auth.rest.endpoint);
            Ok(Arc::new(provider))
        }
    }
}

pub fn build_state(config: AppConfig) -> Result<Arc<AppState>> {
    let stores = build_stores(&config.store)?;
    let identity = build_identity(&config.auth)?;

    if !config.auth.session.cookie_secure {
        warn!("Session cookie is sent without the Secure flag");
    }

    Ok(Arc::new(AppState::new(config, stores, identity)))
}
