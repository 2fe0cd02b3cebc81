//! Layered configuration: built-in defaults, then `portal.toml`, then `PORTAL_*` env vars.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::security::session::SessionConfig;

pub const DEFAULT_CONFIG_FILE: &str = "portal.toml";
pub const CONFIG_PATH_VAR: &str = "PORTAL_CONFIG";
pub const ENV_PREFIX: &str = "PORTAL_";

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub auth: AuthSettings,
    pub report: ReportConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub session_cleanup_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            session_cleanup_secs: 300,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub database_url: Option<String>,
    pub pool_size: u32,
    /// Serve reference collections from a snapshot invalidated on writes.
    pub cache_collections: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            database_url: None,
            pool_size: 10,
            cache_collections: false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityBackend {
    #[default]
    Local,
    Rest,
}

/// A sign-in account for the local directory. `password_hash` is an argon2 PHC string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalAccount {
    pub uid: String,
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RestIdentityConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for RestIdentityConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://identitytoolkit.googleapis.com/v1/accounts:signInWithPassword"
                .to_string(),
            api_key: None,
            timeout_secs: 10,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub provider: IdentityBackend,
    pub accounts: Vec<LocalAccount>,
    pub rest: RestIdentityConfig,
    pub session: SessionConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub export_name: String,
    pub sheet_name: String,
    pub date_format: String,
    /// Export the reason description instead of its id.
    pub resolve_reason_in_export: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            export_name: "relatorio-tickets".to_string(),
            sheet_name: "Tickets".to_string(),
            date_format: "%d/%m/%Y".to_string(),
            resolve_reason_in_export: false,
        }
    }
}

impl AppConfig {
    pub fn config_path() -> PathBuf {
        std::env::var(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    pub fn figment_from(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(
                Env::raw()
                    .only(&["DATABASE_URL"])
                    .map(|_| "store.database_url".into()),
            )
    }

    pub fn load() -> Result<Self, figment::Error> {
        dotenvy::dotenv().ok();
        Self::figment_from(&Self::config_path()).extract()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.auth.provider, IdentityBackend::Local);
        assert_eq!(config.report.export_name, "relatorio-tickets");
        assert_eq!(config.report.date_format, "%d/%m/%Y");
        assert!(!config.report.resolve_reason_in_export);
    }

    #[test]
    fn test_file_then_env_layers() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "portal.toml",
                r#"
                    [server]
                    port = 9000

                    [store]
                    cache_collections = true

                    [report]
                    resolve_reason_in_export = true

                    [[auth.accounts]]
                    uid = "a1"
                    email = "maria@x.com"
                    password_hash = "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA"
                "#,
            )?;
            jail.set_env("PORTAL_SERVER__HOST", "0.0.0.0");
            jail.set_env("PORTAL_AUTH__SESSION__IDLE_TIMEOUT_MINUTES", "5");

            let config: AppConfig = AppConfig::figment_from(Path::new("portal.toml")).extract()?;

            assert_eq!(config.server.port, 9000);
            assert_eq!(config.server.host, "0.0.0.0");
            assert!(config.store.cache_collections);
            assert!(config.report.resolve_reason_in_export);
            assert_eq!(config.auth.accounts.len(), 1);
            assert_eq!(config.auth.accounts[0].email, "maria@x.com");
            assert_eq!(config.auth.session.idle_timeout_minutes, 5);
            assert_eq!(config.auth.session.absolute_timeout_hours, 24);
            Ok(())
        });
    }

    #[test]
    fn test_database_url_env_maps_to_store() {
        Jail::expect_with(|jail| {
            jail.set_env("DATABASE_URL", "postgres://portal@localhost/portal");
            jail.set_env("PORTAL_STORE__BACKEND", "postgres");

            let config: AppConfig = AppConfig::figment_from(Path::new("missing.toml")).extract()?;

            assert_eq!(config.store.backend, StoreBackend::Postgres);
            assert_eq!(
                config.store.database_url.as_deref(),
                Some("postgres://portal@localhost/portal")
            );
            Ok(())
        });
    }
}
