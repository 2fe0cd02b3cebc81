//! Identity directory: who may sign in to the portal.

pub mod auth_routes;
pub mod client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::core::config::LocalAccount;
use crate::security::auth_api::AuthError;
use crate::security::password::verify_password;

pub use client::RestIdentityProvider;

/// The signed-in user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl Identity {
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn sign_in(&self, identifier: &str, secret: &str) -> Result<Identity, AuthError>;

    async fn sign_out(&self, _identity: &Identity) -> Result<(), AuthError> {
        Ok(())
    }
}

/// Accounts listed in configuration, checked against argon2 hashes.
pub struct LocalDirectory {
    accounts: Vec<LocalAccount>,
}

impl LocalDirectory {
    pub fn new(accounts: Vec<LocalAccount>) -> Self {
        if accounts.is_empty() {
            warn!("Local directory has no accounts; nobody can sign in");
        }
        Self { accounts }
    }

    fn find(&self, identifier: &str) -> Option<&LocalAccount> {
        let identifier = identifier.trim();
        self.accounts
            .iter()
            .find(|account| account.email.eq_ignore_ascii_case(identifier))
    }
}

#[async_trait]
impl IdentityProvider for LocalDirectory {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn sign_in(&self, identifier: &str, secret: &str) -> Result<Identity, AuthError> {
        if identifier.trim().is_empty() || secret.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let Some(account) = self.find(identifier).cloned() else {
            return Err(AuthError::InvalidCredentials);
        };

        let secret = secret.to_string();
        let hash = account.password_hash.clone();
        let verified = tokio::task::spawn_blocking(move || verify_password(&secret, &hash))
            .await
            .map_err(|e| AuthError::InternalError(e.to_string()))?;

        match verified {
            Ok(true) => Ok(Identity {
                uid: account.uid,
                email: account.email,
                display_name: account.display_name,
            }),
            Ok(false) => Err(AuthError::InvalidCredentials),
            Err(e) => {
                error!("Stored hash for {} is unusable: {e}", account.uid);
                Err(AuthError::InternalError(e.to_string()))
            }
        }
    }
}
