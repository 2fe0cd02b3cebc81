use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info, warn};

use super::{Identity, IdentityProvider};
use crate::core::config::RestIdentityConfig;
use crate::security::auth_api::AuthError;

/// Password sign-in against a hosted identity service
/// (`POST {endpoint}?key={api_key}` with `{email, password, returnSecureToken}`).
pub struct RestIdentityProvider {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    email: String,
    #[serde(default)]
    display_name: Option<String>,
}

impl RestIdentityProvider {
    pub fn new(config: &RestIdentityConfig) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                error!("Failed to create HTTP client: {e}");
                AuthError::InternalError(e.to_string())
            })?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl IdentityProvider for RestIdentityProvider {
    fn name(&self) -> &'static str {
        "rest"
    }

    async fn sign_in(&self, identifier: &str, secret: &str) -> Result<Identity, AuthError> {
        let body = SignInRequest {
            email: identifier.trim(),
            password: secret,
            return_secure_token: true,
        };

        let mut request = self.http.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key)]);
        }

        let response = request.send().await.map_err(|e| {
            error!("Identity service unreachable: {e}");
            AuthError::ProviderUnavailable(e.to_string())
        })?;

        let status = response.status();
        if status.is_client_error() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("Sign-in rejected ({status}): {error_text}");
            return Err(AuthError::InvalidCredentials);
        }

        if !status.is_success() {
            error!("Identity service failed with {status}");
            return Err(AuthError::ProviderUnavailable(format!(
                "identity service returned {status}"
            )));
        }

        let data: SignInResponse = response.json().await.map_err(|e| {
            error!("Failed to parse sign-in response: {e}");
            AuthError::ProviderUnavailable(e.to_string())
        })?;

        info!("Signed in {} through identity service", data.local_id);

        Ok(Identity {
            uid: data.local_id,
            email: data.email,
            display_name: data.display_name.filter(|name| !name.is_empty()),
        })
    }
}
