use axum::{extract::FromRequestParts, http::request::Parts};

use super::error::AuthError;
use crate::directory::Identity;

/// Identity resolution for one request:
/// `Uninitialized -> Resolving -> Resolved(identity | none)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GateState {
    #[default]
    Uninitialized,
    Resolving,
    Resolved(Option<Identity>),
}

impl GateState {
    pub fn begin(&mut self) {
        *self = Self::Resolving;
    }

    pub fn finish(&mut self, identity: Option<Identity>) {
        *self = Self::Resolved(identity);
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Resolved(identity) => identity.as_ref(),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        !matches!(self, Self::Resolved(_))
    }
}

/// The signed-in identity; rejects with 401 when the gate resolved nobody.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<GateState>()
            .and_then(GateState::identity)
            .cloned()
            .map(CurrentUser)
            .ok_or(AuthError::MissingSession)
    }
}
