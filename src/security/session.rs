use anyhow::{anyhow, Result};
use axum::http::{header, HeaderMap};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::directory::Identity;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub idle_timeout_minutes: i64,
    pub absolute_timeout_hours: i64,
    pub max_concurrent_sessions: usize,
    pub session_id_length: usize,
    pub cookie_name: String,
    pub cookie_secure: bool,
    pub cookie_http_only: bool,
    pub cookie_same_site: SameSite,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_minutes: 30,
            absolute_timeout_hours: 24,
            max_concurrent_sessions: 5,
            session_id_length: 32,
            cookie_name: "portal_session".into(),
            cookie_secure: true,
            cookie_http_only: true,
            cookie_same_site: SameSite::Lax,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "Strict",
            Self::Lax => "Lax",
            Self::None => "None",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Active,
    Expired,
    Revoked,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub identity: Identity,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub absolute_expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(identity: Identity, config: &SessionConfig) -> Self {
        let now = Utc::now();
        let idle_duration = Duration::minutes(config.idle_timeout_minutes);
        let absolute_duration = Duration::hours(config.absolute_timeout_hours);

        Self {
            id: generate_session_id(config.session_id_length),
            identity,
            status: SessionStatus::Active,
            created_at: now,
            last_accessed_at: now,
            expires_at: now + idle_duration,
            absolute_expires_at: now + absolute_duration,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.status == SessionStatus::Active && !self.is_expired()
    }

    pub fn is_expired(&self) -> bool {
        let now = Utc::now();
        now > self.expires_at || now > self.absolute_expires_at
    }

    pub fn touch(&mut self, idle_timeout_minutes: i64) {
        let now = Utc::now();
        self.last_accessed_at = now;
        self.expires_at = now + Duration::minutes(idle_timeout_minutes);
    }

    pub fn revoke(&mut self) {
        self.status = SessionStatus::Revoked;
    }

    pub fn time_until_expiry(&self) -> Duration {
        let idle_remaining = self.expires_at - Utc::now();
        let absolute_remaining = self.absolute_expires_at - Utc::now();

        if idle_remaining < absolute_remaining {
            idle_remaining
        } else {
            absolute_remaining
        }
    }
}

pub trait SessionStore: Send + Sync {
    fn create(&self, session: Session) -> impl std::future::Future<Output = Result<()>> + Send;
    fn get(&self, session_id: &str) -> impl std::future::Future<Output = Result<Option<Session>>> + Send;
    fn update(&self, session: &Session) -> impl std::future::Future<Output = Result<()>> + Send;
    fn delete(&self, session_id: &str) -> impl std::future::Future<Output = Result<()>> + Send;
    fn get_identity_sessions(&self, uid: &str) -> impl std::future::Future<Output = Result<Vec<Session>>> + Send;
    fn cleanup_expired(&self) -> impl std::future::Future<Output = Result<usize>> + Send;
}

#[derive(Debug, Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl SessionStore for InMemorySessionStore {
    async fn create(&self, session: Session) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn get(&self, session_id: &str) -> Result<Option<Session>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_id).cloned())
    }

    async fn update(&self, session: &Session) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.id) {
            sessions.insert(session.id.clone(), session.clone());
            Ok(())
        } else {
            Err(anyhow!("Session not found: {}", session.id))
        }
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(session_id);
        Ok(())
    }

    async fn get_identity_sessions(&self, uid: &str) -> Result<Vec<Session>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .values()
            .filter(|s| s.identity.uid == uid)
            .cloned()
            .collect())
    }

    async fn cleanup_expired(&self) -> Result<usize> {
        let mut sessions = self.sessions.write().await;
        let initial_count = sessions.len();
        sessions.retain(|_, s| s.is_valid());
        Ok(initial_count - sessions.len())
    }
}

pub struct SessionManager<S: SessionStore> {
    store: S,
    config: SessionConfig,
}

impl<S: SessionStore> SessionManager<S> {
    pub fn new(store: S, config: SessionConfig) -> Self {
        Self { store, config }
    }

    pub async fn create_session(&self, identity: Identity) -> Result<Session> {
        let existing_sessions = self.store.get_identity_sessions(&identity.uid).await?;
        let mut active: Vec<_> = existing_sessions
            .into_iter()
            .filter(|s| s.is_valid())
            .collect();

        if active.len() >= self.config.max_concurrent_sessions {
            active.sort_by_key(|s| s.last_accessed_at);
            let sessions_to_remove = active.len() - self.config.max_concurrent_sessions + 1;
            for session in active.iter().take(sessions_to_remove) {
                self.store.delete(&session.id).await?;
                debug!("Removed oldest session {} for {}", session.id, identity.uid);
            }
        }

        let session = Session::new(identity, &self.config);
        self.store.create(session.clone()).await?;
        info!("Created session for {}", session.identity.uid);

        Ok(session)
    }

    pub async fn validate_session(&self, session_id: &str) -> Result<Option<Session>> {
        let session = match self.store.get(session_id).await? {
            Some(s) => s,
            None => return Ok(None),
        };

        if !session.is_valid() {
            if session.is_expired() {
                self.store.delete(session_id).await?;
                debug!("Cleaned up expired session");
            }
            return Ok(None);
        }

        Ok(Some(session))
    }

    /// Validates the session and extends its idle window.
    pub async fn resolve(&self, session_id: &str) -> Result<Option<Session>> {
        let Some(mut session) = self.validate_session(session_id).await? else {
            return Ok(None);
        };

        session.touch(self.config.idle_timeout_minutes);
        self.store.update(&session).await?;

        Ok(Some(session))
    }

    pub async fn revoke_session(&self, session_id: &str) -> Result<bool> {
        let mut session = match self.store.get(session_id).await? {
            Some(s) => s,
            None => return Ok(false),
        };

        session.revoke();
        self.store.update(&session).await?;
        info!("Revoked session for {}", session.identity.uid);

        Ok(true)
    }

    pub async fn get_identity_sessions(&self, uid: &str) -> Result<Vec<Session>> {
        let sessions = self.store.get_identity_sessions(uid).await?;
        Ok(sessions.into_iter().filter(|s| s.is_valid()).collect())
    }

    pub async fn cleanup_expired_sessions(&self) -> Result<usize> {
        let cleaned = self.store.cleanup_expired().await?;
        if cleaned > 0 {
            info!("Cleaned up {cleaned} expired sessions");
        }
        Ok(cleaned)
    }

    pub fn session_id_from_headers(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(|cookie| extract_session_id_from_cookie(cookie, &self.config.cookie_name))
    }

    pub fn build_cookie(&self, session: &Session) -> String {
        let max_age = session.time_until_expiry().num_seconds().max(0);
        format!(
            "{}={}; Path=/; Max-Age={max_age}{}",
            self.config.cookie_name,
            session.id,
            self.cookie_attributes()
        )
    }

    pub fn build_logout_cookie(&self) -> String {
        format!(
            "{}=; Path=/; Max-Age=0{}",
            self.config.cookie_name,
            self.cookie_attributes()
        )
    }

    fn cookie_attributes(&self) -> String {
        let secure = if self.config.cookie_secure {
            "; Secure"
        } else {
            ""
        };
        let http_only = if self.config.cookie_http_only {
            "; HttpOnly"
        } else {
            ""
        };
        format!(
            "{secure}{http_only}; SameSite={}",
            self.config.cookie_same_site.as_str()
        )
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

pub fn generate_session_id(length: usize) -> String {
    use rand::Rng;

    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();

    (0..length)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

pub fn extract_session_id_from_cookie(cookie_header: &str, cookie_name: &str) -> Option<String> {
    for cookie in cookie_header.split(';') {
        let cookie = cookie.trim();
        if let Some((name, value)) = cookie.split_once('=') {
            if name.trim() == cookie_name && !value.trim().is_empty() {
                return Some(value.trim().to_string());
            }
        }
    }
    None
}
