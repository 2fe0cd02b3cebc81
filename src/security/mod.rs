pub mod auth_api;
pub mod password;
pub mod session;

pub use auth_api::{AuthError, CurrentUser, GateConfig, GateState};
pub use password::{hash_password, verify_password, Argon2Config, SecretHasher};
pub use session::{InMemorySessionStore, Session, SessionConfig, SessionManager, SessionStore};
