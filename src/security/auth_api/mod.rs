//! Session gate: per-request identity resolution and the route guard built on it.

pub mod config;
pub mod error;
pub mod middleware;
pub mod types;

pub use config::{GateConfig, PathKind};
pub use error::{AuthError, LOGIN_FAILED_MESSAGE};
pub use middleware::{require_session_middleware, session_gate_middleware, HX_REDIRECT};
pub use types::{CurrentUser, GateState};
