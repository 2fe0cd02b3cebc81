//! Application bootstrap, routing and the HTTP server loop.

mod bootstrap;
mod health;
mod server;

pub use bootstrap::*;
pub use health::*;
pub use server::*;
