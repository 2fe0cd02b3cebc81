pub mod error;
pub mod models;
#[cfg(feature = "postgres")]
pub mod schema;
pub mod state;
pub mod utils;

pub use error::ApiError;
pub use models::{
    format_date, lookup, resolve, Analyst, Document, Entry, Reason, RecordId, Stored, Support,
    Ticket, ValidationError, UNRESOLVED,
};
pub use state::{AppState, Stores};
