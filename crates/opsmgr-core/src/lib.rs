//! opsmgr-core - Shared types for the opsmgr Operations Manager client.
//!
//! This crate holds everything both the HTTP client and its consumers
//! need to agree on: the error taxonomy, connection settings, session
//! tokens, the tagged query model, the backend's wire types, and the
//! frame shape query results are rendered into.

pub mod api;
pub mod error;
pub mod frame;
pub mod query;
pub mod settings;
pub mod tokens;

pub use error::{Error, ErrorOrigin};
pub use frame::{Field, Frame};
pub use query::{Query, QueryRequest};
pub use settings::{AuthScheme, ConnectionSettings};
pub use tokens::SessionTokens;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
