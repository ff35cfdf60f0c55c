//! opsmgr-client - Authenticated Operations Manager API client.
//!
//! The client keeps a cookie/CSRF session against the backend,
//! transparently re-authenticates on session expiry without duplicating
//! the exchange across concurrent callers, and runs batch queries
//! through a bounded concurrent fan-out with an explicit failure
//! policy.
//!
//! # Example
//!
//! ```no_run
//! use opsmgr_client::OpsClient;
//! use opsmgr_core::ConnectionSettings;
//!
//! # async fn example() -> opsmgr_core::Result<()> {
//! let settings = ConnectionSettings::new("https://scom.example.com", "CONTOSO\\reader", "secret")?;
//! let client = OpsClient::connect(settings).await?;
//!
//! let alerts = client.get_alerts("Severity = 2 AND ResolutionState = 0").await?;
//! for alert in alerts.rows {
//!     println!("{}: {}", alert.severity, alert.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
mod endpoints;
pub mod fanout;
mod frames;
pub mod queries;
pub mod resource;
mod session;
mod transport;

pub use auth::{BasicExchange, CredentialExchange};
pub use client::{HealthStatus, OpsClient};
pub use fanout::FailurePolicy;
pub use queries::QueryResponse;
