//! HTTP Adapter - Service API over axum
//!
//! Sub-modules:
//! - `auth`: Bearer secret verification for the trigger endpoints
//! - `error`: Error-to-response mapping
//! - `routes`: Router, handlers and server

pub mod auth;
pub mod error;
pub mod routes;

pub use auth::TriggerAuth;
pub use error::ApiError;
pub use routes::{router, ApiServer, ApiState};
