//! Shared types for Na'Guara
//!
//! Domain models, request/response payloads and the unified error
//! system used by the server and its tests.

pub mod error;
pub mod models;

// Re-exports
pub use axum::Json;
pub use http;
pub use rust_decimal::Decimal;
pub use serde::{Deserialize, Serialize};
