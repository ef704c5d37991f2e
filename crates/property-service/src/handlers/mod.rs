//! HTTP request handlers for the Property Search Service.

pub mod auth;
pub mod health;
pub mod metrics;
pub mod search;

pub use auth::{login, signup};
pub use health::{health_check, readiness_check};
pub use metrics::metrics_handler;
pub use search::search;
