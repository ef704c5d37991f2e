//! Property Search Service Library
//!
//! This library provides the core functionality for the property search
//! web service:
//!
//! - User registration and login (SHA-256 password digests, HS256 JWTs)
//! - One tracked session per user with a fixed token lifetime
//! - Access guard for protected routes
//! - Property search with validation, wildcard matching and price sorting
//!
//! # Architecture
//!
//! The service follows the Handler -> Service -> Repository pattern:
//!
//! ```text
//! routes/mod.rs -> handlers/*.rs -> services/*.rs -> repositories/*.rs
//! ```
//!
//! The credential store, the search index and the session store are reached
//! through traits so that tests can swap in the in-memory `mock` modules.
//!
//! # Modules
//!
//! - `config` - Service configuration from environment
//! - `crypto` - Password digests and user token helpers
//! - `errors` - Error types with HTTP status code mapping
//! - `handlers` - HTTP request handlers
//! - `middleware` - Access guard and HTTP metrics middleware
//! - `models` - Request/response and domain models
//! - `observability` - Prometheus metrics
//! - `repositories` - Credential store and search index adapters
//! - `routes` - Axum router setup
//! - `services` - Authentication, session and search logic
//! - `tasks` - Background tasks

pub mod config;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod tasks;
