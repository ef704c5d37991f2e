//! Service layer for the Property Search Service.
//!
//! # Components
//!
//! - `user_service` - Registration and login
//! - `session_store` - One tracked session per user, with TTL
//! - `search_service` - Query validation, construction and result mapping

pub mod search_service;
pub mod session_store;
pub mod user_service;

pub use session_store::{InMemorySessionStore, SessionClaim, SessionStore};
