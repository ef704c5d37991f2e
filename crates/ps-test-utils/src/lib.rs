//! # PS Test Utilities
//!
//! Shared test utilities for the Property Search Service.
//!
//! This crate provides:
//! - Server test harness (`TestPsServer` for E2E tests)
//! - Token helpers for exercising the access guard
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ps_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> Result<(), anyhow::Error> {
//!     let server = TestPsServer::spawn().await?;
//!
//!     let response = reqwest::get(format!("{}/health", server.url())).await?;
//!
//!     assert_eq!(response.status(), 200);
//!     Ok(())
//! }
//! ```

pub mod server_harness;
pub mod tokens;

// Re-export commonly used items
pub use server_harness::*;
pub use tokens::*;
