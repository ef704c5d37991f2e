//! Observability module for the Property Search Service.
//!
//! Provides metrics definitions and recording helpers.

pub mod metrics;
