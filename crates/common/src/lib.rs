//! Common utilities and types shared across the property search crates.

#![warn(clippy::pedantic)]

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for JWT utilities (signing, validation, claims, constants)
pub mod jwt;
