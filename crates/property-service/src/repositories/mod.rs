//! Repository layer for the Property Search Service.
//!
//! # Components
//!
//! - `users` - Credential store (PostgreSQL) for user records
//! - `property_index` - Search index (Elasticsearch) for property documents
//!
//! Each adapter sits behind a trait with an in-memory `mock` implementation.

pub mod property_index;
pub mod users;

pub use property_index::{
    BoolQuery, ElasticsearchPropertyIndex, IndexSearch, Predicate, PropertyField, PropertyIndex,
};
pub use users::{InsertOutcome, PgUserRepository, UserRepository};
