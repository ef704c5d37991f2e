//! Credential store for user records.
//!
//! # Security
//!
//! - All queries use parameterized statements (SQL injection safe)
//! - Password digests are never logged

use crate::errors::PsError;
use crate::models::{NewUser, User};
use sqlx::PgPool;
use tracing::instrument;

/// Result of inserting a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Row written and committed.
    Created,
    /// Store rejected the row on a uniqueness constraint.
    Duplicate,
}

/// Credential store operations (enables mocking).
#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    /// Whether any user has this username OR this email.
    async fn exists(&self, username: &str, email: &str) -> Result<bool, PsError>;

    /// Look up a user by username AND password digest.
    async fn find_by_credentials(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<Option<User>, PsError>;

    /// Insert a user inside a transaction.
    ///
    /// A uniqueness violation is reported as [`InsertOutcome::Duplicate`];
    /// any other failure rolls back and is returned as an error.
    async fn insert(&self, user: &NewUser) -> Result<InsertOutcome, PsError>;

    /// Connectivity check for readiness probes.
    async fn ping(&self) -> Result<(), PsError>;
}

/// PostgreSQL-backed credential store.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip_all, fields(username = %username))]
    async fn exists(&self, username: &str, email: &str) -> Result<bool, PsError> {
        let row: Option<(i32,)> =
            sqlx::query_as("SELECT 1 FROM users WHERE username = $1 OR email = $2 LIMIT 1")
                .bind(username)
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.is_some())
    }

    #[instrument(skip_all, fields(username = %username))]
    async fn find_by_credentials(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<Option<User>, PsError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT username, email
            FROM users
            WHERE username = $1 AND password = $2
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    #[instrument(skip_all, fields(username = %user.username))]
    async fn insert(&self, user: &NewUser) -> Result<InsertOutcome, PsError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("INSERT INTO users (username, email, password) VALUES ($1, $2, $3)")
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .execute(&mut *tx)
            .await;

        match result {
            Ok(_) => {
                tx.commit().await?;
                Ok(InsertOutcome::Created)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(
                        target: "ps.repositories.users",
                        error = %rollback_err,
                        "Rollback after failed insert also failed"
                    );
                }

                if is_unique_violation(&e) {
                    tracing::debug!(
                        target: "ps.repositories.users",
                        "Insert lost a uniqueness race"
                    );
                    Ok(InsertOutcome::Duplicate)
                } else {
                    Err(e.into())
                }
            }
        }
    }

    #[instrument(skip_all)]
    async fn ping(&self) -> Result<(), PsError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

/// In-memory credential store for tests and local runs.
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::Mutex;

    #[derive(Debug, Clone)]
    struct StoredUser {
        username: String,
        email: String,
        password_hash: String,
    }

    /// In-memory [`UserRepository`].
    ///
    /// Enforces the same uniqueness constraints as the `users` table.
    #[derive(Default)]
    pub struct InMemoryUserRepository {
        users: Mutex<Vec<StoredUser>>,
        /// Every call fails with a database error.
        failing: AtomicBool,
        /// `exists` always answers false, so duplicates are only caught on insert.
        stale_existence_check: bool,
    }

    impl InMemoryUserRepository {
        pub fn new() -> Self {
            Self::default()
        }

        /// Store whose existence check never sees committed rows, modelling a
        /// concurrent registration that commits between check and insert.
        pub fn with_stale_existence_check() -> Self {
            Self {
                stale_existence_check: true,
                ..Self::default()
            }
        }

        /// Make every subsequent call fail (or succeed again).
        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        /// Number of stored users.
        pub async fn count(&self) -> usize {
            self.users.lock().await.len()
        }

        /// Stored digest for `username`, if any.
        pub async fn password_hash_of(&self, username: &str) -> Option<String> {
            self.users
                .lock()
                .await
                .iter()
                .find(|u| u.username == username)
                .map(|u| u.password_hash.clone())
        }

        fn check_failing(&self) -> Result<(), PsError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(PsError::Database("mock store unavailable".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait::async_trait]
    impl UserRepository for InMemoryUserRepository {
        async fn exists(&self, username: &str, email: &str) -> Result<bool, PsError> {
            self.check_failing()?;
            if self.stale_existence_check {
                return Ok(false);
            }

            let users = self.users.lock().await;
            Ok(users
                .iter()
                .any(|u| u.username == username || u.email == email))
        }

        async fn find_by_credentials(
            &self,
            username: &str,
            password_hash: &str,
        ) -> Result<Option<User>, PsError> {
            self.check_failing()?;

            let users = self.users.lock().await;
            Ok(users
                .iter()
                .find(|u| u.username == username && u.password_hash == password_hash)
                .map(|u| User {
                    username: u.username.clone(),
                    email: u.email.clone(),
                }))
        }

        async fn insert(&self, user: &NewUser) -> Result<InsertOutcome, PsError> {
            self.check_failing()?;

            let mut users = self.users.lock().await;
            if users
                .iter()
                .any(|u| u.username == user.username || u.email == user.email)
            {
                return Ok(InsertOutcome::Duplicate);
            }

            users.push(StoredUser {
                username: user.username.clone(),
                email: user.email.clone(),
                password_hash: user.password_hash.clone(),
            });
            Ok(InsertOutcome::Created)
        }

        async fn ping(&self) -> Result<(), PsError> {
            self.check_failing()
        }
    }

}
