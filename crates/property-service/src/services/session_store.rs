//! Active session tracking.
//!
//! At most one token is tracked per username. Entries carry a TTL equal to
//! the token lifetime; they expire lazily on read and are evicted in bulk by
//! the session sweeper task. A new login replaces the entry, so an old
//! expiry can never remove a newer session.

use crate::errors::PsError;
use crate::observability::metrics::set_active_sessions;
use common::secret::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Outcome of [`SessionStore::claim`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionClaim {
    /// A live session already existed; its token is returned unchanged.
    Existing(String),
    /// A new token was minted and recorded.
    Inserted(String),
}

/// Predicate deciding whether a tracked token is still usable.
pub type TokenLiveness<'a> = dyn Fn(&str) -> bool + Send + Sync + 'a;

/// Mints a new token for the claiming user.
pub type TokenMinter<'a> = dyn Fn() -> Result<String, PsError> + Send + Sync + 'a;

/// Per-user session tracking (enables swapping the backing store).
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Token tracked for `username`, if its entry has not expired.
    async fn get(&self, username: &str) -> Option<String>;

    /// Track `token` for `username`, replacing any prior entry.
    async fn put(&self, username: &str, token: String, ttl: Duration);

    /// Atomically return the live session for `username`, or mint and track
    /// a new one.
    ///
    /// An entry counts as live when it is unexpired AND `is_live` accepts its
    /// token. Concurrent claims for the same user are serialized.
    async fn claim(
        &self,
        username: &str,
        ttl: Duration,
        is_live: &TokenLiveness<'_>,
        mint: &TokenMinter<'_>,
    ) -> Result<SessionClaim, PsError>;

    /// Stop tracking `username`. Returns whether an entry was removed.
    async fn remove(&self, username: &str) -> bool;

    /// Evict every expired entry. Returns the number evicted.
    async fn sweep(&self) -> usize;

    /// Number of tracked entries, expired or not.
    async fn len(&self) -> usize;
}

struct SessionEntry {
    token: SecretString,
    expires_at: Instant,
}

impl SessionEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// In-process [`SessionStore`] guarded by a single lock.
#[derive(Default)]
pub struct InMemorySessionStore {
    entries: Mutex<HashMap<String, SessionEntry>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, username: &str) -> Option<String> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        let expired = entries.get(username)?.is_expired(now);
        if expired {
            entries.remove(username);
            set_active_sessions(entries.len());
            return None;
        }

        entries
            .get(username)
            .map(|entry| entry.token.expose_secret().to_string())
    }

    async fn put(&self, username: &str, token: String, ttl: Duration) {
        let mut entries = self.entries.lock().await;
        entries.insert(
            username.to_string(),
            SessionEntry {
                token: SecretString::from(token),
                expires_at: Instant::now() + ttl,
            },
        );
        set_active_sessions(entries.len());
    }

    async fn claim(
        &self,
        username: &str,
        ttl: Duration,
        is_live: &TokenLiveness<'_>,
        mint: &TokenMinter<'_>,
    ) -> Result<SessionClaim, PsError> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        if let Some(entry) = entries.get(username) {
            let token = entry.token.expose_secret();
            if !entry.is_expired(now) && is_live(token) {
                return Ok(SessionClaim::Existing(token.to_string()));
            }
        }

        let token = mint()?;
        entries.insert(
            username.to_string(),
            SessionEntry {
                token: SecretString::from(token.clone()),
                expires_at: now + ttl,
            },
        );
        set_active_sessions(entries.len());

        Ok(SessionClaim::Inserted(token))
    }

    async fn remove(&self, username: &str) -> bool {
        let mut entries = self.entries.lock().await;
        let removed = entries.remove(username).is_some();
        set_active_sessions(entries.len());
        removed
    }

    async fn sweep(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        let before = entries.len();

        entries.retain(|_, entry| !entry.is_expired(now));

        set_active_sessions(entries.len());
        before - entries.len()
    }

    async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}
