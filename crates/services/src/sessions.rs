//! Server-side sessions. The cookie only carries the session id; who is
//! logged in lives in the [`SessionStore`].

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::debug;
use uuid::Uuid;

use domains::{Result, SessionData, SessionStore};

/// Thirty days, matching the cookie's `Max-Age`.
pub const DEFAULT_TTL_DAYS: i64 = 30;

pub struct SessionService {
    store: Arc<dyn SessionStore>,
    ttl: Duration,
}

impl SessionService {
    pub fn new(store: Arc<dyn SessionStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Opens a session for `user_id` and returns its id.
    pub async fn start(&self, user_id: Uuid) -> Result<Uuid> {
        let data = SessionData { user_id: Some(user_id) };
        let session_id = self.store.create(data, Utc::now() + self.ttl).await?;
        debug!(%session_id, %user_id, "session started");
        Ok(session_id)
    }

    /// The user behind a live session, if any.
    pub async fn user_id(&self, session_id: Uuid) -> Result<Option<Uuid>> {
        Ok(self.store.read(session_id).await?.and_then(|data| data.user_id))
    }

    /// Pushes the expiry of a live session forward.
    pub async fn refresh(&self, session_id: Uuid) -> Result<bool> {
        match self.store.read(session_id).await? {
            Some(data) => {
                self.store.update(session_id, data, Utc::now() + self.ttl).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub async fn end(&self, session_id: Uuid) -> Result<()> {
        self.store.delete(session_id).await?;
        debug!(%session_id, "session ended");
        Ok(())
    }
}
