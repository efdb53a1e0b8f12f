//! Users and server-side sessions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use uuid::Uuid;

use domains::{Credentials, NewUser, Result, SessionData, SessionStore, User, UserRepository};

use super::rows::{CredentialsRow, UserRow};
use super::{db_error, PgStore};

#[async_trait]
impl UserRepository for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let row: UserRow = sqlx::query_as(
            "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) \
             RETURNING user_id, username, email",
        )
        .bind(user.username)
        .bind(user.email)
        .bind(user.password_hash)
        .fetch_one(self.pool())
        .await
        .map_err(db_error)?;
        Ok(User {
            user_id: row.user_id,
            username: row.username,
            email: row.email,
        })
    }

    async fn find_credentials(&self, login: &str) -> Result<Option<Credentials>> {
        let sql = if login.contains('@') {
            "SELECT user_id, username, password_hash FROM users WHERE email = $1"
        } else {
            "SELECT user_id, username, password_hash FROM users WHERE lower(username) = lower($1)"
        };
        let row: Option<CredentialsRow> = sqlx::query_as(sql)
            .bind(login)
            .fetch_optional(self.pool())
            .await
            .map_err(db_error)?;
        Ok(row.map(|r| Credentials {
            user_id: r.user_id,
            username: r.username,
            password_hash: r.password_hash,
        }))
    }

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT user_id, username, email FROM users WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(self.pool())
                .await
                .map_err(db_error)?;
        Ok(row.map(|r| User {
            user_id: r.user_id,
            username: r.username,
            email: r.email,
        }))
    }
}

#[async_trait]
impl SessionStore for PgStore {
    async fn create(&self, data: SessionData, expires: DateTime<Utc>) -> Result<Uuid> {
        sqlx::query_scalar("INSERT INTO sessions (data, expires) VALUES ($1, $2) RETURNING session_id")
            .bind(Json(data))
            .bind(expires)
            .fetch_one(self.pool())
            .await
            .map_err(db_error)
    }

    async fn read(&self, session_id: Uuid) -> Result<Option<SessionData>> {
        let data: Option<Json<SessionData>> =
            sqlx::query_scalar("SELECT data FROM sessions WHERE session_id = $1 AND expires > now()")
                .bind(session_id)
                .fetch_optional(self.pool())
                .await
                .map_err(db_error)?;
        Ok(data.map(|Json(data)| data))
    }

    async fn update(&self, session_id: Uuid, data: SessionData, expires: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE sessions SET data = $2, expires = $3 WHERE session_id = $1")
            .bind(session_id)
            .bind(Json(data))
            .bind(expires)
            .execute(self.pool())
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn delete(&self, session_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE session_id = $1")
            .bind(session_id)
            .execute(self.pool())
            .await
            .map_err(db_error)?;
        Ok(())
    }
}
