//! # Domain Models
//!
//! These structs represent the core entities of doot. Listing rows arrive
//! already scored and ranked by storage; nothing here recomputes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::vote::Vote;

/// Rows shown per listing page.
pub const PAGE_SIZE: i64 = 30;

/// An authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: Uuid,
    pub username: String,
    pub email: Option<String>,
}

/// What storage needs to verify a login attempt.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user_id: Uuid,
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
}

/// A named collection of posts (e.g., /b/rust)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// The URL slug, also the primary key
    pub board_id: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// A post as it appears in any listing, scored for the current viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostInfo {
    pub post_id: Uuid,
    pub board_id: Option<String>,
    pub title: String,
    pub body: Option<String>,
    /// `None` once the author account is gone
    pub username: Option<String>,
    pub tags: Vec<String>,
    pub score: i64,
    pub popularity: f64,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub current_user_voted: Option<Vote>,
}

/// A full-text search result. `rank` is the 1-based relevance position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub post: PostInfo,
    pub rank: i64,
}

/// A comment and, once nested by [`crate::thread::build_tree`], its replies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentInfo {
    pub comment_id: Uuid,
    pub post_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub body: String,
    /// Cleared when the comment is soft-deleted
    pub username: Option<String>,
    pub score: i64,
    pub popularity: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub current_user_voted: Option<Vote>,
    #[serde(default)]
    pub children: Vec<CommentInfo>,
}

/// Ownership of a stored post, used before mutating it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
    pub post_id: Uuid,
    pub user_id: Option<Uuid>,
}

/// Ownership and shape of a stored comment, used before mutating it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRecord {
    pub comment_id: Uuid,
    pub post_id: Uuid,
    pub user_id: Option<Uuid>,
    pub reply_count: i64,
    /// Number of ancestors; top-level comments are 0.
    pub depth: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub author: Uuid,
    pub board_id: Option<String>,
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
}

/// The owner-editable fields of a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDraft {
    pub post_id: Uuid,
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub author: Uuid,
    pub post_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBoard {
    pub board_id: String,
    pub description: String,
    pub admin: Uuid,
}

/// Server-side session payload; persisted as JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub user_id: Option<Uuid>,
}

/// Limit/offset window over a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    /// Builds the window for a 1-based page number; anything below 1 is page 1.
    pub fn number(page: u32) -> Self {
        let page = i64::from(page.max(1));
        Self {
            limit: PAGE_SIZE,
            offset: (page - 1) * PAGE_SIZE,
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::number(1)
    }
}
