//! # Core Traits (Ports)
//!
//! Any adapter must implement these traits to be wired into the binary.
//! Ranking, scoring and search relevance belong to the storage side; the
//! methods below return rows already ordered the way each listing needs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

use crate::error::Result;
use crate::models::{
    Board, CommentInfo, CommentRecord, Credentials, NewBoard, NewComment, NewPost, NewUser, Page,
    PostDraft, PostInfo, PostRecord, SearchHit, SessionData, User,
};
use crate::thread::Deletion;
use crate::vote::{Vote, VoteTarget};

/// Post persistence and every post listing.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Inserts the post together with the author's own up-vote.
    async fn create_post(&self, post: NewPost) -> Result<Uuid>;
    async fn find_post(&self, post_id: Uuid) -> Result<Option<PostRecord>>;
    /// Returns `false` when no post with that id is owned by `owner`.
    async fn update_post(&self, owner: Uuid, draft: PostDraft) -> Result<bool>;
    async fn delete_post(&self, owner: Uuid, post_id: Uuid) -> Result<bool>;
    /// The editable fields of a post owned by `owner`.
    async fn find_draft(&self, owner: Uuid, post_id: Uuid) -> Result<Option<PostDraft>>;

    /// The post plus its comments, flat, each with its `parent_id`.
    async fn get_post_with_comments(
        &self,
        post_id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<Option<(PostInfo, Vec<CommentInfo>)>>;

    /// Most popular first.
    async fn top_posts(&self, viewer: Option<Uuid>, page: Page) -> Result<Vec<PostInfo>>;
    /// Posts carrying every tag in `tags` (case-insensitive), most popular first.
    async fn tag_listing(&self, tags: &[String], viewer: Option<Uuid>, page: Page) -> Result<Vec<PostInfo>>;
    /// Newest first.
    async fn users_posts(&self, username: &str, viewer: Option<Uuid>, page: Page) -> Result<Vec<PostInfo>>;
    /// Most popular first.
    async fn board_listing(&self, board_id: &str, viewer: Option<Uuid>, page: Page) -> Result<Vec<PostInfo>>;
    /// Ordered by ascending `rank`.
    async fn search_posts(&self, query: &str, viewer: Option<Uuid>) -> Result<Vec<SearchHit>>;
}

#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Inserts the comment with the author's up-vote. `Ok(None)` when the post
    /// does not exist or `parent_id` belongs to another post.
    async fn create_comment(&self, comment: NewComment) -> Result<Option<Uuid>>;
    async fn find_comment(&self, comment_id: Uuid) -> Result<Option<CommentRecord>>;
    async fn update_comment(&self, owner: Uuid, comment_id: Uuid, body: String) -> Result<bool>;
    /// Removes a comment owned by `owner`, choosing soft or hard deletion from
    /// its reply count inside one atomic step. `Ok(None)` when nothing matched.
    async fn delete_comment(&self, owner: Uuid, comment_id: Uuid) -> Result<Option<Deletion>>;
}

#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait VoteRepository: Send + Sync {
    /// Inserts or replaces the viewer's vote on the target.
    async fn cast_vote(&self, user_id: Uuid, target: VoteTarget, id: Uuid, vote: Vote) -> Result<()>;
    /// Removes the viewer's vote; a no-op when there is none.
    async fn retract_vote(&self, user_id: Uuid, target: VoteTarget, id: Uuid) -> Result<()>;
}

#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `DomainError::Conflict` when the username or email is taken.
    async fn create_user(&self, user: NewUser) -> Result<User>;
    /// Looks `login` up by email when it contains `@`, else by username.
    async fn find_credentials(&self, login: &str) -> Result<Option<Credentials>>;
    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>>;
}

/// Server-side session rows, referenced by the id carried in the cookie.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self, data: SessionData, expires: DateTime<Utc>) -> Result<Uuid>;
    /// Only sessions whose expiry is still in the future.
    async fn read(&self, session_id: Uuid) -> Result<Option<SessionData>>;
    async fn update(&self, session_id: Uuid, data: SessionData, expires: DateTime<Utc>) -> Result<()>;
    async fn delete(&self, session_id: Uuid) -> Result<()>;
}

#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait BoardRepository: Send + Sync {
    /// Creates the board and records `admin` as its first administrator.
    async fn create_board(&self, board: NewBoard) -> Result<Board>;
    async fn get_board(&self, board_id: &str) -> Result<Option<Board>>;
}

/// Credential hashing contract.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, password: &str) -> Result<String>;
    /// `false` for a mismatch or an unparseable hash.
    async fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Turns session ids into tamper-evident cookie values and back.
#[cfg_attr(any(test, feature = "testing"), automock)]
pub trait SessionCodec: Send + Sync {
    fn encode(&self, session_id: Uuid) -> String;
    /// `None` for anything not produced by `encode` with the same key.
    fn decode(&self, value: &str) -> Option<Uuid>;
}
