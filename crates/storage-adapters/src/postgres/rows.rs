//! Row shapes returned by the stored functions.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

use domains::{CommentInfo, PostInfo, SearchHit, Vote};

fn parse_vote(raw: Option<String>) -> Option<Vote> {
    raw.and_then(|v| v.parse().ok())
}

/// One `post_row` from `post_rows()` and the listings built on it.
#[derive(Debug, FromRow)]
pub(crate) struct PostRow {
    pub post_id: Uuid,
    pub board_id: Option<String>,
    pub title: String,
    pub body: Option<String>,
    pub username: Option<String>,
    pub tags: Vec<String>,
    pub score: i64,
    pub popularity: f64,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub current_user_voted: Option<String>,
}

impl From<PostRow> for PostInfo {
    fn from(row: PostRow) -> Self {
        PostInfo {
            post_id: row.post_id,
            board_id: row.board_id,
            title: row.title,
            body: row.body,
            username: row.username,
            tags: row.tags,
            score: row.score,
            popularity: row.popularity,
            comment_count: row.comment_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
            current_user_voted: parse_vote(row.current_user_voted),
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct SearchRow {
    #[sqlx(flatten)]
    pub post: PostRow,
    pub rank: i64,
}

impl From<SearchRow> for SearchHit {
    fn from(row: SearchRow) -> Self {
        SearchHit {
            post: row.post.into(),
            rank: row.rank,
        }
    }
}

/// The jsonb document produced by `get_post_with_comments()`.
#[derive(Debug, Deserialize)]
pub(crate) struct PostPage {
    pub post: PostInfo,
    pub comments: Vec<CommentInfo>,
}

#[derive(Debug, FromRow)]
pub(crate) struct CredentialsRow {
    pub user_id: Uuid,
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    pub user_id: Uuid,
    pub username: String,
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_page_documents_decode_into_domain_models() {
        let doc = serde_json::json!({
            "post": {
                "postId": "8f5f0b0e-4a8f-4d2b-9f2e-3f3e2c6f8a11",
                "boardId": null,
                "title": "hello",
                "body": "world",
                "username": "ada",
                "tags": ["rust"],
                "score": 3,
                "popularity": 0.5,
                "commentCount": 1,
                "createdAt": "2024-05-01T12:00:00.123456+00:00",
                "updatedAt": "2024-05-01T12:00:00.123456+00:00",
                "currentUserVoted": "up"
            },
            "comments": [{
                "commentId": "1b7c6f2e-0c43-4d8e-a1a4-3d6b1f2f7c01",
                "postId": "8f5f0b0e-4a8f-4d2b-9f2e-3f3e2c6f8a11",
                "parentId": null,
                "body": "[deleted]",
                "username": null,
                "score": 0,
                "popularity": 0.0,
                "createdAt": "2024-05-01T13:00:00+00:00",
                "updatedAt": "2024-05-01T13:00:00+00:00",
                "currentUserVoted": null
            }]
        });

        let page: PostPage = serde_json::from_value(doc).unwrap();
        assert_eq!(page.post.current_user_voted, Some(Vote::Up));
        assert_eq!(page.comments.len(), 1);
        assert!(page.comments[0].children.is_empty());
        assert_eq!(page.comments[0].username, None);
    }

    #[test]
    fn unknown_vote_text_reads_as_no_vote() {
        assert_eq!(parse_vote(Some("sideways".into())), None);
        assert_eq!(parse_vote(Some("down".into())), Some(Vote::Down));
    }
}
