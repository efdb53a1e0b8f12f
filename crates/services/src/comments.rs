//! Comment creation, editing and deletion.
//!
//! Deletion never orphans replies: a comment with children is soft-deleted
//! (body replaced, author unlinked) and only leaf comments are removed.

use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use domains::validation::{validate_comment_body, validate_reply_depth};
use domains::{CommentRecord, CommentRepository, Deletion, DomainError, FieldErrors, NewComment, Result};

pub struct CommentService {
    repo: Arc<dyn CommentRepository>,
}

impl CommentService {
    pub fn new(repo: Arc<dyn CommentRepository>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self, body), fields(author = %author))]
    pub async fn create(
        &self,
        author: Uuid,
        post_id: Uuid,
        parent_id: Option<Uuid>,
        body: &str,
    ) -> Result<Uuid> {
        check_body(body)?;
        if let Some(parent_id) = parent_id {
            let parent = self
                .repo
                .find_comment(parent_id)
                .await?
                .ok_or_else(|| DomainError::NotFound("comment", parent_id.to_string()))?;
            let mut errors = FieldErrors::new();
            errors.check("parentId", validate_reply_depth(parent.depth));
            errors.into_result().map_err(DomainError::Validation)?;
        }
        let comment_id = self
            .repo
            .create_comment(NewComment {
                author,
                post_id,
                parent_id,
                body: body.to_string(),
            })
            .await?
            .ok_or_else(|| DomainError::NotFound("post", post_id.to_string()))?;
        info!(%comment_id, "comment created");
        Ok(comment_id)
    }

    #[instrument(skip(self, body), fields(author = %author))]
    pub async fn edit(&self, author: Uuid, comment_id: Uuid, body: &str) -> Result<CommentRecord> {
        check_body(body)?;
        let record = self.owned(author, comment_id).await?;
        if !self.repo.update_comment(author, comment_id, body.to_string()).await? {
            return Err(DomainError::NotFound("comment", comment_id.to_string()));
        }
        Ok(record)
    }

    /// Returns the comment's post and how it was removed.
    #[instrument(skip(self), fields(author = %author))]
    pub async fn delete(&self, author: Uuid, comment_id: Uuid) -> Result<(Uuid, Deletion)> {
        let record = self.owned(author, comment_id).await?;
        let deletion = self
            .repo
            .delete_comment(author, comment_id)
            .await?
            .ok_or_else(|| DomainError::NotFound("comment", comment_id.to_string()))?;
        info!(%comment_id, ?deletion, "comment deleted");
        Ok((record.post_id, deletion))
    }

    async fn owned(&self, author: Uuid, comment_id: Uuid) -> Result<CommentRecord> {
        let record = self
            .repo
            .find_comment(comment_id)
            .await?
            .ok_or_else(|| DomainError::NotFound("comment", comment_id.to_string()))?;
        if record.user_id != Some(author) {
            return Err(DomainError::Forbidden("only the author can change this comment".to_string()));
        }
        Ok(record)
    }
}

fn check_body(body: &str) -> Result<()> {
    let mut errors = FieldErrors::new();
    errors.check("body", validate_comment_body(body));
    errors.into_result().map_err(DomainError::Validation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{MockCommentRepository, MAX_COMMENT_DEPTH};

    fn record(id: Uuid, owner: Option<Uuid>, replies: i64) -> CommentRecord {
        CommentRecord {
            comment_id: id,
            post_id: Uuid::from_u128(7),
            user_id: owner,
            reply_count: replies,
            depth: 0,
        }
    }

    #[tokio::test]
    async fn empty_body_is_a_field_error() {
        let mut repo = MockCommentRepository::new();
        repo.expect_create_comment().never();

        let service = CommentService::new(Arc::new(repo));
        let err = service.create(Uuid::new_v4(), Uuid::new_v4(), None, "").await.unwrap_err();
        match err {
            DomainError::Validation(fields) => {
                assert_eq!(fields.get("body"), Some("please enter a comment"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn comment_on_unknown_post_is_not_found() {
        let mut repo = MockCommentRepository::new();
        repo.expect_create_comment().returning(|_| Ok(None));

        let service = CommentService::new(Arc::new(repo));
        let err = service
            .create(Uuid::new_v4(), Uuid::new_v4(), None, "hi")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound("post", _)));
    }

    #[tokio::test]
    async fn reply_to_unknown_comment_is_not_found() {
        let mut repo = MockCommentRepository::new();
        repo.expect_find_comment().returning(|_| Ok(None));
        repo.expect_create_comment().never();

        let service = CommentService::new(Arc::new(repo));
        let err = service
            .create(Uuid::new_v4(), Uuid::new_v4(), Some(Uuid::new_v4()), "hi")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound("comment", _)));
    }

    #[tokio::test]
    async fn replies_stop_at_the_depth_limit() {
        let mut repo = MockCommentRepository::new();
        repo.expect_find_comment().returning(|id| {
            Ok(Some(CommentRecord {
                depth: MAX_COMMENT_DEPTH,
                ..record(id, None, 0)
            }))
        });
        repo.expect_create_comment().never();

        let service = CommentService::new(Arc::new(repo));
        let err = service
            .create(Uuid::new_v4(), Uuid::new_v4(), Some(Uuid::new_v4()), "deeper")
            .await
            .unwrap_err();
        match err {
            DomainError::Validation(fields) => assert!(fields.get("parentId").is_some()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn replies_just_under_the_limit_are_stored() {
        let mut repo = MockCommentRepository::new();
        repo.expect_find_comment().returning(|id| {
            Ok(Some(CommentRecord {
                depth: MAX_COMMENT_DEPTH - 1,
                ..record(id, None, 0)
            }))
        });
        repo.expect_create_comment()
            .times(1)
            .returning(|_| Ok(Some(Uuid::from_u128(3))));

        let service = CommentService::new(Arc::new(repo));
        let id = service
            .create(Uuid::new_v4(), Uuid::new_v4(), Some(Uuid::new_v4()), "last")
            .await
            .unwrap();
        assert_eq!(id, Uuid::from_u128(3));
    }

    #[tokio::test]
    async fn delete_reports_the_storage_decision() {
        let owner = Uuid::new_v4();
        let mut repo = MockCommentRepository::new();
        repo.expect_find_comment()
            .returning(move |id| Ok(Some(record(id, Some(owner), 2))));
        repo.expect_delete_comment()
            .times(1)
            .returning(|_, _| Ok(Some(Deletion::Soft)));

        let service = CommentService::new(Arc::new(repo));
        let (post_id, deletion) = service.delete(owner, Uuid::new_v4()).await.unwrap();
        assert_eq!(post_id, Uuid::from_u128(7));
        assert_eq!(deletion, Deletion::Soft);
    }

    #[tokio::test]
    async fn soft_deleted_comments_belong_to_nobody() {
        let mut repo = MockCommentRepository::new();
        repo.expect_find_comment().returning(|id| Ok(Some(record(id, None, 1))));
        repo.expect_update_comment().never();

        let service = CommentService::new(Arc::new(repo));
        let err = service.edit(Uuid::new_v4(), Uuid::new_v4(), "again").await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }
}
