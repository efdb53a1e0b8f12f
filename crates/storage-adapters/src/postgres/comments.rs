use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use domains::{CommentRecord, CommentRepository, Deletion, NewComment, Result, DELETED_BODY, MAX_COMMENT_DEPTH};

use super::{db_error, PgStore};

#[async_trait]
impl CommentRepository for PgStore {
    async fn create_comment(&self, comment: NewComment) -> Result<Option<Uuid>> {
        sqlx::query_scalar("SELECT create_comment($1, $2, $3, $4)")
            .bind(comment.author)
            .bind(comment.post_id)
            .bind(comment.parent_id)
            .bind(comment.body)
            .fetch_one(self.pool())
            .await
            .map_err(db_error)
    }

    async fn find_comment(&self, comment_id: Uuid) -> Result<Option<CommentRecord>> {
        let row: Option<(Uuid, Uuid, Option<Uuid>, i64, i64)> = sqlx::query_as(
            "WITH RECURSIVE ancestors(comment_id, parent_id, depth) AS ( \
                 SELECT comment_id, parent_id, 0::bigint FROM posts_comments WHERE comment_id = $1 \
                 UNION ALL \
                 SELECT p.comment_id, p.parent_id, a.depth + 1 \
                   FROM posts_comments p JOIN ancestors a ON p.comment_id = a.parent_id \
                  WHERE a.depth <= $2 \
             ) \
             SELECT c.comment_id, c.post_id, c.user_id, \
                    (SELECT count(*) FROM posts_comments r WHERE r.parent_id = c.comment_id), \
                    (SELECT max(depth) FROM ancestors) \
               FROM posts_comments c WHERE c.comment_id = $1",
        )
        .bind(comment_id)
        .bind(MAX_COMMENT_DEPTH)
        .fetch_optional(self.pool())
        .await
        .map_err(db_error)?;
        Ok(row.map(|(comment_id, post_id, user_id, reply_count, depth)| CommentRecord {
            comment_id,
            post_id,
            user_id,
            reply_count,
            depth,
        }))
    }

    async fn update_comment(&self, owner: Uuid, comment_id: Uuid, body: String) -> Result<bool> {
        let done = sqlx::query("UPDATE posts_comments SET body = $3 WHERE comment_id = $1 AND user_id = $2")
            .bind(comment_id)
            .bind(owner)
            .bind(body)
            .execute(self.pool())
            .await
            .map_err(db_error)?;
        Ok(done.rows_affected() == 1)
    }

    async fn delete_comment(&self, owner: Uuid, comment_id: Uuid) -> Result<Option<Deletion>> {
        let mut tx = self.pool().begin().await.map_err(db_error)?;

        // The row lock blocks new replies until the decision is applied.
        let replies: Option<i64> = sqlx::query_scalar(
            "SELECT (SELECT count(*) FROM posts_comments r WHERE r.parent_id = c.comment_id) \
               FROM posts_comments c WHERE c.comment_id = $1 AND c.user_id = $2 \
                FOR UPDATE OF c",
        )
        .bind(comment_id)
        .bind(owner)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error)?;
        let Some(replies) = replies else {
            return Ok(None);
        };

        let deletion = Deletion::for_reply_count(replies);
        match deletion {
            Deletion::Soft => {
                sqlx::query("UPDATE posts_comments SET body = $2, user_id = NULL WHERE comment_id = $1")
                    .bind(comment_id)
                    .bind(DELETED_BODY)
                    .execute(&mut *tx)
                    .await
                    .map_err(db_error)?;
            }
            Deletion::Hard => {
                sqlx::query("DELETE FROM posts_comments WHERE comment_id = $1")
                    .bind(comment_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(db_error)?;
            }
        }
        tx.commit().await.map_err(db_error)?;
        debug!(%comment_id, replies, ?deletion, "comment removed");
        Ok(Some(deletion))
    }
}
