use async_trait::async_trait;
use sqlx::types::Json;
use uuid::Uuid;

use domains::{
    CommentInfo, NewPost, Page, PostDraft, PostInfo, PostRecord, PostRepository, Result, SearchHit,
};

use super::rows::{PostPage, PostRow, SearchRow};
use super::{db_error, PgStore};

impl PgStore {
    async fn listing(&self, sql: &str, key: &str, viewer: Option<Uuid>, page: Page) -> Result<Vec<PostInfo>> {
        let rows: Vec<PostRow> = sqlx::query_as(sql)
            .bind(key)
            .bind(viewer)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(self.pool())
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(PostInfo::from).collect())
    }
}

#[async_trait]
impl PostRepository for PgStore {
    async fn create_post(&self, post: NewPost) -> Result<Uuid> {
        sqlx::query_scalar("SELECT create_post($1, $2, $3, $4, $5)")
            .bind(post.author)
            .bind(post.board_id)
            .bind(post.title)
            .bind(post.body)
            .bind(post.tags)
            .fetch_one(self.pool())
            .await
            .map_err(db_error)
    }

    async fn find_post(&self, post_id: Uuid) -> Result<Option<PostRecord>> {
        let row: Option<(Uuid, Option<Uuid>)> =
            sqlx::query_as("SELECT post_id, user_id FROM posts WHERE post_id = $1")
                .bind(post_id)
                .fetch_optional(self.pool())
                .await
                .map_err(db_error)?;
        Ok(row.map(|(post_id, user_id)| PostRecord { post_id, user_id }))
    }

    async fn update_post(&self, owner: Uuid, draft: PostDraft) -> Result<bool> {
        let done = sqlx::query(
            "UPDATE posts SET title = $3, body = $4, tags = $5 WHERE post_id = $1 AND user_id = $2",
        )
        .bind(draft.post_id)
        .bind(owner)
        .bind(draft.title)
        .bind(draft.body)
        .bind(draft.tags)
        .execute(self.pool())
        .await
        .map_err(db_error)?;
        Ok(done.rows_affected() == 1)
    }

    async fn delete_post(&self, owner: Uuid, post_id: Uuid) -> Result<bool> {
        let done = sqlx::query("DELETE FROM posts WHERE post_id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(owner)
            .execute(self.pool())
            .await
            .map_err(db_error)?;
        Ok(done.rows_affected() == 1)
    }

    async fn find_draft(&self, owner: Uuid, post_id: Uuid) -> Result<Option<PostDraft>> {
        let row: Option<(Uuid, String, String, Vec<String>)> = sqlx::query_as(
            "SELECT post_id, title, body, tags FROM posts WHERE post_id = $1 AND user_id = $2",
        )
        .bind(post_id)
        .bind(owner)
        .fetch_optional(self.pool())
        .await
        .map_err(db_error)?;
        Ok(row.map(|(post_id, title, body, tags)| PostDraft {
            post_id,
            title,
            body,
            tags,
        }))
    }

    async fn get_post_with_comments(
        &self,
        post_id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<Option<(PostInfo, Vec<CommentInfo>)>> {
        let page: Option<Json<PostPage>> = sqlx::query_scalar("SELECT get_post_with_comments($1, $2)")
            .bind(post_id)
            .bind(viewer)
            .fetch_one(self.pool())
            .await
            .map_err(db_error)?;
        Ok(page.map(|Json(page)| (page.post, page.comments)))
    }

    async fn top_posts(&self, viewer: Option<Uuid>, page: Page) -> Result<Vec<PostInfo>> {
        let rows: Vec<PostRow> = sqlx::query_as("SELECT * FROM top_posts($1, $2, $3)")
            .bind(viewer)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(self.pool())
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(PostInfo::from).collect())
    }

    async fn tag_listing(&self, tags: &[String], viewer: Option<Uuid>, page: Page) -> Result<Vec<PostInfo>> {
        let rows: Vec<PostRow> = sqlx::query_as("SELECT * FROM tag_listing($1, $2, $3, $4)")
            .bind(tags)
            .bind(viewer)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(self.pool())
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(PostInfo::from).collect())
    }

    async fn users_posts(&self, username: &str, viewer: Option<Uuid>, page: Page) -> Result<Vec<PostInfo>> {
        self.listing("SELECT * FROM users_posts($1, $2, $3, $4)", username, viewer, page)
            .await
    }

    async fn board_listing(&self, board_id: &str, viewer: Option<Uuid>, page: Page) -> Result<Vec<PostInfo>> {
        self.listing("SELECT * FROM board_listing($1, $2, $3, $4)", board_id, viewer, page)
            .await
    }

    async fn search_posts(&self, query: &str, viewer: Option<Uuid>) -> Result<Vec<SearchHit>> {
        let rows: Vec<SearchRow> = sqlx::query_as("SELECT * FROM search_posts($1, $2)")
            .bind(query)
            .bind(viewer)
            .fetch_all(self.pool())
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(SearchHit::from).collect())
    }
}
