//! Post creation, editing, deletion and every listing page.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use domains::validation::validate_post;
use domains::{
    build_tree, CommentInfo, DomainError, NewPost, Page, PostDraft, PostInfo, PostRepository,
    Result, SearchHit,
};

/// The create/edit post form as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    /// Comma-separated
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub board_id: Option<String>,
}

/// A post with its comments nested (storage order among siblings).
#[derive(Debug, Clone, PartialEq)]
pub struct PostThread {
    pub post: PostInfo,
    pub comments: Vec<CommentInfo>,
}

pub struct PostService {
    repo: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(repo: Arc<dyn PostRepository>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self, form), fields(author = %author))]
    pub async fn create(&self, author: Uuid, form: &PostForm) -> Result<Uuid> {
        let tags = validate_post(&form.title, &form.body, &form.tags).map_err(DomainError::Validation)?;
        let board_id = form
            .board_id
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(str::to_string);

        let post_id = self
            .repo
            .create_post(NewPost {
                author,
                board_id,
                title: form.title.clone(),
                body: form.body.clone(),
                tags,
            })
            .await?;
        info!(%post_id, "post created");
        Ok(post_id)
    }

    /// The owner's editable copy of a post.
    pub async fn draft(&self, author: Uuid, post_id: Uuid) -> Result<PostDraft> {
        self.ensure_owner(author, post_id).await?;
        self.repo
            .find_draft(author, post_id)
            .await?
            .ok_or_else(|| DomainError::NotFound("post", post_id.to_string()))
    }

    #[instrument(skip(self, form), fields(author = %author))]
    pub async fn edit(&self, author: Uuid, post_id: Uuid, form: &PostForm) -> Result<()> {
        let tags = validate_post(&form.title, &form.body, &form.tags).map_err(DomainError::Validation)?;
        self.ensure_owner(author, post_id).await?;

        let draft = PostDraft {
            post_id,
            title: form.title.clone(),
            body: form.body.clone(),
            tags,
        };
        if !self.repo.update_post(author, draft).await? {
            return Err(DomainError::NotFound("post", post_id.to_string()));
        }
        info!(%post_id, "post edited");
        Ok(())
    }

    #[instrument(skip(self), fields(author = %author))]
    pub async fn delete(&self, author: Uuid, post_id: Uuid) -> Result<()> {
        self.ensure_owner(author, post_id).await?;
        if !self.repo.delete_post(author, post_id).await? {
            return Err(DomainError::NotFound("post", post_id.to_string()));
        }
        info!(%post_id, "post deleted");
        Ok(())
    }

    async fn ensure_owner(&self, author: Uuid, post_id: Uuid) -> Result<()> {
        let record = self
            .repo
            .find_post(post_id)
            .await?
            .ok_or_else(|| DomainError::NotFound("post", post_id.to_string()))?;
        if record.user_id != Some(author) {
            return Err(DomainError::Forbidden("only the author can change this post".to_string()));
        }
        Ok(())
    }

    /// The post page: the post and its comments nested into a tree.
    pub async fn thread(&self, post_id: Uuid, viewer: Option<Uuid>) -> Result<PostThread> {
        let (post, flat) = self
            .repo
            .get_post_with_comments(post_id, viewer)
            .await?
            .ok_or_else(|| DomainError::NotFound("post", post_id.to_string()))?;
        Ok(PostThread {
            post,
            comments: build_tree(flat),
        })
    }

    pub async fn top(&self, viewer: Option<Uuid>, page: Page) -> Result<Vec<PostInfo>> {
        self.repo.top_posts(viewer, page).await
    }

    /// `raw` is the `+`-joined tag path segment, e.g. `rust+web`.
    pub async fn tagged(&self, raw: &str, viewer: Option<Uuid>, page: Page) -> Result<Vec<PostInfo>> {
        let tags = split_tag_path(raw);
        if tags.is_empty() {
            return Ok(Vec::new());
        }
        self.repo.tag_listing(&tags, viewer, page).await
    }

    pub async fn by_user(&self, username: &str, viewer: Option<Uuid>, page: Page) -> Result<Vec<PostInfo>> {
        self.repo.users_posts(username, viewer, page).await
    }

    pub async fn on_board(&self, board_id: &str, viewer: Option<Uuid>, page: Page) -> Result<Vec<PostInfo>> {
        self.repo.board_listing(board_id, viewer, page).await
    }

    #[instrument(skip(self))]
    pub async fn search(&self, query: &str, viewer: Option<Uuid>) -> Result<Vec<SearchHit>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let mut hits = self.repo.search_posts(query, viewer).await?;
        hits.sort_by_key(|hit| hit.rank);
        Ok(hits)
    }
}

fn split_tag_path(raw: &str) -> Vec<String> {
    raw.split('+')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
