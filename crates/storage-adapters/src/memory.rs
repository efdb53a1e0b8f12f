//! # In-memory storage
//!
//! Every port backed by `DashMap` tables. Listings are computed on read the
//! same way the Postgres functions compute them: scores are vote sums,
//! popularity comes from [`domains::ranking::popularity`], and comments are
//! returned in insertion order.
//!
//! Mutations that touch more than one table take `write_gate` so that, for
//! example, a comment's reply count cannot change between counting and
//! deleting.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use domains::ranking::popularity;
use domains::{
    Board, BoardRepository, CommentInfo, CommentRecord, CommentRepository, Credentials, Deletion,
    DomainError, NewBoard, NewComment, NewPost, NewUser, Page, PostDraft, PostInfo, PostRecord,
    PostRepository, Result, SearchHit, SessionData, SessionStore, User, UserRepository, Vote,
    VoteRepository, VoteTarget, DELETED_BODY, MAX_COMMENT_DEPTH,
};

#[derive(Debug, Clone)]
struct UserRow {
    user: User,
    password_hash: String,
}

#[derive(Debug, Clone)]
struct PostRow {
    post_id: Uuid,
    board_id: Option<String>,
    user_id: Option<Uuid>,
    title: String,
    body: String,
    tags: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    seq: u64,
}

#[derive(Debug, Clone)]
struct CommentRow {
    comment_id: Uuid,
    post_id: Uuid,
    parent_id: Option<Uuid>,
    user_id: Option<Uuid>,
    body: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    seq: u64,
}

#[derive(Debug, Clone)]
struct SessionRow {
    data: SessionData,
    expires: DateTime<Utc>,
}

/// Votes keyed by `(user_id, target_id)`.
type VoteTable = DashMap<(Uuid, Uuid), Vote>;

#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<Uuid, UserRow>,
    sessions: DashMap<Uuid, SessionRow>,
    boards: DashMap<String, Board>,
    board_admins: DashMap<(String, Uuid), ()>,
    posts: DashMap<Uuid, PostRow>,
    comments: DashMap<Uuid, CommentRow>,
    post_votes: VoteTable,
    comment_votes: VoteTable,
    seq: AtomicU64,
    write_gate: Mutex<()>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }

    fn votes(&self, target: VoteTarget) -> &VoteTable {
        match target {
            VoteTarget::Post => &self.post_votes,
            VoteTarget::Comment => &self.comment_votes,
        }
    }

    fn username_of(&self, user_id: Option<Uuid>) -> Option<String> {
        user_id.and_then(|id| self.users.get(&id).map(|row| row.user.username.clone()))
    }

    fn score(table: &VoteTable, target_id: Uuid) -> i64 {
        table
            .iter()
            .filter(|entry| entry.key().1 == target_id)
            .map(|entry| entry.value().weight())
            .sum()
    }

    fn viewer_vote(table: &VoteTable, viewer: Option<Uuid>, target_id: Uuid) -> Option<Vote> {
        viewer.and_then(|user| table.get(&(user, target_id)).map(|vote| *vote))
    }

    fn post_info(&self, row: &PostRow, viewer: Option<Uuid>, now: DateTime<Utc>) -> PostInfo {
        let score = Self::score(&self.post_votes, row.post_id);
        let comment_count = self
            .comments
            .iter()
            .filter(|c| c.post_id == row.post_id)
            .count() as i64;
        PostInfo {
            post_id: row.post_id,
            board_id: row.board_id.clone(),
            title: row.title.clone(),
            body: Some(row.body.clone()),
            username: self.username_of(row.user_id),
            tags: row.tags.clone(),
            score,
            popularity: popularity(score, row.created_at, now),
            comment_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
            current_user_voted: Self::viewer_vote(&self.post_votes, viewer, row.post_id),
        }
    }

    fn comment_info(&self, row: &CommentRow, viewer: Option<Uuid>, now: DateTime<Utc>) -> CommentInfo {
        let score = Self::score(&self.comment_votes, row.comment_id);
        CommentInfo {
            comment_id: row.comment_id,
            post_id: row.post_id,
            parent_id: row.parent_id,
            body: row.body.clone(),
            username: self.username_of(row.user_id),
            score,
            popularity: popularity(score, row.created_at, now),
            created_at: row.created_at,
            updated_at: row.updated_at,
            current_user_voted: Self::viewer_vote(&self.comment_votes, viewer, row.comment_id),
            children: Vec::new(),
        }
    }

    /// Snapshot of the post rows matching `keep`, oldest first.
    fn post_rows(&self, keep: impl Fn(&PostRow) -> bool) -> Vec<PostRow> {
        let mut rows: Vec<PostRow> = self
            .posts
            .iter()
            .filter(|entry| keep(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by_key(|row| row.seq);
        rows
    }

    fn most_popular(&self, rows: Vec<PostRow>, viewer: Option<Uuid>, page: Page) -> Vec<PostInfo> {
        let now = Utc::now();
        let mut infos: Vec<PostInfo> = rows.iter().map(|row| self.post_info(row, viewer, now)).collect();
        infos.sort_by(|a, b| {
            b.popularity
                .total_cmp(&a.popularity)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        paginate(infos, page)
    }
}

fn paginate<T>(rows: Vec<T>, page: Page) -> Vec<T> {
    rows.into_iter()
        .skip(page.offset.max(0) as usize)
        .take(page.limit.max(0) as usize)
        .collect()
}

/// Title matches weigh double, like the `A`/`B` weights of the SQL search.
fn relevance(row: &PostRow, terms: &[String]) -> usize {
    let title = row.title.to_lowercase();
    let body = row.body.to_lowercase();
    terms
        .iter()
        .map(|term| 2 * title.matches(term.as_str()).count() + body.matches(term.as_str()).count())
        .sum()
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create_post(&self, post: NewPost) -> Result<Uuid> {
        let _gate = self.write_gate.lock().await;
        let now = Utc::now();
        let post_id = Uuid::new_v4();
        self.posts.insert(
            post_id,
            PostRow {
                post_id,
                board_id: post.board_id,
                user_id: Some(post.author),
                title: post.title,
                body: post.body,
                tags: post.tags,
                created_at: now,
                updated_at: now,
                seq: self.next_seq(),
            },
        );
        self.post_votes.insert((post.author, post_id), Vote::Up);
        Ok(post_id)
    }

    async fn find_post(&self, post_id: Uuid) -> Result<Option<PostRecord>> {
        Ok(self.posts.get(&post_id).map(|row| PostRecord {
            post_id: row.post_id,
            user_id: row.user_id,
        }))
    }

    async fn update_post(&self, owner: Uuid, draft: PostDraft) -> Result<bool> {
        match self.posts.get_mut(&draft.post_id) {
            Some(mut row) if row.user_id == Some(owner) => {
                row.title = draft.title;
                row.body = draft.body;
                row.tags = draft.tags;
                row.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_post(&self, owner: Uuid, post_id: Uuid) -> Result<bool> {
        let _gate = self.write_gate.lock().await;
        if self
            .posts
            .remove_if(&post_id, |_, row| row.user_id == Some(owner))
            .is_none()
        {
            return Ok(false);
        }
        let comment_ids: Vec<Uuid> = self
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .map(|c| c.comment_id)
            .collect();
        for comment_id in &comment_ids {
            self.comments.remove(comment_id);
        }
        self.comment_votes.retain(|(_, target), _| !comment_ids.contains(target));
        self.post_votes.retain(|(_, target), _| *target != post_id);
        debug!(%post_id, comments = comment_ids.len(), "post removed");
        Ok(true)
    }

    async fn find_draft(&self, owner: Uuid, post_id: Uuid) -> Result<Option<PostDraft>> {
        Ok(self
            .posts
            .get(&post_id)
            .filter(|row| row.user_id == Some(owner))
            .map(|row| PostDraft {
                post_id: row.post_id,
                title: row.title.clone(),
                body: row.body.clone(),
                tags: row.tags.clone(),
            }))
    }

    async fn get_post_with_comments(
        &self,
        post_id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<Option<(PostInfo, Vec<CommentInfo>)>> {
        let Some(row) = self.posts.get(&post_id).map(|r| r.value().clone()) else {
            return Ok(None);
        };
        let now = Utc::now();
        let post = self.post_info(&row, viewer, now);

        let mut rows: Vec<CommentRow> = self
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .map(|c| c.value().clone())
            .collect();
        rows.sort_by_key(|c| c.seq);
        let comments = rows.iter().map(|c| self.comment_info(c, viewer, now)).collect();
        Ok(Some((post, comments)))
    }

    async fn top_posts(&self, viewer: Option<Uuid>, page: Page) -> Result<Vec<PostInfo>> {
        let rows = self.post_rows(|_| true);
        Ok(self.most_popular(rows, viewer, page))
    }

    async fn tag_listing(&self, tags: &[String], viewer: Option<Uuid>, page: Page) -> Result<Vec<PostInfo>> {
        let wanted: Vec<String> = tags.iter().map(|t| t.to_lowercase()).collect();
        let rows = self.post_rows(|row| {
            wanted
                .iter()
                .all(|tag| row.tags.iter().any(|t| t.to_lowercase() == *tag))
        });
        Ok(self.most_popular(rows, viewer, page))
    }

    async fn users_posts(&self, username: &str, viewer: Option<Uuid>, page: Page) -> Result<Vec<PostInfo>> {
        let Some(user_id) = self
            .users
            .iter()
            .find(|u| u.user.username.eq_ignore_ascii_case(username))
            .map(|u| u.user.user_id)
        else {
            return Ok(Vec::new());
        };
        let mut rows = self.post_rows(|row| row.user_id == Some(user_id));
        rows.reverse();
        let now = Utc::now();
        let infos = rows.iter().map(|row| self.post_info(row, viewer, now)).collect();
        Ok(paginate(infos, page))
    }

    async fn board_listing(&self, board_id: &str, viewer: Option<Uuid>, page: Page) -> Result<Vec<PostInfo>> {
        let rows = self.post_rows(|row| row.board_id.as_deref() == Some(board_id));
        Ok(self.most_popular(rows, viewer, page))
    }

    async fn search_posts(&self, query: &str, viewer: Option<Uuid>) -> Result<Vec<SearchHit>> {
        let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }
        let mut scored: Vec<(usize, PostRow)> = self
            .post_rows(|_| true)
            .into_iter()
            .map(|row| (relevance(&row, &terms), row))
            .filter(|(hits, _)| *hits > 0)
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.seq.cmp(&a.1.seq)));

        let now = Utc::now();
        Ok(scored
            .iter()
            .enumerate()
            .map(|(i, (_, row))| SearchHit {
                post: self.post_info(row, viewer, now),
                rank: i as i64 + 1,
            })
            .collect())
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create_comment(&self, comment: NewComment) -> Result<Option<Uuid>> {
        let _gate = self.write_gate.lock().await;
        if !self.posts.contains_key(&comment.post_id) {
            return Ok(None);
        }
        if let Some(parent_id) = comment.parent_id {
            let same_post = self
                .comments
                .get(&parent_id)
                .is_some_and(|parent| parent.post_id == comment.post_id);
            if !same_post {
                return Ok(None);
            }
        }

        let now = Utc::now();
        let comment_id = Uuid::new_v4();
        self.comments.insert(
            comment_id,
            CommentRow {
                comment_id,
                post_id: comment.post_id,
                parent_id: comment.parent_id,
                user_id: Some(comment.author),
                body: comment.body,
                created_at: now,
                updated_at: now,
                seq: self.next_seq(),
            },
        );
        self.comment_votes.insert((comment.author, comment_id), Vote::Up);
        Ok(Some(comment_id))
    }

    async fn find_comment(&self, comment_id: Uuid) -> Result<Option<CommentRecord>> {
        let Some(row) = self.comments.get(&comment_id).map(|r| r.value().clone()) else {
            return Ok(None);
        };
        let reply_count = self
            .comments
            .iter()
            .filter(|c| c.parent_id == Some(comment_id))
            .count() as i64;

        let mut depth = 0;
        let mut cursor = row.parent_id;
        while let Some(parent_id) = cursor {
            if depth > MAX_COMMENT_DEPTH {
                break;
            }
            depth += 1;
            cursor = self.comments.get(&parent_id).and_then(|parent| parent.parent_id);
        }

        Ok(Some(CommentRecord {
            comment_id: row.comment_id,
            post_id: row.post_id,
            user_id: row.user_id,
            reply_count,
            depth,
        }))
    }

    async fn update_comment(&self, owner: Uuid, comment_id: Uuid, body: String) -> Result<bool> {
        match self.comments.get_mut(&comment_id) {
            Some(mut row) if row.user_id == Some(owner) => {
                row.body = body;
                row.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_comment(&self, owner: Uuid, comment_id: Uuid) -> Result<Option<Deletion>> {
        let _gate = self.write_gate.lock().await;
        let owned = self
            .comments
            .get(&comment_id)
            .is_some_and(|row| row.user_id == Some(owner));
        if !owned {
            return Ok(None);
        }
        let replies = self
            .comments
            .iter()
            .filter(|c| c.parent_id == Some(comment_id))
            .count() as i64;

        let deletion = Deletion::for_reply_count(replies);
        match deletion {
            Deletion::Soft => {
                if let Some(mut row) = self.comments.get_mut(&comment_id) {
                    row.body = DELETED_BODY.to_string();
                    row.user_id = None;
                    row.updated_at = Utc::now();
                }
            }
            Deletion::Hard => {
                self.comments.remove(&comment_id);
                self.comment_votes.retain(|(_, target), _| *target != comment_id);
            }
        }
        Ok(Some(deletion))
    }
}

#[async_trait]
impl VoteRepository for MemoryStore {
    async fn cast_vote(&self, user_id: Uuid, target: VoteTarget, id: Uuid, vote: Vote) -> Result<()> {
        let exists = match target {
            VoteTarget::Post => self.posts.contains_key(&id),
            VoteTarget::Comment => self.comments.contains_key(&id),
        };
        if !exists {
            return Err(DomainError::NotFound(target.as_str(), id.to_string()));
        }
        self.votes(target).insert((user_id, id), vote);
        Ok(())
    }

    async fn retract_vote(&self, user_id: Uuid, target: VoteTarget, id: Uuid) -> Result<()> {
        self.votes(target).remove(&(user_id, id));
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let _gate = self.write_gate.lock().await;
        let taken = self.users.iter().any(|row| {
            row.user.username.eq_ignore_ascii_case(&user.username)
                || (user.email.is_some() && row.user.email == user.email)
        });
        if taken {
            return Err(DomainError::Conflict(format!("user {} exists", user.username)));
        }
        let created = User {
            user_id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
        };
        self.users.insert(
            created.user_id,
            UserRow {
                user: created.clone(),
                password_hash: user.password_hash,
            },
        );
        Ok(created)
    }

    async fn find_credentials(&self, login: &str) -> Result<Option<Credentials>> {
        let by_email = login.contains('@');
        Ok(self
            .users
            .iter()
            .find(|row| {
                if by_email {
                    row.user.email.as_deref() == Some(login)
                } else {
                    row.user.username.eq_ignore_ascii_case(login)
                }
            })
            .map(|row| Credentials {
                user_id: row.user.user_id,
                username: row.user.username.clone(),
                password_hash: row.password_hash.clone(),
            }))
    }

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>> {
        Ok(self.users.get(&user_id).map(|row| row.user.clone()))
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create(&self, data: SessionData, expires: DateTime<Utc>) -> Result<Uuid> {
        let session_id = Uuid::new_v4();
        self.sessions.insert(session_id, SessionRow { data, expires });
        Ok(session_id)
    }

    async fn read(&self, session_id: Uuid) -> Result<Option<SessionData>> {
        let now = Utc::now();
        Ok(self
            .sessions
            .get(&session_id)
            .filter(|row| row.expires > now)
            .map(|row| row.data.clone()))
    }

    async fn update(&self, session_id: Uuid, data: SessionData, expires: DateTime<Utc>) -> Result<()> {
        if let Some(mut row) = self.sessions.get_mut(&session_id) {
            row.data = data;
            row.expires = expires;
        }
        Ok(())
    }

    async fn delete(&self, session_id: Uuid) -> Result<()> {
        self.sessions.remove(&session_id);
        Ok(())
    }
}

#[async_trait]
impl BoardRepository for MemoryStore {
    async fn create_board(&self, board: NewBoard) -> Result<Board> {
        let _gate = self.write_gate.lock().await;
        if self.boards.contains_key(&board.board_id) {
            return Err(DomainError::Conflict(format!("board {} exists", board.board_id)));
        }
        let created = Board {
            board_id: board.board_id.clone(),
            description: board.description,
            created_at: Utc::now(),
        };
        self.boards.insert(board.board_id.clone(), created.clone());
        self.board_admins.insert((board.board_id, board.admin), ());
        Ok(created)
    }

    async fn get_board(&self, board_id: &str) -> Result<Option<Board>> {
        Ok(self.boards.get(board_id).map(|b| b.value().clone()))
    }
}
