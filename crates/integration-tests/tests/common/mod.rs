//! Services wired to one in-memory store, plus shortcuts for building
//! boards, posts and threads.
#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use uuid::Uuid;

use domains::{PasswordHasher, Result, VoteChoice, VoteSubmission, VoteTarget};
use services::{
    AccountService, BoardService, CommentService, PostForm, PostService, RegistrationForm,
    SessionService, VoteService,
};
use storage_adapters::MemoryStore;

pub const PASSWORD: &str = "secret1";

/// Reversible stand-in for argon2; keeps account tests fast.
pub struct PlainHasher;

#[async_trait]
impl PasswordHasher for PlainHasher {
    async fn hash(&self, password: &str) -> Result<String> {
        Ok(format!("plain:{password}"))
    }

    async fn verify(&self, password: &str, hash: &str) -> bool {
        hash.strip_prefix("plain:") == Some(password)
    }
}

pub struct Harness {
    pub posts: PostService,
    pub comments: CommentService,
    pub votes: VoteService,
    pub accounts: AccountService,
    pub sessions: SessionService,
    pub boards: BoardService,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            posts: PostService::new(store.clone()),
            comments: CommentService::new(store.clone()),
            votes: VoteService::new(store.clone()),
            accounts: AccountService::new(store.clone(), Arc::new(PlainHasher)),
            sessions: SessionService::new(store.clone(), Duration::days(30)),
            boards: BoardService::new(store),
        }
    }

    pub async fn user(&self, username: &str) -> Uuid {
        let form = RegistrationForm {
            username: username.into(),
            email: format!("{username}@example.com"),
            password: PASSWORD.into(),
        };
        self.accounts.register(&form).await.unwrap().user_id
    }

    pub async fn post(&self, author: Uuid, title: &str, body: &str, tags: &str) -> Uuid {
        self.post_on(author, None, title, body, tags).await
    }

    pub async fn post_on(&self, author: Uuid, board: Option<&str>, title: &str, body: &str, tags: &str) -> Uuid {
        let form = PostForm {
            title: title.into(),
            body: body.into(),
            tags: tags.into(),
            board_id: board.map(str::to_string),
        };
        self.posts.create(author, &form).await.unwrap()
    }

    pub async fn comment(&self, author: Uuid, post_id: Uuid, parent: Option<Uuid>, body: &str) -> Uuid {
        self.comments.create(author, post_id, parent, body).await.unwrap()
    }

    pub async fn vote(&self, user: Uuid, target: VoteTarget, id: Uuid, choice: VoteChoice) {
        self.votes
            .apply(user, VoteSubmission { id, target, choice })
            .await
            .unwrap();
    }
}
