//! Fills a database with a demo account, a board, a few posts and a small
//! comment thread. Safe to rerun: an existing demo account is reused.

use std::sync::Arc;

use anyhow::{bail, Context};
use secrecy::ExposeSecret;
use tracing::info;
use tracing_subscriber::EnvFilter;

use auth_adapters::Argon2Hasher;
use configs::Settings;
use domains::{DomainError, User, VoteChoice, VoteSubmission, VoteTarget};
use services::{
    AccountService, BoardForm, BoardService, CommentService, LoginForm, PostForm, PostService,
    RegistrationForm, VoteService,
};
use storage_adapters::PgStore;

const DEMO_PASSWORD: &str = "doot-demo";

const POSTS: [(&str, &str, &str); 3] = [
    (
        "Welcome to doot",
        "Posts support **markdown**. Links like https://www.rust-lang.org are linked for you.",
        "meta",
    ),
    (
        "Which async runtime do you use?",
        "Curious what people run in production.",
        "rust, async",
    ),
    (
        "Show us your side project",
        "Anything goes. Screenshots welcome.",
        "projects",
    ),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::load().context("loading settings")?;
    let Some(url) = settings.database.url.as_ref() else {
        bail!("DATABASE_URL must be set to seed");
    };
    let store = Arc::new(
        PgStore::connect(url.expose_secret(), settings.database.max_connections)
            .await
            .context("connecting to postgres")?,
    );
    store.migrate().await.context("running migrations")?;

    let accounts = AccountService::new(store.clone(), Arc::new(Argon2Hasher::new()));
    let alice = demo_user(&accounts, "alice").await?;
    let bob = demo_user(&accounts, "bob").await?;

    let boards = BoardService::new(store.clone());
    let board = BoardForm {
        board_id: "general".into(),
        description: "Anything and everything".into(),
    };
    match boards.create(alice.user_id, &board).await {
        Ok(_) => info!(board = %board.board_id, "board created"),
        Err(DomainError::Rejected(_)) => info!(board = %board.board_id, "board already exists"),
        Err(err) => return Err(err.into()),
    }

    let posts = PostService::new(store.clone());
    let comments = CommentService::new(store.clone());
    let votes = VoteService::new(store.clone());

    for (title, body, tags) in POSTS {
        let form = PostForm {
            title: title.into(),
            body: body.into(),
            tags: tags.into(),
            board_id: Some(board.board_id.clone()),
        };
        let post_id = posts.create(alice.user_id, &form).await?;

        let root = comments
            .create(bob.user_id, post_id, None, "First! Nice to see this up.")
            .await?;
        comments
            .create(alice.user_id, post_id, Some(root), "Thanks, glad you made it.")
            .await?;
        votes
            .apply(
                bob.user_id,
                VoteSubmission {
                    id: post_id,
                    target: VoteTarget::Post,
                    choice: VoteChoice::Up,
                },
            )
            .await?;
        info!(%post_id, title, "post seeded");
    }

    info!(password = DEMO_PASSWORD, "seeded users alice and bob");
    Ok(())
}

/// Registers `username`, or logs in when the account already exists.
async fn demo_user(accounts: &AccountService, username: &str) -> anyhow::Result<User> {
    let registration = RegistrationForm {
        username: username.into(),
        email: format!("{username}@example.com"),
        password: DEMO_PASSWORD.into(),
    };
    match accounts.register(&registration).await {
        Ok(user) => Ok(user),
        Err(DomainError::Rejected(_)) => {
            let login = LoginForm {
                username: username.into(),
                password: DEMO_PASSWORD.into(),
            };
            Ok(accounts.login(&login).await?)
        }
        Err(err) => Err(err.into()),
    }
}
