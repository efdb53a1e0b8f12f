//! # HTTP surface
//!
//! axum router over the services. Handlers render askama pages; the session
//! cookie is resolved by the [`Viewer`] and [`SignedIn`] extractors.

mod error;
mod handlers;
mod session;

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info_span;

use domains::{
    BoardRepository, CommentRepository, PasswordHasher, PostRepository, SessionCodec, SessionStore,
    UserRepository, VoteRepository,
};
use services::{
    AccountService, BoardService, CommentService, PostService, SessionService, VoteService,
};

use crate::metrics::Metrics;

pub use error::ApiError;
pub use session::{session_cookie, SignedIn, Viewer, SESSION_COOKIE};

/// Shared by every handler. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<PostService>,
    pub comments: Arc<CommentService>,
    pub votes: Arc<VoteService>,
    pub accounts: Arc<AccountService>,
    pub sessions: Arc<SessionService>,
    pub boards: Arc<BoardService>,
    pub codec: Arc<dyn SessionCodec>,
    pub metrics: Arc<Metrics>,
    /// Adds `Secure` to the session cookie
    pub secure_cookies: bool,
}

impl AppState {
    /// Wires every service to one store implementing all storage ports.
    pub fn new<S>(
        store: Arc<S>,
        hasher: Arc<dyn PasswordHasher>,
        codec: Arc<dyn SessionCodec>,
        session_ttl: chrono::Duration,
        secure_cookies: bool,
    ) -> Self
    where
        S: PostRepository
            + CommentRepository
            + VoteRepository
            + UserRepository
            + SessionStore
            + BoardRepository
            + 'static,
    {
        Self {
            posts: Arc::new(PostService::new(store.clone())),
            comments: Arc::new(CommentService::new(store.clone())),
            votes: Arc::new(VoteService::new(store.clone())),
            accounts: Arc::new(AccountService::new(store.clone(), hasher)),
            sessions: Arc::new(SessionService::new(store.clone(), session_ttl)),
            boards: Arc::new(BoardService::new(store)),
            codec,
            metrics: Arc::new(Metrics::new()),
            secure_cookies,
        }
    }
}

pub fn router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    use handlers::{auth, boards, comments, listing, ops, posts, votes};

    Router::new()
        .route("/", get(listing::home))
        .route("/p/{post_id}", get(posts::show))
        .route("/t/{tags}", get(listing::tagged))
        .route("/u", get(listing::me))
        .route("/u/{username}", get(listing::user))
        .route("/b/{board}", get(listing::board))
        .route("/search", get(listing::search).post(listing::search_form))
        .route("/create-post", get(posts::new_form).post(posts::create))
        .route("/edit-post", get(posts::edit_form).post(posts::update))
        .route("/delete-post", post(posts::delete))
        .route("/create-comment", post(comments::create))
        .route("/edit-comment", post(comments::update))
        .route("/delete-comment", post(comments::delete))
        .route("/vote", post(votes::vote))
        .route("/create-board", get(boards::new_form).post(boards::create))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/register", get(auth::register_form).post(auth::register))
        .route("/logout", get(auth::logout_form).post(auth::logout))
        .route("/health", get(ops::health))
        .route("/metrics", get(ops::metrics))
        .nest_service("/static", ServeDir::new(static_dir.as_ref()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("");
                    info_span!(
                        "http.request",
                        request_id = %request_id,
                        method = %request.method(),
                        route = %request.uri().path(),
                    )
                }))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}
