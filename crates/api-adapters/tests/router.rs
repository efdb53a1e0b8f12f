//! End-to-end requests through the axum router over the in-memory store.

use std::sync::Arc;

use argon2::Params;
use axum::body::Body;
use axum::http::header::{ACCEPT, CONTENT_TYPE, COOKIE, LOCATION, REFERER, SET_COOKIE};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use tower::ServiceExt;

use api_adapters::{router, AppState};
use auth_adapters::{Argon2Hasher, HmacSessionCodec};
use storage_adapters::MemoryStore;

const SECRET: &[u8] = b"router-test-secret-that-is-long-enough";

fn app() -> Router {
    let hasher = Argon2Hasher::with_params(Params::new(8, 1, 1, None).unwrap());
    let codec = HmacSessionCodec::new(SECRET).unwrap();
    let state = AppState::new(
        Arc::new(MemoryStore::new()),
        Arc::new(hasher),
        Arc::new(codec),
        chrono::Duration::days(30),
        false,
    );
    router(state, "static")
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response) -> &str {
    response.headers().get(LOCATION).unwrap().to_str().unwrap()
}

/// Registers `username` and returns the `name=value` cookie pair.
async fn register(app: &Router, username: &str) -> String {
    let body = format!("username={username}&email=&password=secret1");
    let response = send(app, post_form("/register", &body, None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let set_cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

/// Creates a post and returns its id.
async fn create_post(app: &Router, cookie: &str, title: &str, tags: &str) -> String {
    let body = format!("title={title}&body=Some+words&tags={tags}&board_id=");
    let response = send(app, post_form("/create-post", &body, Some(cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    location(&response).trim_start_matches("/p/").to_string()
}

#[tokio::test]
async fn fresh_board_has_an_empty_front_page() {
    let app = app();
    let response = send(&app, get("/", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = text(response).await;
    assert!(html.contains("No posts yet."));
    assert!(html.contains(r#"href="/login""#));
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app();
    let response = send(&app, get("/health", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&text(response).await).unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn anonymous_get_is_sent_to_login_with_the_page() {
    let app = app();
    let response = send(&app, get("/create-post", None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?redirectTo=%2Fcreate-post");
}

#[tokio::test]
async fn anonymous_post_returns_to_the_referring_page() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/vote")
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(REFERER, "http://localhost:3000/p/abc")
        .body(Body::from("id=x&type=post&vote=up"))
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?redirectTo=%2Fp%2Fabc");
}

#[tokio::test]
async fn registering_sets_a_signed_session_cookie() {
    let app = app();
    let response = send(&app, post_form("/register", "username=ada&password=secret1", None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let set_cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
    assert!(set_cookie.starts_with("doot_session="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Max-Age=2592000"));
    assert!(!set_cookie.contains("Secure"));
}

#[tokio::test]
async fn forged_cookie_is_treated_as_anonymous() {
    let app = app();
    let forged = format!("doot_session={}.bm90LWEtc2lnbmF0dXJl", uuid::Uuid::new_v4());
    let response = send(&app, get("/create-post", Some(&forged))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/login"));
}

#[tokio::test]
async fn bad_credentials_rerender_the_form() {
    let app = app();
    register(&app, "ada").await;
    let response = send(&app, post_form("/login", "username=ada&password=wrong-one", None)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().get(SET_COOKIE).is_none());
    let html = text(response).await;
    assert!(html.contains("Username/Password combination is incorrect"));
}

#[tokio::test]
async fn login_honours_redirect_to() {
    let app = app();
    register(&app, "ada").await;
    let body = "username=ada&password=secret1&redirectTo=%2Ft%2Frust";
    let response = send(&app, post_form("/login", body, None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/t/rust");
}

#[tokio::test]
async fn posted_content_shows_up_on_listings() {
    let app = app();
    let cookie = register(&app, "ada").await;
    let post_id = create_post(&app, &cookie, "Hello+crabs", "rust").await;

    let page = text(send(&app, get(&format!("/p/{post_id}"), None)).await).await;
    assert!(page.contains("Hello crabs"));

    let tagged = text(send(&app, get("/t/rust", None)).await).await;
    assert!(tagged.contains("Hello crabs"));

    let other = text(send(&app, get("/t/python", None)).await).await;
    assert!(other.contains("no tags found"));

    let by_user = text(send(&app, get("/u/ada", None)).await).await;
    assert!(by_user.contains("Hello crabs"));

    let found = text(send(&app, get("/search?q=crabs", None)).await).await;
    assert!(found.contains("Hello crabs"));
}

#[tokio::test]
async fn invalid_post_rerenders_with_field_errors() {
    let app = app();
    let cookie = register(&app, "ada").await;
    let response = send(&app, post_form("/create-post", "title=&body=x&tags=", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(text(response).await.contains(r#"class="error""#));
}

#[tokio::test]
async fn only_the_author_may_edit() {
    let app = app();
    let ada = register(&app, "ada").await;
    let bob = register(&app, "bob").await;
    let post_id = create_post(&app, &ada, "Mine", "misc").await;

    let uri = format!("/edit-post?id={post_id}");
    assert_eq!(send(&app, get(&uri, Some(&ada))).await.status(), StatusCode::OK);
    assert_eq!(send(&app, get(&uri, Some(&bob))).await.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unknown_and_malformed_posts_are_not_found() {
    let app = app();
    let missing = format!("/p/{}", uuid::Uuid::new_v4());
    assert_eq!(send(&app, get(&missing, None)).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(send(&app, get("/p/not-a-uuid", None)).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn comments_answer_json_when_asked() {
    let app = app();
    let cookie = register(&app, "ada").await;
    let post_id = create_post(&app, &cookie, "Thread", "misc").await;

    let json_comment = |body: String| {
        Request::builder()
            .method(Method::POST)
            .uri("/create-comment")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(ACCEPT, "application/json")
            .header(COOKIE, cookie.as_str())
            .body(Body::from(body))
            .unwrap()
    };

    let response = send(&app, json_comment(format!("postId={post_id}&body="))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let errors: serde_json::Value = serde_json::from_str(&text(response).await).unwrap();
    assert!(errors["fieldErrors"]["body"].is_string());

    let response = send(&app, json_comment(format!("postId={post_id}&body=first"))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let created: serde_json::Value = serde_json::from_str(&text(response).await).unwrap();
    let comment_id = created["commentId"].as_str().unwrap().to_string();

    let page = text(send(&app, get(&format!("/p/{post_id}"), None)).await).await;
    assert!(page.contains(&format!(r#"id="c-{comment_id}""#)));
}

#[tokio::test]
async fn refused_comment_edit_stays_on_the_post_page() {
    let app = app();
    let cookie = register(&app, "ada").await;
    let post_id = create_post(&app, &cookie, "Edits", "misc").await;

    let created = send(&app, post_form("/create-comment", &format!("postId={post_id}&body=original"), Some(&cookie))).await;
    assert_eq!(created.status(), StatusCode::SEE_OTHER);
    let comment_id = location(&created).rsplit("#c-").next().unwrap().to_string();

    let response = send(
        &app,
        post_form("/edit-comment", &format!("id={comment_id}&postId={post_id}&body="), Some(&cookie)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = text(response).await;
    assert!(!html.contains("error-page"));
    assert!(html.contains(&format!(r#"id="c-{comment_id}""#)));
    assert!(html.contains("please enter a comment"));
    assert!(html.contains("<details open>"));

    let page = text(send(&app, get(&format!("/p/{post_id}"), None)).await).await;
    assert!(page.contains("original"));
}

#[tokio::test]
async fn malformed_vote_is_a_bad_request() {
    let app = app();
    let cookie = register(&app, "ada").await;
    let response = send(&app, post_form("/vote", "id=nope&type=post&vote=up", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(text(response).await, "Invalid parameters");
}

#[tokio::test]
async fn voting_redirects_back() {
    let app = app();
    let cookie = register(&app, "ada").await;
    let post_id = create_post(&app, &cookie, "Votes", "misc").await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/vote")
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(COOKIE, cookie.as_str())
        .header(REFERER, format!("http://localhost/p/{post_id}"))
        .body(Body::from(format!("id={post_id}&type=post&vote=null")))
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/p/{post_id}"));
}

#[tokio::test]
async fn logout_ends_the_session() {
    let app = app();
    let cookie = register(&app, "ada").await;

    let response = send(&app, post_form("/logout", "", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cleared = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cleared.contains("Max-Age=0"));

    let response = send(&app, get("/create-post", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn metrics_count_created_posts() {
    let app = app();
    let cookie = register(&app, "ada").await;
    create_post(&app, &cookie, "Counted", "misc").await;

    let response = send(&app, get("/metrics", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(text(response).await.contains("doot_posts_created_total 1"));
}
