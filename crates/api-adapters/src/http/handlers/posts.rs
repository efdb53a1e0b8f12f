//! The post page and the create/edit/delete post forms.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;
use uuid::Uuid;

use domains::{CommentSort, DomainError};
use services::PostForm;

use super::{parse_id, render, IdParam};
use crate::http::{ApiError, AppState, SignedIn, Viewer};
use crate::views::{
    comment_thread, login_href, post_card, CommentDraft, DraftSlot, Layout, PostFormPage, PostPage, RenderContext,
    SortLink,
};

#[derive(Debug, Default, Deserialize)]
pub struct ShowQuery {
    pub sort: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NewPostQuery {
    pub board: Option<String>,
}

/// Renders `/p/{id}`. A rejected comment comes back in the form it was
/// submitted from.
pub(crate) async fn post_page(
    state: &AppState,
    viewer: &Viewer,
    post_id: Uuid,
    sort: CommentSort,
    draft: CommentDraft,
) -> Result<Html<String>, ApiError> {
    let thread = state.posts.thread(post_id, viewer.user_id()).await?;
    let ctx = RenderContext::new(viewer.username()).with_draft(&draft);
    let top_level = draft.slot == DraftSlot::NewComment;

    let sort_links = CommentSort::ALL
        .into_iter()
        .map(|key| SortLink {
            label: match key {
                CommentSort::Popularity => "popular",
                CommentSort::Score => "top",
                CommentSort::CreatedAt => "new",
            },
            href: format!("/p/{post_id}?sort={}", key.as_str()),
            active: key == sort,
        })
        .collect();

    render(PostPage {
        layout: Layout::new(thread.post.title.clone(), viewer.username()),
        post_id,
        card: post_card(&thread.post, &ctx)?,
        sort_links,
        thread_html: comment_thread(&thread.comments, sort, &ctx)?,
        signed_in: viewer.user.is_some(),
        login_href: login_href(&format!("/p/{post_id}")),
        draft: if top_level { draft.body.clone() } else { String::new() },
        comment_error: draft.error.clone().filter(|_| top_level),
    })
}

pub async fn show(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(raw_id): Path<String>,
    Query(query): Query<ShowQuery>,
) -> Result<Html<String>, ApiError> {
    let post_id = parse_id("post", &raw_id)?;
    let sort = query
        .sort
        .as_deref()
        .and_then(|s| s.parse().ok())
        .unwrap_or_default();
    post_page(&state, &viewer, post_id, sort, CommentDraft::default()).await
}

fn blank_form(user: &SignedIn, heading: &'static str, action: String) -> PostFormPage {
    PostFormPage {
        layout: Layout::new(heading, Some(&user.user.username)),
        heading,
        action,
        title: String::new(),
        body: String::new(),
        tags: String::new(),
        board_id: String::new(),
        title_error: None,
        body_error: None,
        tags_error: None,
        form_error: None,
    }
}

fn refill(mut page: PostFormPage, form: &PostForm) -> PostFormPage {
    page.title = form.title.clone();
    page.body = form.body.clone();
    page.tags = form.tags.clone();
    page.board_id = form.board_id.clone().unwrap_or_default();
    page
}

/// Re-renders the form with a 400 for errors the user can fix.
fn rejected_form(page: PostFormPage, err: DomainError) -> Result<Response, ApiError> {
    let page = match err {
        DomainError::Validation(fields) => page.with_errors(&fields),
        DomainError::Rejected(message) => PostFormPage {
            form_error: Some(message),
            ..page
        },
        DomainError::NotFound("referenced row", _) => PostFormPage {
            form_error: Some("That board does not exist".to_string()),
            ..page
        },
        other => return Err(other.into()),
    };
    Ok((StatusCode::BAD_REQUEST, render(page)?).into_response())
}

pub async fn new_form(user: SignedIn, Query(query): Query<NewPostQuery>) -> Result<Html<String>, ApiError> {
    let mut page = blank_form(&user, "New post", "/create-post".to_string());
    page.board_id = query.board.unwrap_or_default();
    render(page)
}

pub async fn create(
    State(state): State<AppState>,
    user: SignedIn,
    Form(form): Form<PostForm>,
) -> Result<Response, ApiError> {
    match state.posts.create(user.user.user_id, &form).await {
        Ok(post_id) => {
            state.metrics.post_created();
            Ok(Redirect::to(&format!("/p/{post_id}")).into_response())
        }
        Err(err) => rejected_form(
            refill(blank_form(&user, "New post", "/create-post".to_string()), &form),
            err,
        ),
    }
}

pub async fn edit_form(
    State(state): State<AppState>,
    user: SignedIn,
    Query(param): Query<IdParam>,
) -> Result<Html<String>, ApiError> {
    let post_id = parse_id("post", &param.id)?;
    let draft = state.posts.draft(user.user.user_id, post_id).await?;

    let mut page = blank_form(&user, "Edit post", format!("/edit-post?id={post_id}"));
    page.title = draft.title;
    page.body = draft.body;
    page.tags = draft.tags.join(", ");
    render(page)
}

pub async fn update(
    State(state): State<AppState>,
    user: SignedIn,
    Query(param): Query<IdParam>,
    Form(form): Form<PostForm>,
) -> Result<Response, ApiError> {
    let post_id = parse_id("post", &param.id)?;
    match state.posts.edit(user.user.user_id, post_id, &form).await {
        Ok(()) => Ok(Redirect::to(&format!("/p/{post_id}")).into_response()),
        Err(err) => rejected_form(
            refill(blank_form(&user, "Edit post", format!("/edit-post?id={post_id}")), &form),
            err,
        ),
    }
}

pub async fn delete(
    State(state): State<AppState>,
    user: SignedIn,
    Form(param): Form<IdParam>,
) -> Result<Redirect, ApiError> {
    let post_id = parse_id("post", &param.id)?;
    state.posts.delete(user.user.user_id, post_id).await?;
    Ok(Redirect::to("/"))
}
