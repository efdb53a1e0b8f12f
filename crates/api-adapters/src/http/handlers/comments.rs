//! Comment create/edit/delete. Creation also answers JSON for script clients.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Form, Json};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use domains::{CommentSort, DomainError};

use super::posts::post_page;
use super::{parse_id, wants_json, IdParam};
use crate::http::{ApiError, AppState, SignedIn};
use crate::views::{CommentDraft, DraftSlot};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentInput {
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub post_id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditInput {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub body: String,
    /// Lets a refused edit re-render its post page.
    #[serde(default)]
    pub post_id: Option<String>,
}

pub async fn create(
    State(state): State<AppState>,
    user: SignedIn,
    headers: HeaderMap,
    Form(input): Form<CommentInput>,
) -> Result<Response, ApiError> {
    let post_id = parse_id("post", &input.post_id)?;
    let parent_id = match input.parent_id.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        Some(raw) => Some(parse_id("comment", raw)?),
        None => None,
    };

    match state
        .comments
        .create(user.user.user_id, post_id, parent_id, &input.body)
        .await
    {
        Ok(comment_id) => {
            state.metrics.comment_created();
            if wants_json(&headers) {
                Ok(Json(json!({ "commentId": comment_id })).into_response())
            } else {
                Ok(Redirect::to(&format!("/p/{post_id}#c-{comment_id}")).into_response())
            }
        }
        Err(DomainError::Validation(fields)) if wants_json(&headers) => {
            Ok((StatusCode::BAD_REQUEST, Json(json!({ "fieldErrors": fields }))).into_response())
        }
        Err(DomainError::Validation(fields)) => {
            let draft = CommentDraft {
                slot: parent_id.map_or(DraftSlot::NewComment, DraftSlot::Reply),
                error: fields.get("body").or_else(|| fields.get("parentId")).map(str::to_string),
                body: input.body,
            };
            let page = post_page(&state, &user.viewer(), post_id, CommentSort::default(), draft).await?;
            Ok((StatusCode::BAD_REQUEST, page).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn update(
    State(state): State<AppState>,
    user: SignedIn,
    headers: HeaderMap,
    Form(input): Form<EditInput>,
) -> Result<Response, ApiError> {
    let comment_id = parse_id("comment", &input.id)?;
    match state.comments.edit(user.user.user_id, comment_id, &input.body).await {
        Ok(record) => Ok(Redirect::to(&format!("/p/{}#c-{comment_id}", record.post_id)).into_response()),
        Err(DomainError::Validation(fields)) if wants_json(&headers) => {
            Ok((StatusCode::BAD_REQUEST, Json(json!({ "fieldErrors": fields }))).into_response())
        }
        Err(DomainError::Validation(fields)) => {
            let Some(post_id) = input.post_id.as_deref().and_then(|raw| Uuid::parse_str(raw.trim()).ok()) else {
                return Err(DomainError::Validation(fields).into());
            };
            let draft = CommentDraft {
                slot: DraftSlot::Edit(comment_id),
                error: fields.get("body").map(str::to_string),
                body: input.body,
            };
            let page = post_page(&state, &user.viewer(), post_id, CommentSort::default(), draft).await?;
            Ok((StatusCode::BAD_REQUEST, page).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn delete(
    State(state): State<AppState>,
    user: SignedIn,
    Form(param): Form<IdParam>,
) -> Result<Redirect, ApiError> {
    let comment_id = parse_id("comment", &param.id)?;
    let (post_id, _) = state.comments.delete(user.user.user_id, comment_id).await?;
    Ok(Redirect::to(&format!("/p/{post_id}")))
}
