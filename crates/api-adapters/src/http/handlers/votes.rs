use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Redirect;
use axum::Form;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use domains::VoteSubmission;

use crate::http::session::referer_path;
use crate::http::{ApiError, AppState, SignedIn};

pub const INVALID_PARAMETERS: &str = "Invalid parameters";

#[derive(Debug, Default, Deserialize)]
pub struct VoteInput {
    #[serde(default)]
    pub id: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub vote: String,
}

impl VoteInput {
    fn parse(&self) -> Option<VoteSubmission> {
        Some(VoteSubmission {
            id: Uuid::parse_str(&self.id).ok()?,
            target: self.kind.parse().ok()?,
            choice: self.vote.parse().ok()?,
        })
    }
}

/// Applies a vote, then sends the browser back where it clicked.
pub async fn vote(
    State(state): State<AppState>,
    user: SignedIn,
    headers: HeaderMap,
    form: Result<Form<VoteInput>, FormRejection>,
) -> Result<Redirect, ApiError> {
    let submission = form
        .ok()
        .and_then(|Form(input)| input.parse())
        .ok_or(ApiError::BadRequest(INVALID_PARAMETERS))?;
    debug!(id = %submission.id, kind = submission.target.as_str(), "vote submitted");

    state.votes.apply(user.user.user_id, submission).await?;
    state.metrics.vote(submission.target, submission.choice);

    Ok(Redirect::to(&referer_path(&headers).unwrap_or_else(|| "/".to_string())))
}
