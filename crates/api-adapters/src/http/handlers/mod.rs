pub mod auth;
pub mod boards;
pub mod comments;
pub mod listing;
pub mod ops;
pub mod posts;
pub mod votes;

use askama::Template;
use axum::http::header::ACCEPT;
use axum::http::HeaderMap;
use axum::response::Html;
use serde::Deserialize;
use uuid::Uuid;

use domains::DomainError;

use super::ApiError;

pub(crate) fn render(page: impl Template) -> Result<Html<String>, ApiError> {
    Ok(Html(page.render()?))
}

/// Ids arrive as strings; a malformed one names nothing, so it is a 404.
pub(crate) fn parse_id(kind: &'static str, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| DomainError::NotFound(kind, raw.to_string()).into())
}

pub(crate) fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json"))
}

#[derive(Debug, Default, Deserialize)]
pub struct IdParam {
    #[serde(default)]
    pub id: String,
}
