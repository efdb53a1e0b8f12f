//! Session cookie handling and the viewer extractors.

use axum::extract::FromRequestParts;
use axum::http::header::{COOKIE, REFERER};
use axum::http::request::Parts;
use axum::http::{HeaderMap, Method, Uri};
use cookie::time::Duration;
use cookie::{Cookie, SameSite};
use uuid::Uuid;

use domains::User;

use super::{ApiError, AppState};

pub const SESSION_COOKIE: &str = "doot_session";

/// Whoever sent the request; anonymous when the cookie is missing, forged
/// or points at an expired session.
#[derive(Debug, Clone, Default)]
pub struct Viewer {
    pub session_id: Option<Uuid>,
    pub user: Option<User>,
}

impl Viewer {
    pub fn user_id(&self) -> Option<Uuid> {
        self.user.as_ref().map(|u| u.user_id)
    }

    pub fn username(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.username.as_str())
    }
}

impl FromRequestParts<AppState> for Viewer {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(viewer) = parts.extensions.get::<Viewer>() {
            return Ok(viewer.clone());
        }

        let mut viewer = Viewer::default();
        if let Some(session_id) = cookie_value(&parts.headers, SESSION_COOKIE).and_then(|v| state.codec.decode(&v)) {
            if let Some(user_id) = state.sessions.user_id(session_id).await? {
                viewer.user = state.accounts.user(user_id).await?;
                viewer.session_id = viewer.user.as_ref().map(|_| session_id);
            }
        }
        parts.extensions.insert(viewer.clone());
        Ok(viewer)
    }
}

/// A viewer with a live session. Rejects with a redirect to the login page
/// that returns to the current page (GET) or the referring page (POST).
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub user: User,
    pub session_id: Uuid,
}

impl SignedIn {
    pub fn viewer(&self) -> Viewer {
        Viewer {
            session_id: Some(self.session_id),
            user: Some(self.user.clone()),
        }
    }
}

impl FromRequestParts<AppState> for SignedIn {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let viewer = Viewer::from_request_parts(parts, state).await?;
        match (viewer.user, viewer.session_id) {
            (Some(user), Some(session_id)) => Ok(SignedIn { user, session_id }),
            _ => Err(ApiError::LoginRequired {
                redirect_to: return_path(parts),
            }),
        }
    }
}

fn return_path(parts: &Parts) -> String {
    if parts.method == Method::GET {
        parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string())
    } else {
        referer_path(&parts.headers).unwrap_or_else(|| "/".to_string())
    }
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
}

/// Path and query of the `Referer` header, never its host.
pub fn referer_path(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(REFERER)?.to_str().ok()?;
    let uri: Uri = raw.parse().ok()?;
    uri.path_and_query().map(|pq| pq.as_str().to_string())
}

/// `raw` if it is a path on this site, else `/`.
pub fn local_path(raw: Option<&str>) -> String {
    match raw {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => path.to_string(),
        _ => "/".to_string(),
    }
}

pub fn session_cookie(value: &str, max_age_secs: i64, secure: bool) -> String {
    Cookie::build((SESSION_COOKIE, value.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(max_age_secs))
        .secure(secure)
        .build()
        .to_string()
}

pub fn expired_cookie(secure: bool) -> String {
    session_cookie("", 0, secure)
}
