//! Login, registration and logout. A successful login or registration sets
//! the signed session cookie and returns to `redirectTo`.

use axum::extract::{Query, State};
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use domains::{DomainError, User};
use services::{LoginForm, RegistrationForm};

use super::render;
use crate::http::session::{expired_cookie, local_path, session_cookie};
use crate::http::{ApiError, AppState, Viewer};
use crate::views::{AuthPage, Layout, LogoutPage};

#[derive(Debug, Default, Deserialize)]
pub struct RedirectQuery {
    #[serde(rename = "redirectTo")]
    pub redirect_to: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AuthInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, rename = "redirectTo")]
    pub redirect_to: Option<String>,
}

pub async fn login_form(viewer: Viewer, Query(query): Query<RedirectQuery>) -> Result<Html<String>, ApiError> {
    let redirect_to = local_path(query.redirect_to.as_deref());
    render(AuthPage::new(false, viewer.username(), &redirect_to))
}

pub async fn register_form(viewer: Viewer, Query(query): Query<RedirectQuery>) -> Result<Html<String>, ApiError> {
    let redirect_to = local_path(query.redirect_to.as_deref());
    render(AuthPage::new(true, viewer.username(), &redirect_to))
}

pub async fn login(
    State(state): State<AppState>,
    viewer: Viewer,
    Form(input): Form<AuthInput>,
) -> Result<Response, ApiError> {
    let redirect_to = local_path(input.redirect_to.as_deref());
    let form = LoginForm {
        username: input.username.clone(),
        password: input.password.clone(),
    };

    match state.accounts.login(&form).await {
        Ok(user) => {
            state.metrics.login(true);
            // An existing session for the same user is extended, not replaced.
            let reuse = match viewer.session_id {
                Some(session_id) if viewer.user_id() == Some(user.user_id) => {
                    state.sessions.refresh(session_id).await?.then_some(session_id)
                }
                _ => None,
            };
            signed_in(&state, &user, reuse, &redirect_to).await
        }
        Err(err) => {
            state.metrics.login(false);
            rejected(AuthPage::new(false, viewer.username(), &redirect_to), &input, err)
        }
    }
}

pub async fn register(
    State(state): State<AppState>,
    viewer: Viewer,
    Form(input): Form<AuthInput>,
) -> Result<Response, ApiError> {
    let redirect_to = local_path(input.redirect_to.as_deref());
    let form = RegistrationForm {
        username: input.username.clone(),
        email: input.email.clone(),
        password: input.password.clone(),
    };

    match state.accounts.register(&form).await {
        Ok(user) => signed_in(&state, &user, None, &redirect_to).await,
        Err(err) => rejected(AuthPage::new(true, viewer.username(), &redirect_to), &input, err),
    }
}

async fn signed_in(
    state: &AppState,
    user: &User,
    session_id: Option<Uuid>,
    redirect_to: &str,
) -> Result<Response, ApiError> {
    let session_id = match session_id {
        Some(id) => id,
        None => state.sessions.start(user.user_id).await?,
    };
    let cookie = session_cookie(
        &state.codec.encode(session_id),
        state.sessions.ttl().num_seconds(),
        state.secure_cookies,
    );
    info!(user_id = %user.user_id, "signed in");
    Ok(([(SET_COOKIE, cookie)], Redirect::to(redirect_to)).into_response())
}

fn rejected(page: AuthPage, input: &AuthInput, err: DomainError) -> Result<Response, ApiError> {
    let mut page = match err {
        DomainError::Validation(fields) => page.with_errors(&fields),
        DomainError::Rejected(message) => AuthPage {
            form_error: Some(message),
            ..page
        },
        other => return Err(other.into()),
    };
    page.username = input.username.clone();
    page.email = input.email.clone();
    Ok((StatusCode::BAD_REQUEST, render(page)?).into_response())
}

pub async fn logout_form(viewer: Viewer) -> Result<Html<String>, ApiError> {
    render(LogoutPage {
        layout: Layout::new("Log out", viewer.username()),
    })
}

pub async fn logout(State(state): State<AppState>, viewer: Viewer) -> Result<Response, ApiError> {
    if let Some(session_id) = viewer.session_id {
        state.sessions.end(session_id).await?;
    }
    Ok(([(SET_COOKIE, expired_cookie(state.secure_cookies))], Redirect::to("/")).into_response())
}
