use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use thiserror::Error;
use tracing::{debug, error, warn};

use domains::DomainError;

use crate::views::{login_href, ErrorPage, Layout};

pub const GENERIC_FAILURE: &str = "Something went wrong.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Answered with a redirect to the login page.
    #[error("login required")]
    LoginRequired { redirect_to: String },

    #[error("{0}")]
    BadRequest(&'static str),

    #[error("template rendering failed: {0}")]
    Render(#[from] askama::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::LoginRequired { redirect_to } => Redirect::to(&login_href(&redirect_to)).into_response(),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            ApiError::Domain(err) => domain_response(err),
            ApiError::Render(err) => {
                error!(error = %err, "template rendering failed");
                error_page(StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE.to_string())
            }
        }
    }
}

fn domain_response(err: DomainError) -> Response {
    match err {
        DomainError::NotFound(kind, id) => {
            debug!(kind, %id, "not found");
            error_page(StatusCode::NOT_FOUND, "Page not found".to_string())
        }
        DomainError::Forbidden(message) => {
            warn!(%message, "forbidden");
            error_page(StatusCode::FORBIDDEN, message)
        }
        DomainError::Unauthenticated => Redirect::to("/login").into_response(),
        DomainError::Validation(fields) => error_page(StatusCode::BAD_REQUEST, fields.to_string()),
        DomainError::Rejected(message) => error_page(StatusCode::BAD_REQUEST, message),
        DomainError::Conflict(message) => {
            debug!(%message, "conflict");
            error_page(StatusCode::CONFLICT, "That already exists".to_string())
        }
        DomainError::Internal(message) => {
            error!(error = %message, "request failed");
            error_page(StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE.to_string())
        }
    }
}

pub(crate) fn error_page(status: StatusCode, message: String) -> Response {
    let page = ErrorPage {
        layout: Layout::new(status.canonical_reason().unwrap_or("Error"), None),
        status: status.as_u16(),
        message,
    };
    match page.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(err) => {
            error!(error = %err, "error page failed to render");
            (status, page.message).into_response()
        }
    }
}
