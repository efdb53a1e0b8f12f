use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;

use domains::DomainError;
use services::BoardForm;

use super::render;
use crate::http::{ApiError, AppState, SignedIn};
use crate::views::{encode_segment, BoardFormPage, Layout};

fn form_page(user: &SignedIn, form: BoardForm) -> BoardFormPage {
    BoardFormPage {
        layout: Layout::new("Create a board", Some(&user.user.username)),
        board_id: form.board_id,
        description: form.description,
        board_id_error: None,
        form_error: None,
    }
}

pub async fn new_form(user: SignedIn) -> Result<Html<String>, ApiError> {
    render(form_page(&user, BoardForm::default()))
}

pub async fn create(
    State(state): State<AppState>,
    user: SignedIn,
    Form(form): Form<BoardForm>,
) -> Result<Response, ApiError> {
    let err = match state.boards.create(user.user.user_id, &form).await {
        Ok(board) => return Ok(Redirect::to(&format!("/b/{}", encode_segment(&board.board_id))).into_response()),
        Err(err) => err,
    };

    let mut page = form_page(&user, form);
    match err {
        DomainError::Validation(fields) => page.board_id_error = fields.get("board_id").map(str::to_string),
        DomainError::Rejected(message) => page.form_error = Some(message),
        other => return Err(other.into()),
    }
    Ok((StatusCode::BAD_REQUEST, render(page)?).into_response())
}
