//! Boards: named post collections with an admin list.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use domains::validation::validate_board_id;
use domains::{Board, BoardRepository, DomainError, FieldErrors, NewBoard, Result};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoardForm {
    #[serde(default)]
    pub board_id: String,
    #[serde(default)]
    pub description: String,
}

pub struct BoardService {
    repo: Arc<dyn BoardRepository>,
}

impl BoardService {
    pub fn new(repo: Arc<dyn BoardRepository>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self, form), fields(admin = %admin, board = %form.board_id))]
    pub async fn create(&self, admin: Uuid, form: &BoardForm) -> Result<Board> {
        let board_id = form.board_id.trim().to_string();
        let mut errors = FieldErrors::new();
        errors.check("board_id", validate_board_id(&board_id));
        errors.into_result().map_err(DomainError::Validation)?;

        let board = self
            .repo
            .create_board(NewBoard {
                board_id,
                description: form.description.trim().to_string(),
                admin,
            })
            .await
            .map_err(|err| match err {
                DomainError::Conflict(_) => DomainError::Rejected(format!("board {} already exists", form.board_id.trim())),
                other => other,
            })?;
        info!("board created");
        Ok(board)
    }

    pub async fn get(&self, board_id: &str) -> Result<Board> {
        self.repo
            .get_board(board_id)
            .await?
            .ok_or_else(|| DomainError::NotFound("board", board_id.to_string()))
    }
}
