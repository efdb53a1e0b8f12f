use async_trait::async_trait;
use chrono::{DateTime, Utc};

use domains::{Board, BoardRepository, NewBoard, Result};

use super::{db_error, PgStore};

#[async_trait]
impl BoardRepository for PgStore {
    /// Board and admin row go in together or not at all.
    async fn create_board(&self, board: NewBoard) -> Result<Board> {
        let mut tx = self.pool().begin().await.map_err(db_error)?;

        let created_at: DateTime<Utc> = sqlx::query_scalar(
            "INSERT INTO boards (board_id, description) VALUES ($1, $2) RETURNING created_at",
        )
        .bind(&board.board_id)
        .bind(&board.description)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error)?;

        sqlx::query("INSERT INTO board_admins (board_id, user_id) VALUES ($1, $2)")
            .bind(&board.board_id)
            .bind(board.admin)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;
        Ok(Board {
            board_id: board.board_id,
            description: board.description,
            created_at,
        })
    }

    async fn get_board(&self, board_id: &str) -> Result<Option<Board>> {
        let row: Option<(String, String, DateTime<Utc>)> =
            sqlx::query_as("SELECT board_id, description, created_at FROM boards WHERE board_id = $1")
                .bind(board_id)
                .fetch_optional(self.pool())
                .await
                .map_err(db_error)?;
        Ok(row.map(|(board_id, description, created_at)| Board {
            board_id,
            description,
            created_at,
        }))
    }
}
