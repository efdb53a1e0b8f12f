use async_trait::async_trait;
use uuid::Uuid;

use domains::{Result, Vote, VoteRepository, VoteTarget};

use super::{db_error, PgStore};

fn cast_sql(target: VoteTarget) -> &'static str {
    match target {
        VoteTarget::Post => {
            "INSERT INTO posts_votes (user_id, post_id, vote) VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, post_id) DO UPDATE SET vote = EXCLUDED.vote"
        }
        VoteTarget::Comment => {
            "INSERT INTO comments_votes (user_id, comment_id, vote) VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, comment_id) DO UPDATE SET vote = EXCLUDED.vote"
        }
    }
}

fn retract_sql(target: VoteTarget) -> &'static str {
    match target {
        VoteTarget::Post => "DELETE FROM posts_votes WHERE user_id = $1 AND post_id = $2",
        VoteTarget::Comment => "DELETE FROM comments_votes WHERE user_id = $1 AND comment_id = $2",
    }
}

#[async_trait]
impl VoteRepository for PgStore {
    async fn cast_vote(&self, user_id: Uuid, target: VoteTarget, id: Uuid, vote: Vote) -> Result<()> {
        sqlx::query(cast_sql(target))
            .bind(user_id)
            .bind(id)
            .bind(vote.as_str())
            .execute(self.pool())
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn retract_vote(&self, user_id: Uuid, target: VoteTarget, id: Uuid) -> Result<()> {
        sqlx::query(retract_sql(target))
            .bind(user_id)
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(db_error)?;
        Ok(())
    }
}
