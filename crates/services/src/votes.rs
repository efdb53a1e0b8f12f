//! Applying a vote submission: upsert for a direction, delete for a retract.

use std::sync::Arc;

use tracing::{debug, instrument};
use uuid::Uuid;

use domains::{Result, VoteRepository, VoteSubmission};

pub struct VoteService {
    repo: Arc<dyn VoteRepository>,
}

impl VoteService {
    pub fn new(repo: Arc<dyn VoteRepository>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self), fields(user = %user_id, kind = submission.target.as_str()))]
    pub async fn apply(&self, user_id: Uuid, submission: VoteSubmission) -> Result<()> {
        match submission.choice.vote() {
            Some(vote) => {
                self.repo
                    .cast_vote(user_id, submission.target, submission.id, vote)
                    .await?
            }
            None => {
                self.repo
                    .retract_vote(user_id, submission.target, submission.id)
                    .await?
            }
        }
        debug!(choice = submission.choice.as_str(), "vote applied");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{MockVoteRepository, Vote, VoteChoice, VoteTarget};

    fn submission(choice: VoteChoice) -> VoteSubmission {
        VoteSubmission {
            id: Uuid::from_u128(5),
            target: VoteTarget::Comment,
            choice,
        }
    }

    #[tokio::test]
    async fn a_direction_upserts() {
        let mut repo = MockVoteRepository::new();
        repo.expect_cast_vote()
            .withf(|_, target, id, vote| {
                *target == VoteTarget::Comment && *id == Uuid::from_u128(5) && *vote == Vote::Down
            })
            .times(1)
            .returning(|_, _, _, _| Ok(()));
        repo.expect_retract_vote().never();

        let service = VoteService::new(Arc::new(repo));
        service.apply(Uuid::new_v4(), submission(VoteChoice::Down)).await.unwrap();
    }

    #[tokio::test]
    async fn retract_deletes() {
        let mut repo = MockVoteRepository::new();
        repo.expect_cast_vote().never();
        repo.expect_retract_vote().times(1).returning(|_, _, _| Ok(()));

        let service = VoteService::new(Arc::new(repo));
        service.apply(Uuid::new_v4(), submission(VoteChoice::Retract)).await.unwrap();
    }
}
