//! Voting on questions and answers.
//!
//! A user holds at most one vote per target. Repeating the same direction
//! retracts the vote, the opposite direction flips it.

use inkwell_common::{AppError, AppResult, IdGenerator};
use inkwell_db::{
    entities::{
        user,
        vote::{VoteDirection, VoteTarget},
    },
    repositories::{
        AnswerRepository, CounterDelta, QuestionRepository, UserRepository, VoteRepository,
        VoteWrite, new_vote,
    },
};
use serde::{Deserialize, Serialize};

/// Reputation granted to the author of an accepted answer.
pub const ACCEPTED_ANSWER_REPUTATION: i32 = 15;

/// Reputation change for the target's author when a vote in `direction` is cast.
#[must_use]
pub const fn reputation_for(target: VoteTarget, direction: VoteDirection) -> i32 {
    match (target, direction) {
        (VoteTarget::Question, VoteDirection::Up) => 5,
        (VoteTarget::Answer, VoteDirection::Up) => 10,
        (_, VoteDirection::Down) => -2,
    }
}

/// What a vote request does to the existing vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTransition {
    /// No previous vote.
    Cast(VoteDirection),
    /// Same direction again: the vote is removed.
    Retract(VoteDirection),
    /// Opposite direction: the vote changes sides.
    Flip {
        from: VoteDirection,
        to: VoteDirection,
    },
}

/// Decide the transition for a `requested` vote given the `existing` one.
#[must_use]
pub fn plan_vote(existing: Option<VoteDirection>, requested: VoteDirection) -> VoteTransition {
    match existing {
        None => VoteTransition::Cast(requested),
        Some(current) if current == requested => VoteTransition::Retract(current),
        Some(current) => VoteTransition::Flip {
            from: current,
            to: requested,
        },
    }
}

const fn unit(direction: VoteDirection, amount: i32) -> CounterDelta {
    match direction {
        VoteDirection::Up => CounterDelta { up: amount, down: 0 },
        VoteDirection::Down => CounterDelta { up: 0, down: amount },
    }
}

impl VoteTransition {
    /// Change to the target's up/down counters.
    #[must_use]
    pub const fn counter_delta(self) -> CounterDelta {
        match self {
            Self::Cast(d) => unit(d, 1),
            Self::Retract(d) => unit(d, -1),
            Self::Flip { from, to } => {
                let removed = unit(from, -1);
                let added = unit(to, 1);
                CounterDelta {
                    up: removed.up + added.up,
                    down: removed.down + added.down,
                }
            }
        }
    }

    /// Change to the target author's reputation.
    #[must_use]
    pub const fn reputation_delta(self, target: VoteTarget) -> i32 {
        match self {
            Self::Cast(d) => reputation_for(target, d),
            Self::Retract(d) => -reputation_for(target, d),
            Self::Flip { from, to } => reputation_for(target, to) - reputation_for(target, from),
        }
    }

    /// The user's vote after the transition.
    #[must_use]
    pub const fn resulting(self) -> Option<VoteDirection> {
        match self {
            Self::Cast(d) | Self::Flip { to: d, .. } => Some(d),
            Self::Retract(_) => None,
        }
    }
}

/// Request body for a vote.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct VoteInput {
    pub direction: VoteDirection,
}

/// State after a vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteOutcome {
    pub target_type: VoteTarget,
    pub target_id: String,
    /// `None` when the vote was retracted.
    pub direction: Option<VoteDirection>,
    pub upvote_count: i32,
    pub downvote_count: i32,
    pub score: i32,
}

/// Vote service for business logic.
#[derive(Clone)]
pub struct VoteService {
    vote_repo: VoteRepository,
    question_repo: QuestionRepository,
    answer_repo: AnswerRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl VoteService {
    /// Create a new vote service.
    #[must_use]
    pub const fn new(
        vote_repo: VoteRepository,
        question_repo: QuestionRepository,
        answer_repo: AnswerRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            vote_repo,
            question_repo,
            answer_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Vote on a question or answer.
    pub async fn vote(
        &self,
        voter: &user::Model,
        target_type: VoteTarget,
        target_id: &str,
        direction: VoteDirection,
    ) -> AppResult<VoteOutcome> {
        let author_id = self.target_author(target_type, target_id).await?;
        if author_id == voter.id {
            return Err(AppError::Forbidden(
                "You cannot vote on your own content".to_string(),
            ));
        }

        let existing = self
            .vote_repo
            .find(&voter.id, target_type, target_id)
            .await?;
        let transition = plan_vote(existing.as_ref().map(|v| v.direction), direction);

        let write = match (transition, existing) {
            (VoteTransition::Retract(_), Some(vote)) => VoteWrite::Delete { vote_id: vote.id },
            (VoteTransition::Flip { from, to }, Some(vote)) => VoteWrite::Flip {
                vote_id: vote.id,
                from,
                direction: to,
            },
            _ => VoteWrite::Insert(new_vote(
                self.id_gen.generate(),
                &voter.id,
                target_type,
                target_id,
                direction,
            )),
        };

        let (upvote_count, downvote_count) = self
            .vote_repo
            .apply(target_type, target_id, write, transition.counter_delta())
            .await?;

        // Counters are already committed; a failed reputation update only logs
        if let Err(e) = self
            .user_repo
            .adjust_reputation(&author_id, transition.reputation_delta(target_type))
            .await
        {
            tracing::warn!(error = %e, user_id = %author_id, "Failed to adjust reputation");
        }

        tracing::debug!(
            voter_id = %voter.id,
            target_type = ?target_type,
            target_id = %target_id,
            transition = ?transition,
            "Applied vote"
        );

        Ok(VoteOutcome {
            target_type,
            target_id: target_id.to_string(),
            direction: transition.resulting(),
            upvote_count,
            downvote_count,
            score: upvote_count - downvote_count,
        })
    }

    async fn target_author(&self, target_type: VoteTarget, target_id: &str) -> AppResult<String> {
        match target_type {
            VoteTarget::Question => self
                .question_repo
                .find_by_id(target_id)
                .await?
                .filter(|q| q.active)
                .map(|q| q.author_id)
                .ok_or_else(|| AppError::NotFound(format!("Question {target_id}"))),
            VoteTarget::Answer => self
                .answer_repo
                .find_by_id(target_id)
                .await?
                .filter(|a| a.active)
                .map(|a| a.author_id)
                .ok_or_else(|| AppError::NotFound(format!("Answer {target_id}"))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use inkwell_db::{entities::vote, test_utils::fixtures};
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn add(a: CounterDelta, b: CounterDelta) -> CounterDelta {
        CounterDelta {
            up: a.up + b.up,
            down: a.down + b.down,
        }
    }

    #[test]
    fn test_plan_vote_transitions() {
        use VoteDirection::{Down, Up};

        assert_eq!(plan_vote(None, Up), VoteTransition::Cast(Up));
        assert_eq!(plan_vote(Some(Up), Up), VoteTransition::Retract(Up));
        assert_eq!(
            plan_vote(Some(Up), Down),
            VoteTransition::Flip { from: Up, to: Down }
        );
    }

    #[test]
    fn test_counter_deltas() {
        use VoteDirection::{Down, Up};

        assert_eq!(
            VoteTransition::Cast(Down).counter_delta(),
            CounterDelta { up: 0, down: 1 }
        );
        assert_eq!(
            VoteTransition::Flip { from: Up, to: Down }.counter_delta(),
            CounterDelta { up: -1, down: 1 }
        );
        assert_eq!(VoteTransition::Retract(Up).resulting(), None);
        assert_eq!(VoteTransition::Flip { from: Up, to: Down }.resulting(), Some(Down));
    }

    #[test]
    fn test_same_direction_twice_restores_counters() {
        for direction in [VoteDirection::Up, VoteDirection::Down] {
            let first = plan_vote(None, direction);
            let second = plan_vote(first.resulting(), direction);
            assert_eq!(
                add(first.counter_delta(), second.counter_delta()),
                CounterDelta::default()
            );
            assert_eq!(
                first.reputation_delta(VoteTarget::Answer)
                    + second.reputation_delta(VoteTarget::Answer),
                0
            );
        }
    }

    #[test]
    fn test_reputation_deltas() {
        use VoteDirection::{Down, Up};

        assert_eq!(reputation_for(VoteTarget::Question, Up), 5);
        assert_eq!(reputation_for(VoteTarget::Question, Down), -2);
        assert_eq!(reputation_for(VoteTarget::Answer, Up), 10);
        assert_eq!(reputation_for(VoteTarget::Answer, Down), -2);
        assert_eq!(
            VoteTransition::Flip { from: Down, to: Up }.reputation_delta(VoteTarget::Answer),
            12
        );
    }

    fn service(
        votes: MockDatabase,
        questions: MockDatabase,
        answers: MockDatabase,
        users: MockDatabase,
    ) -> VoteService {
        VoteService::new(
            VoteRepository::new(Arc::new(votes.into_connection())),
            QuestionRepository::new(Arc::new(questions.into_connection())),
            AnswerRepository::new(Arc::new(answers.into_connection())),
            UserRepository::new(Arc::new(users.into_connection())),
        )
    }

    fn mock() -> MockDatabase {
        MockDatabase::new(DatabaseBackend::Postgres)
    }

    #[tokio::test]
    async fn test_vote_on_own_question_forbidden() {
        let service = service(
            mock(),
            mock().append_query_results([[fixtures::question("q1", "u1", "why")]]),
            mock(),
            mock(),
        );

        let result = service
            .vote(
                &fixtures::user("u1", "alice"),
                VoteTarget::Question,
                "q1",
                VoteDirection::Up,
            )
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_first_upvote_on_answer() {
        let upvoted = inkwell_db::entities::answer::Model {
            upvote_count: 1,
            ..fixtures::answer("a1", "q1", "author")
        };
        let cast = vote::Model {
            id: "v1".to_string(),
            user_id: "voter".to_string(),
            target_id: "a1".to_string(),
            target_type: VoteTarget::Answer,
            direction: VoteDirection::Up,
            created_at: Utc::now().into(),
            updated_at: None,
        };
        let votes = mock()
            .append_query_results([Vec::<vote::Model>::new()])
            .append_query_results([[cast]])
            .append_query_results([[upvoted.clone()]])
            .append_exec_results([exec(1)]);
        let service = service(
            votes,
            mock(),
            mock().append_query_results([[fixtures::answer("a1", "q1", "author")]]),
            mock().append_exec_results([exec(1)]),
        );

        let outcome = service
            .vote(
                &fixtures::user("voter", "bob"),
                VoteTarget::Answer,
                "a1",
                VoteDirection::Up,
            )
            .await
            .unwrap();
        assert_eq!(outcome.direction, Some(VoteDirection::Up));
        assert_eq!(outcome.upvote_count, 1);
        assert_eq!(outcome.score, 1);
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_conflict() {
        let votes = mock()
            .append_query_results([Vec::<vote::Model>::new()])
            .append_query_errors([DbErr::Custom(
                "duplicate key value violates unique constraint".to_string(),
            )]);
        let service = service(
            votes,
            mock().append_query_results([[fixtures::question("q1", "author", "why")]]),
            mock(),
            mock(),
        );

        let result = service
            .vote(
                &fixtures::user("voter", "bob"),
                VoteTarget::Question,
                "q1",
                VoteDirection::Down,
            )
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_racing_retract_is_conflict() {
        let existing = vote::Model {
            id: "v1".to_string(),
            user_id: "voter".to_string(),
            target_id: "q1".to_string(),
            target_type: VoteTarget::Question,
            direction: VoteDirection::Up,
            created_at: Utc::now().into(),
            updated_at: None,
        };
        // Another request removed the row between the read and the delete
        let votes = mock()
            .append_query_results([[existing]])
            .append_exec_results([exec(0)]);
        let service = service(
            votes,
            mock().append_query_results([[fixtures::question("q1", "author", "why")]]),
            mock(),
            mock(),
        );

        let result = service
            .vote(
                &fixtures::user("voter", "bob"),
                VoteTarget::Question,
                "q1",
                VoteDirection::Up,
            )
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_vote_on_deleted_answer_not_found() {
        let deleted = inkwell_db::entities::answer::Model {
            active: false,
            ..fixtures::answer("a1", "q1", "author")
        };
        let service = service(mock(), mock(), mock().append_query_results([[deleted]]), mock());

        let result = service
            .vote(
                &fixtures::user("voter", "bob"),
                VoteTarget::Answer,
                "a1",
                VoteDirection::Up,
            )
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
