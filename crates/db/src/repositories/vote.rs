//! Vote repository.
//!
//! A vote change touches the vote row and the target's up/down counters;
//! both happen in one transaction.

use std::sync::Arc;

use crate::entities::{Answer, Question, Vote, answer, question, vote};
use chrono::Utc;
use inkwell_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait, sea_query::Expr,
};

/// Row-level change to apply for a vote request.
#[derive(Debug, Clone)]
pub enum VoteWrite {
    /// Insert a fresh vote row.
    Insert(vote::ActiveModel),
    /// Remove an existing vote row.
    Delete {
        /// Vote row ID
        vote_id: String,
    },
    /// Change the direction of an existing vote row.
    Flip {
        /// Vote row ID
        vote_id: String,
        /// Direction the row is expected to hold
        from: vote::VoteDirection,
        /// New direction
        direction: vote::VoteDirection,
    },
}

/// Counter deltas applied to the vote target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterDelta {
    /// Change to the upvote counter
    pub up: i32,
    /// Change to the downvote counter
    pub down: i32,
}

/// Vote repository for database operations.
#[derive(Clone)]
pub struct VoteRepository {
    db: Arc<DatabaseConnection>,
}

impl VoteRepository {
    /// Create a new vote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user's vote on a target.
    pub async fn find(
        &self,
        user_id: &str,
        target_type: vote::VoteTarget,
        target_id: &str,
    ) -> AppResult<Option<vote::Model>> {
        Vote::find()
            .filter(vote::Column::UserId.eq(user_id))
            .filter(vote::Column::TargetType.eq(target_type))
            .filter(vote::Column::TargetId.eq(target_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Apply a vote write and the matching counter deltas atomically.
    ///
    /// Returns the target's counters `(upvotes, downvotes)` after the change.
    /// A concurrent duplicate insert violates the unique index and yields
    /// `Conflict`. A delete or flip that finds its row already gone or
    /// already flipped also yields `Conflict`, and no counter is touched.
    pub async fn apply(
        &self,
        target_type: vote::VoteTarget,
        target_id: &str,
        write: VoteWrite,
        delta: CounterDelta,
    ) -> AppResult<(i32, i32)> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match write {
            VoteWrite::Insert(model) => {
                model
                    .insert(&txn)
                    .await
                    .map_err(|e| AppError::from_db_message(e.to_string(), "Already voted"))?;
            }
            VoteWrite::Delete { vote_id } => {
                let deleted = Vote::delete_many()
                    .filter(vote::Column::Id.eq(vote_id))
                    .exec(&txn)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                if deleted.rows_affected == 0 {
                    return Err(AppError::Conflict("Vote changed concurrently".to_string()));
                }
            }
            VoteWrite::Flip {
                vote_id,
                from,
                direction,
            } => {
                let updated = Vote::update_many()
                    .col_expr(vote::Column::Direction, Expr::value(direction))
                    .col_expr(vote::Column::UpdatedAt, Expr::current_timestamp().into())
                    .filter(vote::Column::Id.eq(vote_id))
                    .filter(vote::Column::Direction.eq(from))
                    .exec(&txn)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                if updated.rows_affected == 0 {
                    return Err(AppError::Conflict("Vote changed concurrently".to_string()));
                }
            }
        }

        let counters = match target_type {
            vote::VoteTarget::Question => apply_question_delta(&txn, target_id, delta).await?,
            vote::VoteTarget::Answer => apply_answer_delta(&txn, target_id, delta).await?,
        };

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(counters)
    }
}

fn clamped(column: &str, delta: i32) -> sea_orm::sea_query::SimpleExpr {
    Expr::cust(format!("GREATEST({column} + ({delta}), 0)"))
}

async fn apply_question_delta<C: ConnectionTrait>(
    conn: &C,
    question_id: &str,
    delta: CounterDelta,
) -> AppResult<(i32, i32)> {
    Question::update_many()
        .col_expr(question::Column::UpvoteCount, clamped("upvote_count", delta.up))
        .col_expr(
            question::Column::DownvoteCount,
            clamped("downvote_count", delta.down),
        )
        .filter(question::Column::Id.eq(question_id))
        .exec(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    let question = Question::find_by_id(question_id)
        .one(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
        .ok_or_else(|| AppError::NotFound(format!("Question {question_id}")))?;

    Ok((question.upvote_count, question.downvote_count))
}

async fn apply_answer_delta<C: ConnectionTrait>(
    conn: &C,
    answer_id: &str,
    delta: CounterDelta,
) -> AppResult<(i32, i32)> {
    Answer::update_many()
        .col_expr(answer::Column::UpvoteCount, clamped("upvote_count", delta.up))
        .col_expr(
            answer::Column::DownvoteCount,
            clamped("downvote_count", delta.down),
        )
        .filter(answer::Column::Id.eq(answer_id))
        .exec(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    let answer = Answer::find_by_id(answer_id)
        .one(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
        .ok_or_else(|| AppError::NotFound(format!("Answer {answer_id}")))?;

    Ok((answer.upvote_count, answer.downvote_count))
}

/// Build a new vote row.
#[must_use]
pub fn new_vote(
    id: String,
    user_id: &str,
    target_type: vote::VoteTarget,
    target_id: &str,
    direction: vote::VoteDirection,
) -> vote::ActiveModel {
    vote::ActiveModel {
        id: Set(id),
        user_id: Set(user_id.to_string()),
        target_id: Set(target_id.to_string()),
        target_type: Set(target_type),
        direction: Set(direction),
        created_at: Set(Utc::now().into()),
        updated_at: Set(None),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult};

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn create_test_vote(direction: vote::VoteDirection) -> vote::Model {
        vote::Model {
            id: "v1".to_string(),
            user_id: "u1".to_string(),
            target_id: "q1".to_string(),
            target_type: vote::VoteTarget::Question,
            direction,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_question(up: i32, down: i32) -> question::Model {
        question::Model {
            id: "q1".to_string(),
            author_id: "u2".to_string(),
            title: "t".to_string(),
            slug: "t".to_string(),
            content: "c".to_string(),
            tags: serde_json::json!([]),
            upvote_count: up,
            downvote_count: down,
            answer_count: 0,
            view_count: 0,
            accepted_answer_id: None,
            is_closed: false,
            active: true,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_apply_insert_returns_counters() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_vote(vote::VoteDirection::Up)]])
                .append_exec_results([exec(1)])
                .append_query_results([[create_test_question(1, 0)]])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let counters = repo
            .apply(
                vote::VoteTarget::Question,
                "q1",
                VoteWrite::Insert(new_vote(
                    "v1".to_string(),
                    "u1",
                    vote::VoteTarget::Question,
                    "q1",
                    vote::VoteDirection::Up,
                )),
                CounterDelta { up: 1, down: 0 },
            )
            .await
            .unwrap();

        assert_eq!(counters, (1, 0));
    }

    #[tokio::test]
    async fn test_apply_duplicate_insert_is_conflict() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_errors([DbErr::Custom(
                    "duplicate key value violates unique constraint \"idx_vote_unique\""
                        .to_string(),
                )])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let result = repo
            .apply(
                vote::VoteTarget::Question,
                "q1",
                VoteWrite::Insert(new_vote(
                    "v2".to_string(),
                    "u1",
                    vote::VoteTarget::Question,
                    "q1",
                    vote::VoteDirection::Up,
                )),
                CounterDelta { up: 1, down: 0 },
            )
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_apply_flip() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(1), exec(1)])
                .append_query_results([[create_test_question(0, 1)]])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let counters = repo
            .apply(
                vote::VoteTarget::Question,
                "q1",
                VoteWrite::Flip {
                    vote_id: "v1".to_string(),
                    from: vote::VoteDirection::Up,
                    direction: vote::VoteDirection::Down,
                },
                CounterDelta { up: -1, down: 1 },
            )
            .await
            .unwrap();

        assert_eq!(counters, (0, 1));
    }

    fn counter_updates(log: &[sea_orm::Transaction]) -> usize {
        log.iter()
            .flat_map(|txn| txn.statements())
            .filter(|stmt| stmt.sql.contains("UPDATE \"question\""))
            .count()
    }

    #[tokio::test]
    async fn test_retract_of_vanished_vote_leaves_counters() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(0)])
                .into_connection(),
        );

        let repo = VoteRepository::new(db.clone());
        let result = repo
            .apply(
                vote::VoteTarget::Question,
                "q1",
                VoteWrite::Delete {
                    vote_id: "v1".to_string(),
                },
                CounterDelta { up: -1, down: 0 },
            )
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
        drop(repo);
        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        assert_eq!(counter_updates(&log), 0);
    }

    #[tokio::test]
    async fn test_flip_of_already_flipped_vote_leaves_counters() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(0)])
                .into_connection(),
        );

        let repo = VoteRepository::new(db.clone());
        let result = repo
            .apply(
                vote::VoteTarget::Question,
                "q1",
                VoteWrite::Flip {
                    vote_id: "v1".to_string(),
                    from: vote::VoteDirection::Up,
                    direction: vote::VoteDirection::Down,
                },
                CounterDelta { up: -1, down: 1 },
            )
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
        drop(repo);
        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        assert_eq!(counter_updates(&log), 0);
        let flip = log
            .iter()
            .flat_map(|txn| txn.statements())
            .find(|stmt| stmt.sql.starts_with("UPDATE \"vote\""))
            .unwrap();
        assert!(flip.sql.contains("AND \"vote\".\"direction\" = $"));
    }
}
