//! Answer repository.

use std::sync::Arc;

use crate::entities::{Answer, Question, answer, question};
use chrono::Utc;
use inkwell_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter,
    QueryOrder, Set, TransactionTrait, sea_query::Expr,
};

/// Answer repository for database operations.
#[derive(Clone)]
pub struct AnswerRepository {
    db: Arc<DatabaseConnection>,
}

impl AnswerRepository {
    /// Create a new answer repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an answer by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<answer::Model>> {
        Answer::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an answer by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<answer::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Answer {id}")))
    }

    /// Insert an answer and bump the question's `answer_count`.
    pub async fn create(&self, model: answer::ActiveModel) -> AppResult<answer::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let answer = model
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Question::update_many()
            .col_expr(
                question::Column::AnswerCount,
                Expr::col(question::Column::AnswerCount).add(1),
            )
            .filter(question::Column::Id.eq(&answer.question_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(answer)
    }

    /// Update an answer.
    pub async fn update(&self, model: answer::ActiveModel) -> AppResult<answer::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Deactivate an answer, decrement `answer_count` (clamped at zero) and
    /// clear the question's accepted answer if it pointed here.
    pub async fn soft_delete(&self, answer: answer::Model) -> AppResult<answer::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let question_id = answer.question_id.clone();
        let answer_id = answer.id.clone();

        let mut active: answer::ActiveModel = answer.into();
        active.active = Set(false);
        active.is_accepted = Set(false);
        active.updated_at = Set(Some(Utc::now().into()));
        let deleted = active
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Question::update_many()
            .col_expr(
                question::Column::AnswerCount,
                Expr::cust("GREATEST(answer_count - 1, 0)"),
            )
            .filter(question::Column::Id.eq(&question_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Question::update_many()
            .col_expr(
                question::Column::AcceptedAnswerId,
                Expr::value(Option::<String>::None),
            )
            .filter(question::Column::Id.eq(&question_id))
            .filter(question::Column::AcceptedAnswerId.eq(&answer_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(deleted)
    }

    /// Active answers of a question: accepted first, then by score, then oldest.
    pub async fn find_by_question(&self, question_id: &str) -> AppResult<Vec<answer::Model>> {
        Answer::find()
            .filter(answer::Column::QuestionId.eq(question_id))
            .filter(answer::Column::Active.eq(true))
            .order_by_desc(answer::Column::IsAccepted)
            .order_by(Expr::cust("upvote_count - downvote_count"), Order::Desc)
            .order_by_asc(answer::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Make `answer_id` the single accepted answer of its question.
    pub async fn accept(&self, question_id: &str, answer_id: &str) -> AppResult<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Answer::update_many()
            .col_expr(answer::Column::IsAccepted, Expr::value(false))
            .filter(answer::Column::QuestionId.eq(question_id))
            .filter(answer::Column::IsAccepted.eq(true))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Answer::update_many()
            .col_expr(answer::Column::IsAccepted, Expr::value(true))
            .filter(answer::Column::Id.eq(answer_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Question::update_many()
            .col_expr(
                question::Column::AcceptedAnswerId,
                Expr::value(answer_id.to_string()),
            )
            .filter(question::Column::Id.eq(question_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn create_test_answer(id: &str, accepted: bool) -> answer::Model {
        answer::Model {
            id: id.to_string(),
            question_id: "q1".to_string(),
            author_id: "u2".to_string(),
            content: "answer".to_string(),
            upvote_count: 0,
            downvote_count: 0,
            is_accepted: accepted,
            active: true,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_increments_answer_count() {
        let answer = create_test_answer("a1", false);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[answer.clone()]])
                .append_exec_results([exec(1)])
                .into_connection(),
        );

        let repo = AnswerRepository::new(db);
        let created = repo.create(answer.into()).await.unwrap();

        assert_eq!(created.question_id, "q1");
    }

    #[tokio::test]
    async fn test_soft_delete_clears_acceptance() {
        let answer = create_test_answer("a1", true);
        let mut deleted = answer.clone();
        deleted.active = false;
        deleted.is_accepted = false;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[deleted]])
                .append_exec_results([exec(1), exec(1)])
                .into_connection(),
        );

        let repo = AnswerRepository::new(db);
        let result = repo.soft_delete(answer).await.unwrap();

        assert!(!result.active);
        assert!(!result.is_accepted);
    }

    #[tokio::test]
    async fn test_accept_runs_three_updates() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(1), exec(1), exec(1)])
                .into_connection(),
        );

        let repo = AnswerRepository::new(db);
        repo.accept("q1", "a2").await.unwrap();
    }
}
