//! Question repository.

use std::sync::Arc;

use crate::entities::{Question, question};
use inkwell_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select,
    sea_query::{Expr, Func},
};
use serde::Deserialize;

/// Sort order for question listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionSort {
    /// Newest first
    #[default]
    Latest,
    /// Highest score (upvotes minus downvotes) first
    Votes,
    /// Only questions without answers, newest first
    Unanswered,
}

/// Filters for question listings.
#[derive(Debug, Clone, Default)]
pub struct QuestionFilter {
    /// Case-insensitive match on title or content
    pub search: Option<String>,
    /// Tag name the question must carry
    pub tag: Option<String>,
    pub sort: QuestionSort,
}

/// Question repository for database operations.
#[derive(Clone)]
pub struct QuestionRepository {
    db: Arc<DatabaseConnection>,
}

impl QuestionRepository {
    /// Create a new question repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a question by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<question::Model>> {
        Question::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a question by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<question::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Question {id}")))
    }

    /// Find a question by ID or slug.
    pub async fn find_by_id_or_slug(&self, key: &str) -> AppResult<Option<question::Model>> {
        Question::find()
            .filter(
                Condition::any()
                    .add(question::Column::Id.eq(key))
                    .add(question::Column::Slug.eq(key)),
            )
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new question.
    pub async fn create(&self, model: question::ActiveModel) -> AppResult<question::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::from_db_message(e.to_string(), "Question slug already exists"))
    }

    /// Update a question.
    pub async fn update(&self, model: question::ActiveModel) -> AppResult<question::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::from_db_message(e.to_string(), "Question slug already exists"))
    }

    /// List active questions matching `filter`. `page` is 1-based.
    pub async fn list(
        &self,
        filter: &QuestionFilter,
        page: u64,
        limit: u64,
    ) -> AppResult<(Vec<question::Model>, u64)> {
        let query = Self::filtered(filter);

        let total = query
            .clone()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let query = match filter.sort {
            QuestionSort::Latest | QuestionSort::Unanswered => {
                query.order_by_desc(question::Column::CreatedAt)
            }
            QuestionSort::Votes => query
                .order_by(Expr::cust("upvote_count - downvote_count"), Order::Desc)
                .order_by_desc(question::Column::CreatedAt),
        };

        let questions = query
            .order_by_desc(question::Column::Id)
            .offset(page.saturating_sub(1) * limit)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((questions, total))
    }

    fn filtered(filter: &QuestionFilter) -> Select<Question> {
        let mut condition = Condition::all().add(question::Column::Active.eq(true));

        if filter.sort == QuestionSort::Unanswered {
            condition = condition.add(question::Column::AnswerCount.eq(0));
        }

        if let Some(tag) = filter.tag.as_deref().filter(|t| !t.is_empty()) {
            condition = condition.add(Expr::cust_with_values(
                "tags @> ?",
                [serde_json::json!([tag])],
            ));
        }

        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!(
                "%{}%",
                search
                    .to_lowercase()
                    .replace('%', "\\%")
                    .replace('_', "\\_")
            );
            condition = condition.add(
                Condition::any()
                    .add(Expr::expr(Func::lower(Expr::col(question::Column::Title))).like(&pattern))
                    .add(
                        Expr::expr(Func::lower(Expr::col(question::Column::Content)))
                            .like(&pattern),
                    ),
            );
        }

        Question::find().filter(condition)
    }

    /// Increment the view counter (single UPDATE query, no fetch).
    pub async fn increment_view_count(&self, id: &str) -> AppResult<()> {
        Question::update_many()
            .col_expr(
                question::Column::ViewCount,
                Expr::col(question::Column::ViewCount).add(1),
            )
            .filter(question::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, QueryTrait};

    fn create_test_question(id: &str, up: i32, down: i32) -> question::Model {
        question::Model {
            id: id.to_string(),
            author_id: "u1".to_string(),
            title: "How?".to_string(),
            slug: format!("how-{id}"),
            content: "body".to_string(),
            tags: serde_json::json!(["rust"]),
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
    async fn test_find_by_id_or_slug() {
        let question = create_test_question("q1", 0, 0);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[question.clone()]])
                .into_connection(),
        );

        let repo = QuestionRepository::new(db);
        let found = repo.find_by_id_or_slug("how-q1").await.unwrap().unwrap();

        assert_eq!(found.id, "q1");
        assert_eq!(found.tag_names(), vec!["rust".to_string()]);
        assert_eq!(create_test_question("q2", 5, 2).score(), 3);
    }

    #[test]
    fn test_unanswered_filter() {
        let filter = QuestionFilter {
            sort: QuestionSort::Unanswered,
            ..Default::default()
        };
        let sql = QuestionRepository::filtered(&filter)
            .build(DatabaseBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#""question"."answer_count""#));
    }

    #[test]
    fn test_tag_filter_uses_containment() {
        let filter = QuestionFilter {
            tag: Some("rust".to_string()),
            ..Default::default()
        };
        let sql = QuestionRepository::filtered(&filter)
            .build(DatabaseBackend::Postgres)
            .to_string();

        assert!(sql.contains("tags @>"));
    }
}
