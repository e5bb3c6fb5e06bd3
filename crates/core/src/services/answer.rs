//! Answer service for the Q&A board.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use inkwell_common::{AppError, AppResult, IdGenerator};
use inkwell_db::{
    entities::{answer, question, user},
    repositories::{AnswerRepository, QuestionRepository, UserRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::services::activity_log::{ActivityEntry, ActivityLogService, RequestMeta};
use crate::services::notification::{NewNotification, NotificationService, display_name};
use crate::services::post::{AuthorSummary, ensure_can_modify};
use crate::services::vote::ACCEPTED_ANSWER_REPUTATION;

/// An answer with its author resolved.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerDetail {
    #[serde(flatten)]
    pub answer: answer::Model,
    pub author: Option<AuthorSummary>,
    pub score: i32,
}

/// Input for answering a question.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAnswerInput {
    pub question_id: String,

    #[validate(length(min = 1, max = 20_000))]
    pub content: String,
}

/// Input for editing an answer.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAnswerInput {
    #[validate(length(min = 1, max = 20_000))]
    pub content: String,
}

/// Answer service for business logic.
#[derive(Clone)]
pub struct AnswerService {
    answer_repo: AnswerRepository,
    question_repo: QuestionRepository,
    user_repo: UserRepository,
    notifications: NotificationService,
    activity: ActivityLogService,
    id_gen: IdGenerator,
}

impl AnswerService {
    /// Create a new answer service.
    #[must_use]
    pub const fn new(
        answer_repo: AnswerRepository,
        question_repo: QuestionRepository,
        user_repo: UserRepository,
        notifications: NotificationService,
        activity: ActivityLogService,
    ) -> Self {
        Self {
            answer_repo,
            question_repo,
            user_repo,
            notifications,
            activity,
            id_gen: IdGenerator::new(),
        }
    }

    /// Answer an open question and notify its author.
    pub async fn create(
        &self,
        author: &user::Model,
        input: CreateAnswerInput,
        meta: &RequestMeta,
    ) -> AppResult<AnswerDetail> {
        input.validate()?;

        let question = self.active_question(&input.question_id).await?;
        if question.is_closed {
            return Err(AppError::BadRequest("Question is closed".to_string()));
        }

        let model = answer::ActiveModel {
            id: Set(self.id_gen.generate()),
            question_id: Set(question.id.clone()),
            author_id: Set(author.id.clone()),
            content: Set(input.content),
            upvote_count: Set(0),
            downvote_count: Set(0),
            is_accepted: Set(false),
            active: Set(true),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };
        let created = self.answer_repo.create(model).await?;

        self.notifications
            .notify(NewNotification::answer(
                &question.author_id,
                display_name(author),
                &author.id,
                &question.id,
                &created.id,
                &question.title,
            ))
            .await;
        self.activity
            .record_quietly(
                ActivityEntry::new(&author.id, "answer_create").target("answer", &created.id),
                meta,
            )
            .await;

        tracing::debug!(answer_id = %created.id, question_id = %question.id, "Created answer");
        Ok(detail(created, Some(AuthorSummary::from(author))))
    }

    /// Edit an answer (author or admin).
    pub async fn update(
        &self,
        actor: &user::Model,
        id: &str,
        input: UpdateAnswerInput,
    ) -> AppResult<answer::Model> {
        input.validate()?;

        let answer = self.active_answer(id).await?;
        ensure_can_modify(actor, &answer.author_id)?;

        let mut active: answer::ActiveModel = answer.into();
        active.content = Set(input.content);
        active.updated_at = Set(Some(Utc::now().into()));
        self.answer_repo.update(active).await
    }

    /// Soft delete an answer (author or admin). Deleting the accepted answer
    /// un-accepts it and takes back the acceptance reputation.
    pub async fn delete(&self, actor: &user::Model, id: &str, meta: &RequestMeta) -> AppResult<()> {
        let answer = self.active_answer(id).await?;
        ensure_can_modify(actor, &answer.author_id)?;

        let was_accepted = answer.is_accepted;
        let author_id = answer.author_id.clone();
        let question_id = answer.question_id.clone();
        self.answer_repo.soft_delete(answer).await?;

        if was_accepted {
            let question = self.question_repo.find_by_id(&question_id).await?;
            if question.is_some_and(|q| q.author_id != author_id) {
                self.adjust_reputation(&author_id, -ACCEPTED_ANSWER_REPUTATION)
                    .await;
            }
        }

        self.activity
            .record_quietly(
                ActivityEntry::new(&actor.id, "answer_delete").target("answer", id),
                meta,
            )
            .await;
        Ok(())
    }

    /// Answers to a question: accepted first, then by score.
    pub async fn list(&self, question_id: &str) -> AppResult<Vec<AnswerDetail>> {
        let question = self.active_question(question_id).await?;
        let answers = self.answer_repo.find_by_question(&question.id).await?;

        let author_ids: Vec<String> = answers
            .iter()
            .map(|a| a.author_id.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let authors: HashMap<String, AuthorSummary> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .iter()
            .map(|u| (u.id.clone(), AuthorSummary::from(u)))
            .collect();

        Ok(answers
            .into_iter()
            .map(|a| {
                let author = authors.get(&a.author_id).cloned();
                detail(a, author)
            })
            .collect())
    }

    /// Accept an answer. Only the question author may accept; accepting a
    /// different answer un-accepts the previous one.
    pub async fn accept(&self, actor: &user::Model, answer_id: &str) -> AppResult<answer::Model> {
        let answer = self.active_answer(answer_id).await?;
        let question = self.active_question(&answer.question_id).await?;

        if question.author_id != actor.id {
            return Err(AppError::Forbidden(
                "Only the question author can accept an answer".to_string(),
            ));
        }
        if answer.is_accepted {
            return Ok(answer);
        }

        self.answer_repo.accept(&question.id, &answer.id).await?;

        // Reputation is only granted for answering someone else's question
        let previous = match question
            .accepted_answer_id
            .as_deref()
            .filter(|id| *id != answer.id)
        {
            Some(previous_id) => self.answer_repo.find_by_id(previous_id).await?,
            None => None,
        };
        if let Some(previous) = previous.filter(|p| p.author_id != question.author_id) {
            self.adjust_reputation(&previous.author_id, -ACCEPTED_ANSWER_REPUTATION)
                .await;
        }
        if answer.author_id != question.author_id {
            self.adjust_reputation(&answer.author_id, ACCEPTED_ANSWER_REPUTATION)
                .await;
        }

        self.notifications
            .notify(NewNotification::answer_accepted(
                &answer.author_id,
                &actor.id,
                &question.id,
                &answer.id,
                &question.title,
            ))
            .await;

        tracing::debug!(answer_id = %answer.id, question_id = %question.id, "Accepted answer");
        Ok(answer::Model {
            is_accepted: true,
            ..answer
        })
    }

    async fn active_question(&self, id: &str) -> AppResult<question::Model> {
        self.question_repo
            .find_by_id(id)
            .await?
            .filter(|q| q.active)
            .ok_or_else(|| AppError::NotFound(format!("Question {id}")))
    }

    async fn active_answer(&self, id: &str) -> AppResult<answer::Model> {
        self.answer_repo
            .find_by_id(id)
            .await?
            .filter(|a| a.active)
            .ok_or_else(|| AppError::NotFound(format!("Answer {id}")))
    }

    async fn adjust_reputation(&self, user_id: &str, delta: i32) {
        if let Err(e) = self.user_repo.adjust_reputation(user_id, delta).await {
            tracing::warn!(error = %e, user_id = %user_id, delta, "Failed to adjust reputation");
        }
    }
}

fn detail(answer: answer::Model, author: Option<AuthorSummary>) -> AnswerDetail {
    AnswerDetail {
        score: answer.score(),
        author,
        answer,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use inkwell_db::{
        entities::notification,
        repositories::{ActivityLogRepository, NotificationRepository},
        test_utils::fixtures,
    };
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn mock() -> MockDatabase {
        MockDatabase::new(DatabaseBackend::Postgres)
    }

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn service(
        answers: MockDatabase,
        questions: MockDatabase,
        users: MockDatabase,
        notifications: MockDatabase,
    ) -> AnswerService {
        AnswerService::new(
            AnswerRepository::new(Arc::new(answers.into_connection())),
            QuestionRepository::new(Arc::new(questions.into_connection())),
            UserRepository::new(Arc::new(users.into_connection())),
            NotificationService::new(NotificationRepository::new(Arc::new(
                notifications.into_connection(),
            ))),
            ActivityLogService::new(ActivityLogRepository::new(Arc::new(mock().into_connection()))),
        )
    }

    fn accepted_notification() -> notification::Model {
        notification::Model {
            id: "n1".to_string(),
            recipient_id: "answerer".to_string(),
            actor_id: Some("asker".to_string()),
            kind: notification::NotificationKind::AnswerAccepted,
            post_id: None,
            comment_id: None,
            question_id: Some("q1".to_string()),
            answer_id: Some("a2".to_string()),
            message: "Your answer to \"why\" was accepted".to_string(),
            is_read: false,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_create_on_closed_question_rejected() {
        let closed = question::Model {
            is_closed: true,
            ..fixtures::question("q1", "asker", "why")
        };
        let service = service(mock(), mock().append_query_results([[closed]]), mock(), mock());

        let result = service
            .create(
                &fixtures::user("answerer", "bob"),
                CreateAnswerInput {
                    question_id: "q1".to_string(),
                    content: "because".to_string(),
                },
                &RequestMeta::default(),
            )
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_create_increments_and_returns_detail() {
        let service = service(
            mock()
                .append_query_results([[fixtures::answer("a1", "q1", "answerer")]])
                .append_exec_results([exec(1)]),
            mock().append_query_results([[fixtures::question("q1", "asker", "why")]]),
            mock(),
            mock(),
        );

        let detail = service
            .create(
                &fixtures::user("answerer", "bob"),
                CreateAnswerInput {
                    question_id: "q1".to_string(),
                    content: "because".to_string(),
                },
                &RequestMeta::default(),
            )
            .await
            .unwrap();
        assert_eq!(detail.answer.question_id, "q1");
        assert_eq!(detail.author.unwrap().username, "bob");
    }

    #[tokio::test]
    async fn test_accept_requires_question_author() {
        let service = service(
            mock().append_query_results([[fixtures::answer("a1", "q1", "answerer")]]),
            mock().append_query_results([[fixtures::question("q1", "asker", "why")]]),
            mock(),
            mock(),
        );

        let result = service
            .accept(&fixtures::user("answerer", "bob"), "a1")
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_accept_switches_reputation() {
        let question = question::Model {
            accepted_answer_id: Some("a1".to_string()),
            ..fixtures::question("q1", "asker", "why")
        };
        let previous = answer::Model {
            is_accepted: true,
            ..fixtures::answer("a1", "q1", "first")
        };
        let answers = mock()
            .append_query_results([[fixtures::answer("a2", "q1", "answerer")]])
            .append_exec_results([exec(1), exec(1), exec(1)])
            .append_query_results([[previous]]);
        // previous author loses, new author gains
        let users = mock().append_exec_results([exec(1), exec(1)]);

        let service = service(
            answers,
            mock().append_query_results([[question]]),
            users,
            mock().append_query_results([[accepted_notification()]]),
        );

        let accepted = service
            .accept(&fixtures::user("asker", "alice"), "a2")
            .await
            .unwrap();
        assert!(accepted.is_accepted);
    }

    #[tokio::test]
    async fn test_accept_already_accepted_is_noop() {
        let accepted = answer::Model {
            is_accepted: true,
            ..fixtures::answer("a1", "q1", "answerer")
        };
        let service = service(
            mock().append_query_results([[accepted]]),
            mock().append_query_results([[fixtures::question("q1", "asker", "why")]]),
            mock(),
            mock(),
        );

        let result = service.accept(&fixtures::user("asker", "alice"), "a1").await;
        assert!(result.unwrap().is_accepted);
    }
}
