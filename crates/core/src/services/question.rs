//! Question service for the Q&A board.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use inkwell_common::{AppError, AppResult, IdGenerator, slugify};
use inkwell_db::{
    entities::{question, user},
    repositories::{QuestionFilter, QuestionRepository, QuestionSort, UserRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::services::activity_log::{ActivityEntry, ActivityLogService, RequestMeta};
use crate::services::pagination::{self, Page};
use crate::services::post::{AuthorSummary, ensure_can_modify};

const MAX_TAGS: usize = 5;

/// Normalize question tags: slugified, de-duplicated, empty ones dropped.
#[must_use]
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.iter()
        .map(|t| slugify(t))
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// A question with its author resolved.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionDetail {
    #[serde(flatten)]
    pub question: question::Model,
    pub author: Option<AuthorSummary>,
    pub score: i32,
}

/// Input for asking a question.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionInput {
    #[validate(length(min = 5, max = 200))]
    pub title: String,

    #[validate(length(min = 1, max = 20_000))]
    pub content: String,

    #[serde(default)]
    #[validate(length(max = 5))]
    pub tags: Vec<String>,
}

/// Input for editing a question.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQuestionInput {
    #[validate(length(min = 5, max = 200))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 20_000))]
    pub content: Option<String>,

    #[validate(length(max = 5))]
    pub tags: Option<Vec<String>>,
}

/// Query parameters for question listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionListQuery {
    pub q: Option<String>,
    pub tag: Option<String>,
    pub sort: Option<QuestionSort>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// Question service for business logic.
#[derive(Clone)]
pub struct QuestionService {
    question_repo: QuestionRepository,
    user_repo: UserRepository,
    activity: ActivityLogService,
    id_gen: IdGenerator,
}

impl QuestionService {
    /// Create a new question service.
    #[must_use]
    pub const fn new(
        question_repo: QuestionRepository,
        user_repo: UserRepository,
        activity: ActivityLogService,
    ) -> Self {
        Self {
            question_repo,
            user_repo,
            activity,
            id_gen: IdGenerator::new(),
        }
    }

    /// Ask a question.
    pub async fn create(
        &self,
        author: &user::Model,
        input: CreateQuestionInput,
        meta: &RequestMeta,
    ) -> AppResult<QuestionDetail> {
        input.validate()?;

        let title = input.title.trim().to_string();
        let slug = self.free_slug(&title, None).await?;
        let tags = checked_tags(&input.tags)?;

        let model = question::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(author.id.clone()),
            title: Set(title),
            slug: Set(slug),
            content: Set(input.content),
            tags: Set(json!(tags)),
            upvote_count: Set(0),
            downvote_count: Set(0),
            answer_count: Set(0),
            view_count: Set(0),
            accepted_answer_id: Set(None),
            is_closed: Set(false),
            active: Set(true),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };
        let created = self.question_repo.create(model).await?;

        self.activity
            .record_quietly(
                ActivityEntry::new(&author.id, "question_create").target("question", &created.id),
                meta,
            )
            .await;
        tracing::debug!(question_id = %created.id, slug = %created.slug, "Created question");

        Ok(detail(created, Some(AuthorSummary::from(author))))
    }

    /// Edit a question (author or admin).
    pub async fn update(
        &self,
        actor: &user::Model,
        id: &str,
        input: UpdateQuestionInput,
    ) -> AppResult<QuestionDetail> {
        input.validate()?;

        let question = self.get_active(id).await?;
        ensure_can_modify(actor, &question.author_id)?;

        let current_title = question.title.clone();
        let mut active: question::ActiveModel = question.into();
        if let Some(title) = input
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| *t != current_title)
        {
            active.slug = Set(self.free_slug(&title, Some(id)).await?);
            active.title = Set(title);
        }
        if let Some(content) = input.content {
            active.content = Set(content);
        }
        if let Some(tags) = input.tags {
            active.tags = Set(json!(checked_tags(&tags)?));
        }
        active.updated_at = Set(Some(Utc::now().into()));

        let updated = self.question_repo.update(active).await?;
        let author = self.user_repo.find_by_id(&updated.author_id).await?;
        Ok(detail(updated, author.as_ref().map(AuthorSummary::from)))
    }

    /// Soft delete a question (author or admin).
    pub async fn delete(&self, actor: &user::Model, id: &str, meta: &RequestMeta) -> AppResult<()> {
        let question = self.get_active(id).await?;
        ensure_can_modify(actor, &question.author_id)?;

        let mut active: question::ActiveModel = question.into();
        active.active = Set(false);
        active.updated_at = Set(Some(Utc::now().into()));
        self.question_repo.update(active).await?;

        self.activity
            .record_quietly(
                ActivityEntry::new(&actor.id, "question_delete").target("question", id),
                meta,
            )
            .await;
        Ok(())
    }

    /// Close a question to new answers (author or admin).
    pub async fn close(&self, actor: &user::Model, id: &str) -> AppResult<question::Model> {
        let question = self.get_active(id).await?;
        ensure_can_modify(actor, &question.author_id)?;
        if question.is_closed {
            return Ok(question);
        }

        let mut active: question::ActiveModel = question.into();
        active.is_closed = Set(true);
        active.updated_at = Set(Some(Utc::now().into()));
        let closed = self.question_repo.update(active).await?;

        tracing::debug!(question_id = %id, actor_id = %actor.id, "Closed question");
        Ok(closed)
    }

    /// Question by ID or slug. Counts a view.
    pub async fn get(&self, key: &str) -> AppResult<QuestionDetail> {
        let mut question = self
            .question_repo
            .find_by_id_or_slug(key)
            .await?
            .filter(|q| q.active)
            .ok_or_else(|| AppError::NotFound(format!("Question {key}")))?;

        self.question_repo.increment_view_count(&question.id).await?;
        question.view_count += 1;

        let author = self.user_repo.find_by_id(&question.author_id).await?;
        Ok(detail(question, author.as_ref().map(AuthorSummary::from)))
    }

    /// Active questions.
    pub async fn list(&self, query: QuestionListQuery) -> AppResult<Page<QuestionDetail>> {
        let (page, limit) = pagination::normalize(query.page, query.limit);
        let filter = QuestionFilter {
            search: query.q,
            tag: query.tag.map(|t| slugify(&t)),
            sort: query.sort.unwrap_or_default(),
        };

        let (questions, total) = self.question_repo.list(&filter, page, limit).await?;

        let author_ids: Vec<String> = questions
            .iter()
            .map(|q| q.author_id.clone())
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

        let items = questions
            .into_iter()
            .map(|q| {
                let author = authors.get(&q.author_id).cloned();
                detail(q, author)
            })
            .collect();
        Ok(Page::new(items, total, page, limit))
    }

    async fn get_active(&self, id: &str) -> AppResult<question::Model> {
        self.question_repo
            .find_by_id(id)
            .await?
            .filter(|q| q.active)
            .ok_or_else(|| AppError::NotFound(format!("Question {id}")))
    }

    async fn free_slug(&self, title: &str, own_id: Option<&str>) -> AppResult<String> {
        let slug = slugify(title);
        if slug.is_empty() {
            return Err(AppError::BadRequest(
                "Title must contain letters or digits".to_string(),
            ));
        }

        let existing = self.question_repo.find_by_id_or_slug(&slug).await?;
        if existing.is_some_and(|q| q.slug == slug && Some(q.id.as_str()) != own_id) {
            return Err(AppError::Conflict(
                "A question with this title already exists".to_string(),
            ));
        }
        Ok(slug)
    }
}

fn checked_tags(tags: &[String]) -> AppResult<Vec<String>> {
    let tags = normalize_tags(tags);
    if tags.len() > MAX_TAGS {
        return Err(AppError::BadRequest(format!(
            "A question can have at most {MAX_TAGS} tags"
        )));
    }
    Ok(tags)
}

fn detail(question: question::Model, author: Option<AuthorSummary>) -> QuestionDetail {
    QuestionDetail {
        score: question.score(),
        author,
        question,
    }
}
