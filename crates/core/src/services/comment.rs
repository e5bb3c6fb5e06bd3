//! Comment service: threaded comments on posts.
//!
//! Threads are stored with a closure table; listings fetch a page of
//! top-level comments plus every approved descendant and assemble the tree
//! in memory.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use inkwell_common::{AppError, AppResult, IdGenerator};
use inkwell_db::{
    entities::{comment, comment_like, user},
    repositories::{CommentLikeRepository, CommentRepository, PostRepository, UserRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::services::activity_log::{ActivityEntry, ActivityLogService, RequestMeta};
use crate::services::notification::{NewNotification, NotificationService, display_name};
use crate::services::pagination::{self, Page};
use crate::services::post::{AuthorSummary, ensure_can_modify};

/// Comments can be edited for this long after creation.
pub const EDIT_WINDOW_MINUTES: i64 = 15;

/// Shown in place of the content of a deleted comment.
pub const DELETED_PLACEHOLDER: &str = "[deleted]";

/// Whether a comment created at `created_at` is still editable at `now`.
#[must_use]
pub fn can_edit(created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(created_at) <= Duration::minutes(EDIT_WINDOW_MINUTES)
}

/// A comment with its author and nested replies.
#[derive(Debug, Clone, Serialize)]
pub struct CommentNode {
    #[serde(flatten)]
    pub comment: comment::Model,
    pub author: Option<AuthorSummary>,
    pub replies: Vec<CommentNode>,
}

impl CommentNode {
    fn leaf(comment: comment::Model, authors: &HashMap<String, AuthorSummary>) -> Self {
        Self {
            author: authors.get(&comment.author_id).cloned(),
            comment: mask_deleted(comment),
            replies: vec![],
        }
    }
}

fn mask_deleted(mut comment: comment::Model) -> comment::Model {
    if comment.is_deleted {
        comment.content = DELETED_PLACEHOLDER.to_string();
    }
    comment
}

/// Attach `descendants` under `roots` by `parent_id`.
///
/// Descendants whose parent is not part of the result (e.g. under an
/// unapproved comment) are dropped. Replies keep the order they are given in.
#[must_use]
pub fn build_tree(
    roots: Vec<comment::Model>,
    descendants: Vec<comment::Model>,
    authors: &HashMap<String, AuthorSummary>,
) -> Vec<CommentNode> {
    let mut children: HashMap<String, Vec<comment::Model>> = HashMap::new();
    for c in descendants {
        if let Some(parent_id) = c.parent_id.clone() {
            children.entry(parent_id).or_default().push(c);
        }
    }

    roots
        .into_iter()
        .map(|root| attach(root, &mut children, authors))
        .collect()
}

fn attach(
    comment: comment::Model,
    children: &mut HashMap<String, Vec<comment::Model>>,
    authors: &HashMap<String, AuthorSummary>,
) -> CommentNode {
    let kids = children.remove(&comment.id).unwrap_or_default();
    let mut node = CommentNode::leaf(comment, authors);
    node.replies = kids
        .into_iter()
        .map(|kid| attach(kid, children, authors))
        .collect();
    node
}

/// Input for creating a comment.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentInput {
    pub post_id: String,

    #[validate(length(min = 1, max = 5000))]
    pub content: String,

    /// Reply to this comment.
    pub parent_id: Option<String>,
}

/// Input for editing a comment.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCommentInput {
    #[validate(length(min = 1, max = 5000))]
    pub content: String,
}

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    post_repo: PostRepository,
    user_repo: UserRepository,
    like_repo: CommentLikeRepository,
    notifications: NotificationService,
    activity: ActivityLogService,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(
        comment_repo: CommentRepository,
        post_repo: PostRepository,
        user_repo: UserRepository,
        like_repo: CommentLikeRepository,
        notifications: NotificationService,
        activity: ActivityLogService,
    ) -> Self {
        Self {
            comment_repo,
            post_repo,
            user_repo,
            like_repo,
            notifications,
            activity,
            id_gen: IdGenerator::new(),
        }
    }

    /// Comment on a published post, optionally as a reply.
    pub async fn create(
        &self,
        author: &user::Model,
        input: CreateCommentInput,
        meta: &RequestMeta,
    ) -> AppResult<CommentNode> {
        input.validate()?;

        let post = self.post_repo.get_by_id(&input.post_id).await?;
        if !post.is_public() {
            return Err(AppError::PostNotFound(input.post_id));
        }

        let parent = match &input.parent_id {
            Some(parent_id) => {
                let parent = self
                    .comment_repo
                    .find_by_id(parent_id)
                    .await?
                    .filter(|p| p.is_approved && !p.is_deleted && p.post_id == post.id)
                    .ok_or_else(|| {
                        AppError::BadRequest(format!("Invalid parent comment: {parent_id}"))
                    })?;
                Some(parent)
            }
            None => None,
        };

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            post_id: Set(post.id.clone()),
            author_id: Set(author.id.clone()),
            parent_id: Set(parent.as_ref().map(|p| p.id.clone())),
            content: Set(input.content.trim().to_string()),
            depth: Set(parent.as_ref().map_or(0, |p| p.depth + 1)),
            is_approved: Set(true),
            is_deleted: Set(false),
            like_count: Set(0),
            reply_count: Set(0),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };
        let created = self.comment_repo.create(model).await?;

        let notification = match &parent {
            Some(parent) => NewNotification::reply(
                &parent.author_id,
                display_name(author),
                &author.id,
                &post.id,
                &created.id,
            ),
            None => NewNotification::comment(
                &post.author_id,
                display_name(author),
                &author.id,
                &post.id,
                &created.id,
                &post.title,
            ),
        };
        self.notifications.notify(notification).await;

        self.activity
            .record_quietly(
                ActivityEntry::new(&author.id, "comment_create").target("comment", &created.id),
                meta,
            )
            .await;

        tracing::debug!(comment_id = %created.id, post_id = %post.id, depth = created.depth, "Created comment");
        Ok(CommentNode {
            comment: created,
            author: Some(AuthorSummary::from(author)),
            replies: vec![],
        })
    }

    /// Edit a comment. Only the author may edit, within the edit window.
    pub async fn update(
        &self,
        actor: &user::Model,
        id: &str,
        input: UpdateCommentInput,
    ) -> AppResult<comment::Model> {
        input.validate()?;

        let comment = self.comment_repo.get_by_id(id).await?;
        if comment.author_id != actor.id {
            return Err(AppError::Forbidden(
                "Only the author can edit this comment".to_string(),
            ));
        }
        if comment.is_deleted {
            return Err(AppError::BadRequest(
                "Deleted comments cannot be edited".to_string(),
            ));
        }
        if !can_edit(comment.created_at.with_timezone(&Utc), Utc::now()) {
            return Err(AppError::Forbidden(format!(
                "Comments can only be edited within {EDIT_WINDOW_MINUTES} minutes"
            )));
        }

        let mut active: comment::ActiveModel = comment.into();
        active.content = Set(input.content.trim().to_string());
        active.updated_at = Set(Some(Utc::now().into()));
        self.comment_repo.update(active).await
    }

    /// Soft delete a comment (author or admin).
    pub async fn delete(&self, actor: &user::Model, id: &str, meta: &RequestMeta) -> AppResult<()> {
        let comment = self.comment_repo.get_by_id(id).await?;
        ensure_can_modify(actor, &comment.author_id)?;
        if comment.is_deleted {
            return Ok(());
        }

        self.comment_repo.soft_delete(comment).await?;
        self.activity
            .record_quietly(
                ActivityEntry::new(&actor.id, "comment_delete").target("comment", id),
                meta,
            )
            .await;

        tracing::debug!(comment_id = %id, actor_id = %actor.id, "Deleted comment");
        Ok(())
    }

    /// A page of top-level comments with their full reply trees.
    pub async fn list_for_post(
        &self,
        post_id: &str,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> AppResult<Page<CommentNode>> {
        let post = self.post_repo.get_by_id(post_id).await?;
        if !post.is_public() {
            return Err(AppError::PostNotFound(post_id.to_string()));
        }

        let (page, limit) = pagination::normalize(page, limit);
        let (roots, total) = self.comment_repo.find_top_level(post_id, page, limit).await?;

        let root_ids: Vec<String> = roots.iter().map(|c| c.id.clone()).collect();
        let descendants = self.comment_repo.find_descendants(&root_ids).await?;

        let authors = self
            .authors(roots.iter().chain(descendants.iter()))
            .await?;
        Ok(Page::new(
            build_tree(roots, descendants, &authors),
            total,
            page,
            limit,
        ))
    }

    /// Direct replies to a comment, oldest first.
    pub async fn replies(&self, comment_id: &str) -> AppResult<Vec<CommentNode>> {
        let parent = self.comment_repo.get_by_id(comment_id).await?;
        if !parent.is_approved {
            return Err(AppError::NotFound(format!("Comment {comment_id}")));
        }

        let children = self.comment_repo.find_children(comment_id).await?;
        let authors = self.authors(children.iter()).await?;
        Ok(children
            .into_iter()
            .map(|c| CommentNode::leaf(c, &authors))
            .collect())
    }

    /// Like a comment and notify its author.
    pub async fn like(&self, user: &user::Model, comment_id: &str) -> AppResult<()> {
        let comment = self.comment_repo.get_by_id(comment_id).await?;
        if comment.is_deleted || !comment.is_approved {
            return Err(AppError::NotFound(format!("Comment {comment_id}")));
        }

        self.like_repo
            .like(comment_like::ActiveModel {
                id: Set(self.id_gen.generate()),
                comment_id: Set(comment.id.clone()),
                user_id: Set(user.id.clone()),
                created_at: Set(Utc::now().into()),
            })
            .await?;

        self.notifications
            .notify(NewNotification::comment_like(
                &comment.author_id,
                display_name(user),
                &user.id,
                &comment.post_id,
                &comment.id,
            ))
            .await;
        Ok(())
    }

    /// Remove a like. 404 when the user had not liked the comment.
    pub async fn unlike(&self, user: &user::Model, comment_id: &str) -> AppResult<()> {
        if self.like_repo.unlike(comment_id, &user.id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("Like not found".to_string()))
        }
    }

    /// Approve or hide a comment (admin).
    pub async fn set_approval(
        &self,
        admin: &user::Model,
        id: &str,
        approved: bool,
    ) -> AppResult<comment::Model> {
        if !admin.is_admin() {
            return Err(AppError::Forbidden("Admin only".to_string()));
        }

        let comment = self.comment_repo.get_by_id(id).await?;
        let mut active: comment::ActiveModel = comment.into();
        active.is_approved = Set(approved);
        active.updated_at = Set(Some(Utc::now().into()));
        let updated = self.comment_repo.update(active).await?;

        tracing::info!(admin_id = %admin.id, comment_id = %id, approved, "Changed comment approval");
        Ok(updated)
    }

    async fn authors(
        &self,
        comments: impl Iterator<Item = &comment::Model>,
    ) -> AppResult<HashMap<String, AuthorSummary>> {
        let ids: Vec<String> = comments
            .map(|c| c.author_id.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        Ok(self
            .user_repo
            .find_by_ids(&ids)
            .await?
            .iter()
            .map(|u| (u.id.clone(), AuthorSummary::from(u)))
            .collect())
    }
}
