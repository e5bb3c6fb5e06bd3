//! Notification service.
//!
//! Fan-out writes are best effort: a failure is logged and never propagates
//! to the action that triggered it.

use chrono::Utc;
use inkwell_common::{AppError, AppResult, IdGenerator};
use inkwell_db::{
    entities::{
        notification::{self, NotificationKind},
        user,
    },
    repositories::NotificationRepository,
};
use sea_orm::Set;

/// Name shown for a user in notification messages.
#[must_use]
pub fn display_name(user: &user::Model) -> &str {
    user.name
        .as_deref()
        .filter(|name| !name.is_empty())
        .unwrap_or(&user.username)
}

/// A notification about to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub recipient_id: String,
    pub actor_id: String,
    pub kind: NotificationKind,
    pub post_id: Option<String>,
    pub comment_id: Option<String>,
    pub question_id: Option<String>,
    pub answer_id: Option<String>,
    pub message: String,
}

impl NewNotification {
    fn base(recipient_id: &str, actor_id: &str, kind: NotificationKind, message: String) -> Self {
        Self {
            recipient_id: recipient_id.to_string(),
            actor_id: actor_id.to_string(),
            kind,
            post_id: None,
            comment_id: None,
            question_id: None,
            answer_id: None,
            message,
        }
    }

    /// Someone commented on the recipient's post.
    #[must_use]
    pub fn comment(
        recipient_id: &str,
        actor_name: &str,
        actor_id: &str,
        post_id: &str,
        comment_id: &str,
        post_title: &str,
    ) -> Self {
        Self {
            post_id: Some(post_id.to_string()),
            comment_id: Some(comment_id.to_string()),
            ..Self::base(
                recipient_id,
                actor_id,
                NotificationKind::Comment,
                format!("{actor_name} commented on \"{post_title}\""),
            )
        }
    }

    /// Someone replied to the recipient's comment.
    #[must_use]
    pub fn reply(
        recipient_id: &str,
        actor_name: &str,
        actor_id: &str,
        post_id: &str,
        comment_id: &str,
    ) -> Self {
        Self {
            post_id: Some(post_id.to_string()),
            comment_id: Some(comment_id.to_string()),
            ..Self::base(
                recipient_id,
                actor_id,
                NotificationKind::Reply,
                format!("{actor_name} replied to your comment"),
            )
        }
    }

    #[must_use]
    pub fn post_like(
        recipient_id: &str,
        actor_name: &str,
        actor_id: &str,
        post_id: &str,
        post_title: &str,
    ) -> Self {
        Self {
            post_id: Some(post_id.to_string()),
            ..Self::base(
                recipient_id,
                actor_id,
                NotificationKind::PostLike,
                format!("{actor_name} liked \"{post_title}\""),
            )
        }
    }

    #[must_use]
    pub fn comment_like(
        recipient_id: &str,
        actor_name: &str,
        actor_id: &str,
        post_id: &str,
        comment_id: &str,
    ) -> Self {
        Self {
            post_id: Some(post_id.to_string()),
            comment_id: Some(comment_id.to_string()),
            ..Self::base(
                recipient_id,
                actor_id,
                NotificationKind::CommentLike,
                format!("{actor_name} liked your comment"),
            )
        }
    }

    /// A new answer on the recipient's question.
    #[must_use]
    pub fn answer(
        recipient_id: &str,
        actor_name: &str,
        actor_id: &str,
        question_id: &str,
        answer_id: &str,
        question_title: &str,
    ) -> Self {
        Self {
            question_id: Some(question_id.to_string()),
            answer_id: Some(answer_id.to_string()),
            ..Self::base(
                recipient_id,
                actor_id,
                NotificationKind::Answer,
                format!("{actor_name} answered \"{question_title}\""),
            )
        }
    }

    /// The recipient's answer was accepted.
    #[must_use]
    pub fn answer_accepted(
        recipient_id: &str,
        actor_id: &str,
        question_id: &str,
        answer_id: &str,
        question_title: &str,
    ) -> Self {
        Self {
            question_id: Some(question_id.to_string()),
            answer_id: Some(answer_id.to_string()),
            ..Self::base(
                recipient_id,
                actor_id,
                NotificationKind::AnswerAccepted,
                format!("Your answer to \"{question_title}\" was accepted"),
            )
        }
    }
}

/// Notification service for business logic.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    id_gen: IdGenerator,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(notification_repo: NotificationRepository) -> Self {
        Self {
            notification_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Write a notification unless the actor is the recipient.
    ///
    /// Never fails: errors are logged at warn level.
    pub async fn notify(&self, new: NewNotification) -> Option<notification::Model> {
        // Don't notify yourself
        if new.recipient_id == new.actor_id {
            return None;
        }

        let kind = new.kind;
        let recipient_id = new.recipient_id.clone();
        let model = notification::ActiveModel {
            id: Set(self.id_gen.generate()),
            recipient_id: Set(new.recipient_id),
            actor_id: Set(Some(new.actor_id)),
            kind: Set(new.kind),
            post_id: Set(new.post_id),
            comment_id: Set(new.comment_id),
            question_id: Set(new.question_id),
            answer_id: Set(new.answer_id),
            message: Set(new.message),
            is_read: Set(false),
            created_at: Set(Utc::now().into()),
        };

        match self.notification_repo.create(model).await {
            Ok(created) => {
                tracing::debug!(recipient = %recipient_id, kind = ?kind, "Created notification");
                Some(created)
            }
            Err(e) => {
                tracing::warn!(error = %e, recipient = %recipient_id, kind = ?kind, "Failed to create notification");
                None
            }
        }
    }

    /// Get notifications for a user.
    pub async fn get_notifications(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
        unread_only: bool,
    ) -> AppResult<Vec<notification::Model>> {
        let limit = limit.clamp(1, 100);
        self.notification_repo
            .find_by_recipient(user_id, limit, until_id, unread_only)
            .await
    }

    /// Count unread notifications.
    pub async fn count_unread(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.count_unread(user_id).await
    }

    /// Mark a notification as read.
    pub async fn mark_as_read(&self, user_id: &str, notification_id: &str) -> AppResult<()> {
        if self
            .notification_repo
            .mark_as_read(notification_id, user_id)
            .await?
        {
            Ok(())
        } else {
            Err(AppError::NotFound(format!(
                "Notification not found: {notification_id}"
            )))
        }
    }

    /// Mark all notifications as read. Returns the number changed.
    pub async fn mark_all_as_read(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.mark_all_as_read(user_id).await
    }

    /// Delete a notification.
    pub async fn delete(&self, user_id: &str, notification_id: &str) -> AppResult<()> {
        if self.notification_repo.delete(notification_id, user_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!(
                "Notification not found: {notification_id}"
            )))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_notification(recipient_id: &str, kind: NotificationKind) -> notification::Model {
        notification::Model {
            id: "n1".to_string(),
            recipient_id: recipient_id.to_string(),
            actor_id: Some("actor".to_string()),
            kind,
            post_id: Some("post1".to_string()),
            comment_id: None,
            question_id: None,
            answer_id: None,
            message: "bob liked \"Hello\"".to_string(),
            is_read: false,
            created_at: Utc::now().into(),
        }
    }

    fn service_with(db: MockDatabase) -> NotificationService {
        NotificationService::new(NotificationRepository::new(Arc::new(db.into_connection())))
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let mut user = inkwell_db::test_utils::fixtures::user("u1", "alice");
        assert_eq!(display_name(&user), "alice");
        user.name = Some("Alice Liddell".to_string());
        assert_eq!(display_name(&user), "Alice Liddell");
    }

    #[test]
    fn test_constructors_set_targets() {
        let n = NewNotification::comment("author", "bob", "actor", "post1", "c1", "Hello");
        assert_eq!(n.kind, NotificationKind::Comment);
        assert_eq!(n.post_id.as_deref(), Some("post1"));
        assert_eq!(n.comment_id.as_deref(), Some("c1"));
        assert!(n.message.contains("bob commented on \"Hello\""));

        let n = NewNotification::answer_accepted("answerer", "asker", "q1", "a1", "Why?");
        assert_eq!(n.kind, NotificationKind::AnswerAccepted);
        assert_eq!(n.question_id.as_deref(), Some("q1"));
        assert_eq!(n.answer_id.as_deref(), Some("a1"));
        assert!(n.post_id.is_none());
    }

    #[tokio::test]
    async fn test_notify_creates_row() {
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[
                create_test_notification("author", NotificationKind::PostLike),
            ]]),
        );

        let created = service
            .notify(NewNotification::post_like("author", "bob", "actor", "post1", "Hello"))
            .await;
        assert_eq!(created.unwrap().kind, NotificationKind::PostLike);
    }

    #[tokio::test]
    async fn test_notify_skips_self() {
        // No query results queued: any write would fail the mock
        let service = service_with(MockDatabase::new(DatabaseBackend::Postgres));

        let created = service
            .notify(NewNotification::post_like("same", "bob", "same", "post1", "Hello"))
            .await;
        assert!(created.is_none());
    }

    #[tokio::test]
    async fn test_notify_swallows_errors() {
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_errors([DbErr::Custom("connection lost".to_string())]),
        );

        let created = service
            .notify(NewNotification::reply("author", "bob", "actor", "post1", "c1"))
            .await;
        assert!(created.is_none());
    }

    #[tokio::test]
    async fn test_mark_as_read_not_found() {
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }]),
        );

        let result = service.mark_as_read("user1", "someone-elses").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_own_notification() {
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]),
        );

        assert!(service.delete("user1", "n1").await.is_ok());
    }
}
