//! Post service: authoring, listings, views, likes and saves.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use inkwell_common::{AppError, AppResult, IdGenerator, slugify};
use inkwell_db::{
    entities::{category, post, post_like, post_view, saved_post, tag, user},
    repositories::{
        CategoryRepository, PostFilter, PostLikeRepository, PostRepository, PostSort,
        PostViewRepository, SavedPostRepository, TagRepository, UserRepository,
    },
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::services::activity_log::{ActivityEntry, ActivityLogService, RequestMeta};
use crate::services::notification::{NewNotification, NotificationService, display_name};
use crate::services::pagination::{self, Page};

/// Views from the same IP inside this window are counted once.
pub const VIEW_WINDOW_HOURS: i64 = 24;

const MAX_TAGS: usize = 10;

/// Start of the dedupe window for a view recorded at `now`.
#[must_use]
pub fn view_window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::hours(VIEW_WINDOW_HOURS)
}

/// Public author fields embedded in post and comment payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorSummary {
    pub id: String,
    pub username: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<&user::Model> for AuthorSummary {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            name: user.name.clone(),
            avatar_url: user.avatar_url.clone(),
        }
    }
}

/// A post with its author, category and tags resolved.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: post::Model,
    pub author: Option<AuthorSummary>,
    pub category: Option<category::Model>,
    pub tags: Vec<tag::Model>,
    /// Set only for an authenticated viewer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_liked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_saved: Option<bool>,
}

/// Input for creating a post.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(min = 1, max = 100_000))]
    pub content: String,

    #[validate(length(max = 500))]
    pub excerpt: Option<String>,

    #[validate(url, length(max = 2048))]
    pub cover_image_url: Option<String>,

    pub category_id: Option<String>,

    #[serde(default)]
    #[validate(length(max = 10))]
    pub tag_ids: Vec<String>,

    /// Defaults to draft.
    pub status: Option<post::PostStatus>,
}

/// Input for updating a post. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePostInput {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 100_000))]
    pub content: Option<String>,

    #[validate(length(max = 500))]
    pub excerpt: Option<String>,

    #[validate(url, length(max = 2048))]
    pub cover_image_url: Option<String>,

    /// `Some(None)` (JSON `null`) removes the category.
    #[serde(default, deserialize_with = "present_or_null")]
    pub category_id: Option<Option<String>>,

    #[validate(length(max = 10))]
    pub tag_ids: Option<Vec<String>>,

    pub status: Option<post::PostStatus>,
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Query parameters for post listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostListQuery {
    /// Category slug
    pub category: Option<String>,
    /// Tag slug
    pub tag: Option<String>,
    /// Author user ID
    pub author: Option<String>,
    pub q: Option<String>,
    pub sort: Option<PostSort>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    user_repo: UserRepository,
    category_repo: CategoryRepository,
    tag_repo: TagRepository,
    like_repo: PostLikeRepository,
    saved_repo: SavedPostRepository,
    view_repo: PostViewRepository,
    notifications: NotificationService,
    activity: ActivityLogService,
    id_gen: IdGenerator,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub const fn new(
        post_repo: PostRepository,
        user_repo: UserRepository,
        category_repo: CategoryRepository,
        tag_repo: TagRepository,
        like_repo: PostLikeRepository,
        saved_repo: SavedPostRepository,
        view_repo: PostViewRepository,
        notifications: NotificationService,
        activity: ActivityLogService,
    ) -> Self {
        Self {
            post_repo,
            user_repo,
            category_repo,
            tag_repo,
            like_repo,
            saved_repo,
            view_repo,
            notifications,
            activity,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a post.
    pub async fn create(
        &self,
        author: &user::Model,
        input: CreatePostInput,
        meta: &RequestMeta,
    ) -> AppResult<PostDetail> {
        input.validate()?;

        let slug = self.free_slug(&input.title, None).await?;
        if let Some(category_id) = &input.category_id {
            self.require_active_category(category_id).await?;
        }
        let tag_ids = self.resolve_tags(&input.tag_ids).await?;

        let status = input.status.unwrap_or(post::PostStatus::Draft);
        let now = Utc::now();
        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(author.id.clone()),
            category_id: Set(input.category_id),
            title: Set(input.title.trim().to_string()),
            slug: Set(slug),
            excerpt: Set(input.excerpt),
            content: Set(input.content),
            cover_image_url: Set(input.cover_image_url),
            status: Set(status),
            view_count: Set(0),
            like_count: Set(0),
            comment_count: Set(0),
            save_count: Set(0),
            active: Set(true),
            published_at: Set((status == post::PostStatus::Published).then(|| now.into())),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };

        let post = self.post_repo.create_with_tags(model, &tag_ids).await?;
        self.activity
            .record_quietly(
                ActivityEntry::new(&author.id, "post_create")
                    .target("post", &post.id)
                    .metadata(json!({"title": post.title})),
                meta,
            )
            .await;

        tracing::debug!(post_id = %post.id, slug = %post.slug, "Created post");
        self.detail(post, Some(author)).await
    }

    /// Update a post (author or admin).
    pub async fn update(
        &self,
        actor: &user::Model,
        id: &str,
        input: UpdatePostInput,
        meta: &RequestMeta,
    ) -> AppResult<PostDetail> {
        input.validate()?;

        let post = self.post_repo.get_by_id(id).await?;
        ensure_can_modify(actor, &post.author_id)?;
        if !post.active {
            return Err(AppError::PostNotFound(id.to_string()));
        }

        let was_published = post.published_at.is_some();
        let current_title = post.title.clone();
        let mut active: post::ActiveModel = post.into();

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
        if let Some(excerpt) = input.excerpt {
            active.excerpt = Set(Some(excerpt).filter(|e| !e.trim().is_empty()));
        }
        if let Some(cover) = input.cover_image_url {
            active.cover_image_url = Set(Some(cover));
        }
        if let Some(category_id) = input.category_id {
            if let Some(category_id) = &category_id {
                self.require_active_category(category_id).await?;
            }
            active.category_id = Set(category_id);
        }
        if let Some(status) = input.status {
            if status == post::PostStatus::Published && !was_published {
                active.published_at = Set(Some(Utc::now().into()));
            }
            active.status = Set(status);
        }
        active.updated_at = Set(Some(Utc::now().into()));

        let tag_ids = match &input.tag_ids {
            Some(ids) => Some(self.resolve_tags(ids).await?),
            None => None,
        };

        let post = self
            .post_repo
            .update_with_tags(active, tag_ids.as_deref())
            .await?;
        self.activity
            .record_quietly(
                ActivityEntry::new(&actor.id, "post_update").target("post", &post.id),
                meta,
            )
            .await;

        self.detail(post, Some(actor)).await
    }

    /// Soft delete a post (author or admin).
    pub async fn delete(&self, actor: &user::Model, id: &str, meta: &RequestMeta) -> AppResult<()> {
        let post = self.post_repo.get_by_id(id).await?;
        ensure_can_modify(actor, &post.author_id)?;
        if !post.active {
            return Ok(());
        }

        let mut active: post::ActiveModel = post.into();
        active.active = Set(false);
        active.updated_at = Set(Some(Utc::now().into()));
        self.post_repo.update(active).await?;

        self.activity
            .record_quietly(
                ActivityEntry::new(&actor.id, "post_delete").target("post", id),
                meta,
            )
            .await;
        tracing::debug!(post_id = %id, actor_id = %actor.id, "Deleted post");
        Ok(())
    }

    /// Post by slug. Drafts and deleted posts are only visible to their
    /// author and admins.
    pub async fn get_by_slug(
        &self,
        viewer: Option<&user::Model>,
        slug: &str,
    ) -> AppResult<PostDetail> {
        let post = self
            .post_repo
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::PostNotFound(slug.to_string()))?;

        if !can_view(viewer, &post) {
            return Err(AppError::PostNotFound(slug.to_string()));
        }

        self.detail(post, viewer).await
    }

    /// Published, active posts.
    pub async fn list_public(&self, query: PostListQuery) -> AppResult<Page<PostDetail>> {
        self.list(query, false).await
    }

    /// Every post including drafts and deleted ones.
    pub async fn list_admin(&self, query: PostListQuery) -> AppResult<Page<PostDetail>> {
        self.list(query, true).await
    }

    async fn list(&self, query: PostListQuery, include_hidden: bool) -> AppResult<Page<PostDetail>> {
        let (page, limit) = pagination::normalize(query.page, query.limit);

        let mut filter = PostFilter {
            author_id: query.author,
            search: query.q,
            sort: query.sort.unwrap_or_default(),
            include_hidden,
            ..PostFilter::default()
        };

        // An unknown category or tag matches nothing
        if let Some(slug) = query.category.as_deref() {
            match self.category_repo.find_by_slug(slug).await? {
                Some(c) if c.active || include_hidden => filter.category_id = Some(c.id),
                _ => return Ok(Page::empty(page, limit)),
            }
        }
        if let Some(slug) = query.tag.as_deref() {
            match self.tag_repo.find_by_slug(slug).await? {
                Some(t) if t.active || include_hidden => filter.tag_id = Some(t.id),
                _ => return Ok(Page::empty(page, limit)),
            }
        }

        let (posts, total) = self.post_repo.list(&filter, page, limit).await?;
        let items = self.hydrate(posts).await?;
        Ok(Page::new(items, total, page, limit))
    }

    /// Count a view unless this IP already viewed the post in the last 24 hours.
    /// Returns whether the view was counted.
    pub async fn record_view(
        &self,
        post_id: &str,
        viewer_id: Option<&str>,
        ip_address: &str,
    ) -> AppResult<bool> {
        let post = self.post_repo.get_by_id(post_id).await?;
        if !post.is_public() {
            return Err(AppError::PostNotFound(post_id.to_string()));
        }

        let now = Utc::now();
        if self
            .view_repo
            .exists_since(post_id, ip_address, view_window_start(now))
            .await?
        {
            return Ok(false);
        }

        self.view_repo
            .record(post_view::ActiveModel {
                id: Set(self.id_gen.generate()),
                post_id: Set(post_id.to_string()),
                user_id: Set(viewer_id.map(ToString::to_string)),
                ip_address: Set(ip_address.to_string()),
                created_at: Set(now.into()),
            })
            .await?;
        Ok(true)
    }

    /// Like a post and notify its author.
    pub async fn like(&self, user: &user::Model, post_id: &str) -> AppResult<()> {
        let post = self.get_public(post_id).await?;

        self.like_repo
            .like(post_like::ActiveModel {
                id: Set(self.id_gen.generate()),
                post_id: Set(post.id.clone()),
                user_id: Set(user.id.clone()),
                created_at: Set(Utc::now().into()),
            })
            .await?;

        self.notifications
            .notify(NewNotification::post_like(
                &post.author_id,
                display_name(user),
                &user.id,
                &post.id,
                &post.title,
            ))
            .await;
        Ok(())
    }

    /// Remove a like. 404 when the user had not liked the post.
    pub async fn unlike(&self, user: &user::Model, post_id: &str) -> AppResult<()> {
        if self.like_repo.unlike(post_id, &user.id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("Like not found".to_string()))
        }
    }

    /// Bookmark a post.
    pub async fn save(&self, user: &user::Model, post_id: &str) -> AppResult<()> {
        let post = self.get_public(post_id).await?;

        self.saved_repo
            .save(saved_post::ActiveModel {
                id: Set(self.id_gen.generate()),
                post_id: Set(post.id),
                user_id: Set(user.id.clone()),
                created_at: Set(Utc::now().into()),
            })
            .await?;
        Ok(())
    }

    /// Remove a bookmark. 404 when the post was not saved.
    pub async fn unsave(&self, user: &user::Model, post_id: &str) -> AppResult<()> {
        if self.saved_repo.unsave(post_id, &user.id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("Saved post not found".to_string()))
        }
    }

    /// The user's saved posts, most recently saved first. Posts that are no
    /// longer public are skipped.
    pub async fn saved_posts(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<PostDetail>> {
        let saved = self
            .saved_repo
            .find_by_user(user_id, limit.clamp(1, 100), until_id)
            .await?;
        let ids: Vec<String> = saved.iter().map(|s| s.post_id.clone()).collect();

        let mut by_id: HashMap<String, post::Model> = self
            .post_repo
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .filter(post::Model::is_public)
            .map(|p| (p.id.clone(), p))
            .collect();
        let posts: Vec<post::Model> = ids.iter().filter_map(|id| by_id.remove(id)).collect();

        self.hydrate(posts).await
    }

    async fn get_public(&self, post_id: &str) -> AppResult<post::Model> {
        let post = self.post_repo.get_by_id(post_id).await?;
        if post.is_public() {
            Ok(post)
        } else {
            Err(AppError::PostNotFound(post_id.to_string()))
        }
    }

    /// Slug for `title`, 409 when another post already uses it.
    async fn free_slug(&self, title: &str, own_id: Option<&str>) -> AppResult<String> {
        let slug = slugify(title);
        if slug.is_empty() {
            return Err(AppError::BadRequest(
                "Title must contain letters or digits".to_string(),
            ));
        }

        let existing = self.post_repo.find_by_slug(&slug).await?;
        if existing.is_some_and(|p| Some(p.id.as_str()) != own_id) {
            return Err(AppError::Conflict(
                "A post with this title already exists".to_string(),
            ));
        }
        Ok(slug)
    }

    async fn require_active_category(&self, category_id: &str) -> AppResult<()> {
        match self.category_repo.find_by_id(category_id).await? {
            Some(c) if c.active => Ok(()),
            _ => Err(AppError::NotFound(format!(
                "Category not found: {category_id}"
            ))),
        }
    }

    /// De-duplicate tag IDs and check every one exists and is active.
    async fn resolve_tags(&self, tag_ids: &[String]) -> AppResult<Vec<String>> {
        let mut seen = HashSet::new();
        let unique: Vec<String> = tag_ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect();
        if unique.len() > MAX_TAGS {
            return Err(AppError::BadRequest(format!(
                "A post can have at most {MAX_TAGS} tags"
            )));
        }

        let found = self.tag_repo.find_by_ids(&unique).await?;
        let active: HashSet<&str> = found
            .iter()
            .filter(|t| t.active)
            .map(|t| t.id.as_str())
            .collect();
        if let Some(missing) = unique.iter().find(|id| !active.contains(id.as_str())) {
            return Err(AppError::BadRequest(format!("Unknown tag: {missing}")));
        }
        Ok(unique)
    }

    async fn detail(&self, post: post::Model, viewer: Option<&user::Model>) -> AppResult<PostDetail> {
        let author = self.user_repo.find_by_id(&post.author_id).await?;
        let category = match &post.category_id {
            Some(id) => self.category_repo.find_by_id(id).await?,
            None => None,
        };
        let tags = self
            .tag_repo
            .find_by_posts(std::slice::from_ref(&post.id))
            .await?
            .remove(&post.id)
            .unwrap_or_default();

        let (is_liked, is_saved) = match viewer {
            Some(v) => (
                Some(self.like_repo.exists(&post.id, &v.id).await?),
                Some(self.saved_repo.exists(&post.id, &v.id).await?),
            ),
            None => (None, None),
        };

        Ok(PostDetail {
            author: author.as_ref().map(AuthorSummary::from),
            category,
            tags,
            is_liked,
            is_saved,
            post,
        })
    }

    /// Resolve authors, categories and tags for a page of posts in a fixed
    /// number of queries.
    async fn hydrate(&self, posts: Vec<post::Model>) -> AppResult<Vec<PostDetail>> {
        if posts.is_empty() {
            return Ok(vec![]);
        }

        let author_ids: Vec<String> = posts
            .iter()
            .map(|p| p.author_id.clone())
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

        let categories: HashMap<String, category::Model> =
            if posts.iter().any(|p| p.category_id.is_some()) {
                self.category_repo
                    .list(true)
                    .await?
                    .into_iter()
                    .map(|c| (c.id.clone(), c))
                    .collect()
            } else {
                HashMap::new()
            };

        let post_ids: Vec<String> = posts.iter().map(|p| p.id.clone()).collect();
        let mut tags = self.tag_repo.find_by_posts(&post_ids).await?;

        Ok(posts
            .into_iter()
            .map(|post| PostDetail {
                author: authors.get(&post.author_id).cloned(),
                category: post
                    .category_id
                    .as_ref()
                    .and_then(|id| categories.get(id).cloned()),
                tags: tags.remove(&post.id).unwrap_or_default(),
                is_liked: None,
                is_saved: None,
                post,
            })
            .collect())
    }
}

/// Author or admin.
pub(crate) fn ensure_can_modify(actor: &user::Model, owner_id: &str) -> AppResult<()> {
    if actor.id == owner_id || actor.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only the author or an admin can do this".to_string(),
        ))
    }
}

fn can_view(viewer: Option<&user::Model>, post: &post::Model) -> bool {
    post.is_public() || viewer.is_some_and(|v| v.id == post.author_id || v.is_admin())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use inkwell_db::{
        repositories::{ActivityLogRepository, NotificationRepository},
        test_utils::fixtures,
    };
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    #[derive(Default)]
    struct Dbs {
        post: Option<MockDatabase>,
        user: Option<MockDatabase>,
        category: Option<MockDatabase>,
        tag: Option<MockDatabase>,
        like: Option<MockDatabase>,
        saved: Option<MockDatabase>,
        view: Option<MockDatabase>,
        notification: Option<MockDatabase>,
    }

    fn mock() -> MockDatabase {
        MockDatabase::new(DatabaseBackend::Postgres)
    }

    fn conn(db: Option<MockDatabase>) -> Arc<sea_orm::DatabaseConnection> {
        Arc::new(db.unwrap_or_else(mock).into_connection())
    }

    fn service(dbs: Dbs) -> PostService {
        PostService::new(
            PostRepository::new(conn(dbs.post)),
            UserRepository::new(conn(dbs.user)),
            CategoryRepository::new(conn(dbs.category)),
            TagRepository::new(conn(dbs.tag)),
            PostLikeRepository::new(conn(dbs.like)),
            SavedPostRepository::new(conn(dbs.saved)),
            PostViewRepository::new(conn(dbs.view)),
            NotificationService::new(NotificationRepository::new(conn(dbs.notification))),
            ActivityLogService::new(ActivityLogRepository::new(conn(None))),
        )
    }

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn draft(id: &str, author_id: &str, slug: &str) -> post::Model {
        post::Model {
            status: post::PostStatus::Draft,
            published_at: None,
            ..fixtures::post(id, author_id, slug)
        }
    }

    #[test]
    fn test_view_window_start() {
        let now = Utc::now();
        assert_eq!(now - view_window_start(now), Duration::hours(24));
    }

    #[test]
    fn test_can_view() {
        let author = fixtures::user("author", "alice");
        let stranger = fixtures::user("other", "bob");
        let admin = fixtures::admin("admin", "root");
        let hidden = draft("p1", "author", "draft");

        assert!(!can_view(None, &hidden));
        assert!(!can_view(Some(&stranger), &hidden));
        assert!(can_view(Some(&author), &hidden));
        assert!(can_view(Some(&admin), &hidden));
        assert!(can_view(None, &fixtures::post("p2", "author", "public")));
    }

    #[test]
    fn test_update_input_distinguishes_null_category() {
        let cleared: UpdatePostInput = serde_json::from_str(r#"{"category_id": null}"#).unwrap();
        assert_eq!(cleared.category_id, Some(None));

        let untouched: UpdatePostInput = serde_json::from_str("{}").unwrap();
        assert_eq!(untouched.category_id, None);
    }

    #[test]
    fn test_ensure_can_modify() {
        assert!(ensure_can_modify(&fixtures::user("u1", "alice"), "u1").is_ok());
        assert!(ensure_can_modify(&fixtures::admin("a1", "root"), "u1").is_ok());
        assert!(matches!(
            ensure_can_modify(&fixtures::user("u2", "bob"), "u1"),
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_create_slug_conflict() {
        let service = service(Dbs {
            post: Some(mock().append_query_results([[fixtures::post("p0", "u9", "hello-world")]])),
            ..Dbs::default()
        });

        let result = service
            .create(
                &fixtures::user("u1", "alice"),
                CreatePostInput {
                    title: "Hello, World!".to_string(),
                    content: "body".to_string(),
                    excerpt: None,
                    cover_image_url: None,
                    category_id: None,
                    tag_ids: vec![],
                    status: None,
                },
                &RequestMeta::default(),
            )
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_create_inactive_category() {
        let inactive = category::Model {
            active: false,
            ..fixtures::category("c1", "Rust", "rust")
        };
        let service = service(Dbs {
            post: Some(mock().append_query_results([Vec::<post::Model>::new()])),
            category: Some(mock().append_query_results([[inactive]])),
            ..Dbs::default()
        });

        let result = service
            .create(
                &fixtures::user("u1", "alice"),
                CreatePostInput {
                    title: "Hello".to_string(),
                    content: "body".to_string(),
                    excerpt: None,
                    cover_image_url: None,
                    category_id: Some("c1".to_string()),
                    tag_ids: vec![],
                    status: Some(post::PostStatus::Published),
                },
                &RequestMeta::default(),
            )
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_unknown_tag() {
        let service = service(Dbs {
            post: Some(mock().append_query_results([Vec::<post::Model>::new()])),
            tag: Some(mock().append_query_results([[fixtures::tag("t1", "Rust", "rust")]])),
            ..Dbs::default()
        });

        let result = service
            .create(
                &fixtures::user("u1", "alice"),
                CreatePostInput {
                    title: "Hello".to_string(),
                    content: "body".to_string(),
                    excerpt: None,
                    cover_image_url: None,
                    category_id: None,
                    tag_ids: vec!["t1".to_string(), "t2".to_string(), "t1".to_string()],
                    status: None,
                },
                &RequestMeta::default(),
            )
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(msg)) if msg.contains("t2")));
    }

    #[tokio::test]
    async fn test_update_by_stranger_forbidden() {
        let service = service(Dbs {
            post: Some(mock().append_query_results([[fixtures::post("p1", "author", "hello")]])),
            ..Dbs::default()
        });

        let result = service
            .update(
                &fixtures::user("stranger", "bob"),
                "p1",
                UpdatePostInput {
                    title: None,
                    content: Some("hijacked".to_string()),
                    excerpt: None,
                    cover_image_url: None,
                    category_id: None,
                    tag_ids: None,
                    status: None,
                },
                &RequestMeta::default(),
            )
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_get_draft_by_slug_hidden_from_public() {
        let service = service(Dbs {
            post: Some(mock().append_query_results([[draft("p1", "author", "draft")]])),
            ..Dbs::default()
        });

        let result = service.get_by_slug(None, "draft").await;
        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn test_get_by_slug_with_viewer_flags() {
        let service = service(Dbs {
            post: Some(mock().append_query_results([[fixtures::post("p1", "author", "hello")]])),
            user: Some(mock().append_query_results([[fixtures::user("author", "alice")]])),
            // no tag links
            tag: Some(mock().append_query_results([Vec::<inkwell_db::entities::post_tag::Model>::new()])),
            like: Some(mock().append_query_results([[post_like::Model {
                id: "l1".to_string(),
                post_id: "p1".to_string(),
                user_id: "viewer".to_string(),
                created_at: Utc::now().into(),
            }]])),
            saved: Some(mock().append_query_results([Vec::<saved_post::Model>::new()])),
            ..Dbs::default()
        });

        let viewer = fixtures::user("viewer", "bob");
        let detail = service.get_by_slug(Some(&viewer), "hello").await.unwrap();
        assert_eq!(detail.author.unwrap().username, "alice");
        assert_eq!(detail.is_liked, Some(true));
        assert_eq!(detail.is_saved, Some(false));
        assert!(detail.tags.is_empty());
    }

    #[tokio::test]
    async fn test_list_unknown_category_is_empty() {
        let service = service(Dbs {
            category: Some(mock().append_query_results([Vec::<category::Model>::new()])),
            ..Dbs::default()
        });

        let page = service
            .list_public(PostListQuery {
                category: Some("nope".to_string()),
                ..PostListQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total, 0);
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn test_record_view_counts_once_per_window() {
        let count = |n: i64| {
            maplit::btreemap! { "num_items" => sea_orm::Value::BigInt(Some(n)) }
        };
        let service = service(Dbs {
            post: Some(
                mock()
                    .append_query_results([[fixtures::post("p1", "author", "hello")]])
                    .append_query_results([[fixtures::post("p1", "author", "hello")]]),
            ),
            view: Some(
                mock()
                    .append_query_results([[count(0)]])
                    .append_query_results([[post_view::Model {
                        id: "v1".to_string(),
                        post_id: "p1".to_string(),
                        user_id: None,
                        ip_address: "10.0.0.1".to_string(),
                        created_at: Utc::now().into(),
                    }]])
                    .append_exec_results([exec(1)])
                    .append_query_results([[count(1)]]),
            ),
            ..Dbs::default()
        });

        assert!(service.record_view("p1", None, "10.0.0.1").await.unwrap());
        assert!(!service.record_view("p1", None, "10.0.0.1").await.unwrap());
    }

    #[tokio::test]
    async fn test_like_notifies_author() {
        let notification_db = mock().append_query_results([[inkwell_db::entities::notification::Model {
            id: "n1".to_string(),
            recipient_id: "author".to_string(),
            actor_id: Some("fan".to_string()),
            kind: inkwell_db::entities::notification::NotificationKind::PostLike,
            post_id: Some("p1".to_string()),
            comment_id: None,
            question_id: None,
            answer_id: None,
            message: "bob liked \"hello\"".to_string(),
            is_read: false,
            created_at: Utc::now().into(),
        }]]);
        let service = service(Dbs {
            post: Some(mock().append_query_results([[fixtures::post("p1", "author", "hello")]])),
            like: Some(
                mock()
                    .append_query_results([[post_like::Model {
                        id: "l1".to_string(),
                        post_id: "p1".to_string(),
                        user_id: "fan".to_string(),
                        created_at: Utc::now().into(),
                    }]])
                    .append_exec_results([exec(1)]),
            ),
            notification: Some(notification_db),
            ..Dbs::default()
        });

        service
            .like(&fixtures::user("fan", "bob"), "p1")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unlike_without_like_is_not_found() {
        let service = service(Dbs {
            like: Some(mock().append_exec_results([exec(0)])),
            ..Dbs::default()
        });

        let result = service.unlike(&fixtures::user("fan", "bob"), "p1").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_save_draft_is_not_found() {
        let service = service(Dbs {
            post: Some(mock().append_query_results([[draft("p1", "author", "draft")]])),
            ..Dbs::default()
        });

        let result = service.save(&fixtures::user("fan", "bob"), "p1").await;
        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }
}
