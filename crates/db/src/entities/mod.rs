//! Database entities.

#![allow(missing_docs)]

pub mod activity_log;
pub mod answer;
pub mod category;
pub mod comment;
pub mod comment_closure;
pub mod comment_like;
pub mod notification;
pub mod post;
pub mod post_like;
pub mod post_tag;
pub mod post_view;
pub mod question;
pub mod saved_post;
pub mod session;
pub mod tag;
pub mod user;
pub mod vote;

pub use activity_log::Entity as ActivityLog;
pub use answer::Entity as Answer;
pub use category::Entity as Category;
pub use comment::Entity as Comment;
pub use comment_closure::Entity as CommentClosure;
pub use comment_like::Entity as CommentLike;
pub use notification::Entity as Notification;
pub use post::Entity as Post;
pub use post_like::Entity as PostLike;
pub use post_tag::Entity as PostTag;
pub use post_view::Entity as PostView;
pub use question::Entity as Question;
pub use saved_post::Entity as SavedPost;
pub use session::Entity as Session;
pub use tag::Entity as Tag;
pub use user::Entity as User;
pub use vote::Entity as Vote;
