//! Database repositories.

mod activity_log;
mod answer;
mod category;
mod comment;
mod comment_like;
mod notification;
mod post;
mod post_like;
mod post_view;
mod question;
mod saved_post;
mod session;
mod tag;
mod user;
mod vote;

pub use activity_log::ActivityLogRepository;
pub use answer::AnswerRepository;
pub use category::CategoryRepository;
pub use comment::CommentRepository;
pub use comment_like::CommentLikeRepository;
pub use notification::NotificationRepository;
pub use post::{PostCounter, PostFilter, PostRepository, PostSort};
pub use post_like::PostLikeRepository;
pub use post_view::PostViewRepository;
pub use question::{QuestionFilter, QuestionRepository, QuestionSort};
pub use saved_post::SavedPostRepository;
pub use session::SessionRepository;
pub use tag::TagRepository;
pub use user::UserRepository;
pub use vote::{CounterDelta, VoteRepository, VoteWrite, new_vote};
