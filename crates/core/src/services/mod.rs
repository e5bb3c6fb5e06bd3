//! Business logic services.

#![allow(missing_docs)]

pub mod activity_log;
pub mod answer;
pub mod auth;
pub mod category;
pub mod comment;
pub mod email;
pub mod listing_cache;
pub mod notification;
pub mod oauth;
pub mod pagination;
pub mod post;
pub mod question;
pub mod tag;
pub mod token;
pub mod user;
pub mod vote;

pub use activity_log::{ActivityEntry, ActivityLogService, RequestMeta};
pub use answer::{AnswerDetail, AnswerService, CreateAnswerInput, UpdateAnswerInput};
pub use auth::{
    AuthService, AuthSession, ChangePasswordInput, LoginInput, SignupInput, hash_password,
    verify_password,
};
pub use category::{CategoryService, CreateCategoryInput, UpdateCategoryInput};
pub use comment::{CommentNode, CommentService, CreateCommentInput, UpdateCommentInput};
pub use email::{EmailMessage, EmailService, LogMailer, Mailer, SmtpMailer};
pub use listing_cache::ListingCache;
pub use notification::{NewNotification, NotificationService};
pub use oauth::{GoogleOAuthClient, GoogleProfile};
pub use pagination::Page;
pub use post::{AuthorSummary, CreatePostInput, PostDetail, PostListQuery, PostService, UpdatePostInput};
pub use question::{
    CreateQuestionInput, QuestionDetail, QuestionListQuery, QuestionService, UpdateQuestionInput,
};
pub use tag::{CreateTagInput, TagService, UpdateTagInput};
pub use token::{Claims, TokenPair, TokenService};
pub use user::{UpdateProfileInput, UserService};
pub use vote::{VoteInput, VoteOutcome, VoteService};
