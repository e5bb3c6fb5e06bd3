//! Question entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "question")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub author_id: String,

    pub title: String,

    #[sea_orm(unique)]
    pub slug: String,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    /// Free-form tag names (JSON array of strings)
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: Json,

    #[sea_orm(default_value = 0)]
    pub upvote_count: i32,

    #[sea_orm(default_value = 0)]
    pub downvote_count: i32,

    #[sea_orm(default_value = 0)]
    pub answer_count: i32,

    #[sea_orm(default_value = 0)]
    pub view_count: i32,

    #[sea_orm(nullable)]
    pub accepted_answer_id: Option<String>,

    #[sea_orm(default_value = false)]
    pub is_closed: bool,

    #[sea_orm(default_value = true)]
    pub active: bool,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Net score.
    #[must_use]
    pub const fn score(&self) -> i32 {
        self.upvote_count - self.downvote_count
    }

    /// Tag names as strings.
    #[must_use]
    pub fn tag_names(&self) -> Vec<String> {
        serde_json::from_value(self.tags.clone()).unwrap_or_default()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Author,

    #[sea_orm(has_many = "super::answer::Entity")]
    Answer,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::answer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Answer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
