//! Closure table over comments: one row per (ancestor, descendant) pair,
//! including the self pair at depth 0.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "comment_closure")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub ancestor_id: String,

    #[sea_orm(primary_key, auto_increment = false)]
    pub descendant_id: String,

    pub depth: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::comment::Entity",
        from = "Column::AncestorId",
        to = "super::comment::Column::Id",
        on_delete = "Cascade"
    )]
    Ancestor,

    #[sea_orm(
        belongs_to = "super::comment::Entity",
        from = "Column::DescendantId",
        to = "super::comment::Column::Id",
        on_delete = "Cascade"
    )]
    Descendant,
}

impl ActiveModelBehavior for ActiveModel {}
