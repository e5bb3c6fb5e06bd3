//! Activity (audit) log entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "activity_log")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// NULL for anonymous actions (e.g. failed logins)
    #[sea_orm(nullable, indexed)]
    pub user_id: Option<String>,

    /// e.g. `login`, `post_create`
    pub action: String,

    #[sea_orm(nullable)]
    pub target_type: Option<String>,

    #[sea_orm(nullable)]
    pub target_id: Option<String>,

    #[sea_orm(nullable)]
    pub ip_address: Option<String>,

    #[sea_orm(nullable)]
    pub user_agent: Option<String>,

    #[sea_orm(column_type = "JsonBinary")]
    pub metadata: Json,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
