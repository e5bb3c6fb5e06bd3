//! Create activity_log table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ActivityLog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ActivityLog::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ActivityLog::UserId).string_len(32))
                    .col(ColumnDef::new(ActivityLog::Action).string_len(64).not_null())
                    .col(ColumnDef::new(ActivityLog::TargetType).string_len(32))
                    .col(ColumnDef::new(ActivityLog::TargetId).string_len(32))
                    .col(ColumnDef::new(ActivityLog::IpAddress).string_len(64))
                    .col(ColumnDef::new(ActivityLog::UserAgent).string_len(512))
                    .col(
                        ColumnDef::new(ActivityLog::Metadata)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'{}'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(ActivityLog::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_activity_log_user")
                            .from(ActivityLog::Table, ActivityLog::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (user_id, id) for per-user history
        manager
            .create_index(
                Index::create()
                    .name("idx_activity_log_user_id")
                    .table(ActivityLog::Table)
                    .col(ActivityLog::UserId)
                    .col(ActivityLog::Id)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ActivityLog::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ActivityLog {
    Table,
    Id,
    UserId,
    Action,
    TargetType,
    TargetId,
    IpAddress,
    UserAgent,
    Metadata,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
