//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250101_000001_create_user_table;
mod m20250101_000002_create_session_table;
mod m20250101_000003_create_taxonomy_tables;
mod m20250101_000004_create_post_table;
mod m20250101_000005_create_comment_tables;
mod m20250101_000006_create_post_like_table;
mod m20250101_000007_create_saved_post_table;
mod m20250101_000008_create_comment_like_table;
mod m20250101_000009_create_post_view_table;
mod m20250101_000010_create_notification_table;
mod m20250101_000011_create_activity_log_table;
mod m20250101_000012_create_qa_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_user_table::Migration),
            Box::new(m20250101_000002_create_session_table::Migration),
            Box::new(m20250101_000003_create_taxonomy_tables::Migration),
            Box::new(m20250101_000004_create_post_table::Migration),
            Box::new(m20250101_000005_create_comment_tables::Migration),
            Box::new(m20250101_000006_create_post_like_table::Migration),
            Box::new(m20250101_000007_create_saved_post_table::Migration),
            Box::new(m20250101_000008_create_comment_like_table::Migration),
            Box::new(m20250101_000009_create_post_view_table::Migration),
            Box::new(m20250101_000010_create_notification_table::Migration),
            Box::new(m20250101_000011_create_activity_log_table::Migration),
            Box::new(m20250101_000012_create_qa_tables::Migration),
        ]
    }
}
