//! Listing indexes for `celebration_msg`.
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Owner-scoped, newest-first pagination
        manager
            .create_index(
                Index::create()
                    .name("idx_celebration_msg_user_created")
                    .table(CelebrationMsg::Table)
                    .col(CelebrationMsg::UserId)
                    .col(CelebrationMsg::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_celebration_msg_user_created")
                    .table(CelebrationMsg::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum CelebrationMsg { Table, UserId, CreatedAt }
