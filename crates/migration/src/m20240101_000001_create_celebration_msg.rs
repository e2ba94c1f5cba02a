//! Create `celebration_msg` table.
//! Guest-written messages on an invitation page. Rows are owned by the
//! invitation owner (`user_id`) and editable by whoever knows `name` + password.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CelebrationMsg::Table)
                    .if_not_exists()
                    .col(pk_auto(CelebrationMsg::Id))
                    .col(integer(CelebrationMsg::UserId).not_null())
                    .col(string_len(CelebrationMsg::Name, 64).not_null())
                    .col(string_len(CelebrationMsg::PasswordHash, 256).not_null())
                    .col(text(CelebrationMsg::Message).not_null())
                    // Either a JSON array or a JSON-encoded string of one; see models::celebration_msg
                    .col(json_null(CelebrationMsg::ImageUrl))
                    .col(timestamp_with_time_zone(CelebrationMsg::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(CelebrationMsg::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(CelebrationMsg::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum CelebrationMsg {
    Table,
    Id,
    UserId,
    Name,
    PasswordHash,
    Message,
    ImageUrl,
    CreatedAt,
    UpdatedAt,
}
