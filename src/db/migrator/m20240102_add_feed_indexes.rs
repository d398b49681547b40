use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_messages_user_timestamp")
                    .table(Messages::Table)
                    .col(Messages::UserId)
                    .col(Messages::Timestamp)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // The composite primary keys already cover lookups by their first
        // column; these cover the reverse direction.
        manager
            .create_index(
                Index::create()
                    .name("idx_follows_followee")
                    .table(Follows::Table)
                    .col(Follows::FolloweeId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_likes_message")
                    .table(Likes::Table)
                    .col(Likes::MessageId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_likes_message").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_follows_followee").to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_messages_user_timestamp")
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Messages {
    Table,
    UserId,
    Timestamp,
}

#[derive(DeriveIden)]
enum Follows {
    Table,
    FolloweeId,
}

#[derive(DeriveIden)]
enum Likes {
    Table,
    MessageId,
}
