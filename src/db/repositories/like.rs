use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect,
    Set, sea_query::OnConflict,
};

use crate::entities::{likes, prelude::*};

/// Repository for like edges
pub struct LikeRepository {
    conn: DatabaseConnection,
}

impl LikeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Returns `false` when the message was already liked by the user.
    pub async fn add(&self, user_id: i32, message_id: i32) -> Result<bool> {
        let edge = likes::ActiveModel {
            user_id: Set(user_id),
            message_id: Set(message_id),
        };

        let result = Likes::insert(edge)
            .on_conflict(
                OnConflict::columns([likes::Column::UserId, likes::Column::MessageId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec(&self.conn)
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(DbErr::RecordNotInserted) => Ok(false),
            Err(e) => Err(e).context("Failed to insert like"),
        }
    }

    pub async fn remove(&self, user_id: i32, message_id: i32) -> Result<bool> {
        let result = Likes::delete_by_id((user_id, message_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete like")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count_for_message(&self, message_id: i32) -> Result<u64> {
        Likes::find()
            .filter(likes::Column::MessageId.eq(message_id))
            .count(&self.conn)
            .await
            .context("Failed to count likes for message")
    }

    pub async fn count_for_user(&self, user_id: i32) -> Result<u64> {
        Likes::find()
            .filter(likes::Column::UserId.eq(user_id))
            .count(&self.conn)
            .await
            .context("Failed to count likes for user")
    }

    /// Ids of every message the user has liked.
    pub async fn message_ids_for_user(&self, user_id: i32) -> Result<Vec<i32>> {
        Likes::find()
            .select_only()
            .column(likes::Column::MessageId)
            .filter(likes::Column::UserId.eq(user_id))
            .into_tuple::<i32>()
            .all(&self.conn)
            .await
            .context("Failed to query liked message ids")
    }
}
