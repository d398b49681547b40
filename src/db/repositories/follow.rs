use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, Set,
    sea_query::OnConflict,
};

use crate::entities::{follows, prelude::*};

/// Repository for follow edges
pub struct FollowRepository {
    conn: DatabaseConnection,
}

impl FollowRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Returns `false` when the edge already existed.
    pub async fn add(&self, follower_id: i32, followee_id: i32) -> Result<bool> {
        let edge = follows::ActiveModel {
            follower_id: Set(follower_id),
            followee_id: Set(followee_id),
        };

        let result = Follows::insert(edge)
            .on_conflict(
                OnConflict::columns([follows::Column::FollowerId, follows::Column::FolloweeId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec(&self.conn)
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(DbErr::RecordNotInserted) => Ok(false),
            Err(e) => Err(e).context("Failed to insert follow edge"),
        }
    }

    /// Returns `false` when there was nothing to remove.
    pub async fn remove(&self, follower_id: i32, followee_id: i32) -> Result<bool> {
        let result = Follows::delete_by_id((follower_id, followee_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete follow edge")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn exists(&self, follower_id: i32, followee_id: i32) -> Result<bool> {
        let edge = Follows::find_by_id((follower_id, followee_id))
            .one(&self.conn)
            .await
            .context("Failed to query follow edge")?;

        Ok(edge.is_some())
    }

    pub async fn count_following(&self, user_id: i32) -> Result<u64> {
        Follows::find()
            .filter(follows::Column::FollowerId.eq(user_id))
            .count(&self.conn)
            .await
            .context("Failed to count followed users")
    }

    pub async fn count_followers(&self, user_id: i32) -> Result<u64> {
        Follows::find()
            .filter(follows::Column::FolloweeId.eq(user_id))
            .count(&self.conn)
            .await
            .context("Failed to count followers")
    }
}
