use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set,
    sea_query::Query,
};
use serde::Serialize;

use crate::entities::{follows, likes, messages, prelude::*, users};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub id: i32,
    pub username: String,
    pub image_url: String,
}

/// A message joined with the author fields every listing needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub id: i32,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: i32,
    pub author: Author,
}

impl Message {
    fn from_parts(message: messages::Model, author: users::Model) -> Self {
        Self {
            id: message.id,
            text: message.text,
            timestamp: message.timestamp,
            user_id: message.user_id,
            author: Author {
                id: author.id,
                username: author.username,
                image_url: author.image_url,
            },
        }
    }
}

/// Repository for message operations
pub struct MessageRepository {
    conn: DatabaseConnection,
}

impl MessageRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    // ========================================================================
    // Query Helpers
    // ========================================================================

    fn newest_first(query: Select<Messages>) -> Select<Messages> {
        query
            .order_by_desc(messages::Column::Timestamp)
            .order_by_desc(messages::Column::Id)
    }

    async fn fetch_with_authors(&self, query: Select<Messages>) -> Result<Vec<Message>> {
        let rows = query
            .find_also_related(Users)
            .all(&self.conn)
            .await
            .context("Failed to query messages")?;

        Ok(rows
            .into_iter()
            .filter_map(|(message, author)| author.map(|a| Message::from_parts(message, a)))
            .collect())
    }

    // ========================================================================
    // Message Operations
    // ========================================================================

    /// Fails if `user_id` does not reference an existing user.
    pub async fn create(&self, user_id: i32, text: &str) -> Result<messages::Model> {
        self.create_at(user_id, text, Utc::now()).await
    }

    pub async fn create_at(
        &self,
        user_id: i32,
        text: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<messages::Model> {
        let active = messages::ActiveModel {
            text: Set(text.to_string()),
            timestamp: Set(timestamp),
            user_id: Set(user_id),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert message")
    }

    pub async fn get(&self, id: i32) -> Result<Option<Message>> {
        let mut rows = self
            .fetch_with_authors(Messages::find_by_id(id))
            .await?;

        Ok(rows.pop())
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Messages::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete message")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn for_user(&self, user_id: i32, limit: u64) -> Result<Vec<Message>> {
        let query = Self::newest_first(
            Messages::find().filter(messages::Column::UserId.eq(user_id)),
        )
        .limit(limit);

        self.fetch_with_authors(query).await
    }

    /// Messages written by the users `follower_id` follows.
    pub async fn feed_for(&self, follower_id: i32, limit: u64) -> Result<Vec<Message>> {
        let followees = Query::select()
            .column(follows::Column::FolloweeId)
            .from(follows::Entity)
            .and_where(follows::Column::FollowerId.eq(follower_id))
            .to_owned();

        let query = Self::newest_first(
            Messages::find().filter(messages::Column::UserId.in_subquery(followees)),
        )
        .limit(limit);

        self.fetch_with_authors(query).await
    }

    pub async fn liked_by(&self, user_id: i32, limit: u64) -> Result<Vec<Message>> {
        let query = Self::newest_first(
            Messages::find()
                .inner_join(Likes)
                .filter(likes::Column::UserId.eq(user_id)),
        )
        .limit(limit);

        self.fetch_with_authors(query).await
    }

    pub async fn count_for_user(&self, user_id: i32) -> Result<u64> {
        Messages::find()
            .filter(messages::Column::UserId.eq(user_id))
            .count(&self.conn)
            .await
            .context("Failed to count messages")
    }
}
