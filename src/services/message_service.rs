//! Domain service for messages, likes and feed assembly.

use std::collections::HashSet;
use thiserror::Error;

use crate::db::Message;

#[derive(Debug, Error)]
pub enum MessageError {
    #[error("Message not found")]
    NotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Access unauthorized.")]
    Forbidden,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for MessageError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

/// Domain service trait for messages.
#[async_trait::async_trait]
pub trait MessageService: Send + Sync {
    async fn post(&self, user_id: i32, text: &str) -> Result<Message, MessageError>;

    async fn get(&self, message_id: i32) -> Result<Message, MessageError>;

    /// # Errors
    ///
    /// Returns [`MessageError::Forbidden`] unless `user_id` wrote the message.
    async fn delete(&self, user_id: i32, message_id: i32) -> Result<(), MessageError>;

    /// Likes the message and returns its like count. Liking twice is a no-op.
    async fn like(&self, user_id: i32, message_id: i32) -> Result<u64, MessageError>;

    /// Removes the like and returns the like count. Unliking a message that
    /// was not liked is a no-op.
    async fn unlike(&self, user_id: i32, message_id: i32) -> Result<u64, MessageError>;

    async fn like_count(&self, message_id: i32) -> Result<u64, MessageError>;

    /// Newest messages from the users `viewer_id` follows.
    async fn feed(&self, viewer_id: i32) -> Result<Vec<Message>, MessageError>;

    async fn user_messages(&self, user_id: i32) -> Result<Vec<Message>, MessageError>;

    async fn liked_messages(&self, user_id: i32) -> Result<Vec<Message>, MessageError>;

    async fn liked_ids(&self, user_id: i32) -> Result<HashSet<i32>, MessageError>;
}
