//! Domain service for the follow graph.

use thiserror::Error;

use crate::db::User;

#[derive(Debug, Error)]
pub enum SocialError {
    #[error("User not found")]
    UserNotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for SocialError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

/// Domain service trait for follow edges.
///
/// Following and unfollowing are idempotent: repeating either leaves exactly
/// one (or zero) edges and is not an error.
#[async_trait::async_trait]
pub trait SocialService: Send + Sync {
    /// # Errors
    ///
    /// Returns [`SocialError::UserNotFound`] if `followee_id` does not exist.
    async fn follow(&self, follower_id: i32, followee_id: i32) -> Result<(), SocialError>;

    async fn unfollow(&self, follower_id: i32, followee_id: i32) -> Result<(), SocialError>;

    /// Does `user_id` follow `other_id`?
    async fn is_following(&self, user_id: i32, other_id: i32) -> Result<bool, SocialError>;

    /// Is `user_id` followed by `other_id`?
    async fn is_followed_by(&self, user_id: i32, other_id: i32) -> Result<bool, SocialError>;

    async fn following(&self, user_id: i32) -> Result<Vec<User>, SocialError>;

    async fn followers(&self, user_id: i32) -> Result<Vec<User>, SocialError>;
}
