//! Domain service for accounts: signup, authentication, profile and
//! password changes, and account deletion.

use serde::Serialize;
use thiserror::Error;

use crate::db::User;

/// Errors specific to account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Username already taken")]
    UsernameTaken,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Invalid credentials.")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for AccountError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct Signup {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Blank or missing falls back to the default profile picture.
    pub image_url: Option<String>,
}

/// Replacement values for the editable profile fields.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub username: String,
    pub email: String,
    pub image_url: Option<String>,
    pub header_image_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
}

/// Counters shown in the profile header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProfileStats {
    pub messages: u64,
    pub following: u64,
    pub followers: u64,
    pub likes: u64,
}

/// Domain service trait for accounts.
#[async_trait::async_trait]
pub trait AccountService: Send + Sync {
    /// Hashes the password and inserts the user.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::UsernameTaken`] or [`AccountError::EmailTaken`]
    /// on a uniqueness collision; the existing row is left untouched.
    async fn signup(&self, signup: Signup) -> Result<User, AccountError>;

    /// Returns the user when the username exists and the password matches.
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, AccountError>;

    async fn find_user(&self, id: i32) -> Result<Option<User>, AccountError>;

    /// Like [`AccountService::find_user`] but a missing user is an error.
    async fn get_user(&self, id: i32) -> Result<User, AccountError>;

    /// All users, or those whose username contains `search`.
    async fn list_users(&self, search: Option<&str>) -> Result<Vec<User>, AccountError>;

    /// Applies profile changes after re-checking the current password.
    async fn update_profile(
        &self,
        user_id: i32,
        current_password: &str,
        changes: ProfileChanges,
    ) -> Result<User, AccountError>;

    async fn change_password(
        &self,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AccountError>;

    async fn delete_account(&self, user_id: i32) -> Result<(), AccountError>;

    async fn profile_stats(&self, user_id: i32) -> Result<ProfileStats, AccountError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_failure_is_internal() {
        let err = anyhow::Error::new(sea_orm::DbErr::Custom("disk I/O error".to_string()))
            .context("Failed to insert user");

        match AccountError::from(err) {
            AccountError::Internal(msg) => {
                assert!(msg.starts_with("Failed to insert user: "));
                assert!(msg.contains("disk I/O error"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
