//! `SeaORM` implementation of the `AccountService` trait.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::SecurityConfig;
use crate::constants::images::{DEFAULT_HEADER_IMAGE, DEFAULT_PROFILE_IMAGE};
use crate::db::{NewUser, ProfileUpdate, Store, UniqueField, User, unique_violation};
use crate::services::account_service::{
    AccountError, AccountService, ProfileChanges, ProfileStats, Signup,
};
use crate::services::password::{hash_password_blocking, verify_password_blocking};

pub struct SeaOrmAccountService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAccountService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    /// Loads the user and checks `password` against the stored hash.
    async fn verified_user(&self, user_id: i32, password: &str) -> Result<User, AccountError> {
        let (user, hash) = self
            .store
            .users()
            .get_with_password(user_id)
            .await?
            .ok_or(AccountError::UserNotFound)?;

        if verify_password_blocking(hash, password).await? {
            Ok(user)
        } else {
            Err(AccountError::InvalidCredentials)
        }
    }
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn map_write_error(err: anyhow::Error) -> AccountError {
    match unique_violation(&err) {
        Some(UniqueField::Username) => AccountError::UsernameTaken,
        Some(UniqueField::Email) => AccountError::EmailTaken,
        Some(UniqueField::Other) => AccountError::Validation("Duplicate value".to_string()),
        None => AccountError::from(err),
    }
}

#[async_trait]
impl AccountService for SeaOrmAccountService {
    async fn signup(&self, signup: Signup) -> Result<User, AccountError> {
        let username = signup.username.trim().to_string();
        let email = signup.email.trim().to_string();

        if username.is_empty() || email.is_empty() {
            return Err(AccountError::Validation(
                "Username and email are required".to_string(),
            ));
        }

        let password_hash = hash_password_blocking(&signup.password, &self.security).await?;

        let user = self
            .store
            .users()
            .create(NewUser {
                username,
                email,
                password_hash,
                image_url: or_default(signup.image_url, DEFAULT_PROFILE_IMAGE),
                header_image_url: DEFAULT_HEADER_IMAGE.to_string(),
            })
            .await
            .map_err(map_write_error)?;

        info!(user_id = user.id, username = %user.username, "User signed up");
        Ok(user)
    }

    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, AccountError> {
        let Some((user, hash)) = self
            .store
            .users()
            .get_by_username_with_password(username)
            .await?
        else {
            return Ok(None);
        };

        match verify_password_blocking(hash, password).await {
            Ok(true) => Ok(Some(user)),
            Ok(false) => Ok(None),
            Err(e) => {
                warn!(user_id = user.id, error = %e, "Stored password hash is unreadable");
                Ok(None)
            }
        }
    }

    async fn find_user(&self, id: i32) -> Result<Option<User>, AccountError> {
        Ok(self.store.users().get_by_id(id).await?)
    }

    async fn get_user(&self, id: i32) -> Result<User, AccountError> {
        self.find_user(id).await?.ok_or(AccountError::UserNotFound)
    }

    async fn list_users(&self, search: Option<&str>) -> Result<Vec<User>, AccountError> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        Ok(self.store.users().list(search).await?)
    }

    async fn update_profile(
        &self,
        user_id: i32,
        current_password: &str,
        changes: ProfileChanges,
    ) -> Result<User, AccountError> {
        self.verified_user(user_id, current_password).await?;

        let update = ProfileUpdate {
            username: changes.username.trim().to_string(),
            email: changes.email.trim().to_string(),
            image_url: or_default(changes.image_url, DEFAULT_PROFILE_IMAGE),
            header_image_url: or_default(changes.header_image_url, DEFAULT_HEADER_IMAGE),
            bio: non_blank(changes.bio),
            location: non_blank(changes.location),
        };

        let user = self
            .store
            .users()
            .update_profile(user_id, update)
            .await
            .map_err(map_write_error)?;

        info!(user_id, "Profile updated");
        Ok(user)
    }

    async fn change_password(
        &self,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AccountError> {
        self.verified_user(user_id, current_password).await?;

        let new_hash = hash_password_blocking(new_password, &self.security).await?;
        self.store
            .users()
            .update_password(user_id, new_hash)
            .await?;

        info!(user_id, "Password changed");
        Ok(())
    }

    async fn delete_account(&self, user_id: i32) -> Result<(), AccountError> {
        if !self.store.users().delete(user_id).await? {
            return Err(AccountError::UserNotFound);
        }

        info!(user_id, "Account deleted");
        Ok(())
    }

    async fn profile_stats(&self, user_id: i32) -> Result<ProfileStats, AccountError> {
        Ok(ProfileStats {
            messages: self.store.messages().count_for_user(user_id).await?,
            following: self.store.follows().count_following(user_id).await?,
            followers: self.store.follows().count_followers(user_id).await?,
            likes: self.store.likes().count_for_user(user_id).await?,
        })
    }
}
