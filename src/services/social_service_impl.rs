//! `SeaORM` implementation of the `SocialService` trait.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::db::{Store, User, foreign_key_violation};
use crate::services::social_service::{SocialError, SocialService};

pub struct SeaOrmSocialService {
    store: Store,
}

impl SeaOrmSocialService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SocialService for SeaOrmSocialService {
    async fn follow(&self, follower_id: i32, followee_id: i32) -> Result<(), SocialError> {
        if self.store.users().get_by_id(followee_id).await?.is_none() {
            return Err(SocialError::UserNotFound);
        }

        match self.store.follows().add(follower_id, followee_id).await {
            Ok(true) => {
                info!(follower_id, followee_id, "Follow added");
                Ok(())
            }
            Ok(false) => {
                debug!(follower_id, followee_id, "Already following");
                Ok(())
            }
            // Either side was deleted between the lookup and the insert.
            Err(e) if foreign_key_violation(&e) => Err(SocialError::UserNotFound),
            Err(e) => Err(e.into()),
        }
    }

    async fn unfollow(&self, follower_id: i32, followee_id: i32) -> Result<(), SocialError> {
        if self.store.users().get_by_id(followee_id).await?.is_none() {
            return Err(SocialError::UserNotFound);
        }

        if self.store.follows().remove(follower_id, followee_id).await? {
            info!(follower_id, followee_id, "Follow removed");
        }

        Ok(())
    }

    async fn is_following(&self, user_id: i32, other_id: i32) -> Result<bool, SocialError> {
        Ok(self.store.follows().exists(user_id, other_id).await?)
    }

    async fn is_followed_by(&self, user_id: i32, other_id: i32) -> Result<bool, SocialError> {
        Ok(self.store.follows().exists(other_id, user_id).await?)
    }

    async fn following(&self, user_id: i32) -> Result<Vec<User>, SocialError> {
        Ok(self.store.users().following(user_id).await?)
    }

    async fn followers(&self, user_id: i32) -> Result<Vec<User>, SocialError> {
        Ok(self.store.users().followers(user_id).await?)
    }
}
