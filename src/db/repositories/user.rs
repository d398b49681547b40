use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set,
};
use serde::Serialize;
use std::fmt;

use crate::entities::{follows, prelude::*, users};

/// User data returned from repository (without sensitive password hash)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub image_url: String,
    pub header_image_url: String,
    pub bio: Option<String>,
    pub location: Option<String>,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            image_url: model.image_url,
            header_image_url: model.header_image_url,
            bio: model.bio,
            location: model.location,
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<User #{}: {}, {}>", self.id, self.username, self.email)
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub image_url: String,
    pub header_image_url: String,
}

#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub username: String,
    pub email: String,
    pub image_url: String,
    pub header_image_url: String,
    pub bio: Option<String>,
    pub location: Option<String>,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, new_user: NewUser) -> Result<User> {
        let active = users::ActiveModel {
            username: Set(new_user.username),
            email: Set(new_user.email),
            password: Set(new_user.password_hash),
            image_url: Set(new_user.image_url),
            header_image_url: Set(new_user.header_image_url),
            bio: Set(None),
            location: Set(None),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert user")?;

        Ok(User::from(model))
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<User>> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")?;

        Ok(user.map(User::from))
    }

    /// Get user by username together with the stored password hash
    pub async fn get_by_username_with_password(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>> {
        let user = Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")?;

        Ok(user.map(|u| {
            let password_hash = u.password.clone();
            (User::from(u), password_hash)
        }))
    }

    pub async fn get_with_password(&self, id: i32) -> Result<Option<(User, String)>> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(|u| {
            let password_hash = u.password.clone();
            (User::from(u), password_hash)
        }))
    }

    /// All users, or those whose username contains `search`
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<User>> {
        let mut query = Users::find();

        if let Some(term) = search {
            query = query.filter(users::Column::Username.contains(term));
        }

        let rows = query
            .order_by_asc(users::Column::Username)
            .all(&self.conn)
            .await
            .context("Failed to list users")?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    pub async fn update_profile(&self, id: i32, update: ProfileUpdate) -> Result<User> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for profile update")?
            .ok_or_else(|| anyhow::anyhow!("User not found: {id}"))?;

        let mut active: users::ActiveModel = user.into();
        active.username = Set(update.username);
        active.email = Set(update.email);
        active.image_url = Set(update.image_url);
        active.header_image_url = Set(update.header_image_url);
        active.bio = Set(update.bio);
        active.location = Set(update.location);

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update user profile")?;

        Ok(User::from(model))
    }

    pub async fn update_password(&self, id: i32, password_hash: String) -> Result<()> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for password update")?
            .ok_or_else(|| anyhow::anyhow!("User not found: {id}"))?;

        let mut active: users::ActiveModel = user.into();
        active.password = Set(password_hash);
        active.update(&self.conn).await?;

        Ok(())
    }

    /// Messages, likes and follow edges go with the row via `ON DELETE CASCADE`.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Users::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete user")?;

        Ok(result.rows_affected > 0)
    }

    /// Users that `user_id` follows.
    pub async fn following(&self, user_id: i32) -> Result<Vec<User>> {
        let rows = Users::find()
            .join(JoinType::InnerJoin, follows::Relation::Followee.def().rev())
            .filter(follows::Column::FollowerId.eq(user_id))
            .order_by_asc(users::Column::Username)
            .all(&self.conn)
            .await
            .context("Failed to query followed users")?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Users following `user_id`.
    pub async fn followers(&self, user_id: i32) -> Result<Vec<User>> {
        let rows = Users::find()
            .join(JoinType::InnerJoin, follows::Relation::Follower.def().rev())
            .filter(follows::Column::FolloweeId.eq(user_id))
            .order_by_asc(users::Column::Username)
            .all(&self.conn)
            .await
            .context("Failed to query followers")?;

        Ok(rows.into_iter().map(User::from).collect())
    }
}
