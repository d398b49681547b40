//! `SeaORM` implementation of the `MessageService` trait.

use async_trait::async_trait;
use std::collections::HashSet;
use tracing::info;

use crate::constants::limits::{FEED_LIMIT, MESSAGE_MAX_CHARS};
use crate::db::{Message, Store, foreign_key_violation};
use crate::services::message_service::{MessageError, MessageService};

pub struct SeaOrmMessageService {
    store: Store,
}

impl SeaOrmMessageService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn ensure_exists(&self, message_id: i32) -> Result<Message, MessageError> {
        self.store
            .messages()
            .get(message_id)
            .await?
            .ok_or(MessageError::NotFound)
    }
}

#[async_trait]
impl MessageService for SeaOrmMessageService {
    async fn post(&self, user_id: i32, text: &str) -> Result<Message, MessageError> {
        let text = text.trim();

        if text.is_empty() {
            return Err(MessageError::Validation("Message text is required".to_string()));
        }
        if text.chars().count() > MESSAGE_MAX_CHARS {
            return Err(MessageError::Validation(format!(
                "Message text must be {MESSAGE_MAX_CHARS} characters or less"
            )));
        }

        let model = match self.store.messages().create(user_id, text).await {
            Ok(model) => model,
            Err(e) if foreign_key_violation(&e) => return Err(MessageError::UserNotFound),
            Err(e) => return Err(e.into()),
        };

        info!(user_id, message_id = model.id, "Message posted");
        self.ensure_exists(model.id).await
    }

    async fn get(&self, message_id: i32) -> Result<Message, MessageError> {
        self.ensure_exists(message_id).await
    }

    async fn delete(&self, user_id: i32, message_id: i32) -> Result<(), MessageError> {
        let message = self.ensure_exists(message_id).await?;

        if message.user_id != user_id {
            return Err(MessageError::Forbidden);
        }

        self.store.messages().delete(message_id).await?;
        info!(user_id, message_id, "Message deleted");
        Ok(())
    }

    async fn like(&self, user_id: i32, message_id: i32) -> Result<u64, MessageError> {
        self.ensure_exists(message_id).await?;

        match self.store.likes().add(user_id, message_id).await {
            Ok(_) => {}
            Err(e) if foreign_key_violation(&e) => return Err(MessageError::NotFound),
            Err(e) => return Err(e.into()),
        }

        self.like_count(message_id).await
    }

    async fn unlike(&self, user_id: i32, message_id: i32) -> Result<u64, MessageError> {
        self.ensure_exists(message_id).await?;
        self.store.likes().remove(user_id, message_id).await?;
        self.like_count(message_id).await
    }

    async fn like_count(&self, message_id: i32) -> Result<u64, MessageError> {
        Ok(self.store.likes().count_for_message(message_id).await?)
    }

    async fn feed(&self, viewer_id: i32) -> Result<Vec<Message>, MessageError> {
        Ok(self.store.messages().feed_for(viewer_id, FEED_LIMIT).await?)
    }

    async fn user_messages(&self, user_id: i32) -> Result<Vec<Message>, MessageError> {
        Ok(self.store.messages().for_user(user_id, FEED_LIMIT).await?)
    }

    async fn liked_messages(&self, user_id: i32) -> Result<Vec<Message>, MessageError> {
        Ok(self.store.messages().liked_by(user_id, FEED_LIMIT).await?)
    }

    async fn liked_ids(&self, user_id: i32) -> Result<HashSet<i32>, MessageError> {
        let ids = self.store.likes().message_ids_for_user(user_id).await?;
        Ok(ids.into_iter().collect())
    }
}
