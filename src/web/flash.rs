//! One-shot messages stored in the session until the next rendered page.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::constants::session::FLASH_KEY;

use super::WebError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Success,
    Info,
    Danger,
}

impl Category {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub category: Category,
    pub message: String,
}

impl Flash {
    pub fn new(category: Category, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Category::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Category::Info, message)
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self::new(Category::Danger, message)
    }
}

/// Queues a flash for the next page render.
pub async fn push(session: &Session, flash: Flash) -> Result<(), WebError> {
    let mut queued: Vec<Flash> = session.get(FLASH_KEY).await?.unwrap_or_default();
    queued.push(flash);
    session.insert(FLASH_KEY, queued).await?;
    Ok(())
}

/// Drains every queued flash.
pub async fn take(session: &Session) -> Result<Vec<Flash>, WebError> {
    let queued: Option<Vec<Flash>> = session.get(FLASH_KEY).await?;

    // Removing marks the session dirty, so only touch it when there is
    // something to drain.
    if queued.is_some() {
        session.remove::<Vec<Flash>>(FLASH_KEY).await?;
    }

    Ok(queued.unwrap_or_default())
}
