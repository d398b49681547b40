use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::services::{AccountError, MessageError, SocialError};

use super::views;

#[derive(Debug, Error)]
pub enum WebError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Session error: {0}")]
    Session(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound(msg) => {
                tracing::debug!("Not found: {}", msg);
                (StatusCode::NOT_FOUND, Html(views::errors::not_found())).into_response()
            }
            Self::Forbidden(msg) => {
                tracing::warn!("Forbidden: {}", msg);
                (StatusCode::FORBIDDEN, Html(views::errors::forbidden())).into_response()
            }
            Self::Unauthorized => Redirect::to("/login").into_response(),
            Self::Session(msg) => {
                tracing::error!("Session error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(views::errors::server_error()),
                )
                    .into_response()
            }
            Self::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(views::errors::server_error()),
                )
                    .into_response()
            }
        }
    }
}

impl From<anyhow::Error> for WebError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

impl From<tower_sessions::session::Error> for WebError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self::Session(err.to_string())
    }
}

impl From<AccountError> for WebError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::UserNotFound => Self::NotFound("User not found".to_string()),
            AccountError::InvalidCredentials => Self::Unauthorized,
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<SocialError> for WebError {
    fn from(err: SocialError) -> Self {
        match err {
            SocialError::UserNotFound => Self::NotFound("User not found".to_string()),
            SocialError::Internal(msg) => Self::Internal(msg),
        }
    }
}

impl From<MessageError> for WebError {
    fn from(err: MessageError) -> Self {
        match err {
            MessageError::NotFound => Self::NotFound("Message not found".to_string()),
            MessageError::UserNotFound => Self::NotFound("User not found".to_string()),
            MessageError::Forbidden => Self::Forbidden("Message belongs to another user".to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}
