use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
};
use std::sync::Arc;

use crate::state::AppState;

use super::WebError;
use super::session::PageContext;
use super::views;

/// GET /
///
/// Anonymous visitors get the landing page; logged-in users get the newest
/// messages from the people they follow.
pub async fn homepage(
    State(state): State<Arc<AppState>>,
    page: PageContext,
) -> Result<Html<String>, WebError> {
    let Some(user) = page.viewer.as_ref() else {
        return Ok(Html(views::home::anon(&page)));
    };

    let stats = state.accounts.profile_stats(user.id).await?;
    let messages = state.messages.feed(user.id).await?;
    let liked = state.messages.liked_ids(user.id).await?;

    Ok(Html(views::home::feed(&page, user, &stats, &messages, &liked)))
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Html(views::errors::not_found()))
}
