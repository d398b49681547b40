use axum::{
    Form, Json,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tower_sessions::Session;

use crate::forms::{FormErrors, MessageForm, Validate};
use crate::services::MessageError;
use crate::state::AppState;

use super::WebError;
use super::flash::{self, Flash};
use super::params::IdPath;
use super::session::{AuthUser, PageContext, Viewer};
use super::views;

/// GET /messages/new
pub async fn new_page(_user: AuthUser, page: PageContext) -> Html<String> {
    Html(views::messages::new(&page, "", &FormErrors::default()))
}

/// POST /messages/new
pub async fn create(
    State(state): State<Arc<AppState>>,
    AuthUser(me): AuthUser,
    viewer: Viewer,
    session: Session,
    Form(form): Form<MessageForm>,
) -> Result<Response, WebError> {
    if let Err(errors) = form.validate() {
        let page = PageContext::load(viewer, &session).await?;
        return Ok(Html(views::messages::new(&page, &form.text, &errors)).into_response());
    }

    match state.messages.post(me.id, &form.text).await {
        Ok(_) => Ok(Redirect::to(&format!("/users/{}", me.id)).into_response()),
        Err(MessageError::Validation(msg)) => {
            let mut page = PageContext::load(viewer, &session).await?;
            page.flash(Flash::danger(msg));
            Ok(
                Html(views::messages::new(&page, &form.text, &FormErrors::default()))
                    .into_response(),
            )
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /messages/{id}
pub async fn show(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    IdPath(message_id): IdPath,
) -> Result<Html<String>, WebError> {
    let message = state.messages.get(message_id).await?;
    let like_count = state.messages.like_count(message.id).await?;
    let liked = match page.viewer_id() {
        Some(viewer_id) => state
            .messages
            .liked_ids(viewer_id)
            .await?
            .contains(&message.id),
        None => false,
    };

    Ok(Html(views::messages::show(
        &page, &message, like_count, liked,
    )))
}

/// POST /messages/{id}/delete
pub async fn delete(
    State(state): State<Arc<AppState>>,
    AuthUser(me): AuthUser,
    session: Session,
    IdPath(message_id): IdPath,
) -> Result<Redirect, WebError> {
    match state.messages.delete(me.id, message_id).await {
        Ok(()) => Ok(Redirect::to(&format!("/users/{}", me.id))),
        Err(MessageError::Forbidden) => {
            tracing::warn!(user_id = me.id, message_id, "Refused to delete another user's message");
            flash::push(&session, Flash::danger("Access unauthorized.")).await?;
            Ok(Redirect::to("/"))
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /messages/{id}/like
pub async fn like(
    State(state): State<Arc<AppState>>,
    AuthUser(me): AuthUser,
    IdPath(message_id): IdPath,
) -> Result<Json<u64>, WebError> {
    let count = state.messages.like(me.id, message_id).await?;
    Ok(Json(count))
}

/// POST /messages/{id}/unlike
pub async fn unlike(
    State(state): State<Arc<AppState>>,
    AuthUser(me): AuthUser,
    IdPath(message_id): IdPath,
) -> Result<Json<u64>, WebError> {
    let count = state.messages.unlike(me.id, message_id).await?;
    Ok(Json(count))
}
