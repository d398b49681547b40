use axum::{
    Form,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use tower_sessions::Session;

use crate::db::User;
use crate::forms::{EditProfileForm, FormErrors, PasswordForm, Validate};
use crate::services::{AccountError, ProfileChanges, ProfileStats};
use crate::state::AppState;

use super::WebError;
use super::flash::{self, Flash};
use super::params::IdPath;
use super::session::{AuthUser, PageContext, Viewer, do_logout};
use super::views;
use super::views::users::{ProfileView, Tab};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

// ============================================================================
// Helpers
// ============================================================================

/// Ids of the users the viewer follows; empty for anonymous visitors.
async fn viewer_following(state: &AppState, page: &PageContext) -> Result<HashSet<i32>, WebError> {
    let Some(viewer_id) = page.viewer_id() else {
        return Ok(HashSet::new());
    };

    let users = state.social.following(viewer_id).await?;
    Ok(users.into_iter().map(|u| u.id).collect())
}

async fn viewer_likes(state: &AppState, page: &PageContext) -> Result<HashSet<i32>, WebError> {
    match page.viewer_id() {
        Some(viewer_id) => Ok(state.messages.liked_ids(viewer_id).await?),
        None => Ok(HashSet::new()),
    }
}

/// Loads the user whose profile is being shown plus their header counters.
async fn load_profile(
    state: &AppState,
    page: &PageContext,
    user_id: i32,
) -> Result<(User, ProfileStats, bool), WebError> {
    let user = state.accounts.get_user(user_id).await?;
    let stats = state.accounts.profile_stats(user.id).await?;
    let viewer_follows = match page.viewer_id() {
        Some(viewer_id) if viewer_id != user.id => {
            state.social.is_following(viewer_id, user.id).await?
        }
        _ => false,
    };
    Ok((user, stats, viewer_follows))
}

fn following_redirect(me: &User) -> Redirect {
    Redirect::to(&format!("/users/{}/following", me.id))
}

// ============================================================================
// Listing and profiles
// ============================================================================

/// GET /users
pub async fn list(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Query(query): Query<SearchQuery>,
) -> Result<Html<String>, WebError> {
    let search = query.q.unwrap_or_default();
    let users = state.accounts.list_users(Some(search.as_str())).await?;
    let following = viewer_following(&state, &page).await?;

    Ok(Html(views::users::index(
        &page,
        &users,
        &following,
        search.trim(),
    )))
}

/// GET /users/{id}
pub async fn show(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    IdPath(user_id): IdPath,
) -> Result<Html<String>, WebError> {
    let (user, stats, viewer_follows) = load_profile(&state, &page, user_id).await?;
    let messages = state.messages.user_messages(user.id).await?;
    let liked = viewer_likes(&state, &page).await?;

    let profile = ProfileView {
        user: &user,
        stats: &stats,
        viewer_follows,
    };
    Ok(Html(views::users::show(&page, &profile, &messages, &liked)))
}

/// GET /users/{id}/following
pub async fn following(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    IdPath(user_id): IdPath,
) -> Result<Html<String>, WebError> {
    let (user, stats, viewer_follows) = load_profile(&state, &page, user_id).await?;
    let users = state.social.following(user.id).await?;
    let viewer_following = viewer_following(&state, &page).await?;

    let profile = ProfileView {
        user: &user,
        stats: &stats,
        viewer_follows,
    };
    Ok(Html(views::users::connections(
        &page,
        &profile,
        Tab::Following,
        &users,
        &viewer_following,
    )))
}

/// GET /users/{id}/followers
pub async fn followers(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    IdPath(user_id): IdPath,
) -> Result<Html<String>, WebError> {
    let (user, stats, viewer_follows) = load_profile(&state, &page, user_id).await?;
    let users = state.social.followers(user.id).await?;
    let viewer_following = viewer_following(&state, &page).await?;

    let profile = ProfileView {
        user: &user,
        stats: &stats,
        viewer_follows,
    };
    Ok(Html(views::users::connections(
        &page,
        &profile,
        Tab::Followers,
        &users,
        &viewer_following,
    )))
}

/// GET /users/{id}/likes
pub async fn likes(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    IdPath(user_id): IdPath,
) -> Result<Html<String>, WebError> {
    let (user, stats, viewer_follows) = load_profile(&state, &page, user_id).await?;
    let messages = state.messages.liked_messages(user.id).await?;
    let liked = viewer_likes(&state, &page).await?;

    let profile = ProfileView {
        user: &user,
        stats: &stats,
        viewer_follows,
    };
    Ok(Html(views::users::likes(&page, &profile, &messages, &liked)))
}

// ============================================================================
// Follow graph
// ============================================================================

/// POST /users/follow/{id}
pub async fn follow(
    State(state): State<Arc<AppState>>,
    AuthUser(me): AuthUser,
    IdPath(followee_id): IdPath,
) -> Result<Redirect, WebError> {
    state.social.follow(me.id, followee_id).await?;
    Ok(following_redirect(&me))
}

/// POST /users/stop-following/{id}
pub async fn stop_following(
    State(state): State<Arc<AppState>>,
    AuthUser(me): AuthUser,
    IdPath(followee_id): IdPath,
) -> Result<Redirect, WebError> {
    state.social.unfollow(me.id, followee_id).await?;
    Ok(following_redirect(&me))
}

// ============================================================================
// Account management
// ============================================================================

/// GET /users/profile
pub async fn edit_profile_page(AuthUser(me): AuthUser, page: PageContext) -> Html<String> {
    let form = EditProfileForm {
        username: me.username,
        email: me.email,
        image_url: me.image_url,
        header_image_url: me.header_image_url,
        bio: me.bio.unwrap_or_default(),
        location: me.location.unwrap_or_default(),
        password: String::new(),
    };
    Html(views::users::edit(&page, &form, &FormErrors::default()))
}

/// POST /users/profile
pub async fn edit_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(me): AuthUser,
    viewer: Viewer,
    session: Session,
    Form(form): Form<EditProfileForm>,
) -> Result<Response, WebError> {
    if let Err(errors) = form.validate() {
        let page = PageContext::load(viewer, &session).await?;
        return Ok(Html(views::users::edit(&page, &form, &errors)).into_response());
    }

    let changes = ProfileChanges {
        username: form.username.clone(),
        email: form.email.clone(),
        image_url: Some(form.image_url.clone()),
        header_image_url: Some(form.header_image_url.clone()),
        bio: Some(form.bio.clone()),
        location: Some(form.location.clone()),
    };

    match state.accounts.update_profile(me.id, &form.password, changes).await {
        Ok(user) => {
            flash::push(
                &session,
                Flash::success(format!("{} your changes were successful!", user.username)),
            )
            .await?;
            Ok(Redirect::to(&format!("/users/{}", user.id)).into_response())
        }
        Err(
            e @ (AccountError::InvalidCredentials
            | AccountError::UsernameTaken
            | AccountError::EmailTaken
            | AccountError::Validation(_)),
        ) => {
            let mut page = PageContext::load(viewer, &session).await?;
            page.flash(Flash::danger(e.to_string()));
            Ok(Html(views::users::edit(&page, &form, &FormErrors::default())).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /users/password
pub async fn password_page(_user: AuthUser, page: PageContext) -> Html<String> {
    Html(views::users::password(&page, &FormErrors::default()))
}

/// POST /users/password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    AuthUser(me): AuthUser,
    viewer: Viewer,
    session: Session,
    Form(form): Form<PasswordForm>,
) -> Result<Response, WebError> {
    if let Err(errors) = form.validate() {
        let page = PageContext::load(viewer, &session).await?;
        return Ok(Html(views::users::password(&page, &errors)).into_response());
    }

    match state
        .accounts
        .change_password(me.id, &form.old_pwd, &form.new_pwd)
        .await
    {
        Ok(()) => {
            flash::push(&session, Flash::success("Password updated!")).await?;
            Ok(Redirect::to(&format!("/users/{}", me.id)).into_response())
        }
        Err(AccountError::InvalidCredentials) => {
            let mut page = PageContext::load(viewer, &session).await?;
            page.flash(Flash::danger("Invalid credentials."));
            Ok(Html(views::users::password(&page, &FormErrors::default())).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /users/delete
pub async fn delete(
    State(state): State<Arc<AppState>>,
    AuthUser(me): AuthUser,
    session: Session,
) -> Result<Redirect, WebError> {
    do_logout(&session).await?;
    state.accounts.delete_account(me.id).await?;
    Ok(Redirect::to("/signup"))
}
