use axum::{
    Form,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use crate::forms::{FormErrors, LoginForm, SignupForm, Validate};
use crate::services::{AccountError, Signup};
use crate::state::AppState;

use super::WebError;
use super::flash::{self, Flash};
use super::session::{PageContext, Viewer, do_login, do_logout};
use super::views;

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Only same-site absolute paths are followed after login.
fn safe_next(next: &str) -> &str {
    let next = next.trim();
    if next.starts_with('/') && !next.starts_with("//") && !next.contains('\\') {
        next
    } else {
        "/"
    }
}

// ============================================================================
// Signup
// ============================================================================

/// GET /signup
pub async fn signup_page(page: PageContext) -> Html<String> {
    Html(views::auth::signup(
        &page,
        &SignupForm::default(),
        &FormErrors::default(),
    ))
}

/// POST /signup
pub async fn signup(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Result<Response, WebError> {
    if let Err(errors) = form.validate() {
        let page = PageContext::load(viewer, &session).await?;
        return Ok(Html(views::auth::signup(&page, &form, &errors)).into_response());
    }

    let result = state
        .accounts
        .signup(Signup {
            username: form.username.trim().to_string(),
            email: form.email.trim().to_string(),
            password: form.password.clone(),
            image_url: Some(form.image_url.clone()),
        })
        .await;

    match result {
        Ok(user) => {
            do_login(&session, &user).await?;
            Ok(Redirect::to("/").into_response())
        }
        Err(
            e @ (AccountError::UsernameTaken
            | AccountError::EmailTaken
            | AccountError::Validation(_)),
        ) => {
            let mut page = PageContext::load(viewer, &session).await?;
            page.flash(Flash::danger(e.to_string()));
            Ok(Html(views::auth::signup(&page, &form, &FormErrors::default())).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

// ============================================================================
// Login / logout
// ============================================================================

/// GET /login
pub async fn login_page(page: PageContext, Query(query): Query<NextQuery>) -> Html<String> {
    let form = LoginForm {
        next: query.next.unwrap_or_default(),
        ..LoginForm::default()
    };
    Html(views::auth::login(&page, &form, &FormErrors::default()))
}

/// POST /login
pub async fn login(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, WebError> {
    if let Err(errors) = form.validate() {
        let page = PageContext::load(viewer, &session).await?;
        return Ok(Html(views::auth::login(&page, &form, &errors)).into_response());
    }

    let Some(user) = state
        .accounts
        .authenticate(form.username.trim(), &form.password)
        .await?
    else {
        tracing::info!(username = %form.username, "Failed login attempt");
        let mut page = PageContext::load(viewer, &session).await?;
        page.flash(Flash::danger("Invalid credentials."));
        return Ok(Html(views::auth::login(&page, &form, &FormErrors::default())).into_response());
    };

    do_login(&session, &user).await?;
    flash::push(&session, Flash::success(format!("Hello, {}!", user.username))).await?;

    Ok(Redirect::to(safe_next(&form.next)).into_response())
}

/// GET /logout
pub async fn logout(session: Session) -> Result<Redirect, WebError> {
    do_logout(&session).await?;
    flash::push(&session, Flash::info("Logged out successfully")).await?;
    Ok(Redirect::to("/login"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next("/users/3/following"), "/users/3/following");
        assert_eq!(safe_next(""), "/");
        assert_eq!(safe_next("https://evil.example"), "/");
        assert_eq!(safe_next("//evil.example"), "/");
        assert_eq!(safe_next("/\\evil.example"), "/");
    }
}
