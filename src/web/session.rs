//! Login state.
//!
//! [`attach_viewer`] resolves the session's user once per request and stores
//! it in the request extensions; handlers receive it as an explicit argument
//! through the [`Viewer`], [`AuthUser`] and [`PageContext`] extractors.

use anyhow::Result;
use argon2::Argon2;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::convert::Infallible;
use std::sync::Arc;
use tower_sessions::{Expiry, Session, SessionManagerLayer, cookie::Key};
use tower_sessions_sqlx_store::SqliteStore;

use crate::config::ServerConfig;
use crate::constants::session::CURR_USER_KEY;
use crate::db::{Store, User};
use crate::state::AppState;

use super::WebError;
use super::flash::{self, Flash};

const SESSION_KEY_SALT: &[u8] = b"warbler.session-cookie.v1";

/// Stretches the configured secret into the 64 bytes the cookie signer needs.
pub fn derive_cookie_key(secret: &str) -> Result<Key> {
    let mut out = [0u8; 64];
    Argon2::default()
        .hash_password_into(secret.as_bytes(), SESSION_KEY_SALT, &mut out)
        .map_err(|e| anyhow::anyhow!("Failed to derive session key: {e}"))?;
    Ok(Key::from(&out))
}

/// Server-side sessions in the application database, keyed by a signed cookie.
pub async fn session_layer(
    store: &Store,
    server: &ServerConfig,
    secret: &str,
) -> Result<SessionManagerLayer<SqliteStore, tower_sessions::service::SignedCookie>> {
    let session_store = SqliteStore::new(store.conn.get_sqlite_connection_pool().clone());
    session_store.migrate().await?;

    Ok(SessionManagerLayer::new(session_store)
        .with_secure(server.secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            server.session_inactivity_minutes,
        )))
        .with_signed(derive_cookie_key(secret)?))
}

pub async fn do_login(session: &Session, user: &User) -> Result<(), WebError> {
    session.cycle_id().await?;
    session.insert(CURR_USER_KEY, user.id).await?;
    Ok(())
}

pub async fn do_logout(session: &Session) -> Result<(), WebError> {
    session.remove::<i32>(CURR_USER_KEY).await?;
    Ok(())
}

// ============================================================================
// Middleware
// ============================================================================

pub async fn attach_viewer(
    State(state): State<Arc<AppState>>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, WebError> {
    let user = match session.get::<i32>(CURR_USER_KEY).await? {
        Some(user_id) => {
            let user = state.accounts.find_user(user_id).await?;
            if user.is_none() {
                // Account deleted elsewhere; drop the stale login.
                do_logout(&session).await?;
            }
            user
        }
        None => None,
    };

    if let Some(user) = &user {
        tracing::Span::current().record("user_id", user.id);
    }

    request.extensions_mut().insert(Viewer(user));
    Ok(next.run(request).await)
}

/// Route layer for pages that need a logged-in user.
pub async fn require_login(
    viewer: Viewer,
    session: Session,
    request: Request,
    next: Next,
) -> Response {
    if viewer.is_authenticated() {
        return next.run(request).await;
    }

    login_redirect(&session, request.uri().path()).await
}

async fn login_redirect(session: &Session, path: &str) -> Response {
    if let Err(e) = flash::push(session, Flash::danger("Access unauthorized.")).await {
        return e.into_response();
    }

    let target = format!("/login?next={}", urlencoding::encode(path));
    Redirect::to(&target).into_response()
}

// ============================================================================
// Extractors
// ============================================================================

/// The user behind the current request, if any.
#[derive(Debug, Clone, Default)]
pub struct Viewer(pub Option<User>);

impl Viewer {
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }
}

impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Self>().cloned().unwrap_or_default())
    }
}

/// A logged-in user. Rejects anonymous requests with a redirect to the
/// login page.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(Viewer(Some(user))) = parts.extensions.get::<Viewer>() {
            return Ok(Self(user.clone()));
        }

        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;
        Err(login_redirect(&session, parts.uri.path()).await)
    }
}

/// Everything the page layout needs: the viewer and any pending flashes.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub viewer: Option<User>,
    pub flashes: Vec<Flash>,
}

impl PageContext {
    /// Context for a page rendered by this request. Drains queued flashes,
    /// so handlers that may redirect instead call this only once they know
    /// they are rendering.
    pub async fn load(viewer: Viewer, session: &Session) -> Result<Self, WebError> {
        Ok(Self {
            viewer: viewer.0,
            flashes: flash::take(session).await?,
        })
    }

    /// Shows a flash on the page being rendered right now.
    pub fn flash(&mut self, flash: Flash) {
        self.flashes.push(flash);
    }

    #[must_use]
    pub fn viewer_id(&self) -> Option<i32> {
        self.viewer.as_ref().map(|u| u.id)
    }
}

impl<S> FromRequestParts<S> for PageContext
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Ok(viewer) = Viewer::from_request_parts(parts, state).await;
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        Self::load(viewer, &session)
            .await
            .map_err(IntoResponse::into_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_key_is_deterministic() {
        let a = derive_cookie_key("it's a secret").unwrap();
        let b = derive_cookie_key("it's a secret").unwrap();
        let c = derive_cookie_key("another secret").unwrap();

        assert_eq!(a.master(), b.master());
        assert_ne!(a.master(), c.master());
    }
}
