//! HTTP surface: routes, middleware and HTML views.

use axum::{
    Router,
    http::{HeaderName, HeaderValue, header},
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

mod assets;
mod auth;
mod error;
pub mod flash;
mod home;
mod messages;
mod observability;
mod params;
pub mod session;
mod users;
pub mod views;

pub use error::WebError;

pub async fn router(state: Arc<AppState>) -> anyhow::Result<Router> {
    let session_layer = session::session_layer(
        &state.store,
        &state.config.server,
        &state.config.security.secret_key,
    )
    .await?;

    let public_routes = Router::new()
        .route("/", get(home::homepage))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/users", get(users::list))
        .route("/users/{id}", get(users::show))
        .route("/messages/{id}", get(messages::show))
        .route("/static/{*path}", get(assets::serve_static))
        .route("/metrics", get(observability::get_metrics));

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes())
        .fallback(home::not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session::attach_viewer,
        ))
        .layer(session_layer)
        .layer(middleware::from_fn(observability::track_requests))
        .layer(TraceLayer::new_for_http())
        .layer(no_cache(header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"))
        .layer(no_cache(header::PRAGMA, "no-cache"))
        .layer(no_cache(header::EXPIRES, "0"))
        .with_state(state);

    Ok(app)
}

fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/{id}/following", get(users::following))
        .route("/users/{id}/followers", get(users::followers))
        .route("/users/{id}/likes", get(users::likes))
        .route("/users/follow/{id}", post(users::follow))
        .route("/users/stop-following/{id}", post(users::stop_following))
        .route(
            "/users/profile",
            get(users::edit_profile_page).post(users::edit_profile),
        )
        .route(
            "/users/password",
            get(users::password_page).post(users::change_password),
        )
        .route("/users/delete", post(users::delete))
        .route("/messages/new", get(messages::new_page).post(messages::create))
        .route("/messages/{id}/delete", post(messages::delete))
        .route("/messages/{id}/like", post(messages::like))
        .route("/messages/{id}/unlike", post(messages::unlike))
        .route_layer(middleware::from_fn(session::require_login))
}

fn no_cache(name: HeaderName, value: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(name, HeaderValue::from_static(value))
}
