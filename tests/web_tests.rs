use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use http_body_util::BodyExt;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;
use warbler::config::Config;
use warbler::state::AppState;

/// The database lives in `dir`, which is removed when the returned guard drops.
fn test_config(dir: &TempDir) -> Config {
    let path = dir.path().join("warbler.db");

    let mut config = Config::default();
    config.general.database_url = format!("sqlite://{}?mode=rwc", path.display());
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config
}

async fn spawn_app_with(config: impl FnOnce(&mut Config)) -> (Router, Arc<AppState>, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut cfg = test_config(&dir);
    config(&mut cfg);

    let state = AppState::from_config(cfg, None)
        .await
        .expect("Failed to create app state");
    let app = warbler::web::router(state.clone())
        .await
        .expect("Failed to build router");
    (app, state, dir)
}

async fn spawn_app() -> (Router, Arc<AppState>, TempDir) {
    spawn_app_with(|_| {}).await
}

fn encode_form(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// A browser stand-in: remembers the session cookie between requests.
struct Client {
    app: Router,
    cookie: Option<String>,
}

impl Client {
    fn new(app: &Router) -> Self {
        Self {
            app: app.clone(),
            cookie: None,
        }
    }

    async fn send(&mut self, mut request: Request<Body>) -> Response<Body> {
        if let Some(cookie) = &self.cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }

        let response = self.app.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            let value = pair.split_once('=').map(|(_, v)| v).unwrap_or_default();
            self.cookie = if value.is_empty() {
                None
            } else {
                Some(pair.to_string())
            };
        }

        response
    }

    async fn get(&mut self, uri: &str) -> Response<Body> {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn post(&mut self, uri: &str, fields: &[(&str, &str)]) -> Response<Body> {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(encode_form(fields)))
                .unwrap(),
        )
        .await
    }

    async fn signup(&mut self, username: &str) -> Response<Body> {
        let email = format!("{username}@x.com");
        self.post(
            "/signup",
            &[
                ("username", username),
                ("email", &email),
                ("password", "secret1"),
                ("image_url", ""),
            ],
        )
        .await
    }
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
}

async fn user_id(state: &AppState, username: &str) -> i32 {
    state
        .store
        .users()
        .get_by_username(username)
        .await
        .unwrap()
        .unwrap()
        .id
}

#[tokio::test]
async fn test_anonymous_homepage_and_no_cache_headers() {
    let (app, _, _db) = spawn_app().await;
    let mut anon = Client::new(&app);

    let response = anon.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CACHE_CONTROL],
        "no-cache, no-store, must-revalidate"
    );
    assert_eq!(response.headers()[header::PRAGMA], "no-cache");
    assert_eq!(response.headers()[header::EXPIRES], "0");

    let body = body_text(response).await;
    assert!(body.contains("Sign up now"));
}

#[tokio::test]
async fn test_signup_logs_in_and_shows_feed() {
    let (app, state, _db) = spawn_app().await;
    let mut alice = Client::new(&app);

    let response = alice.signup("alice").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let body = body_text(alice.get("/").await).await;
    assert!(body.contains("@alice"));
    assert!(body.contains(r#"href="/logout""#));

    let user = state.store.users().get_by_username("alice").await.unwrap().unwrap();
    assert_eq!(user.image_url, "/static/images/default-pic.svg");
    assert_eq!(user.header_image_url, "/static/images/warbler-hero.svg");
}

#[tokio::test]
async fn test_duplicate_signup_is_rejected() {
    let (app, state, _db) = spawn_app().await;
    Client::new(&app).signup("alice").await;

    let mut other = Client::new(&app);
    let response = other
        .post(
            "/signup",
            &[
                ("username", "alice"),
                ("email", "someone-else@x.com"),
                ("password", "secret2"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Username already taken"));

    let user = state.store.users().get_by_username("alice").await.unwrap().unwrap();
    assert_eq!(user.email, "alice@x.com");
}

#[tokio::test]
async fn test_invalid_signup_rerenders_with_errors() {
    let (app, _, _db) = spawn_app().await;
    let mut client = Client::new(&app);

    let response = client
        .post(
            "/signup",
            &[("username", ""), ("email", "nope"), ("password", "123")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains("This field is required."));
    assert!(body.contains("Invalid email address."));
    assert!(body.contains("Field must be at least 6 characters long."));
}

#[tokio::test]
async fn test_login_logout_cycle() {
    let (app, _, _db) = spawn_app().await;
    Client::new(&app).signup("alice").await;

    let mut client = Client::new(&app);
    let response = client
        .post("/login", &[("username", "alice"), ("password", "wrong-password")])
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Invalid credentials."));

    let response = client
        .post("/login", &[("username", "alice"), ("password", "secret1")])
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert!(body_text(client.get("/").await).await.contains("Hello, alice!"));

    let response = client.get("/logout").await;
    assert_eq!(location(&response), "/login");
    let body = body_text(client.get("/login").await).await;
    assert!(body.contains("Logged out successfully"));

    let body = body_text(client.get("/").await).await;
    assert!(body.contains("Sign up now"));
}

#[tokio::test]
async fn test_login_follows_local_next_only() {
    let (app, _, _db) = spawn_app().await;
    Client::new(&app).signup("alice").await;

    let mut client = Client::new(&app);
    let response = client
        .post(
            "/login",
            &[
                ("username", "alice"),
                ("password", "secret1"),
                ("next", "/users"),
            ],
        )
        .await;
    assert_eq!(location(&response), "/users");

    let mut client = Client::new(&app);
    let response = client
        .post(
            "/login",
            &[
                ("username", "alice"),
                ("password", "secret1"),
                ("next", "https://evil.example/"),
            ],
        )
        .await;
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_protected_routes_redirect_anonymous_visitors() {
    let (app, state, _db) = spawn_app().await;
    Client::new(&app).signup("bob").await;
    let bob_id = user_id(&state, "bob").await;

    let mut anon = Client::new(&app);

    let response = anon.get(&format!("/users/{bob_id}/following")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        format!("/login?next=%2Fusers%2F{bob_id}%2Ffollowing")
    );
    let body = body_text(anon.get("/login").await).await;
    assert!(body.contains("Access unauthorized."));

    let response = anon.get(&format!("/users/{bob_id}/followers")).await;
    assert!(location(&response).starts_with("/login?next="));

    let response = anon.post("/messages/new", &[("text", "sneaky")]).await;
    assert!(location(&response).starts_with("/login?next="));
    assert!(state.messages.user_messages(bob_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_follow_and_unfollow() {
    let (app, state, _db) = spawn_app().await;
    let mut alice = Client::new(&app);
    alice.signup("alice").await;
    Client::new(&app).signup("bob").await;

    let alice_id = user_id(&state, "alice").await;
    let bob_id = user_id(&state, "bob").await;

    let response = alice.post(&format!("/users/follow/{bob_id}"), &[]).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/users/{alice_id}/following"));

    // Following twice is harmless.
    alice.post(&format!("/users/follow/{bob_id}"), &[]).await;
    assert!(state.social.is_following(alice_id, bob_id).await.unwrap());
    assert!(state.social.is_followed_by(bob_id, alice_id).await.unwrap());
    assert_eq!(state.social.followers(bob_id).await.unwrap().len(), 1);

    let body = body_text(alice.get(&format!("/users/{alice_id}/following")).await).await;
    assert!(body.contains("@bob"));

    alice
        .post(&format!("/users/stop-following/{bob_id}"), &[])
        .await;
    assert!(!state.social.is_following(alice_id, bob_id).await.unwrap());
    assert!(!state.social.is_followed_by(bob_id, alice_id).await.unwrap());
}

#[tokio::test]
async fn test_following_missing_user_is_not_found() {
    let (app, _, _db) = spawn_app().await;
    let mut alice = Client::new(&app);
    alice.signup("alice").await;

    let response = alice.post("/users/follow/9999", &[]).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_feed_shows_followed_users_messages() {
    let (app, state, _db) = spawn_app().await;
    let mut alice = Client::new(&app);
    let mut bob = Client::new(&app);
    alice.signup("alice").await;
    bob.signup("bob").await;
    let bob_id = user_id(&state, "bob").await;

    alice.post(&format!("/users/follow/{bob_id}"), &[]).await;

    let response = bob.post("/messages/new", &[("text", "hi")]).await;
    assert_eq!(location(&response), format!("/users/{bob_id}"));

    let body = body_text(alice.get("/").await).await;
    assert!(body.contains("<p>hi</p>"));

    let mut anon = Client::new(&app);
    let body = body_text(anon.get("/").await).await;
    assert!(!body.contains("<p>hi</p>"));
}

#[tokio::test]
async fn test_message_too_long_is_rejected() {
    let (app, state, _db) = spawn_app().await;
    let mut bob = Client::new(&app);
    bob.signup("bob").await;
    let bob_id = user_id(&state, "bob").await;

    let text = "x".repeat(141);
    let response = bob.post("/messages/new", &[("text", &text)]).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        body_text(response)
            .await
            .contains("Field cannot be longer than 140 characters.")
    );
    assert!(state.messages.user_messages(bob_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_like_and_unlike_counts() {
    let (app, state, _db) = spawn_app().await;
    let mut alice = Client::new(&app);
    let mut bob = Client::new(&app);
    alice.signup("alice").await;
    bob.signup("bob").await;
    let bob_id = user_id(&state, "bob").await;

    bob.post("/messages/new", &[("text", "like me")]).await;
    let message_id = state.messages.user_messages(bob_id).await.unwrap()[0].id;

    let like = format!("/messages/{message_id}/like");
    let unlike = format!("/messages/{message_id}/unlike");

    let response = alice.post(&like, &[]).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    let count: u64 = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(count, 1);

    assert_eq!(body_text(alice.post(&like, &[]).await).await, "1");
    assert_eq!(body_text(bob.post(&like, &[]).await).await, "2");
    assert_eq!(body_text(alice.post(&unlike, &[]).await).await, "1");
    assert_eq!(body_text(alice.post(&unlike, &[]).await).await, "1");
    assert_eq!(body_text(bob.post(&unlike, &[]).await).await, "0");
    assert_eq!(body_text(bob.post(&unlike, &[]).await).await, "0");

    let response = alice.post("/messages/9999/like", &[]).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_only_author_can_delete_message() {
    let (app, state, _db) = spawn_app().await;
    let mut alice = Client::new(&app);
    let mut bob = Client::new(&app);
    alice.signup("alice").await;
    bob.signup("bob").await;
    let bob_id = user_id(&state, "bob").await;

    bob.post("/messages/new", &[("text", "mine")]).await;
    let message_id = state.messages.user_messages(bob_id).await.unwrap()[0].id;
    let delete = format!("/messages/{message_id}/delete");

    let response = alice.post(&delete, &[]).await;
    assert_eq!(location(&response), "/");
    assert!(body_text(alice.get("/").await).await.contains("Access unauthorized."));
    assert!(state.messages.get(message_id).await.is_ok());

    let mut anon = Client::new(&app);
    let response = anon.post(&delete, &[]).await;
    assert!(location(&response).starts_with("/login?next="));
    assert!(state.messages.get(message_id).await.is_ok());

    let response = bob.post(&delete, &[]).await;
    assert_eq!(location(&response), format!("/users/{bob_id}"));
    assert!(state.messages.get(message_id).await.is_err());
}

#[tokio::test]
async fn test_missing_pages_are_404() {
    let (app, _, _db) = spawn_app().await;
    let mut anon = Client::new(&app);

    assert_eq!(anon.get("/users/4242").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(anon.get("/messages/4242").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(anon.get("/no/such/page").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_search() {
    let (app, _, _db) = spawn_app().await;
    Client::new(&app).signup("alice").await;
    Client::new(&app).signup("bob").await;

    let mut anon = Client::new(&app);
    let body = body_text(anon.get("/users?q=ali").await).await;
    assert!(body.contains("@alice"));
    assert!(!body.contains("@bob"));

    let body = body_text(anon.get("/users").await).await;
    assert!(body.contains("@alice"));
    assert!(body.contains("@bob"));
}

#[tokio::test]
async fn test_edit_profile_requires_password() {
    let (app, state, _db) = spawn_app().await;
    let mut alice = Client::new(&app);
    alice.signup("alice").await;
    let alice_id = user_id(&state, "alice").await;

    let response = alice
        .post(
            "/users/profile",
            &[
                ("username", "alice2"),
                ("email", "alice@x.com"),
                ("bio", "hello"),
                ("password", "wrong-pass"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Invalid credentials."));

    let response = alice
        .post(
            "/users/profile",
            &[
                ("username", "alice2"),
                ("email", "alice@x.com"),
                ("bio", "hello"),
                ("location", "Lisbon"),
                ("password", "secret1"),
            ],
        )
        .await;
    assert_eq!(location(&response), format!("/users/{alice_id}"));

    let user = state.accounts.get_user(alice_id).await.unwrap();
    assert_eq!(user.username, "alice2");
    assert_eq!(user.bio.as_deref(), Some("hello"));
    assert_eq!(user.location.as_deref(), Some("Lisbon"));
}

#[tokio::test]
async fn test_change_password() {
    let (app, state, _db) = spawn_app().await;
    let mut alice = Client::new(&app);
    alice.signup("alice").await;

    let response = alice
        .post(
            "/users/password",
            &[
                ("old_pwd", "secret1"),
                ("new_pwd", "secret2"),
                ("confirm", "secret2"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    assert!(state.accounts.authenticate("alice", "secret1").await.unwrap().is_none());
    assert!(state.accounts.authenticate("alice", "secret2").await.unwrap().is_some());
}

#[tokio::test]
async fn test_delete_account_logs_out() {
    let (app, state, _db) = spawn_app().await;
    let mut alice = Client::new(&app);
    alice.signup("alice").await;

    let response = alice.post("/users/delete", &[]).await;
    assert_eq!(location(&response), "/signup");
    assert!(state.store.users().get_by_username("alice").await.unwrap().is_none());

    let body = body_text(alice.get("/").await).await;
    assert!(body.contains("Sign up now"));
}

#[tokio::test]
async fn test_static_assets_are_served() {
    let (app, _, _db) = spawn_app().await;
    let mut anon = Client::new(&app);

    let response = anon.get("/static/images/default-pic.svg").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/svg+xml");

    assert_eq!(anon.get("/static/nope.txt").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_ids_render_not_found_page() {
    let (app, _, _db) = spawn_app().await;
    let mut anon = Client::new(&app);

    for uri in ["/users/abc", "/users/99999999999", "/messages/abc"] {
        let response = anon.get(uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        assert!(
            response.headers()[header::CONTENT_TYPE]
                .to_str()
                .unwrap()
                .starts_with("text/html")
        );
        assert!(body_text(response).await.contains("doesn't exist"));
    }

    let mut alice = Client::new(&app);
    alice.signup("alice").await;
    assert_eq!(
        alice.post("/messages/abc/like", &[]).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        alice.get("/users/abc/followers").await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_session_of_deleted_user_is_anonymous() {
    let (app, state, _db) = spawn_app().await;
    let mut alice = Client::new(&app);
    alice.signup("alice").await;
    let alice_id = user_id(&state, "alice").await;

    state.accounts.delete_account(alice_id).await.unwrap();

    let body = body_text(alice.get("/").await).await;
    assert!(body.contains("Sign up now"));
    assert!(!body.contains(r#"href="/logout""#));

    let response = alice.get("/messages/new").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?next=%2Fmessages%2Fnew");
}

#[tokio::test]
async fn test_liked_messages_page() {
    let (app, state, _db) = spawn_app().await;
    let mut alice = Client::new(&app);
    let mut bob = Client::new(&app);
    alice.signup("alice").await;
    bob.signup("bob").await;
    let alice_id = user_id(&state, "alice").await;
    let bob_id = user_id(&state, "bob").await;

    bob.post("/messages/new", &[("text", "worth a heart")]).await;
    bob.post("/messages/new", &[("text", "not this one")]).await;
    let messages = state.messages.user_messages(bob_id).await.unwrap();
    let liked = messages.iter().find(|m| m.text == "worth a heart").unwrap();
    alice.post(&format!("/messages/{}/like", liked.id), &[]).await;

    let likes = format!("/users/{alice_id}/likes");
    let response = alice.get(&likes).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("<p>worth a heart</p>"));
    assert!(!body.contains("<p>not this one</p>"));

    let mut anon = Client::new(&app);
    let response = anon.get(&likes).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        format!("/login?next=%2Fusers%2F{alice_id}%2Flikes")
    );
}

#[tokio::test]
async fn test_queued_flash_survives_redirecting_post() {
    let (app, state, _db) = spawn_app().await;
    let mut alice = Client::new(&app);
    let mut bob = Client::new(&app);
    alice.signup("alice").await;
    bob.signup("bob").await;
    let alice_id = user_id(&state, "alice").await;
    let bob_id = user_id(&state, "bob").await;

    bob.post("/messages/new", &[("text", "mine")]).await;
    let message_id = state.messages.user_messages(bob_id).await.unwrap()[0].id;

    // Queues "Access unauthorized." without rendering a page.
    alice
        .post(&format!("/messages/{message_id}/delete"), &[])
        .await;

    let response = alice
        .post(
            "/users/password",
            &[
                ("old_pwd", "secret1"),
                ("new_pwd", "secret2"),
                ("confirm", "secret2"),
            ],
        )
        .await;
    assert_eq!(location(&response), format!("/users/{alice_id}"));

    let body = body_text(alice.get(&format!("/users/{alice_id}")).await).await;
    assert!(body.contains("Access unauthorized."));
    assert!(body.contains("Password updated!"));

    let body = body_text(alice.get("/").await).await;
    assert!(!body.contains("Password updated!"));
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _, _db) = spawn_app_with(|config| config.observability.metrics_enabled = false).await;
    let response = Client::new(&app).get("/metrics").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "Metrics not enabled");

    let dir = tempfile::tempdir().unwrap();
    let handle = PrometheusBuilder::new().build_recorder().handle();
    let state = AppState::from_config(test_config(&dir), Some(handle))
        .await
        .unwrap();
    let app = warbler::web::router(state).await.unwrap();
    assert_eq!(Client::new(&app).get("/metrics").await.status(), StatusCode::OK);
}
