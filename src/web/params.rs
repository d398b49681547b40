use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use super::WebError;

/// Numeric `{id}` path segment. Anything that does not parse as an id is a
/// missing resource, so it renders the 404 page instead of a plain 400.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdPath(pub i32);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<i32>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(Self(id)),
            Err(rejection) => Err(WebError::NotFound(rejection.body_text())),
        }
    }
}
