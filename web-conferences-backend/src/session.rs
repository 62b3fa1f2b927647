use axum::async_trait;
use axum::extract::FromRequestParts;
use cookie::Cookie;
use headers::authorization::Bearer;
use headers::{Authorization, HeaderMapExt as _};
use http::header::COOKIE;
use http::request::Parts;
use serde::Deserialize;
use tracing::debug;
use web_conferences_database::models::User;
use web_conferences_database::token::token_digest;

use crate::error::AppError;
use crate::AppState;

const COOKIE_NAME_ACCESS_TOKEN: &str = "__Host_access_token";

/// Where the access token of a request was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenSource {
    AuthorizationHeader,
    QueryParameter,
    Cookie,
}

#[derive(Deserialize)]
struct TokenQuery {
    access_token: Option<String>,
}

/// The bearer header wins over the query parameter, which wins over the cookie.
/// Empty tokens count as absent.
#[must_use]
pub fn access_token(parts: &Parts) -> Option<(String, TokenSource)> {
    if let Some(Authorization(bearer)) = parts.headers.typed_get::<Authorization<Bearer>>() {
        return Some((bearer.token().to_owned(), TokenSource::AuthorizationHeader));
    }
    if let Some(token) = parts
        .uri
        .query()
        .and_then(|query| serde_urlencoded::from_str::<TokenQuery>(query).ok())
        .and_then(|query| query.access_token)
        .filter(|token| !token.is_empty())
    {
        return Some((token, TokenSource::QueryParameter));
    }
    parts
        .headers
        .get_all(COOKIE)
        .into_iter()
        .filter_map(|value| value.to_str().ok())
        .map(std::borrow::ToOwned::to_owned)
        .flat_map(Cookie::split_parse)
        .filter_map(std::result::Result::ok)
        .find(|cookie| cookie.name() == COOKIE_NAME_ACCESS_TOKEN && !cookie.value().is_empty())
        .map(|cookie| (cookie.value().to_owned(), TokenSource::Cookie))
}

/// The requester. Requests without credentials get a session without a user,
/// requests with credentials that don't resolve to a user are rejected.
#[derive(Clone, Debug)]
#[must_use]
pub struct Session {
    current_user: Option<User>,
}

impl Session {
    pub const fn anonymous() -> Self {
        Self { current_user: None }
    }

    pub const fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    pub fn require_user(&self) -> Result<&User, AppError> {
        self.current_user().ok_or(AppError::Unauthenticated)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some((token, source)) = access_token(parts) else {
            return Ok(Self::anonymous());
        };
        match state
            .store
            .user_by_token_digest(&token_digest(&token))
            .await?
        {
            Some(user) => {
                debug!(user = %user.id, ?source, "authenticated request");
                Ok(Self {
                    current_user: Some(user),
                })
            }
            None => {
                debug!(?source, "unknown access token");
                Err(AppError::InvalidAccessToken)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use http::Request;

    use super::*;

    fn parts(request: Request<()>) -> Parts {
        request.into_parts().0
    }

    #[test]
    fn no_credentials() {
        let parts = parts(Request::get("/api/v1/courses/1/conferences?page=2").body(()).unwrap());
        assert_eq!(access_token(&parts), None);
    }

    #[test]
    fn bearer_header_takes_precedence() {
        let parts = parts(
            Request::get("/api/v1/courses/1/conferences?access_token=query")
                .header("authorization", "Bearer header")
                .header("cookie", "__Host_access_token=cookie")
                .body(())
                .unwrap(),
        );
        assert_eq!(
            access_token(&parts),
            Some(("header".to_owned(), TokenSource::AuthorizationHeader))
        );
    }

    #[test]
    fn query_parameter_before_cookie() {
        let parts = parts(
            Request::get("/api/v1/courses/1/conferences?per_page=5&access_token=query")
                .header("cookie", "__Host_access_token=cookie")
                .body(())
                .unwrap(),
        );
        assert_eq!(
            access_token(&parts),
            Some(("query".to_owned(), TokenSource::QueryParameter))
        );
    }

    #[test]
    fn cookie_among_others() {
        let parts = parts(
            Request::get("/api/v1/groups/1/conferences?access_token=")
                .header("cookie", "theme=dark; __Host_access_token=cookie")
                .body(())
                .unwrap(),
        );
        assert_eq!(
            access_token(&parts),
            Some(("cookie".to_owned(), TokenSource::Cookie))
        );
    }
}
