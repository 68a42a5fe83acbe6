use crate::{
    services::Session,
    utils::{
        cookie::{extract_cookie, SESSION_COOKIE},
        decode_session_token,
    },
};
use axum::extract::FromRequestParts;
use std::convert::Infallible;

/// Reads the signed session cookie. A missing, expired or tampered token yields an
/// anonymous session, never a rejection.
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = extract_cookie(&parts.headers, SESSION_COOKIE) else {
            return Ok(Session::anonymous());
        };

        match decode_session_token(&token) {
            Ok(user_id) => Ok(Session::for_user(user_id)),
            Err(e) => {
                tracing::debug!("Ignoring unusable session cookie: {e}");
                Ok(Session::anonymous())
            }
        }
    }
}
