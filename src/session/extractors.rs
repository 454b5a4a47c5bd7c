use std::convert::Infallible;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};

use super::token::{SessionToken, SESSION_COOKIE};
use crate::error::ApiError;

/// Session token required for the request; rejects with 401 when absent.
pub struct OwnerToken(pub SessionToken);

/// Session token if the client presented a well-formed one.
pub struct PresentedToken(pub Option<SessionToken>);

#[async_trait]
impl<S> FromRequestParts<S> for OwnerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        token_from_headers(&parts.headers)
            .map(OwnerToken)
            .ok_or(ApiError::Unauthorized)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for PresentedToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(PresentedToken(token_from_headers(&parts.headers)))
    }
}

/// Finds the session cookie among all `Cookie` headers. Malformed values count as absent.
pub fn token_from_headers(headers: &HeaderMap) -> Option<SessionToken> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| SessionToken::parse(value.trim_matches('"')))
}
