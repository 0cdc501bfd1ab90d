use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use service_core::error::AppError;

pub const USER_ID_HEADER: &str = "x-userid";

/// Caller identity taken from the `x-userid` header.
///
/// The value is opaque and only checked for presence. Header names are
/// case-insensitive, so `X-UserId` and `X-USERID` match too. Values need not
/// be visible ASCII; non-UTF-8 bytes are replaced with U+FFFD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId(pub String);

impl UserId {
    pub fn from_headers(headers: &axum::http::HeaderMap) -> Result<Self, AppError> {
        headers
            .get(USER_ID_HEADER)
            .map(|v| v.as_bytes().trim_ascii())
            .filter(|v| !v.is_empty())
            .map(|v| UserId(String::from_utf8_lossy(v).into_owned()))
            .ok_or_else(|| AppError::MissingIdentity("Missing x-userid header".to_string()))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers)
    }
}
