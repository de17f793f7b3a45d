//! Shared-secret gate for control routes

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::{AppError, AppState};

const API_KEY_HEADER: &str = "x-api-key";

/// Proof that the request carried the protect key.
///
/// Take it as a handler argument ahead of the body extractor so that an
/// unauthorised request is rejected before anything is parsed or mutated.
#[derive(Debug, Clone, Copy)]
pub struct ControlAccess;

/// Check the supplied credential against the configured key
pub fn authorize(headers: &HeaderMap, expected: Option<&str>) -> Result<ControlAccess, AppError> {
    let expected = expected.ok_or(AppError::ProtectKeyNotConfigured)?;
    let supplied = extract_api_key(headers).ok_or(AppError::InvalidApiKey)?;

    if !constant_time_compare(&supplied, expected) {
        tracing::warn!("Rejected control request with invalid API key");
        return Err(AppError::InvalidApiKey);
    }

    Ok(ControlAccess)
}

/// Credential from `x-api-key`, falling back to `Authorization: Bearer`
fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    if let Some(key) = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()) {
        return Some(key.to_string());
    }

    let auth_header = headers.get(AUTHORIZATION)?.to_str().ok()?;
    auth_header.strip_prefix("Bearer ").map(str::to_string)
}

/// Constant-time string comparison
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[axum::async_trait]
impl FromRequestParts<AppState> for ControlAccess {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        authorize(&parts.headers, state.config.protect_api_key.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(*value));
        }
        map
    }

    #[test]
    fn test_accepts_api_key_header() {
        let h = headers(&[("x-api-key", "secret")]);
        assert!(authorize(&h, Some("secret")).is_ok());
    }

    #[test]
    fn test_accepts_bearer_token() {
        let h = headers(&[("authorization", "Bearer secret")]);
        assert!(authorize(&h, Some("secret")).is_ok());
    }

    #[test]
    fn test_api_key_header_takes_precedence() {
        let h = headers(&[("x-api-key", "wrong"), ("authorization", "Bearer secret")]);
        assert!(matches!(authorize(&h, Some("secret")), Err(AppError::InvalidApiKey)));
    }

    #[test]
    fn test_rejects_missing_or_wrong_key() {
        assert!(matches!(authorize(&HeaderMap::new(), Some("secret")), Err(AppError::InvalidApiKey)));
        let h = headers(&[("authorization", "Basic secret")]);
        assert!(matches!(authorize(&h, Some("secret")), Err(AppError::InvalidApiKey)));
        let h = headers(&[("x-api-key", "secret ")]);
        assert!(matches!(authorize(&h, Some("secret")), Err(AppError::InvalidApiKey)));
    }

    #[test]
    fn test_unconfigured_server_refuses() {
        let h = headers(&[("x-api-key", "anything")]);
        assert!(matches!(authorize(&h, None), Err(AppError::ProtectKeyNotConfigured)));
    }
}
