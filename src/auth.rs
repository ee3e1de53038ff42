use axum::http::{HeaderMap, header};
use sha2::{Digest, Sha256};

use crate::error::ApiError;

/// Pull the caller credential from `X-API-Key`, falling back to a bearer token.
pub fn extract_credential(headers: &HeaderMap) -> Option<&str> {
    let api_key = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty());
    if api_key.is_some() {
        return api_key;
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.strip_prefix("Bearer ").unwrap_or(v))
        .filter(|v| !v.is_empty())
}

/// Check the caller against the configured secret.
///
/// Digests are compared so the comparison time does not depend on how much
/// of the secret the caller got right.
pub fn authorize(expected: Option<&str>, headers: &HeaderMap) -> Result<(), ApiError> {
    let expected = expected
        .filter(|s| !s.is_empty())
        .ok_or(ApiError::Configuration)?;
    let supplied = extract_credential(headers).ok_or(ApiError::MissingCredential)?;

    if Sha256::digest(supplied.as_bytes()) == Sha256::digest(expected.as_bytes()) {
        Ok(())
    } else {
        Err(ApiError::InvalidCredential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(*k, HeaderValue::from_static(v));
        }
        map
    }

    #[test]
    fn test_missing_secret_wins_over_caller_input() {
        let h = headers(&[("x-api-key", "anything")]);
        assert!(matches!(authorize(None, &h), Err(ApiError::Configuration)));
        assert!(matches!(authorize(Some(""), &h), Err(ApiError::Configuration)));
    }

    #[test]
    fn test_missing_and_wrong_credential_differ() {
        assert!(matches!(
            authorize(Some("secret"), &HeaderMap::new()),
            Err(ApiError::MissingCredential)
        ));
        let h = headers(&[("x-api-key", "nope")]);
        assert!(matches!(
            authorize(Some("secret"), &h),
            Err(ApiError::InvalidCredential)
        ));
    }

    #[test]
    fn test_bearer_fallback() {
        let h = headers(&[("authorization", "Bearer secret")]);
        assert_eq!(extract_credential(&h), Some("secret"));
        assert!(authorize(Some("secret"), &h).is_ok());
    }

    #[test]
    fn test_api_key_header_takes_precedence() {
        let h = headers(&[("x-api-key", "secret"), ("authorization", "Bearer other")]);
        assert_eq!(extract_credential(&h), Some("secret"));
    }

    #[test]
    fn test_empty_api_key_falls_back_to_bearer() {
        let h = headers(&[("x-api-key", ""), ("authorization", "Bearer secret")]);
        assert_eq!(extract_credential(&h), Some("secret"));
    }

    #[test]
    fn test_comparison_is_exact() {
        let h = headers(&[("x-api-key", "Secret")]);
        assert!(authorize(Some("secret"), &h).is_err());
        let h = headers(&[("x-api-key", "secret ")]);
        assert!(authorize(Some("secret"), &h).is_err());
    }
}
