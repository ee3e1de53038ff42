use axum::body::{Body, Bytes};
use http_body_util::LengthLimitError;
use serde_json::Value;
use tracing::debug;

use crate::error::ValidationError;

pub const MAX_DESCRIPTION_CHARS: usize = 1000;
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Buffer the request body, refusing anything over `MAX_BODY_BYTES`.
///
/// Only called once the caller is authorized and counted, so an oversized
/// body is reported like any other over-long description.
pub async fn read_body(body: Body) -> Result<Bytes, ValidationError> {
    axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|err| {
            let cause = err.into_inner();
            if cause.is::<LengthLimitError>() {
                ValidationError::TooLong {
                    max: MAX_DESCRIPTION_CHARS,
                }
            } else {
                debug!(error = %cause, "Failed to read request body");
                ValidationError::Required
            }
        })
}

/// Pull `description` out of a JSON body and apply the input rules.
///
/// Length is checked on the raw text; emptiness on the trimmed text. The
/// returned string is untrimmed. Length counts Unicode scalar values, so
/// characters outside the Basic Multilingual Plane (most emoji) count once
/// each rather than as two UTF-16 units.
pub fn validate_description(body: &[u8]) -> Result<String, ValidationError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| ValidationError::Required)?;

    let description = match value.get("description") {
        Some(Value::String(s)) if !s.is_empty() => s,
        _ => return Err(ValidationError::Required),
    };

    if description.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(ValidationError::TooLong {
            max: MAX_DESCRIPTION_CHARS,
        });
    }

    if description.trim().is_empty() {
        return Err(ValidationError::Empty);
    }

    Ok(description.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(body: Value) -> Result<String, ValidationError> {
        validate_description(body.to_string().as_bytes())
    }

    #[tokio::test]
    async fn test_read_body_within_limit() {
        let bytes = read_body(Body::from("{\"description\":\"x\"}")).await.unwrap();
        assert_eq!(&bytes[..], b"{\"description\":\"x\"}");
    }

    #[tokio::test]
    async fn test_oversized_body_is_too_long() {
        let huge = "a".repeat(MAX_BODY_BYTES + 1);
        assert_eq!(
            read_body(Body::from(huge)).await,
            Err(ValidationError::TooLong { max: 1000 })
        );
    }

    #[test]
    fn test_missing_or_wrong_type_is_required() {
        assert_eq!(check(json!({})), Err(ValidationError::Required));
        assert_eq!(check(json!({"description": 42})), Err(ValidationError::Required));
        assert_eq!(check(json!({"description": null})), Err(ValidationError::Required));
        assert_eq!(check(json!({"description": ""})), Err(ValidationError::Required));
        assert_eq!(check(json!(["description"])), Err(ValidationError::Required));
    }

    #[test]
    fn test_non_json_body_is_required() {
        assert_eq!(validate_description(b"not json"), Err(ValidationError::Required));
        assert_eq!(validate_description(b""), Err(ValidationError::Required));
    }

    #[test]
    fn test_length_boundary() {
        let at_limit = "a".repeat(1000);
        assert_eq!(check(json!({ "description": at_limit })), Ok(at_limit.clone()));

        let over = "a".repeat(1001);
        assert_eq!(
            check(json!({ "description": over })),
            Err(ValidationError::TooLong { max: 1000 })
        );
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let accented = "é".repeat(1000);
        assert!(check(json!({ "description": accented })).is_ok());
    }

    #[test]
    fn test_length_uses_untrimmed_text() {
        let padded = format!("{}{}", " ".repeat(995), "plumb!");
        assert_eq!(
            check(json!({ "description": padded })),
            Err(ValidationError::TooLong { max: 1000 })
        );
    }

    #[test]
    fn test_whitespace_only_is_empty() {
        assert_eq!(check(json!({"description": "   "})), Err(ValidationError::Empty));
        assert_eq!(check(json!({"description": "\n\t"})), Err(ValidationError::Empty));
    }

    #[test]
    fn test_returns_raw_text() {
        assert_eq!(
            check(json!({"description": "  I fix roofs  "})),
            Ok("  I fix roofs  ".to_string())
        );
    }
}
