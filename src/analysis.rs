use crate::error::UpstreamError;
use crate::models::ExternalAnalysis;

/// Parse the model's raw reply into an analysis.
///
/// An empty reply means nothing was found. Models sometimes wrap JSON in a
/// Markdown fence, so one surrounding fence is stripped before parsing.
pub fn parse_analysis(raw: &str) -> Result<ExternalAnalysis, UpstreamError> {
    let trimmed = strip_code_fence(raw.trim());
    if trimmed.is_empty() {
        return Ok(ExternalAnalysis::default());
    }

    let value: serde_json::Value =
        serde_json::from_str(trimmed).map_err(|e| UpstreamError::Malformed(e.to_string()))?;
    if !value.is_object() {
        return Err(UpstreamError::Malformed("expected a JSON object".to_string()));
    }
    let parsed: ExternalAnalysis =
        serde_json::from_value(value).map_err(|e| UpstreamError::Malformed(e.to_string()))?;

    Ok(ExternalAnalysis {
        what: non_empty(parsed.what),
        whom: non_empty(parsed.whom),
        r#where: non_empty(parsed.r#where),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let Some(inner) = rest.strip_suffix("```") else {
        return text;
    };
    // drop the info string, e.g. ```json
    let inner = match inner.find('\n') {
        Some(idx) if !inner[..idx].contains('{') => &inner[idx + 1..],
        _ => inner,
    };
    inner.trim()
}
