use crate::models::{ExternalAnalysis, ValidationResult};

pub const WHAT_SUGGESTION: &str = "Please specify WHAT services or products your business provides (e.g., \"web development\", \"plumbing services\", \"consulting\")";
pub const WHOM_SUGGESTION: &str = "Please specify WHO your target customers are (e.g., \"small businesses\", \"homeowners\", \"tech startups\")";
pub const WHERE_SUGGESTION: &str = "Please specify WHERE you operate (e.g., \"Austin, Texas\", \"nationwide\", \"San Francisco Bay Area\")";

fn is_present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.is_empty())
}

/// Percentage of the three fields present, rounded to the nearest integer.
pub fn completeness(has_what: bool, has_whom: bool, has_where: bool) -> u8 {
    let present = [has_what, has_whom, has_where].iter().filter(|p| **p).count();
    (present as f64 * 100.0 / 3.0).round() as u8
}

/// Turn an analysis into the public result.
pub fn score(analysis: ExternalAnalysis) -> ValidationResult {
    let has_what = is_present(&analysis.what);
    let has_whom = is_present(&analysis.whom);
    let has_where = is_present(&analysis.r#where);

    let mut missing = Vec::new();
    let mut suggestions = Vec::new();
    for (present, name, suggestion) in [
        (has_what, "what", WHAT_SUGGESTION),
        (has_whom, "whom", WHOM_SUGGESTION),
        (has_where, "where", WHERE_SUGGESTION),
    ] {
        if !present {
            missing.push(name.to_string());
            suggestions.push(suggestion.to_string());
        }
    }

    ValidationResult {
        score: completeness(has_what, has_whom, has_where),
        has_what,
        has_whom,
        has_where,
        missing,
        analysis: ExternalAnalysis {
            what: analysis.what.filter(|s| !s.is_empty()),
            whom: analysis.whom.filter(|s| !s.is_empty()),
            r#where: analysis.r#where.filter(|s| !s.is_empty()),
        },
        suggestions,
    }
}
