// Shared prompt constants and prompt-building utilities.
// Each generation path defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// Instruction appended to every prompt that expects a JSON object back.
pub const JSON_ONLY_INSTRUCTION: &str =
    "Return ONLY the JSON object without any markdown formatting or additional text.";

/// Placeholder for optional profile fields left blank.
pub const NOT_SPECIFIED: &str = "Not specified";

/// Placeholder for optional free-text fields left blank.
pub const NONE_PROVIDED: &str = "None provided";

/// Returns the trimmed value, or `fallback` when the value is missing or blank.
pub fn or_placeholder<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback)
}

/// Joins non-blank items with ", ", or returns `fallback` when none remain.
pub fn join_or_placeholder(items: &[String], fallback: &str) -> String {
    let joined = items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    if joined.is_empty() {
        fallback.to_string()
    } else {
        joined
    }
}
