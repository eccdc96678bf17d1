//! Response Normalizer — turns raw completion text into either a parsed structure
//! or cleaned prose/HTML.
//!
//! No repair is attempted on malformed JSON: a parse failure is reported as such,
//! with both the raw and the cleaned text logged for diagnosis.

use std::sync::OnceLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::error;

const FENCE: &str = "```";

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("Completion is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Strips a wrapping markdown code fence (with or without a language tag) and
/// surrounding whitespace. Idempotent: stripped text comes back unchanged.
pub fn strip_code_fences(text: &str) -> &str {
    let mut text = text.trim();

    if let Some(rest) = text.strip_prefix(FENCE) {
        text = match rest.split_once('\n') {
            Some((tag, body)) if is_language_tag(tag) => body,
            None if is_language_tag(rest) => "",
            _ => strip_inline_tag(rest),
        }
        .trim_start();
    }

    if let Some(rest) = text.strip_suffix(FENCE) {
        text = rest;
    }

    text.trim()
}

fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+')
}

fn is_language_tag(s: &str) -> bool {
    s.trim_end().chars().all(is_tag_char)
}

/// Handles a tag sharing its line with the content (```` ```json {...}``` ````).
/// The tag is only dropped when a JSON or HTML opener follows it.
fn strip_inline_tag(rest: &str) -> &str {
    let body = rest.trim_start_matches(is_tag_char);
    let opens_content = body
        .trim_start()
        .starts_with(|c: char| matches!(c, '{' | '[' | '<'));
    if body.len() < rest.len() && opens_content {
        body
    } else {
        rest
    }
}

fn body_pattern() -> &'static Regex {
    static BODY: OnceLock<Regex> = OnceLock::new();
    BODY.get_or_init(|| {
        Regex::new(r"(?is)<body[^>]*>(.*?)</body>").expect("body pattern is a valid regex")
    })
}

fn is_html_document(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    lower.contains("<!doctype html") || lower.contains("<html")
}

/// Cleans an HTML content completion: fences are stripped, and a full HTML
/// document is reduced to the inner content of its `<body>`.
pub fn clean_html_content(text: &str) -> String {
    let stripped = strip_code_fences(text);

    if is_html_document(stripped) {
        if let Some(body) = body_pattern()
            .captures(stripped)
            .and_then(|caps| caps.get(1))
        {
            return body.as_str().trim().to_string();
        }
    }

    stripped.to_string()
}

/// Strips fences and deserializes the completion as `T`.
pub fn parse_json<T: DeserializeOwned>(raw: &str) -> Result<T, NormalizeError> {
    let cleaned = strip_code_fences(raw);
    serde_json::from_str(cleaned).map_err(|e| {
        error!("Failed to parse JSON completion: {e}");
        error!("Raw text: {raw}");
        error!("Cleaned text: {cleaned}");
        NormalizeError::Json(e)
    })
}
