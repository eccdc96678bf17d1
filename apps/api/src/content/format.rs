use std::sync::OnceLock;

use regex::Regex;

fn tag_pattern() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag pattern is a valid regex"))
}

/// Wraps each blank-line separated paragraph of a LinkedIn post in `<p>`.
pub fn wrap_linkedin_paragraphs(text: &str) -> String {
    text.trim()
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| format!("<p>{p}</p>"))
        .collect()
}

/// Whitespace-separated words in the tag-stripped text.
pub fn count_words(html: &str) -> usize {
    tag_pattern().replace_all(html, " ").split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_linkedin_paragraphs() {
        let post = "  Big news today.\n\nWe shipped it.\nFinally.\n\n\n\nThoughts?  ";
        assert_eq!(
            wrap_linkedin_paragraphs(post),
            "<p>Big news today.</p><p>We shipped it.\nFinally.</p><p>Thoughts?</p>"
        );
    }

    #[test]
    fn test_count_words_ignores_tags() {
        assert_eq!(count_words("<h1>Widget care</h1><p>Keep them <b>dry.</b></p>"), 5);
        assert_eq!(count_words("<p>one</p><p>two</p>"), 2);
        assert_eq!(count_words("   "), 0);
    }
}
