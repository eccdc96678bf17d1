//! Static placeholder content returned when live generation fails.

const TOPIC_TOKEN: &str = "[TOPIC]";

const BLOG_POST_TEMPLATE: &str = "# [TOPIC]

## Introduction
Welcome to our blog post about [TOPIC]. In this article, we'll explore key aspects and provide valuable insights.

## Main Points
### First Key Point
This is where we would discuss the first important aspect of [TOPIC].

### Second Key Point
Here we would explore another critical dimension of [TOPIC].

### Third Key Point
Finally, we would cover this essential element of [TOPIC].

## Conclusion
Thank you for reading our thoughts on [TOPIC]. We hope you found this information helpful.
";

const LINKEDIN_POST_TEMPLATE: &str = "I'm excited to share some thoughts on [TOPIC].

This is an important topic for professionals in our industry because it impacts how we approach our work and deliver value to clients.

At our company, we believe in the importance of [TOPIC] and have seen firsthand how it creates positive outcomes.

What are your thoughts on [TOPIC]? I'd love to hear your experiences in the comments.
";

/// Template for `content_type` with every topic token replaced. Unknown types
/// get the blog post template. Never fails.
pub fn fallback_content(content_type: &str, topic: &str) -> String {
    let template = match content_type.trim() {
        "linkedin-post" => LINKEDIN_POST_TEMPLATE,
        _ => BLOG_POST_TEMPLATE,
    };
    template.replace(TOPIC_TOKEN, topic)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_type_gets_blog_template() {
        let content = fallback_content("press-release", "Widgets");
        assert_eq!(content, BLOG_POST_TEMPLATE.replace(TOPIC_TOKEN, "Widgets"));
        assert!(content.starts_with("# Widgets\n"));
    }

    #[test]
    fn test_every_token_is_substituted() {
        let content = fallback_content("linkedin-post", "remote work");
        assert!(!content.contains(TOPIC_TOKEN));
        assert_eq!(content.matches("remote work").count(), 3);
    }
}
