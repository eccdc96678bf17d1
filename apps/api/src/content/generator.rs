//! Content generation. Unlike the brand voice paths this never fails outright:
//! a provider error yields the fallback template plus the user-facing message.

use tracing::{debug, info, warn};

use crate::content::fallback::fallback_content;
use crate::content::format::{count_words, wrap_linkedin_paragraphs};
use crate::content::prompts::{build_content_prompt, ContentBrief};
use crate::llm_client::normalize::clean_html_content;
use crate::llm_client::{CompletionProvider, CompletionRequest};
use crate::models::content::ContentType;

pub const CONTENT_MODEL: &str = "gpt-4o";

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedContent {
    pub body: String,
    pub word_count: usize,
    /// Set when `body` is the fallback template.
    pub error: Option<String>,
}

/// The request the content paths send, shared by the blocking and streaming handlers.
pub fn content_request(brief: &ContentBrief, voice_context: Option<&str>) -> CompletionRequest {
    let prompt = build_content_prompt(brief, voice_context);
    debug!("Content prompt:\n{prompt}");
    CompletionRequest::new(CONTENT_MODEL, prompt, brief.length_setting().max_tokens())
}

pub async fn generate_content(
    llm: &dyn CompletionProvider,
    brief: &ContentBrief,
    voice_context: Option<&str>,
) -> GeneratedContent {
    let request = content_request(brief, voice_context);
    let content_type = brief.content_type();

    match llm.complete(&request).await {
        Ok(raw) => {
            let body = match content_type {
                ContentType::LinkedinPost => wrap_linkedin_paragraphs(&raw),
                ContentType::BlogPost => clean_html_content(&raw),
            };
            let word_count = count_words(&body);
            info!(
                "Generated {} about '{}' ({word_count} words)",
                content_type.as_str(),
                brief.topic.trim()
            );
            GeneratedContent {
                body,
                word_count,
                error: None,
            }
        }
        Err(e) => {
            warn!("Content generation failed, serving fallback template: {e}");
            let requested_type = brief.content_type.as_deref().unwrap_or_default();
            let body = fallback_content(requested_type, brief.topic_or_default());
            GeneratedContent {
                word_count: count_words(&body),
                body,
                error: Some(e.user_message()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedProvider;
    use crate::llm_client::LlmError;

    fn brief(content_type: &str) -> ContentBrief {
        ContentBrief {
            topic: "Widget care".to_string(),
            content_type: Some(content_type.to_string()),
            length: Some("short".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_blog_output_is_cleaned_and_counted() {
        let llm = ScriptedProvider::replying(
            "```html\n<!DOCTYPE html><html><body><h1>Care</h1><p>Keep widgets dry.</p></body></html>\n```",
        );

        let content = generate_content(&llm, &brief("blog-post"), None).await;

        assert_eq!(content.body, "<h1>Care</h1><p>Keep widgets dry.</p>");
        assert_eq!(content.word_count, 4);
        assert!(content.error.is_none());
        let request = &llm.requests()[0];
        assert_eq!(request.model, "gpt-4o");
        assert_eq!(request.max_tokens, 2000);
    }

    #[tokio::test]
    async fn test_linkedin_output_is_wrapped() {
        let llm = ScriptedProvider::replying("Hello!\n\nBuy widgets.");
        let content = generate_content(&llm, &brief("linkedin-post"), None).await;
        assert_eq!(content.body, "<p>Hello!</p><p>Buy widgets.</p>");
        assert_eq!(content.word_count, 3);
    }

    #[tokio::test]
    async fn test_provider_failure_returns_fallback() {
        let llm = ScriptedProvider::new(vec![Err(LlmError::RateLimited("429".into()))]);

        let content = generate_content(&llm, &brief("linkedin-post"), None).await;

        assert!(content.body.starts_with("I'm excited to share some thoughts on Widget care."));
        assert!(content.error.unwrap().contains("high demand"));
        assert!(content.word_count > 0);
    }

    #[tokio::test]
    async fn test_unknown_type_falls_back_to_blog_template() {
        let llm = ScriptedProvider::new(vec![Err(LlmError::MissingApiKey)]);
        let brief = ContentBrief {
            topic: "  ".to_string(),
            content_type: Some("newsletter".to_string()),
            ..Default::default()
        };

        let content = generate_content(&llm, &brief, None).await;

        assert!(content.body.starts_with("# this topic\n"));
        assert!(content.error.unwrap().contains("API key"));
    }
}
