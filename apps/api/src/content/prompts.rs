// Content prompt builders and the word-length table.

use serde::Deserialize;

use crate::models::brand_voice::BrandVoice;
use crate::models::content::{ContentLength, ContentType};
use crate::models::profile::BusinessProfile;

/// Roughly 1.3 tokens per English word.
pub const WORD_TO_TOKEN_RATIO: f64 = 1.3;
/// Floor on the output token budget for content generation.
pub const MIN_CONTENT_MAX_TOKENS: u32 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthSetting {
    pub min_words: u32,
    pub max_words: u32,
    pub target_words: u32,
}

impl LengthSetting {
    const fn new(min_words: u32, max_words: u32, target_words: u32) -> Self {
        Self {
            min_words,
            max_words,
            target_words,
        }
    }

    /// Approximate tokens needed for the target word count.
    pub fn target_tokens(&self) -> u32 {
        (f64::from(self.target_words) * WORD_TO_TOKEN_RATIO).round() as u32
    }

    /// Output budget: 1.5x the target tokens, never below the floor.
    pub fn max_tokens(&self) -> u32 {
        let buffered = (f64::from(self.target_tokens()) * 1.5).round() as u32;
        buffered.max(MIN_CONTENT_MAX_TOKENS)
    }
}

pub fn length_setting(content_type: ContentType, length: ContentLength) -> LengthSetting {
    match (content_type, length) {
        (ContentType::BlogPost, ContentLength::Short) => LengthSetting::new(300, 400, 350),
        (ContentType::BlogPost, ContentLength::Medium) => LengthSetting::new(400, 500, 450),
        (ContentType::BlogPost, ContentLength::Long) => LengthSetting::new(500, 600, 550),
        (ContentType::LinkedinPost, ContentLength::Short) => LengthSetting::new(80, 120, 100),
        (ContentType::LinkedinPost, ContentLength::Medium) => LengthSetting::new(150, 250, 200),
        (ContentType::LinkedinPost, ContentLength::Long) => LengthSetting::new(250, 350, 300),
    }
}

/// What the user asked for on the content generation form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentBrief {
    pub topic: String,
    pub content_type: Option<String>,
    pub length: Option<String>,
    pub keywords: Option<String>,
    pub custom_context: Option<String>,
    pub reference_url: Option<String>,
    pub outline: Option<String>,
    /// Caller-supplied base prompt; replaces the built-in blog/LinkedIn prompt.
    pub prompt: Option<String>,
}

impl ContentBrief {
    pub fn content_type(&self) -> ContentType {
        ContentType::from_name(self.content_type.as_deref().unwrap_or_default())
    }

    pub fn length(&self) -> ContentLength {
        ContentLength::from_name(self.length.as_deref().unwrap_or_default())
    }

    pub fn length_setting(&self) -> LengthSetting {
        length_setting(self.content_type(), self.length())
    }

    /// Topic for fallback templates; blank topics read as "this topic".
    pub fn topic_or_default(&self) -> &str {
        let topic = self.topic.trim();
        if topic.is_empty() {
            "this topic"
        } else {
            topic
        }
    }
}

fn filled(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Optional brief lines shared by both prompt styles, one per supplied field.
fn brief_lines(brief: &ContentBrief, context_label: &str) -> String {
    let mut lines = Vec::new();
    if let Some(outline) = filled(brief.outline.as_deref()) {
        lines.push(format!("Key points to include:\n{outline}"));
    }
    if let Some(keywords) = filled(brief.keywords.as_deref()) {
        lines.push(format!("Include these keywords naturally: {keywords}"));
    }
    if let Some(context) = filled(brief.custom_context.as_deref()) {
        lines.push(format!("{context_label}: {context}"));
    }
    if let Some(url) = filled(brief.reference_url.as_deref()) {
        lines.push(format!("Reference URL for additional context: {url}"));
    }
    lines.join("\n")
}

pub fn build_blog_prompt(brief: &ContentBrief) -> String {
    format!(
        r#"Create a {length} blog post about "{topic}".
{details}

Important formatting instructions:
1. Return ONLY the HTML content for the blog post - do not include <!DOCTYPE>, <html>, <head>, or <body> tags
2. Use semantic HTML tags for structure (<h1>, <h2>, <p>, <ul>, <ol>, etc.)
3. Keep paragraphs concise (3-4 sentences max)
4. Use bullet points or numbered lists where appropriate
5. Include subheadings to break up content
6. Do not include any CSS or styling in the HTML
7. Make the content engaging and visually appealing
8. Do not wrap the response in code blocks or markdown formatting"#,
        length = brief.length().as_str(),
        topic = brief.topic.trim(),
        details = brief_lines(brief, "Additional context"),
    )
}

pub fn build_linkedin_prompt(brief: &ContentBrief) -> String {
    format!(
        r#"Create a {length} LinkedIn post about "{topic}".
{details}

IMPORTANT LINKEDIN POST GUIDELINES:
1. Keep the post professional and engaging
2. Focus on clarity and readability
3. DO NOT include hashtags
4. Include a brief call-to-action at the end
5. Maintain a professional tone suitable for LinkedIn
6. Keep the post to approximately {target} words

LINKEDIN-SPECIFIC FORMATTING INSTRUCTIONS:
1. Use very short paragraphs (1-3 sentences maximum)
2. Include double line breaks between paragraphs
3. Add 1-2 relevant emojis strategically (beginning of paragraphs or to highlight key points)
4. Include occasional single-sentence paragraphs for emphasis
5. Start with a strong, attention-grabbing first line
6. End with a clear call-to-action or thought-provoking question"#,
        length = brief.length().as_str(),
        topic = brief.topic.trim(),
        details = brief_lines(brief, "Professional Context"),
        target = brief.length_setting().target_words,
    )
}

/// Business facts and the stored brand voice, rendered for the content prompt.
/// Returns `None` when there is nothing to add.
pub fn build_voice_context(
    profile: Option<&BusinessProfile>,
    voice: Option<&BrandVoice>,
) -> Option<String> {
    let mut sections = Vec::new();

    if let Some(profile) = profile {
        sections.push(format!(
            "BUSINESS CONTEXT:\n- Business: {}\n- Description: {}\n- Target Audience: {}\n- Core Values: {}",
            profile.business_name.trim(),
            profile.business_description.trim(),
            profile.demographics_text(),
            profile.values_text(),
        ));
    }

    if let Some(voice) = voice {
        let mut block = format!(
            "BRAND VOICE (write in this voice):\n{}",
            voice.executive_summary.trim()
        );
        for pillar in &voice.pillars {
            block.push_str(&format!(
                "\n- {}: means {}; doesn't mean {}",
                pillar.title.trim(),
                pillar.means.join("; "),
                pillar.doesnt_mean.join("; "),
            ));
        }
        sections.push(block);
    }

    if sections.is_empty() {
        None
    } else {
        Some(sections.join("\n\n"))
    }
}

/// Appends the explicit word-count requirements to a base prompt.
pub fn with_length_requirements(prompt: &str, setting: LengthSetting) -> String {
    format!(
        r#"{prompt}

IMPORTANT LENGTH REQUIREMENTS:
- This content should be {min}-{max} words in length
- Target word count: {target} words
- Please count your words carefully to ensure the content meets these requirements
- The content should be substantial enough to cover the topic thoroughly within these word count constraints
"#,
        prompt = prompt.trim_end(),
        min = setting.min_words,
        max = setting.max_words,
        target = setting.target_words,
    )
}

/// Full content prompt: base prompt, optional voice context, length requirements.
pub fn build_content_prompt(brief: &ContentBrief, voice_context: Option<&str>) -> String {
    let mut prompt = match filled(brief.prompt.as_deref()) {
        Some(custom) => custom.to_string(),
        None => match brief.content_type() {
            ContentType::BlogPost => build_blog_prompt(brief),
            ContentType::LinkedinPost => build_linkedin_prompt(brief),
        },
    };

    if let Some(context) = voice_context {
        prompt.push_str("\n\n");
        prompt.push_str(context);
    }

    with_length_requirements(&prompt, brief.length_setting())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::brand_voice::fixtures::voice;
    use crate::models::profile::fixtures::acme;

    fn brief(content_type: &str, length: &str) -> ContentBrief {
        ContentBrief {
            topic: "Widget care".to_string(),
            content_type: Some(content_type.to_string()),
            length: Some(length.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_length_table() {
        assert_eq!(
            brief("blog-post", "short").length_setting(),
            LengthSetting::new(300, 400, 350)
        );
        assert_eq!(
            brief("linkedin-post", "long").length_setting(),
            LengthSetting::new(250, 350, 300)
        );
        assert_eq!(
            brief("linkedin-post", "huge").length_setting(),
            LengthSetting::new(150, 250, 200)
        );
    }

    #[test]
    fn test_token_budget() {
        let medium = LengthSetting::new(400, 500, 450);
        assert_eq!(medium.target_tokens(), 585);
        assert_eq!(medium.max_tokens(), 2000);

        let huge = LengthSetting::new(2000, 2400, 2200);
        assert_eq!(huge.target_tokens(), 2860);
        assert_eq!(huge.max_tokens(), 4290);
    }

    #[test]
    fn test_blog_prompt_forbids_document_wrapper() {
        let prompt = build_content_prompt(&brief("blog-post", "medium"), None);
        assert!(prompt.starts_with("Create a medium blog post about \"Widget care\"."));
        assert!(prompt.contains("do not include <!DOCTYPE>"));
        assert!(prompt.contains("This content should be 400-500 words in length"));
        assert!(prompt.contains("Target word count: 450 words"));
    }

    #[test]
    fn test_linkedin_prompt_rules() {
        let prompt = build_content_prompt(&brief("linkedin-post", "short"), None);
        assert!(prompt.contains("DO NOT include hashtags"));
        assert!(prompt.contains("call-to-action"));
        assert!(prompt.contains("approximately 100 words"));
        assert!(prompt.contains("80-120 words"));
    }

    #[test]
    fn test_optional_fields_only_when_present() {
        let bare = build_blog_prompt(&brief("blog-post", "short"));
        assert!(!bare.contains("Include these keywords"));

        let rich = build_linkedin_prompt(&ContentBrief {
            keywords: Some("durability".to_string()),
            custom_context: Some("B2B buyers".to_string()),
            outline: Some("- oiling\n- storage".to_string()),
            ..brief("linkedin-post", "medium")
        });
        assert!(rich.contains("Include these keywords naturally: durability"));
        assert!(rich.contains("Professional Context: B2B buyers"));
        assert!(rich.contains("Key points to include:\n- oiling\n- storage"));
    }

    #[test]
    fn test_voice_context_block() {
        let profile = acme();
        let voice = voice();
        let context = build_voice_context(Some(&profile), Some(&voice)).unwrap();
        assert!(context.contains("- Business: Acme"));
        assert!(context.contains("- Core Values: Trust, Speed"));
        assert!(context.contains("- Candid: means"));

        let prompt = build_content_prompt(&brief("blog-post", "long"), Some(&context));
        assert!(prompt.contains("BRAND VOICE (write in this voice)"));
        assert!(prompt.trim_end().ends_with("within these word count constraints"));

        assert!(build_voice_context(None, None).is_none());
    }

    #[test]
    fn test_custom_prompt_replaces_builtin() {
        let custom = ContentBrief {
            prompt: Some("Write about widgets.".to_string()),
            ..brief("blog-post", "short")
        };
        let prompt = build_content_prompt(&custom, None);
        assert!(prompt.starts_with("Write about widgets.\n\nIMPORTANT LENGTH REQUIREMENTS:"));
    }
}
