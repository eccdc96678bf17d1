use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Characters of body text shown in history listings.
pub const PREVIEW_CHARS: usize = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentType {
    #[default]
    BlogPost,
    LinkedinPost,
}

impl ContentType {
    /// Lenient parse: anything that is not a LinkedIn post is treated as a blog post.
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "linkedin-post" => ContentType::LinkedinPost,
            _ => ContentType::BlogPost,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::BlogPost => "blog-post",
            ContentType::LinkedinPost => "linkedin-post",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl ContentLength {
    /// Lenient parse: unknown lengths fall back to medium.
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "short" => ContentLength::Short,
            "long" => ContentLength::Long,
            _ => ContentLength::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentLength::Short => "short",
            ContentLength::Medium => "medium",
            ContentLength::Long => "long",
        }
    }
}

/// A stored piece of generated (and possibly user-edited) marketing content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: Uuid,
    pub user_id: String,
    pub topic: String,
    pub content_type: String,
    pub length: String,
    pub body: String,
    pub keywords: Option<String>,
    pub custom_context: Option<String>,
    pub reference_url: Option<String>,
    pub outline: Option<String>,
    pub word_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The user-editable fields of a content item, as sent on save and update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentDraft {
    pub topic: String,
    pub content_type: Option<String>,
    pub length: Option<String>,
    pub body: String,
    pub keywords: Option<String>,
    pub custom_context: Option<String>,
    pub reference_url: Option<String>,
    pub outline: Option<String>,
}

impl ContentDraft {
    pub fn validate(&self) -> Result<(), String> {
        if self.topic.trim().is_empty() {
            return Err("topic is required".to_string());
        }
        if self.body.trim().is_empty() {
            return Err("body is required".to_string());
        }
        Ok(())
    }

    fn content_type(&self) -> ContentType {
        ContentType::from_name(self.content_type.as_deref().unwrap_or_default())
    }

    fn length(&self) -> ContentLength {
        ContentLength::from_name(self.length.as_deref().unwrap_or_default())
    }
}

impl ContentItem {
    pub fn new(user_id: &str, draft: ContentDraft, word_count: i32) -> Self {
        let now = Utc::now();
        let content_type = draft.content_type().as_str().to_string();
        let length = draft.length().as_str().to_string();
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            topic: draft.topic,
            content_type,
            length,
            body: draft.body,
            keywords: draft.keywords,
            custom_context: draft.custom_context,
            reference_url: draft.reference_url,
            outline: draft.outline,
            word_count,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the editable fields, keeping id, owner and creation time.
    pub fn apply(&mut self, draft: ContentDraft, word_count: i32) {
        self.content_type = draft.content_type().as_str().to_string();
        self.length = draft.length().as_str().to_string();
        self.topic = draft.topic;
        self.body = draft.body;
        self.keywords = draft.keywords;
        self.custom_context = draft.custom_context;
        self.reference_url = draft.reference_url;
        self.outline = draft.outline;
        self.word_count = word_count;
        self.updated_at = Utc::now();
    }
}

/// History listing entry: everything but the full body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSummary {
    pub id: Uuid,
    pub title: String,
    pub content_type: String,
    pub length: String,
    pub word_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub preview: String,
}

impl From<&ContentItem> for ContentSummary {
    fn from(item: &ContentItem) -> Self {
        Self {
            id: item.id,
            title: item.topic.clone(),
            content_type: item.content_type.clone(),
            length: item.length.clone(),
            word_count: item.word_count,
            created_at: item.created_at,
            updated_at: item.updated_at,
            preview: preview(&item.body, PREVIEW_CHARS),
        }
    }
}

/// First `max_chars` characters, with "..." appended when text was cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
