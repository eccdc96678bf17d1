//! Axum route handlers for content generation and the content library.

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::content::format::count_words;
use crate::content::generator::{content_request, generate_content};
use crate::content::prompts::{build_voice_context, ContentBrief};
use crate::errors::AppError;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::models::content::{ContentDraft, ContentItem, ContentSummary};
use crate::models::Envelope;
use crate::routes::UserIdQuery;
use crate::state::AppState;
use crate::store::DEFAULT_HISTORY_LIMIT;

const MAX_HISTORY_LIMIT: i64 = 100;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// When set, the user's stored profile and brand voice shape the prompt.
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(flatten)]
    pub brief: ContentBrief,
}

/// `success: false` still carries displayable `data` (the fallback template).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub data: String,
    pub word_count: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveContentRequest {
    pub user_id: String,
    #[serde(flatten)]
    pub draft: ContentDraft,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub user_id: String,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: i64,
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Business facts and brand voice for the prompt, when the user has stored them.
async fn load_voice_context(
    state: &AppState,
    user_id: Option<&str>,
) -> Result<Option<String>, AppError> {
    let Some(user_id) = user_id.map(str::trim).filter(|id| !id.is_empty()) else {
        return Ok(None);
    };
    let profile = state.store.get_profile(user_id).await?;
    let voice = state.store.get_brand_voice(user_id).await?;
    Ok(build_voice_context(profile.as_ref(), voice.as_ref()))
}

fn validate_brief(brief: &ContentBrief) -> Result<(), AppError> {
    if brief.topic.trim().is_empty() {
        return Err(AppError::Validation(
            "Please enter a topic for your content".to_string(),
        ));
    }
    Ok(())
}

fn word_count_of(body: &str) -> i32 {
    i32::try_from(count_words(body)).unwrap_or(i32::MAX)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/content/generate
pub async fn handle_generate(
    State(state): State<AppState>,
    AppJson(request): AppJson<GenerateContentRequest>,
) -> Result<Json<GenerateContentResponse>, AppError> {
    validate_brief(&request.brief)?;
    let context = load_voice_context(&state, request.user_id.as_deref()).await?;

    let generated = generate_content(state.llm.as_ref(), &request.brief, context.as_deref()).await;

    Ok(Json(GenerateContentResponse {
        success: generated.error.is_none(),
        error: generated.error,
        data: generated.body,
        word_count: generated.word_count,
    }))
}

/// POST /api/v1/content/stream
///
/// Same prompt as generate, streamed as plain text deltas. Failures before the
/// first byte are reported as JSON errors; the output is not cleaned.
pub async fn handle_stream(
    State(state): State<AppState>,
    AppJson(request): AppJson<GenerateContentRequest>,
) -> Result<Response, AppError> {
    validate_brief(&request.brief)?;
    let context = load_voice_context(&state, request.user_id.as_deref()).await?;

    let completion = content_request(&request.brief, context.as_deref());
    let deltas = state.llm.stream(&completion).await?;
    let body = Body::from_stream(deltas.map(|delta| delta.map(Bytes::from)));

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
        .into_response())
}

/// POST /api/v1/content
pub async fn handle_save(
    State(state): State<AppState>,
    AppJson(request): AppJson<SaveContentRequest>,
) -> Result<(StatusCode, Json<Envelope<ContentItem>>), AppError> {
    let user_id = request.user_id.trim();
    if user_id.is_empty() {
        return Err(AppError::Validation("userId is required".to_string()));
    }
    request.draft.validate().map_err(AppError::Validation)?;

    let word_count = word_count_of(&request.draft.body);
    let item = ContentItem::new(user_id, request.draft, word_count);
    state.store.insert_content(&item).await?;

    Ok((StatusCode::CREATED, Json(Envelope::ok(item))))
}

/// GET /api/v1/content/:id?userId=
pub async fn handle_get(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppQuery(params): AppQuery<UserIdQuery>,
) -> Result<Json<Envelope<ContentItem>>, AppError> {
    let user_id = params.user_id()?;
    let item = state
        .store
        .get_content(user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Content {id} not found")))?;
    Ok(Json(Envelope::ok(item)))
}

/// PUT /api/v1/content/:id?userId=
pub async fn handle_update(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppQuery(params): AppQuery<UserIdQuery>,
    AppJson(draft): AppJson<ContentDraft>,
) -> Result<Json<Envelope<ContentItem>>, AppError> {
    let user_id = params.user_id()?;
    draft.validate().map_err(AppError::Validation)?;

    let mut item = state
        .store
        .get_content(user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Content {id} not found")))?;

    let word_count = word_count_of(&draft.body);
    item.apply(draft, word_count);
    if !state.store.update_content(&item).await? {
        return Err(AppError::NotFound(format!("Content {id} not found")));
    }

    Ok(Json(Envelope::ok(item)))
}

/// GET /api/v1/content/history?userId=&limit=
///
/// Newest first. Summaries carry a short preview instead of the full body.
pub async fn handle_history(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<HistoryQuery>,
) -> Result<Json<Envelope<Vec<ContentSummary>>>, AppError> {
    let user_id = params.user_id.trim();
    if user_id.is_empty() {
        return Err(AppError::Validation("userId is required".to_string()));
    }
    let limit = params
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);

    let items = state.store.list_content(user_id, limit).await?;
    Ok(Json(Envelope::ok(
        items.iter().map(ContentSummary::from).collect(),
    )))
}

/// GET /api/v1/content/count?userId=
pub async fn handle_count(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<UserIdQuery>,
) -> Result<Json<Envelope<CountResponse>>, AppError> {
    let count = state.store.count_content(params.user_id()?).await?;
    Ok(Json(Envelope::ok(CountResponse { count })))
}
