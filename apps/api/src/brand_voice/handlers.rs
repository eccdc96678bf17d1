//! Axum route handlers for the Brand Voice API.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::brand_voice::generator::{
    generate_brand_voice, generate_voice_guide, refine_pillar_statement, regenerate_pillar,
};
use crate::errors::AppError;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::llm_client::retry::RetryPolicy;
use crate::models::brand_voice::{BrandVoice, Pillar};
use crate::models::job::GenerationJob;
use crate::models::profile::BusinessProfile;
use crate::models::Envelope;
use crate::routes::UserIdQuery;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Body for voice generation and guide requests. An inline profile wins over
/// the stored one; at least one of the two must be present.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileRequest {
    pub user_id: Option<String>,
    pub profile: Option<BusinessProfile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegeneratePillarRequest {
    pub user_id: Option<String>,
    pub profile: Option<BusinessProfile>,
    /// Current pillars; defaults to the stored voice's pillars.
    pub pillars: Option<Vec<Pillar>>,
}

#[derive(Debug, Deserialize)]
pub struct RefineRequest {
    pub statement: String,
}

#[derive(Debug, Serialize)]
pub struct RefineResponse {
    pub refined: String,
}

#[derive(Debug, Serialize)]
pub struct GuideResponse {
    pub guide: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobCreatedResponse {
    pub job_id: Uuid,
    pub status: &'static str,
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn non_blank(user_id: Option<String>) -> Option<String> {
    user_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
}

/// Picks the inline profile or the user's stored one, then validates it.
/// Runs before any LLM call so invalid input never reaches the provider.
async fn resolve_profile(
    state: &AppState,
    user_id: Option<&str>,
    profile: Option<BusinessProfile>,
) -> Result<BusinessProfile, AppError> {
    let profile = match (profile, user_id) {
        (Some(profile), _) => profile,
        (None, Some(user_id)) => state.store.get_profile(user_id).await?.ok_or_else(|| {
            AppError::NotFound(format!("No business profile stored for user {user_id}"))
        })?,
        (None, None) => {
            return Err(AppError::Validation(
                "Either profile or userId is required".to_string(),
            ))
        }
    };

    profile.validate().map_err(AppError::Validation)?;
    Ok(profile)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/brand-voice
///
/// Generates a full brand voice. With a userId the profile used and the
/// resulting voice are both stored.
pub async fn handle_generate(
    State(state): State<AppState>,
    AppJson(request): AppJson<ProfileRequest>,
) -> Result<Json<Envelope<BrandVoice>>, AppError> {
    let user_id = non_blank(request.user_id);
    let inline = request.profile.is_some();
    let profile = resolve_profile(&state, user_id.as_deref(), request.profile).await?;

    let voice = generate_brand_voice(state.llm.as_ref(), &profile).await?;

    if let Some(user_id) = user_id.as_deref() {
        if inline {
            state.store.put_profile(user_id, &profile).await?;
        }
        state.store.put_brand_voice(user_id, &voice).await?;
    }

    Ok(Json(Envelope::ok(voice)))
}

/// GET /api/v1/brand-voice?userId=
pub async fn handle_get(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<UserIdQuery>,
) -> Result<Json<Envelope<BrandVoice>>, AppError> {
    let user_id = params.user_id()?;
    let voice = state
        .store
        .get_brand_voice(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No brand voice stored for user {user_id}")))?;
    Ok(Json(Envelope::ok(voice)))
}

/// PUT /api/v1/brand-voice?userId=
///
/// Saves a user-edited voice. Edits are held to the same shape rules as model output.
pub async fn handle_put(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<UserIdQuery>,
    AppJson(mut voice): AppJson<BrandVoice>,
) -> Result<Json<Envelope<BrandVoice>>, AppError> {
    let user_id = params.user_id()?;
    voice.assign_missing_ids();
    voice.validate().map_err(AppError::Validation)?;

    state.store.put_brand_voice(user_id, &voice).await?;
    Ok(Json(Envelope::ok(voice)))
}

/// POST /api/v1/brand-voice/pillars/:index/regenerate
///
/// Replaces one pillar (0-based index). The stored voice is updated in place
/// unless the caller regenerated against a different pillar set.
pub async fn handle_regenerate_pillar(
    State(state): State<AppState>,
    AppPath(index): AppPath<usize>,
    AppJson(request): AppJson<RegeneratePillarRequest>,
) -> Result<Json<Envelope<Pillar>>, AppError> {
    let user_id = non_blank(request.user_id);
    let profile = resolve_profile(&state, user_id.as_deref(), request.profile).await?;

    let stored = match user_id.as_deref() {
        Some(user_id) => state.store.get_brand_voice(user_id).await?,
        None => None,
    };
    let supplied = request.pillars.is_some();
    let existing = match (request.pillars, stored.as_ref()) {
        (Some(pillars), _) => pillars,
        (None, Some(voice)) => voice.pillars.clone(),
        (None, None) => {
            return Err(AppError::Validation(
                "pillars are required when no brand voice is stored".to_string(),
            ))
        }
    };

    let pillar = regenerate_pillar(state.llm.as_ref(), &profile, index, &existing).await?;

    // Caller-supplied pillars only write through when they are the stored set.
    if let (Some(user_id), Some(mut voice)) = (user_id.as_deref(), stored) {
        if !supplied || voice.pillars == existing {
            if let Some(slot) = voice.pillars.get_mut(index) {
                *slot = pillar.clone();
                state.store.put_brand_voice(user_id, &voice).await?;
            }
        }
    }

    Ok(Json(Envelope::ok(pillar)))
}

/// POST /api/v1/brand-voice/pillars/refine
pub async fn handle_refine(
    State(state): State<AppState>,
    AppJson(request): AppJson<RefineRequest>,
) -> Result<Json<Envelope<RefineResponse>>, AppError> {
    if request.statement.trim().is_empty() {
        return Err(AppError::Validation("statement cannot be empty".to_string()));
    }

    let refined = refine_pillar_statement(state.llm.as_ref(), &request.statement).await?;
    Ok(Json(Envelope::ok(RefineResponse { refined })))
}

/// POST /api/v1/brand-voice/guide
///
/// Markdown guide: overview, three voice elements, summary. Transient provider
/// failures are retried with backoff.
pub async fn handle_guide(
    State(state): State<AppState>,
    AppJson(request): AppJson<ProfileRequest>,
) -> Result<Json<Envelope<GuideResponse>>, AppError> {
    let user_id = non_blank(request.user_id);
    let profile = resolve_profile(&state, user_id.as_deref(), request.profile).await?;

    let guide = generate_voice_guide(state.llm.as_ref(), &profile, RetryPolicy::default()).await?;
    Ok(Json(Envelope::ok(GuideResponse { guide })))
}

/// POST /api/v1/brand-voice/jobs
///
/// Queues a generation and returns immediately; poll the job by id.
pub async fn handle_create_job(
    State(state): State<AppState>,
    AppJson(request): AppJson<ProfileRequest>,
) -> Result<(StatusCode, Json<Envelope<JobCreatedResponse>>), AppError> {
    let user_id = non_blank(request.user_id)
        .ok_or_else(|| AppError::Validation("userId is required".to_string()))?;
    let profile = resolve_profile(&state, Some(user_id.as_str()), request.profile).await?;

    let job = state.jobs.submit(&user_id, profile).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(Envelope::ok(JobCreatedResponse {
            job_id: job.id,
            status: job.status.as_str(),
        })),
    ))
}

/// GET /api/v1/brand-voice/jobs/:id?userId=
pub async fn handle_get_job(
    State(state): State<AppState>,
    AppPath(job_id): AppPath<Uuid>,
    AppQuery(params): AppQuery<UserIdQuery>,
) -> Result<Json<Envelope<GenerationJob>>, AppError> {
    let user_id = params.user_id()?;
    let job = state
        .store
        .get_job(job_id)
        .await?
        .filter(|job| job.user_id == user_id)
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;
    Ok(Json(Envelope::ok(job)))
}
