//! Business profile repository endpoints and onboarding status.

use axum::{
    extract::State,
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::extract::{AppJson, AppQuery};
use crate::models::profile::BusinessProfile;
use crate::models::Envelope;
use crate::routes::UserIdQuery;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ClearedResponse {
    pub cleared: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingStatus {
    pub onboarding_complete: bool,
    pub has_profile: bool,
    pub has_brand_voice: bool,
}

/// GET /api/v1/profile?userId=
pub async fn handle_get_profile(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<UserIdQuery>,
) -> Result<Json<Envelope<BusinessProfile>>, AppError> {
    let user_id = params.user_id()?;
    let profile = state
        .store
        .get_profile(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No business profile stored for user {user_id}")))?;
    Ok(Json(Envelope::ok(profile)))
}

/// PUT /api/v1/profile?userId=
pub async fn handle_put_profile(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<UserIdQuery>,
    AppJson(profile): AppJson<BusinessProfile>,
) -> Result<Json<Envelope<BusinessProfile>>, AppError> {
    let user_id = params.user_id()?;
    profile.validate().map_err(AppError::Validation)?;
    state.store.put_profile(user_id, &profile).await?;
    Ok(Json(Envelope::ok(profile)))
}

/// DELETE /api/v1/profile?userId=
///
/// Clears the profile together with the brand voice generated from it.
pub async fn handle_clear_profile(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<UserIdQuery>,
) -> Result<Json<Envelope<ClearedResponse>>, AppError> {
    let cleared = state.store.clear_profile(params.user_id()?).await?;
    Ok(Json(Envelope::ok(ClearedResponse { cleared })))
}

/// GET /api/v1/onboarding?userId=
pub async fn handle_onboarding_status(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<UserIdQuery>,
) -> Result<Json<OnboardingStatus>, AppError> {
    let user_id = params.user_id()?;
    let has_profile = state.store.get_profile(user_id).await?.is_some();
    let has_brand_voice = state.store.get_brand_voice(user_id).await?.is_some();
    Ok(Json(OnboardingStatus {
        onboarding_complete: has_profile && has_brand_voice,
        has_profile,
        has_brand_voice,
    }))
}
