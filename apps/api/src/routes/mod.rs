pub mod health;

use axum::{
    routing::{get, post},
    Router,
};
use serde::Deserialize;

use crate::brand_voice::handlers as brand_voice;
use crate::content::handlers as content;
use crate::errors::AppError;
use crate::profile::handlers as profile;
use crate::state::AppState;
use crate::website::handlers as website;

/// `?userId=` on user-scoped reads and writes. Identity is established upstream.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdQuery {
    #[serde(default)]
    pub user_id: String,
}

impl UserIdQuery {
    pub fn user_id(&self) -> Result<&str, AppError> {
        let user_id = self.user_id.trim();
        if user_id.is_empty() {
            return Err(AppError::Validation("userId is required".to_string()));
        }
        Ok(user_id)
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Profile repository
        .route(
            "/api/v1/profile",
            get(profile::handle_get_profile)
                .put(profile::handle_put_profile)
                .delete(profile::handle_clear_profile),
        )
        .route(
            "/api/v1/onboarding",
            get(profile::handle_onboarding_status),
        )
        // Brand voice
        .route(
            "/api/v1/brand-voice",
            post(brand_voice::handle_generate)
                .get(brand_voice::handle_get)
                .put(brand_voice::handle_put),
        )
        .route(
            "/api/v1/brand-voice/pillars/:index/regenerate",
            post(brand_voice::handle_regenerate_pillar),
        )
        .route(
            "/api/v1/brand-voice/pillars/refine",
            post(brand_voice::handle_refine),
        )
        .route("/api/v1/brand-voice/guide", post(brand_voice::handle_guide))
        .route(
            "/api/v1/brand-voice/jobs",
            post(brand_voice::handle_create_job),
        )
        .route(
            "/api/v1/brand-voice/jobs/:id",
            get(brand_voice::handle_get_job),
        )
        // Content
        .route("/api/v1/content", post(content::handle_save))
        .route("/api/v1/content/generate", post(content::handle_generate))
        .route("/api/v1/content/stream", post(content::handle_stream))
        .route("/api/v1/content/history", get(content::handle_history))
        .route("/api/v1/content/count", get(content::handle_count))
        .route(
            "/api/v1/content/:id",
            get(content::handle_get).put(content::handle_update),
        )
        // Website analysis
        .route(
            "/api/v1/analyze-website",
            post(website::handle_analyze_website),
        )
        .with_state(state)
}
