use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::extract::AppJson;
use crate::state::AppState;
use crate::website::{analyze_html, fetch_html, parse_website_url};

#[derive(Debug, Deserialize)]
pub struct AnalyzeWebsiteRequest {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeWebsiteResponse {
    pub analysis: String,
}

/// POST /api/v1/analyze-website
pub async fn handle_analyze_website(
    State(state): State<AppState>,
    AppJson(request): AppJson<AnalyzeWebsiteRequest>,
) -> Result<Json<AnalyzeWebsiteResponse>, AppError> {
    let url = parse_website_url(&request.url)?;
    let html = fetch_html(&state.http, &url, state.config.website_fetch_max_bytes).await?;
    let analysis = analyze_html(state.llm.as_ref(), &html).await?;
    Ok(Json(AnalyzeWebsiteResponse { analysis }))
}
