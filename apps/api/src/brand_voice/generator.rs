//! Brand voice generation — prompt → invoker → normalizer → strict validation.
//!
//! Brand voice and pillar paths are single-attempt and never fall back to canned
//! data: provider errors and malformed output both surface to the caller.
//! Only the markdown guide goes through the retry wrapper.

use tracing::{debug, error, info};

use crate::brand_voice::prompts::{
    build_brand_voice_prompt, build_pillar_prompt, build_refine_prompt, build_voice_guide_prompt,
    VOICE_GUIDE_SYSTEM,
};
use crate::errors::AppError;
use crate::llm_client::normalize::{parse_json, strip_code_fences};
use crate::llm_client::retry::{retry_with_backoff, RetryPolicy};
use crate::llm_client::{CompletionProvider, CompletionRequest, LlmError};
use crate::models::brand_voice::{pillar_id, BrandVoice, Pillar};
use crate::models::profile::BusinessProfile;

const BRAND_VOICE_MODEL: &str = "gpt-4o";
const BRAND_VOICE_MAX_TOKENS: u32 = 1500;
const PILLAR_MAX_TOKENS: u32 = 1000;
const GENERATION_TEMPERATURE: f32 = 0.7;

const VOICE_GUIDE_MODEL: &str = "gpt-3.5-turbo";
const VOICE_GUIDE_MAX_TOKENS: u32 = 2000;

const REFINE_MODEL: &str = "gpt-4o-mini";
const REFINE_MAX_TOKENS: u32 = 500;

/// Generates a complete brand voice (summary + 3 pillars) for `profile`.
pub async fn generate_brand_voice(
    llm: &dyn CompletionProvider,
    profile: &BusinessProfile,
) -> Result<BrandVoice, AppError> {
    let prompt = build_brand_voice_prompt(profile);
    debug!("Brand voice prompt:\n{prompt}");

    let request = CompletionRequest::new(BRAND_VOICE_MODEL, prompt, BRAND_VOICE_MAX_TOKENS)
        .with_temperature(GENERATION_TEMPERATURE);
    let raw = llm.complete(&request).await?;

    let mut voice: BrandVoice = parse_json(&raw)?;
    voice.assign_missing_ids();
    voice.validate().map_err(|reason| rejected(&raw, reason))?;

    info!(
        "Generated brand voice for '{}' with pillars [{}]",
        profile.business_name,
        voice
            .pillars
            .iter()
            .map(|p| p.title.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(voice)
}

/// Generates a replacement for `existing[index]`. The new pillar keeps the id of
/// the pillar it replaces and must carry a different title.
pub async fn regenerate_pillar(
    llm: &dyn CompletionProvider,
    profile: &BusinessProfile,
    index: usize,
    existing: &[Pillar],
) -> Result<Pillar, AppError> {
    let replaced = existing.get(index).ok_or_else(|| {
        AppError::Validation(format!(
            "Pillar index {index} is out of range for {} pillars",
            existing.len()
        ))
    })?;

    let prompt = build_pillar_prompt(profile, index, existing);
    debug!("Sending prompt for pillar regeneration:\n{prompt}");

    let request = CompletionRequest::new(BRAND_VOICE_MODEL, prompt, PILLAR_MAX_TOKENS)
        .with_temperature(GENERATION_TEMPERATURE);
    let raw = llm.complete(&request).await?;

    let mut pillar: Pillar = parse_json(&raw)?;
    pillar.validate().map_err(|reason| rejected(&raw, reason))?;
    if pillar.title.trim().eq_ignore_ascii_case(replaced.title.trim()) {
        return Err(rejected(
            &raw,
            format!("new pillar repeats the replaced title '{}'", replaced.title),
        ));
    }

    pillar.id = if replaced.id.trim().is_empty() {
        pillar_id(index)
    } else {
        replaced.id.clone()
    };

    info!(
        "Regenerated pillar {} for '{}': {} -> {}",
        index + 1,
        profile.business_name,
        replaced.title,
        pillar.title
    );
    Ok(pillar)
}

/// Generates the markdown brand voice guide, retrying transient provider failures.
pub async fn generate_voice_guide(
    llm: &dyn CompletionProvider,
    profile: &BusinessProfile,
    policy: RetryPolicy,
) -> Result<String, AppError> {
    let request = CompletionRequest::new(
        VOICE_GUIDE_MODEL,
        build_voice_guide_prompt(profile),
        VOICE_GUIDE_MAX_TOKENS,
    )
    .with_system(VOICE_GUIDE_SYSTEM)
    .with_temperature(GENERATION_TEMPERATURE);

    let raw = retry_with_backoff(policy, |_| llm.complete(&request)).await?;
    Ok(strip_code_fences(&raw).to_string())
}

/// Rewrites a pillar statement to be clearer and more compelling.
pub async fn refine_pillar_statement(
    llm: &dyn CompletionProvider,
    statement: &str,
) -> Result<String, AppError> {
    let request = CompletionRequest::new(REFINE_MODEL, build_refine_prompt(statement), REFINE_MAX_TOKENS);
    let raw = llm.complete(&request).await?;

    let refined = strip_code_fences(&raw);
    if refined.is_empty() {
        return Err(LlmError::EmptyContent.into());
    }
    Ok(refined.to_string())
}

fn rejected(raw: &str, reason: String) -> AppError {
    error!("Generated content failed validation: {reason}");
    error!("Raw text: {raw}");
    AppError::MalformedOutput(reason)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::llm_client::testing::ScriptedProvider;
    use crate::models::brand_voice::fixtures::voice;
    use crate::models::profile::fixtures::acme;

    fn canned_voice_json() -> String {
        json!({
            "executiveSummary": "Acme keeps widgets simple.",
            "pillars": [
                {"title": "Candid", "means": ["a", "b", "c"], "doesntMean": ["d", "e", "f"], "inspiration": "Basecamp – plain talk"},
                {"title": "Brisk", "means": ["a", "b", "c"], "doesntMean": ["d", "e", "f"], "inspiration": "Stripe – fast docs"},
                {"title": "Grounded", "means": ["a", "b", "c"], "doesntMean": ["d", "e", "f"], "inspiration": "Patagonia – real stories"}
            ]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_end_to_end_acme_scenario() {
        let llm = ScriptedProvider::new(vec![Ok(format!("```json\n{}\n```", canned_voice_json()))]);

        let voice = generate_brand_voice(&llm, &acme()).await.unwrap();

        assert_eq!(voice.pillars.len(), 3);
        assert_eq!(voice.pillars[0].id, "pillar-1");
        let requests = llm.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].prompt.contains("Acme"));
        assert!(requests[0].prompt.contains("Trust, Speed"));
        assert!(requests[0].prompt.contains("2020"));
        assert_eq!(requests[0].model, "gpt-4o");
        assert_eq!(requests[0].max_tokens, 1500);
        assert_eq!(requests[0].temperature, Some(0.7));
    }

    #[tokio::test]
    async fn test_invalid_json_is_malformed_output() {
        let llm = ScriptedProvider::replying("I'm sorry, I can't produce JSON today.");
        let err = generate_brand_voice(&llm, &acme()).await.unwrap_err();
        assert!(matches!(err, AppError::MalformedOutput(_)));
    }

    #[tokio::test]
    async fn test_wrong_pillar_count_is_rejected() {
        let mut value: serde_json::Value = serde_json::from_str(&canned_voice_json()).unwrap();
        value["pillars"].as_array_mut().unwrap().pop();
        let llm = ScriptedProvider::replying(&value.to_string());

        let err = generate_brand_voice(&llm, &acme()).await.unwrap_err();
        assert!(matches!(err, AppError::MalformedOutput(ref m) if m.contains("2 pillars")));
    }

    #[tokio::test]
    async fn test_provider_error_propagates_without_retry() {
        let llm = ScriptedProvider::new(vec![
            Err(LlmError::RateLimited("busy".into())),
            Ok(canned_voice_json()),
        ]);
        let err = generate_brand_voice(&llm, &acme()).await.unwrap_err();
        assert!(matches!(err, AppError::Llm(LlmError::RateLimited(_))));
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_regenerate_pillar_keeps_slot_id() {
        let existing = voice().pillars;
        let reply = json!({
            "id": "whatever",
            "title": "Playful",
            "means": ["a", "b", "c"],
            "doesntMean": ["d", "e", "f"],
            "inspiration": "Mailchimp – jokes that land"
        });
        let llm = ScriptedProvider::replying(&reply.to_string());

        let pillar = regenerate_pillar(&llm, &acme(), 1, &existing).await.unwrap();

        assert_eq!(pillar.id, "pillar-2");
        assert_eq!(pillar.title, "Playful");
        assert_eq!(llm.requests()[0].max_tokens, 1000);
    }

    #[tokio::test]
    async fn test_regenerate_pillar_rejects_same_title() {
        let existing = voice().pillars;
        let reply = json!({
            "title": "brisk",
            "means": ["a", "b", "c"],
            "doesntMean": ["d", "e", "f"],
            "inspiration": "Stripe – again"
        });
        let llm = ScriptedProvider::replying(&reply.to_string());

        let err = regenerate_pillar(&llm, &acme(), 1, &existing).await.unwrap_err();
        assert!(matches!(err, AppError::MalformedOutput(_)));
    }

    #[tokio::test]
    async fn test_regenerate_pillar_index_out_of_range() {
        let llm = ScriptedProvider::default();
        let err = regenerate_pillar(&llm, &acme(), 3, &voice().pillars)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_voice_guide_retries_transient_failures() {
        tokio::time::pause();
        let llm = ScriptedProvider::new(vec![
            Err(LlmError::Network("timeout".into())),
            Ok("```markdown\n# Acme voice\n```".into()),
        ]);

        let guide = generate_voice_guide(&llm, &acme(), RetryPolicy::default())
            .await
            .unwrap();

        assert_eq!(guide, "# Acme voice");
        assert_eq!(llm.calls(), 2);
        let request = &llm.requests()[0];
        assert_eq!(request.model, "gpt-3.5-turbo");
        assert!(request.system.as_deref().unwrap().contains("brand voice guides"));
    }

    #[tokio::test]
    async fn test_refine_statement() {
        let llm = ScriptedProvider::replying("  We speak plainly.  ");
        let refined = refine_pillar_statement(&llm, "we kind of talk plain").await.unwrap();
        assert_eq!(refined, "We speak plainly.");
        assert_eq!(llm.requests()[0].model, "gpt-4o-mini");
    }
}
