// All LLM prompt constants and builders for the brand voice module.
// Builders are pure: the same inputs always render the same prompt text.

use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::models::brand_voice::Pillar;
use crate::models::profile::BusinessProfile;

/// Output format for full brand voice generation. Embedded verbatim, exactly once.
pub const BRAND_VOICE_JSON_SCHEMA: &str = r#"{
 "executiveSummary": "Summary text",
 "pillars": [
   {
     "id": "pillar-1",
     "title": "PillarName",
     "means": ["What it means 1", "What it means 2", "What it means 3"],
     "doesntMean": ["What it doesn't mean 1", "What it doesn't mean 2", "What it doesn't mean 3"],
     "inspiration": "Brand Example – Brief explanation"
   }
 ]
}"#;

/// Pillar titles the model must avoid when regenerating a pillar.
pub const GENERIC_PILLAR_TERMS: &[&str] = &[
    "Consistent",
    "Innovative",
    "Professional",
    "Empathetic",
    "Authentic",
    "Friendly",
    "Informative",
    "Ethical",
    "Sustainable",
    "Engaging",
    "Dynamic",
    "Trustworthy",
    "Customer-centric",
    "Reliable",
    "Effective",
    "Insightful",
    "Quality-driven",
    "Strategic",
    "Visionary",
];

/// System prompt for the markdown brand voice guide.
pub const VOICE_GUIDE_SYSTEM: &str = r#"You are an expert brand consultant who creates brand voice guides for businesses.

Company overview:
When generating the company overview:
- use only the business information provided
- keep to 1 paragraph, max 30 words
- bold keywords and important parts using markdown (**keyword**)

Brand Voice:
Generate 3 brand voice elements.
Each element must:
- be a distinct personality type
- be 1-2 words
- include one sentence on how this relates to the business details
- use bullet points
- include what it means and doesn't mean
- include an example of a brand that does this well and brief explanation of how they do it
- NOT BE generic

Avoid brand voice pillars with these generic names:
- consistent
- innovative
- professional
- empathetic
- authentic
- friendly
- informative
- ethical
- sustainable
- engaging
- dynamic

End with a 'Summary' of how these 3 elements relate to the business details.

Format the output using markdown with clear headings and structure to enhance readability."#;

/// Renders the full brand voice generation prompt.
pub fn build_brand_voice_prompt(profile: &BusinessProfile) -> String {
    format!(
        r#"Generate a brand voice for {name}.

Business Context:
- Description: {description}
- Target Demographics: {demographics}
- Core Values: {values}
- Year Founded: {year}
- Additional Info: {additional}

Create a brand voice with:
1. An executive summary (1-2 sentences)
2. Three brand voice pillars, each with:
  - A SINGLE WORD adjective title
  - 3 "What it means" guidelines
  - 3 "What it doesn't mean" guidelines
  - A brand inspiration example

Format as JSON:
{schema}

{json_only}"#,
        name = profile.business_name.trim(),
        description = profile.business_description.trim(),
        demographics = profile.demographics_text(),
        values = profile.values_text(),
        year = profile.year_founded_text(),
        additional = profile.additional_info_text(),
        schema = BRAND_VOICE_JSON_SCHEMA,
        json_only = JSON_ONLY_INSTRUCTION,
    )
}

/// Renders the prompt that replaces `existing[index]` with a new pillar.
/// The caller guarantees `index < existing.len()`.
pub fn build_pillar_prompt(profile: &BusinessProfile, index: usize, existing: &[Pillar]) -> String {
    let name = profile.business_name.trim();
    let replaced = existing[index].title.trim();
    let other_pillars = existing
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, p)| p.title.trim())
        .collect::<Vec<_>>()
        .join(", ");
    let generic_terms = GENERIC_PILLAR_TERMS.join(", ");

    format!(
        r#"Generate a new brand voice pillar for {name}, founded in {year}.

Context:
Business Description: {description}
Target Demographics: {demographics}
Core Values: {values}
Additional Info: {additional}
Existing Pillars: {other_pillars}

First, analyze what would complement the existing voice pillars:
1. What communication style would work well with the existing pillars?
2. What emotional response or perception would enhance the overall brand voice?

IMPORTANT GUIDELINES FOR THE NEW PILLAR:
- The pillar MUST be a SINGLE WORD adjective
- Choose a pillar that complements the existing pillars: {other_pillars}
- The pillar should be practical and immediately applicable to content creation
- The new pillar MUST be different from the one being replaced: {replaced}
- Avoid generic, overused terms like: {generic_terms}

For the pillar:
1. Use a SINGLE WORD adjective as the title
2. Provide 3 specific "What it means" guidelines that show exactly how to implement this pillar in content
3. List 3 "What it doesn't mean" pitfalls to avoid when applying this pillar
4. Give 1 relevant brand inspiration example with a brief explanation of how they excel at this aspect and how it relates to {name}'s context

Format the response as a structured JSON object with this structure:
{{
"id": "pillar-id",
"title": "SingleWordAdjective",
"means": ["Specific guideline 1", "Specific guideline 2", "Specific guideline 3"],
"doesntMean": ["Specific pitfall 1", "Specific pitfall 2", "Specific pitfall 3"],
"inspiration": "Brand Example – With brief explanation of how they excel at this aspect and how it relates to {name}"
}}

IMPORTANT:
- The pillar MUST be a SINGLE WORD adjective
- The pillar should complement the existing pillars
- The pillar must be immediately useful and easy to apply to content creation
- {json_only}"#,
        year = profile.year_founded_text(),
        description = profile.business_description.trim(),
        demographics = profile.demographics_text(),
        values = profile.values_text(),
        additional = profile.additional_info_text(),
        json_only = JSON_ONLY_INSTRUCTION,
    )
}

/// User prompt for the markdown brand voice guide; pairs with `VOICE_GUIDE_SYSTEM`.
pub fn build_voice_guide_prompt(profile: &BusinessProfile) -> String {
    format!(
        r#"Please create a brand voice guide for {name}.

Business Description:
{description}

Target Audience:
{audience}

Business Values:
{values}

Follow the format exactly as described in the system instructions."#,
        name = profile.business_name.trim(),
        description = profile.business_description.trim(),
        audience = profile.demographics_text(),
        values = profile.values_text(),
    )
}

/// Prompt asking for a clearer rewrite of a single pillar statement.
pub fn build_refine_prompt(statement: &str) -> String {
    format!(
        r#"You are an expert brand messaging consultant. You help companies refine their core messaging.

I will provide you with a pillar statement. Your job is to regenerate the pillar statement, making it more clear, concise, and compelling.

Pillar Statement: {}"#,
        statement.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::brand_voice::fixtures::voice;
    use crate::models::profile::fixtures::acme;

    #[test]
    fn test_brand_voice_prompt_embeds_profile_facts() {
        let prompt = build_brand_voice_prompt(&acme());
        assert!(prompt.contains("Acme"));
        assert!(prompt.contains("Trust, Speed"));
        assert!(prompt.contains("2020"));
        assert!(prompt.contains("we sell widgets"));
    }

    #[test]
    fn test_brand_voice_prompt_contains_schema_exactly_once() {
        let prompt = build_brand_voice_prompt(&acme());
        assert_eq!(prompt.matches(BRAND_VOICE_JSON_SCHEMA).count(), 1);
    }

    #[test]
    fn test_brand_voice_prompt_contains_every_value() {
        let profile = BusinessProfile {
            business_values: vec![
                "Integrity".to_string(),
                "Craft".to_string(),
                "Humor".to_string(),
                "Access".to_string(),
                "Grit".to_string(),
            ],
            ..acme()
        };
        let prompt = build_brand_voice_prompt(&profile);
        for value in &profile.business_values {
            assert!(prompt.contains(value.as_str()), "missing value {value}");
        }
    }

    #[test]
    fn test_schema_once_even_if_profile_mentions_it() {
        let profile = BusinessProfile {
            additional_info: Some("{schema}".to_string()),
            ..acme()
        };
        let prompt = build_brand_voice_prompt(&profile);
        assert_eq!(prompt.matches(BRAND_VOICE_JSON_SCHEMA).count(), 1);
        assert!(prompt.contains("Additional Info: {schema}"));
    }

    #[test]
    fn test_brand_voice_prompt_is_deterministic() {
        assert_eq!(build_brand_voice_prompt(&acme()), build_brand_voice_prompt(&acme()));
    }

    #[test]
    fn test_missing_optional_fields_use_placeholders() {
        let profile = BusinessProfile {
            year_founded: None,
            ..acme()
        };
        let prompt = build_brand_voice_prompt(&profile);
        assert!(prompt.contains("Year Founded: Not specified"));
        assert!(prompt.contains("Additional Info: None provided"));
        assert!(prompt.contains("Target Demographics: Not specified"));
    }

    #[test]
    fn test_pillar_prompt_names_replaced_and_other_pillars() {
        let existing = voice().pillars;
        let prompt = build_pillar_prompt(&acme(), 1, &existing);

        assert!(prompt.contains("different from the one being replaced: Brisk"));
        assert!(prompt.contains("Existing Pillars: Candid, Grounded"));
        assert!(prompt.contains("founded in 2020"));
        for term in GENERIC_PILLAR_TERMS {
            assert!(prompt.contains(term));
        }
        assert!(prompt.contains("\"doesntMean\""));
    }

    #[test]
    fn test_voice_guide_prompt() {
        let prompt = build_voice_guide_prompt(&acme());
        assert!(prompt.starts_with("Please create a brand voice guide for Acme."));
        assert!(prompt.contains("Trust, Speed"));
    }

    #[test]
    fn test_refine_prompt_embeds_statement() {
        let prompt = build_refine_prompt("  We are bold.  ");
        assert!(prompt.ends_with("Pillar Statement: We are bold."));
    }
}
