use serde::{Deserialize, Serialize};

/// Number of pillars in a brand voice.
pub const PILLAR_COUNT: usize = 3;
/// Number of "means" and "doesn't mean" guidelines per pillar.
pub const GUIDELINE_COUNT: usize = 3;

/// One adjective-titled component of a brand voice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pillar {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub means: Vec<String>,
    pub doesnt_mean: Vec<String>,
    /// Formatted as "Brand – explanation".
    pub inspiration: String,
}

/// The generated `{ executiveSummary, pillars }` artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandVoice {
    pub executive_summary: String,
    pub pillars: Vec<Pillar>,
}

impl Pillar {
    /// Strict shape check applied to model output and user edits alike.
    pub fn validate(&self) -> Result<(), String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("pillar title is empty".to_string());
        }
        if title.contains(char::is_whitespace) {
            return Err(format!("pillar title '{title}' is not a single word"));
        }
        check_guidelines("means", &self.means)?;
        check_guidelines("doesntMean", &self.doesnt_mean)?;
        if self.inspiration.trim().is_empty() {
            return Err(format!("pillar '{title}' has no inspiration"));
        }
        Ok(())
    }
}

fn check_guidelines(field: &str, items: &[String]) -> Result<(), String> {
    if items.len() != GUIDELINE_COUNT {
        return Err(format!(
            "{field} has {} entries, expected {GUIDELINE_COUNT}",
            items.len()
        ));
    }
    if items.iter().any(|item| item.trim().is_empty()) {
        return Err(format!("{field} contains an empty entry"));
    }
    Ok(())
}

impl BrandVoice {
    pub fn validate(&self) -> Result<(), String> {
        if self.executive_summary.trim().is_empty() {
            return Err("executiveSummary is empty".to_string());
        }
        if self.pillars.len() != PILLAR_COUNT {
            return Err(format!(
                "brand voice has {} pillars, expected {PILLAR_COUNT}",
                self.pillars.len()
            ));
        }
        for (i, pillar) in self.pillars.iter().enumerate() {
            pillar
                .validate()
                .map_err(|reason| format!("pillar {}: {reason}", i + 1))?;
        }
        Ok(())
    }

    /// Gives every pillar without an id the positional id `pillar-<n>`.
    pub fn assign_missing_ids(&mut self) {
        for (i, pillar) in self.pillars.iter_mut().enumerate() {
            if pillar.id.trim().is_empty() {
                pillar.id = pillar_id(i);
            }
        }
    }
}

pub fn pillar_id(index: usize) -> String {
    format!("pillar-{}", index + 1)
}
