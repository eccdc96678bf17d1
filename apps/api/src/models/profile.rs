use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::llm_client::prompts::{join_or_placeholder, or_placeholder, NONE_PROVIDED, NOT_SPECIFIED};

/// Maximum number of business values a profile may carry.
pub const MAX_BUSINESS_VALUES: usize = 5;

/// The business facts collected during onboarding. Read by every generation call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BusinessProfile {
    pub business_name: String,
    pub year_founded: Option<String>,
    pub business_description: String,
    pub target_audience: Option<String>,
    pub selected_demographics: Vec<String>,
    pub business_values: Vec<String>,
    pub additional_info: Option<String>,
}

impl BusinessProfile {
    /// Checks the fields the onboarding form requires. Returns the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.business_name.trim().is_empty() {
            return Err("businessName is required".to_string());
        }
        if self.business_description.trim().is_empty() {
            return Err("businessDescription is required".to_string());
        }

        let values: Vec<&str> = self
            .business_values
            .iter()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .collect();
        if values.is_empty() {
            return Err("At least one business value is required".to_string());
        }
        if values.len() > MAX_BUSINESS_VALUES {
            return Err(format!(
                "At most {MAX_BUSINESS_VALUES} business values may be selected"
            ));
        }
        for (i, value) in values.iter().enumerate() {
            if values[..i].iter().any(|v| v.eq_ignore_ascii_case(value)) {
                return Err(format!("Business value '{value}' is listed twice"));
            }
        }

        if let Some(year) = self.year_founded.as_deref().map(str::trim) {
            if !year.is_empty() {
                validate_year(year)?;
            }
        }

        Ok(())
    }

    /// Demographics as a comma list, falling back to the free-text audience.
    pub fn demographics_text(&self) -> String {
        let demographics = join_or_placeholder(&self.selected_demographics, "");
        if demographics.is_empty() {
            or_placeholder(self.target_audience.as_deref(), NOT_SPECIFIED).to_string()
        } else {
            demographics
        }
    }

    pub fn values_text(&self) -> String {
        join_or_placeholder(&self.business_values, NOT_SPECIFIED)
    }

    pub fn year_founded_text(&self) -> &str {
        or_placeholder(self.year_founded.as_deref(), NOT_SPECIFIED)
    }

    pub fn additional_info_text(&self) -> &str {
        or_placeholder(self.additional_info.as_deref(), NONE_PROVIDED)
    }
}

fn validate_year(year: &str) -> Result<(), String> {
    let parsed = year
        .parse::<i32>()
        .ok()
        .filter(|_| year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(|| format!("yearFounded '{year}' must be a four-digit year"))?;

    if parsed > Utc::now().year() {
        return Err(format!("yearFounded '{year}' is in the future"));
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::fixtures::acme;
    use super::*;

    #[test]
    fn test_valid_profile_passes() {
        assert!(acme().validate().is_ok());
    }

    #[test]
    fn test_missing_name_rejected() {
        let profile = BusinessProfile {
            business_name: "  ".to_string(),
            ..acme()
        };
        assert!(profile.validate().unwrap_err().contains("businessName"));
    }

    #[test]
    fn test_values_bounds() {
        let none = BusinessProfile {
            business_values: vec![],
            ..acme()
        };
        assert!(none.validate().is_err());

        let too_many = BusinessProfile {
            business_values: (1..=6).map(|i| format!("Value{i}")).collect(),
            ..acme()
        };
        assert!(too_many.validate().unwrap_err().contains("At most 5"));

        let duplicated = BusinessProfile {
            business_values: vec!["Trust".to_string(), "trust".to_string()],
            ..acme()
        };
        assert!(duplicated.validate().unwrap_err().contains("twice"));
    }

    #[test]
    fn test_year_validation() {
        let bad = BusinessProfile {
            year_founded: Some("20x0".to_string()),
            ..acme()
        };
        assert!(bad.validate().is_err());

        let future = BusinessProfile {
            year_founded: Some("9999".to_string()),
            ..acme()
        };
        assert!(future.validate().unwrap_err().contains("future"));

        let blank = BusinessProfile {
            year_founded: Some(String::new()),
            ..acme()
        };
        assert!(blank.validate().is_ok());
    }

    #[test]
    fn test_placeholder_rendering() {
        let profile = BusinessProfile {
            year_founded: None,
            ..acme()
        };
        assert_eq!(profile.year_founded_text(), "Not specified");
        assert_eq!(profile.additional_info_text(), "None provided");
        assert_eq!(profile.demographics_text(), "Not specified");
        assert_eq!(profile.values_text(), "Trust, Speed");
    }

    #[test]
    fn test_demographics_fall_back_to_audience() {
        let profile = BusinessProfile {
            target_audience: Some("Small retailers".to_string()),
            ..acme()
        };
        assert_eq!(profile.demographics_text(), "Small retailers");

        let with_list = BusinessProfile {
            selected_demographics: vec!["Gen Z".to_string(), "Millennials".to_string()],
            ..profile
        };
        assert_eq!(with_list.demographics_text(), "Gen Z, Millennials");
    }

    #[test]
    fn test_camel_case_deserialization() {
        let profile: BusinessProfile = serde_json::from_value(serde_json::json!({
            "businessName": "Acme",
            "businessDescription": "we sell widgets",
            "businessValues": ["Trust"],
            "yearFounded": "2020"
        }))
        .unwrap();
        assert_eq!(profile.business_name, "Acme");
        assert_eq!(profile.year_founded.as_deref(), Some("2020"));
        assert!(profile.selected_demographics.is_empty());
    }
}
