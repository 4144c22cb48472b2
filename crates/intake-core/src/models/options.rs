use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{PrivacyLevel, ProcessingRequirement, ResearchPhase, WorkflowType};

/// One selectable value of a form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FormOption {
    pub value: String,
    pub label: String,
}

/// Every closed vocabulary the upload form offers
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FormOptionsResponse {
    pub workflow_types: Vec<FormOption>,
    pub research_phases: Vec<FormOption>,
    pub privacy_levels: Vec<FormOption>,
    pub processing_requirements: Vec<FormOption>,
}

impl FormOptionsResponse {
    pub fn build() -> Self {
        FormOptionsResponse {
            workflow_types: WorkflowType::ALL
                .iter()
                .map(|w| FormOption {
                    value: w.as_str().to_string(),
                    label: w.as_str().to_uppercase(),
                })
                .collect(),
            research_phases: titled(ResearchPhase::values()),
            privacy_levels: titled(PrivacyLevel::values()),
            processing_requirements: titled(ProcessingRequirement::values()),
        }
    }
}

fn titled(values: Vec<&'static str>) -> Vec<FormOption> {
    values
        .into_iter()
        .map(|v| FormOption {
            value: v.to_string(),
            label: title_case(&v.replace('_', " ")),
        })
        .collect()
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest
/// (`raw-data` -> `Raw-Data`).
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_alpha = false;
    for c in input.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("raw-data"), "Raw-Data");
        assert_eq!(title_case("public"), "Public");
        assert_eq!(title_case("cleaning needed"), "Cleaning Needed");
        assert_eq!(title_case("mIxEd"), "Mixed");
    }

    #[test]
    fn test_options_labels() {
        let options = FormOptionsResponse::build();
        assert_eq!(options.workflow_types.len(), 5);
        assert_eq!(
            options.workflow_types[0],
            FormOption {
                value: "csv".to_string(),
                label: "CSV".to_string()
            }
        );
        assert_eq!(options.research_phases[0].label, "Raw-Data");
        assert_eq!(options.privacy_levels.len(), 3);
        assert_eq!(
            options.processing_requirements[0].label,
            "Cleaning-Needed"
        );
    }
}
