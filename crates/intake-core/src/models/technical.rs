use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Accepted file workflow, one per supported format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowType {
    Csv,
    Json,
    Pdf,
    Xlsx,
    Txt,
}

form_enum!(WorkflowType, "workflow type", {
    Csv => "csv",
    Json => "json",
    Pdf => "pdf",
    Xlsx => "xlsx",
    Txt => "txt",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ProcessingRequirement {
    CleaningNeeded,
    ValidationRequired,
    TransformationReady,
}

form_enum!(ProcessingRequirement, "processing requirement", {
    CleaningNeeded => "cleaning-needed",
    ValidationRequired => "validation-required",
    TransformationReady => "transformation-ready",
});

impl ProcessingRequirement {
    /// Parse a comma-separated list. Tokens are trimmed, unknown tokens are skipped and
    /// repeats keep their first position.
    pub fn parse_list(raw: &str) -> Vec<ProcessingRequirement> {
        let mut requirements = Vec::new();
        for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match token.parse::<ProcessingRequirement>() {
                Ok(req) if !requirements.contains(&req) => requirements.push(req),
                Ok(_) => {}
                Err(_) => {
                    tracing::debug!(token = %token, "Ignoring unknown processing requirement");
                }
            }
        }
        requirements
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TechnicalMetadata {
    pub workflow_type: WorkflowType,
    pub processing_requirements: Vec<ProcessingRequirement>,
}
