//! Research and technical metadata validation
//!
//! The upload form arrives as loose strings. `MetadataForm` holds them as received and
//! `MetadataForm::into_metadata` turns them into typed metadata or a field-level error.
//! The project name charset check is the only guard against path injection through the
//! project folder, so it runs before anything derives a path from the name.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use validator::Validate;

use crate::error::AppError;
use crate::models::{
    DateRange, PrivacyLevel, ProcessingRequirement, ResearchMetadata, ResearchPhase,
    TechnicalMetadata, WorkflowType,
};

static PROJECT_NAME_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9 _-]+$")
        .unwrap_or_else(|e| panic!("invalid project name pattern: {}", e))
});

/// Upload form fields exactly as submitted. Missing required fields are empty strings,
/// missing optional fields are `None`.
#[derive(Debug, Clone, Default, Validate)]
pub struct MetadataForm {
    #[validate(
        length(
            min = 1,
            max = 200,
            message = "Project name must be between 1 and 200 characters"
        ),
        regex(
            path = *PROJECT_NAME_CHARSET,
            message = "Project name can only contain letters, numbers, spaces, hyphens, and underscores"
        )
    )]
    pub project_name: String,
    #[validate(length(
        min = 1,
        max = 1000,
        message = "Hypothesis must be between 1 and 1000 characters"
    ))]
    pub hypothesis: String,
    #[validate(length(
        min = 1,
        max = 200,
        message = "Data source must be between 1 and 200 characters"
    ))]
    pub data_source: String,
    #[validate(length(
        min = 1,
        max = 200,
        message = "Collection method must be between 1 and 200 characters"
    ))]
    pub collection_method: String,
    #[validate(length(max = 100, message = "Experiment ID must be at most 100 characters"))]
    pub experiment_id: Option<String>,
    pub date_range_start: Option<String>,
    pub date_range_end: Option<String>,
    pub research_phase: Option<String>,
    pub privacy_level: Option<String>,
    pub workflow_type: String,
    /// Comma-separated processing requirement tokens
    pub processing_requirements: Option<String>,
}

/// Research and technical metadata that passed every rule
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedMetadata {
    pub research: ResearchMetadata,
    pub technical: TechnicalMetadata,
}

impl MetadataForm {
    /// Validate every field and build typed metadata.
    ///
    /// Length and charset rules are checked first; the first failing field in
    /// alphabetical order is reported. Closed-vocabulary fields and dates follow.
    pub fn into_metadata(self) -> Result<ValidatedMetadata, AppError> {
        let form = self.normalized();
        form.validate()?;

        let workflow_type = form
            .workflow_type
            .parse::<WorkflowType>()
            .map_err(|msg| AppError::validation("workflow_type", msg))?;

        let research_phase = parse_optional::<ResearchPhase>("research_phase", form.research_phase)?;
        let privacy_level = parse_optional::<PrivacyLevel>("privacy_level", form.privacy_level)?;

        let date_range_start = check_date("date_range_start", form.date_range_start)?;
        let date_range_end = check_date("date_range_end", form.date_range_end)?;

        let processing_requirements = form
            .processing_requirements
            .as_deref()
            .map(ProcessingRequirement::parse_list)
            .unwrap_or_default();

        Ok(ValidatedMetadata {
            research: ResearchMetadata {
                project_name: form.project_name,
                hypothesis: form.hypothesis,
                data_source: form.data_source,
                collection_method: form.collection_method,
                experiment_id: form.experiment_id,
                date_range: DateRange::from_parts(date_range_start, date_range_end),
                research_phase,
                privacy_level,
            },
            technical: TechnicalMetadata {
                workflow_type,
                processing_requirements,
            },
        })
    }

    /// Trim the project name and closed-vocabulary values; blank optional fields become
    /// `None`.
    fn normalized(self) -> Self {
        MetadataForm {
            project_name: self.project_name.trim().to_string(),
            hypothesis: self.hypothesis,
            data_source: self.data_source,
            collection_method: self.collection_method,
            experiment_id: non_blank(self.experiment_id),
            date_range_start: non_blank(self.date_range_start).map(|s| s.trim().to_string()),
            date_range_end: non_blank(self.date_range_end).map(|s| s.trim().to_string()),
            research_phase: non_blank(self.research_phase).map(|s| s.trim().to_string()),
            privacy_level: non_blank(self.privacy_level).map(|s| s.trim().to_string()),
            workflow_type: self.workflow_type.trim().to_string(),
            processing_requirements: non_blank(self.processing_requirements),
        }
    }
}

/// Check a project name taken from somewhere other than the upload form, such as a
/// listing query, with the same length and charset rules. Returns the trimmed name.
pub fn validate_project_name(raw: &str) -> Result<String, AppError> {
    let name = raw.trim();
    let length = name.chars().count();
    if length == 0 || length > 200 {
        return Err(AppError::validation(
            "project_name",
            "Project name must be between 1 and 200 characters",
        ));
    }
    if !PROJECT_NAME_CHARSET.is_match(name) {
        return Err(AppError::validation(
            "project_name",
            "Project name can only contain letters, numbers, spaces, hyphens, and underscores",
        ));
    }
    Ok(name.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_optional<T>(field: &str, value: Option<String>) -> Result<Option<T>, AppError>
where
    T: std::str::FromStr<Err = String>,
{
    value
        .map(|raw| raw.parse::<T>().map_err(|msg| AppError::validation(field, msg)))
        .transpose()
}

fn check_date(field: &str, value: Option<String>) -> Result<Option<String>, AppError> {
    match value {
        Some(raw) => match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
            Ok(_) => Ok(Some(raw)),
            Err(_) => Err(AppError::validation(
                field,
                format!("Date '{}' must use the YYYY-MM-DD format", raw),
            )),
        },
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> MetadataForm {
        MetadataForm {
            project_name: "Acme Corp".to_string(),
            hypothesis: "Soil pH predicts yield".to_string(),
            data_source: "Field sensors".to_string(),
            collection_method: "Automated sampling".to_string(),
            workflow_type: "csv".to_string(),
            ..Default::default()
        }
    }

    fn field_of(err: AppError) -> String {
        match err {
            AppError::Validation { field, .. } => field,
            other => panic!("Expected Validation variant, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_form() {
        let metadata = valid_form().into_metadata().unwrap();
        assert_eq!(metadata.research.project_name, "Acme Corp");
        assert_eq!(metadata.technical.workflow_type, WorkflowType::Csv);
        assert!(metadata.technical.processing_requirements.is_empty());
        assert!(metadata.research.date_range.is_none());
    }

    #[test]
    fn test_project_name_is_trimmed() {
        let form = MetadataForm {
            project_name: "  Gene_Study-2  ".to_string(),
            ..valid_form()
        };
        assert_eq!(form.into_metadata().unwrap().research.project_name, "Gene_Study-2");
    }

    #[test]
    fn test_project_name_rejects_unsafe_characters() {
        for name in ["../etc", "a/b", "user@lab", "cost$", "tab\there"] {
            let form = MetadataForm {
                project_name: name.to_string(),
                ..valid_form()
            };
            let err = form.into_metadata().unwrap_err();
            assert_eq!(field_of(err), "project_name", "name {:?}", name);
        }
    }

    #[test]
    fn test_blank_project_name_rejected() {
        let form = MetadataForm {
            project_name: "   ".to_string(),
            ..valid_form()
        };
        assert_eq!(field_of(form.into_metadata().unwrap_err()), "project_name");
    }

    #[test]
    fn test_length_bounds_are_inclusive_and_count_characters() {
        let form = MetadataForm {
            hypothesis: "é".repeat(1000),
            ..valid_form()
        };
        assert!(form.into_metadata().is_ok());

        let form = MetadataForm {
            hypothesis: "x".repeat(1001),
            ..valid_form()
        };
        assert_eq!(field_of(form.into_metadata().unwrap_err()), "hypothesis");

        let form = MetadataForm {
            experiment_id: Some("e".repeat(101)),
            ..valid_form()
        };
        assert_eq!(field_of(form.into_metadata().unwrap_err()), "experiment_id");
    }

    #[test]
    fn test_missing_required_field_named() {
        let form = MetadataForm {
            data_source: String::new(),
            ..valid_form()
        };
        assert_eq!(field_of(form.into_metadata().unwrap_err()), "data_source");
    }

    #[test]
    fn test_unknown_workflow_type_rejected() {
        let form = MetadataForm {
            workflow_type: "parquet".to_string(),
            ..valid_form()
        };
        match form.into_metadata().unwrap_err() {
            AppError::Validation { field, message } => {
                assert_eq!(field, "workflow_type");
                assert!(message.contains("csv, json, pdf, xlsx, txt"));
            }
            other => panic!("Expected Validation variant, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_optional_enum_is_absent() {
        let form = MetadataForm {
            research_phase: Some("".to_string()),
            privacy_level: Some("  ".to_string()),
            ..valid_form()
        };
        let metadata = form.into_metadata().unwrap();
        assert!(metadata.research.research_phase.is_none());
        assert!(metadata.research.privacy_level.is_none());
    }

    #[test]
    fn test_unknown_optional_enum_rejected() {
        let form = MetadataForm {
            privacy_level: Some("secret".to_string()),
            ..valid_form()
        };
        assert_eq!(field_of(form.into_metadata().unwrap_err()), "privacy_level");
    }

    #[test]
    fn test_processing_requirements_filtered() {
        let form = MetadataForm {
            processing_requirements: Some(
                "cleaning-needed, bogus-value, validation-required".to_string(),
            ),
            ..valid_form()
        };
        assert_eq!(
            form.into_metadata().unwrap().technical.processing_requirements,
            vec![
                ProcessingRequirement::CleaningNeeded,
                ProcessingRequirement::ValidationRequired
            ]
        );
    }

    #[test]
    fn test_date_range() {
        let form = MetadataForm {
            date_range_end: Some("2024-03-31".to_string()),
            ..valid_form()
        };
        let range = form.into_metadata().unwrap().research.date_range.unwrap();
        assert!(range.start.is_none());
        assert_eq!(range.end.as_deref(), Some("2024-03-31"));

        let form = MetadataForm {
            date_range_start: Some("31/03/2024".to_string()),
            ..valid_form()
        };
        assert_eq!(field_of(form.into_metadata().unwrap_err()), "date_range_start");
    }

    #[test]
    fn test_validate_project_name_standalone() {
        assert_eq!(validate_project_name(" Acme Corp ").unwrap(), "Acme Corp");
        assert_eq!(field_of(validate_project_name("a/b").unwrap_err()), "project_name");
        assert_eq!(field_of(validate_project_name("").unwrap_err()), "project_name");
    }
}
