use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Period the research data covers. Endpoints are `YYYY-MM-DD` strings; their order is
/// not checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DateRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl DateRange {
    /// A range with at least one endpoint, or `None`
    pub fn from_parts(start: Option<String>, end: Option<String>) -> Option<Self> {
        if start.is_none() && end.is_none() {
            None
        } else {
            Some(DateRange { start, end })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ResearchPhase {
    #[serde(rename = "raw-data")]
    RawData,
    #[serde(rename = "processed")]
    Processed,
    #[serde(rename = "analysis")]
    Analysis,
    #[serde(rename = "results")]
    Results,
}

form_enum!(ResearchPhase, "research phase", {
    RawData => "raw-data",
    Processed => "processed",
    Analysis => "analysis",
    Results => "results",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyLevel {
    Public,
    Internal,
    Confidential,
}

form_enum!(PrivacyLevel, "privacy level", {
    Public => "public",
    Internal => "internal",
    Confidential => "confidential",
});

/// Research context describing an uploaded file. Only ever built through
/// `MetadataForm::into_metadata`, so a value of this type has passed every field rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ResearchMetadata {
    /// Trimmed; letters, digits, spaces, hyphens and underscores only
    pub project_name: String,
    pub hypothesis: String,
    pub data_source: String,
    pub collection_method: String,
    pub experiment_id: Option<String>,
    pub date_range: Option<DateRange>,
    pub research_phase: Option<ResearchPhase>,
    pub privacy_level: Option<PrivacyLevel>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_research_phase_wire_values() {
        assert_eq!("raw-data".parse::<ResearchPhase>(), Ok(ResearchPhase::RawData));
        assert_eq!(ResearchPhase::Results.to_string(), "results");
        assert!("Raw-Data".parse::<ResearchPhase>().is_err());
        assert_eq!(
            serde_json::to_value(ResearchPhase::RawData).unwrap(),
            serde_json::json!("raw-data")
        );
    }

    #[test]
    fn test_privacy_level_error_lists_allowed_values() {
        let err = "secret".parse::<PrivacyLevel>().unwrap_err();
        assert_eq!(
            err,
            "Invalid privacy level 'secret'. Allowed values: public, internal, confidential"
        );
    }

    #[test]
    fn test_date_range_from_parts() {
        assert_eq!(DateRange::from_parts(None, None), None);
        let range = DateRange::from_parts(Some("2024-01-01".to_string()), None).unwrap();
        assert_eq!(range.start.as_deref(), Some("2024-01-01"));
        assert!(range.end.is_none());
    }

    #[test]
    fn test_absent_optionals_serialize_as_null() {
        let metadata = ResearchMetadata {
            project_name: "Acme".to_string(),
            hypothesis: "h".to_string(),
            data_source: "s".to_string(),
            collection_method: "m".to_string(),
            experiment_id: None,
            date_range: None,
            research_phase: None,
            privacy_level: Some(PrivacyLevel::Internal),
        };
        let value = serde_json::to_value(&metadata).unwrap();
        assert!(value["experiment_id"].is_null());
        assert!(value["date_range"].is_null());
        assert_eq!(value["privacy_level"], "internal");
    }
}
