use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Class label the classifier assigns to outcomes that describe software.
pub const SOFTWARE_CLASS: &str = "1";

/// Response of `GET /analyze-project/{ref}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectAnalysis {
    #[serde(default)]
    pub outcomes_analysis: Vec<OutcomeAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl ProjectAnalysis {
    /// The server-reported failure, if the `error` field carries anything meaningful.
    pub fn error_message(&self) -> Option<String> {
        match self.error.as_ref()? {
            Value::Null | Value::Bool(false) => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// One research outcome as analyzed by the remote service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutcomeAnalysis {
    #[serde(default)]
    pub classification: Option<Classification>,
    /// Extraction text. Only string values are meaningful; anything else is ignored.
    #[serde(default)]
    pub final_output: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Classification {
    #[serde(default)]
    pub predicted_class: Option<Value>,
}

impl OutcomeAnalysis {
    /// True when the classifier labeled this outcome as software.
    /// The label must be the string `"1"`; a numeric `1` does not count.
    pub fn is_software(&self) -> bool {
        matches!(
            self.classification.as_ref().and_then(|c| c.predicted_class.as_ref()),
            Some(Value::String(class)) if class == SOFTWARE_CLASS
        )
    }

    pub fn final_output_text(&self) -> Option<&str> {
        match self.final_output.as_ref()? {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Software outcome whose extraction text carries actual detail.
    pub fn is_extracted_software(&self) -> bool {
        self.is_software()
            && self
                .final_output_text()
                .is_some_and(crate::extract::has_extractable_detail)
    }
}

/// A software product ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftwareProduct {
    pub name: String,
    pub description: String,
    pub urls: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn outcome(value: Value) -> OutcomeAnalysis {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn string_class_one_is_software() {
        let o = outcome(json!({"classification": {"predicted_class": "1"}}));
        assert!(o.is_software());
    }

    #[test]
    fn numeric_class_is_not_software() {
        let o = outcome(json!({"classification": {"predicted_class": 1}}));
        assert!(!o.is_software());
    }

    #[test]
    fn missing_classification_is_not_software() {
        assert!(!outcome(json!({"final_output": "Tool; https://x.org"})).is_software());
    }

    #[test]
    fn non_string_final_output_is_ignored() {
        let o = outcome(json!({
            "classification": {"predicted_class": "1"},
            "final_output": {"name": "Tool"}
        }));
        assert!(o.final_output_text().is_none());
        assert!(!o.is_extracted_software());
    }

    #[test]
    fn error_message_ignores_empty_values() {
        let a: ProjectAnalysis = serde_json::from_value(json!({"error": ""})).unwrap();
        assert!(a.error_message().is_none());
        let a: ProjectAnalysis = serde_json::from_value(json!({"error": null})).unwrap();
        assert!(a.error_message().is_none());
        let a: ProjectAnalysis =
            serde_json::from_value(json!({"error": "project not found"})).unwrap();
        assert_eq!(a.error_message().as_deref(), Some("project not found"));
    }
}
