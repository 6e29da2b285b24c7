use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-field verdict from the analysis service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldComparison {
    /// The field exists on the candidate check.
    pub present: bool,
    /// The field's content matches the template.
    pub matches: bool,
    pub comment: String,
}

/// Sanitized result of one template-vs-candidate comparison.
///
/// Invariants: `score` lies in [0, 100]; every string field is non-empty
/// (placeholder text substitutes for anything the service omitted).
/// Serde names mirror the analysis service's response schema so a
/// serialized result sanitizes back to an equal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub score: f64,
    pub field_comparison: BTreeMap<String, FieldComparison>,
    pub layout_match: String,
    pub security_features: String,
    pub stamp_signature: String,
    pub metadata_comparison: String,
    pub overall_assessment: String,
    pub missing_fields: Vec<String>,
}
