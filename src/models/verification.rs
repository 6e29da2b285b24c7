use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AnalysisResult, ComparisonMetadata};

/// Outcome of one completed verification. Created once per successful
/// comparison, immutable thereafter, appended to history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub id: Uuid,
    pub file_name: String,
    /// Position of the check within its submission batch, 1-based.
    pub check_number: u32,
    pub bank_name: String,
    /// Base64 PDF of the verified check.
    pub check_pdf: String,
    /// Base64 PDF of the template it was compared against.
    pub template_pdf: String,
    pub timestamp: DateTime<Utc>,
    pub score: f64,
    pub metadata: ComparisonMetadata,
    pub details: AnalysisResult,
}
