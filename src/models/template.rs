use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored reference check plus bank metadata, used as the comparison
/// baseline for all candidate checks of that bank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankTemplate {
    pub id: Uuid,
    pub name: String,
    /// Base64-encoded sample check PDF, optionally with a data-URI prefix.
    pub sample_check: String,
    pub metadata: TemplateMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateMetadata {
    pub bank_name: String,
    pub check_format: String,
    pub date_added: DateTime<Utc>,
}

impl BankTemplate {
    pub fn new(name: &str, sample_check: String, bank_name: &str, check_format: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            sample_check,
            metadata: TemplateMetadata {
                bank_name: bank_name.to_string(),
                check_format: check_format.to_string(),
                date_added: Utc::now(),
            },
        }
    }
}
