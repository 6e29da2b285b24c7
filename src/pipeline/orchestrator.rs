use super::client::AnalysisClient;
use super::prompt::{build_comparison_prompt, COMPARISON_SYSTEM_PROMPT};
use super::sanitize::sanitize_response;
use super::AnalysisError;
use crate::models::{AnalysisResult, ComparisonMetadata, TemplateMetadata};

/// Runs one template-vs-candidate comparison: build the prompt, make a
/// single analysis call, sanitize the answer. Does not persist anything
/// and mutates no shared state.
pub struct ComparisonOrchestrator<'a, C: AnalysisClient> {
    client: &'a C,
    model: String,
}

impl<'a, C: AnalysisClient> ComparisonOrchestrator<'a, C> {
    pub fn new(client: &'a C, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
        }
    }

    pub fn compare(
        &self,
        template_pdf: &str,
        candidate_pdf: &str,
        bank: &TemplateMetadata,
        metadata: &ComparisonMetadata,
    ) -> Result<AnalysisResult, AnalysisError> {
        let prompt = build_comparison_prompt(template_pdf, candidate_pdf, bank, metadata);
        let raw = self
            .client
            .analyze(&self.model, &prompt, COMPARISON_SYSTEM_PROMPT)?;

        let result = sanitize_response(&raw)?;
        tracing::debug!(
            bank = %bank.bank_name,
            score = result.score,
            "Comparison completed"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentMetadata;
    use crate::pipeline::client::MockAnalysisClient;
    use chrono::Utc;

    fn bank() -> TemplateMetadata {
        TemplateMetadata {
            bank_name: "Alpha Bank".into(),
            check_format: "standard".into(),
            date_added: Utc::now(),
        }
    }

    fn metadata() -> ComparisonMetadata {
        ComparisonMetadata {
            template: DocumentMetadata::unknown(),
            verified: DocumentMetadata::unknown(),
        }
    }

    #[test]
    fn compare_sanitizes_service_response() {
        let client = MockAnalysisClient::new(
            r#"```json
{"score": "88", "layoutMatch": "Close match", "missingFields": []}
```"#,
        );
        let orchestrator = ComparisonOrchestrator::new(&client, "llava");
        let result = orchestrator
            .compare("AAAA", "BBBB", &bank(), &metadata())
            .unwrap();
        assert!((result.score - 88.0).abs() < f64::EPSILON);
        assert_eq!(result.layout_match, "Close match");
        assert_eq!(client.calls(), 1);
    }

    #[test]
    fn unsanitizable_response_is_analysis_error() {
        let client = MockAnalysisClient::new("I cannot compare these documents.");
        let orchestrator = ComparisonOrchestrator::new(&client, "llava");
        let err = orchestrator
            .compare("AAAA", "BBBB", &bank(), &metadata())
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Malformed(_)));
    }

    #[test]
    fn service_failure_propagates() {
        let client = MockAnalysisClient::with_responses(vec![Err("overloaded".into())]);
        let orchestrator = ComparisonOrchestrator::new(&client, "llava");
        let err = orchestrator
            .compare("AAAA", "BBBB", &bank(), &metadata())
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Service { status: 500, .. }));
    }
}
