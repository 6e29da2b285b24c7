use super::client::AnalysisClient;
use super::metadata::extract_document_metadata;
use super::orchestrator::ComparisonOrchestrator;
use super::MatchError;
use crate::models::{AnalysisResult, BankTemplate, ComparisonMetadata, DocumentMetadata};

/// The selected template, plus the comparison that selected it when one
/// ran. An explicit bank override selects without any analysis call, so
/// `result` is `None` in that case.
#[derive(Debug)]
pub struct TemplateMatch {
    pub template: BankTemplate,
    pub result: Option<AnalysisResult>,
}

/// Picks the comparison baseline for a candidate check: an explicitly
/// named bank when given, otherwise the stored template with the highest
/// comparison score.
pub struct TemplateMatcher<'a, C: AnalysisClient> {
    orchestrator: &'a ComparisonOrchestrator<'a, C>,
}

impl<'a, C: AnalysisClient> TemplateMatcher<'a, C> {
    pub fn new(orchestrator: &'a ComparisonOrchestrator<'a, C>) -> Self {
        Self { orchestrator }
    }

    /// Find the best template for a candidate.
    ///
    /// With an override name, the lookup is by name only and makes no
    /// analysis calls. Without one, every stored template is compared and
    /// the strictly greatest score wins; ties keep the first template in
    /// stored order. A failed per-template comparison is logged and
    /// excluded rather than aborting the match.
    pub fn find_best(
        &self,
        candidate_pdf: &str,
        candidate_meta: &DocumentMetadata,
        templates: &[BankTemplate],
        override_name: Option<&str>,
    ) -> Result<TemplateMatch, MatchError> {
        if let Some(name) = override_name {
            return templates
                .iter()
                .find(|t| t.name == name)
                .map(|t| TemplateMatch {
                    template: t.clone(),
                    result: None,
                })
                .ok_or(MatchError::NoTemplateAvailable);
        }

        let mut best: Option<TemplateMatch> = None;
        for template in templates {
            // Template metadata is derived fresh for every comparison.
            let metadata = ComparisonMetadata {
                template: extract_document_metadata(&template.sample_check),
                verified: candidate_meta.clone(),
            };

            match self.orchestrator.compare(
                &template.sample_check,
                candidate_pdf,
                &template.metadata,
                &metadata,
            ) {
                Ok(result) => {
                    let is_better = best
                        .as_ref()
                        .and_then(|b| b.result.as_ref())
                        .map(|r| result.score > r.score)
                        .unwrap_or(true);
                    if is_better {
                        best = Some(TemplateMatch {
                            template: template.clone(),
                            result: Some(result),
                        });
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        template = %template.name,
                        error = %e,
                        "Template comparison failed, excluding from match"
                    );
                }
            }
        }

        best.ok_or(MatchError::NoTemplateAvailable)
    }
}
