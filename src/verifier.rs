use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{BankTemplate, ComparisonMetadata, VerificationResult};
use crate::pipeline::{
    extract_document_metadata, AnalysisClient, AnalysisError, ComparisonOrchestrator, MatchError,
    TemplateMatcher,
};
use crate::store::{HistoryStore, KeyValueStore, StoreError, TemplateStore};

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Match(#[from] MatchError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A check submitted for verification.
#[derive(Debug, Clone)]
pub struct CandidateCheck {
    pub file_name: String,
    /// Base64-encoded PDF, optionally with a data-URI prefix.
    pub payload: String,
}

/// End-to-end verification flow: derive metadata, pick a template
/// (explicit bank or auto-match), compare, persist the immutable result.
pub struct VerificationService<'a, C: AnalysisClient, S: KeyValueStore> {
    orchestrator: ComparisonOrchestrator<'a, C>,
    templates: TemplateStore<'a, S>,
    history: HistoryStore<'a, S>,
}

impl<'a, C: AnalysisClient, S: KeyValueStore> VerificationService<'a, C, S> {
    pub fn new(client: &'a C, model: &str, store: &'a S) -> Self {
        Self {
            orchestrator: ComparisonOrchestrator::new(client, model),
            templates: TemplateStore::new(store),
            history: HistoryStore::new(store),
        }
    }

    /// Register a new bank template from a sample check.
    pub fn register_template(
        &self,
        name: &str,
        sample_check: String,
        bank_name: &str,
        check_format: &str,
    ) -> Result<BankTemplate, VerifyError> {
        let template = BankTemplate::new(name, sample_check, bank_name, check_format);
        self.templates.add(&template)?;
        tracing::info!(template = %template.name, "Bank template registered");
        Ok(template)
    }

    /// Verify a single candidate check.
    pub fn verify(
        &self,
        candidate: &CandidateCheck,
        bank_override: Option<&str>,
    ) -> Result<VerificationResult, VerifyError> {
        self.verify_numbered(candidate, 1, bank_override)
    }

    /// Verify a batch of candidates. Each document is an independent
    /// task: a failure is reported against that document only and never
    /// cancels or corrupts the others.
    pub fn verify_batch(
        &self,
        candidates: &[CandidateCheck],
        bank_override: Option<&str>,
    ) -> Vec<Result<VerificationResult, VerifyError>> {
        candidates
            .iter()
            .enumerate()
            .map(|(index, candidate)| {
                let outcome = self.verify_numbered(candidate, index as u32 + 1, bank_override);
                if let Err(e) = &outcome {
                    tracing::warn!(file = %candidate.file_name, error = %e, "Verification failed");
                }
                outcome
            })
            .collect()
    }

    fn verify_numbered(
        &self,
        candidate: &CandidateCheck,
        check_number: u32,
        bank_override: Option<&str>,
    ) -> Result<VerificationResult, VerifyError> {
        let candidate_meta = extract_document_metadata(&candidate.payload);
        let stored = self.templates.list()?;

        let matcher = TemplateMatcher::new(&self.orchestrator);
        let matched = matcher.find_best(
            &candidate.payload,
            &candidate_meta,
            &stored,
            bank_override,
        )?;

        let metadata = ComparisonMetadata {
            template: extract_document_metadata(&matched.template.sample_check),
            verified: candidate_meta,
        };

        // The auto-match already compared against the winner; an explicit
        // override skipped comparison entirely, so run it now.
        let details = match matched.result {
            Some(details) => details,
            None => self.orchestrator.compare(
                &matched.template.sample_check,
                &candidate.payload,
                &matched.template.metadata,
                &metadata,
            )?,
        };

        let result = VerificationResult {
            id: Uuid::new_v4(),
            file_name: candidate.file_name.clone(),
            check_number,
            bank_name: matched.template.metadata.bank_name.clone(),
            check_pdf: candidate.payload.clone(),
            template_pdf: matched.template.sample_check.clone(),
            timestamp: Utc::now(),
            score: details.score,
            metadata,
            details,
        };

        self.history.append(result.clone())?;
        tracing::info!(
            file = %result.file_name,
            bank = %result.bank_name,
            score = result.score,
            "Verification recorded"
        );
        Ok(result)
    }

    pub fn list_templates(&self) -> Result<Vec<BankTemplate>, VerifyError> {
        Ok(self.templates.list()?)
    }

    pub fn list_history(&self) -> Result<Vec<VerificationResult>, VerifyError> {
        Ok(self.history.list()?)
    }
}
