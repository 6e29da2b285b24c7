pub mod client;
pub mod matcher;
pub mod metadata;
pub mod orchestrator;
pub mod prompt;
pub mod sanitize;

pub use client::*;
pub use matcher::*;
pub use metadata::*;
pub use orchestrator::*;
pub use prompt::*;
pub use sanitize::*;

use thiserror::Error;

/// The analysis text could not be turned into a structured result, even
/// after repair. Surfaced to the caller, never retried here.
#[derive(Error, Debug)]
#[error("Malformed analysis response: {0}")]
pub struct MalformedResponse(pub String);

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Analysis service is not reachable at {0}")]
    Connection(String),

    #[error("Analysis service returned error (status {status}): {body}")]
    Service { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("No compatible vision model available")]
    NoModelAvailable,

    #[error(transparent)]
    Malformed(#[from] MalformedResponse),
}

#[derive(Error, Debug)]
pub enum MatchError {
    #[error("No bank template available for comparison")]
    NoTemplateAvailable,
}
