use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::models::document::DocumentKind;
use crate::taxonomy::TaxonomyError;

/// Pipeline stage names, used for deadline reporting and stage logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Normalize,
    Classify,
    Extract,
    Match,
    Score,
    Feedback,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Normalize => "normalize",
            Stage::Classify => "classify",
            Stage::Extract => "extract",
            Stage::Match => "match",
            Stage::Score => "score",
            Stage::Feedback => "feedback",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request-level failures of the compatibility pipeline.
///
/// Everything except `Configuration` is the caller's to fix and retry.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("{kind} text is empty")]
    EmptyInput { kind: DocumentKind },

    #[error("{kind} text is {size} bytes, limit is {limit}")]
    InputTooLarge {
        kind: DocumentKind,
        size: usize,
        limit: usize,
    },

    #[error("job description contains no recognizable skills")]
    InsufficientData,

    #[error("deadline exceeded before the {stage} stage ({elapsed_ms} ms elapsed)")]
    Timeout { stage: Stage, elapsed_ms: u64 },

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<TaxonomyError> for ScanError {
    fn from(e: TaxonomyError) -> Self {
        ScanError::Configuration(e.to_string())
    }
}
