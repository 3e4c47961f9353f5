//! Crate-level error type

use thiserror::Error;

use crate::config::ConfigError;
use crate::documents::ExtractionError;
use crate::inference::InferenceError;
use crate::pipeline::PipelineError;
use crate::report::ReportError;
use crate::scoring::ScoringConfigError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Document(#[from] ExtractionError),
}

impl From<ScoringConfigError> for Error {
    fn from(e: ScoringConfigError) -> Self {
        Self::Config(ConfigError::Scoring(e))
    }
}

impl Error {
    /// Likely fix, when the failure has one
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::Pipeline(e) => e.hint(),
            Self::Inference(e) => Some(e.hint()),
            Self::Document(e) => Some(e.hint()),
            Self::Config(_) | Self::Report(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
