//! Document text extraction
//!
//! The pipeline reads documents through [`DocumentExtractor`]; the bundled
//! [`FileDocumentLoader`] handles PDF, plain text and markdown files on disk.

pub mod loader;

pub use loader::{clean_text, DocumentMetadata, FileDocumentLoader};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Extraction errors
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("Document not found: {locator}")]
    NotFound {
        locator: String,
        searched: Vec<PathBuf>,
    },

    #[error("Unsupported document format: '{extension}'")]
    UnsupportedFormat { extension: String },

    #[error("Failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Document {path} contains no text")]
    Empty { path: PathBuf },
}

impl ExtractionError {
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "document_not_found",
            Self::UnsupportedFormat { .. } => "unsupported_format",
            Self::Decode { .. } => "decode_failed",
            Self::Io { .. } => "io_error",
            Self::Empty { .. } => "empty_document",
        }
    }

    /// Likely fix for the failure
    pub fn hint(&self) -> String {
        match self {
            Self::NotFound { searched, .. } if !searched.is_empty() => {
                let dirs: Vec<String> = searched.iter().map(|d| d.display().to_string()).collect();
                format!("Check the file path; also searched: {}", dirs.join(", "))
            }
            Self::NotFound { .. } => "Check the file path".to_string(),
            Self::UnsupportedFormat { .. } => {
                format!("Supported formats: {}", SUPPORTED_EXTENSIONS.join(", "))
            }
            Self::Decode { .. } => {
                "The file may be scanned or corrupt; export it as text and retry".to_string()
            }
            Self::Io { .. } => "Check file permissions".to_string(),
            Self::Empty { .. } => "Provide a document with extractable text".to_string(),
        }
    }
}

/// File extensions the loader accepts
pub const SUPPORTED_EXTENSIONS: [&str; 4] = [".pdf", ".txt", ".md", ".markdown"];

/// Source of document text
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    /// Extract the full text behind `locator`
    async fn extract_text(&self, locator: &str) -> Result<String, ExtractionError>;
}

/// Document loading configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig {
    /// Directories searched by file name when a locator does not exist as given
    #[serde(default = "default_search_dirs")]
    pub search_dirs: Vec<PathBuf>,
}

fn default_search_dirs() -> Vec<PathBuf> {
    ["data/input", "data/reference", "."]
        .iter()
        .map(PathBuf::from)
        .collect()
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            search_dirs: default_search_dirs(),
        }
    }
}
