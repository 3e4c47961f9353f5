//! File-system document loader

use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::{DocumentConfig, DocumentExtractor, ExtractionError};

/// Loads PDF, text and markdown documents from disk
#[derive(Debug, Clone, Default)]
pub struct FileDocumentLoader {
    search_dirs: Vec<PathBuf>,
}

/// Extracted text with basic file statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentMetadata {
    pub file_name: String,
    pub format: String,
    pub word_count: usize,
    pub char_count: usize,
    pub size_kib: f64,
    /// Only known for PDFs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<usize>,
    pub text: String,
}

impl FileDocumentLoader {
    pub fn new(search_dirs: Vec<PathBuf>) -> Self {
        Self { search_dirs }
    }

    pub fn from_config(config: &DocumentConfig) -> Self {
        Self::new(config.search_dirs.clone())
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    /// Resolve `locator` as given, then by file name in each search directory
    pub async fn resolve(&self, locator: &str) -> Result<PathBuf, ExtractionError> {
        let direct = PathBuf::from(locator);
        if is_file(&direct).await {
            return Ok(direct);
        }

        if let Some(name) = direct.file_name() {
            for dir in &self.search_dirs {
                let candidate = dir.join(name);
                if is_file(&candidate).await {
                    debug!(locator = %locator, dir = %dir.display(), "Resolved document in search directory");
                    return Ok(candidate);
                }
            }
        }

        Err(ExtractionError::NotFound {
            locator: locator.to_string(),
            searched: self.search_dirs.clone(),
        })
    }

    /// Extract text along with file statistics
    pub async fn extract_with_metadata(&self, locator: &str) -> Result<DocumentMetadata, ExtractionError> {
        let path = self.resolve(locator).await?;
        let (text, page_count) = self.extract_path(&path).await?;

        let size = tokio::fs::metadata(&path)
            .await
            .map_err(|source| ExtractionError::Io {
                path: path.clone(),
                source,
            })?
            .len();

        Ok(DocumentMetadata {
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            format: extension_of(&path),
            word_count: text.split_whitespace().count(),
            char_count: text.chars().count(),
            size_kib: size as f64 / 1024.0,
            page_count,
            text,
        })
    }

    /// Cleaned text plus the page count when the format has pages
    async fn extract_path(&self, path: &Path) -> Result<(String, Option<usize>), ExtractionError> {
        let extension = extension_of(path);

        let (raw, page_count) = match extension.as_str() {
            ".pdf" => {
                let pages = read_pdf(path).await?;
                (pages.join("\n"), Some(pages.len()))
            }
            ".txt" | ".md" | ".markdown" => (read_text_file(path).await?, None),
            _ => return Err(ExtractionError::UnsupportedFormat { extension }),
        };

        let text = clean_text(&raw);
        if text.is_empty() {
            return Err(ExtractionError::Empty {
                path: path.to_path_buf(),
            });
        }

        info!(
            path = %path.display(),
            format = %extension,
            pages = ?page_count,
            words = text.split_whitespace().count(),
            chars = text.chars().count(),
            "Document extracted"
        );

        Ok((text, page_count))
    }
}

#[async_trait]
impl DocumentExtractor for FileDocumentLoader {
    async fn extract_text(&self, locator: &str) -> Result<String, ExtractionError> {
        let path = self.resolve(locator).await?;
        let (text, _) = self.extract_path(&path).await?;
        Ok(text)
    }
}

/// Trim every line and collapse runs of blank lines into one
pub fn clean_text(text: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut previous_blank = false;

    for line in text.lines() {
        let line = line.trim();
        if !line.is_empty() {
            lines.push(line);
            previous_blank = false;
        } else if !previous_blank {
            lines.push("");
            previous_blank = true;
        }
    }

    lines.join("\n").trim().to_string()
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// Text of each page, in order
async fn read_pdf(path: &Path) -> Result<Vec<String>, ExtractionError> {
    let owned = path.to_path_buf();

    // pdf-extract is synchronous and can be slow on large files
    let result = tokio::task::spawn_blocking(move || pdf_extract::extract_text_by_pages(&owned)).await;

    match result {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(ExtractionError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }),
        Err(e) => Err(ExtractionError::Decode {
            path: path.to_path_buf(),
            reason: format!("PDF parser aborted: {}", e),
        }),
    }
}

async fn read_text_file(path: &Path) -> Result<String, ExtractionError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| ExtractionError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            warn!(path = %path.display(), "File is not valid UTF-8, decoding as Latin-1");
            Ok(e.into_bytes().iter().map(|&b| b as char).collect())
        }
    }
}
