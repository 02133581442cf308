//! Document text extraction seam.
//!
//! Only plain-text formats are decoded here; PDF and Word decoding belong to
//! other [`TextExtractor`] implementations.

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use crate::error::{AssessmentError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub text: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, path: &Path) -> Result<ExtractedDocument>;
}

/// Abandons extraction after `limit`.
pub async fn extract_with_timeout(
    extractor: &dyn TextExtractor,
    path: &Path,
    limit: Duration,
) -> Result<ExtractedDocument> {
    tokio::time::timeout(limit, extractor.extract(path))
        .await
        .map_err(|_| AssessmentError::ExtractionTimeout(limit))?
}

#[derive(Debug, Clone, Default)]
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    fn is_supported(mime: &mime_guess::Mime) -> bool {
        mime.type_() == mime_guess::mime::TEXT
            || mime.subtype() == mime_guess::mime::JSON
            || mime.essence_str() == "application/xml"
    }
}

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, path: &Path) -> Result<ExtractedDocument> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document")
            .to_string();
        let mime = mime_guess::from_path(path).first_or_octet_stream();

        if !Self::is_supported(&mime) {
            return Err(AssessmentError::UnsupportedDocument {
                name,
                mime_type: mime.to_string(),
            });
        }

        let bytes = tokio::fs::read(path).await?;
        let text = String::from_utf8(bytes).map_err(|e| AssessmentError::CorruptedDocument {
            name: name.clone(),
            details: e.to_string(),
        })?;

        if text.trim().is_empty() {
            return Err(AssessmentError::EmptyDocument(name));
        }

        debug!("Extracted {} chars from {}", text.len(), name);

        let mut metadata = BTreeMap::new();
        metadata.insert("file_name".to_string(), name);
        metadata.insert("mime_type".to_string(), mime.to_string());
        metadata.insert("characters".to_string(), text.chars().count().to_string());

        Ok(ExtractedDocument { text, metadata })
    }
}
