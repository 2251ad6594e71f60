// 📦 Batch Processing
// Decode + analyze up to 10 uploads, one result entry per upload.
//
// A decode failure only affects its own entry; the rest of the batch still runs.

use crate::analyzer::{DcpAnalyzer, Document, DocumentResult};
use crate::decoder::DecoderRegistry;
use crate::error::{DcpError, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const MAX_BATCH_SIZE: usize = 10;

// ============================================================================
// INPUT
// ============================================================================

/// Raw uploaded file, before decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Upload {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

/// A validated, non-empty list of uploads
#[derive(Debug, Clone)]
pub struct Batch {
    uploads: Vec<Upload>,
}

impl Batch {
    /// Reject empty batches and batches larger than `max`
    pub fn new(uploads: Vec<Upload>, max: usize) -> Result<Self> {
        if uploads.is_empty() {
            return Err(DcpError::EmptyBatch);
        }

        if uploads.len() > max {
            return Err(DcpError::TooManyDocuments {
                count: uploads.len(),
                max,
            });
        }

        Ok(Batch { uploads })
    }

    /// Non-empty batch without an upper bound (local CLI runs)
    pub fn unbounded(uploads: Vec<Upload>) -> Result<Self> {
        Self::new(uploads, usize::MAX)
    }

    pub fn len(&self) -> usize {
        self.uploads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uploads.is_empty()
    }

    pub fn uploads(&self) -> &[Upload] {
        &self.uploads
    }

    pub fn into_uploads(self) -> Vec<Upload> {
        self.uploads
    }
}

// ============================================================================
// OUTPUT
// ============================================================================

/// Per-upload failure entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFailure {
    pub file_name: String,
    pub ok: bool,
    pub error: String,
}

impl DocumentFailure {
    pub fn new(file_name: impl Into<String>, error: impl Into<String>) -> Self {
        DocumentFailure {
            file_name: file_name.into(),
            ok: false,
            error: error.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchItem {
    Analyzed(DocumentResult),
    Failed(DocumentFailure),
}

impl BatchItem {
    pub fn file_name(&self) -> &str {
        match self {
            BatchItem::Analyzed(result) => &result.file_name,
            BatchItem::Failed(failure) => &failure.file_name,
        }
    }

    pub fn result(&self) -> Option<&DocumentResult> {
        match self {
            BatchItem::Analyzed(result) => Some(result),
            BatchItem::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, BatchItem::Failed(_))
    }
}

/// `{ "ok": true, "items": [...] }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResponse {
    pub ok: bool,
    pub items: Vec<BatchItem>,
}

impl BatchResponse {
    pub fn new(items: Vec<BatchItem>) -> Self {
        BatchResponse { ok: true, items }
    }

    pub fn summary(&self) -> BatchSummary {
        let analyzed: Vec<&DocumentResult> = self.items.iter().filter_map(BatchItem::result).collect();

        BatchSummary {
            total_documents: self.items.len(),
            analyzed_count: analyzed.len(),
            failed_count: self.items.len() - analyzed.len(),
            complete_count: analyzed.iter().filter(|r| r.is_complete()).count(),
            needs_review_count: analyzed
                .iter()
                .filter(|r| r.diagnostics.needs_review())
                .count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total_documents: usize,
    pub analyzed_count: usize,
    pub failed_count: usize,
    pub complete_count: usize,
    pub needs_review_count: usize,
}

impl BatchSummary {
    pub fn summary(&self) -> String {
        format!(
            "{} documents: {} analyzed, {} failed | {} complete, {} need review",
            self.total_documents,
            self.analyzed_count,
            self.failed_count,
            self.complete_count,
            self.needs_review_count
        )
    }
}

// ============================================================================
// PROCESSING
// ============================================================================

/// Decode and analyze one upload; decode errors become a failure entry
pub fn analyze_upload(analyzer: &DcpAnalyzer, decoders: &DecoderRegistry, upload: &Upload) -> BatchItem {
    match decoders.decode(&upload.file_name, &upload.bytes) {
        Ok(text) => BatchItem::Analyzed(analyzer.analyze(&Document::new(upload.file_name.clone(), text))),
        Err(e) => {
            warn!(file = %upload.file_name, error = %e, "document could not be decoded");
            BatchItem::Failed(DocumentFailure::new(upload.file_name.clone(), e.to_string()))
        }
    }
}

/// Analyze every upload in order
pub fn analyze_batch(analyzer: &DcpAnalyzer, decoders: &DecoderRegistry, batch: &Batch) -> BatchResponse {
    let items = batch
        .uploads()
        .iter()
        .map(|upload| analyze_upload(analyzer, decoders, upload))
        .collect();

    let response = BatchResponse::new(items);
    info!("{}", response.summary().summary());
    response
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn text_upload(name: &str, text: &str) -> Upload {
        Upload::new(name, text.as_bytes())
    }

    #[test]
    fn test_empty_batch_rejected() {
        let err = Batch::new(vec![], MAX_BATCH_SIZE).unwrap_err();
        assert!(matches!(err, DcpError::EmptyBatch));
        assert!(Batch::unbounded(vec![]).is_err());
    }

    #[test]
    fn test_oversized_batch_rejected() {
        let uploads: Vec<Upload> = (0..11).map(|i| text_upload(&format!("{}.txt", i), "")).collect();
        let err = Batch::new(uploads, MAX_BATCH_SIZE).unwrap_err();

        assert!(matches!(err, DcpError::TooManyDocuments { count: 11, max: 10 }));
    }

    #[test]
    fn test_batch_at_limit_accepted() {
        let uploads: Vec<Upload> = (0..10).map(|i| text_upload(&format!("{}.txt", i), "")).collect();
        let batch = Batch::new(uploads, MAX_BATCH_SIZE).unwrap();
        assert_eq!(batch.len(), 10);
        assert!(!batch.is_empty());
    }

    #[test]
    fn test_decode_failure_is_isolated() {
        let batch = Batch::new(
            vec![
                text_upload("a.txt", "3. LANÇAMENTOS DA RUBRICA 01/2020 TOTAL"),
                Upload::new("planilha.xlsx", b"PK\x03\x04".to_vec()),
                text_upload("b.txt", "Número do acordo: 4321/2019"),
            ],
            MAX_BATCH_SIZE,
        )
        .unwrap();

        let response = analyze_batch(&DcpAnalyzer::new(), &DecoderRegistry::new(), &batch);

        assert!(response.ok);
        assert_eq!(response.items.len(), 3);
        assert_eq!(response.items[0].file_name(), "a.txt");
        assert!(!response.items[0].is_failed());
        assert!(response.items[1].is_failed());
        assert_eq!(
            response.items[2].result().and_then(|r| r.agreement_number.as_deref()),
            Some("4321/2019")
        );

        let summary = response.summary();
        assert_eq!(summary.total_documents, 3);
        assert_eq!(summary.analyzed_count, 2);
        assert_eq!(summary.failed_count, 1);
        assert!(!summary.summary().is_empty());
    }

    #[test]
    fn test_response_json_shape() {
        let response = BatchResponse::new(vec![
            BatchItem::Analyzed(crate::analyzer::analyze_document(&Document::new("a.pdf", ""))),
            BatchItem::Failed(DocumentFailure::new("b.pdf", "bad pdf")),
        ]);

        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["ok"], true);
        assert_eq!(json["items"][0]["fileName"], "a.pdf");
        assert!(json["items"][0].get("ok").is_none());
        assert_eq!(json["items"][1]["ok"], false);
        assert_eq!(json["items"][1]["error"], "bad pdf");
    }

    #[test]
    fn test_response_json_round_trips_failures() {
        let json = r#"{"ok":true,"items":[{"fileName":"b.pdf","ok":false,"error":"bad pdf"}]}"#;
        let response: BatchResponse = serde_json::from_str(json).unwrap();
        assert!(response.items[0].is_failed());
    }
}
