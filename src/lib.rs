// DCP Analyzer - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod normalizer;
pub mod agreement;
pub mod section;
pub mod competency;
pub mod years;
pub mod analyzer;
pub mod decoder;
pub mod batch;
pub mod report;
pub mod error;

// Re-export commonly used types
pub use normalizer::{normalize_text, normalize_optional};
pub use agreement::{
    AgreementNumberExtractor, AgreementMatch, MatchTier,
    extract_agreement_number,
};
pub use section::{Section, SectionLocator, SectionMarkers};
pub use competency::{
    CompetencyScanner, CompetencyToken, ScanOutcome, ScannedToken, TokenClass,
    scan_tokens, is_date_tail, accepted_competencies,
    MAX_DIAGNOSTIC_EXAMPLES,
};
pub use years::{YearStatus, YearMap, build_year_status};
pub use analyzer::{
    DcpAnalyzer, AnalyzerConfig, Document, DocumentResult, ExtractionDiagnostics,
    analyze_document,
};
pub use decoder::{
    DocumentDecoder, DocumentKind, DecoderRegistry, PlainTextDecoder,
    detect_kind,
};
#[cfg(feature = "pdf")]
pub use decoder::PdfDecoder;
pub use batch::{
    Batch, BatchItem, BatchResponse, BatchSummary, DocumentFailure, Upload,
    analyze_batch, analyze_upload,
    MAX_BATCH_SIZE,
};
pub use report::{matrix_rows, matrix_title, write_matrix_csv};
pub use error::{DcpError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default log filter for the binaries when RUST_LOG is unset
pub const DEFAULT_LOG_FILTER: &str = "dcp_analyzer=info,dcp_server=info,tower_http=info";
