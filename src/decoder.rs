// 📄 Document Decoders
// Turns uploaded bytes into the plain text the extraction core reads.
//
// Same shape as a parser registry: detect the kind from the file name (or the
// PDF magic bytes), then hand the bytes to the matching decoder. The core never
// sees raw bytes.

use crate::error::{DcpError, Result};
use serde::{Deserialize, Serialize};

const PDF_MAGIC: &[u8] = b"%PDF-";

// ============================================================================
// CORE TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    Pdf,
    PlainText,
}

impl DocumentKind {
    pub fn name(&self) -> &str {
        match self {
            DocumentKind::Pdf => "PDF",
            DocumentKind::PlainText => "Plain text",
        }
    }
}

/// DocumentDecoder - bytes in, text out
///
/// Implementations must be shareable across worker threads: the server decodes
/// each upload of a batch on its own blocking task.
pub trait DocumentDecoder: Send + Sync {
    fn decode(&self, file_name: &str, bytes: &[u8]) -> Result<String>;

    fn kind(&self) -> DocumentKind;
}

/// Detect the document kind from the file name, falling back to content
///
/// # Examples:
/// ```
/// use dcp_analyzer::{detect_kind, DocumentKind};
/// assert_eq!(detect_kind("DCP_2021.PDF", b"").unwrap(), DocumentKind::Pdf);
/// assert_eq!(detect_kind("dcp.txt", b"").unwrap(), DocumentKind::PlainText);
/// ```
pub fn detect_kind(file_name: &str, bytes: &[u8]) -> Result<DocumentKind> {
    let lower = file_name.to_lowercase();

    if lower.ends_with(".pdf") || bytes.starts_with(PDF_MAGIC) {
        return Ok(DocumentKind::Pdf);
    }

    if lower.ends_with(".txt") {
        return Ok(DocumentKind::PlainText);
    }

    Err(DcpError::UnsupportedDocument(file_name.to_string()))
}

// ============================================================================
// DECODERS
// ============================================================================

/// PDF text extraction via `pdf-extract`
#[cfg(feature = "pdf")]
pub struct PdfDecoder;

#[cfg(feature = "pdf")]
impl PdfDecoder {
    pub fn new() -> Self {
        PdfDecoder
    }
}

#[cfg(feature = "pdf")]
impl Default for PdfDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "pdf")]
impl DocumentDecoder for PdfDecoder {
    fn decode(&self, file_name: &str, bytes: &[u8]) -> Result<String> {
        let decode_error = |reason: String| DcpError::Decode {
            file_name: file_name.to_string(),
            reason,
        };

        // pdf-extract panics on some malformed files; keep that inside this document
        let extracted = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
            .map_err(|_| decode_error("PDF parser panicked".to_string()))?;

        extracted.map_err(|e| decode_error(e.to_string()))
    }

    fn kind(&self) -> DocumentKind {
        DocumentKind::Pdf
    }
}

/// Already-decoded text exports (UTF-8, invalid sequences replaced)
pub struct PlainTextDecoder;

impl PlainTextDecoder {
    pub fn new() -> Self {
        PlainTextDecoder
    }
}

impl Default for PlainTextDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentDecoder for PlainTextDecoder {
    fn decode(&self, _file_name: &str, bytes: &[u8]) -> Result<String> {
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    fn kind(&self) -> DocumentKind {
        DocumentKind::PlainText
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Picks the decoder for each upload
pub struct DecoderRegistry {
    decoders: Vec<Box<dyn DocumentDecoder>>,
}

impl DecoderRegistry {
    /// Every decoder compiled into this build
    pub fn new() -> Self {
        let mut decoders: Vec<Box<dyn DocumentDecoder>> = vec![Box::new(PlainTextDecoder::new())];

        #[cfg(feature = "pdf")]
        decoders.push(Box::new(PdfDecoder::new()));

        DecoderRegistry { decoders }
    }

    /// Registry with an explicit decoder list
    pub fn with_decoders(decoders: Vec<Box<dyn DocumentDecoder>>) -> Self {
        DecoderRegistry { decoders }
    }

    pub fn decoder_for(&self, kind: DocumentKind) -> Result<&dyn DocumentDecoder> {
        self.decoders
            .iter()
            .find(|d| d.kind() == kind)
            .map(|d| &**d)
            .ok_or_else(|| DcpError::UnsupportedDocument(format!("{} support not built in", kind.name())))
    }

    /// Detect the kind of `file_name` and decode it
    pub fn decode(&self, file_name: &str, bytes: &[u8]) -> Result<String> {
        let kind = detect_kind(file_name, bytes)?;
        self.decoder_for(kind)?.decode(file_name, bytes)
    }
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingDecoder;

    impl DocumentDecoder for FailingDecoder {
        fn decode(&self, file_name: &str, _bytes: &[u8]) -> Result<String> {
            Err(DcpError::Decode {
                file_name: file_name.to_string(),
                reason: "boom".to_string(),
            })
        }

        fn kind(&self) -> DocumentKind {
            DocumentKind::Pdf
        }
    }

    #[test]
    fn test_detect_kind_by_extension() {
        assert_eq!(detect_kind("dcp_jan.pdf", b"").unwrap(), DocumentKind::Pdf);
        assert_eq!(detect_kind("DCP.PDF", b"").unwrap(), DocumentKind::Pdf);
        assert_eq!(detect_kind("export.txt", b"").unwrap(), DocumentKind::PlainText);
    }

    #[test]
    fn test_detect_kind_by_magic_bytes() {
        assert_eq!(detect_kind("upload", b"%PDF-1.7\n...").unwrap(), DocumentKind::Pdf);
    }

    #[test]
    fn test_detect_kind_unknown() {
        let err = detect_kind("planilha.xlsx", b"PK").unwrap_err();
        assert!(matches!(err, DcpError::UnsupportedDocument(_)));
    }

    #[test]
    fn test_plain_text_decoder_is_lossy() {
        let text = PlainTextDecoder::new()
            .decode("a.txt", b"Compet\xeancia 01/2020")
            .unwrap();
        assert!(text.contains("01/2020"));
        assert!(text.contains('\u{FFFD}'));
    }

    #[test]
    fn test_registry_decodes_text() {
        let registry = DecoderRegistry::new();
        let text = registry.decode("dcp.txt", "Número do acordo: 1234/2020".as_bytes()).unwrap();
        assert_eq!(text, "Número do acordo: 1234/2020");
    }

    #[test]
    fn test_registry_with_custom_decoders() {
        let registry = DecoderRegistry::with_decoders(vec![Box::new(FailingDecoder)]);

        let err = registry.decode("x.pdf", b"%PDF-").unwrap_err();
        assert!(matches!(err, DcpError::Decode { .. }));

        let err = registry.decode("x.txt", b"text").unwrap_err();
        assert!(matches!(err, DcpError::UnsupportedDocument(_)));
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn test_pdf_decoder_rejects_garbage() {
        let result = PdfDecoder::new().decode("broken.pdf", b"%PDF-1.4 not really a pdf");
        assert!(matches!(result, Err(DcpError::Decode { .. })));
    }
}
