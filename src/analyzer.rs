// 🔎 DCP Analyzer - per-document extraction pipeline
//
// raw text ─┬─ normalize → agreement number
//           └─ section → competency scan → year status
//
// Total by construction: any text, including empty or garbage, yields a result.

use crate::agreement::AgreementNumberExtractor;
use crate::competency::{CompetencyScanner, MAX_DIAGNOSTIC_EXAMPLES};
use crate::error::Result;
use crate::normalizer::normalize_text;
use crate::section::{SectionLocator, SectionMarkers};
use crate::years::{build_year_status, YearMap};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

static DEFAULT_ANALYZER: Lazy<DcpAnalyzer> = Lazy::new(DcpAnalyzer::new);

// ============================================================================
// CORE TYPES
// ============================================================================

/// One decoded statement: display name + extracted text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub file_name: String,
    pub text: String,
}

impl Document {
    pub fn new(file_name: impl Into<String>, text: impl Into<String>) -> Self {
        Document {
            file_name: file_name.into(),
            text: text.into(),
        }
    }
}

/// Signals about how much to trust the extraction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionDiagnostics {
    /// false = start marker missing, whole text was scanned
    pub section_found: bool,
    /// Sample tokens dropped because they ended a "dd/mm/yyyy" date
    pub ignored_from_dates: Vec<String>,
    /// Sample tokens that look genuine but sit outside the section
    pub found_outside_section: Vec<String>,
}

impl ExtractionDiagnostics {
    /// Degraded mode or real-looking tokens outside the listing
    pub fn needs_review(&self) -> bool {
        !self.section_found || !self.found_outside_section.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResult {
    pub file_name: String,
    pub agreement_number: Option<String>,
    pub raw_competencies: Vec<String>,
    pub years: YearMap,
    pub diagnostics: ExtractionDiagnostics,
}

impl DocumentResult {
    pub fn complete_years(&self) -> Vec<&str> {
        self.years
            .iter()
            .filter(|(_, status)| status.complete)
            .map(|(year, _)| year.as_str())
            .collect()
    }

    pub fn total_missing(&self) -> usize {
        self.years.values().map(|s| s.missing.len()).sum()
    }

    /// Every year found is complete (false when no year was found)
    pub fn is_complete(&self) -> bool {
        !self.years.is_empty() && self.years.values().all(|s| s.complete)
    }

    pub fn summary(&self) -> String {
        format!(
            "{}: agreement {}, {} competencies, {} years ({} complete), {} missing",
            self.file_name,
            self.agreement_number.as_deref().unwrap_or("not found"),
            self.raw_competencies.len(),
            self.years.len(),
            self.complete_years().len(),
            self.total_missing()
        )
    }
}

// ============================================================================
// CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    pub markers: SectionMarkers,
    pub max_examples: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig {
            markers: SectionMarkers::default(),
            max_examples: MAX_DIAGNOSTIC_EXAMPLES,
        }
    }
}

// ============================================================================
// ANALYZER
// ============================================================================

/// Stateless across documents: `analyze` only reads `&self`, so one instance can
/// be shared by every worker of a batch.
pub struct DcpAnalyzer {
    agreements: AgreementNumberExtractor,
    locator: SectionLocator,
    scanner: CompetencyScanner,
}

impl DcpAnalyzer {
    pub fn new() -> Self {
        DcpAnalyzer {
            agreements: AgreementNumberExtractor::new(),
            locator: SectionLocator::default(),
            scanner: CompetencyScanner::new(),
        }
    }

    pub fn with_config(config: &AnalyzerConfig) -> Result<Self> {
        Ok(DcpAnalyzer {
            agreements: AgreementNumberExtractor::new(),
            locator: SectionLocator::new(&config.markers)?,
            scanner: CompetencyScanner::new().with_max_examples(config.max_examples),
        })
    }

    pub fn analyze(&self, document: &Document) -> DocumentResult {
        let text = document.text.as_str();

        let agreement = self.agreements.extract(&normalize_text(text));
        if let Some(m) = &agreement {
            debug!(file = %document.file_name, tier = ?m.tier, number = %m.number, "agreement number found");
        }

        let section = self.locator.locate(text);
        if !section.found && !text.trim().is_empty() {
            warn!(file = %document.file_name, "section start marker not found, scanning full text");
        }

        let outcome = self.scanner.scan(text, &section);
        let years = build_year_status(&outcome.competencies);

        let result = DocumentResult {
            file_name: document.file_name.clone(),
            agreement_number: agreement.map(|m| m.number),
            raw_competencies: outcome.competencies,
            years,
            diagnostics: ExtractionDiagnostics {
                section_found: section.found,
                ignored_from_dates: outcome.ignored_from_dates,
                found_outside_section: outcome.found_outside_section,
            },
        };

        debug!("{}", result.summary());
        result
    }
}

impl Default for DcpAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Analyze with the default markers
pub fn analyze_document(document: &Document) -> DocumentResult {
    DEFAULT_ANALYZER.analyze(document)
}

// ============================================================================
// TESTS
// ============================================================================
