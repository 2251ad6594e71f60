// 🗓️ Competency Token Scanner
// Finds billed periods ("mm/yyyy") and tells them apart from full dates ("dd/mm/yyyy").
//
// Two passes over the same stateless scan:
// 1. Full document  → diagnostics only (what got ignored, what lives outside the section)
// 2. Section text   → the accepted competencies
//
// A token is a date tail when the text right before it is one or two digits
// followed by '/'. "pago em 30/12/2020" yields the token "12/2020", preceded by
// "30/", so it is ignored.

use crate::section::Section;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Month 01..13, year 1900..2099. Month 13 is accepted on purpose, see `years`.
static TOKEN: Lazy<Regex> = Lazy::new(|| {
    // ASCII word boundary: "1ª07/2021" must still yield "07/2021"
    Regex::new(r"(?-u:\b)(0[1-9]|1[0-3])/((?:19|20)[0-9]{2})(?-u:\b)")
        .expect("competency token pattern")
});

/// Cap on example tokens reported in diagnostics
pub const MAX_DIAGNOSTIC_EXAMPLES: usize = 6;

// ============================================================================
// CORE TYPES
// ============================================================================

/// A validated "mm/yyyy" pair and where it was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetencyToken {
    pub month: u8,
    pub year: u16,
    /// Byte offset in the scanned text
    pub offset: usize,
}

impl CompetencyToken {
    /// "mm/yyyy", zero-padded so lexicographic order is stable
    pub fn key(&self) -> String {
        format!("{:02}/{:04}", self.month, self.year)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenClass {
    /// Looks like a real billed period
    Candidate,
    /// Trailing "mm/yyyy" of a "dd/mm/yyyy" date
    DateTail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedToken {
    pub token: CompetencyToken,
    pub class: TokenClass,
}

impl ScannedToken {
    pub fn is_candidate(&self) -> bool {
        self.class == TokenClass::Candidate
    }
}

// ============================================================================
// STATELESS SCANNING
// ============================================================================

/// Every "mm/yyyy" match in `text`, classified, in order of appearance
pub fn scan_tokens(text: &str) -> Vec<ScannedToken> {
    TOKEN
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let month = caps.get(1)?.as_str().parse().ok()?;
            let year = caps.get(2)?.as_str().parse().ok()?;

            let class = if is_date_tail(text, whole.start()) {
                TokenClass::DateTail
            } else {
                TokenClass::Candidate
            };

            Some(ScannedToken {
                token: CompetencyToken {
                    month,
                    year,
                    offset: whole.start(),
                },
                class,
            })
        })
        .collect()
}

/// True when the characters before `start` are `\d{1,2}/`
///
/// Checking one digit is enough: a two-digit day ends with a digit too.
pub fn is_date_tail(text: &str, start: usize) -> bool {
    let before = &text.as_bytes()[..start];
    match before {
        [.., digit, b'/'] => digit.is_ascii_digit(),
        _ => false,
    }
}

/// Distinct accepted "mm/yyyy" values in `text`, sorted
pub fn accepted_competencies(text: &str) -> BTreeSet<String> {
    scan_tokens(text)
        .into_iter()
        .filter(ScannedToken::is_candidate)
        .map(|t| t.token.key())
        .collect()
}

// ============================================================================
// SCANNER
// ============================================================================

/// Accepted competencies plus the diagnostic samples
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    pub competencies: Vec<String>,
    pub ignored_from_dates: Vec<String>,
    pub found_outside_section: Vec<String>,
}

pub struct CompetencyScanner {
    max_examples: usize,
}

impl CompetencyScanner {
    pub fn new() -> Self {
        CompetencyScanner {
            max_examples: MAX_DIAGNOSTIC_EXAMPLES,
        }
    }

    /// Builder pattern: change the diagnostics example cap
    pub fn with_max_examples(mut self, max_examples: usize) -> Self {
        self.max_examples = max_examples;
        self
    }

    /// Scan `full_text` for diagnostics and `section` for accepted competencies
    pub fn scan(&self, full_text: &str, section: &Section<'_>) -> ScanOutcome {
        let accepted = accepted_competencies(section.text);

        let mut ignored = BTreeSet::new();
        let mut outside = BTreeSet::new();

        for scanned in scan_tokens(full_text) {
            let key = scanned.token.key();
            match scanned.class {
                TokenClass::DateTail => {
                    ignored.insert(key);
                }
                TokenClass::Candidate if !accepted.contains(&key) => {
                    outside.insert(key);
                }
                TokenClass::Candidate => {}
            }
        }

        ScanOutcome {
            competencies: accepted.into_iter().collect(),
            ignored_from_dates: ignored.into_iter().take(self.max_examples).collect(),
            found_outside_section: outside.into_iter().take(self.max_examples).collect(),
        }
    }
}

impl Default for CompetencyScanner {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
