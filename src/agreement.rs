// 🔖 Agreement Number Extractor
// Finds the "número do acordo" that ties a DCP to its governing contract.
//
// Three tiers, evaluated in order, first match wins:
// 1. Labeled:      "Número do acordo: 1234/2020"
// 2. Abbreviated:  "Nº do acordo - 1234/2020", "no acordo 1234/2020"
// 3. Fallback:     first standalone "ddd/yyyy" .. "dddddd/yyyy" anywhere

use crate::normalizer::normalize_text;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static LABELED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?-u:\b)n[úu]mero\s+do\s+acordo\s*:\s*([0-9]{3,6}/[0-9]{4})(?-u:\b)")
        .expect("labeled agreement pattern")
});

static ABBREVIATED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?-u:\b)n[ºo]\.?\s*(?:do\s*)?acordo\s*[:\-]?\s*([0-9]{3,6}/[0-9]{4})(?-u:\b)")
        .expect("abbreviated agreement pattern")
});

static STANDALONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?-u:\b)[0-9]{3,6}/[0-9]{4}(?-u:\b)").expect("standalone agreement pattern")
});

// ============================================================================
// CORE TYPES
// ============================================================================

/// Which rule produced the agreement number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchTier {
    Labeled,
    Abbreviated,
    Fallback,
}

impl MatchTier {
    /// Labeled forms are trustworthy; the fallback may pick up any "nnn/yyyy" number
    pub fn is_labeled(&self) -> bool {
        !matches!(self, MatchTier::Fallback)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgreementMatch {
    pub number: String,
    pub tier: MatchTier,
}

// ============================================================================
// EXTRACTOR
// ============================================================================

pub struct AgreementNumberExtractor;

impl AgreementNumberExtractor {
    pub fn new() -> Self {
        AgreementNumberExtractor
    }

    /// Search already-normalized text
    pub fn extract(&self, normalized: &str) -> Option<AgreementMatch> {
        let tiers: [(&Regex, MatchTier); 2] = [
            (&LABELED, MatchTier::Labeled),
            (&ABBREVIATED, MatchTier::Abbreviated),
        ];

        for (pattern, tier) in tiers {
            if let Some(value) = pattern.captures(normalized).and_then(|c| c.get(1)) {
                return Some(AgreementMatch {
                    number: value.as_str().to_string(),
                    tier,
                });
            }
        }

        STANDALONE.find(normalized).map(|m| AgreementMatch {
            number: m.as_str().to_string(),
            tier: MatchTier::Fallback,
        })
    }
}

impl Default for AgreementNumberExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize `text` and return the agreement number, if any tier matches
pub fn extract_agreement_number(text: &str) -> Option<String> {
    AgreementNumberExtractor::new()
        .extract(&normalize_text(text))
        .map(|m| m.number)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labeled_form() {
        assert_eq!(
            extract_agreement_number("Número do acordo: 1234/2020 ..."),
            Some("1234/2020".to_string())
        );
    }

    #[test]
    fn test_labeled_form_unaccented_and_uppercase() {
        assert_eq!(
            extract_agreement_number("NUMERO DO ACORDO : 123456/2018"),
            Some("123456/2018".to_string())
        );
        assert_eq!(
            extract_agreement_number("NÚMERO  DO\nACORDO:\n4321/2022"),
            Some("4321/2022".to_string())
        );
    }

    #[test]
    fn test_abbreviated_form_with_dash() {
        assert_eq!(
            extract_agreement_number("nº acordo - 987/2019"),
            Some("987/2019".to_string())
        );
    }

    #[test]
    fn test_abbreviated_form_variants() {
        assert_eq!(
            extract_agreement_number("Nº do acordo: 555/2017"),
            Some("555/2017".to_string())
        );
        assert_eq!(
            extract_agreement_number("No. acordo 7777/2023"),
            Some("7777/2023".to_string())
        );
    }

    #[test]
    fn test_ordinal_sign_glued_to_number() {
        assert_eq!(
            extract_agreement_number("Acordo Nº1234/2020 firmado"),
            Some("1234/2020".to_string())
        );
        assert_eq!(
            extract_agreement_number("Processo nº 4567/2021ª via"),
            Some("4567/2021".to_string())
        );
    }

    #[test]
    fn test_fallback_standalone() {
        assert_eq!(
            extract_agreement_number("no label present, just 55555/2021 floating"),
            Some("55555/2021".to_string())
        );
    }

    #[test]
    fn test_labeled_wins_over_earlier_standalone() {
        let text = "Processo 999/2010 ... Número do acordo: 1234/2020";
        let m = AgreementNumberExtractor::new()
            .extract(&normalize_text(text))
            .unwrap();

        assert_eq!(m.number, "1234/2020");
        assert_eq!(m.tier, MatchTier::Labeled);
        assert!(m.tier.is_labeled());
    }

    #[test]
    fn test_fallback_tier_reported() {
        let m = AgreementNumberExtractor::new().extract("ref 555/2021").unwrap();
        assert_eq!(m.tier, MatchTier::Fallback);
        assert!(!m.tier.is_labeled());
    }

    #[test]
    fn test_short_numbers_are_not_agreements() {
        // dd/yyyy-ish values have too few digits before the slash
        assert_eq!(extract_agreement_number("competência 07/2021"), None);
        assert_eq!(extract_agreement_number("pago em 30/12/2020"), None);
    }

    #[test]
    fn test_no_match() {
        assert_eq!(extract_agreement_number(""), None);
        assert_eq!(extract_agreement_number("nothing to see here"), None);
    }
}
