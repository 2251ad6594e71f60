// 📑 Section Locator
// Bounds the "3. LANÇAMENTOS DA RUBRICA" listing, where real competencies live.
//
// Header/footer text of a DCP carries dates and reference numbers that look like
// competencies. Scanning only the itemized section keeps those out.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

pub const DEFAULT_START_MARKER: &str = "3. lançamentos da rubrica";
pub const DEFAULT_END_MARKER: &str = "total";

/// Start/end markers of the itemized billing-period listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionMarkers {
    pub start: String,
    pub end: String,
}

impl Default for SectionMarkers {
    fn default() -> Self {
        SectionMarkers {
            start: DEFAULT_START_MARKER.to_string(),
            end: DEFAULT_END_MARKER.to_string(),
        }
    }
}

/// The bounded region plus whether the start marker was actually seen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section<'a> {
    pub text: &'a str,
    /// Byte offset of `text` within the full document
    pub offset: usize,
    /// false = degraded mode, `text` is the whole document
    pub found: bool,
}

pub struct SectionLocator {
    start: Regex,
    end: Regex,
}

impl SectionLocator {
    /// Build a locator for the given markers
    ///
    /// Markers are matched literally and case-insensitively (Unicode-aware, so
    /// "LANÇAMENTOS" matches "lançamentos" without re-indexing a lowercased copy).
    pub fn new(markers: &SectionMarkers) -> Result<Self, regex::Error> {
        Ok(SectionLocator {
            start: literal_pattern(&markers.start)?,
            end: literal_pattern(&markers.end)?,
        })
    }

    /// Locate the section in `text`
    ///
    /// - start and end found: start (inclusive) to end (exclusive)
    /// - only start found: start to end of text
    /// - no start: the whole text, `found = false`
    ///
    /// The end marker is searched after the start marker; a "total" in the
    /// header never truncates the listing.
    pub fn locate<'a>(&self, text: &'a str) -> Section<'a> {
        let (start, marker_end) = match self.start.find(text) {
            Some(m) => (m.start(), m.end()),
            None => {
                return Section {
                    text,
                    offset: 0,
                    found: false,
                }
            }
        };

        let end = self
            .end
            .find_at(text, marker_end)
            .map(|m| m.start())
            .unwrap_or(text.len());

        Section {
            text: &text[start..end],
            offset: start,
            found: true,
        }
    }
}

impl Default for SectionLocator {
    fn default() -> Self {
        // Default markers are plain literals, escaping cannot fail
        SectionLocator::new(&SectionMarkers::default()).expect("default section markers")
    }
}

fn literal_pattern(marker: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(&regex::escape(marker))
        .case_insensitive(true)
        .build()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_markers() {
        let text = "Cabeçalho 01/2019\n3. LANÇAMENTOS DA RUBRICA\n01/2020 02/2020\nTOTAL 123,45\nRodapé";
        let section = SectionLocator::default().locate(text);

        assert!(section.found);
        assert!(section.text.starts_with("3. LANÇAMENTOS DA RUBRICA"));
        assert!(section.text.ends_with("02/2020\n"));
        assert!(!section.text.contains("TOTAL"));
        assert_eq!(&text[section.offset..section.offset + 2], "3.");
    }

    #[test]
    fn test_start_only_runs_to_end() {
        let text = "header\n3. Lançamentos da Rubrica\n05/2021 06/2021";
        let section = SectionLocator::default().locate(text);

        assert!(section.found);
        assert_eq!(section.text, "3. Lançamentos da Rubrica\n05/2021 06/2021");
    }

    #[test]
    fn test_missing_start_is_degraded_mode() {
        let text = "no listing here 01/2020 TOTAL";
        let section = SectionLocator::default().locate(text);

        assert!(!section.found);
        assert_eq!(section.text, text);
        assert_eq!(section.offset, 0);
    }

    #[test]
    fn test_end_marker_before_start_is_ignored() {
        let text = "Valor total do acordo\n3. LANÇAMENTOS DA RUBRICA\n03/2020\nTotal";
        let section = SectionLocator::default().locate(text);

        assert!(section.found);
        assert_eq!(section.text, "3. LANÇAMENTOS DA RUBRICA\n03/2020\n");
    }

    #[test]
    fn test_custom_markers_are_literal() {
        let markers = SectionMarkers {
            start: "4. (itens)".to_string(),
            end: "fim".to_string(),
        };
        let locator = SectionLocator::new(&markers).unwrap();
        let section = locator.locate("x 4. (ITENS) 01/2020 FIM y");

        assert!(section.found);
        assert_eq!(section.text, "4. (ITENS) 01/2020 ");
    }

    #[test]
    fn test_empty_text() {
        let section = SectionLocator::default().locate("");
        assert!(!section.found);
        assert_eq!(section.text, "");
    }
}
