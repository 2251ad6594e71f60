// 📆 Year Status Aggregator
// Rolls accepted competencies into a per-year completeness matrix.
//
// Only calendar months 01..12 can be "missing". A "13/yyyy" token is still
// reported in `present`, so a year can list 13 present entries and still be
// complete, or list 12 present entries and still miss one month.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const CALENDAR_MONTHS: u8 = 12;

/// Presence/absence of the twelve months of one year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearStatus {
    pub present: Vec<String>,
    pub missing: Vec<String>,
    pub complete: bool,
}

impl YearStatus {
    /// Build the status of `year` from the "mm/yyyy" tokens found for it
    pub fn from_present(year: &str, present: BTreeSet<String>) -> Self {
        let missing: Vec<String> = (1..=CALENDAR_MONTHS)
            .map(|month| format!("{:02}/{}", month, year))
            .filter(|key| !present.contains(key))
            .collect();

        YearStatus {
            complete: missing.is_empty(),
            present: present.into_iter().collect(),
            missing,
        }
    }

    pub fn missing_count(&self) -> usize {
        self.missing.len()
    }

    /// Whether "mm/yyyy" for `month` was found
    pub fn has_month(&self, month: u8, year: &str) -> bool {
        let key = format!("{:02}/{}", month, year);
        self.present.iter().any(|p| *p == key)
    }
}

/// Year string → status, ordered by year
pub type YearMap = BTreeMap<String, YearStatus>;

/// Group "mm/yyyy" tokens by year and compute each year's status
///
/// Malformed tokens (no '/') are skipped. Years without tokens get no entry.
pub fn build_year_status<S: AsRef<str>>(competencies: &[S]) -> YearMap {
    let mut by_year: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for competency in competencies {
        let competency = competency.as_ref();
        let Some((month, year)) = competency.split_once('/') else {
            continue;
        };

        by_year
            .entry(year.to_string())
            .or_default()
            .insert(format!("{}/{}", month, year));
    }

    by_year
        .into_iter()
        .map(|(year, present)| {
            let status = YearStatus::from_present(&year, present);
            (year, status)
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn full_year(year: &str) -> Vec<String> {
        (1..=12).map(|m| format!("{:02}/{}", m, year)).collect()
    }

    #[test]
    fn test_partial_year() {
        let years = build_year_status(&["01/2021", "02/2021"]);
        let status = &years["2021"];

        assert_eq!(status.present, vec!["01/2021", "02/2021"]);
        assert_eq!(status.missing.len(), 10);
        assert_eq!(status.missing[0], "03/2021");
        assert_eq!(status.missing[9], "12/2021");
        assert!(!status.complete);
    }

    #[test]
    fn test_complete_year() {
        let years = build_year_status(&full_year("2021"));
        let status = &years["2021"];

        assert!(status.complete);
        assert!(status.missing.is_empty());
        assert_eq!(status.present.len(), 12);
    }

    #[test]
    fn test_present_and_missing_partition_months() {
        let years = build_year_status(&["05/2020", "01/2020", "11/2020"]);
        let status = &years["2020"];

        for month in 1..=12u8 {
            let key = format!("{:02}/2020", month);
            let in_present = status.present.contains(&key);
            let in_missing = status.missing.contains(&key);
            assert!(in_present ^ in_missing, "month {} must be in exactly one list", key);
        }
        assert!(status.has_month(5, "2020"));
        assert!(!status.has_month(6, "2020"));
    }

    #[test]
    fn test_duplicates_collapse() {
        let years = build_year_status(&["03/2020", "03/2020"]);
        assert_eq!(years["2020"].present, vec!["03/2020"]);
        assert_eq!(years["2020"].missing_count(), 11);
    }

    #[test]
    fn test_only_years_with_tokens() {
        let years = build_year_status(&["12/2019", "01/2021"]);
        let keys: Vec<_> = years.keys().cloned().collect();

        assert_eq!(keys, vec!["2019", "2021"]);
        assert!(!years.contains_key("2020"));
    }

    #[test]
    fn test_empty_input() {
        let years = build_year_status::<&str>(&[]);
        assert!(years.is_empty());
    }

    #[test]
    fn test_month_13_inflates_present_without_filling_missing() {
        let mut tokens = full_year("2022");
        tokens.retain(|t| t != "12/2022");
        tokens.push("13/2022".to_string());

        let years = build_year_status(&tokens);
        let status = &years["2022"];

        assert_eq!(status.present.len(), 12);
        assert!(status.present.contains(&"13/2022".to_string()));
        assert_eq!(status.missing, vec!["12/2022"]);
        assert!(!status.complete);
    }

    #[test]
    fn test_month_13_alongside_full_year() {
        let mut tokens = full_year("2022");
        tokens.push("13/2022".to_string());

        let years = build_year_status(&tokens);
        let status = &years["2022"];
        assert_eq!(status.present.len(), 13);
        assert!(status.complete);
    }

    #[test]
    fn test_malformed_tokens_skipped() {
        let years = build_year_status(&["garbage", "04/2020"]);
        assert_eq!(years.len(), 1);
        assert_eq!(years["2020"].present, vec!["04/2020"]);
    }
}
