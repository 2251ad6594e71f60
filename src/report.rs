// 📊 Completeness Matrix
// Renders a DocumentResult the way reviewers read it: one row per competency
// month, one column per year, ✓/✕ cells and a "Faltantes" (missing) count row.

use crate::analyzer::DocumentResult;
use crate::error::Result;
use std::io::Write;

/// Rows 01..13: month 13 gets a row so a found "13/yyyy" is visible
pub const MATRIX_MONTHS: u8 = 13;

pub const PRESENT_MARK: &str = "✓";
pub const MISSING_MARK: &str = "✕";

/// Header + month rows + missing-count row, as plain cells
pub fn matrix_rows(result: &DocumentResult) -> Vec<Vec<String>> {
    let years: Vec<&String> = result.years.keys().collect();
    let mut rows = Vec::with_capacity(MATRIX_MONTHS as usize + 2);

    let mut header = vec!["Competência".to_string()];
    header.extend(years.iter().map(|y| y.to_string()));
    rows.push(header);

    for month in 1..=MATRIX_MONTHS {
        let mut row = vec![format!("{:02}", month)];
        for year in &years {
            let found = result.years[*year].has_month(month, year);
            row.push(if found { PRESENT_MARK } else { MISSING_MARK }.to_string());
        }
        rows.push(row);
    }

    let mut missing = vec!["Faltantes".to_string()];
    missing.extend(years.iter().map(|y| {
        let status = &result.years[*y];
        if status.complete {
            "0".to_string()
        } else {
            status.missing.len().to_string()
        }
    }));
    rows.push(missing);

    rows
}

/// Write the matrix of `result` as CSV
pub fn write_matrix_csv<W: Write>(result: &DocumentResult, writer: W) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new().flexible(false).from_writer(writer);

    for row in matrix_rows(result) {
        csv_writer.write_record(&row)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Title line shown above each matrix
pub fn matrix_title(result: &DocumentResult) -> String {
    format!(
        "{} • {} • Competências encontradas: {}",
        result.agreement_number.as_deref().unwrap_or("Não identificado"),
        result.file_name,
        result.raw_competencies.len()
    )
}

// ============================================================================
// TESTS
// ============================================================================
