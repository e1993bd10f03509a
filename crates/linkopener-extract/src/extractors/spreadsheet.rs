//! Workbooks read through calamine (.xls here, .xlsx via [`super::XlsxExtractor`])

use std::path::Path;

use crate::registry::Extractor;
use crate::Result;

pub struct SpreadsheetExtractor;

impl Extractor for SpreadsheetExtractor {
    fn capability(&self) -> &'static str {
        "spreadsheet"
    }

    fn is_available(&self) -> bool {
        cfg!(feature = "spreadsheet")
    }

    fn extract(&self, path: &Path) -> Result<String> {
        #[cfg(feature = "spreadsheet")]
        {
            workbook_text(path)
        }
        #[cfg(not(feature = "spreadsheet"))]
        {
            let _ = path;
            Err(super::missing("xls", "spreadsheet"))
        }
    }
}

/// Every sheet, row by row: cells tab-separated, rows newline-separated.
///
/// `HYPERLINK(...)` formulas are appended after each sheet since the cell
/// value only holds the friendly name.
#[cfg(feature = "spreadsheet")]
pub(crate) fn workbook_text(path: &Path) -> Result<String> {
    use calamine::{open_workbook_auto, Data, Reader};

    use crate::error::ExtractError;

    let mut workbook = open_workbook_auto(path).map_err(|e| ExtractError::extraction(path, e))?;
    let mut out = String::new();

    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| ExtractError::extraction(path, format!("sheet {}: {}", name, e)))?;

        for row in range.rows() {
            let cells: Vec<String> = row
                .iter()
                .map(|cell| match cell {
                    Data::Empty => String::new(),
                    other => other.to_string(),
                })
                .collect();
            out.push_str(cells.join("\t").trim_end());
            out.push('\n');
        }

        match workbook.worksheet_formula(&name) {
            Ok(formulas) => {
                for formula in formulas.used_cells().map(|(_, _, f)| f) {
                    if formula.to_ascii_uppercase().contains("HYPERLINK(") {
                        out.push_str(formula);
                        out.push('\n');
                    }
                }
            }
            Err(e) => {
                tracing::debug!(sheet = %name, error = %e, "Formulas unavailable");
            }
        }
    }

    Ok(out)
}
