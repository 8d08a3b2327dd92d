//! Workbook intake: opens the uploaded spreadsheet and extracts the raw data
//! rows the normalizer works on.
//!
//! Sheet selection follows the operator's habit of keeping one sheet per
//! year: a sheet named for the current year wins, otherwise the first sheet
//! is taken. Structural problems (unreadable bytes, no sheet, nothing below
//! the header row) are the only fatal import errors; they abort before any
//! reconciliation starts.

use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;
use thiserror::Error;

use crate::db::StoreError;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("could not read the workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("no data sheet found in the workbook")]
    MissingSheet,
    #[error("the sheet has no data rows")]
    NoDataRows,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ImportError {
    /// Structural workbook problems are the client's to fix; store failures
    /// on open are ours.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ImportError::Store(_))
    }
}

/// Opens the workbook and returns every row below the header of the selected
/// sheet.
pub fn load_data_rows(path: &Path, year: i32) -> Result<Vec<Vec<Data>>, ImportError> {
    let mut workbook = open_workbook_auto(path)?;
    let names: Vec<String> = workbook.sheet_names().to_vec();
    let sheet = select_sheet(&names, year)
        .ok_or(ImportError::MissingSheet)?
        .clone();
    let range = workbook.worksheet_range(&sheet)?;

    let mut rows = range.rows();
    if rows.next().is_none() {
        // Not even a header row.
        return Err(ImportError::NoDataRows);
    }
    let data: Vec<Vec<Data>> = rows.map(|row| row.to_vec()).collect();
    if data.is_empty() {
        return Err(ImportError::NoDataRows);
    }
    Ok(data)
}

/// The sheet named for `year` when present, else the first sheet.
pub fn select_sheet(names: &[String], year: i32) -> Option<&String> {
    let wanted = year.to_string();
    names.iter().find(|name| **name == wanted).or_else(|| names.first())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn prefers_the_sheet_named_for_the_year() {
        let sheets = names(&["Notes", "2025", "2024"]);
        assert_eq!(select_sheet(&sheets, 2025).unwrap(), "2025");
    }

    #[test]
    fn falls_back_to_the_first_sheet() {
        let sheets = names(&["Orders", "Archive"]);
        assert_eq!(select_sheet(&sheets, 2025).unwrap(), "Orders");
    }

    #[test]
    fn empty_workbook_has_no_sheet() {
        assert_eq!(select_sheet(&[], 2025), None);
    }
}
