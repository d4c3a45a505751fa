//! File intake: turning uploaded bytes into sheets of raw text cells.
//!
//! The filename extension selects the decoding strategy (.csv via the csv
//! crate, .xlsx/.xls via calamine); anything else is rejected before parsing.
//! All cells come out as trimmed text with no type coercion, and rows where
//! every cell is blank are dropped here so row 0 of a non-empty sheet is
//! always the header row.

use std::io::Cursor;

use anyhow::{bail, Context, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader};

/// One tab of a workbook as a matrix of text cells.
#[derive(Debug, Clone)]
pub struct RawSheet {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

impl RawSheet {
    /// Header row, or an empty slice for a sheet with no rows.
    pub fn header(&self) -> &[String] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every row after the header.
    pub fn data_rows(&self) -> &[Vec<String>] {
        if self.rows.len() > 1 {
            &self.rows[1..]
        } else {
            &[]
        }
    }
}

/// Decode an uploaded file into its sheets.
pub fn load_sheets(filename: &str, bytes: &[u8]) -> Result<Vec<RawSheet>> {
    if bytes.is_empty() {
        bail!("uploaded file '{}' is empty", filename);
    }
    let lower = filename.to_lowercase();
    if lower.ends_with(".csv") {
        Ok(vec![sheet_from_csv(bytes)?])
    } else if lower.ends_with(".xlsx") || lower.ends_with(".xls") {
        sheets_from_workbook(bytes)
    } else {
        bail!(
            "unsupported file type '{}': expected .csv, .xlsx or .xls",
            filename
        );
    }
}

/// Parse delimited text into a single sheet named like a workbook's default
/// tab, so error messages carry a sheet tag in every mode.
fn sheet_from_csv(bytes: &[u8]) -> Result<RawSheet> {
    let text = decode_text(bytes);
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context("failed to parse CSV record")?;
        let cells: Vec<String> = record.iter().map(|c| c.trim().to_string()).collect();
        if !is_blank_row(&cells) {
            rows.push(cells);
        }
    }
    Ok(RawSheet { name: "Sheet1".to_string(), rows })
}

/// Decode bytes as UTF-8, falling back to Windows-1252 for legacy exports.
fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
    }
}

fn sheets_from_workbook(bytes: &[u8]) -> Result<Vec<RawSheet>> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook = open_workbook_auto_from_rs(cursor).context("failed to read workbook")?;

    let names = workbook.sheet_names().to_vec();
    if names.is_empty() {
        bail!("workbook has no sheets");
    }

    let mut sheets = Vec::new();
    for name in names {
        let range = workbook
            .worksheet_range(&name)
            .with_context(|| format!("failed to read sheet '{}'", name))?;
        let mut rows = Vec::new();
        for row in range.rows() {
            let cells: Vec<String> = row.iter().map(cell_to_string).collect();
            if !is_blank_row(&cells) {
                rows.push(cells);
            }
        }
        sheets.push(RawSheet { name, rows });
    }
    Ok(sheets)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        // Excel serial dates render in a form the date parser reads directly.
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(d) => d.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => format!("{}", cell),
        },
        Data::Empty => String::new(),
        other => format!("{}", other),
    }
}

fn is_blank_row(cells: &[String]) -> bool {
    cells.iter().all(|c| c.trim().is_empty())
}

// =============================================================================
// TESTS
// =============================================================================
