//! Ingestion orchestration: drives decoding, column resolution,
//! normalization, validation and commit for one uploaded file.
//!
//! The two modes carry opposite transactional contracts. Strict validates
//! the whole batch before writing anything and rejects it wholesale on the
//! first problem; smart commits every row it can and isolates failures to
//! the row that caused them. Rows are processed sequentially so error
//! messages stay in sheet order.

use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::columns;
use crate::fields::{Field, COLUMN_SYNONYMS, REQUIRED_ARCHETYPES};
use crate::record::normalize_row;
use crate::sheet::{self, RawSheet};
use crate::store::RecordStore;
use crate::validate;

/// Transactional policy for an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestMode {
    /// First sheet only, fixed column shape, all-or-nothing commit.
    Strict,
    /// Every eligible sheet, heuristic header mapping, best-effort
    /// row-at-a-time commit.
    Smart,
}

/// Summary returned to the caller. `success + failed` equals the number of
/// non-empty data rows examined across processed sheets.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionResult {
    pub success: usize,
    pub failed: usize,
    pub errors: Vec<String>,
    pub sheets_processed: Vec<String>,
}

/// Ingest an uploaded file under the given mode, committing accepted records
/// through `store` tagged with `actor`.
///
/// Fatal conditions (missing/unsupported file, undecodable workbook,
/// strict-mode header shape) surface as `Err` and commit nothing; row-level
/// problems are reported through the result counters instead.
pub async fn ingest<S: RecordStore>(
    filename: &str,
    bytes: &[u8],
    mode: IngestMode,
    actor: &str,
    store: &S,
) -> Result<IngestionResult> {
    let sheets = sheet::load_sheets(filename, bytes)?;
    match mode {
        IngestMode::Strict => {
            let first = sheets.first().context("file contains no sheets")?;
            run_strict(first, actor, store).await
        }
        IngestMode::Smart => run_smart(&sheets, actor, store).await,
    }
}

/// All-or-nothing ingestion of a single sheet with the full column layout.
async fn run_strict<S: RecordStore>(
    sheet: &RawSheet,
    actor: &str,
    store: &S,
) -> Result<IngestionResult> {
    let headers = sheet.header();
    if headers.is_empty() {
        bail!("sheet '{}' is empty: no header row found", sheet.name);
    }
    let expected = Field::ALL.len();
    if headers.len() < expected {
        bail!(
            "header has {} column(s), expected at least {} (found: {})",
            headers.len(),
            expected,
            preview(headers)
        );
    }
    if sheet.data_rows().is_empty() {
        bail!("sheet '{}' has no data rows", sheet.name);
    }

    let index = columns::resolve_columns(headers, COLUMN_SYNONYMS);
    let mut result = IngestionResult {
        sheets_processed: vec![sheet.name.clone()],
        ..Default::default()
    };

    let mut accepted = Vec::new();
    for (idx, row) in sheet.data_rows().iter().enumerate() {
        let record = normalize_row(row, &index, actor);
        let reasons = validate::validate(&record, IngestMode::Strict);
        if reasons.is_empty() {
            accepted.push(record);
        } else {
            result.failed += 1;
            result.errors.push(row_error(&sheet.name, idx, &reasons));
        }
    }

    // One bad row rejects the whole batch; nothing has been written yet.
    if !result.errors.is_empty() {
        return Ok(result);
    }

    match store.insert_many(&accepted).await {
        Ok(()) => {
            result.success = accepted.len();
        }
        Err(e) => {
            result.failed = accepted.len();
            result.errors.push(format!(
                "failed to save batch of {} record(s): {}",
                accepted.len(),
                e
            ));
        }
    }
    Ok(result)
}

/// Best-effort ingestion across every sheet in the workbook.
async fn run_smart<S: RecordStore>(
    sheets: &[RawSheet],
    actor: &str,
    store: &S,
) -> Result<IngestionResult> {
    let mut result = IngestionResult::default();

    for sheet in sheets {
        let headers = sheet.header();
        if let Err(reason) = columns::check_required_columns(headers, REQUIRED_ARCHETYPES) {
            log::warn!("skipping sheet '{}': {}", sheet.name, reason);
            continue;
        }
        let index = columns::resolve_columns(headers, COLUMN_SYNONYMS);
        result.sheets_processed.push(sheet.name.clone());

        for (idx, row) in sheet.data_rows().iter().enumerate() {
            let record = normalize_row(row, &index, actor);
            let reasons = validate::validate(&record, IngestMode::Smart);
            if !reasons.is_empty() {
                result.failed += 1;
                result.errors.push(row_error(&sheet.name, idx, &reasons));
                continue;
            }
            // Commit failures stay scoped to this row; the sheet loop goes on.
            match store.insert_one(&record).await {
                Ok(()) => result.success += 1,
                Err(e) => {
                    result.failed += 1;
                    result.errors.push(format!(
                        "Sheet '{}' row {}: failed to save record: {}",
                        sheet.name,
                        idx + 2,
                        e
                    ));
                }
            }
        }
    }
    Ok(result)
}

/// Display row number: 1-based with the header row counted, so data row 0
/// reads as row 2.
fn row_error(sheet_name: &str, data_row_idx: usize, reasons: &[String]) -> String {
    format!(
        "Sheet '{}' row {}: {}",
        sheet_name,
        data_row_idx + 2,
        reasons.join("; ")
    )
}

fn preview(headers: &[String]) -> String {
    let shown: Vec<&str> = headers
        .iter()
        .map(|h| h.trim())
        .filter(|h| !h.is_empty())
        .take(6)
        .collect();
    shown.join(", ")
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::DispatchRecord;
    use crate::store::MemoryStore;
    use anyhow::anyhow;

    const FULL_HEADERS: &[&str] = &[
        "Company Name",
        "Contact Person",
        "Email",
        "Phone",
        "Invoice No",
        "Consignment No",
        "Booking Date",
        "Item Category",
        "Item Description",
        "Qty",
        "Weight",
        "Rate",
        "Amount",
        "City",
        "District",
        "State",
        "Country",
        "Paid or To Pay",
        "Booking Type",
        "Remarks",
    ];

    const SMART_HEADERS: &[&str] = &["Company Name", "Contact Person", "Email", "Invoice No"];

    fn make_sheet(name: &str, rows: &[&[&str]]) -> RawSheet {
        RawSheet {
            name: name.to_string(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    /// Full-width sheet with only company and item category populated.
    fn strict_sheet(rows: &[(&str, &str)]) -> RawSheet {
        let mut all: Vec<Vec<String>> =
            vec![FULL_HEADERS.iter().map(|h| h.to_string()).collect()];
        for (company, category) in rows {
            let mut cells = vec![String::new(); FULL_HEADERS.len()];
            cells[0] = company.to_string();
            cells[7] = category.to_string();
            all.push(cells);
        }
        RawSheet { name: "Sheet1".to_string(), rows: all }
    }

    struct FailingStore;

    impl RecordStore for FailingStore {
        async fn insert_many(&self, _records: &[DispatchRecord]) -> Result<()> {
            Err(anyhow!("connection reset"))
        }
        async fn insert_one(&self, _record: &DispatchRecord) -> Result<()> {
            Err(anyhow!("connection reset"))
        }
    }

    /// Delegates to an inner memory store but refuses one company's rows.
    struct FlakyStore {
        inner: MemoryStore,
        poison: &'static str,
    }

    impl RecordStore for FlakyStore {
        async fn insert_many(&self, records: &[DispatchRecord]) -> Result<()> {
            self.inner.insert_many(records).await
        }
        async fn insert_one(&self, record: &DispatchRecord) -> Result<()> {
            if record.company_name == self.poison {
                return Err(anyhow!("disk full"));
            }
            self.inner.insert_one(record).await
        }
    }

    // -------------------------------------------------------------------------
    // STRICT MODE
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_strict_commits_clean_batch_once() {
        let store = MemoryStore::new();
        let sheet = strict_sheet(&[("Acme", "Electronics"), ("Globex", "Textiles")]);
        let result = run_strict(&sheet, "tester", &store).await.unwrap();

        assert_eq!(result.success, 2);
        assert_eq!(result.failed, 0);
        assert!(result.errors.is_empty());
        assert_eq!(store.len(), 2);
        assert_eq!(store.records()[0].created_by, "tester");
    }

    #[tokio::test]
    async fn test_strict_rejects_whole_batch_on_any_invalid_row() {
        let store = MemoryStore::new();
        let sheet = strict_sheet(&[
            ("Acme", "Electronics"),
            ("", "Textiles"),
            ("Globex", ""),
        ]);
        let result = run_strict(&sheet, "tester", &store).await.unwrap();

        assert_eq!(result.success, 0);
        assert_eq!(result.failed, 2);
        assert_eq!(result.errors.len(), 2);
        // Data row 1 displays as row 3.
        assert!(result.errors[0].contains("row 3"));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_strict_header_count_is_fatal() {
        let store = MemoryStore::new();
        let err = ingest(
            "records.csv",
            b"Company Name,Contact Person,Email\nAcme,Ravi,ravi@acme.in\n",
            IngestMode::Strict,
            "tester",
            &store,
        )
        .await
        .unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("expected at least 20"));
        assert!(msg.contains("Company Name"));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_strict_batch_store_failure_fails_everything() {
        let sheet = strict_sheet(&[("Acme", "Electronics"), ("Globex", "Textiles")]);
        let result = run_strict(&sheet, "tester", &FailingStore).await.unwrap();

        assert_eq!(result.success, 0);
        assert_eq!(result.failed, 2);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("connection reset"));
    }

    #[tokio::test]
    async fn test_strict_empty_sheet_is_fatal() {
        let store = MemoryStore::new();
        let sheet = make_sheet("Sheet1", &[FULL_HEADERS]);
        let err = run_strict(&sheet, "tester", &store).await.unwrap_err();
        assert!(err.to_string().contains("no data rows"));
    }

    // -------------------------------------------------------------------------
    // SMART MODE
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_smart_skips_ineligible_sheet_and_continues() {
        let store = MemoryStore::new();
        let sheets = vec![
            make_sheet(
                "Sheet1",
                &[&["Vendor", "Contact", "Mail", "Ref"], &["V1", "C1", "m@x.io", "R1"]],
            ),
            make_sheet(
                "Sheet2",
                &[
                    SMART_HEADERS,
                    &["Acme", "Ravi", "ravi@acme.in", "INV-1"],
                    &["", "Meera", "meera@acme.in", "INV-2"],
                ],
            ),
        ];
        let result = run_smart(&sheets, "tester", &store).await.unwrap();

        assert_eq!(result.sheets_processed, vec!["Sheet2"]);
        assert_eq!(result.success, 1);
        assert_eq!(result.failed, 1);
        assert_eq!(result.errors.len(), 1);
        // Data row 1 of Sheet2 displays as row 3.
        assert!(result.errors[0].contains("Sheet2"));
        assert!(result.errors[0].contains("row 3"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.records()[0].company_name, "Acme");
    }

    #[tokio::test]
    async fn test_smart_counts_cover_all_examined_rows() {
        let store = MemoryStore::new();
        let sheets = vec![make_sheet(
            "Bookings",
            &[
                SMART_HEADERS,
                &["Acme", "Ravi", "", "INV-1"],
                &["Globex", "", "", "INV-2"],
                &["Initech", "Sam", "sam@initech.io", "INV-3"],
            ],
        )];
        let result = run_smart(&sheets, "tester", &store).await.unwrap();

        assert_eq!(result.success + result.failed, 3);
        assert_eq!(result.success, 2);
        assert_eq!(store.len(), result.success);
    }

    #[tokio::test]
    async fn test_smart_row_store_failure_is_isolated() {
        let store = FlakyStore { inner: MemoryStore::new(), poison: "Boom Ltd" };
        let sheets = vec![make_sheet(
            "Bookings",
            &[
                SMART_HEADERS,
                &["Acme", "Ravi", "", "INV-1"],
                &["Boom Ltd", "Kai", "", "INV-2"],
                &["Initech", "Sam", "", "INV-3"],
            ],
        )];
        let result = run_smart(&sheets, "tester", &store).await.unwrap();

        assert_eq!(result.success, 2);
        assert_eq!(result.failed, 1);
        assert!(result.errors[0].contains("disk full"));
        assert!(result.errors[0].contains("row 3"));
        // The row after the failure still committed.
        assert_eq!(store.inner.len(), 2);
    }

    #[tokio::test]
    async fn test_smart_end_to_end_over_csv() {
        let store = MemoryStore::new();
        let csv = "Company Name,Contact Person,Email,Invoice No\n\
                   Acme,Ravi,ravi@acme.in,INV-1\n\
                   ,,,\n\
                   Globex,Meera,bad-email,INV-2\n";
        let result = ingest("bookings.csv", csv.as_bytes(), IngestMode::Smart, "ops", &store)
            .await
            .unwrap();

        // The blank line is discarded at decode time, not counted as failed.
        assert_eq!(result.success, 1);
        assert_eq!(result.failed, 1);
        assert_eq!(result.sheets_processed, vec!["Sheet1"]);
        assert!(result.errors[0].contains("invalid email"));
    }

    #[tokio::test]
    async fn test_unsupported_extension_is_fatal_in_both_modes() {
        let store = MemoryStore::new();
        for mode in [IngestMode::Strict, IngestMode::Smart] {
            let err = ingest("records.txt", b"a,b\n", mode, "ops", &store)
                .await
                .unwrap_err();
            assert!(err.to_string().contains("unsupported file type"));
        }
        assert!(store.is_empty());
    }
}
