//! # Export Layout
//!
//! Turns a batch (or the live ledger) into spreadsheet rows and a filename.
//! Writing the file is the application's job; this module only decides what
//! goes where.
//!
//! ## Sheet Layout
//! ```text
//!        A              B
//!   1  │ Field        │ Value      │  ◄── header block
//!   2  │ Date         │ 2024-01-01 │
//!   3  │ Store        │ Acme Store!│
//!   4  │ Discount (%) │ 10         │
//!   5  │ code         │ quantity   │ price  ◄── item table (cell A5)
//!   6  │ 4006381333931│ 2          │ 9.99
//!   …
//! ```

use chrono::NaiveDate;
use std::fmt;

use crate::ledger::Ledger;
use crate::types::{Batch, BatchHeader, BatchId, Entry};
use crate::{DEFAULT_STORE_NAME, HEADER_DATE_FORMAT, MAX_FILENAME_STORE_LEN};

/// Worksheet name used by every export.
pub const SHEET_NAME: &str = "Scans";

/// Zero-based row where the item table header sits (cell A5).
pub const ITEM_TABLE_ROW: u32 = 4;

/// Column titles of the item table.
pub const ITEM_COLUMNS: [&str; 3] = ["code", "quantity", "price"];

// =============================================================================
// Cells
// =============================================================================

/// One spreadsheet cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Integer(i64),
    Number(f64),
}

impl Cell {
    fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Integer(i) => write!(f, "{}", i),
            Cell::Number(n) => write!(f, "{}", n),
        }
    }
}

// =============================================================================
// Export Label
// =============================================================================

/// Suffix distinguishing live-ledger exports from batch exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportLabel {
    Current,
    Batch(BatchId),
}

impl fmt::Display for ExportLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportLabel::Current => f.write_str("Current"),
            ExportLabel::Batch(id) => write!(f, "Batch{}", id),
        }
    }
}

// =============================================================================
// Export Sheet
// =============================================================================

/// Everything a spreadsheet sink needs to write one file.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSheet {
    pub sheet_name: String,
    pub header: BatchHeader,
    pub label: ExportLabel,
    pub items: Vec<Entry>,
}

impl ExportSheet {
    pub fn for_batch(batch: &Batch) -> Self {
        ExportSheet {
            sheet_name: SHEET_NAME.to_string(),
            header: batch.header.clone(),
            label: ExportLabel::Batch(batch.id),
            items: batch.items.clone(),
        }
    }

    /// Pseudo-batch over the live ledger with the current header values.
    pub fn for_ledger(ledger: &Ledger, header: &BatchHeader) -> Self {
        ExportSheet {
            sheet_name: SHEET_NAME.to_string(),
            header: header.clone(),
            label: ExportLabel::Current,
            items: ledger.snapshot(),
        }
    }

    /// Field/value rows of the header block, title row included.
    pub fn header_rows(&self) -> Vec<[Cell; 2]> {
        vec![
            [Cell::text("Field"), Cell::text("Value")],
            [Cell::text("Date"), Cell::text(&self.header.date)],
            [Cell::text("Store"), Cell::text(&self.header.store)],
            [
                Cell::text("Discount (%)"),
                Cell::Number(self.header.discount.percentage()),
            ],
        ]
    }

    /// Item table rows, title row included.
    pub fn item_rows(&self) -> Vec<[Cell; 3]> {
        let titles = ITEM_COLUMNS.map(Cell::text);
        std::iter::once(titles)
            .chain(self.items.iter().map(|e| {
                [
                    Cell::text(&e.code),
                    Cell::Integer(e.quantity),
                    Cell::Number(e.price.as_major_f64()),
                ]
            }))
            .collect()
    }

    /// Every row of the sheet, top to bottom. Header rows have two cells,
    /// item rows three.
    pub fn rows(&self) -> Vec<Vec<Cell>> {
        let mut rows: Vec<Vec<Cell>> = self.header_rows().into_iter().map(Vec::from).collect();
        debug_assert_eq!(rows.len() as u32, ITEM_TABLE_ROW);
        rows.extend(self.item_rows().into_iter().map(Vec::from));
        rows
    }

    /// Filename stem (no extension) for this sheet.
    pub fn file_stem(&self, today: NaiveDate) -> String {
        export_filename(&self.header, self.label, today)
    }
}

// =============================================================================
// Filenames
// =============================================================================

/// Replaces every non-alphanumeric character with `_` and truncates.
///
/// ```rust
/// use scanlog_core::export::sanitize_store_name;
///
/// assert_eq!(sanitize_store_name("Acme Store!"), "Acme_Store_");
/// assert_eq!(sanitize_store_name("  "), "Store");
/// ```
pub fn sanitize_store_name(store: &str) -> String {
    let store = if store.trim().is_empty() {
        DEFAULT_STORE_NAME
    } else {
        store
    };

    let safe: String = store
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .take(MAX_FILENAME_STORE_LEN)
        .collect();

    if safe.is_empty() {
        DEFAULT_STORE_NAME.to_string()
    } else {
        safe
    }
}

/// `{store}_{date}_{label}` with store sanitized and defaults filled in.
///
/// ```rust
/// use chrono::NaiveDate;
/// use scanlog_core::{BatchHeader, BatchId};
/// use scanlog_core::export::{export_filename, ExportLabel};
///
/// let mut header = BatchHeader::placeholder("2024-01-01");
/// header.store = "Acme Store!".into();
/// let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
///
/// assert_eq!(
///     export_filename(&header, ExportLabel::Batch(BatchId::new(3)), today),
///     "Acme_Store__2024-01-01_Batch3"
/// );
/// ```
pub fn export_filename(header: &BatchHeader, label: ExportLabel, today: NaiveDate) -> String {
    let store = sanitize_store_name(&header.store);

    let date: String = header
        .date
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    let date = if date.is_empty() {
        today.format(HEADER_DATE_FORMAT).to_string()
    } else {
        date
    };

    format!("{}_{}_{}", store, date, label)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::Discount;

    fn acme_batch() -> Batch {
        Batch {
            id: BatchId::new(1),
            header: BatchHeader {
                date: "2024-01-01".into(),
                store: "Acme Store!".into(),
                discount: Discount::from_bps(1000),
            },
            items: vec![
                Entry::new("4006381333931", 2, Money::from_cents(999)),
                Entry::new("ABC", 1, Money::zero()),
            ],
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_header_block_precedes_items() {
        let sheet = ExportSheet::for_batch(&acme_batch());
        let rows = sheet.rows();

        assert_eq!(rows.len(), 4 + 1 + 2);
        assert_eq!(rows[0], vec![Cell::text("Field"), Cell::text("Value")]);
        assert_eq!(rows[1], vec![Cell::text("Date"), Cell::text("2024-01-01")]);
        assert_eq!(rows[2], vec![Cell::text("Store"), Cell::text("Acme Store!")]);
        assert_eq!(rows[3], vec![Cell::text("Discount (%)"), Cell::Number(10.0)]);
        assert_eq!(
            rows[ITEM_TABLE_ROW as usize],
            vec![Cell::text("code"), Cell::text("quantity"), Cell::text("price")]
        );
        assert_eq!(
            rows[5],
            vec![Cell::text("4006381333931"), Cell::Integer(2), Cell::Number(9.99)]
        );
        assert_eq!(sheet.sheet_name, SHEET_NAME);
    }

    #[test]
    fn test_filename_sanitizes_store() {
        let sheet = ExportSheet::for_batch(&acme_batch());
        assert_eq!(sheet.file_stem(today()), "Acme_Store__2024-01-01_Batch1");
    }

    #[test]
    fn test_filename_defaults() {
        let header = BatchHeader {
            date: "".into(),
            store: "".into(),
            discount: Discount::zero(),
        };
        assert_eq!(
            export_filename(&header, ExportLabel::Current, today()),
            "Store_2024-06-01_Current"
        );
    }

    #[test]
    fn test_store_name_truncated() {
        let long = "Supermarket Number Forty Two Downtown";
        let safe = sanitize_store_name(long);
        assert_eq!(safe.len(), MAX_FILENAME_STORE_LEN);
        assert_eq!(safe, "Supermarket_Number_Forty");
        assert_eq!(sanitize_store_name("Café/Bar"), "Caf__Bar");
    }

    #[test]
    fn test_ledger_export_uses_current_label() {
        let mut ledger = Ledger::default();
        ledger.add_or_increment("X", 1, Money::zero());
        let sheet = ExportSheet::for_ledger(&ledger, &BatchHeader::placeholder("2024-02-02"));
        assert_eq!(sheet.label, ExportLabel::Current);
        assert_eq!(sheet.file_stem(today()), "Store_2024-02-02_Current");
        assert_eq!(sheet.items.len(), 1);
    }
}
