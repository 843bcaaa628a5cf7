//! # Spreadsheet Sinks
//!
//! Writes an [`ExportSheet`] to disk. The layout (which cell holds what)
//! comes from `scanlog_core::export`; sinks only know their file format.
//!
//! ```text
//! ExportSheet ──► SpreadsheetSink::write(sheet, stem)
//!                    ├── XlsxSink → {dir}/{stem}.xlsx   (sheet "Scans")
//!                    └── CsvSink  → {dir}/{stem}.csv
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

use rust_xlsxwriter::Workbook;
use scanlog_core::export::Cell;
use scanlog_core::ExportSheet;

use crate::error::{AppError, AppResult};

// =============================================================================
// Format
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(AppError::Config(format!(
                "Unknown export format: '{}'. Valid options: xlsx, csv",
                other
            ))),
        }
    }
}

// =============================================================================
// Sink Trait
// =============================================================================

/// Something that can persist a sheet as a file.
pub trait SpreadsheetSink: Send + Sync {
    /// Writes `sheet` under the filename stem `stem` and returns the path.
    fn write(&self, sheet: &ExportSheet, stem: &str) -> AppResult<PathBuf>;
}

/// Sink for the configured format.
pub fn sink_for(format: ExportFormat, dir: impl Into<PathBuf>) -> Box<dyn SpreadsheetSink> {
    match format {
        ExportFormat::Xlsx => Box::new(XlsxSink::new(dir)),
        ExportFormat::Csv => Box::new(CsvSink::new(dir)),
    }
}

fn target_path(dir: &Path, stem: &str, format: ExportFormat) -> AppResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    Ok(dir.join(format!("{}.{}", stem, format.extension())))
}

// =============================================================================
// XLSX
// =============================================================================

#[derive(Debug, Clone)]
pub struct XlsxSink {
    dir: PathBuf,
}

impl XlsxSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        XlsxSink { dir: dir.into() }
    }
}

impl SpreadsheetSink for XlsxSink {
    fn write(&self, sheet: &ExportSheet, stem: &str) -> AppResult<PathBuf> {
        let path = target_path(&self.dir, stem, ExportFormat::Xlsx)?;

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.sheet_name)?;

        for (row, cells) in sheet.rows().iter().enumerate() {
            let row = row as u32;
            for (col, cell) in cells.iter().enumerate() {
                let col = col as u16;
                match cell {
                    Cell::Text(text) => worksheet.write_string(row, col, text)?,
                    Cell::Integer(n) => worksheet.write_number(row, col, *n as f64)?,
                    Cell::Number(n) => worksheet.write_number(row, col, *n)?,
                };
            }
        }

        workbook.save(&path)?;

        info!(path = %path.display(), items = sheet.items.len(), "Exported xlsx");
        Ok(path)
    }
}

// =============================================================================
// CSV
// =============================================================================

/// Same rows as the xlsx layout, one record per row. Header rows have two
/// fields, item rows three.
#[derive(Debug, Clone)]
pub struct CsvSink {
    dir: PathBuf,
}

impl CsvSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        CsvSink { dir: dir.into() }
    }
}

impl SpreadsheetSink for CsvSink {
    fn write(&self, sheet: &ExportSheet, stem: &str) -> AppResult<PathBuf> {
        let path = target_path(&self.dir, stem, ExportFormat::Csv)?;

        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(&path)?;

        for cells in sheet.rows() {
            writer.write_record(cells.iter().map(|c| c.to_string()))?;
        }
        writer.flush()?;

        info!(path = %path.display(), items = sheet.items.len(), "Exported csv");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use scanlog_core::{BatchArchive, BatchHeader, Discount, Ledger, Money};

    fn sheet() -> ExportSheet {
        let mut ledger = Ledger::default();
        ledger.add_or_increment("A1", 2, Money::from_cents(999));
        ledger.add_or_increment("B2", 1, Money::zero());

        let mut archive = BatchArchive::default();
        let header = BatchHeader {
            date: "2024-01-01".into(),
            store: "Acme Store!".into(),
            discount: Discount::from_bps(1000),
        };
        let id = archive.close(&mut ledger, header).unwrap();
        ExportSheet::for_batch(archive.get(id).unwrap())
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_csv_layout() {
        let dir = tempfile::tempdir().unwrap();
        let sheet = sheet();
        let path = CsvSink::new(dir.path())
            .write(&sheet, &sheet.file_stem(today()))
            .unwrap();

        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "Acme_Store__2024-01-01_Batch1.csv"
        );
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Field,Value",
                "Date,2024-01-01",
                "Store,Acme Store!",
                "Discount (%),10",
                "code,quantity,price",
                "A1,2,9.99",
                "B2,1,0",
            ]
        );
    }

    #[test]
    fn test_xlsx_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = XlsxSink::new(dir.path().join("nested"))
            .write(&sheet(), "out")
            .unwrap();

        assert!(path.ends_with("nested/out.xlsx"));
        let bytes = std::fs::read(&path).unwrap();
        // xlsx is a zip archive
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert!("pdf".parse::<ExportFormat>().is_err());
    }
}
