//! # Domain Types
//!
//! Core domain types used throughout scanlog.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────────┐   ┌────────────────┐   │
//! │  │     Entry       │   │        Batch         │   │  BatchHeader   │   │
//! │  │  ─────────────  │   │  ──────────────────  │   │  ────────────  │   │
//! │  │  code (key)     │◄──│  id (BatchId)        │──►│  date          │   │
//! │  │  quantity ≥ 1   │   │  header              │   │  store         │   │
//! │  │  price (Money)  │   │  items (frozen copy) │   │  discount      │   │
//! │  └─────────────────┘   └──────────────────────┘   └────────────────┘   │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   Discount      │   │    ScanMode     │   │  CameraFacing   │       │
//! │  │  bps (u32)      │   │  OneD/TwoD/All  │   │  Front / Back   │       │
//! │  │  1000 = 10%     │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{parse_discount, validate_header_date};
use crate::{DEFAULT_STORE_NAME, HEADER_DATE_FORMAT};

// =============================================================================
// Entry
// =============================================================================

/// One line of the ledger. Identity is `code` (exact string match).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Decoded or typed barcode text.
    pub code: String,

    /// Always ≥ 1.
    pub quantity: i64,

    /// Unit price, never negative.
    #[serde(rename = "price_cents")]
    pub price: Money,
}

impl Entry {
    pub fn new(code: impl Into<String>, quantity: i64, price: Money) -> Self {
        Entry {
            code: code.into(),
            quantity: quantity.max(1),
            price,
        }
    }

    /// Unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Batch Id
// =============================================================================

/// Sequence number of a closed batch. Starts at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(u64);

impl BatchId {
    #[inline]
    pub const fn new(id: u64) -> Self {
        BatchId(id)
    }

    #[inline]
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// The id that follows this one.
    #[inline]
    pub const fn next(&self) -> Self {
        BatchId(self.0.saturating_add(1))
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BatchId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(BatchId)
            .map_err(|_| ValidationError::InvalidFormat {
                field: "batch id".to_string(),
                reason: format!("'{}' is not a batch number", s),
            })
    }
}

// =============================================================================
// Discount
// =============================================================================

/// Discount percentage held in basis points.
///
/// ## Why Basis Points?
/// 1 basis point = 0.01%. `"12.5"` typed into the discount field is stored
/// exactly as 1250 instead of a float.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Discount(u32);

impl Discount {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Discount(bps)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the discount as a percentage (for display and export only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Discount(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Discount {
    fn default() -> Self {
        Discount::zero()
    }
}

/// `1000` → `"10"`, `1250` → `"12.5"`.
impl fmt::Display for Discount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 100;
        let frac = self.0 % 100;
        match frac {
            0 => write!(f, "{}", whole),
            f10 if f10 % 10 == 0 => write!(f, "{}.{}", whole, f10 / 10),
            _ => write!(f, "{}.{:02}", whole, frac),
        }
    }
}

// =============================================================================
// Batch Header
// =============================================================================

/// Header fixed onto a batch at close time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchHeader {
    /// `YYYY-MM-DD`.
    pub date: String,
    pub store: String,
    pub discount: Discount,
}

impl BatchHeader {
    /// Header with the placeholder store and no discount.
    pub fn placeholder(date: impl Into<String>) -> Self {
        BatchHeader {
            date: date.into(),
            store: DEFAULT_STORE_NAME.to_string(),
            discount: Discount::zero(),
        }
    }
}

// =============================================================================
// Header Draft
// =============================================================================

/// The three header form fields, as the user last typed them.
///
/// Each field is persisted on its own; blanks are stored as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderDraft {
    pub date: Option<String>,
    pub store: Option<String>,
    pub discount: Option<String>,
}

/// Which header field is being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderField {
    Date,
    Store,
    Discount,
}

impl HeaderField {
    pub const ALL: [HeaderField; 3] = [HeaderField::Date, HeaderField::Store, HeaderField::Discount];
}

impl FromStr for HeaderField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "date" | "logdate" => Ok(HeaderField::Date),
            "store" | "storename" => Ok(HeaderField::Store),
            "discount" => Ok(HeaderField::Discount),
            _ => Err(ValidationError::NotAllowed {
                field: "header field".to_string(),
                allowed: vec!["date".into(), "store".into(), "discount".into()],
            }),
        }
    }
}

impl HeaderDraft {
    /// Validates and stores one field. Blank input clears the field.
    pub fn set(&mut self, field: HeaderField, raw: &str) -> Result<(), ValidationError> {
        let trimmed = raw.trim();
        let value = if trimmed.is_empty() {
            None
        } else {
            Some(match field {
                HeaderField::Date => validate_header_date(trimmed)?,
                HeaderField::Discount => {
                    parse_discount(trimmed)?;
                    trimmed.to_string()
                }
                HeaderField::Store => trimmed.to_string(),
            })
        };

        *self.slot(field) = value;
        Ok(())
    }

    pub fn get(&self, field: HeaderField) -> Option<&str> {
        match field {
            HeaderField::Date => self.date.as_deref(),
            HeaderField::Store => self.store.as_deref(),
            HeaderField::Discount => self.discount.as_deref(),
        }
    }

    fn slot(&mut self, field: HeaderField) -> &mut Option<String> {
        match field {
            HeaderField::Date => &mut self.date,
            HeaderField::Store => &mut self.store,
            HeaderField::Discount => &mut self.discount,
        }
    }

    /// Fills defaults for blank fields and freezes the result.
    ///
    /// ## Defaults
    /// - date → `today`
    /// - store → `"Store"`
    /// - discount → 0
    pub fn resolve(&self, today: NaiveDate) -> Result<BatchHeader, ValidationError> {
        let date = match non_blank(&self.date) {
            Some(date) => validate_header_date(date)?,
            None => today.format(HEADER_DATE_FORMAT).to_string(),
        };
        let store = non_blank(&self.store)
            .unwrap_or(DEFAULT_STORE_NAME)
            .to_string();
        let discount = parse_discount(non_blank(&self.discount).unwrap_or(""))?;

        Ok(BatchHeader {
            date,
            store,
            discount,
        })
    }

    pub fn clear(&mut self) {
        *self = HeaderDraft::default();
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

// =============================================================================
// Batch
// =============================================================================

/// A closed batch: header plus a frozen copy of the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub id: BatchId,
    pub header: BatchHeader,
    pub items: Vec<Entry>,
}

impl Batch {
    pub fn total_quantity(&self) -> i64 {
        self.items
            .iter()
            .fold(0i64, |acc, e| acc.saturating_add(e.quantity))
    }

    pub fn gross_total(&self) -> Money {
        self.items.iter().map(Entry::line_total).sum()
    }

    /// Gross total after the header discount.
    pub fn net_total(&self) -> Money {
        self.gross_total().apply_discount(self.header.discount)
    }
}

// =============================================================================
// Scan Mode / Camera Facing
// =============================================================================

/// Which barcode families to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ScanMode {
    /// Linear barcodes only (EAN, UPC, Code 128, Code 39).
    #[serde(rename = "1d")]
    OneD,
    /// Matrix codes only (QR and friends).
    #[serde(rename = "2d")]
    TwoD,
    /// Both engines against the same stream.
    #[default]
    #[serde(rename = "all")]
    All,
}

impl ScanMode {
    pub fn uses_linear(&self) -> bool {
        matches!(self, ScanMode::OneD | ScanMode::All)
    }

    pub fn uses_matrix(&self) -> bool {
        matches!(self, ScanMode::TwoD | ScanMode::All)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScanMode::OneD => "1d",
            ScanMode::TwoD => "2d",
            ScanMode::All => "all",
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScanMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1d" | "linear" => Ok(ScanMode::OneD),
            "2d" | "qr" | "matrix" => Ok(ScanMode::TwoD),
            "all" | "both" => Ok(ScanMode::All),
            _ => Err(ValidationError::NotAllowed {
                field: "scan mode".to_string(),
                allowed: vec!["1d".into(), "2d".into(), "all".into()],
            }),
        }
    }
}

/// Which camera to ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraFacing {
    /// Selfie camera (`user` constraint).
    Front,
    /// Rear camera (`environment` constraint).
    #[default]
    Back,
}

impl CameraFacing {
    pub fn flipped(&self) -> Self {
        match self {
            CameraFacing::Front => CameraFacing::Back,
            CameraFacing::Back => CameraFacing::Front,
        }
    }
}

impl fmt::Display for CameraFacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraFacing::Front => f.write_str("front"),
            CameraFacing::Back => f.write_str("back"),
        }
    }
}

impl FromStr for CameraFacing {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "front" | "user" => Ok(CameraFacing::Front),
            "back" | "rear" | "environment" => Ok(CameraFacing::Back),
            _ => Err(ValidationError::NotAllowed {
                field: "camera facing".to_string(),
                allowed: vec!["front".into(), "back".into()],
            }),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    #[test]
    fn test_entry_quantity_floor() {
        let entry = Entry::new("X", 0, Money::zero());
        assert_eq!(entry.quantity, 1);
        assert_eq!(Entry::new("X", 3, Money::from_cents(250)).line_total().cents(), 750);
    }

    #[test]
    fn test_entry_json_shape() {
        let entry = Entry::new("ABC", 2, Money::from_cents(999));
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"code": "ABC", "quantity": 2, "price_cents": 999})
        );
    }

    #[test]
    fn test_discount_display() {
        assert_eq!(Discount::from_bps(1000).to_string(), "10");
        assert_eq!(Discount::from_bps(1250).to_string(), "12.5");
        assert_eq!(Discount::from_bps(1205).to_string(), "12.05");
        assert_eq!(Discount::zero().to_string(), "0");
        assert!((Discount::from_bps(1250).percentage() - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_header_defaults() {
        let header = HeaderDraft::default().resolve(day()).unwrap();
        assert_eq!(header.date, "2024-03-09");
        assert_eq!(header.store, "Store");
        assert!(header.discount.is_zero());
    }

    #[test]
    fn test_header_set_and_resolve() {
        let mut draft = HeaderDraft::default();
        draft.set(HeaderField::Date, "2024-01-01").unwrap();
        draft.set(HeaderField::Store, "  Acme Store! ").unwrap();
        draft.set(HeaderField::Discount, "10").unwrap();

        let header = draft.resolve(day()).unwrap();
        assert_eq!(header.date, "2024-01-01");
        assert_eq!(header.store, "Acme Store!");
        assert_eq!(header.discount.bps(), 1000);

        draft.set(HeaderField::Store, "   ").unwrap();
        assert_eq!(draft.get(HeaderField::Store), None);
    }

    #[test]
    fn test_header_rejects_bad_input() {
        let mut draft = HeaderDraft::default();
        assert!(draft.set(HeaderField::Date, "yesterday").is_err());
        assert!(draft.set(HeaderField::Discount, "150").is_err());
        assert_eq!(draft, HeaderDraft::default());
    }

    #[test]
    fn test_batch_totals() {
        let batch = Batch {
            id: BatchId::new(1),
            header: BatchHeader {
                date: "2024-01-01".into(),
                store: "Acme".into(),
                discount: Discount::from_bps(1000),
            },
            items: vec![
                Entry::new("A", 2, Money::from_cents(500)),
                Entry::new("B", 1, Money::from_cents(1000)),
            ],
        };
        assert_eq!(batch.total_quantity(), 3);
        assert_eq!(batch.gross_total().cents(), 2000);
        assert_eq!(batch.net_total().cents(), 1800);
    }

    #[test]
    fn test_scan_mode_parsing() {
        assert_eq!("1d".parse::<ScanMode>().unwrap(), ScanMode::OneD);
        assert_eq!("2D".parse::<ScanMode>().unwrap(), ScanMode::TwoD);
        assert_eq!("all".parse::<ScanMode>().unwrap(), ScanMode::All);
        assert!("3d".parse::<ScanMode>().is_err());
        assert_eq!(ScanMode::default(), ScanMode::All);
        assert_eq!(serde_json::to_string(&ScanMode::OneD).unwrap(), "\"1d\"");
    }

    #[test]
    fn test_scan_mode_engine_selection() {
        assert!(ScanMode::OneD.uses_linear() && !ScanMode::OneD.uses_matrix());
        assert!(!ScanMode::TwoD.uses_linear() && ScanMode::TwoD.uses_matrix());
        assert!(ScanMode::All.uses_linear() && ScanMode::All.uses_matrix());
    }

    #[test]
    fn test_camera_facing() {
        assert_eq!(CameraFacing::default(), CameraFacing::Back);
        assert_eq!(CameraFacing::Back.flipped(), CameraFacing::Front);
        assert_eq!("environment".parse::<CameraFacing>().unwrap(), CameraFacing::Back);
    }

    #[test]
    fn test_batch_id() {
        assert_eq!(BatchId::new(4).next(), BatchId::new(5));
        assert_eq!("12".parse::<BatchId>().unwrap(), BatchId::new(12));
        assert!("twelve".parse::<BatchId>().is_err());
    }
}
