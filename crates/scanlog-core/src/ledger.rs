//! # Entry Ledger
//!
//! The live, not-yet-batched list of entries.
//!
//! ## Ledger Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Ledger Operations                                    │
//! │                                                                         │
//! │  Event                    Operation                 Effect              │
//! │  ─────                    ─────────                 ──────              │
//! │                                                                         │
//! │  Code decoded ──────────► add_or_increment(c,1,0) ► qty += 1 or push    │
//! │                                                                         │
//! │  Manual add ────────────► add_or_increment(c,q,p) ► qty += q, price?    │
//! │                                                                         │
//! │  Edit cell ─────────────► edit_field(i, f, raw) ──► coerced in place    │
//! │                                                                         │
//! │  Delete row ────────────► remove(i) ──────────────► entries.remove(i)   │
//! │                                                                         │
//! │  Restore batch ─────────► replace(items) ─────────► entries = copy      │
//! │                                                                         │
//! │  NOTE: duplicates are merged, never rejected.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::Entry;
use crate::validation::{coerce_price, coerce_quantity, MAX_PRICE, MAX_QUANTITY};

// =============================================================================
// Price Merge Policy
// =============================================================================

/// What happens to an existing entry's price when its code is added again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceMergePolicy {
    /// Overwrite only when the incoming price is non-zero, so a plain scan
    /// never wipes a price typed in earlier.
    #[default]
    KeepUnlessNonZero,
    /// Always take the incoming price, zero included.
    AlwaysOverwrite,
}

impl FromStr for PriceMergePolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "keep_unless_non_zero" | "keep" => Ok(PriceMergePolicy::KeepUnlessNonZero),
            "always_overwrite" | "overwrite" => Ok(PriceMergePolicy::AlwaysOverwrite),
            _ => Err(ValidationError::NotAllowed {
                field: "price merge policy".to_string(),
                allowed: vec!["keep_unless_non_zero".into(), "always_overwrite".into()],
            }),
        }
    }
}

// =============================================================================
// Ledger Field
// =============================================================================

/// Editable columns of a ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerField {
    Quantity,
    Price,
}

impl FromStr for LedgerField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "quantity" | "qty" => Ok(LedgerField::Quantity),
            "price" => Ok(LedgerField::Price),
            _ => Err(ValidationError::NotAllowed {
                field: "ledger field".to_string(),
                allowed: vec!["quantity".into(), "price".into()],
            }),
        }
    }
}

// =============================================================================
// Ledger
// =============================================================================

/// Ordered entries of the open batch.
///
/// ## Invariants
/// - Entries are unique by `code` (adding a known code increases quantity)
/// - Every quantity is in `1..=MAX_QUANTITY`, every price in `0..=MAX_PRICE`
/// - Insertion order is scan order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    entries: Vec<Entry>,
    #[serde(skip)]
    policy: PriceMergePolicy,
}

impl Ledger {
    pub fn new(policy: PriceMergePolicy) -> Self {
        Ledger {
            entries: Vec::new(),
            policy,
        }
    }

    /// Rebuilds a ledger from persisted entries, re-establishing invariants
    /// (duplicate codes merged, quantities floored at 1).
    pub fn from_entries(entries: Vec<Entry>, policy: PriceMergePolicy) -> Self {
        let mut ledger = Ledger::new(policy);
        ledger.replace(entries);
        ledger
    }

    pub fn policy(&self) -> PriceMergePolicy {
        self.policy
    }

    /// Adds a code or increases its quantity.
    ///
    /// ## Behavior
    /// - Code already present: `quantity += quantity`, price per policy
    /// - Otherwise: a new entry is appended
    ///
    /// Quantity is clamped to `1..=MAX_QUANTITY` and price to
    /// `0..=MAX_PRICE`, both on the way in and after merging.
    pub fn add_or_increment(&mut self, code: &str, quantity: i64, price: Money) {
        let quantity = quantity.clamp(1, MAX_QUANTITY);
        let price = price.clamp(Money::zero(), MAX_PRICE);

        if let Some(entry) = self.entries.iter_mut().find(|e| e.code == code) {
            entry.quantity = entry.quantity.saturating_add(quantity).min(MAX_QUANTITY);
            let overwrite = match self.policy {
                PriceMergePolicy::KeepUnlessNonZero => !price.is_zero(),
                PriceMergePolicy::AlwaysOverwrite => true,
            };
            if overwrite {
                entry.price = price;
            }
            return;
        }

        self.entries.push(Entry::new(code, quantity, price));
    }

    /// Edits one cell, coercing the raw input.
    ///
    /// ## Coercion
    /// - quantity: integer ≥ 1, anything else → 1
    /// - price: non-negative amount, anything else → 0
    pub fn edit_field(&mut self, index: usize, field: LedgerField, raw: &str) -> CoreResult<()> {
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(CoreError::EntryNotFound(index))?;

        match field {
            LedgerField::Quantity => entry.quantity = coerce_quantity(raw),
            LedgerField::Price => entry.price = coerce_price(raw),
        }
        Ok(())
    }

    /// Removes the entry at `index`.
    pub fn remove(&mut self, index: usize) -> CoreResult<Entry> {
        if index >= self.entries.len() {
            return Err(CoreError::EntryNotFound(index));
        }
        Ok(self.entries.remove(index))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Replaces all entries with `items`, merging duplicate codes.
    pub fn replace(&mut self, items: Vec<Entry>) {
        self.entries.clear();
        let policy = self.policy;
        // Merge with the overwrite rule so the later row's price wins as-is.
        self.policy = PriceMergePolicy::AlwaysOverwrite;
        for item in items {
            self.add_or_increment(&item.code, item.quantity, item.price);
        }
        self.policy = policy;
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    /// Deep copy of the entries, for snapshots.
    pub fn snapshot(&self) -> Vec<Entry> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_quantity(&self) -> i64 {
        self.entries
            .iter()
            .fold(0i64, |acc, e| acc.saturating_add(e.quantity))
    }

    pub fn total_value(&self) -> Money {
        self.entries.iter().map(Entry::line_total).sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scanning_same_code_twice_merges() {
        let mut ledger = Ledger::default();
        ledger.add_or_increment("0123456789012", 1, Money::zero());
        ledger.add_or_increment("0123456789012", 1, Money::zero());

        assert_eq!(ledger.len(), 1);
        assert_eq!(
            ledger.entries()[0],
            Entry::new("0123456789012", 2, Money::zero())
        );
    }

    #[test]
    fn test_quantities_accumulate_to_sum() {
        let mut ledger = Ledger::default();
        let quantities = [1, 4, 2, 7, 1];
        for q in quantities {
            ledger.add_or_increment("SKU", q, Money::zero());
        }
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.entries()[0].quantity, quantities.iter().sum::<i64>());
    }

    #[test]
    fn test_zero_price_does_not_overwrite() {
        let mut ledger = Ledger::default();
        ledger.add_or_increment("ABC", 3, Money::from_cents(999));
        ledger.add_or_increment("ABC", 2, Money::zero());

        assert_eq!(ledger.entries()[0], Entry::new("ABC", 5, Money::from_cents(999)));

        ledger.add_or_increment("ABC", 1, Money::from_cents(1250));
        assert_eq!(ledger.entries()[0].price, Money::from_cents(1250));
    }

    #[test]
    fn test_always_overwrite_policy() {
        let mut ledger = Ledger::new(PriceMergePolicy::AlwaysOverwrite);
        ledger.add_or_increment("ABC", 3, Money::from_cents(999));
        ledger.add_or_increment("ABC", 2, Money::zero());

        assert_eq!(ledger.entries()[0], Entry::new("ABC", 5, Money::zero()));
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let mut ledger = Ledger::default();
        for code in ["B", "A", "C", "A"] {
            ledger.add_or_increment(code, 1, Money::zero());
        }
        let codes: Vec<&str> = ledger.entries().iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_edit_field_coerces() {
        let mut ledger = Ledger::default();
        ledger.add_or_increment("A", 5, Money::from_cents(100));

        ledger.edit_field(0, LedgerField::Quantity, "0").unwrap();
        assert_eq!(ledger.entries()[0].quantity, 1);

        ledger.edit_field(0, LedgerField::Quantity, "8").unwrap();
        assert_eq!(ledger.entries()[0].quantity, 8);

        ledger.edit_field(0, LedgerField::Price, "abc").unwrap();
        assert_eq!(ledger.entries()[0].price, Money::zero());

        ledger.edit_field(0, LedgerField::Price, "2.35").unwrap();
        assert_eq!(ledger.entries()[0].price, Money::from_cents(235));

        assert_eq!(
            ledger.edit_field(3, LedgerField::Price, "1"),
            Err(CoreError::EntryNotFound(3))
        );
    }

    #[test]
    fn test_remove() {
        let mut ledger = Ledger::default();
        ledger.add_or_increment("A", 1, Money::zero());
        ledger.add_or_increment("B", 1, Money::zero());

        let removed = ledger.remove(0).unwrap();
        assert_eq!(removed.code, "A");
        assert_eq!(ledger.entries()[0].code, "B");
        assert_eq!(ledger.remove(5), Err(CoreError::EntryNotFound(5)));
    }

    #[test]
    fn test_replace_merges_duplicates() {
        let mut ledger = Ledger::default();
        ledger.replace(vec![
            Entry::new("A", 1, Money::from_cents(100)),
            Entry::new("B", 2, Money::zero()),
            Entry::new("A", 2, Money::zero()),
        ]);
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.entries()[0], Entry::new("A", 3, Money::zero()));
        assert_eq!(ledger.policy(), PriceMergePolicy::KeepUnlessNonZero);
    }

    #[test]
    fn test_totals() {
        let mut ledger = Ledger::default();
        ledger.add_or_increment("A", 2, Money::from_cents(150));
        ledger.add_or_increment("B", 1, Money::from_cents(1000));
        assert_eq!(ledger.total_quantity(), 3);
        assert_eq!(ledger.total_value().cents(), 1300);
    }

    #[test]
    fn test_oversized_values_are_clamped() {
        let mut ledger = Ledger::default();
        ledger.add_or_increment("A", i64::MAX, Money::from_cents(i64::MAX));
        ledger.add_or_increment("A", MAX_QUANTITY, Money::zero());
        ledger.add_or_increment("B", MAX_QUANTITY, MAX_PRICE);

        assert_eq!(ledger.entries()[0], Entry::new("A", MAX_QUANTITY, MAX_PRICE));
        assert_eq!(ledger.total_quantity(), 2 * MAX_QUANTITY);
        assert_eq!(
            ledger.total_value(),
            MAX_PRICE.multiply_quantity(2 * MAX_QUANTITY)
        );
    }

    #[test]
    fn test_from_entries_clamps_stored_values() {
        let ledger = Ledger::from_entries(
            vec![
                Entry::new("A", i64::MAX, Money::from_cents(i64::MAX)),
                Entry::new("B", -4, Money::from_cents(-100)),
            ],
            PriceMergePolicy::default(),
        );

        assert_eq!(ledger.entries()[0], Entry::new("A", MAX_QUANTITY, MAX_PRICE));
        assert_eq!(ledger.entries()[1], Entry::new("B", 1, Money::zero()));
        assert_eq!(ledger.total_quantity(), MAX_QUANTITY + 1);
    }

    #[test]
    fn test_parse_policy_and_field() {
        assert_eq!(
            "always-overwrite".parse::<PriceMergePolicy>().unwrap(),
            PriceMergePolicy::AlwaysOverwrite
        );
        assert_eq!("qty".parse::<LedgerField>().unwrap(), LedgerField::Quantity);
        assert!("code".parse::<LedgerField>().is_err());
    }
}
