//! # Return/Exchange Selector
//!
//! Transient selection state for the return flow: which of an original
//! sale's items come back, and how many units of each.
//!
//! ## Selection Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Return Selection Flow                                │
//! │                                                                         │
//! │  Invoice looked up ──► ReturnSelection::from_items(sale items)         │
//! │                                                                         │
//! │  Operator ticks a line ──────► toggle(i)                               │
//! │  Operator edits units ───────► set_return_quantity(i, n)  [clamped]    │
//! │  Operator types a reason ────► set_reason(i, text)                     │
//! │                                                                         │
//! │  Running refund shown ───────► selected_total()                        │
//! │                                                                         │
//! │  Confirm ──► ReconciliationPlan::for_return / for_exchange             │
//! │              (fails with NoItemsSelected if nothing is ticked)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Proportional Allocation
//! A partially returned line is valued at `line_total × returned/original`
//! — every monetary field scaled by the same ratio, never recomputed from
//! unit prices. This guarantees the returned value is an exact fraction of
//! what was actually charged, discount included, and that returning all
//! units reproduces the charged total exactly.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::LineItem;

// =============================================================================
// Return Entry
// =============================================================================

/// One original sale line, wrapped with selection state.
///
/// Created transiently when a return flow begins; discarded after the
/// reconciliation commits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnEntry {
    /// The original line item, untouched.
    pub item: LineItem,
    /// Upper bound for the return quantity (the original quantity).
    pub max_quantity: i64,
    /// Units coming back. Starts at `max_quantity`, stays in [1, max].
    pub return_quantity: i64,
    /// Whether this line participates in the return.
    pub selected: bool,
    /// Free-text reason entered by the operator.
    pub reason: Option<String>,
}

impl ReturnEntry {
    fn new(item: LineItem) -> Self {
        let max_quantity = item.quantity;
        ReturnEntry {
            item,
            max_quantity,
            return_quantity: max_quantity,
            selected: false,
            reason: None,
        }
    }

    /// The ratio applied to every monetary field of this line.
    #[inline]
    fn ratio(&self) -> (i64, i64) {
        (self.return_quantity, self.item.quantity)
    }

    /// Base price scaled to the returned quantity.
    pub fn allocated_base(&self) -> Money {
        let (k, n) = self.ratio();
        self.item.base_price().allocate(k, n)
    }

    /// Making charges scaled to the returned quantity.
    pub fn allocated_making_charges(&self) -> Money {
        let (k, n) = self.ratio();
        self.item.making_charges().allocate(k, n)
    }

    /// Discount scaled to the returned quantity.
    pub fn allocated_discount(&self) -> Money {
        let (k, n) = self.ratio();
        self.item.discount().allocate(k, n)
    }

    /// The value of the returned units: `line_total × returned/original`.
    pub fn allocated_total(&self) -> Money {
        let (k, n) = self.ratio();
        self.item.line_total().allocate(k, n)
    }
}

// =============================================================================
// Return Selection
// =============================================================================

/// Selection state over all items of one original sale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReturnSelection {
    entries: Vec<ReturnEntry>,
}

impl ReturnSelection {
    /// Builds a selection from an original sale's line items.
    ///
    /// Every entry starts unselected with `return_quantity` at the full
    /// original quantity.
    pub fn from_items(items: Vec<LineItem>) -> Self {
        ReturnSelection {
            entries: items.into_iter().map(ReturnEntry::new).collect(),
        }
    }

    /// All entries, in original sale order.
    pub fn entries(&self) -> &[ReturnEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the original sale had no items.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flips the selected flag of one entry.
    pub fn toggle(&mut self, index: usize) -> CoreResult<()> {
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(CoreError::EntryNotFound { index })?;
        entry.selected = !entry.selected;
        Ok(())
    }

    /// Sets the return quantity of one entry, clamped into
    /// `[1, max_quantity]`.
    ///
    /// Clamping (not rejection) matches the operator experience: typing
    /// 0 or 99 lands on the nearest legal value.
    pub fn set_return_quantity(&mut self, index: usize, quantity: i64) -> CoreResult<()> {
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(CoreError::EntryNotFound { index })?;
        entry.return_quantity = quantity.clamp(1, entry.max_quantity);
        Ok(())
    }

    /// Sets the free-text reason of one entry.
    pub fn set_reason(&mut self, index: usize, reason: impl Into<String>) -> CoreResult<()> {
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(CoreError::EntryNotFound { index })?;
        entry.reason = Some(reason.into());
        Ok(())
    }

    /// True when at least one entry is selected.
    pub fn has_selection(&self) -> bool {
        self.entries.iter().any(|e| e.selected)
    }

    /// Selected entries only.
    pub fn selected_entries(&self) -> impl Iterator<Item = &ReturnEntry> {
        self.entries.iter().filter(|e| e.selected)
    }

    /// Σ allocated totals over selected entries — the running refund
    /// figure shown while the operator picks items.
    pub fn selected_total(&self) -> Money {
        self.selected_entries()
            .fold(Money::zero(), |acc, e| acc + e.allocated_total())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::pricing::DiscountSpec;
    use crate::types::{Metal, PricingMode, Product};
    use chrono::Utc;

    fn chain_item(quantity: i64) -> LineItem {
        let product = Product {
            id: "p1".to_string(),
            sku: "CHAIN-22K".to_string(),
            name: "Gold Chain 22K".to_string(),
            description: None,
            pricing_mode: PricingMode::WeightBased,
            metal: Metal::Gold,
            weight_mg: 10_000,
            making_rate_paise: 2_000,
            flat_price_paise: 0,
            stock_quantity: 5,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let mut item = LineItem::from_product(&product, quantity, Money::from_rupees(95));
        item.apply_discount(DiscountSpec::percentage(1000));
        item
    }

    #[test]
    fn test_entries_start_unselected_at_max() {
        let selection = ReturnSelection::from_items(vec![chain_item(4)]);
        let entry = &selection.entries()[0];
        assert!(!entry.selected);
        assert_eq!(entry.max_quantity, 4);
        assert_eq!(entry.return_quantity, 4);
        assert!(!selection.has_selection());
    }

    #[test]
    fn test_toggle() {
        let mut selection = ReturnSelection::from_items(vec![chain_item(4)]);
        selection.toggle(0).unwrap();
        assert!(selection.entries()[0].selected);
        selection.toggle(0).unwrap();
        assert!(!selection.entries()[0].selected);

        assert!(matches!(
            selection.toggle(5),
            Err(CoreError::EntryNotFound { index: 5 })
        ));
    }

    #[test]
    fn test_return_quantity_clamped() {
        let mut selection = ReturnSelection::from_items(vec![chain_item(4)]);

        selection.set_return_quantity(0, 0).unwrap();
        assert_eq!(selection.entries()[0].return_quantity, 1);

        selection.set_return_quantity(0, 99).unwrap();
        assert_eq!(selection.entries()[0].return_quantity, 4);

        selection.set_return_quantity(0, 3).unwrap();
        assert_eq!(selection.entries()[0].return_quantity, 3);
    }

    /// Spec scenario: qty 4, line total ₹2260.00, return 1 → ₹565.00.
    #[test]
    fn test_proportional_allocation() {
        let item = chain_item(4);
        // qty 4: base ₹3800, making ₹800, discount ₹80, total ₹4520
        assert_eq!(item.line_total_paise, 452_000);

        let mut selection = ReturnSelection::from_items(vec![item]);
        selection.toggle(0).unwrap();
        selection.set_return_quantity(0, 1).unwrap();

        // ₹4520 × 1/4 = ₹1130... the spec's 2260/4 figure assumes the
        // ₹2260 two-unit line; check the ratio rule directly instead
        let entry = &selection.entries()[0];
        assert_eq!(entry.allocated_total().paise(), 113_000);
        assert_eq!(entry.allocated_base().paise(), 95_000);
        assert_eq!(entry.allocated_making_charges().paise(), 20_000);
        assert_eq!(entry.allocated_discount().paise(), 2_000);
    }

    /// Spec scenario: an item charged ₹2260.00 for 4 units refunds
    /// exactly ₹565.00 per returned unit.
    #[test]
    fn test_quarter_return_of_2260_line() {
        let product = Product {
            id: "p2".to_string(),
            sku: "RING-PLAIN".to_string(),
            name: "Plain Ring".to_string(),
            description: None,
            pricing_mode: PricingMode::FlatPrice,
            metal: Metal::Gold,
            weight_mg: 0,
            making_rate_paise: 0,
            flat_price_paise: 56_500,
            stock_quantity: 10,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let item = LineItem::from_product(&product, 4, Money::zero());
        assert_eq!(item.line_total_paise, 226_000);

        let mut selection = ReturnSelection::from_items(vec![item]);
        selection.toggle(0).unwrap();
        selection.set_return_quantity(0, 1).unwrap();
        assert_eq!(selection.selected_total().paise(), 56_500); // ₹565.00
    }

    #[test]
    fn test_full_return_reproduces_charged_total() {
        let item = chain_item(3);
        let charged = item.line_total();

        let mut selection = ReturnSelection::from_items(vec![item]);
        selection.toggle(0).unwrap();
        // return_quantity defaults to max
        assert_eq!(selection.selected_total(), charged);
    }

    #[test]
    fn test_selected_total_sums_only_selected() {
        let mut selection = ReturnSelection::from_items(vec![chain_item(2), chain_item(2)]);
        assert_eq!(selection.selected_total(), Money::zero());

        selection.toggle(1).unwrap();
        assert_eq!(selection.selected_total().paise(), 226_000);
    }

    #[test]
    fn test_reason_recorded() {
        let mut selection = ReturnSelection::from_items(vec![chain_item(2)]);
        selection.set_reason(0, "clasp broken").unwrap();
        assert_eq!(selection.entries()[0].reason.as_deref(), Some("clasp broken"));
    }
}
