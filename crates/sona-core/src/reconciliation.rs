//! # Reconciliation Planning
//!
//! Turns a confirmed return or exchange selection into a
//! [`ReconciliationPlan`]: the money difference plus the paired stock
//! deltas. The plan is pure data — sona-db commits it in one transaction
//! and can reverse it exactly.
//!
//! ## The Two Flows
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  RETURN                                                                 │
//! │                                                                         │
//! │    refund = Σ line_total × returned/original   (selected entries)      │
//! │    stock: `in` +return_quantity per returned line                      │
//! │                                                                         │
//! │  EXCHANGE                                                               │
//! │                                                                         │
//! │    old_total = Σ returned allocations                                  │
//! │    new_total = Σ replacement line totals (priced at current rate)      │
//! │    difference = new_total − old_total                                  │
//! │       > 0  →  additional_charge (customer owes more)                   │
//! │       < 0  →  refund = |difference|                                    │
//! │       = 0  →  both zero                                                │
//! │    stock: `in` +return_quantity per returned line                      │
//! │           `out` −quantity per replacement line                         │
//! │                                                                         │
//! │  Invariant either way: at most one of refund / additional_charge       │
//! │  is non-zero, and every stock delta is paired with a ledger entry      │
//! │  scoped to the record that caused it.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::returns::{ReturnEntry, ReturnSelection};
use crate::types::{ItemDirection, LedgerEntryType, LineItem, ReconciliationKind};

// =============================================================================
// Plan Components
// =============================================================================

/// A reconciliation line item before it is persisted.
///
/// Returned-direction items carry the original line's monetary fields
/// scaled by `return_quantity / original_quantity`. New-direction items
/// carry their fresh pricing unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedItem {
    pub direction: ItemDirection,
    pub product_id: String,
    pub name_snapshot: String,
    pub quantity: i64,
    pub base_price_paise: i64,
    pub making_charges_paise: i64,
    pub discount_paise: i64,
    pub line_total_paise: i64,
}

impl PlannedItem {
    fn returned(entry: &ReturnEntry) -> Self {
        PlannedItem {
            direction: ItemDirection::Returned,
            product_id: entry.item.product_id.clone(),
            name_snapshot: entry.item.name_snapshot.clone(),
            quantity: entry.return_quantity,
            base_price_paise: entry.allocated_base().paise(),
            making_charges_paise: entry.allocated_making_charges().paise(),
            discount_paise: entry.allocated_discount().paise(),
            line_total_paise: entry.allocated_total().paise(),
        }
    }

    fn new_item(item: &LineItem) -> Self {
        PlannedItem {
            direction: ItemDirection::New,
            product_id: item.product_id.clone(),
            name_snapshot: item.name_snapshot.clone(),
            quantity: item.quantity,
            base_price_paise: item.base_price_paise,
            making_charges_paise: item.making_charges_paise,
            discount_paise: item.discount_paise,
            line_total_paise: item.line_total_paise,
        }
    }
}

/// A stock quantity delta the commit must apply, paired one-to-one with
/// the ledger entry that records it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedStockChange {
    pub product_id: String,
    /// Signed change: positive for `in`, negative for `out`.
    pub quantity_change: i64,
    pub entry_type: LedgerEntryType,
}

// =============================================================================
// Reconciliation Plan
// =============================================================================

/// Everything a commit needs, computed before any write.
///
/// ## Invariant
/// At most one of `refund_paise` / `additional_charge_paise` is non-zero;
/// both are ≥ 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationPlan {
    pub kind: ReconciliationKind,
    /// The original sale being reconciled.
    pub sale_id: String,
    pub refund_paise: i64,
    pub additional_charge_paise: i64,
    pub reason: Option<String>,
    pub items: Vec<PlannedItem>,
    pub stock_changes: Vec<PlannedStockChange>,
}

impl ReconciliationPlan {
    /// Plans a plain return.
    ///
    /// The refund is the proportional value of every selected entry;
    /// each returned line pushes its units back into stock.
    ///
    /// ## Errors
    /// - `NoItemsSelected` when nothing is ticked
    /// - `ReturnQuantityOutOfRange` when an entry's quantity escaped the
    ///   selector's clamp (manually constructed selections)
    pub fn for_return(selection: &ReturnSelection, reason: Option<String>) -> CoreResult<Self> {
        let (items, stock_changes, old_total, sale_id) = returned_parts(selection)?;

        Ok(ReconciliationPlan {
            kind: ReconciliationKind::Return,
            sale_id,
            refund_paise: old_total.paise(),
            additional_charge_paise: 0,
            reason,
            items,
            stock_changes,
        })
    }

    /// Plans an exchange: returned entries against freshly priced
    /// replacement items.
    ///
    /// The difference decides the direction of money: a dearer
    /// replacement becomes an additional charge, a cheaper one a refund,
    /// equal values cancel to zero on both sides.
    ///
    /// ## Errors
    /// As [`Self::for_return`], plus `NoReplacementItems` when the
    /// replacement list is empty.
    pub fn for_exchange(
        selection: &ReturnSelection,
        new_items: &[LineItem],
        reason: Option<String>,
    ) -> CoreResult<Self> {
        if new_items.is_empty() {
            return Err(CoreError::NoReplacementItems);
        }
        for item in new_items {
            if item.quantity < 1 {
                return Err(CoreError::InvalidQuantity {
                    requested: item.quantity,
                });
            }
        }

        let (mut items, mut stock_changes, old_total, sale_id) = returned_parts(selection)?;

        let new_total: Money = new_items
            .iter()
            .fold(Money::zero(), |acc, i| acc + i.line_total());

        for item in new_items {
            items.push(PlannedItem::new_item(item));
            stock_changes.push(PlannedStockChange {
                product_id: item.product_id.clone(),
                quantity_change: -item.quantity,
                entry_type: LedgerEntryType::Out,
            });
        }

        let difference = new_total - old_total;
        let (refund, additional) = if difference.is_positive() {
            (Money::zero(), difference)
        } else {
            (difference.abs(), Money::zero())
        };

        Ok(ReconciliationPlan {
            kind: ReconciliationKind::Exchange,
            sale_id,
            refund_paise: refund.paise(),
            additional_charge_paise: additional.paise(),
            reason,
            items,
            stock_changes,
        })
    }

    /// Returns the refund as Money.
    #[inline]
    pub fn refund(&self) -> Money {
        Money::from_paise(self.refund_paise)
    }

    /// Returns the additional charge as Money.
    #[inline]
    pub fn additional_charge(&self) -> Money {
        Money::from_paise(self.additional_charge_paise)
    }
}

/// Validates the selection and builds the returned-direction half shared
/// by both flows: planned items, `in` stock deltas, and the old total.
fn returned_parts(
    selection: &ReturnSelection,
) -> CoreResult<(Vec<PlannedItem>, Vec<PlannedStockChange>, Money, String)> {
    if !selection.has_selection() {
        return Err(CoreError::NoItemsSelected);
    }

    let mut items = Vec::new();
    let mut stock_changes = Vec::new();
    let mut old_total = Money::zero();
    let mut sale_id = String::new();

    for entry in selection.selected_entries() {
        if entry.return_quantity < 1 || entry.return_quantity > entry.max_quantity {
            return Err(CoreError::ReturnQuantityOutOfRange {
                requested: entry.return_quantity,
                max: entry.max_quantity,
            });
        }
        if sale_id.is_empty() {
            sale_id = entry.item.sale_id.clone();
        }

        old_total += entry.allocated_total();
        items.push(PlannedItem::returned(entry));
        stock_changes.push(PlannedStockChange {
            product_id: entry.item.product_id.clone(),
            quantity_change: entry.return_quantity,
            entry_type: LedgerEntryType::In,
        });
    }

    Ok((items, stock_changes, old_total, sale_id))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::DiscountSpec;
    use crate::types::{Metal, PricingMode, Product};
    use chrono::Utc;

    fn product(id: &str, flat_price_paise: i64) -> Product {
        Product {
            id: id.to_string(),
            sku: format!("SKU-{}", id),
            name: format!("Product {}", id),
            description: None,
            pricing_mode: PricingMode::FlatPrice,
            metal: Metal::Gold,
            weight_mg: 0,
            making_rate_paise: 0,
            flat_price_paise,
            stock_quantity: 10,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sold_item(product_id: &str, unit_paise: i64, quantity: i64) -> LineItem {
        let mut item = LineItem::from_product(&product(product_id, unit_paise), quantity, Money::zero());
        item.sale_id = "sale-1".to_string();
        item
    }

    fn selection_of(items: Vec<LineItem>, picks: &[(usize, i64)]) -> ReturnSelection {
        let mut selection = ReturnSelection::from_items(items);
        for &(index, qty) in picks {
            selection.toggle(index).unwrap();
            selection.set_return_quantity(index, qty).unwrap();
        }
        selection
    }

    #[test]
    fn test_return_plan_refund_and_stock() {
        // Two lines, return 1 of 4 units of the first only
        let selection = selection_of(
            vec![sold_item("p1", 56_500, 4), sold_item("p2", 10_000, 2)],
            &[(0, 1)],
        );

        let plan = ReconciliationPlan::for_return(&selection, Some("bent".into())).unwrap();

        assert_eq!(plan.kind, ReconciliationKind::Return);
        assert_eq!(plan.sale_id, "sale-1");
        assert_eq!(plan.refund_paise, 56_500); // ₹565.00
        assert_eq!(plan.additional_charge_paise, 0);

        assert_eq!(plan.items.len(), 1);
        assert_eq!(plan.items[0].direction, ItemDirection::Returned);
        assert_eq!(plan.items[0].quantity, 1);

        assert_eq!(plan.stock_changes.len(), 1);
        assert_eq!(plan.stock_changes[0].product_id, "p1");
        assert_eq!(plan.stock_changes[0].quantity_change, 1);
        assert_eq!(plan.stock_changes[0].entry_type, LedgerEntryType::In);
    }

    #[test]
    fn test_return_with_nothing_selected_is_rejected() {
        let selection = ReturnSelection::from_items(vec![sold_item("p1", 56_500, 4)]);
        assert!(matches!(
            ReconciliationPlan::for_return(&selection, None),
            Err(CoreError::NoItemsSelected)
        ));
    }

    /// Spec scenario: old ₹2000, new ₹2500 → charge ₹500, refund 0, one
    /// `in` and one `out` entry.
    #[test]
    fn test_exchange_dearer_replacement() {
        let selection = selection_of(vec![sold_item("p1", 200_000, 1)], &[(0, 1)]);
        let replacement = sold_item("p2", 250_000, 1);

        let plan =
            ReconciliationPlan::for_exchange(&selection, &[replacement], None).unwrap();

        assert_eq!(plan.kind, ReconciliationKind::Exchange);
        assert_eq!(plan.additional_charge_paise, 50_000); // ₹500
        assert_eq!(plan.refund_paise, 0);

        assert_eq!(plan.stock_changes.len(), 2);
        assert_eq!(plan.stock_changes[0].entry_type, LedgerEntryType::In);
        assert_eq!(plan.stock_changes[0].quantity_change, 1);
        assert_eq!(plan.stock_changes[1].entry_type, LedgerEntryType::Out);
        assert_eq!(plan.stock_changes[1].quantity_change, -1);
    }

    #[test]
    fn test_exchange_cheaper_replacement_refunds() {
        let selection = selection_of(vec![sold_item("p1", 250_000, 1)], &[(0, 1)]);
        let replacement = sold_item("p2", 200_000, 1);

        let plan =
            ReconciliationPlan::for_exchange(&selection, &[replacement], None).unwrap();

        assert_eq!(plan.refund_paise, 50_000);
        assert_eq!(plan.additional_charge_paise, 0);
    }

    #[test]
    fn test_exchange_equal_values_is_zero_both_sides() {
        let selection = selection_of(vec![sold_item("p1", 200_000, 1)], &[(0, 1)]);
        let replacement = sold_item("p2", 200_000, 1);

        let plan =
            ReconciliationPlan::for_exchange(&selection, &[replacement], None).unwrap();

        assert_eq!(plan.refund_paise, 0);
        assert_eq!(plan.additional_charge_paise, 0);
    }

    #[test]
    fn test_exchange_requires_replacements() {
        let selection = selection_of(vec![sold_item("p1", 200_000, 1)], &[(0, 1)]);
        assert!(matches!(
            ReconciliationPlan::for_exchange(&selection, &[], None),
            Err(CoreError::NoReplacementItems)
        ));
    }

    #[test]
    fn test_at_most_one_money_direction() {
        // Across a spread of old/new values, refund and additional
        // charge are never both non-zero
        for (old, new) in [(100, 300), (300, 100), (200, 200), (1, 2), (2, 1)] {
            let selection = selection_of(vec![sold_item("p1", old, 1)], &[(0, 1)]);
            let plan = ReconciliationPlan::for_exchange(
                &selection,
                &[sold_item("p2", new, 1)],
                None,
            )
            .unwrap();
            assert!(
                plan.refund_paise == 0 || plan.additional_charge_paise == 0,
                "old={} new={}",
                old,
                new
            );
            assert!(plan.refund_paise >= 0 && plan.additional_charge_paise >= 0);
        }
    }

    #[test]
    fn test_returned_items_scale_discount_proportionally() {
        let prod = Product {
            pricing_mode: PricingMode::WeightBased,
            weight_mg: 10_000,
            making_rate_paise: 2_000,
            flat_price_paise: 0,
            ..product("p1", 0)
        };
        let mut item = LineItem::from_product(&prod, 2, Money::from_rupees(95));
        item.apply_discount(DiscountSpec::percentage(1000));
        item.sale_id = "sale-1".to_string();
        // base ₹1900, making ₹400, discount ₹40, total ₹2260

        let selection = selection_of(vec![item], &[(0, 1)]);
        let plan = ReconciliationPlan::for_return(&selection, None).unwrap();

        let returned = &plan.items[0];
        assert_eq!(returned.base_price_paise, 95_000);
        assert_eq!(returned.making_charges_paise, 20_000);
        assert_eq!(returned.discount_paise, 2_000);
        assert_eq!(returned.line_total_paise, 113_000);
    }
}
