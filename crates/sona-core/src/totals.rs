//! # Sale Totals Aggregator
//!
//! Folds a sale's line items into sale-level totals.
//!
//! GST is applied to the sale subtotal from a single explicit [`TaxRate`]
//! argument — never from the per-item `gst_bps` field, which exists only
//! for record-keeping. Passing the rate in keeps the aggregate honest even
//! if stored per-item rates drift.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{LineItem, TaxRate};

/// Sale-level totals, derived from line items.
///
/// Never stored independently of the items — always recomputable via
/// [`SaleTotals::of`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SaleTotals {
    /// Σ line_total over all items.
    pub subtotal_paise: i64,
    /// Σ discount over all items.
    pub discount_total_paise: i64,
    /// subtotal × gst rate, rounded.
    pub tax_paise: i64,
    /// subtotal + tax.
    pub grand_total_paise: i64,
}

impl SaleTotals {
    /// Aggregates line items at the given GST rate.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let totals = SaleTotals::of(&items, TaxRate::from_bps(GST_RATE_BPS));
    /// ```
    pub fn of(items: &[LineItem], gst_rate: TaxRate) -> Self {
        let subtotal: Money = items
            .iter()
            .fold(Money::zero(), |acc, i| acc + i.line_total());
        let discount_total: Money = items
            .iter()
            .fold(Money::zero(), |acc, i| acc + i.discount());
        let tax = subtotal.calculate_tax(gst_rate);

        SaleTotals {
            subtotal_paise: subtotal.paise(),
            discount_total_paise: discount_total.paise(),
            tax_paise: tax.paise(),
            grand_total_paise: (subtotal + tax).paise(),
        }
    }

    /// Returns the subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_paise(self.subtotal_paise)
    }

    /// Returns the tax amount as Money.
    #[inline]
    pub fn tax(&self) -> Money {
        Money::from_paise(self.tax_paise)
    }

    /// Returns the grand total as Money.
    #[inline]
    pub fn grand_total(&self) -> Money {
        Money::from_paise(self.grand_total_paise)
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

    fn chain_product() -> Product {
        Product {
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
        }
    }

    fn set_product() -> Product {
        Product {
            id: "p2".to_string(),
            sku: "BOX-SET".to_string(),
            name: "Silver Gift Set".to_string(),
            description: None,
            pricing_mode: PricingMode::FlatPrice,
            metal: Metal::Silver,
            weight_mg: 0,
            making_rate_paise: 0,
            flat_price_paise: 500_000,
            stock_quantity: 5,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_aggregate_mixed_sale() {
        let mut chain = LineItem::from_product(&chain_product(), 2, Money::from_rupees(95));
        chain.apply_discount(DiscountSpec::percentage(1000)); // ₹2260.00
        let mut set = LineItem::from_product(&set_product(), 3, Money::zero());
        set.apply_discount(DiscountSpec::fixed(Money::from_rupees(1000))); // ₹14000.00

        let totals = SaleTotals::of(&[chain, set], TaxRate::from_bps(300));

        assert_eq!(totals.subtotal_paise, 226_000 + 1_400_000);
        assert_eq!(totals.discount_total_paise, 4_000 + 100_000);
        // 3% of ₹16260.00 = ₹487.80
        assert_eq!(totals.tax_paise, 48_780);
        assert_eq!(totals.grand_total_paise, 1_626_000 + 48_780);
    }

    #[test]
    fn test_aggregate_empty_sale_is_zero() {
        let totals = SaleTotals::of(&[], TaxRate::from_bps(300));
        assert_eq!(totals, SaleTotals::default());
    }

    #[test]
    fn test_tax_uses_explicit_rate_not_item_field() {
        let item = LineItem::from_product(&set_product(), 1, Money::zero());
        // Item records 3% GST, but the aggregate is computed at zero
        let totals = SaleTotals::of(&[item], TaxRate::zero());
        assert_eq!(totals.tax_paise, 0);
        assert_eq!(totals.grand_total_paise, totals.subtotal_paise);
    }
}
