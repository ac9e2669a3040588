//! # Pricing Rules
//!
//! Pure derivation of a line item's monetary fields, and the mutators
//! that keep them consistent when an input changes.
//!
//! ## The Two Pricing Modes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  WEIGHT-BASED (chains, bangles, anything sold by metal weight)          │
//! │                                                                         │
//! │    base_price     = weight × rate_per_gram × quantity                  │
//! │    making_charges = weight × making_rate   × quantity                  │
//! │    discount       = derived against MAKING CHARGES only               │
//! │    line_total     = base_price + (making_charges − discount)           │
//! │                                                                         │
//! │  FLAT-PRICE (stones, boxed sets, fixed-tag items)                       │
//! │                                                                         │
//! │    base_price     = flat_price × quantity                              │
//! │    making_charges = 0                                                  │
//! │    discount       = derived against the GROSS TOTAL (base_price)       │
//! │    line_total     = base_price − discount                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Discount Is a Specification, Not a Number
//! The discount is stored as `(kind, value)` and re-derived from scratch
//! whenever its base changes (quantity change). A 10% discount stays 10%
//! after the quantity doubles; a fixed ₹100 discount stays ₹100 but is
//! clamped if the base shrinks below it. See [`DiscountSpec::amount_off`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{DiscountKind, LineItem, PricingMode, Product};
use crate::GST_RATE_BPS;

// =============================================================================
// Discount Specification
// =============================================================================

/// A discount as the operator entered it: a kind plus a raw value.
///
/// - `Percentage`: value is basis points (1000 = 10%)
/// - `Fixed`: value is paise
///
/// The derived money amount lives on the line item (`discount_paise`);
/// this spec is what gets re-applied whenever the base changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountSpec {
    pub kind: DiscountKind,
    pub value: i64,
}

impl DiscountSpec {
    /// No discount (fixed zero).
    pub const fn none() -> Self {
        DiscountSpec {
            kind: DiscountKind::Fixed,
            value: 0,
        }
    }

    /// Percentage discount from basis points (1000 = 10%).
    pub const fn percentage(bps: u32) -> Self {
        DiscountSpec {
            kind: DiscountKind::Percentage,
            value: bps as i64,
        }
    }

    /// Fixed money discount.
    pub const fn fixed(amount: Money) -> Self {
        DiscountSpec {
            kind: DiscountKind::Fixed,
            value: amount.paise(),
        }
    }

    /// Derives the money amount this spec takes off the given base.
    ///
    /// ## Invariant
    /// `0 ≤ result ≤ base` — a discount can never make its base negative,
    /// and a negative raw value derives to zero.
    ///
    /// ## Example
    /// ```rust
    /// use sona_core::money::Money;
    /// use sona_core::pricing::DiscountSpec;
    ///
    /// let making = Money::from_paise(40_000); // ₹400.00
    /// assert_eq!(DiscountSpec::percentage(1000).amount_off(making).paise(), 4_000);
    /// assert_eq!(
    ///     DiscountSpec::fixed(Money::from_paise(50_000)).amount_off(making),
    ///     making // clamped
    /// );
    /// ```
    pub fn amount_off(&self, base: Money) -> Money {
        let raw = match self.kind {
            DiscountKind::Percentage => base.percent_of(self.value.max(0) as u32),
            DiscountKind::Fixed => Money::from_paise(self.value.max(0)),
        };
        raw.min(base).max(Money::zero())
    }
}

impl Default for DiscountSpec {
    fn default() -> Self {
        DiscountSpec::none()
    }
}

// =============================================================================
// Line Item Construction
// =============================================================================

impl LineItem {
    /// Creates a line item from a product and quantity.
    ///
    /// ## Snapshot Pattern
    /// Every pricing input is copied from the product at this moment.
    /// If the product or the metal rate changes in the database later,
    /// this line retains what the customer was actually quoted.
    ///
    /// ## Arguments
    /// * `product` - the product being sold
    /// * `quantity` - units, ≥ 1 (validated by the caller)
    /// * `rate_per_gram` - current metal rate, the weight-based default
    pub fn from_product(product: &Product, quantity: i64, rate_per_gram: Money) -> Self {
        let now = chrono::Utc::now();
        let mut item = LineItem {
            id: Uuid::new_v4().to_string(),
            sale_id: String::new(),
            product_id: product.id.clone(),
            sku_snapshot: product.sku.clone(),
            name_snapshot: product.name.clone(),
            pricing_mode: product.pricing_mode,
            weight_mg: product.weight_mg,
            quantity,
            rate_per_gram_paise: rate_per_gram.paise(),
            making_rate_paise: product.making_rate_paise,
            flat_price_paise: product.flat_price_paise,
            base_price_paise: 0,
            making_charges_paise: 0,
            discount_kind: DiscountKind::Fixed,
            discount_value: 0,
            discount_paise: 0,
            line_total_paise: 0,
            gst_bps: GST_RATE_BPS as i64,
            created_at: now,
        };
        item.recompute();
        item
    }

    /// The stored discount specification.
    #[inline]
    pub fn discount_spec(&self) -> DiscountSpec {
        DiscountSpec {
            kind: self.discount_kind,
            value: self.discount_value,
        }
    }

    /// The base a discount is derived against.
    ///
    /// Weight-based items discount the making charges only — the metal
    /// value is never discounted. Flat-price items discount the
    /// quantity-scaled gross.
    #[inline]
    pub fn discountable_base(&self) -> Money {
        match self.pricing_mode {
            PricingMode::WeightBased => self.making_charges(),
            PricingMode::FlatPrice => self.base_price(),
        }
    }

    /// Re-derives base price, making charges, discount, and line total
    /// from the stored inputs. The single source of the pricing formulas.
    fn recompute(&mut self) {
        match self.pricing_mode {
            PricingMode::WeightBased => {
                self.base_price_paise = self
                    .weight()
                    .price_at(self.rate_per_gram())
                    .multiply_quantity(self.quantity)
                    .paise();
                self.making_charges_paise = self
                    .weight()
                    .price_at(Money::from_paise(self.making_rate_paise))
                    .multiply_quantity(self.quantity)
                    .paise();
            }
            PricingMode::FlatPrice => {
                self.base_price_paise = Money::from_paise(self.flat_price_paise)
                    .multiply_quantity(self.quantity)
                    .paise();
                self.making_charges_paise = 0;
            }
        }
        self.discount_paise = self
            .discount_spec()
            .amount_off(self.discountable_base())
            .paise();
        self.line_total_paise =
            self.base_price_paise + self.making_charges_paise - self.discount_paise;
    }

    // =========================================================================
    // Mutators
    // =========================================================================

    /// Applies a discount specification to this line.
    ///
    /// The derived amount is clamped to the discountable base, and the
    /// line total is re-derived:
    /// - weight-based: `base + (making − discount)`
    /// - flat-price: `base − discount`
    pub fn apply_discount(&mut self, spec: DiscountSpec) {
        self.discount_kind = spec.kind;
        self.discount_value = spec.value;
        self.discount_paise = spec.amount_off(self.discountable_base()).paise();
        self.line_total_paise =
            self.base_price_paise + self.making_charges_paise - self.discount_paise;
    }

    /// Changes the quantity and re-derives every computed field.
    ///
    /// The stored discount specification is re-applied against the new
    /// base — the discount is NOT held fixed in money terms across a
    /// quantity change.
    ///
    /// ## Errors
    /// `InvalidQuantity` for `quantity < 1`; the item is left unchanged.
    pub fn set_quantity(&mut self, quantity: i64) -> CoreResult<()> {
        if quantity < 1 {
            return Err(CoreError::InvalidQuantity {
                requested: quantity,
            });
        }
        self.quantity = quantity;
        self.recompute();
        Ok(())
    }

    /// Changes the metal rate for a weight-based line.
    ///
    /// Recomputes the base price from the new rate and quantity, then
    /// recombines with the EXISTING discounted making-charge figure —
    /// making charges and discount are untouched by a rate change.
    ///
    /// Flat-price items ignore rate changes entirely (no-op): rate is
    /// not meaningful for them.
    pub fn set_rate(&mut self, rate_per_gram: Money) {
        if self.pricing_mode != PricingMode::WeightBased {
            return;
        }
        self.rate_per_gram_paise = rate_per_gram.paise();
        self.base_price_paise = self
            .weight()
            .price_at(rate_per_gram)
            .multiply_quantity(self.quantity)
            .paise();
        self.line_total_paise =
            self.base_price_paise + self.making_charges_paise - self.discount_paise;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Metal;
    use chrono::Utc;

    fn weight_product(weight_mg: i64, making_rate_paise: i64) -> Product {
        Product {
            id: "p-weight".to_string(),
            sku: "CHAIN-22K".to_string(),
            name: "Gold Chain 22K".to_string(),
            description: None,
            pricing_mode: PricingMode::WeightBased,
            metal: Metal::Gold,
            weight_mg,
            making_rate_paise,
            flat_price_paise: 0,
            stock_quantity: 10,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn flat_product(flat_price_paise: i64) -> Product {
        Product {
            id: "p-flat".to_string(),
            sku: "BOX-SET".to_string(),
            name: "Silver Gift Set".to_string(),
            description: None,
            pricing_mode: PricingMode::FlatPrice,
            metal: Metal::Silver,
            weight_mg: 0,
            making_rate_paise: 0,
            flat_price_paise,
            stock_quantity: 10,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Spec scenario: 10 g at ₹95/g, making ₹20/g, qty 2, 10% discount.
    #[test]
    fn test_weight_based_scenario() {
        let product = weight_product(10_000, 2_000);
        let mut item = LineItem::from_product(&product, 2, Money::from_rupees(95));

        assert_eq!(item.base_price_paise, 190_000); // ₹1900
        assert_eq!(item.making_charges_paise, 40_000); // ₹400
        assert_eq!(item.line_total_paise, 230_000); // before discount

        item.apply_discount(DiscountSpec::percentage(1000));
        assert_eq!(item.discount_paise, 4_000); // ₹40
        assert_eq!(item.line_total_paise, 226_000); // ₹2260
    }

    /// Spec scenario: flat ₹5000 gross, qty 3, fixed ₹1000 discount.
    #[test]
    fn test_flat_price_scenario() {
        let product = flat_product(500_000);
        let mut item = LineItem::from_product(&product, 3, Money::zero());

        assert_eq!(item.base_price_paise, 1_500_000); // ₹15000
        assert_eq!(item.making_charges_paise, 0);

        item.apply_discount(DiscountSpec::fixed(Money::from_rupees(1000)));
        assert_eq!(item.discount_paise, 100_000);
        assert_eq!(item.line_total_paise, 1_400_000); // ₹14000
    }

    #[test]
    fn test_discount_clamped_to_making_charges() {
        let product = weight_product(10_000, 2_000);
        let mut item = LineItem::from_product(&product, 1, Money::from_rupees(95));

        // Making charges are ₹200; a ₹500 discount clamps to ₹200
        item.apply_discount(DiscountSpec::fixed(Money::from_rupees(500)));
        assert_eq!(item.discount_paise, item.making_charges_paise);
        // Line total never drops below the metal value
        assert_eq!(item.line_total_paise, item.base_price_paise);
    }

    #[test]
    fn test_discount_never_negative() {
        let product = flat_product(500_000);
        let mut item = LineItem::from_product(&product, 1, Money::zero());

        item.apply_discount(DiscountSpec {
            kind: DiscountKind::Fixed,
            value: -5_000,
        });
        assert_eq!(item.discount_paise, 0);
        assert_eq!(item.line_total_paise, item.base_price_paise);
    }

    #[test]
    fn test_quantity_change_rederives_percentage_discount() {
        let product = weight_product(10_000, 2_000);
        let mut item = LineItem::from_product(&product, 2, Money::from_rupees(95));
        item.apply_discount(DiscountSpec::percentage(1000));
        assert_eq!(item.discount_paise, 4_000);

        // Doubling the quantity doubles the making charges, and the 10%
        // discount follows the new base
        item.set_quantity(4).unwrap();
        assert_eq!(item.base_price_paise, 380_000);
        assert_eq!(item.making_charges_paise, 80_000);
        assert_eq!(item.discount_paise, 8_000);
        assert_eq!(item.line_total_paise, 452_000);
    }

    #[test]
    fn test_quantity_change_reclamps_fixed_discount() {
        let product = flat_product(100_000); // ₹1000 per unit
        let mut item = LineItem::from_product(&product, 3, Money::zero());
        item.apply_discount(DiscountSpec::fixed(Money::from_rupees(2_500)));
        assert_eq!(item.discount_paise, 250_000);

        // Base shrinks to ₹2000; the ₹2500 spec clamps to the new base
        item.set_quantity(2).unwrap();
        assert_eq!(item.base_price_paise, 200_000);
        assert_eq!(item.discount_paise, 200_000);
        assert_eq!(item.line_total_paise, 0);
    }

    #[test]
    fn test_quantity_below_one_rejected_unchanged() {
        let product = weight_product(10_000, 2_000);
        let mut item = LineItem::from_product(&product, 2, Money::from_rupees(95));
        let before = item.clone();

        assert!(matches!(
            item.set_quantity(0),
            Err(CoreError::InvalidQuantity { requested: 0 })
        ));
        assert_eq!(item.quantity, before.quantity);
        assert_eq!(item.line_total_paise, before.line_total_paise);
    }

    #[test]
    fn test_rate_change_keeps_discounted_making_figure() {
        let product = weight_product(10_000, 2_000);
        let mut item = LineItem::from_product(&product, 2, Money::from_rupees(95));
        item.apply_discount(DiscountSpec::percentage(1000));
        assert_eq!(item.line_total_paise, 226_000);

        // Rate moves ₹95 → ₹100: base becomes ₹2000, making − discount
        // (₹360) is carried over untouched
        item.set_rate(Money::from_rupees(100));
        assert_eq!(item.base_price_paise, 200_000);
        assert_eq!(item.making_charges_paise, 40_000);
        assert_eq!(item.discount_paise, 4_000);
        assert_eq!(item.line_total_paise, 236_000);
    }

    #[test]
    fn test_rate_change_is_noop_for_flat_price() {
        let product = flat_product(500_000);
        let mut item = LineItem::from_product(&product, 2, Money::zero());
        let before = item.clone();

        item.set_rate(Money::from_rupees(100));
        assert_eq!(item.rate_per_gram_paise, before.rate_per_gram_paise);
        assert_eq!(item.line_total_paise, before.line_total_paise);
    }

    #[test]
    fn test_line_total_consistency_after_any_mutator() {
        let product = weight_product(12_500, 1_500);
        let mut item = LineItem::from_product(&product, 3, Money::from_rupees(95));
        item.apply_discount(DiscountSpec::percentage(750));
        item.set_quantity(5).unwrap();
        item.set_rate(Money::from_rupees(97));

        assert_eq!(
            item.line_total_paise,
            item.base_price_paise + item.making_charges_paise - item.discount_paise
        );
        assert!(item.discount_paise >= 0);
        assert!(item.discount_paise <= item.making_charges_paise);
    }
}
