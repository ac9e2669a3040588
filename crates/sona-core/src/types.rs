//! # Domain Types
//!
//! Core domain types used throughout Sona POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    LineItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  pricing_mode   │       │
//! │  │  sku (business) │   │  invoice_number │   │  weight_mg      │       │
//! │  │  pricing_mode   │   │  status         │   │  discount spec  │       │
//! │  │  stock_quantity │   │  total_paise    │   │  line_total     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌──────────────────────┐   ┌──────────────────────┐                   │
//! │  │ ReconciliationRecord │   │   StockLedgerEntry   │                   │
//! │  │  ──────────────────  │   │  ──────────────────  │                   │
//! │  │  kind return|exchange│   │  quantity_change ±n  │                   │
//! │  │  refund_paise        │   │  entry_type in|out   │                   │
//! │  │  additional_charge   │   │  reference_id        │                   │
//! │  └──────────────────────┘   └──────────────────────┘                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (sku, invoice_number, reference_number) - human-readable

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::{Money, Weight};

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 300 bps = 3% (GST on jewellery)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Enums
// =============================================================================

/// How a line item's price is derived.
///
/// Immutable once the item is created — it determines which input fields
/// are meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PricingMode {
    /// weight × rate-per-gram plus a per-gram making charge.
    WeightBased,
    /// Fixed price per unit, independent of weight.
    FlatPrice,
}

/// The metal a product is made of. Determines which current rate applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum Metal {
    Gold,
    Silver,
}

/// How a discount input is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    /// Value is basis points of the discountable base (1000 = 10%).
    Percentage,
    /// Value is a money amount in paise.
    Fixed,
}

/// The status of a sale transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Sale is in progress (items being added).
    Draft,
    /// Sale has been paid and finalized. Items are immutable from here,
    /// except via a return/exchange reconciliation.
    Completed,
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Draft
    }
}

/// Whether a reconciliation is a plain return or an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationKind {
    Return,
    Exchange,
}

/// Which side of a reconciliation a line item sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum ItemDirection {
    /// Came back from the customer; stock goes up.
    Returned,
    /// Replacement chosen during an exchange; stock goes down.
    New,
}

/// Direction of a stock ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum LedgerEntryType {
    /// Quantity came into stock (positive change).
    In,
    /// Quantity left stock (negative change).
    Out,
}

// =============================================================================
// Product
// =============================================================================

/// A jewellery product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Display name shown on the invoice.
    pub name: String,

    /// Optional description (purity, design notes).
    pub description: Option<String>,

    /// How this product is priced.
    pub pricing_mode: PricingMode,

    /// Metal type; selects which current rate applies.
    pub metal: Metal,

    /// Metal weight in milligrams (per unit).
    pub weight_mg: i64,

    /// Making charge per gram, in paise (weight-based pricing only).
    pub making_rate_paise: i64,

    /// Gross price per unit, in paise (flat pricing only).
    pub flat_price_paise: i64,

    /// Units on hand. May go negative during an exchange oversell.
    pub stock_quantity: i64,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the weight as a Weight type.
    #[inline]
    pub fn weight(&self) -> Weight {
        Weight::from_milligrams(self.weight_mg)
    }

    /// Returns the per-gram making charge as Money.
    #[inline]
    pub fn making_rate(&self) -> Money {
        Money::from_paise(self.making_rate_paise)
    }

    /// Returns the flat price as Money.
    #[inline]
    pub fn flat_price(&self) -> Money {
        Money::from_paise(self.flat_price_paise)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A completed or in-progress sale transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    pub invoice_number: String,
    pub status: SaleStatus,
    pub subtotal_paise: i64,
    pub discount_paise: i64,
    pub tax_paise: i64,
    pub total_paise: i64,
    pub customer_name: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Sale {
    /// Returns the grand total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_paise(self.total_paise)
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// A line item on a sale.
///
/// Uses the snapshot pattern: every pricing input (weight, rates, flat
/// price) is frozen from the product at the time of sale, so the line
/// remains self-contained even if the product or the metal rate changes
/// later. The derived fields (`base_price_paise`, `making_charges_paise`,
/// `discount_paise`, `line_total_paise`) are maintained by the mutators in
/// [`crate::pricing`] and are always consistent with the inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct LineItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// SKU at time of sale (frozen).
    pub sku_snapshot: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    /// Pricing mode (frozen; immutable for the life of the item).
    pub pricing_mode: PricingMode,
    /// Metal weight per unit in milligrams (frozen).
    pub weight_mg: i64,
    /// Units sold. Always ≥ 1.
    pub quantity: i64,
    /// Metal rate per gram in paise at time of sale (frozen default,
    /// editable on the line).
    pub rate_per_gram_paise: i64,
    /// Making charge per gram in paise (frozen).
    pub making_rate_paise: i64,
    /// Gross flat price per unit in paise (flat pricing only).
    pub flat_price_paise: i64,
    /// Derived: metal value (weight-based) or gross total (flat).
    pub base_price_paise: i64,
    /// Derived: making charges for the whole line. Zero for flat pricing.
    pub making_charges_paise: i64,
    /// Discount specification: how `discount_value` is interpreted.
    pub discount_kind: DiscountKind,
    /// Raw discount input: bps for percentage, paise for fixed.
    pub discount_value: i64,
    /// Derived money amount actually subtracted. Clamped to its base.
    pub discount_paise: i64,
    /// Derived: the line's contribution to the sale subtotal.
    pub line_total_paise: i64,
    /// GST rate stored per item for record-keeping. Aggregation applies a
    /// single sale-wide rate, not this field.
    pub gst_bps: i64,
    pub created_at: DateTime<Utc>,
}

impl LineItem {
    /// Returns the weight as a Weight type.
    #[inline]
    pub fn weight(&self) -> Weight {
        Weight::from_milligrams(self.weight_mg)
    }

    /// Returns the metal rate per gram as Money.
    #[inline]
    pub fn rate_per_gram(&self) -> Money {
        Money::from_paise(self.rate_per_gram_paise)
    }

    /// Returns the base price as Money.
    #[inline]
    pub fn base_price(&self) -> Money {
        Money::from_paise(self.base_price_paise)
    }

    /// Returns the making charges as Money.
    #[inline]
    pub fn making_charges(&self) -> Money {
        Money::from_paise(self.making_charges_paise)
    }

    /// Returns the applied discount as Money.
    #[inline]
    pub fn discount(&self) -> Money {
        Money::from_paise(self.discount_paise)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_paise(self.line_total_paise)
    }
}

// =============================================================================
// Reconciliation Record
// =============================================================================

/// The persisted outcome of a return or exchange transaction.
///
/// ## Invariant
/// At most one of `refund_paise` / `additional_charge_paise` is non-zero.
/// Both are zero only when the returned and replacement values are equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ReconciliationRecord {
    pub id: String,
    /// Human-readable code, e.g. `RET-20260806-0042`.
    pub reference_number: String,
    /// The original sale being reconciled.
    pub sale_id: String,
    pub kind: ReconciliationKind,
    /// Money owed back to the customer. Never negative.
    pub refund_paise: i64,
    /// Money the customer owes on top (exchange upgrade). Never negative.
    pub additional_charge_paise: i64,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ReconciliationRecord {
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

/// A line item attached to a reconciliation record.
///
/// Returned-direction items carry the original line's monetary fields
/// scaled to the returned quantity. New-direction items are priced fresh
/// at the current metal rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ReconciliationItem {
    pub id: String,
    pub record_id: String,
    pub direction: ItemDirection,
    pub product_id: String,
    pub name_snapshot: String,
    /// Returned quantity (returned direction) or replacement quantity
    /// (new direction). Always ≥ 1.
    pub quantity: i64,
    pub base_price_paise: i64,
    pub making_charges_paise: i64,
    pub discount_paise: i64,
    pub line_total_paise: i64,
    pub created_at: DateTime<Utc>,
}

impl ReconciliationItem {
    /// Returns the item's total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_paise(self.line_total_paise)
    }
}

// =============================================================================
// Stock Ledger
// =============================================================================

/// An append-only record of a signed stock quantity change.
///
/// Every reconciliation commit writes one entry per affected product,
/// scoped by `reference_id`. Deleting the record applies the exact
/// opposite of each entry and removes them, so the ledger nets to zero
/// for that reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockLedgerEntry {
    pub id: String,
    pub product_id: String,
    /// Signed change applied to the product's `stock_quantity`.
    /// Positive for `in`, negative for `out`.
    pub quantity_change: i64,
    pub entry_type: LedgerEntryType,
    /// The reconciliation record this entry belongs to.
    pub reference_id: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Metal Rate
// =============================================================================

/// A point-in-time per-gram metal rate.
///
/// The latest row per metal is the "current rate" used as the default
/// for new weight-based line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct MetalRate {
    pub id: String,
    pub metal: Metal,
    pub rate_per_gram_paise: i64,
    pub effective_at: DateTime<Utc>,
}

impl MetalRate {
    /// Returns the per-gram rate as Money.
    #[inline]
    pub fn rate_per_gram(&self) -> Money {
        Money::from_paise(self.rate_per_gram_paise)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(300);
        assert_eq!(rate.bps(), 300);
        assert!((rate.percentage() - 3.0).abs() < 0.001);
    }

    #[test]
    fn test_tax_rate_from_percentage() {
        let rate = TaxRate::from_percentage(3.0);
        assert_eq!(rate.bps(), 300);
    }

    #[test]
    fn test_sale_status_default() {
        assert_eq!(SaleStatus::default(), SaleStatus::Draft);
    }

    #[test]
    fn test_enum_serde_names() {
        // Wire/database names are snake_case
        assert_eq!(
            serde_json::to_string(&PricingMode::WeightBased).unwrap(),
            "\"weight_based\""
        );
        assert_eq!(
            serde_json::to_string(&LedgerEntryType::In).unwrap(),
            "\"in\""
        );
        assert_eq!(
            serde_json::to_string(&ItemDirection::Returned).unwrap(),
            "\"returned\""
        );
    }
}
