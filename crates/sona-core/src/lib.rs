//! # sona-core: Pure Business Logic for Sona POS
//!
//! This crate is the **heart** of Sona POS. It contains the pricing,
//! discount, and return/exchange reconciliation rules of a jewellery
//! retail system as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Sona POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Caller (UI, batch jobs)                      │   │
//! │  │   add line ──► edit qty/rate/discount ──► totals ──► invoice   │   │
//! │  │   find invoice ──► select returns ──► confirm ──► commit       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ sona-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────┐ ┌─────────┐ ┌────────┐ ┌─────────┐ ┌────────────┐│   │
//! │  │  │  money  │ │ pricing │ │ totals │ │ returns │ │reconcilia- ││   │
//! │  │  │  Money  │ │  rules  │ │  GST   │ │selector │ │tion plans  ││   │
//! │  │  │  Weight │ │mutators │ │  fold  │ │  ratio  │ │refund/stock││   │
//! │  │  └─────────┘ └─────────┘ └────────┘ └─────────┘ └────────────┘│   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    sona-db (Database Layer)                     │   │
//! │  │    SQLite repositories; commits/reverses reconciliation plans   │   │
//! │  │    in single transactions with paired stock-ledger entries      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, LineItem, ledger types)
//! - [`money`] - Money (paise) and Weight (milligrams), integer only
//! - [`pricing`] - Pricing rules, discount derivation, line mutators
//! - [`totals`] - Sale totals aggregation at an explicit GST rate
//! - [`returns`] - Return/exchange selection with proportional allocation
//! - [`reconciliation`] - Return/exchange plan construction
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in paise (i64), weights in
//!    milligrams - no floating point in any computation
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use sona_core::money::Money;
//! use sona_core::pricing::DiscountSpec;
//! use sona_core::types::{Metal, PricingMode, Product};
//! use sona_core::LineItem;
//!
//! # let now = chrono::Utc::now();
//! let chain = Product {
//!     id: "p1".into(),
//!     sku: "CHAIN-22K".into(),
//!     name: "Gold Chain 22K".into(),
//!     description: None,
//!     pricing_mode: PricingMode::WeightBased,
//!     metal: Metal::Gold,
//!     weight_mg: 10_000,       // 10 g
//!     making_rate_paise: 2_000, // ₹20/g
//!     flat_price_paise: 0,
//!     stock_quantity: 5,
//!     is_active: true,
//!     created_at: now,
//!     updated_at: now,
//! };
//!
//! // Two units at today's rate of ₹95/g, 10% off the making charges
//! let mut line = LineItem::from_product(&chain, 2, Money::from_rupees(95));
//! line.apply_discount(DiscountSpec::percentage(1000));
//!
//! assert_eq!(line.line_total_paise, 226_000); // ₹2260.00
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod pricing;
pub mod reconciliation;
pub mod returns;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use sona_core::Money` instead of
// `use sona_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, Weight};
pub use pricing::DiscountSpec;
pub use reconciliation::ReconciliationPlan;
pub use returns::{ReturnEntry, ReturnSelection};
pub use totals::SaleTotals;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// GST rate applied to every sale subtotal, in basis points (3%).
///
/// A single global rate: jewellery carries one slab. Each line item also
/// stores the rate it was sold under for record-keeping, but aggregation
/// always uses one explicit rate (see [`totals::SaleTotals::of`]).
pub const GST_RATE_BPS: u32 = 300;

/// Maximum quantity of a single line item.
///
/// ## Business Reason
/// Prevents accidental over-entry (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Maximum items allowed on a single sale.
///
/// ## Business Reason
/// Prevents runaway invoices and ensures reasonable transaction sizes.
pub const MAX_SALE_ITEMS: usize = 100;
