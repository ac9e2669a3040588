//! # Repository Module
//!
//! Database repository implementations for Sona POS.
//!
//! ## Repository Pattern
//! Each repository wraps the connection pool behind a focused API; SQL
//! lives here and nowhere else. Callers compose them through the
//! [`crate::pool::Database`] handle:
//!
//! ```rust,ignore
//! let sale = db.sales().get_by_invoice_number("INV-20260806-0001").await?;
//! let items = db.sales().get_items(&sale.id).await?;
//! // ... build a ReturnSelection, confirm a plan in sona-core ...
//! let record = db.reconciliations().commit(&plan).await?;
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Product CRUD and atomic stock deltas
//! - [`sale::SaleRepository`] - Sales, line items, invoice lookup
//! - [`reconciliation::ReconciliationRepository`] - Return/exchange
//!   commit and reversal with the stock ledger
//! - [`rates::MetalRateRepository`] - Current metal rate provider

pub mod product;
pub mod rates;
pub mod reconciliation;
pub mod sale;
