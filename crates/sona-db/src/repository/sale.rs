//! # Sale Repository
//!
//! Database operations for sales and their line items.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. CREATE                                                             │
//! │     └── create(sale, items) → sale + line items in ONE transaction     │
//! │                                                                         │
//! │  2. FINALIZE                                                           │
//! │     └── finalize(sale_id) → Sale { status: Completed }                 │
//! │                                                                         │
//! │  3. (LATER) RETURN / EXCHANGE                                          │
//! │     └── get_by_invoice_number() → get_items() → ReturnSelection        │
//! │         (items are immutable once completed, except via a             │
//! │          reconciliation record)                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use sona_core::{LineItem, Sale, SaleTotals};

const SALE_COLUMNS: &str = "id, invoice_number, status, subtotal_paise, discount_paise, \
     tax_paise, total_paise, customer_name, notes, created_at, updated_at, completed_at";

const ITEM_COLUMNS: &str = "id, sale_id, product_id, sku_snapshot, name_snapshot, pricing_mode, \
     weight_mg, quantity, rate_per_gram_paise, making_rate_paise, flat_price_paise, \
     base_price_paise, making_charges_paise, discount_kind, discount_value, discount_paise, \
     line_total_paise, gst_bps, created_at";

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Inserts a sale together with its line items in one transaction.
    ///
    /// Items are stamped with the sale's id, so callers can pass lines
    /// straight from `LineItem::from_product`.
    pub async fn create(&self, sale: &Sale, items: &[LineItem]) -> DbResult<()> {
        debug!(id = %sale.id, invoice_number = %sale.invoice_number, items = items.len(), "Creating sale");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, invoice_number, status,
                subtotal_paise, discount_paise, tax_paise, total_paise,
                customer_name, notes,
                created_at, updated_at, completed_at
            ) VALUES (
                ?1, ?2, ?3,
                ?4, ?5, ?6, ?7,
                ?8, ?9,
                ?10, ?11, ?12
            )
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.invoice_number)
        .bind(sale.status)
        .bind(sale.subtotal_paise)
        .bind(sale.discount_paise)
        .bind(sale.tax_paise)
        .bind(sale.total_paise)
        .bind(&sale.customer_name)
        .bind(&sale.notes)
        .bind(sale.created_at)
        .bind(sale.updated_at)
        .bind(sale.completed_at)
        .execute(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, product_id,
                    sku_snapshot, name_snapshot, pricing_mode,
                    weight_mg, quantity, rate_per_gram_paise, making_rate_paise,
                    flat_price_paise, base_price_paise, making_charges_paise,
                    discount_kind, discount_value, discount_paise,
                    line_total_paise, gst_bps, created_at
                ) VALUES (
                    ?1, ?2, ?3,
                    ?4, ?5, ?6,
                    ?7, ?8, ?9, ?10,
                    ?11, ?12, ?13,
                    ?14, ?15, ?16,
                    ?17, ?18, ?19
                )
                "#,
            )
            .bind(&item.id)
            .bind(&sale.id)
            .bind(&item.product_id)
            .bind(&item.sku_snapshot)
            .bind(&item.name_snapshot)
            .bind(item.pricing_mode)
            .bind(item.weight_mg)
            .bind(item.quantity)
            .bind(item.rate_per_gram_paise)
            .bind(item.making_rate_paise)
            .bind(item.flat_price_paise)
            .bind(item.base_price_paise)
            .bind(item.making_charges_paise)
            .bind(item.discount_kind)
            .bind(item.discount_value)
            .bind(item.discount_paise)
            .bind(item.line_total_paise)
            .bind(item.gst_bps)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sql = format!("SELECT {} FROM sales WHERE id = ?1", SALE_COLUMNS);
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    /// Gets a sale by its invoice number.
    ///
    /// The entry point of the return flow: the operator types the
    /// invoice code from the customer's bill.
    pub async fn get_by_invoice_number(&self, invoice_number: &str) -> DbResult<Option<Sale>> {
        let sql = format!(
            "SELECT {} FROM sales WHERE invoice_number = ?1",
            SALE_COLUMNS
        );
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(invoice_number)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    /// Gets all line items of a sale, in entry order.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<LineItem>> {
        let sql = format!(
            "SELECT {} FROM sale_items WHERE sale_id = ?1 ORDER BY created_at",
            ITEM_COLUMNS
        );
        let items = sqlx::query_as::<_, LineItem>(&sql)
            .bind(sale_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Updates the stored totals of a draft sale.
    ///
    /// ## When To Call
    /// After the line items change. Totals are always recomputable from
    /// the items (`SaleTotals::of`); the stored copy is for listings.
    pub async fn update_totals(&self, sale_id: &str, totals: &SaleTotals) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE sales SET
                subtotal_paise = ?2,
                discount_paise = ?3,
                tax_paise = ?4,
                total_paise = ?5,
                updated_at = ?6
            WHERE id = ?1 AND status = 'draft'
            "#,
        )
        .bind(sale_id)
        .bind(totals.subtotal_paise)
        .bind(totals.discount_total_paise)
        .bind(totals.tax_paise)
        .bind(totals.grand_total_paise)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale (draft)", sale_id));
        }

        Ok(())
    }

    /// Finalizes a sale (marks as completed).
    ///
    /// From here the items are immutable; only a reconciliation record
    /// can adjust what was sold.
    pub async fn finalize(&self, sale_id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE sales SET
                status = 'completed',
                completed_at = ?2,
                updated_at = ?2
            WHERE id = ?1 AND status = 'draft'
            "#,
        )
        .bind(sale_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale (draft)", sale_id));
        }

        Ok(())
    }
}

/// Generates an invoice number in format: INV-YYYYMMDD-NNNN
///
/// ## Format
/// - YYYYMMDD: Date
/// - NNNN: Sequence (padded to 4 digits)
///
/// The sequence is a process-local counter seeded from the clock; the
/// UNIQUE column on `sales.invoice_number` is the actual uniqueness
/// guarantee.
/// TODO: move to a daily counter table once multi-terminal support lands
///
/// ## Example
/// `INV-20260806-0042`
pub fn generate_invoice_number() -> String {
    let now = Utc::now();
    format!("INV-{}-{:04}", now.format("%Y%m%d"), next_sequence())
}

/// Process-local document sequence shared by invoice and reconciliation
/// reference numbers.
pub(crate) fn next_sequence() -> u32 {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::OnceLock;

    static COUNTER: OnceLock<AtomicU32> = OnceLock::new();
    let counter = COUNTER
        .get_or_init(|| AtomicU32::new((Utc::now().timestamp_millis() % 10000) as u32));
    counter.fetch_add(1, Ordering::Relaxed) % 10_000
}

/// Generates a new sale ID.
pub fn generate_sale_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::product::generate_product_id;
    use sona_core::{
        DiscountSpec, Metal, Money, PricingMode, Product, SaleStatus, TaxRate, GST_RATE_BPS,
    };

    fn test_product() -> Product {
        let now = Utc::now();
        Product {
            id: generate_product_id(),
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
            created_at: now,
            updated_at: now,
        }
    }

    fn draft_sale(totals: &SaleTotals) -> Sale {
        let now = Utc::now();
        Sale {
            id: generate_sale_id(),
            invoice_number: generate_invoice_number(),
            status: SaleStatus::Draft,
            subtotal_paise: totals.subtotal_paise,
            discount_paise: totals.discount_total_paise,
            tax_paise: totals.tax_paise,
            total_paise: totals.grand_total_paise,
            customer_name: Some("Asha".to_string()),
            notes: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_fetch_sale_with_items() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = test_product();
        db.products().insert(&product).await.unwrap();

        let mut item = LineItem::from_product(&product, 2, Money::from_rupees(95));
        item.apply_discount(DiscountSpec::percentage(1000));
        let totals = SaleTotals::of(
            std::slice::from_ref(&item),
            TaxRate::from_bps(GST_RATE_BPS),
        );
        let sale = draft_sale(&totals);

        db.sales().create(&sale, &[item]).await.unwrap();

        let fetched = db
            .sales()
            .get_by_invoice_number(&sale.invoice_number)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.id, sale.id);
        assert_eq!(fetched.total_paise, 226_000 + 6_780);

        let items = db.sales().get_items(&sale.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].sale_id, sale.id);
        assert_eq!(items[0].line_total_paise, 226_000);
        assert_eq!(items[0].pricing_mode, PricingMode::WeightBased);
    }

    #[tokio::test]
    async fn test_finalize_only_once() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let sale = draft_sale(&SaleTotals::default());
        db.sales().create(&sale, &[]).await.unwrap();

        db.sales().finalize(&sale.id).await.unwrap();
        let fetched = db.sales().get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, SaleStatus::Completed);
        assert!(fetched.completed_at.is_some());

        // Second finalize finds no draft row
        let err = db.sales().finalize(&sale.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_totals_guards_completed_sales() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let sale = draft_sale(&SaleTotals::default());
        db.sales().create(&sale, &[]).await.unwrap();
        db.sales().finalize(&sale.id).await.unwrap();

        let err = db
            .sales()
            .update_totals(&sale.id, &SaleTotals::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[test]
    fn test_invoice_number_format() {
        let number = generate_invoice_number();
        assert!(number.starts_with("INV-"));
        assert_eq!(number.len(), "INV-20260806-0042".len());
    }
}
