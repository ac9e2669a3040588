//! # Reconciliation Repository
//!
//! Commits and reverses return/exchange reconciliation plans.
//!
//! ## The Commit Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              commit(plan) - ONE SQLite transaction                      │
//! │                                                                         │
//! │   BEGIN                                                                 │
//! │     1. INSERT reconciliation_records  (id, reference number, money)    │
//! │     2. INSERT reconciliation_items    (returned + new directions)      │
//! │     3. per stock change:                                               │
//! │          INSERT stock_ledger          (±qty, in|out, reference_id)     │
//! │          UPDATE products SET stock_quantity = stock_quantity + ?       │
//! │   COMMIT                                                                │
//! │                                                                         │
//! │   Any failure rolls back EVERYTHING - there is no state where the      │
//! │   ledger and the product quantities disagree, and no partially         │
//! │   applied reconciliation survives an error.                            │
//! │                                                                         │
//! │   reverse(record_id) is the mirror image: apply the opposite of        │
//! │   every ledger entry scoped to the record, then delete entries,        │
//! │   items, and the record - also one transaction.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock updates inside the transaction are atomic increments
//! (`stock_quantity = stock_quantity + ?`), never read-then-write, so a
//! concurrent sale cannot be lost under this commit.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use sona_core::{
    ReconciliationItem, ReconciliationKind, ReconciliationPlan, ReconciliationRecord,
    StockLedgerEntry,
};

const RECORD_COLUMNS: &str = "id, reference_number, sale_id, kind, refund_paise, \
     additional_charge_paise, reason, created_at";

const ITEM_COLUMNS: &str = "id, record_id, direction, product_id, name_snapshot, quantity, \
     base_price_paise, making_charges_paise, discount_paise, line_total_paise, created_at";

const LEDGER_COLUMNS: &str = "id, product_id, quantity_change, entry_type, reference_id, \
     created_at";

/// Repository for reconciliation records, their items, and the stock
/// ledger entries they produce.
#[derive(Debug, Clone)]
pub struct ReconciliationRepository {
    pool: SqlitePool,
}

impl ReconciliationRepository {
    /// Creates a new ReconciliationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReconciliationRepository { pool }
    }

    /// Commits a reconciliation plan: record, items, ledger entries, and
    /// stock adjustments, all in one transaction.
    ///
    /// ## Returns
    /// The persisted record, with its generated id and reference number.
    ///
    /// ## Errors
    /// Any failed write aborts and rolls back the whole commit. A product
    /// missing from the `products` table surfaces as `DbError::NotFound`.
    pub async fn commit(&self, plan: &ReconciliationPlan) -> DbResult<ReconciliationRecord> {
        let record = ReconciliationRecord {
            id: Uuid::new_v4().to_string(),
            reference_number: generate_reference_number(plan.kind),
            sale_id: plan.sale_id.clone(),
            kind: plan.kind,
            refund_paise: plan.refund_paise,
            additional_charge_paise: plan.additional_charge_paise,
            reason: plan.reason.clone(),
            created_at: Utc::now(),
        };

        debug!(
            id = %record.id,
            reference_number = %record.reference_number,
            kind = ?record.kind,
            items = plan.items.len(),
            "Committing reconciliation"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO reconciliation_records (
                id, reference_number, sale_id, kind,
                refund_paise, additional_charge_paise,
                reason, created_at
            ) VALUES (
                ?1, ?2, ?3, ?4,
                ?5, ?6,
                ?7, ?8
            )
            "#,
        )
        .bind(&record.id)
        .bind(&record.reference_number)
        .bind(&record.sale_id)
        .bind(record.kind)
        .bind(record.refund_paise)
        .bind(record.additional_charge_paise)
        .bind(&record.reason)
        .bind(record.created_at)
        .execute(&mut *tx)
        .await?;

        for item in &plan.items {
            sqlx::query(
                r#"
                INSERT INTO reconciliation_items (
                    id, record_id, direction, product_id, name_snapshot,
                    quantity, base_price_paise, making_charges_paise,
                    discount_paise, line_total_paise, created_at
                ) VALUES (
                    ?1, ?2, ?3, ?4, ?5,
                    ?6, ?7, ?8,
                    ?9, ?10, ?11
                )
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&record.id)
            .bind(item.direction)
            .bind(&item.product_id)
            .bind(&item.name_snapshot)
            .bind(item.quantity)
            .bind(item.base_price_paise)
            .bind(item.making_charges_paise)
            .bind(item.discount_paise)
            .bind(item.line_total_paise)
            .bind(record.created_at)
            .execute(&mut *tx)
            .await?;
        }

        for change in &plan.stock_changes {
            sqlx::query(
                r#"
                INSERT INTO stock_ledger (
                    id, product_id, quantity_change, entry_type,
                    reference_id, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&change.product_id)
            .bind(change.quantity_change)
            .bind(change.entry_type)
            .bind(&record.id)
            .bind(record.created_at)
            .execute(&mut *tx)
            .await?;

            let new_quantity: Option<i64> = sqlx::query_scalar(
                r#"
                UPDATE products
                SET stock_quantity = stock_quantity + ?2,
                    updated_at = ?3
                WHERE id = ?1
                RETURNING stock_quantity
                "#,
            )
            .bind(&change.product_id)
            .bind(change.quantity_change)
            .bind(record.created_at)
            .fetch_optional(&mut *tx)
            .await?;

            let new_quantity =
                new_quantity.ok_or_else(|| DbError::not_found("Product", &change.product_id))?;

            if new_quantity < 0 {
                // Oversell is permitted (stock is corrected later at the
                // counter) but must be visible in the logs
                warn!(
                    product_id = %change.product_id,
                    stock_quantity = %new_quantity,
                    reference_number = %record.reference_number,
                    "Exchange drove product stock negative"
                );
            }
        }

        tx.commit().await?;

        info!(
            reference_number = %record.reference_number,
            refund = %record.refund(),
            additional_charge = %record.additional_charge(),
            "Reconciliation committed"
        );

        Ok(record)
    }

    /// Reverses a committed reconciliation: undoes every stock effect the
    /// record produced, then removes the record and everything scoped to
    /// it. One transaction, mirror image of [`Self::commit`].
    ///
    /// ## Guarantee
    /// `reverse` after `commit` leaves every touched product's quantity
    /// and the ledger exactly as they were before the commit.
    ///
    /// ## Errors
    /// `DbError::NotFound` when no record with this id exists.
    pub async fn reverse(&self, record_id: &str) -> DbResult<()> {
        debug!(id = %record_id, "Reversing reconciliation");

        let mut tx = self.pool.begin().await?;

        let exists: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM reconciliation_records WHERE id = ?1")
                .bind(record_id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Err(DbError::not_found("ReconciliationRecord", record_id));
        }

        let sql = format!(
            "SELECT {} FROM stock_ledger WHERE reference_id = ?1",
            LEDGER_COLUMNS
        );
        let entries = sqlx::query_as::<_, StockLedgerEntry>(&sql)
            .bind(record_id)
            .fetch_all(&mut *tx)
            .await?;

        let now = Utc::now();

        for entry in &entries {
            // An `in` entry is undone by subtracting its change, an `out`
            // entry by adding it back - the stored sign covers both
            let result = sqlx::query(
                r#"
                UPDATE products
                SET stock_quantity = stock_quantity - ?2,
                    updated_at = ?3
                WHERE id = ?1
                "#,
            )
            .bind(&entry.product_id)
            .bind(entry.quantity_change)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(DbError::not_found("Product", &entry.product_id));
            }
        }

        sqlx::query("DELETE FROM stock_ledger WHERE reference_id = ?1")
            .bind(record_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM reconciliation_items WHERE record_id = ?1")
            .bind(record_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM reconciliation_records WHERE id = ?1")
            .bind(record_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(id = %record_id, ledger_entries = entries.len(), "Reconciliation reversed");

        Ok(())
    }

    /// Gets a reconciliation record by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<ReconciliationRecord>> {
        let sql = format!(
            "SELECT {} FROM reconciliation_records WHERE id = ?1",
            RECORD_COLUMNS
        );
        let record = sqlx::query_as::<_, ReconciliationRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    /// Gets a reconciliation record by its human-readable reference.
    pub async fn get_by_reference_number(
        &self,
        reference_number: &str,
    ) -> DbResult<Option<ReconciliationRecord>> {
        let sql = format!(
            "SELECT {} FROM reconciliation_records WHERE reference_number = ?1",
            RECORD_COLUMNS
        );
        let record = sqlx::query_as::<_, ReconciliationRecord>(&sql)
            .bind(reference_number)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    /// Gets all items of a record (returned and new directions).
    pub async fn get_items(&self, record_id: &str) -> DbResult<Vec<ReconciliationItem>> {
        let sql = format!(
            "SELECT {} FROM reconciliation_items WHERE record_id = ?1 ORDER BY direction, created_at",
            ITEM_COLUMNS
        );
        let items = sqlx::query_as::<_, ReconciliationItem>(&sql)
            .bind(record_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Gets all stock ledger entries scoped to a record.
    pub async fn get_ledger_entries(&self, record_id: &str) -> DbResult<Vec<StockLedgerEntry>> {
        let sql = format!(
            "SELECT {} FROM stock_ledger WHERE reference_id = ?1 ORDER BY created_at",
            LEDGER_COLUMNS
        );
        let entries = sqlx::query_as::<_, StockLedgerEntry>(&sql)
            .bind(record_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(entries)
    }

    /// All reconciliation records against one sale, newest first.
    pub async fn list_for_sale(&self, sale_id: &str) -> DbResult<Vec<ReconciliationRecord>> {
        let sql = format!(
            "SELECT {} FROM reconciliation_records WHERE sale_id = ?1 ORDER BY created_at DESC",
            RECORD_COLUMNS
        );
        let records = sqlx::query_as::<_, ReconciliationRecord>(&sql)
            .bind(sale_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }
}

/// Generates a reference number in format: RET-YYYYMMDD-NNNN / EXC-YYYYMMDD-NNNN
///
/// Shares the process-local sequence with invoice numbers; the UNIQUE
/// column on `reconciliation_records.reference_number` is the actual
/// uniqueness guarantee.
///
/// ## Example
/// `RET-20260806-0042`
pub fn generate_reference_number(kind: ReconciliationKind) -> String {
    let prefix = match kind {
        ReconciliationKind::Return => "RET",
        ReconciliationKind::Exchange => "EXC",
    };
    let now = Utc::now();
    format!(
        "{}-{}-{:04}",
        prefix,
        now.format("%Y%m%d"),
        crate::repository::sale::next_sequence()
    )
}

// =============================================================================
// Unit Tests
// =============================================================================
