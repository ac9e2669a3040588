//! # Metal Rate Repository
//!
//! Stores the per-gram metal rates the counter quotes from. Rates are
//! append-only: a new row per update, and the latest `effective_at` per
//! metal is the current rate — the default `rate_per_gram` for new
//! weight-based line items.

use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use sona_core::{Metal, MetalRate};

const RATE_COLUMNS: &str = "id, metal, rate_per_gram_paise, effective_at";

/// Repository for metal rate operations.
#[derive(Debug, Clone)]
pub struct MetalRateRepository {
    pool: SqlitePool,
}

impl MetalRateRepository {
    /// Creates a new MetalRateRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MetalRateRepository { pool }
    }

    /// Records a new rate for a metal.
    pub async fn insert(&self, rate: &MetalRate) -> DbResult<()> {
        debug!(metal = ?rate.metal, rate = %rate.rate_per_gram(), "Recording metal rate");

        sqlx::query(
            r#"
            INSERT INTO metal_rates (id, metal, rate_per_gram_paise, effective_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&rate.id)
        .bind(rate.metal)
        .bind(rate.rate_per_gram_paise)
        .bind(rate.effective_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// The current (latest effective) rate for a metal.
    ///
    /// ## Returns
    /// * `Ok(None)` - no rate has ever been recorded for this metal
    pub async fn current(&self, metal: Metal) -> DbResult<Option<MetalRate>> {
        let sql = format!(
            "SELECT {} FROM metal_rates WHERE metal = ?1 ORDER BY effective_at DESC LIMIT 1",
            RATE_COLUMNS
        );
        let rate = sqlx::query_as::<_, MetalRate>(&sql)
            .bind(metal)
            .fetch_optional(&self.pool)
            .await?;

        Ok(rate)
    }

    /// Recent rate history for a metal, newest first.
    pub async fn history(&self, metal: Metal, limit: u32) -> DbResult<Vec<MetalRate>> {
        let sql = format!(
            "SELECT {} FROM metal_rates WHERE metal = ?1 ORDER BY effective_at DESC LIMIT ?2",
            RATE_COLUMNS
        );
        let rates = sqlx::query_as::<_, MetalRate>(&sql)
            .bind(metal)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rates)
    }
}

/// Helper to generate a new metal rate ID.
pub fn generate_rate_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
