//! # Seed Data Generator
//!
//! Populates the database with development data: metal rates and a
//! spread of jewellery products across both pricing modes.
//!
//! ## Usage
//! ```bash
//! # Default database (./sona.db), 60 products
//! cargo run -p sona-db --bin seed
//!
//! # Custom amount and path
//! cargo run -p sona-db --bin seed -- --count 200 --db ./data/sona.db
//! ```
//!
//! ## Generated Data
//! - Current gold and silver rates
//! - Weight-based products (chains, rings, bangles) with per-gram
//!   making charges
//! - Flat-price products (gift sets, idols) with fixed tags
//!
//! Each product has:
//! - Unique SKU: `{CATEGORY}-{INDEX}`
//! - Deterministic weight/stock spread (no RNG needed for dev data)

use chrono::Utc;
use std::env;
use tracing::info;
use uuid::Uuid;

use sona_core::{Metal, MetalRate, PricingMode, Product};
use sona_db::repository::rates::generate_rate_id;
use sona_db::{Database, DbConfig};

/// Weight-based product categories: (SKU prefix, names, metal).
const WEIGHT_CATEGORIES: &[(&str, &[&str], Metal)] = &[
    (
        "CHAIN",
        &[
            "Rope Chain 22K",
            "Box Chain 22K",
            "Curb Chain 22K",
            "Figaro Chain 18K",
            "Snake Chain 18K",
        ],
        Metal::Gold,
    ),
    (
        "RING",
        &[
            "Plain Band 22K",
            "Engraved Band 22K",
            "Solitaire Mount 18K",
            "Twist Ring 18K",
        ],
        Metal::Gold,
    ),
    (
        "BANGLE",
        &[
            "Classic Bangle 22K",
            "Kada 22K",
            "Filigree Bangle 18K",
            "Silver Kada",
        ],
        Metal::Gold,
    ),
    (
        "ANKLET",
        &["Payal Classic", "Payal Beaded", "Chain Anklet"],
        Metal::Silver,
    ),
];

/// Flat-price product categories: (SKU prefix, names, metal).
const FLAT_CATEGORIES: &[(&str, &[&str], Metal)] = &[
    (
        "SET",
        &["Bridal Set", "Temple Set", "Pendant Set", "Gift Set"],
        Metal::Gold,
    ),
    (
        "IDOL",
        &["Lakshmi Idol", "Ganesha Idol", "Pooja Thali"],
        Metal::Silver,
    ),
];

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let db_path = arg_value(&args, "--db").unwrap_or_else(|| "./sona.db".to_string());
    let count: usize = arg_value(&args, "--count")
        .and_then(|v| v.parse().ok())
        .unwrap_or(60);

    info!(db_path = %db_path, count = count, "Seeding development data");

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .expect("failed to open database");

    seed_rates(&db).await;
    let inserted = seed_products(&db, count).await;

    let total = db.products().count().await.expect("count failed");
    info!(inserted = inserted, total = total, "Seed complete");
}

/// Returns the value following a `--flag` argument.
fn arg_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

/// Records today's metal rates.
async fn seed_rates(db: &Database) {
    let rates = [
        (Metal::Gold, 9_500_i64),  // ₹95.00/g for dev data
        (Metal::Silver, 120_i64),  // ₹1.20/g
    ];

    for (metal, paise) in rates {
        let rate = MetalRate {
            id: generate_rate_id(),
            metal,
            rate_per_gram_paise: paise,
            effective_at: Utc::now(),
        };
        db.metal_rates().insert(&rate).await.expect("rate insert failed");
        info!(metal = ?metal, rate_paise = paise, "Rate recorded");
    }
}

/// Inserts up to `count` products cycling through the category tables.
async fn seed_products(db: &Database, count: usize) -> usize {
    let now = Utc::now();
    let mut inserted = 0usize;
    let mut index = 0usize;

    while inserted < count {
        let weight_pool: usize = WEIGHT_CATEGORIES.iter().map(|(_, names, _)| names.len()).sum();

        let product = if index % 4 != 3 {
            // Three out of four products are weight-based
            let mut offset = index % weight_pool;
            let (prefix, names, metal) = WEIGHT_CATEGORIES
                .iter()
                .find(|(_, names, _)| {
                    if offset < names.len() {
                        true
                    } else {
                        offset -= names.len();
                        false
                    }
                })
                .expect("offset within pool");

            Product {
                id: Uuid::new_v4().to_string(),
                sku: format!("{}-{:03}", prefix, index),
                name: names[offset].to_string(),
                description: None,
                pricing_mode: PricingMode::WeightBased,
                metal: *metal,
                // 4 g to 28 g spread
                weight_mg: 4_000 + (index as i64 % 13) * 2_000,
                // ₹12/g to ₹30/g making charges
                making_rate_paise: 1_200 + (index as i64 % 10) * 200,
                flat_price_paise: 0,
                stock_quantity: 2 + (index as i64 % 9),
                is_active: true,
                created_at: now,
                updated_at: now,
            }
        } else {
            let flat_pool: usize = FLAT_CATEGORIES.iter().map(|(_, names, _)| names.len()).sum();
            let mut offset = index % flat_pool;
            let (prefix, names, metal) = FLAT_CATEGORIES
                .iter()
                .find(|(_, names, _)| {
                    if offset < names.len() {
                        true
                    } else {
                        offset -= names.len();
                        false
                    }
                })
                .expect("offset within pool");

            Product {
                id: Uuid::new_v4().to_string(),
                sku: format!("{}-{:03}", prefix, index),
                name: names[offset].to_string(),
                description: None,
                pricing_mode: PricingMode::FlatPrice,
                metal: *metal,
                weight_mg: 0,
                making_rate_paise: 0,
                // ₹1500 to ₹50000 tags
                flat_price_paise: 150_000 + (index as i64 % 20) * 250_000,
                stock_quantity: 1 + (index as i64 % 5),
                is_active: true,
                created_at: now,
                updated_at: now,
            }
        };

        db.products().insert(&product).await.expect("product insert failed");
        inserted += 1;
        index += 1;
    }

    inserted
}
