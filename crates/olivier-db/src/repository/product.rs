//! # Product Repository
//!
//! Database operations for the catalog.
//!
//! ## Key Operations
//! - Active-catalog listing and search (the cart's browsing surface)
//! - Lookup by id regardless of active flag (historical order rendering)
//! - CRUD with soft delete (`is_active`)
//!
//! ## Active vs. inactive
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  list_active / search   → only is_active = 1 (what a cart may add)      │
//! │  get_by_id / get_by_sku → any product (a delivered order from last      │
//! │                           year must still render its lines)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use olivier_core::Product;

const PRODUCT_COLUMNS: &str = "id, sku, ean, name, description, \
     gross_unit_price_cents, retail_unit_price_cents, vat_rate_bps, \
     stock_quantity, minimum_order_quantity, is_active, created_at, updated_at";

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists active products, ordered by name.
    pub async fn list_active(&self, limit: u32) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE is_active = 1 ORDER BY name LIMIT ?1"
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Searches active products by name or SKU substring.
    ///
    /// An empty query returns the plain active listing.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = query.trim();

        debug!(query = %query, limit = %limit, "Searching products");

        if query.is_empty() {
            return self.list_active(limit).await;
        }

        let pattern = format!("%{query}%");

        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE is_active = 1 AND (name LIKE ?1 OR sku LIKE ?1) \
             ORDER BY name LIMIT ?2"
        ))
        .bind(pattern)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Gets a product by ID, active or not.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by SKU, active or not.
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE sku = ?1"
        ))
        .bind(sku)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a new product.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, sku = %product.sku, "Inserting product");

        sqlx::query(
            "INSERT INTO products (
                id, sku, ean, name, description,
                gross_unit_price_cents, retail_unit_price_cents, vat_rate_bps,
                stock_quantity, minimum_order_quantity, is_active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.ean)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.gross_unit_price_cents)
        .bind(product.retail_unit_price_cents)
        .bind(product.vat_rate_bps)
        .bind(product.stock_quantity)
        .bind(product.minimum_order_quantity)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates an existing product (all mutable fields).
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE products SET
                sku = ?2, ean = ?3, name = ?4, description = ?5,
                gross_unit_price_cents = ?6, retail_unit_price_cents = ?7,
                vat_rate_bps = ?8, stock_quantity = ?9,
                minimum_order_quantity = ?10, is_active = ?11, updated_at = ?12
             WHERE id = ?1",
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.ean)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.gross_unit_price_cents)
        .bind(product.retail_unit_price_cents)
        .bind(product.vat_rate_bps)
        .bind(product.stock_quantity)
        .bind(product.minimum_order_quantity)
        .bind(product.is_active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Soft-deletes a product (hides it from the browsing surface;
    /// historical orders keep rendering through their snapshots).
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result =
            sqlx::query("UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1")
                .bind(id)
                .bind(now)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }
}
