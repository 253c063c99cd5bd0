//! # Order Repository
//!
//! Database operations for orders and order lines.
//!
//! ## Write Operations Are Atomic Units
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Order Write Operations                              │
//! │                                                                         │
//! │  1. SUBMISSION                                                          │
//! │     insert_with_lines() ─ BEGIN                                         │
//! │                           INSERT order                                  │
//! │                           INSERT line × N                               │
//! │                           COMMIT                                        │
//! │                                                                         │
//! │  2. RECONCILIATION (edit of a pending order)                            │
//! │     replace_lines() ───── BEGIN                                         │
//! │                           UPDATE totals (guarded: status = 'pending')   │
//! │                           DELETE all lines                              │
//! │                           INSERT line × N                               │
//! │                           COMMIT                                        │
//! │                                                                         │
//! │  3. STATUS                                                              │
//! │     update_status() ───── single UPDATE                                 │
//! │                                                                         │
//! │  4. HARD DELETE (admin)                                                 │
//! │     delete() ──────────── BEGIN                                         │
//! │                           DELETE lines                                  │
//! │                           DELETE order                                  │
//! │                           COMMIT                                        │
//! │                                                                         │
//! │  A reader never observes lines without their matching totals: every     │
//! │  step of 1/2/4 happens inside one transaction, and a failure rolls      │
//! │  the whole unit back.                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use olivier_core::pricing::OrderTotals;
use olivier_core::{Order, OrderLine, OrderStatus};

const ORDER_COLUMNS: &str = "id, order_number, pharmacy_id, commercial_id, order_date, \
     order_type, status, total_before_discount_cents, discount_rate_bps, \
     discount_amount_cents, shipping_amount_cents, total_amount_cents, notes, \
     created_at, updated_at";

const LINE_COLUMNS: &str = "id, order_id, product_id, name_snapshot, sku_snapshot, \
     ean_snapshot, quantity, unit_price_gross_cents, unit_price_retail_cents, \
     line_total_gross_cents, line_total_retail_cents, created_at";

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Gets an order by its human-readable number.
    pub async fn get_by_number(&self, order_number: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE order_number = ?1"
        ))
        .bind(order_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Gets all lines of an order, in insertion order.
    pub async fn get_lines(&self, order_id: &str) -> DbResult<Vec<OrderLine>> {
        let lines = sqlx::query_as::<_, OrderLine>(&format!(
            "SELECT {LINE_COLUMNS} FROM order_lines WHERE order_id = ?1 ORDER BY created_at, id"
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Lists all orders, newest first.
    pub async fn list_all(&self) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY order_date DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Lists the orders submitted by a commercial, newest first.
    pub async fn list_by_commercial(&self, commercial_id: &str) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE commercial_id = ?1 ORDER BY order_date DESC"
        ))
        .bind(commercial_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Lists the orders of a pharmacy, newest first.
    pub async fn list_by_pharmacy(&self, pharmacy_id: &str) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE pharmacy_id = ?1 ORDER BY order_date DESC"
        ))
        .bind(pharmacy_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Inserts an order together with its lines as one atomic unit.
    ///
    /// Used at submission: either the order and every line land, or
    /// nothing does.
    pub async fn insert_with_lines(&self, order: &Order, lines: &[OrderLine]) -> DbResult<()> {
        debug!(
            id = %order.id,
            order_number = %order.order_number,
            lines = lines.len(),
            "Inserting order with lines"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO orders (
                id, order_number, pharmacy_id, commercial_id, order_date,
                order_type, status, total_before_discount_cents, discount_rate_bps,
                discount_amount_cents, shipping_amount_cents, total_amount_cents,
                notes, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        )
        .bind(&order.id)
        .bind(&order.order_number)
        .bind(&order.pharmacy_id)
        .bind(&order.commercial_id)
        .bind(order.order_date)
        .bind(order.order_type)
        .bind(order.status)
        .bind(order.total_before_discount_cents)
        .bind(order.discount_rate_bps)
        .bind(order.discount_amount_cents)
        .bind(order.shipping_amount_cents)
        .bind(order.total_amount_cents)
        .bind(&order.notes)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for line in lines {
            insert_line(&mut tx, line).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Replaces the whole line set of a pending order and writes the
    /// recomputed totals, atomically.
    ///
    /// ## Guard
    /// The totals UPDATE carries `AND status = 'pending'`: if the order
    /// left `pending` between the caller's precondition check and this
    /// write (a concurrent validation, say), zero rows match, the
    /// transaction rolls back and the pre-edit lines and totals stay
    /// visible to every reader.
    ///
    /// ## Failure Semantics
    /// Any error after the DELETE (say, a constraint violation on one of
    /// the new lines) rolls the whole unit back: the order is never left
    /// with zero lines and stale totals.
    pub async fn replace_lines(
        &self,
        order_id: &str,
        lines: &[OrderLine],
        totals: &OrderTotals,
    ) -> DbResult<()> {
        debug!(order_id = %order_id, lines = lines.len(), "Replacing order lines");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE orders SET
                total_before_discount_cents = ?2,
                discount_amount_cents = ?3,
                shipping_amount_cents = ?4,
                total_amount_cents = ?5,
                updated_at = ?6
             WHERE id = ?1 AND status = 'pending'",
        )
        .bind(order_id)
        .bind(totals.total_before_discount.cents())
        .bind(totals.discount_amount.cents())
        .bind(totals.shipping_amount.cents())
        .bind(totals.total_amount.cents())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order (pending)", order_id));
        }

        sqlx::query("DELETE FROM order_lines WHERE order_id = ?1")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        for line in lines {
            insert_line(&mut tx, line).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Updates an order's status (an independent atomic write).
    pub async fn update_status(&self, order_id: &str, status: OrderStatus) -> DbResult<()> {
        debug!(order_id = %order_id, status = ?status, "Updating order status");

        let now = Utc::now();

        let result = sqlx::query("UPDATE orders SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(order_id)
            .bind(status)
            .bind(now)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", order_id));
        }

        Ok(())
    }

    /// Hard-deletes an order and its lines, atomically.
    ///
    /// The schema cascades `order_lines` on order deletion; the explicit
    /// DELETE keeps the intent visible and works even with foreign keys
    /// off.
    pub async fn delete(&self, order_id: &str) -> DbResult<()> {
        debug!(order_id = %order_id, "Deleting order");

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM order_lines WHERE order_id = ?1")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", order_id));
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }
}

/// Inserts one order line inside an open transaction.
async fn insert_line(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    line: &OrderLine,
) -> DbResult<()> {
    sqlx::query(
        "INSERT INTO order_lines (
            id, order_id, product_id, name_snapshot, sku_snapshot, ean_snapshot,
            quantity, unit_price_gross_cents, unit_price_retail_cents,
            line_total_gross_cents, line_total_retail_cents, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
    )
    .bind(&line.id)
    .bind(&line.order_id)
    .bind(&line.product_id)
    .bind(&line.name_snapshot)
    .bind(&line.sku_snapshot)
    .bind(&line.ean_snapshot)
    .bind(line.quantity)
    .bind(line.unit_price_gross_cents)
    .bind(line.unit_price_retail_cents)
    .bind(line.line_total_gross_cents)
    .bind(line.line_total_retail_cents)
    .bind(line.created_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Generates a new order line ID.
pub fn generate_line_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates an order number: `CMD-<unix millis>-<suffix>`.
///
/// The suffix disambiguates submissions landing on the same millisecond
/// (the column carries a UNIQUE constraint).
///
/// ## Example
/// `CMD-1736012345678-0042`
pub fn generate_order_number() -> String {
    let millis = Utc::now().timestamp_millis();
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    format!("CMD-{}-{:04}", millis, nanos % 10000)
}
