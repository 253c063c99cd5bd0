//! # Reporting Repository
//!
//! KPI aggregation queries for the back office: revenue by pharmacy, by
//! product, and by commercial, plus global totals.
//!
//! ## Conventions
//! - Cancelled orders are excluded from every aggregate
//! - Revenue is the stored `total_amount_cents` (orders) or
//!   `line_total_gross_cents` (per-product), never recomputed
//! - Product figures group by SKU snapshot, so products deleted from the
//!   catalog still appear in the history they earned

use sqlx::SqlitePool;

use crate::error::DbResult;
use olivier_core::Money;

// =============================================================================
// KPI Row Types
// =============================================================================

/// Orders and revenue of one pharmacy.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct PharmacyKpi {
    pub pharmacy_id: String,
    pub pharmacy_name: String,
    pub order_count: i64,
    pub revenue_cents: i64,
}

impl PharmacyKpi {
    /// Average basket, zero when the pharmacy has no orders.
    pub fn average_basket(&self) -> Money {
        if self.order_count == 0 {
            Money::zero()
        } else {
            Money::from_cents(self.revenue_cents / self.order_count)
        }
    }
}

/// Quantities and revenue of one product reference (by SKU snapshot).
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct ProductKpi {
    pub sku: String,
    pub name: String,
    pub quantity_sold: i64,
    pub revenue_cents: i64,
    pub order_count: i64,
}

/// Orders and revenue brought in by one commercial.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct CommercialKpi {
    pub commercial_id: String,
    pub full_name: String,
    pub order_count: i64,
    pub revenue_cents: i64,
}

impl CommercialKpi {
    /// Average basket, zero when the commercial has no orders.
    pub fn average_basket(&self) -> Money {
        if self.order_count == 0 {
            Money::zero()
        } else {
            Money::from_cents(self.revenue_cents / self.order_count)
        }
    }
}

/// Whole-business totals.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct GlobalKpis {
    pub order_count: i64,
    pub revenue_cents: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for KPI aggregation queries.
#[derive(Debug, Clone)]
pub struct ReportingRepository {
    pool: SqlitePool,
}

impl ReportingRepository {
    /// Creates a new ReportingRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportingRepository { pool }
    }

    /// Per-pharmacy order count and revenue, best customers first.
    ///
    /// Pharmacies with no orders appear with zeroes (prospects show up in
    /// the ranking too).
    pub async fn pharmacy_kpis(&self) -> DbResult<Vec<PharmacyKpi>> {
        let kpis = sqlx::query_as::<_, PharmacyKpi>(
            "SELECT
                p.id AS pharmacy_id,
                p.name AS pharmacy_name,
                COUNT(o.id) AS order_count,
                COALESCE(SUM(o.total_amount_cents), 0) AS revenue_cents
             FROM pharmacies p
             LEFT JOIN orders o
                ON o.pharmacy_id = p.id AND o.status != 'cancelled'
             GROUP BY p.id, p.name
             ORDER BY revenue_cents DESC, p.name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(kpis)
    }

    /// Per-product quantity sold and gross revenue, best sellers first.
    ///
    /// Grouped by SKU snapshot: a reference deleted from the catalog
    /// keeps the history it earned.
    pub async fn product_kpis(&self) -> DbResult<Vec<ProductKpi>> {
        let kpis = sqlx::query_as::<_, ProductKpi>(
            "SELECT
                l.sku_snapshot AS sku,
                MAX(l.name_snapshot) AS name,
                SUM(l.quantity) AS quantity_sold,
                SUM(l.line_total_gross_cents) AS revenue_cents,
                COUNT(DISTINCT l.order_id) AS order_count
             FROM order_lines l
             JOIN orders o ON o.id = l.order_id
             WHERE o.status != 'cancelled'
             GROUP BY l.sku_snapshot
             ORDER BY revenue_cents DESC, sku",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(kpis)
    }

    /// Per-commercial order count and revenue, best performers first.
    pub async fn commercial_kpis(&self) -> DbResult<Vec<CommercialKpi>> {
        let kpis = sqlx::query_as::<_, CommercialKpi>(
            "SELECT
                u.id AS commercial_id,
                u.full_name AS full_name,
                COUNT(o.id) AS order_count,
                COALESCE(SUM(o.total_amount_cents), 0) AS revenue_cents
             FROM users u
             LEFT JOIN orders o
                ON o.commercial_id = u.id AND o.status != 'cancelled'
             WHERE u.role = 'commercial'
             GROUP BY u.id, u.full_name
             ORDER BY revenue_cents DESC, u.full_name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(kpis)
    }

    /// Whole-business order count and revenue.
    pub async fn global_kpis(&self) -> DbResult<GlobalKpis> {
        let kpis = sqlx::query_as::<_, GlobalKpis>(
            "SELECT
                COUNT(id) AS order_count,
                COALESCE(SUM(total_amount_cents), 0) AS revenue_cents
             FROM orders
             WHERE status != 'cancelled'",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(kpis)
    }
}
