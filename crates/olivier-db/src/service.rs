//! # Order Service
//!
//! Orchestrates order submission, in-place editing (reconciliation),
//! lifecycle transitions, and hard deletion on top of the repositories,
//! with every business rule delegated to `olivier-core`.
//!
//! ## Submission and Edit Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Order Service Flow                               │
//! │                                                                         │
//! │  SUBMIT                              EDIT (pending only)                │
//! │  ──────                              ───────────────────                │
//! │  cart.ensure_submittable()           load order                         │
//! │       │  (all violations at once)    ensure_editable()                  │
//! │       ▼                                   │                             │
//! │  load pharmacy ──► snapshot               ▼                             │
//! │  discount rate                       cart.ensure_submittable()          │
//! │       │                                   │                             │
//! │       ▼                                   ▼                             │
//! │  price_order(lines, rate)            re-snapshot name/sku/ean           │
//! │       │                              from the CURRENT catalog           │
//! │       ▼                              (prices stay as the editor         │
//! │  insert order + lines                 held them)                        │
//! │  in ONE transaction                       │                             │
//! │                                           ▼                             │
//! │                                      price_order(lines,                 │
//! │                                        STORED discount rate)            │
//! │                                           │                             │
//! │                                           ▼                             │
//! │                                      replace lines + totals             │
//! │                                      in ONE transaction                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The stored discount rate is never re-fetched from the pharmacy at edit
//! time: the terms agreed at submission stay the terms of the order.

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DbError;
use crate::pool::Database;
use crate::repository::order::{generate_line_id, generate_order_number};
use olivier_core::lifecycle::{authorize_deletion, authorize_transition, ensure_editable};
use olivier_core::pricing::price_order;
use olivier_core::{
    Cart, CartLine, CoreError, Order, OrderLine, OrderStatus, OrderWithDetails, User,
};

// =============================================================================
// Service Error
// =============================================================================

/// Unified error at the service boundary.
///
/// ## Taxonomy
/// ```text
/// Core(Validation(..))        → bad input, reported before any write
/// Core(MinimumQuantities(..)) → every offending line, reported together
/// Core(OrderNotEditable)      → precondition failed (order not pending)
/// Core(StatusChangeForbidden) → caller lacks the privilege
/// Db(NotFound)                → missing product/pharmacy/user/order
/// Db(TransactionFailed, ..)   → storage failure; pre-edit state intact
/// ```
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

// =============================================================================
// Order Service
// =============================================================================

/// High-level order operations.
#[derive(Debug, Clone)]
pub struct OrderService {
    db: Database,
}

impl OrderService {
    /// Creates a new OrderService over a database handle.
    pub fn new(db: Database) -> Self {
        OrderService { db }
    }

    /// Submits a cart as a new pending order.
    ///
    /// ## What This Does
    /// 1. Gates the cart: non-empty, every line at or above its minimum
    ///    (all violations reported together)
    /// 2. Loads the pharmacy and snapshots its discount rate
    /// 3. Prices the cart (gross → discount → shipping → total)
    /// 4. Persists the order and its lines as one atomic write
    pub async fn submit_order(
        &self,
        cart: &Cart,
        pharmacy_id: &str,
        commercial_id: &str,
        notes: Option<String>,
    ) -> ServiceResult<Order> {
        cart.ensure_submittable()?;

        let pharmacy = self
            .db
            .pharmacies()
            .get_by_id(pharmacy_id)
            .await?
            .ok_or_else(|| DbError::not_found("Pharmacy", pharmacy_id))?;

        let commercial = self
            .db
            .users()
            .get_by_id(commercial_id)
            .await?
            .ok_or_else(|| DbError::not_found("User", commercial_id))?;

        let totals = price_order(cart.lines(), pharmacy.discount_rate());

        let now = Utc::now();
        let order_id = Uuid::new_v4().to_string();

        let order = Order {
            id: order_id.clone(),
            order_number: generate_order_number(),
            pharmacy_id: pharmacy.id.clone(),
            commercial_id: commercial.id.clone(),
            order_date: now,
            order_type: cart.order_type(),
            status: OrderStatus::Pending,
            total_before_discount_cents: totals.total_before_discount.cents(),
            discount_rate_bps: pharmacy.discount_rate_bps,
            discount_amount_cents: totals.discount_amount.cents(),
            shipping_amount_cents: totals.shipping_amount.cents(),
            total_amount_cents: totals.total_amount.cents(),
            notes,
            created_at: now,
            updated_at: now,
        };

        let lines: Vec<OrderLine> = cart
            .lines()
            .iter()
            .map(|cart_line| {
                line_from_cart(
                    &order_id,
                    cart_line,
                    Some(cart_line.product_id.clone()),
                    cart_line.name.clone(),
                    cart_line.sku.clone(),
                    cart_line.ean.clone(),
                    now,
                )
            })
            .collect();

        self.db.orders().insert_with_lines(&order, &lines).await?;

        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            pharmacy = %pharmacy.name,
            total = %order.total_amount(),
            lines = lines.len(),
            "Order submitted"
        );

        Ok(order)
    }

    /// Replaces the line set of a pending order and reconciles its totals.
    ///
    /// The cart holds the edit session's lines: quantities and the price
    /// basis the editor worked against. Product name/sku/ean are
    /// re-snapshotted from the current catalog (an edit is an opportunity
    /// to refresh the denormalized text); unit prices are NOT re-fetched.
    /// Totals are recomputed with the order's stored discount rate.
    ///
    /// Atomic: a failure leaves the pre-edit lines and totals in place.
    pub async fn edit_order_lines(&self, order_id: &str, cart: &Cart) -> ServiceResult<Order> {
        let order = self
            .db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))?;

        ensure_editable(&order)?;
        cart.ensure_submittable()?;

        let now = Utc::now();
        let products = self.db.products();

        let mut lines: Vec<OrderLine> = Vec::with_capacity(cart.line_count());
        for cart_line in cart.lines() {
            // Refresh the denormalized text from the catalog when the
            // product still exists; fall back to the cart snapshot when
            // it no longer does.
            let catalog = products.get_by_id(&cart_line.product_id).await?;
            let (product_id, name, sku, ean) = match &catalog {
                Some(p) => (
                    Some(p.id.clone()),
                    p.name.clone(),
                    p.sku.clone(),
                    p.ean.clone(),
                ),
                None => (
                    None,
                    cart_line.name.clone(),
                    cart_line.sku.clone(),
                    cart_line.ean.clone(),
                ),
            };
            lines.push(line_from_cart(
                &order.id, cart_line, product_id, name, sku, ean, now,
            ));
        }

        // The stored snapshot, never re-fetched from the pharmacy
        let totals = price_order(cart.lines(), order.discount_rate());

        self.db
            .orders()
            .replace_lines(&order.id, &lines, &totals)
            .await?;

        debug!(order_id = %order.id, lines = lines.len(), "Order lines reconciled");

        self.db
            .orders()
            .get_by_id(&order.id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))
            .map_err(ServiceError::from)
    }

    /// Changes an order's status on behalf of an actor.
    ///
    /// Administrators may set any status (the back-office selector is a
    /// deliberate override); a commercial may only self-cancel their own
    /// pending order.
    pub async fn update_status(
        &self,
        order_id: &str,
        actor: &User,
        status: OrderStatus,
    ) -> ServiceResult<Order> {
        let order = self
            .db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))?;

        authorize_transition(actor, &order, status)?;

        self.db.orders().update_status(&order.id, status).await?;

        info!(
            order_id = %order.id,
            from = ?order.status,
            to = ?status,
            actor = %actor.id,
            "Order status updated"
        );

        self.db
            .orders()
            .get_by_id(&order.id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))
            .map_err(ServiceError::from)
    }

    /// Hard-deletes an order and its lines. Administrator-only,
    /// irreversible, available regardless of status (unlike cancellation,
    /// which preserves the record).
    pub async fn delete_order(&self, order_id: &str, actor: &User) -> ServiceResult<()> {
        authorize_deletion(actor)?;

        self.db.orders().delete(order_id).await?;

        info!(order_id = %order_id, actor = %actor.id, "Order deleted");

        Ok(())
    }

    /// Loads the fully-resolved order view handed to downstream renderers
    /// (confirmation email, PDF, CSV export). Totals are the stored,
    /// self-consistent ones; consumers do not recompute.
    pub async fn order_with_details(&self, order_id: &str) -> ServiceResult<OrderWithDetails> {
        let order = self
            .db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))?;

        let lines = self.db.orders().get_lines(&order.id).await?;

        let pharmacy = self
            .db
            .pharmacies()
            .get_by_id(&order.pharmacy_id)
            .await?
            .ok_or_else(|| DbError::not_found("Pharmacy", &order.pharmacy_id))?;

        let commercial = self
            .db
            .users()
            .get_by_id(&order.commercial_id)
            .await?
            .ok_or_else(|| DbError::not_found("User", &order.commercial_id))?;

        Ok(OrderWithDetails {
            order,
            lines,
            pharmacy,
            commercial,
        })
    }
}

/// Builds a stored order line from a cart line.
///
/// Quantity and both unit prices come from the cart (the edit session's
/// price basis); the product text fields are whatever the caller resolved
/// them to. Line totals are exact products, never rounded.
fn line_from_cart(
    order_id: &str,
    cart_line: &CartLine,
    product_id: Option<String>,
    name: String,
    sku: String,
    ean: Option<String>,
    now: chrono::DateTime<Utc>,
) -> OrderLine {
    OrderLine {
        id: generate_line_id(),
        order_id: order_id.to_string(),
        product_id,
        name_snapshot: name,
        sku_snapshot: sku,
        ean_snapshot: ean,
        quantity: cart_line.quantity,
        unit_price_gross_cents: cart_line.unit_price_gross_cents,
        unit_price_retail_cents: cart_line.unit_price_retail_cents,
        line_total_gross_cents: cart_line.unit_price_gross_cents * cart_line.quantity,
        line_total_retail_cents: cart_line.unit_price_retail_cents * cart_line.quantity,
        created_at: now,
    }
}
