//! # Cart / Line-Item Builder
//!
//! Assembles a candidate set of (product, quantity) pairs before an order
//! is submitted, enforcing the per-product minimum-order-quantity policy.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Builder Operations                              │
//! │                                                                         │
//! │  Operator Action            Cart Call                Cart State Change  │
//! │  ───────────────            ─────────                ─────────────────  │
//! │                                                                         │
//! │  Pick product ────────────► add_product() ─────────► insert or qty+1    │
//! │                                                                         │
//! │  Type a quantity ─────────► set_quantity() ────────► set + flag if      │
//! │                                                       below minimum     │
//! │  Type 0 / clear ──────────► set_quantity(0) ───────► line removed       │
//! │                                                                         │
//! │  Click remove ────────────► remove_product() ──────► line removed       │
//! │                                                                         │
//! │  Submit ──────────────────► ensure_submittable() ──► ALL violations     │
//! │                                                       reported at once  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Two kinds of orders
//! - **Reassort** (replenishment): the cart starts empty, every line is
//!   operator-added at the product's minimum order quantity.
//! - **Implantation** (first stocking): the cart starts pre-populated
//!   from an injected [`ImplantationDefaults`] table (SKU → case
//!   quantity), the curated starter assortment for a new point of sale.
//!
//! ## Below-minimum lines are kept, flagged
//! `set_quantity` never auto-corrects or silently drops a below-minimum
//! line: the operator sees the violation (with the minimum named) and
//! resolves it before submission. `add_product` on an existing line only
//! moves quantity upward, so it cannot create a violation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{OrderType, Product};
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY};

// =============================================================================
// Minimum Quantity Violation
// =============================================================================

/// A cart line sitting below its product's minimum order quantity.
///
/// Returned by [`Cart::set_quantity`] for immediate operator feedback and
/// by [`Cart::validate_all`] as the submission gate (all lines at once).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimumQuantityViolation {
    pub product_id: String,
    pub sku: String,
    pub minimum: i64,
    pub quantity: i64,
}

impl fmt::Display for MinimumQuantityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} requires at least {} (got {})",
            self.sku, self.minimum, self.quantity
        )
    }
}

// =============================================================================
// Implantation Defaults
// =============================================================================

/// One entry of the starter assortment: a SKU and its case quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImplantationDefault {
    pub sku: String,
    pub quantity: i64,
}

/// The starter assortment for implantation orders: SKU → default quantity.
///
/// This is configuration, injected into the cart at construction, so it
/// can be versioned, tested, and swapped per catalog revision without
/// touching cart logic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImplantationDefaults {
    entries: Vec<ImplantationDefault>,
}

impl ImplantationDefaults {
    /// Creates a defaults table from explicit entries.
    pub fn new(entries: Vec<ImplantationDefault>) -> Self {
        ImplantationDefaults { entries }
    }

    /// An empty table (used by reassort carts).
    pub fn empty() -> Self {
        ImplantationDefaults {
            entries: Vec::new(),
        }
    }

    /// The standard starter assortment for a new pharmacy: one facing of
    /// face care, body care, and spa lines, in case quantities of 6 or 12.
    pub fn standard() -> Self {
        let table: [(&str, i64); 12] = [
            ("VIS-CREME-50", 6),
            ("VIS-SER-30", 6),
            ("VIS-CONT-15", 6),
            ("COR-LAIT-200", 12),
            ("COR-SAVON-100", 12),
            ("COR-GOM-150", 6),
            ("CHE-SHP-250", 12),
            ("CHE-APS-200", 6),
            ("MAIN-CREME-75", 12),
            ("LEV-BAUME-15", 12),
            ("SPA-HUILE-100", 6),
            ("SPA-BOUGIE-150", 6),
        ];
        ImplantationDefaults {
            entries: table
                .iter()
                .map(|(sku, quantity)| ImplantationDefault {
                    sku: (*sku).to_string(),
                    quantity: *quantity,
                })
                .collect(),
        }
    }

    /// Returns the default quantity for a SKU, if it is part of the
    /// assortment.
    pub fn quantity_for(&self, sku: &str) -> Option<i64> {
        self.entries
            .iter()
            .find(|e| e.sku == sku)
            .map(|e| e.quantity)
    }

    /// Iterates the assortment entries in table order.
    pub fn entries(&self) -> impl Iterator<Item = &ImplantationDefault> {
        self.entries.iter()
    }

    /// Number of SKUs in the assortment.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Cart Line
// =============================================================================

/// A line in the cart.
///
/// ## Design Notes
/// - `product_id`: reference to the catalog product
/// - the remaining product fields are a frozen snapshot taken when the
///   line was created, so a catalog price change never silently alters
///   an in-progress order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    /// Product ID (UUID)
    pub product_id: String,

    /// SKU at time of adding (frozen)
    pub sku: String,

    /// Product name at time of adding (frozen)
    pub name: String,

    /// EAN at time of adding (frozen)
    pub ean: Option<String>,

    /// Wholesale unit price HT in cents at time of adding (frozen)
    pub unit_price_gross_cents: i64,

    /// Retail unit price TTC in cents at time of adding (frozen)
    pub unit_price_retail_cents: i64,

    /// Minimum order quantity carried from the product, for validation
    pub minimum_order_quantity: i64,

    /// Quantity in cart
    pub quantity: i64,

    /// When this line was added
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Creates a new cart line from a product and quantity.
    ///
    /// ## Price Freezing
    /// Both unit prices are captured at this moment. If the product
    /// changes in the catalog afterwards, this line keeps what the
    /// operator saw.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartLine {
            product_id: product.id.clone(),
            sku: product.sku.clone(),
            name: product.name.clone(),
            ean: product.ean.clone(),
            unit_price_gross_cents: product.gross_unit_price_cents,
            unit_price_retail_cents: product.retail_unit_price_cents,
            minimum_order_quantity: product.minimum_order_quantity,
            quantity,
            added_at: Utc::now(),
        }
    }

    /// Line total HT (unit gross × quantity, exact).
    pub fn line_total_gross(&self) -> Money {
        Money::from_cents(self.unit_price_gross_cents * self.quantity)
    }

    /// Line total TTC (unit retail × quantity, exact).
    pub fn line_total_retail(&self) -> Money {
        Money::from_cents(self.unit_price_retail_cents * self.quantity)
    }

    /// Returns the violation if this line sits below its minimum.
    pub fn below_minimum(&self) -> Option<MinimumQuantityViolation> {
        if self.quantity < self.minimum_order_quantity {
            Some(MinimumQuantityViolation {
                product_id: self.product_id.clone(),
                sku: self.sku.clone(),
                minimum: self.minimum_order_quantity,
                quantity: self.quantity,
            })
        } else {
            None
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The order-composition cart.
///
/// ## Invariants
/// - Lines are unique by `product_id` (adding the same product again
///   increases quantity)
/// - `quantity >= 1` on every line (0 removes the line)
/// - Maximum distinct lines: [`MAX_CART_LINES`]
/// - Maximum quantity per line: [`MAX_LINE_QUANTITY`]
/// - Below-minimum lines are kept and reported, never auto-corrected
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    /// Commercial nature of the order being composed.
    order_type: OrderType,

    /// Starter assortment (empty for reassort carts).
    defaults: ImplantationDefaults,

    /// Lines in the cart.
    lines: Vec<CartLine>,

    /// When the cart was created.
    created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates an empty replenishment cart. Every line is operator-added.
    pub fn for_reassort() -> Self {
        Cart {
            order_type: OrderType::Reassort,
            defaults: ImplantationDefaults::empty(),
            lines: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Creates a first-stocking cart pre-populated from the starter
    /// assortment.
    ///
    /// For each entry of the table, the matching active product from the
    /// catalog slice is added at its default case quantity. SKUs absent
    /// from the catalog (or inactive) are skipped.
    pub fn for_implantation(defaults: ImplantationDefaults, catalog: &[Product]) -> Self {
        let mut lines = Vec::new();
        for entry in defaults.entries() {
            if let Some(product) = catalog.iter().find(|p| p.is_active && p.sku == entry.sku) {
                lines.push(CartLine::from_product(product, entry.quantity));
            }
        }
        Cart {
            order_type: OrderType::Implantation,
            defaults,
            lines,
            created_at: Utc::now(),
        }
    }

    /// The order type this cart was built for.
    pub fn order_type(&self) -> OrderType {
        self.order_type
    }

    /// When the cart was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Adds a product to the cart, or bumps its quantity if present.
    ///
    /// ## Behavior
    /// - Already in cart: quantity + 1. Increments only move quantity
    ///   upward, so they can never create a below-minimum line.
    /// - Not in cart: insert at the product's minimum order quantity
    ///   (reassort), or at the assortment default for its SKU
    ///   (implantation, falling back to the minimum).
    pub fn add_product(&mut self, product: &Product) -> CoreResult<()> {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            let new_qty = line.quantity + 1;
            if new_qty > MAX_LINE_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_LINE_QUANTITY,
                });
            }
            line.quantity = new_qty;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }

        let initial_quantity = match self.order_type {
            OrderType::Reassort => product.minimum_order_quantity,
            OrderType::Implantation => self
                .defaults
                .quantity_for(&product.sku)
                .unwrap_or(product.minimum_order_quantity),
        };

        self.lines.push(CartLine::from_product(product, initial_quantity));
        Ok(())
    }

    /// Sets the quantity of a line.
    ///
    /// ## Behavior
    /// - `quantity <= 0`: the line is removed (and with it any pending
    ///   violation) — same effect as [`Cart::remove_product`]
    /// - `quantity > 0`: the line is set and re-validated; a
    ///   below-minimum line is KEPT and the violation returned for the
    ///   operator to resolve before submission
    pub fn set_quantity(
        &mut self,
        product_id: &str,
        quantity: i64,
    ) -> CoreResult<Option<MinimumQuantityViolation>> {
        if quantity <= 0 {
            self.remove_product(product_id);
            return Ok(None);
        }

        if quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_LINE_QUANTITY,
            });
        }

        let line = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product_id)
            .ok_or_else(|| CoreError::ProductNotInCart(product_id.to_string()))?;

        line.quantity = quantity;
        Ok(line.below_minimum())
    }

    /// Removes a line unconditionally. Removing an absent product is a
    /// no-op.
    pub fn remove_product(&mut self, product_id: &str) {
        self.lines.retain(|l| l.product_id != product_id);
    }

    /// Returns every line currently below its minimum order quantity.
    ///
    /// The submission gate: callers refuse submission while this is
    /// non-empty, reporting all violations together rather than
    /// fail-fast on the first.
    pub fn validate_all(&self) -> Vec<MinimumQuantityViolation> {
        self.lines.iter().filter_map(|l| l.below_minimum()).collect()
    }

    /// Checks the cart is fit for submission: non-empty and with every
    /// line at or above its minimum.
    pub fn ensure_submittable(&self) -> CoreResult<()> {
        if self.lines.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        let violations = self.validate_all();
        if !violations.is_empty() {
            return Err(CoreError::MinimumQuantities(violations));
        }
        Ok(())
    }

    /// The lines currently in the cart.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Gross subtotal HT over all lines (pre-discount).
    pub fn gross_subtotal(&self) -> Money {
        self.lines.iter().map(|l| l.line_total_gross()).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Clears all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
