//! # Domain Types
//!
//! Core domain types for the order management system.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐        │
//! │  │    Product      │   │    Pharmacy     │   │     Order       │        │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │        │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │        │
//! │  │  sku (business) │   │  discount_rate  │   │  order_number   │        │
//! │  │  gross price HT │   │  sector         │   │  status         │        │
//! │  │  retail TTC     │   │  status         │   │  order_type     │        │
//! │  │  min order qty  │   └─────────────────┘   │  totals         │        │
//! │  └─────────────────┘                         └────────┬────────┘        │
//! │                                                       │ owns 1..N      │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌────────▼────────┐        │
//! │  │     Rate        │   │   OrderStatus   │   │   OrderLine     │        │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │        │
//! │  │  bps (u32)      │   │  Pending        │   │  name_snapshot  │        │
//! │  │  2100 = 21%     │   │  Validated ...  │   │  unit prices    │        │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (sku, order_number, etc.) - human-readable
//!
//! ## Snapshot Pattern
//! An [`OrderLine`] carries frozen copies of the product name/sku/ean and
//! of both unit prices. Catalog edits or deletions after submission never
//! corrupt historical orders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Rate
// =============================================================================

/// A percentage rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 2100 bps = 21% (a typical negotiated pharmacy discount)
/// 2000 bps = 20% (French standard VAT)
///
/// Integer bps keep every rate computation in exact integer math; see
/// [`Money::apply_rate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Rate(u32);

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Creates a rate from a whole percentage.
    ///
    /// ## Example
    /// ```rust
    /// use olivier_core::types::Rate;
    ///
    /// assert_eq!(Rate::from_percent(21).bps(), 2100);
    /// ```
    #[inline]
    pub const fn from_percent(pct: u32) -> Self {
        Rate(pct * 100)
    }

    /// Creates a rate from a fractional percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        Rate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

// =============================================================================
// User
// =============================================================================

/// Account role. Status transitions and hard deletes are gated on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Field sales representative, assigned a portfolio of pharmacies.
    Commercial,
    /// Back-office administrator.
    Admin,
}

impl Role {
    /// Checks for administrator privilege.
    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// A user account (sales representative or administrator).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    /// Geographic sector covered (commercials only).
    pub sector: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product.
///
/// Prices are catalog facts: `gross_unit_price_cents` is the HT
/// (pre-discount, pre-tax) wholesale price every order line is based on;
/// `retail_unit_price_cents` is the TTC reference price in pharmacy.
/// The pharmacy discount is never folded into these.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// EAN-13 barcode, when one exists.
    pub ean: Option<String>,

    /// Display name shown in the catalog and on order documents.
    pub name: String,

    /// Optional description for product details.
    pub description: Option<String>,

    /// Wholesale unit price HT, in cents.
    pub gross_unit_price_cents: i64,

    /// Recommended retail unit price TTC, in cents.
    pub retail_unit_price_cents: i64,

    /// VAT rate in basis points (2000 = 20%).
    pub vat_rate_bps: u32,

    /// Current stock level.
    pub stock_quantity: i64,

    /// Smallest quantity a pharmacy may order (≥ 1).
    pub minimum_order_quantity: i64,

    /// Whether product is orderable (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the wholesale unit price HT as Money.
    #[inline]
    pub fn gross_unit_price(&self) -> Money {
        Money::from_cents(self.gross_unit_price_cents)
    }

    /// Returns the retail unit price TTC as Money.
    #[inline]
    pub fn retail_unit_price(&self) -> Money {
        Money::from_cents(self.retail_unit_price_cents)
    }

    /// Returns the VAT rate.
    #[inline]
    pub fn vat_rate(&self) -> Rate {
        Rate::from_bps(self.vat_rate_bps)
    }
}

// =============================================================================
// Pharmacy
// =============================================================================

/// Commercial relationship status of a pharmacy account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PharmacyStatus {
    /// Buying customer.
    Active,
    /// Former customer, kept for history.
    Inactive,
    /// Not yet converted.
    Prospect,
}

/// A pharmacy account.
///
/// `discount_rate_bps` is the negotiated discount; orders copy it at
/// submission time, so changing it here never touches past orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Pharmacy {
    pub id: String,
    pub name: String,
    pub contact_name: Option<String>,
    pub address: String,
    pub postal_code: String,
    pub city: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// Geographic sector, used to match pharmacies to commercials.
    pub sector: String,
    pub status: PharmacyStatus,
    /// The commercial responsible for this account.
    pub assigned_commercial_id: Option<String>,
    pub first_contact_date: Option<DateTime<Utc>>,
    /// Negotiated discount in basis points (0..=10000).
    pub discount_rate_bps: u32,
    pub created_at: DateTime<Utc>,
}

impl Pharmacy {
    /// Returns the negotiated discount rate.
    #[inline]
    pub fn discount_rate(&self) -> Rate {
        Rate::from_bps(self.discount_rate_bps)
    }
}

// =============================================================================
// Order Type
// =============================================================================

/// The commercial nature of an order.
///
/// Drives the initial cart state: an implantation starts from the
/// standard starter assortment, a reassort starts empty. See
/// [`crate::cart::Cart`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    /// First stocking of a new point of sale.
    Implantation,
    /// Replenishment of an existing point of sale.
    Reassort,
}

// =============================================================================
// Order Status
// =============================================================================

/// The fulfilment status of an order.
///
/// Transition rules and mutability coupling live in
/// [`crate::lifecycle`]; this is only the data definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Submitted, awaiting back-office validation. Lines are editable.
    Pending,
    /// Accepted by the back office. Lines are frozen.
    Validated,
    /// Handed to the carrier.
    Shipped,
    /// Received by the pharmacy (terminal).
    Delivered,
    /// Cancelled; the record is preserved (terminal).
    Cancelled,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

// =============================================================================
// Order
// =============================================================================

/// A submitted order.
///
/// ## Totals invariant
/// `total_amount == (total_before_discount - discount_amount) + shipping_amount`,
/// in cents, exactly — maintained by always writing totals produced by the
/// pricing engine, never hand-assembled ones.
///
/// `discount_rate_bps` / `discount_amount_cents` are a point-in-time
/// snapshot of the pharmacy's terms at submission. Later changes to the
/// pharmacy never retroactively reprice a submitted order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,
    /// Human-readable unique number, e.g. `CMD-1736012345678`.
    pub order_number: String,
    pub pharmacy_id: String,
    pub commercial_id: String,
    pub order_date: DateTime<Utc>,
    pub order_type: OrderType,
    pub status: OrderStatus,
    /// Gross subtotal HT (sum of line totals), in cents.
    pub total_before_discount_cents: i64,
    /// Discount rate snapshot, in basis points.
    pub discount_rate_bps: u32,
    /// Discount amount, in cents.
    pub discount_amount_cents: i64,
    /// Shipping fee, in cents (0 above the free-shipping threshold).
    pub shipping_amount_cents: i64,
    /// Grand total HT, in cents.
    pub total_amount_cents: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Returns the gross subtotal HT as Money.
    #[inline]
    pub fn total_before_discount(&self) -> Money {
        Money::from_cents(self.total_before_discount_cents)
    }

    /// Returns the discount rate snapshot.
    #[inline]
    pub fn discount_rate(&self) -> Rate {
        Rate::from_bps(self.discount_rate_bps)
    }

    /// Returns the discount amount as Money.
    #[inline]
    pub fn discount_amount(&self) -> Money {
        Money::from_cents(self.discount_amount_cents)
    }

    /// Returns the shipping fee as Money.
    #[inline]
    pub fn shipping_amount(&self) -> Money {
        Money::from_cents(self.shipping_amount_cents)
    }

    /// Returns the grand total as Money.
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }
}

// =============================================================================
// Order Line
// =============================================================================

/// A line item of an order.
/// Uses the snapshot pattern to freeze product data at submission/edit time.
///
/// Unit prices are **always the catalog gross prices**, never the
/// pharmacy-discounted ones: the discount is applied once, at order
/// level, so line economics stay auditable independent of any one
/// pharmacy's terms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderLine {
    pub id: String,
    pub order_id: String,
    /// Catalog reference; NULL once the product is hard-deleted.
    pub product_id: Option<String>,
    /// Product name at submission/edit time (frozen).
    pub name_snapshot: String,
    /// SKU at submission/edit time (frozen).
    pub sku_snapshot: String,
    /// EAN at submission/edit time (frozen).
    pub ean_snapshot: Option<String>,
    /// Quantity ordered (≥ 1).
    pub quantity: i64,
    /// Unit price HT in cents at submission/edit time (frozen).
    pub unit_price_gross_cents: i64,
    /// Unit price TTC in cents at submission/edit time (frozen).
    pub unit_price_retail_cents: i64,
    /// Line total HT (unit gross × quantity, exact).
    pub line_total_gross_cents: i64,
    /// Line total TTC (unit retail × quantity, exact).
    pub line_total_retail_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl OrderLine {
    /// Returns the unit price HT as Money.
    #[inline]
    pub fn unit_price_gross(&self) -> Money {
        Money::from_cents(self.unit_price_gross_cents)
    }

    /// Returns the unit price TTC as Money.
    #[inline]
    pub fn unit_price_retail(&self) -> Money {
        Money::from_cents(self.unit_price_retail_cents)
    }

    /// Returns the line total HT as Money.
    #[inline]
    pub fn line_total_gross(&self) -> Money {
        Money::from_cents(self.line_total_gross_cents)
    }

    /// Returns the line total TTC as Money.
    #[inline]
    pub fn line_total_retail(&self) -> Money {
        Money::from_cents(self.line_total_retail_cents)
    }
}

// =============================================================================
// Resolved Order View
// =============================================================================

/// A fully-resolved order for downstream consumers (email confirmation,
/// PDF, CSV export).
///
/// Read-only: totals are guaranteed self-consistent at hand-off, and
/// renderers perform no recomputation of their own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderWithDetails {
    pub order: Order,
    pub lines: Vec<OrderLine>,
    pub pharmacy: Pharmacy,
    pub commercial: User,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_from_bps() {
        let rate = Rate::from_bps(2100);
        assert_eq!(rate.bps(), 2100);
        assert!((rate.percentage() - 21.0).abs() < 0.001);
    }

    #[test]
    fn test_rate_from_percent() {
        assert_eq!(Rate::from_percent(21).bps(), 2100);
        assert_eq!(Rate::from_percentage(12.5).bps(), 1250);
    }

    #[test]
    fn test_order_status_default() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_role_is_admin() {
        assert!(Role::Admin.is_admin());
        assert!(!Role::Commercial.is_admin());
    }

    #[test]
    fn test_enum_wire_format() {
        // The snake_case strings are what the renderer boundary and the
        // database both see
        assert_eq!(
            serde_json::to_string(&OrderStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_string(&OrderType::Implantation).unwrap(),
            "\"implantation\""
        );
        assert_eq!(
            serde_json::to_string(&PharmacyStatus::Prospect).unwrap(),
            "\"prospect\""
        );
        assert_eq!(serde_json::to_string(&Role::Commercial).unwrap(), "\"commercial\"");
    }
}
