//! # olivier-core: Pure Business Logic for L'Olivier de Leos
//!
//! This crate is the **heart** of the order management system. It contains
//! all business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                L'Olivier de Leos Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            Callers (API, back-office, exports)                  │   │
//! │  │    catalog browse ──► cart ──► submit ──► track & edit          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ olivier-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐   │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │  pricing  │   │   │
//! │  │   │  Product  │  │   Money   │  │   Cart    │  │  totals   │   │   │
//! │  │   │   Order   │  │   Rate    │  │  minimums │  │  shipping │   │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘   │   │
//! │  │   ┌───────────┐  ┌───────────┐                                 │   │
//! │  │   │ lifecycle │  │ validation│                                 │   │
//! │  │   │  statuses │  │   rules   │                                 │   │
//! │  │   └───────────┘  └───────────┘                                 │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  olivier-db (Database Layer)                    │   │
//! │  │       SQLite repositories, order service, KPI queries           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Pharmacy, Order, OrderLine, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Cart builder with minimum-order-quantity policy
//! - [`pricing`] - The order pricing engine (discount, shipping threshold)
//! - [`lifecycle`] - Status transitions and mutability rules
//! - [`validation`] - Field-level validation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: pricing the same cart twice gives byte-identical
//!    totals
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are euro cents (i64), rates
//!    are basis points — no float drift in the second decimal place
//! 4. **Explicit Errors**: all errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use olivier_core::cart::Cart;
//! use olivier_core::pricing::price_order;
//! use olivier_core::types::Rate;
//!
//! let cart = Cart::for_reassort();
//! // ... add products ...
//!
//! // Price against the pharmacy's negotiated discount
//! let totals = price_order(cart.lines(), Rate::from_percent(21));
//! assert_eq!(totals.total_amount.cents(), 990); // empty cart: fee only
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod lifecycle;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use olivier_core::Money` instead of
// `use olivier_core::money::Money`

pub use cart::{Cart, CartLine, ImplantationDefaults, MinimumQuantityViolation};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{price_order, OrderTotals, PricedLine};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Net (post-discount) subtotal at or above which shipping is free.
///
/// ## Business Reason
/// Evaluated against the discounted value: a pharmacy with a large
/// discount must still clear 300 € of discounted merchandise to earn
/// free shipping.
pub const FREE_SHIPPING_THRESHOLD: Money = Money::from_cents(30_000);

/// Flat shipping fee charged below [`FREE_SHIPPING_THRESHOLD`].
pub const SHIPPING_FEE: Money = Money::from_cents(990);

/// Maximum distinct lines allowed in a single cart.
///
/// ## Business Reason
/// Prevents runaway carts; comfortably above the full catalog breadth a
/// pharmacy would ever stock in one order.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;
