//! # Pricing Engine
//!
//! Pure function from `(lines, pharmacy discount rate)` to order totals.
//! No side effects, no I/O, no errors: a total function over well-formed
//! input (the cart builder rejects bad quantities before lines get here).
//!
//! ## Computation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Order Total Computation                             │
//! │                                                                         │
//! │  Lines: 5 × 50.00 €  +  3 × 20.00 €                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Gross subtotal HT ............ 310.00 €   (exact sum of line totals)   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Discount (21%) ............... -65.10 €   (single half-up rounding)    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Net subtotal ................. 244.90 €                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Shipping (net < 300.00 €) ...... 9.90 €   (post-discount threshold)    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  TOTAL ........................ 254.80 €                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The shipping threshold is evaluated against the **post-discount**
//! subtotal: a pharmacy with a large discount must still clear 300 € of
//! discounted value to earn free shipping.
//!
//! ## Determinism
//! Integer-cents arithmetic end to end: re-running the engine on the same
//! `(lines, rate)` input produces byte-identical totals, which is what
//! lets stored totals be compared against recomputed ones at any time.

use serde::{Deserialize, Serialize};

use crate::cart::CartLine;
use crate::money::Money;
use crate::types::{OrderLine, Rate};
use crate::{FREE_SHIPPING_THRESHOLD, SHIPPING_FEE};

// =============================================================================
// Priced Line
// =============================================================================

/// Anything the engine can price: a cart line during composition, or a
/// stored order line during reconciliation.
pub trait PricedLine {
    /// Line total HT (unit gross price × quantity, exact).
    fn line_total_gross(&self) -> Money;
}

impl PricedLine for CartLine {
    fn line_total_gross(&self) -> Money {
        CartLine::line_total_gross(self)
    }
}

impl PricedLine for OrderLine {
    fn line_total_gross(&self) -> Money {
        OrderLine::line_total_gross(self)
    }
}

// =============================================================================
// Order Totals
// =============================================================================

/// The complete monetary outcome of pricing an order.
///
/// Invariant: `total_amount == (total_before_discount - discount_amount)
/// + shipping_amount`, exactly — the constructor is the only way to
/// obtain one, so the invariant holds everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    /// Gross subtotal HT: Σ line totals, pre-discount.
    pub total_before_discount: Money,
    /// Discount amount at the pharmacy's rate.
    pub discount_amount: Money,
    /// Shipping fee (zero at or above the free-shipping threshold).
    pub shipping_amount: Money,
    /// Grand total: net subtotal + shipping.
    pub total_amount: Money,
}

impl OrderTotals {
    /// Post-discount subtotal, the basis of the shipping threshold.
    pub fn net_subtotal(&self) -> Money {
        self.total_before_discount - self.discount_amount
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Prices an order from its lines and the pharmacy's discount rate.
///
/// ## Algorithm
/// 1. `gross = Σ line_total_gross` (exact, no intermediate rounding)
/// 2. `discount = gross × rate` (half-up to the cent, the single
///    rounding point)
/// 3. `net = gross - discount`
/// 4. `shipping = net < 300.00 € ? 9.90 € : 0`
/// 5. `total = net + shipping`
///
/// ## Edge case
/// An empty line set prices to zero plus the shipping fee (0 < 300 ⇒ fee
/// charged). Empty carts are not submittable in the first place; the
/// gate lives in the cart builder, not here.
///
/// ## Example
/// ```rust
/// use olivier_core::pricing::price_order;
/// use olivier_core::cart::CartLine;
/// use olivier_core::types::Rate;
/// use chrono::Utc;
///
/// let line = CartLine {
///     product_id: "p1".into(),
///     sku: "VIS-CREME-50".into(),
///     name: "Crème visage".into(),
///     ean: None,
///     unit_price_gross_cents: 5000,
///     unit_price_retail_cents: 9900,
///     minimum_order_quantity: 1,
///     quantity: 5,
///     added_at: Utc::now(),
/// };
///
/// let totals = price_order(std::slice::from_ref(&line), Rate::from_percent(10));
/// assert_eq!(totals.total_before_discount.cents(), 25000);
/// assert_eq!(totals.discount_amount.cents(), 2500);
/// assert_eq!(totals.shipping_amount.cents(), 990); // 225.00 < 300.00
/// assert_eq!(totals.total_amount.cents(), 23490);
/// ```
pub fn price_order<L: PricedLine>(lines: &[L], discount_rate: Rate) -> OrderTotals {
    let gross: Money = lines.iter().map(|l| l.line_total_gross()).sum();
    let discount = gross.apply_rate(discount_rate);
    let net = gross - discount;

    let shipping = if net < FREE_SHIPPING_THRESHOLD {
        SHIPPING_FEE
    } else {
        Money::zero()
    };

    OrderTotals {
        total_before_discount: gross,
        discount_amount: discount,
        shipping_amount: shipping,
        total_amount: net + shipping,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn line(gross_cents: i64, quantity: i64) -> CartLine {
        CartLine {
            product_id: format!("p-{gross_cents}-{quantity}"),
            sku: format!("SKU-{gross_cents}"),
            name: "Test".to_string(),
            ean: None,
            unit_price_gross_cents: gross_cents,
            unit_price_retail_cents: gross_cents * 2,
            minimum_order_quantity: 1,
            quantity,
            added_at: Utc::now(),
        }
    }

    #[test]
    fn test_worked_example() {
        // Pharmacy at 21%: 5 × 50.00 + 3 × 20.00
        let lines = vec![line(5000, 5), line(2000, 3)];
        let totals = price_order(&lines, Rate::from_percent(21));

        assert_eq!(totals.total_before_discount.cents(), 31000); // 310.00
        assert_eq!(totals.discount_amount.cents(), 6510); // 65.10
        assert_eq!(totals.net_subtotal().cents(), 24490); // 244.90
        assert_eq!(totals.shipping_amount.cents(), 990); // below threshold
        assert_eq!(totals.total_amount.cents(), 25480); // 254.80
    }

    #[test]
    fn test_shipping_threshold_boundary() {
        // 299.99 € net → fee charged
        let totals = price_order(&[line(29999, 1)], Rate::zero());
        assert_eq!(totals.shipping_amount.cents(), 990);
        assert_eq!(totals.total_amount.cents(), 29999 + 990);

        // 300.00 € net → free shipping
        let totals = price_order(&[line(30000, 1)], Rate::zero());
        assert_eq!(totals.shipping_amount.cents(), 0);
        assert_eq!(totals.total_amount.cents(), 30000);
    }

    #[test]
    fn test_threshold_is_post_discount() {
        // 350.00 € gross clears the threshold, but at 20% discount the
        // net is 280.00 € and the fee still applies.
        let totals = price_order(&[line(35000, 1)], Rate::from_percent(20));
        assert_eq!(totals.net_subtotal().cents(), 28000);
        assert_eq!(totals.shipping_amount.cents(), 990);
    }

    #[test]
    fn test_empty_lines() {
        let lines: Vec<CartLine> = Vec::new();
        let totals = price_order(&lines, Rate::from_percent(21));
        assert_eq!(totals.total_before_discount.cents(), 0);
        assert_eq!(totals.discount_amount.cents(), 0);
        // 0 < 300 ⇒ the fee applies; empty carts are gated upstream
        assert_eq!(totals.shipping_amount.cents(), 990);
        assert_eq!(totals.total_amount.cents(), 990);
    }

    #[test]
    fn test_idempotent() {
        let lines = vec![line(3333, 7), line(1999, 2)];
        let rate = Rate::from_bps(1575);
        assert_eq!(price_order(&lines, rate), price_order(&lines, rate));
    }

    #[test]
    fn test_totals_invariant() {
        for (cents, qty, bps) in [
            (5000_i64, 5_i64, 2100_u32),
            (29999, 1, 0),
            (12345, 3, 375),
            (1, 1, 9999),
        ] {
            let totals = price_order(&[line(cents, qty)], Rate::from_bps(bps));
            assert_eq!(
                totals.total_amount,
                totals.net_subtotal() + totals.shipping_amount,
                "invariant violated for ({cents}, {qty}, {bps})"
            );
        }
    }

    #[test]
    fn test_zero_discount() {
        let totals = price_order(&[line(40000, 1)], Rate::zero());
        assert_eq!(totals.discount_amount.cents(), 0);
        assert_eq!(totals.total_amount.cents(), 40000);
    }

    #[test]
    fn test_full_discount() {
        // 100% discount: net is zero, fee still applies per the rule
        let totals = price_order(&[line(40000, 1)], Rate::from_percent(100));
        assert_eq!(totals.net_subtotal().cents(), 0);
        assert_eq!(totals.total_amount.cents(), 990);
    }
}
