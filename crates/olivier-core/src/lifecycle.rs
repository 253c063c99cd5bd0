//! # Order Lifecycle
//!
//! Status transition rules and the mutability they imply.
//!
//! ## The Forward Chain
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │            ┌───────────┐      ┌───────────┐                             │
//! │   created  │  pending  │─────►│ validated │─────┐                       │
//! │  ─────────►│ (editable)│      │  (frozen) │     │                       │
//! │            └─────┬─────┘      └─────┬─────┘     ▼                       │
//! │                  │                  │     ┌───────────┐                 │
//! │                  │                  │     │  shipped  │                 │
//! │                  ▼                  ▼     └─────┬─────┘                 │
//! │            ┌───────────┐    ┌───────────┐      │                       │
//! │            │ cancelled │    │ cancelled │      ▼                       │
//! │            │ (terminal)│    │ (terminal)│ ┌───────────┐                │
//! │            └───────────┘    └───────────┘ │ delivered │                │
//! │                                           │ (terminal)│                │
//! │                                           └───────────┘                │
//! │                                                                         │
//! │  Line edits are permitted ONLY while pending. After that, only the      │
//! │  status field itself may still change (by an administrator).            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Transition authority
//! - An **administrator** may set any status at any time. This is the
//!   back-office status selector: a deliberate operational override, not
//!   constrained to the forward chain (it can walk a mis-clicked order
//!   back from shipped to validated).
//! - A **commercial** may only self-cancel their own *pending* order.
//!
//! Hard deletion (order + cascade of its lines) is a separate,
//! administrator-only, irreversible operation available regardless of
//! status; cancellation preserves the record, deletion removes it.

use crate::error::{CoreError, CoreResult};
use crate::types::{Order, OrderStatus, User};

// =============================================================================
// Transition Rules
// =============================================================================

impl OrderStatus {
    /// Checks whether `next` is reachable from `self` along the forward
    /// chain. The administrative override intentionally does not consult
    /// this table.
    pub const fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Validated)
                | (Pending, Cancelled)
                | (Validated, Shipped)
                | (Validated, Cancelled)
                | (Shipped, Delivered)
        )
    }

    /// Terminal states admit no forward transition.
    pub const fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Line editing is permitted only while pending.
    pub const fn is_editable(self) -> bool {
        matches!(self, OrderStatus::Pending)
    }
}

// =============================================================================
// Authority Checks
// =============================================================================

/// Authorizes a status change on an order for the given actor.
///
/// ## Rules
/// - Administrators: any status, any time (operational override).
/// - Commercials: only `pending → cancelled`, and only on an order they
///   submitted themselves.
///
/// Everything else is [`CoreError::StatusChangeForbidden`].
pub fn authorize_transition(actor: &User, order: &Order, next: OrderStatus) -> CoreResult<()> {
    if actor.role.is_admin() {
        return Ok(());
    }

    let self_cancel = order.status == OrderStatus::Pending
        && next == OrderStatus::Cancelled
        && actor.id == order.commercial_id;

    if self_cancel {
        Ok(())
    } else {
        Err(CoreError::StatusChangeForbidden {
            from: order.status,
            to: next,
        })
    }
}

/// Checks that an order's line set may still be edited.
///
/// Fails with [`CoreError::OrderNotEditable`] (a precondition failure,
/// never a silent no-op) once the order has left `pending`.
pub fn ensure_editable(order: &Order) -> CoreResult<()> {
    if order.status.is_editable() {
        Ok(())
    } else {
        Err(CoreError::OrderNotEditable {
            order_id: order.id.clone(),
            status: order.status,
        })
    }
}

/// Authorizes hard deletion of an order.
///
/// Admin-only, irreversible, available regardless of status.
pub fn authorize_deletion(actor: &User) -> CoreResult<()> {
    if actor.role.is_admin() {
        Ok(())
    } else {
        Err(CoreError::AdminOnly {
            operation: "Deleting an order".to_string(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
