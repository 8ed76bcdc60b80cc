//! # Order Status Rules
//!
//! Two tables live here:
//!
//! 1. Which order status changes staff may make ([`is_valid_transition`]).
//! 2. How a payment provider's intent status maps onto the order
//!    ([`reconcile_payment`]).
//!
//! ```text
//! ┌──────────────────────────────┬────────────────┬────────────────┐
//! │ provider intent status       │ order status   │ payment status │
//! ├──────────────────────────────┼────────────────┼────────────────┤
//! │ succeeded                    │ paid           │ succeeded      │
//! │ requires_payment_method      │ pending        │ pending        │
//! │ requires_confirmation        │ pending        │ pending        │
//! │ requires_action              │ pending        │ pending        │
//! │ canceled                     │ cancelled      │ cancelled      │
//! │ *failed* / last_payment_error│ pending        │ failed         │
//! │ anything else                │ pending        │ pending        │
//! └──────────────────────────────┴────────────────┴────────────────┘
//! ```
//!
//! Rows match top to bottom, so a `requires_*` intent carrying a
//! `last_payment_error` (a declined card awaiting a new method) stays pending.
//!
//! The mapping does not look at the order's current status. A late
//! `succeeded` on a cancelled order still yields `paid`; callers decide
//! whether to warn about it.

use crate::types::{OrderStatus, PaymentStatus};

// =============================================================================
// Transition Table
// =============================================================================

impl OrderStatus {
    /// Statuses reachable from this one in a single step.
    pub const fn next_allowed(&self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Pending => &[OrderStatus::Paid, OrderStatus::Cancelled],
            OrderStatus::Paid => &[OrderStatus::Preparing, OrderStatus::Cancelled],
            OrderStatus::Preparing => &[OrderStatus::Ready, OrderStatus::Cancelled],
            OrderStatus::Ready => &[OrderStatus::Completed],
            OrderStatus::Completed | OrderStatus::Cancelled => &[],
        }
    }
}

/// Returns true when `from → to` is a canonical lifecycle step.
///
/// Setting a status to itself is not a transition and returns false.
pub fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
    from.next_allowed().contains(&to)
}

// =============================================================================
// Payment Reconciliation
// =============================================================================

/// Order and payment status derived from a provider intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
}

/// Maps a provider intent status onto order and payment status.
///
/// `has_payment_error` is true when the provider reported a
/// `last_payment_error` on the intent.
pub fn reconcile_payment(intent_status: &str, has_payment_error: bool) -> Reconciliation {
    let (order_status, payment_status) = match intent_status {
        "succeeded" => (OrderStatus::Paid, PaymentStatus::Succeeded),
        "requires_payment_method" | "requires_confirmation" | "requires_action" => {
            (OrderStatus::Pending, PaymentStatus::Pending)
        }
        "canceled" => (OrderStatus::Cancelled, PaymentStatus::Cancelled),
        s if s.contains("failed") || has_payment_error => {
            (OrderStatus::Pending, PaymentStatus::Failed)
        }
        _ => (OrderStatus::Pending, PaymentStatus::Pending),
    };

    Reconciliation {
        order_status,
        payment_status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_path_is_valid() {
        assert!(is_valid_transition(OrderStatus::Pending, OrderStatus::Paid));
        assert!(is_valid_transition(OrderStatus::Paid, OrderStatus::Preparing));
        assert!(is_valid_transition(OrderStatus::Preparing, OrderStatus::Ready));
        assert!(is_valid_transition(OrderStatus::Ready, OrderStatus::Completed));
    }

    #[test]
    fn test_cancel_only_before_ready() {
        assert!(is_valid_transition(OrderStatus::Pending, OrderStatus::Cancelled));
        assert!(is_valid_transition(OrderStatus::Paid, OrderStatus::Cancelled));
        assert!(is_valid_transition(OrderStatus::Preparing, OrderStatus::Cancelled));
        assert!(!is_valid_transition(OrderStatus::Ready, OrderStatus::Cancelled));
    }

    #[test]
    fn test_terminal_statuses_go_nowhere() {
        for to in OrderStatus::ALL {
            assert!(!is_valid_transition(OrderStatus::Completed, to));
            assert!(!is_valid_transition(OrderStatus::Cancelled, to));
        }
    }

    #[test]
    fn test_no_skipping_or_going_back() {
        assert!(!is_valid_transition(OrderStatus::Pending, OrderStatus::Ready));
        assert!(!is_valid_transition(OrderStatus::Ready, OrderStatus::Paid));
        assert!(!is_valid_transition(OrderStatus::Paid, OrderStatus::Paid));
    }

    #[test]
    fn test_succeeded_maps_to_paid() {
        let r = reconcile_payment("succeeded", false);
        assert_eq!(r.order_status, OrderStatus::Paid);
        assert_eq!(r.payment_status, PaymentStatus::Succeeded);
    }

    #[test]
    fn test_waiting_statuses_stay_pending() {
        for s in ["requires_payment_method", "requires_confirmation", "requires_action", "processing"] {
            let r = reconcile_payment(s, false);
            assert_eq!(r.order_status, OrderStatus::Pending, "{s}");
            assert_eq!(r.payment_status, PaymentStatus::Pending, "{s}");
        }
    }

    #[test]
    fn test_canceled_maps_to_cancelled() {
        let r = reconcile_payment("canceled", false);
        assert_eq!(r.order_status, OrderStatus::Cancelled);
        assert_eq!(r.payment_status, PaymentStatus::Cancelled);
    }

    #[test]
    fn test_failures_mark_payment_failed() {
        let r = reconcile_payment("payment_failed", false);
        assert_eq!(r.payment_status, PaymentStatus::Failed);
        assert_eq!(r.order_status, OrderStatus::Pending);

        let r = reconcile_payment("processing", true);
        assert_eq!(r.payment_status, PaymentStatus::Failed);
        assert_eq!(r.order_status, OrderStatus::Pending);
    }

    #[test]
    fn test_declined_card_waiting_for_new_method_stays_pending() {
        for s in ["requires_payment_method", "requires_confirmation", "requires_action"] {
            let r = reconcile_payment(s, true);
            assert_eq!(r.order_status, OrderStatus::Pending, "{s}");
            assert_eq!(r.payment_status, PaymentStatus::Pending, "{s}");
        }
    }
}
