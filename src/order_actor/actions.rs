use chrono::{DateTime, Duration, Utc};

use crate::domain::{Order, OrderStatus, Principal};

/// Custom actions for Order entities.
///
/// Each action carries the caller so that authorization, the transition-table
/// check and the mutation happen in one step inside the order actor.
#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Generic status change validated against the transition table.
    Transition {
        requested_by: Principal,
        target: OrderStatus,
        at: DateTime<Utc>,
        delivery_eta: Duration,
    },
    /// Hands a `ready` order to a driver and moves it to `delivering`.
    AssignDriver {
        requested_by: Principal,
        driver_id: String,
        at: DateTime<Utc>,
        delivery_eta: Duration,
    },
}

/// Result of a committed transition.
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    pub previous: OrderStatus,
    pub order: Order,
}

impl TransitionOutcome {
    /// True when this transition is the one that cancelled the order.
    pub fn cancelled_now(&self) -> bool {
        self.order.status == OrderStatus::Cancelled && self.previous != OrderStatus::Cancelled
    }
}
