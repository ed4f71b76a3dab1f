//! The order state machine: one transition function shared by every path that changes status.

use chrono::{DateTime, Duration, Utc};

use crate::domain::{Order, OrderStatus};
use super::error::OrderError;

/// Inputs a transition may stamp onto the order.
#[derive(Debug, Clone)]
pub struct TransitionStamp {
    pub at: DateTime<Utc>,
    pub delivery_eta: Duration,
    /// Required when the transition hands the order to a driver.
    pub driver_id: Option<String>,
}

impl Order {
    /// Moves the order to `target` if the transition table allows it.
    ///
    /// Entering `delivering` sets the estimated delivery; entering `completed`
    /// sets the actual delivery. Returns the status the order left.
    pub fn transition(&mut self, target: OrderStatus, stamp: TransitionStamp) -> Result<OrderStatus, OrderError> {
        let previous = self.status;
        if !previous.can_transition_to(target) {
            return Err(OrderError::InvalidTransition { from: previous, to: target });
        }

        let estimated_delivery = match target {
            OrderStatus::Delivering => Some(
                stamp
                    .at
                    .checked_add_signed(stamp.delivery_eta)
                    .ok_or_else(|| OrderError::ValidationError("Estimated delivery time is out of range".to_string()))?,
            ),
            _ => None,
        };

        match target {
            OrderStatus::Delivering => {
                self.estimated_delivery = estimated_delivery;
                if let Some(driver_id) = stamp.driver_id {
                    self.driver_id = Some(driver_id);
                    self.driver_assigned_at = Some(stamp.at);
                }
            }
            OrderStatus::Completed => self.actual_delivery = Some(stamp.at),
            _ => {}
        }

        self.status = target;
        self.updated_at = stamp.at;
        Ok(previous)
    }

    /// Assigns a driver to a `ready` order through the `ready -> delivering` transition.
    pub fn assign_driver(
        &mut self,
        driver_id: String,
        at: DateTime<Utc>,
        delivery_eta: Duration,
    ) -> Result<OrderStatus, OrderError> {
        if self.status != OrderStatus::Ready {
            return Err(OrderError::InvalidState {
                order_id: self.id.clone(),
                status: self.status,
                expected: OrderStatus::Ready,
            });
        }
        if driver_id.trim().is_empty() {
            return Err(OrderError::ValidationError("Driver ID is required".to_string()));
        }
        self.transition(
            OrderStatus::Delivering,
            TransitionStamp { at, delivery_eta, driver_id: Some(driver_id) },
        )
    }
}
