use rust_decimal::Decimal;

use crate::actor_framework::Entity;
use crate::domain::{Order, OrderCreate, OrderStatus, Payment, PaymentStatus};
use crate::guard;
use super::actions::{OrderAction, TransitionOutcome};
use super::error::OrderError;
use super::lifecycle::TransitionStamp;

impl Entity for Order {
    type Id = String;
    type CreateParams = OrderCreate;
    type Patch = (); // Orders change only through lifecycle actions
    type Action = OrderAction;
    type ActionResult = TransitionOutcome;
    type Error = OrderError;

    fn id(&self) -> &String {
        &self.id
    }

    /// Creates a new Order from creation parameters.
    ///
    /// # Notes
    /// The order starts `pending`; the total and payment amount are derived
    /// from the line items plus the delivery fee.
    fn from_create_params(id: String, params: OrderCreate) -> Result<Self, OrderError> {
        if params.items.is_empty() {
            return Err(OrderError::ValidationError("An order needs at least one item".to_string()));
        }
        if let Some(item) = params.items.iter().find(|item| item.quantity == 0) {
            return Err(OrderError::ValidationError(format!(
                "Quantity for product {} must be at least 1",
                item.product_id
            )));
        }
        if params.items.iter().any(|item| item.price < Decimal::ZERO) || params.delivery_fee < Decimal::ZERO {
            return Err(OrderError::ValidationError("Amounts cannot be negative".to_string()));
        }

        let mut order = Self {
            id,
            passenger_id: params.passenger_id,
            vendor_id: params.vendor_id,
            driver_id: None,
            items: Vec::new(),
            status: OrderStatus::Pending,
            total_amount: Decimal::ZERO,
            delivery_fee: params.delivery_fee,
            is_urgent: params.is_urgent,
            pickup_location: params.pickup_location,
            destination: params.destination,
            payment: Payment {
                method: params.payment_method,
                status: PaymentStatus::Pending,
                amount: Decimal::ZERO,
                transaction_id: None,
                phone_number: None,
                paid_at: None,
            },
            notes: params.notes,
            created_at: params.created_at,
            updated_at: params.created_at,
            estimated_delivery: None,
            actual_delivery: None,
            driver_assigned_at: None,
        };
        order.set_items(params.items);
        Ok(order)
    }

    fn on_update(&mut self, _patch: ()) -> Result<(), OrderError> {
        Ok(())
    }

    /// Orders are kept as audit records.
    fn on_delete(&self) -> Result<(), OrderError> {
        Err(OrderError::Forbidden("Orders are retained and cannot be deleted".to_string()))
    }

    /// Handles lifecycle actions: authorize, validate, mutate, all under the actor's exclusive access.
    fn handle_action(&mut self, action: OrderAction) -> Result<TransitionOutcome, OrderError> {
        let previous = match action {
            OrderAction::Transition { requested_by, target, at, delivery_eta } => {
                guard::ensure(
                    guard::can_update_status(&requested_by, self),
                    "You are not authorized to update this order",
                )?;
                self.transition(target, TransitionStamp { at, delivery_eta, driver_id: None })?
            }
            OrderAction::AssignDriver { requested_by, driver_id, at, delivery_eta } => {
                guard::ensure(
                    guard::can_assign_driver(&requested_by, self),
                    "You are not authorized to assign a driver to this order",
                )?;
                self.assign_driver(driver_id, at, delivery_eta)?
            }
        };
        Ok(TransitionOutcome { previous, order: self.clone() })
    }
}
