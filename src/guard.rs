//! Authorization predicates over order participants.
//!
//! Everything here is a pure function of the principal and the order; the
//! order client and the order entity call these before touching state.

use crate::domain::{Order, Principal, Role};
use crate::order_actor::OrderError;

/// Which orders a "my orders" listing may return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListScope {
    Passenger(String),
    Vendor(String),
    Driver(String),
    All,
}

impl ListScope {
    pub fn includes(&self, order: &Order) -> bool {
        match self {
            ListScope::Passenger(id) => order.passenger_id == *id,
            ListScope::Vendor(id) => order.vendor_id == *id,
            ListScope::Driver(id) => order.driver_id.as_deref() == Some(id.as_str()),
            ListScope::All => true,
        }
    }
}

pub fn authenticate(principal: Option<&Principal>) -> Result<&Principal, OrderError> {
    principal.ok_or(OrderError::Unauthenticated)
}

pub fn can_view(principal: &Principal, order: &Order) -> bool {
    principal.is_admin() || order.is_participant(&principal.id)
}

pub fn can_update_status(principal: &Principal, order: &Order) -> bool {
    principal.is_admin()
        || order.vendor_id == principal.id
        || order.driver_id.as_deref() == Some(principal.id.as_str())
}

pub fn can_assign_driver(principal: &Principal, order: &Order) -> bool {
    principal.is_admin() || order.vendor_id == principal.id
}

pub fn can_create(principal: &Principal) -> bool {
    principal.role == Role::Passenger
}

pub fn list_scope(principal: &Principal) -> ListScope {
    match principal.role {
        Role::Passenger => ListScope::Passenger(principal.id.clone()),
        Role::Vendor => ListScope::Vendor(principal.id.clone()),
        Role::Driver => ListScope::Driver(principal.id.clone()),
        Role::Admin => ListScope::All,
    }
}

/// Turns a denied predicate into `Forbidden`.
pub fn ensure(allowed: bool, message: &str) -> Result<(), OrderError> {
    if allowed {
        Ok(())
    } else {
        Err(OrderError::Forbidden(message.to_string()))
    }
}

pub fn require_admin(principal: &Principal) -> Result<(), OrderError> {
    ensure(principal.is_admin(), "You do not have permission to perform this action")
}
