use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::domain::OrderStatus;
use crate::product_actor::ProductError;

/// Errors that can occur during order operations.
///
/// Every variant is recoverable at the caller boundary and names the resource involved.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("No {resource} found with ID {id}")]
    NotFound { resource: &'static str, id: String },
    #[error("Product {product_id} is unavailable: {reason}")]
    Unavailable { product_id: String, reason: String },
    #[error("Order validation error: {0}")]
    ValidationError(String),
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("Order {order_id} is {status}, expected {expected}")]
    InvalidState {
        order_id: String,
        status: OrderStatus,
        expected: OrderStatus,
    },
    #[error("You are not logged in")]
    Unauthenticated,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl OrderError {
    pub fn order_not_found(id: impl Into<String>) -> Self {
        OrderError::NotFound { resource: "order", id: id.into() }
    }

    pub fn product_not_found(id: impl Into<String>) -> Self {
        OrderError::NotFound { resource: "product", id: id.into() }
    }
}

impl From<FrameworkError<OrderError>> for OrderError {
    fn from(err: FrameworkError<OrderError>) -> Self {
        match err {
            FrameworkError::Rejected(e) => e,
            FrameworkError::NotFound(id) => OrderError::order_not_found(id),
            other => OrderError::ActorCommunicationError(other.to_string()),
        }
    }
}

impl From<ProductError> for OrderError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(id) => OrderError::product_not_found(id),
            ProductError::Unavailable { ref product_id, .. } => OrderError::Unavailable {
                product_id: product_id.clone(),
                reason: err.to_string(),
            },
            ProductError::InvalidQuantity(qty) => {
                OrderError::ValidationError(format!("Invalid quantity: {}", qty))
            }
            ProductError::ValidationError(msg) => OrderError::ValidationError(msg),
            ProductError::ActorCommunicationError(msg) => OrderError::ActorCommunicationError(msg),
        }
    }
}
