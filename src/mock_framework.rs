//! # Mock Framework
//!
//! Utilities for testing clients in isolation.
//!
//! Use [`create_mock_client`] to get a client and a receiver.
//! Then use helpers like [`expect_get`] or [`expect_transact`] to assert behavior.
//! Fixture builders for orders and a recording [`Publisher`] live here too.

use std::sync::Mutex;

use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::mpsc;

use crate::actor_framework::{Entity, ResourceClient, ResourceRequest, Response};
use crate::domain::{Destination, LocalizedName, Order, OrderCreate, OrderItem, PaymentMethod, PickupLocation};
use crate::notifications::{Notification, OrderEvent, PublishError, Publisher, Topic};

/// Creates a mock client and a receiver for asserting requests.
///
/// # Testing Strategy
/// Instead of spinning up a `ResourceActor`, the client sends to a channel the
/// test controls. The test inspects each request and answers it, simulating
/// success or failure deterministically.
pub fn create_mock_client<T: Entity>(buffer_size: usize) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Create request
pub async fn expect_create<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::CreateParams, Response<T::Id, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Get request
pub async fn expect_get<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, Response<Option<T>, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Action request
pub async fn expect_action<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Action, Response<T::ActionResult, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action { id, action, respond_to }) => Some((id, action, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Transact request
pub async fn expect_transact<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(Vec<(T::Id, T::Action)>, Response<Vec<T::ActionResult>, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Transact { actions, respond_to }) => Some((actions, respond_to)),
        _ => None,
    }
}

/// 3 x 10 of `product_1` and 1 x 5 of `product_2`, standard or urgent fee.
pub fn sample_create(is_urgent: bool) -> OrderCreate {
    OrderCreate {
        passenger_id: "p1".to_string(),
        vendor_id: "v1".to_string(),
        items: vec![
            OrderItem {
                product_id: "product_1".to_string(),
                product_name: LocalizedName::new("Bread", "Bohobe"),
                quantity: 3,
                price: Decimal::from(10),
            },
            OrderItem {
                product_id: "product_2".to_string(),
                product_name: LocalizedName::new("Milk", "Lebese"),
                quantity: 1,
                price: Decimal::from(5),
            },
        ],
        delivery_fee: if is_urgent { Decimal::from(25) } else { Decimal::from(15) },
        is_urgent,
        pickup_location: PickupLocation::at("Pioneer Mall, Maseru"),
        destination: Destination::at("Ha Abia"),
        notes: None,
        payment_method: PaymentMethod::Cash,
        created_at: Utc::now(),
    }
}

/// A freshly placed `pending` order between `passenger` and `vendor`.
pub fn sample_order(id: &str, passenger: &str, vendor: &str) -> Order {
    let mut params = sample_create(false);
    params.passenger_id = passenger.to_string();
    params.vendor_id = vendor.to_string();
    Order::from_create_params(id.to_string(), params).expect("sample order is valid")
}

/// Keeps every published event for later assertions.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<Notification>>,
}

impl RecordingPublisher {
    pub fn events(&self) -> Vec<Notification> {
        self.events.lock().unwrap().clone()
    }

    pub fn events_for(&self, event: OrderEvent) -> Vec<Notification> {
        self.events().into_iter().filter(|n| n.event == event).collect()
    }
}

impl Publisher for RecordingPublisher {
    fn publish(&self, topic: &Topic, event: OrderEvent, payload: serde_json::Value) -> Result<(), PublishError> {
        self.events.lock().unwrap().push(Notification {
            topic: topic.to_string(),
            event,
            payload,
        });
        Ok(())
    }
}

/// Rejects every event, for checking that publish failures never fail an operation.
#[derive(Debug, Default)]
pub struct FailingPublisher;

impl Publisher for FailingPublisher {
    fn publish(&self, _topic: &Topic, _event: OrderEvent, _payload: serde_json::Value) -> Result<(), PublishError> {
        Err(PublishError::Transport("subscriber transport down".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Role, User, UserCreate};

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client::<User>(10);

        let create_task = tokio::spawn(async move {
            client.create(UserCreate::new(Role::Passenger, "Thabo", "Mokoena")).await
        });

        let (payload, responder) = expect_create(&mut receiver).await.expect("Expected Create request");
        assert_eq!(payload.profile.first_name, "Thabo");
        responder.send(Ok("user_1".to_string())).unwrap();

        let result = create_task.await.unwrap();
        assert_eq!(result, Ok("user_1".to_string()));
    }

    #[test]
    fn test_sample_order_totals() {
        let order = sample_order("order_1", "p1", "v1");
        assert_eq!(order.total_amount, Decimal::from(50));
        assert_eq!(order.passenger_id, "p1");
    }
}
