//! Fire-and-forget fan-out of order lifecycle events to topic subscribers.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::broadcast;

/// Channel an event is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    Vendor(String),
    Order(String),
    Driver(String),
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::Vendor(id) => write!(f, "vendor_{}", id),
            Topic::Order(id) => write!(f, "order_{}", id),
            Topic::Driver(id) => write!(f, "driver_{}", id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderEvent {
    NewOrder,
    OrderUpdated,
    DeliveryAssigned,
}

impl OrderEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderEvent::NewOrder => "new_order",
            OrderEvent::OrderUpdated => "order_updated",
            OrderEvent::DeliveryAssigned => "delivery_assigned",
        }
    }
}

impl fmt::Display for OrderEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A published event as seen by subscribers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub topic: String,
    pub event: OrderEvent,
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PublishError {
    #[error("Payload serialization failed: {0}")]
    Serialization(String),
    #[error("Transport rejected event: {0}")]
    Transport(String),
}

/// Publishing capability injected into the order client.
///
/// Implementations must not block; delivery is best-effort.
pub trait Publisher: Send + Sync {
    fn publish(&self, topic: &Topic, event: OrderEvent, payload: serde_json::Value) -> Result<(), PublishError>;
}

/// Discards every event. Valid when no subscriber transport is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPublisher;

impl Publisher for NoopPublisher {
    fn publish(&self, _topic: &Topic, _event: OrderEvent, _payload: serde_json::Value) -> Result<(), PublishError> {
        Ok(())
    }
}

/// In-process fan-out over a tokio broadcast channel; subscribers filter by topic.
#[derive(Debug, Clone)]
pub struct BroadcastPublisher {
    tx: broadcast::Sender<Notification>,
}

impl BroadcastPublisher {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }
}

impl Publisher for BroadcastPublisher {
    fn publish(&self, topic: &Topic, event: OrderEvent, payload: serde_json::Value) -> Result<(), PublishError> {
        // send only fails when nobody is subscribed, which is not an error for fan-out
        let _ = self.tx.send(Notification {
            topic: topic.to_string(),
            event,
            payload,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_names() {
        assert_eq!(Topic::Vendor("user_2".into()).to_string(), "vendor_user_2");
        assert_eq!(Topic::Order("order_9".into()).to_string(), "order_order_9");
        assert_eq!(Topic::Driver("user_3".into()).to_string(), "driver_user_3");
    }

    #[tokio::test]
    async fn test_broadcast_reaches_subscribers() {
        let publisher = BroadcastPublisher::new(8);
        let mut rx = publisher.subscribe();

        publisher
            .publish(&Topic::Order("order_1".into()), OrderEvent::OrderUpdated, serde_json::json!({"id": "order_1"}))
            .unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.topic, "order_order_1");
        assert_eq!(received.event, OrderEvent::OrderUpdated);
        assert_eq!(received.payload["id"], "order_1");
    }

    #[test]
    fn test_publish_without_subscribers_is_ok() {
        let publisher = BroadcastPublisher::new(8);
        let result = publisher.publish(&Topic::Vendor("v".into()), OrderEvent::NewOrder, serde_json::Value::Null);
        assert_eq!(result, Ok(()));
    }
}
