use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::product::LocalizedName;
use super::user::UserSummary;

/// Lifecycle state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Delivering,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown order status: {0}")]
pub struct ParseStatusError(pub String);

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Delivering,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    /// The transition table: states reachable in one step from `self`.
    pub fn allowed_next(self) -> &'static [OrderStatus] {
        use OrderStatus::*;
        match self {
            Pending => &[Confirmed, Cancelled],
            Confirmed => &[Preparing, Cancelled],
            Preparing => &[Ready, Cancelled],
            Ready => &[Delivering],
            Delivering => &[Completed],
            Completed | Cancelled => &[],
        }
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        self.allowed_next().contains(&next)
    }

    pub fn is_terminal(self) -> bool {
        self.allowed_next().is_empty()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Delivering => "delivering",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

/// One product line, snapshotted from the catalog when the order is placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: String,
    pub product_name: LocalizedName,
    pub quantity: u32,
    pub price: Decimal,
}

impl OrderItem {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupLocation {
    pub address: String,
    pub coordinates: Option<Coordinates>,
    pub vendor_name: Option<String>,
    pub vendor_phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub address: String,
    pub coordinates: Option<Coordinates>,
    pub instructions: Option<String>,
    pub passenger_name: Option<String>,
    pub passenger_phone: Option<String>,
}

impl PickupLocation {
    pub fn at(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            coordinates: None,
            vendor_name: None,
            vendor_phone: None,
        }
    }
}

impl Destination {
    pub fn at(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            coordinates: None,
            instructions: None,
            passenger_name: None,
            passenger_phone: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Mpesa,
    Ecocash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
    Refunded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub amount: Decimal,
    pub transaction_id: Option<String>,
    pub phone_number: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
}

/// A passenger's order from a single vendor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub passenger_id: String,
    pub vendor_id: String,
    pub driver_id: Option<String>,
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub delivery_fee: Decimal,
    pub is_urgent: bool,
    pub pickup_location: PickupLocation,
    pub destination: Destination,
    pub payment: Payment,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub actual_delivery: Option<DateTime<Utc>>,
    pub driver_assigned_at: Option<DateTime<Utc>>,
}

/// Payload for persisting a new order; built by the order client after reservation.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub passenger_id: String,
    pub vendor_id: String,
    pub items: Vec<OrderItem>,
    pub delivery_fee: Decimal,
    pub is_urgent: bool,
    pub pickup_location: PickupLocation,
    pub destination: Destination,
    pub notes: Option<String>,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn items_total(&self) -> Decimal {
        self.items.iter().map(OrderItem::line_total).sum()
    }

    /// Replaces the line items and re-derives the total and the payment amount.
    pub fn set_items(&mut self, items: Vec<OrderItem>) {
        self.items = items;
        self.total_amount = self.items_total() + self.delivery_fee;
        self.payment.amount = self.total_amount;
    }

    pub fn is_participant(&self, user_id: &str) -> bool {
        self.passenger_id == user_id
            || self.vendor_id == user_id
            || self.driver_id.as_deref() == Some(user_id)
    }
}

/// An order together with the profile summaries of its participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub passenger: Option<UserSummary>,
    pub vendor: Option<UserSummary>,
    pub driver: Option<UserSummary>,
}
