use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;

const DEFAULT_DELIVERY_ETA_MINUTES: i64 = 30;
/// One week.
const MAX_DELIVERY_ETA_MINUTES: i64 = 7 * 24 * 60;

/// Engine configuration, read from the environment with defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub standard_delivery_fee: Decimal,
    pub urgent_delivery_fee: Decimal,
    pub delivery_eta_minutes: i64,
    pub request_timeout_ms: u64,
    pub channel_buffer: usize,
    pub event_capacity: usize,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let defaults = Self::defaults();
        Self {
            standard_delivery_fee: env_or("ORDER_STANDARD_DELIVERY_FEE", defaults.standard_delivery_fee),
            urgent_delivery_fee: env_or("ORDER_URGENT_DELIVERY_FEE", defaults.urgent_delivery_fee),
            delivery_eta_minutes: Some(env_or("ORDER_DELIVERY_ETA_MINUTES", defaults.delivery_eta_minutes))
                .filter(|minutes| (0..=MAX_DELIVERY_ETA_MINUTES).contains(minutes))
                .unwrap_or(defaults.delivery_eta_minutes),
            request_timeout_ms: env_or("ORDER_REQUEST_TIMEOUT_MS", defaults.request_timeout_ms),
            channel_buffer: env_or("ORDER_CHANNEL_BUFFER", defaults.channel_buffer),
            event_capacity: env_or("ORDER_EVENT_CAPACITY", defaults.event_capacity),
        }
    }

    /// Built-in values, independent of the environment.
    pub fn defaults() -> Self {
        Self {
            standard_delivery_fee: Decimal::from(15),
            urgent_delivery_fee: Decimal::from(25),
            delivery_eta_minutes: DEFAULT_DELIVERY_ETA_MINUTES,
            request_timeout_ms: 5000,
            channel_buffer: 100,
            event_capacity: 256,
        }
    }

    pub fn delivery_fee(&self, is_urgent: bool) -> Decimal {
        if is_urgent {
            self.urgent_delivery_fee
        } else {
            self.standard_delivery_fee
        }
    }

    /// Falls back to the default ETA when `delivery_eta_minutes` is out of range.
    pub fn delivery_eta(&self) -> chrono::Duration {
        let minutes = if (0..=MAX_DELIVERY_ETA_MINUTES).contains(&self.delivery_eta_minutes) {
            self.delivery_eta_minutes
        } else {
            DEFAULT_DELIVERY_ETA_MINUTES
        };
        chrono::Duration::minutes(minutes)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
