//! Order lifecycle engine for a delivery marketplace.
//!
//! Users, the product catalog and orders each live in a [`actor_framework::ResourceActor`];
//! [`clients::OrderClient`] drives an order from placement to delivery on top of them.

pub mod actor_framework;
pub mod app_system;
pub mod clients;
pub mod domain;
pub mod guard;
pub mod notifications;
pub mod order_actor;
pub mod product_actor;
pub mod user_actor;

#[cfg(test)]
mod mock_framework;
