//! Product-specific domain logic, including stock reservation and restoration.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;
