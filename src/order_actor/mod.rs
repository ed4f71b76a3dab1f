//! Order-specific domain logic: lifecycle transitions, errors and aggregate stats.

mod actions;
pub mod entity;
pub mod error;
pub mod lifecycle;
pub mod stats;

pub use actions::*;
pub use error::*;
pub use lifecycle::TransitionStamp;
pub use stats::*;
