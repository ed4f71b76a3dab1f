//! User directory: registration and participant profile summaries.

pub mod entity;
pub mod error;

pub use error::*;
