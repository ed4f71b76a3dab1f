pub mod user;
pub mod product;
pub mod order;
pub mod requests;

pub use user::*;
pub use product::*;
pub use order::*;
pub use requests::*;
