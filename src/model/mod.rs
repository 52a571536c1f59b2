//! Rows, aggregates and request/response DTOs.

pub mod order;
pub mod product;
pub mod query;
pub mod user;

pub use order::*;
pub use product::*;
pub use query::*;
pub use user::*;
