//! # Orders
//!
//! The core of the engine: [`OrderService`] turns requests into orders, drives
//! the status [`transition`] rules and restores stock on cancellation and
//! deletion; [`OrderRepository`] commits each of those as a single transaction.

pub mod error;
pub mod repository;
pub mod service;
pub mod transition;

pub use error::{ErrorKind, OrderError};
pub use repository::OrderRepository;
pub use service::OrderService;
pub use transition::{plan_transition, StockEffect};
