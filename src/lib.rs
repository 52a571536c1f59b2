//! # Order Engine
//!
//! > **Orders and inventory that stay consistent under concurrent load.**
//!
//! This crate turns order requests into durable multi-item orders while keeping
//! product stock exact: concurrent orders never oversell, a failed order leaves
//! no trace, and status changes follow a one-way lifecycle in which cancelling
//! returns stock.
//!
//! ## Design
//!
//! ### One owner for all state
//! Products, orders and line items live in one store owned by a single Tokio
//! actor. Requests are closures sent over a channel and executed one at a time,
//! so every transaction is serializable without locks in the services.
//!
//! ### Units of work
//! A transaction stages its writes in a [`UnitOfWork`](store::UnitOfWork) and
//! commits them only on success. Stock changes are packaged as
//! [`StockMutation`](product::StockMutation)s that the order repository runs
//! inside the same unit as the order rows.
//!
//! ### Typed errors
//! Each component has its own `thiserror` enum; [`OrderError`](order::OrderError)
//! also classifies itself for whatever adapter sits in front of the engine.
//!
//! ## Module Tour
//!
//! ### 1. The Engine ([`framework`])
//! The generic store actor, its client, request contexts and table staging.
//!
//! ### 2. The Store ([`store`])
//! The engine's relations and the unit of work spanning them.
//!
//! ### 3. The Domain ([`model`], [`product`], [`order`])
//! Data types, the product collaborator with its stock ledger, and the order
//! repository and service.
//!
//! ### 4. The Orchestrator ([`lifecycle`])
//! Configuration, tracing setup and the [`OrderSystem`](lifecycle::OrderSystem).
//!
//! ## Quick Start
//!
//! ```bash
//! RUST_LOG=info cargo run
//! cargo test
//! ```

pub mod framework;
pub mod lifecycle;
pub mod model;
pub mod order;
pub mod product;
pub mod store;
