//! # Products
//!
//! The product collaborator of the order engine: catalog management through
//! [`ProductService`], the [`ProductCatalog`] read seam the order service depends
//! on, and the [`StockLedger`] that owns every order-driven stock change.

pub mod error;
pub mod ledger;
pub mod service;

pub use error::ProductError;
pub use ledger::{StockLedger, StockMutation};
pub use service::{ProductCatalog, ProductService};
