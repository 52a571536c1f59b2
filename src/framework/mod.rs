//! Generic single-owner store built on a Tokio actor.
//!
//! # Main Components
//!
//! - [`StoreActor`] - owns the state and runs requests one at a time
//! - [`StoreClient`] - cloneable handle that sends read and transaction jobs
//! - [`Record`] / [`Table`] / [`TableTx`] - relations with staged, all-or-nothing writes
//! - [`RequestContext`] - cancellation and deadline carried by every call
//! - [`FrameworkError`] - plumbing failures
//!
//! # Testing
//!
//! See [`mock`] for a scripted store and channel-level helpers.

pub mod actor;
pub mod client;
pub mod context;
pub mod error;
pub mod message;
pub mod mock;
pub mod record;

pub use actor::StoreActor;
pub use client::StoreClient;
pub use context::RequestContext;
pub use error::FrameworkError;
pub use message::{ReadJob, Response, StoreRequest, TxJob, TxOutcome};
pub use record::{Record, Table, TableTx, TableWrites};
