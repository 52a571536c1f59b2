//! # System Lifecycle & Orchestration
//!
//! Starting, wiring and stopping the engine.
//!
//! - [`OrderSystem`] spawns the store actor and builds the services around it.
//! - [`SystemConfig`] reads the tunables from the environment.
//! - [`setup_tracing`] installs the log subscriber.
//!
//! ## Graceful Shutdown
//!
//! 1. **Drop all handles** - services hold the only senders of the store mailbox
//! 2. **Store detects closure** - `receiver.recv()` returns `None`
//! 3. **Store drains** - queued requests are still answered, then it logs its totals
//! 4. **Await completion** - [`OrderSystem::shutdown`] joins the actor task

pub mod config;
pub mod order_system;
pub mod tracing;

pub use config::*;
pub use order_system::*;
pub use self::tracing::*;
