//! # Store Actor
//!
//! `StoreActor<S>` is the server half of the store. It owns the state `S` and the
//! receiving end of the mailbox, and executes requests strictly one at a time.
//! Because no two jobs ever run concurrently, every transaction is serializable
//! against every other one without any `Mutex` or `RwLock` around the state.
//!
//! The canonical way to wire it:
//!
//! 1. **Create**: `StoreActor::new(buffer, state)` returns the actor and a client.
//! 2. **Run**: spawn `actor.run()` on the runtime.
//! 3. **Use**: clone the client into whatever needs storage.
//!
//! ```rust
//! use order_engine::framework::{RequestContext, StoreActor, TxOutcome};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, client) = StoreActor::new(8, 0_i64);
//!     let handle = tokio::spawn(actor.run());
//!     let ctx = RequestContext::new();
//!
//!     let value = client
//!         .transaction(&ctx, "increment", |n: &mut i64| {
//!             *n += 1;
//!             (*n, TxOutcome::Committed)
//!         })
//!         .await
//!         .unwrap();
//!     assert_eq!(value, 1);
//!
//!     drop(client);
//!     handle.await.unwrap();
//! }
//! ```

use crate::framework::client::StoreClient;
use crate::framework::message::{StoreRequest, TxOutcome};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub struct StoreActor<S> {
    receiver: mpsc::Receiver<StoreRequest<S>>,
    state: S,
}

impl<S: Send + 'static> StoreActor<S> {
    /// Creates the actor around `state` and a client bound to its mailbox.
    ///
    /// `buffer_size` is the mailbox capacity; callers wait for space when it is full.
    pub fn new(buffer_size: usize, state: S) -> (Self, StoreClient<S>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self { receiver, state };
        (actor, StoreClient::new(sender))
    }

    /// Runs the event loop until every client has been dropped.
    pub async fn run(mut self) {
        let store = std::any::type_name::<S>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(store, "Store started");

        let mut committed: u64 = 0;
        let mut rolled_back: u64 = 0;

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::Read { op, job } => {
                    debug!(store, op, "Read");
                    job(&self.state);
                }
                StoreRequest::Transaction { op, job } => {
                    debug!(store, op, "Begin");
                    match job(&mut self.state) {
                        TxOutcome::Committed => {
                            committed += 1;
                            info!(store, op, "Committed");
                        }
                        TxOutcome::RolledBack => {
                            rolled_back += 1;
                            warn!(store, op, "Rolled back");
                        }
                        TxOutcome::Aborted => {
                            warn!(store, op, "Aborted before begin");
                        }
                    }
                }
            }
        }

        info!(store, committed, rolled_back, "Shutdown");
    }
}
