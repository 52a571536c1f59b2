//! # Mock Store & Testing Helpers
//!
//! Two ways to test code that talks to a [`StoreClient`] without a real actor:
//!
//! | Helper | Use it when |
//! |---|---|
//! | [`create_mock_client`] + [`expect_read`] / [`expect_transaction`] | you want to step through the mailbox by hand |
//! | [`MockStore`] | you want scripted answers, including injected failures |
//!
//! Jobs are type-erased, so a mock cannot invent a reply of the right type. It can
//! run the job against a fixture state, or drop it unanswered, which is exactly
//! what a crashed store looks like to the caller (`FrameworkError::ActorDropped`).
//!
//! ```rust
//! use order_engine::framework::mock::MockStore;
//! use order_engine::framework::{FrameworkError, RequestContext, TxOutcome};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockStore::new(10_i64);
//!     mock.expect_transaction().return_dropped();
//!     mock.expect_read().run();
//!     let client = mock.client();
//!     let ctx = RequestContext::new();
//!
//!     let crashed = client
//!         .transaction(&ctx, "debit", |n: &mut i64| { *n -= 1; ((), TxOutcome::Committed) })
//!         .await;
//!     assert_eq!(crashed, Err(FrameworkError::ActorDropped));
//!     assert_eq!(client.read(&ctx, "get", |n| *n).await, Ok(10));
//!
//!     mock.verify();
//! }
//! ```

use crate::framework::client::StoreClient;
use crate::framework::message::{ReadJob, StoreRequest, TxJob, TxOutcome};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

/// Creates a client whose mailbox is handed straight to the test.
pub fn create_mock_client<S: Send + 'static>(
    buffer_size: usize,
) -> (StoreClient<S>, mpsc::Receiver<StoreRequest<S>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (StoreClient::new(sender), receiver)
}

/// Waits for the next request and returns it if it is a read.
pub async fn expect_read<S>(receiver: &mut mpsc::Receiver<StoreRequest<S>>) -> Option<(&'static str, ReadJob<S>)> {
    match receiver.recv().await {
        Some(StoreRequest::Read { op, job }) => Some((op, job)),
        _ => None,
    }
}

/// Waits for the next request and returns it if it is a transaction.
pub async fn expect_transaction<S>(
    receiver: &mut mpsc::Receiver<StoreRequest<S>>,
) -> Option<(&'static str, TxJob<S>)> {
    match receiver.recv().await {
        Some(StoreRequest::Transaction { op, job }) => Some((op, job)),
        _ => None,
    }
}

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Read,
    Transaction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reply {
    Run,
    Drop,
}

#[derive(Debug)]
struct Expectation {
    kind: Kind,
    op: Option<&'static str>,
    reply: Reply,
}

/// A store stand-in that answers requests from a queue of expectations.
///
/// Requests are matched in order. A request that does not match the next
/// expectation, or that arrives when none is left, is dropped unanswered and
/// recorded; the caller sees `ActorDropped` and [`MockStore::verify`] fails.
pub struct MockStore<S> {
    client: StoreClient<S>,
    state: Arc<Mutex<S>>,
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
    failures: Arc<Mutex<Vec<String>>>,
}

impl<S: Send + 'static> MockStore<S> {
    /// Spawns the mock on the current runtime with `state` as its fixture.
    pub fn new(state: S) -> Self {
        let (client, mut receiver) = create_mock_client::<S>(32);
        let state = Arc::new(Mutex::new(state));
        let expectations: Arc<Mutex<VecDeque<Expectation>>> = Arc::new(Mutex::new(VecDeque::new()));
        let failures: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

        let task_state = state.clone();
        let task_expectations = expectations.clone();
        let task_failures = failures.clone();
        tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let next = lock(&task_expectations).pop_front();
                let op = request.op();
                match (request, next) {
                    (StoreRequest::Read { job, .. }, Some(exp)) if exp.matches(Kind::Read, op) => {
                        if exp.reply == Reply::Run {
                            let state = lock(&task_state);
                            job(&*state);
                        }
                    }
                    (StoreRequest::Transaction { job, .. }, Some(exp))
                        if exp.matches(Kind::Transaction, op) =>
                    {
                        if exp.reply == Reply::Run {
                            let mut state = lock(&task_state);
                            let _: TxOutcome = job(&mut *state);
                        }
                    }
                    (request, expected) => {
                        lock(&task_failures).push(format!(
                            "unexpected request {:?}, expected {:?}",
                            request, expected
                        ));
                    }
                }
            }
        });

        Self {
            client,
            state,
            expectations,
            failures,
        }
    }

    pub fn client(&self) -> StoreClient<S> {
        self.client.clone()
    }

    pub fn expect_read(&mut self) -> ExpectationBuilder<'_> {
        ExpectationBuilder {
            queue: &self.expectations,
            kind: Kind::Read,
            op: None,
        }
    }

    pub fn expect_transaction(&mut self) -> ExpectationBuilder<'_> {
        ExpectationBuilder {
            queue: &self.expectations,
            kind: Kind::Transaction,
            op: None,
        }
    }

    /// The fixture state, as left by every job the mock has run.
    pub fn state(&self) -> MutexGuard<'_, S> {
        lock(&self.state)
    }

    /// Panics if an expectation is still pending or a request was unexpected.
    pub fn verify(&self) {
        let failures = lock(&self.failures);
        assert!(failures.is_empty(), "mock store failures: {:?}", *failures);
        let pending = lock(&self.expectations);
        assert!(pending.is_empty(), "unmet expectations: {:?}", *pending);
    }
}

impl Expectation {
    fn matches(&self, kind: Kind, op: &'static str) -> bool {
        self.kind == kind && self.op.map_or(true, |expected| expected == op)
    }
}

pub struct ExpectationBuilder<'a> {
    queue: &'a Arc<Mutex<VecDeque<Expectation>>>,
    kind: Kind,
    op: Option<&'static str>,
}

impl ExpectationBuilder<'_> {
    /// Only match a request issued under this operation name.
    pub fn with_op(mut self, op: &'static str) -> Self {
        self.op = Some(op);
        self
    }

    /// Execute the job against the fixture state.
    pub fn run(self) {
        self.push(Reply::Run);
    }

    /// Drop the job without running it, as a crashed store would.
    pub fn return_dropped(self) {
        self.push(Reply::Drop);
    }

    fn push(self, reply: Reply) {
        lock(self.queue).push_back(Expectation {
            kind: self.kind,
            op: self.op,
            reply,
        });
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
