//! # Store Client
//!
//! `StoreClient<S>` is the cheap, cloneable handle to a [`StoreActor`](crate::framework::StoreActor).
//! It wraps a caller's closure into a job, queues it and awaits the reply.

use crate::framework::context::RequestContext;
use crate::framework::error::FrameworkError;
use crate::framework::message::{ReadJob, Response, StoreRequest, TxJob, TxOutcome};
use tokio::sync::{mpsc, oneshot};

pub struct StoreClient<S> {
    sender: mpsc::Sender<StoreRequest<S>>,
}

impl<S> Clone for StoreClient<S> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<S: Send + 'static> StoreClient<S> {
    pub fn new(sender: mpsc::Sender<StoreRequest<S>>) -> Self {
        Self { sender }
    }

    /// Runs `f` against a consistent snapshot of the state.
    pub async fn read<R, F>(&self, ctx: &RequestContext, op: &'static str, f: F) -> Result<R, FrameworkError>
    where
        R: Send + 'static,
        F: FnOnce(&S) -> R + Send + 'static,
    {
        ctx.check()?;
        let (respond_to, response): (Response<R>, _) = oneshot::channel();
        let job: ReadJob<S> = Box::new(move |state: &S| {
            let _ = respond_to.send(Ok(f(state)));
        });
        self.sender
            .send(StoreRequest::Read { op, job })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    /// Runs `f` with exclusive access to the state.
    ///
    /// The context is checked once here and once more when the actor picks the job
    /// up; if it has been cancelled or has expired by then, `f` never runs.
    pub async fn transaction<R, F>(
        &self,
        ctx: &RequestContext,
        op: &'static str,
        f: F,
    ) -> Result<R, FrameworkError>
    where
        R: Send + 'static,
        F: FnOnce(&mut S) -> (R, TxOutcome) + Send + 'static,
    {
        ctx.check()?;
        let ctx = ctx.clone();
        let (respond_to, response): (Response<R>, _) = oneshot::channel();
        let job: TxJob<S> = Box::new(move |state: &mut S| {
            if let Err(e) = ctx.check() {
                let _ = respond_to.send(Err(e));
                return TxOutcome::Aborted;
            }
            let (result, outcome) = f(state);
            let _ = respond_to.send(Ok(result));
            outcome
        });
        self.sender
            .send(StoreRequest::Transaction { op, job })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }
}
