//! Bounded request/response hand-off to the main context.
//!
//! A packet worker submits a closure and waits for the answer with a
//! deadline. The host drives [`MainThreadQueue`] on its serial context,
//! either by draining it every tick ([`MainThreadQueue::run_pending`]) or by
//! parking a dedicated context on [`MainThreadQueue::serve`]. A query that
//! misses its deadline is abandoned: if the queue runs it later, the answer
//! is discarded because the waiting side is gone.

use crate::error::CheckError;
use crate::world::WorldAccess;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

type WorldJob = Box<dyn FnOnce(&dyn WorldAccess) + Send>;

/// Worker-side handle for submitting world queries.
#[derive(Clone)]
pub struct MainThreadGate {
    tx: mpsc::UnboundedSender<WorldJob>,
}

impl MainThreadGate {
    /// Runs `query` against live world state on the main context and waits
    /// for the result, at most until `deadline` elapses.
    ///
    /// # Errors
    ///
    /// [`CheckError::WorldQueryTimedOut`] when the deadline elapses first,
    /// [`CheckError::WorldQueryFailed`] when the main context is gone.
    pub async fn query<T, F>(&self, deadline: Duration, query: F) -> Result<T, CheckError>
    where
        F: FnOnce(&dyn WorldAccess) -> T + Send + 'static,
        T: Send + 'static,
    {
        let (result_tx, result_rx) = oneshot::channel();
        let job: WorldJob = Box::new(move |world| {
            // The receiver may have timed out already; that is fine.
            let _ = result_tx.send(query(world));
        });
        self.tx
            .send(job)
            .map_err(|_| CheckError::WorldQueryFailed("main context queue closed"))?;

        match tokio::time::timeout(deadline, result_rx).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(_)) => Err(CheckError::WorldQueryFailed("query dropped unanswered")),
            Err(_) => Err(CheckError::WorldQueryTimedOut(deadline)),
        }
    }
}

/// Host-side end of the gate. Must only be driven on the context the host
/// designates for world reads.
pub struct MainThreadQueue {
    rx: mpsc::UnboundedReceiver<WorldJob>,
    world: Arc<dyn WorldAccess>,
}

impl MainThreadQueue {
    /// Runs every query submitted so far and returns how many ran.
    /// Intended to be called once per tick.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            job(&*self.world);
            ran += 1;
        }
        ran
    }

    /// Serves queries until every [`MainThreadGate`] clone is dropped.
    /// For hosts that dedicate a context to world reads.
    pub async fn serve(mut self) {
        while let Some(job) = self.rx.recv().await {
            job(&*self.world);
        }
    }
}

/// Creates a connected gate/queue pair around the host's world.
#[must_use]
pub fn main_thread_channel(world: Arc<dyn WorldAccess>) -> (MainThreadGate, MainThreadQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (MainThreadGate { tx }, MainThreadQueue { rx, world })
}
