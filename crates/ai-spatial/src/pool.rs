//! Background path materialization on a worker pool.
//!
//! The incremental searches are cheap per tick but only answer "which
//! neighbour next".  When a caller needs a whole waypoint list up front (to
//! hand a zone-level search a concrete chain of connectors, or to preview a
//! route) it submits the query here and keeps ticking.
//!
//! Contract:
//!
//! - `submit` returns a [`PathTicket`] immediately.
//! - `is_ready` polls, `try_take` collects without blocking, `wait` blocks.
//! - There is no cancellation.  Dropping the ticket discards the result when
//!   the job finishes.
//! - There are no timeouts; giving up is the caller's policy.

use std::marker::PhantomData;
use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

use ai_core::MaterializerConfig;

use crate::{Graph, Route, Router, SpatialError, SpatialResult};

// ── PathTicket ────────────────────────────────────────────────────────────────

/// Handle to one in-flight materialization.
///
/// The result can be collected exactly once: `try_take` and `wait` consume
/// the ticket.  Neither needs an async runtime.
pub struct PathTicket<N> {
    reply: oneshot::Receiver<Option<Route<N>>>,
    /// Result pulled off the channel by an earlier poll.
    ready: Option<Option<Route<N>>>,
}

impl<N> PathTicket<N> {
    fn poll(&mut self) -> bool {
        if self.ready.is_some() {
            return true;
        }
        match self.reply.try_recv() {
            Ok(result) => {
                self.ready = Some(result);
                true
            }
            Err(TryRecvError::Empty) => false,
            // The worker died before replying.
            Err(TryRecvError::Closed) => {
                self.ready = Some(None);
                true
            }
        }
    }

    /// `true` once the worker has finished, whether or not a path exists.
    pub fn is_ready(&mut self) -> bool {
        self.poll()
    }

    /// Collect the result if it is ready; otherwise hand the ticket back.
    ///
    /// `Ok(None)` means the job finished and found no path.
    pub fn try_take(mut self) -> Result<Option<Route<N>>, PathTicket<N>> {
        if self.poll() { Ok(self.ready.take().flatten()) } else { Err(self) }
    }

    /// Block until the worker finishes and return its result.  Must not be
    /// called from inside an async runtime.
    pub fn wait(self) -> Option<Route<N>> {
        match self.ready {
            Some(result) => result,
            None => self.reply.blocking_recv().ok().flatten(),
        }
    }
}

// ── MaterializerPool ──────────────────────────────────────────────────────────

/// A Rayon thread pool running one-shot [`Router`] queries.
///
/// Graph snapshots are passed as `Arc<G>` so workers never observe an edit
/// in progress; the caller shares the same snapshot across many queries and
/// swaps in a new one after editing.
pub struct MaterializerPool<G, R> {
    pool:   rayon::ThreadPool,
    router: Arc<R>,
    _graph: PhantomData<fn(G)>,
}

impl<G, R> MaterializerPool<G, R>
where
    G: Graph + Send + Sync + 'static,
    G::Node: Send + 'static,
    R: Router<G> + 'static,
{
    pub fn new(router: R, config: &MaterializerConfig) -> SpatialResult<Self> {
        config.validate()?;
        // A panicking router drops its reply sender, so its ticket reads as
        // "no path".
        let mut builder = rayon::ThreadPoolBuilder::new()
            .thread_name(|i| format!("path-materializer-{i}"))
            .panic_handler(|_| tracing::error!("path materializer job panicked"));
        if let Some(n) = config.num_threads {
            builder = builder.num_threads(n);
        }
        let pool = builder.build().map_err(|e| SpatialError::Pool(e.to_string()))?;
        Ok(Self { pool, router: Arc::new(router), _graph: PhantomData })
    }

    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Queue a route query from `from` to `to` on `graph`.
    pub fn submit(&self, graph: Arc<G>, from: G::Node, to: G::Node) -> PathTicket<G::Node> {
        let (tx, reply) = oneshot::channel();
        let router = Arc::clone(&self.router);
        self.pool.spawn(move || {
            let result = router.route(&graph, from, to);
            tracing::trace!(
                ?from,
                ?to,
                found = result.is_some(),
                "path materialized"
            );
            if tx.send(result).is_err() {
                tracing::trace!(?from, ?to, "ticket dropped, route discarded");
            }
        });
        PathTicket { reply, ready: None }
    }
}
