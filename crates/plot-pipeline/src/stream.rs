use std::{
    sync::{Arc, Mutex, PoisonError, mpsc::Receiver},
    thread::{self, JoinHandle},
};

use log::warn;

use crate::{PipelineState, PlotEvent, PlotOutcome};

/// The results of one [`crate::PlotPipeline::render_all`] call, in the order the worker produced them
///
/// Iterating blocks until the next result is ready and ends once every connection has been handled. UI loops that
/// can't block should [`poll`](Self::poll) instead. Dropping the stream tells the worker to stop.
#[derive(Debug)]
pub struct PlotStream {
    events: Receiver<PlotEvent>,
    state: Arc<Mutex<PipelineState>>,
    worker: JoinHandle<()>,
}

impl PlotStream {
    pub(crate) fn new(
        events: Receiver<PlotEvent>,
        state: Arc<Mutex<PipelineState>>,
        worker: JoinHandle<()>,
    ) -> Self {
        Self {
            events,
            state,
            worker,
        }
    }

    /// The next event, if the worker has already sent one
    #[must_use]
    pub fn poll(&self) -> Option<PlotEvent> {
        self.events.try_recv().ok()
    }

    #[must_use]
    pub fn state(&self) -> PipelineState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stops listening for results and waits for the worker to exit
    ///
    /// The worker notices at its next send, so this waits for at most the plot it's currently rendering.
    ///
    /// # Errors
    ///
    /// Returns the panic payload if the worker panicked instead of exiting cleanly.
    pub fn close(self) -> thread::Result<()> {
        let Self { events, worker, .. } = self;
        drop(events);
        let joined = worker.join();
        if joined.is_err() {
            warn!("the plot worker panicked before it could finish");
        }
        joined
    }
}

impl Iterator for PlotStream {
    type Item = PlotOutcome;

    fn next(&mut self) -> Option<Self::Item> {
        self.events.recv().ok().and_then(PlotEvent::into_outcome)
    }
}
