use std::{
    io,
    path::PathBuf,
    sync::{
        Arc, Mutex, PoisonError,
        mpsc::{self, Sender},
    },
    thread,
};

use glycan::Connection;
use log::{debug, info, warn};
use pmf_store::{Store, StoreError};

use crate::{Image, PipelineState, Plot, PlotError, PlotEvent, PlotFailure, PlotStream, Renderer};

const WORKER_NAME: &str = "plot-pipeline";

/// Everything needed to render one batch of plots
///
/// A pipeline is used up by [`render_all`](Self::render_all); build a new one for the next molecule.
#[derive(Debug)]
pub struct PlotPipeline<R> {
    store_path: PathBuf,
    renderer: R,
    state: Arc<Mutex<PipelineState>>,
}

impl<R: Renderer> PlotPipeline<R> {
    /// The worker will open its own session on the PMF database at `store_path`
    #[must_use]
    pub fn new(store_path: impl Into<PathBuf>, renderer: R) -> Self {
        Self {
            store_path: store_path.into(),
            renderer,
            state: Arc::default(),
        }
    }

    #[must_use]
    pub fn state(&self) -> PipelineState {
        get_state(&self.state)
    }

    /// Starts rendering a plot for each of `connections` on a new worker thread
    ///
    /// Connections are handled in order, and each result carries the connection's position in `connections`.
    ///
    /// # Errors
    ///
    /// Fails if the worker thread can't be spawned.
    pub fn render_all(
        self,
        connections: impl IntoIterator<Item = Connection>,
    ) -> io::Result<PlotStream> {
        let connections: Vec<_> = connections.into_iter().collect();
        let Self {
            store_path,
            renderer,
            state,
        } = self;

        set_state(&state, PipelineState::Running);
        let (events, receiver) = mpsc::channel();
        let worker = Worker {
            store_path,
            renderer,
            events,
            state: Arc::clone(&state),
        };
        let handle = thread::Builder::new()
            .name(WORKER_NAME.to_owned())
            .spawn(move || worker.run(connections))?;

        Ok(PlotStream::new(receiver, state, handle))
    }
}

// Worker ==============================================================================================================

struct Worker<R> {
    store_path: PathBuf,
    renderer: R,
    events: Sender<PlotEvent>,
    state: Arc<Mutex<PipelineState>>,
}

impl<R: Renderer> Worker<R> {
    fn run(mut self, connections: Vec<Connection>) {
        debug!("rendering {} plots", connections.len());
        let store = Store::open(&self.store_path).map_err(Arc::new);
        if let Err(e) = &store {
            warn!("no plots can be rendered: {e}");
        }

        let mut sent = 0;
        for (index, connection) in connections.into_iter().enumerate() {
            let event = match self.plot(store.as_ref(), &connection) {
                Ok(image) => PlotEvent::Rendered(Plot {
                    index,
                    connection,
                    image,
                }),
                Err(error) => {
                    debug!("plot {index} failed: {error}");
                    PlotEvent::Failed(PlotFailure {
                        index,
                        connection,
                        error,
                    })
                }
            };

            if self.events.send(event).is_err() {
                debug!("plot stream closed after {sent} results, stopping early");
                break;
            }
            sent += 1;
        }

        set_state(&self.state, PipelineState::Completed);
        // NOTE: Nobody is left to tell if the stream has already been closed
        if self.events.send(PlotEvent::Completed).is_ok() {
            info!("finished rendering {sent} plots");
        }
    }

    fn plot(
        &mut self,
        store: Result<&Store, &Arc<StoreError>>,
        connection: &Connection,
    ) -> Result<Image, PlotError> {
        let store = store.map_err(|e| PlotError::Unavailable(Arc::clone(e)))?;
        let dataset = store
            .get_dataset(connection.as_str())
            .map_err(|source| PlotError::Store {
                connection: connection.clone(),
                source,
            })?
            .ok_or_else(|| PlotError::Missing(connection.clone()))?;

        let image = self
            .renderer
            .render(connection.as_str(), &dataset)
            .map_err(|source| PlotError::Render {
                connection: connection.clone(),
                source,
            })?;

        if image.is_empty() {
            return Err(PlotError::EmptyImage(connection.clone()));
        }
        Ok(image)
    }
}

// Private Helper Functions ============================================================================================

fn get_state(state: &Mutex<PipelineState>) -> PipelineState {
    *state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn set_state(state: &Mutex<PipelineState>, new: PipelineState) {
    *state.lock().unwrap_or_else(PoisonError::into_inner) = new;
}
