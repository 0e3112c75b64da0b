//! Renders a plot for every connection of a molecule on a background worker
//!
//! [`PlotPipeline::render_all`] hands the work off to a dedicated thread, which opens its own [`pmf_store::Store`]
//! session, looks up each connection's PMF dataset, and passes it to a [`Renderer`]. Results come back through a
//! [`PlotStream`] as they're produced, each tagged with the index of the connection it belongs to. A failure only ever
//! affects its own connection.

// Module Declarations
pub mod errors;
mod pipeline;
mod stream;

// Standard Library Imports
use std::error::Error;

// External Crate Imports
use glycan::Connection;
use pmf_store::PmfDataset;

// Public Re-exports
pub use errors::PlotError;
pub use pipeline::PlotPipeline;
pub use stream::PlotStream;

// Public API ==========================================================================================================

pub type BoxError = Box<dyn Error + Send + Sync>;

/// Turns a connection's PMF dataset into an image
///
/// Implemented for any `FnMut(&str, &PmfDataset) -> Result<Image, BoxError>` closure that can be sent to the worker.
pub trait Renderer: Send + 'static {
    /// # Errors
    ///
    /// Any error is reported as a failure of the connection labelled `label`; later connections are still rendered.
    fn render(&mut self, label: &str, dataset: &PmfDataset) -> Result<Image, BoxError>;
}

/// Encoded image bytes, in whatever format the [`Renderer`] produces
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Image(Vec<u8>);

#[derive(Clone, Debug)]
pub struct Plot {
    /// The position of `connection` in the list given to [`PlotPipeline::render_all`]
    pub index: usize,
    pub connection: Connection,
    pub image: Image,
}

#[derive(Debug)]
pub struct PlotFailure {
    pub index: usize,
    pub connection: Connection,
    pub error: PlotError,
}

pub type PlotOutcome = Result<Plot, PlotFailure>;

/// Everything a worker sends back; `Completed` is always last, if the stream is still open to receive it
#[derive(Debug)]
pub enum PlotEvent {
    Rendered(Plot),
    Failed(PlotFailure),
    Completed,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    Running,
    Completed,
}

impl<F> Renderer for F
where
    F: FnMut(&str, &PmfDataset) -> Result<Image, BoxError> + Send + 'static,
{
    fn render(&mut self, label: &str, dataset: &PmfDataset) -> Result<Image, BoxError> {
        self(label, dataset)
    }
}

impl Image {
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for Image {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl PlotEvent {
    /// The outcome this event carries, or `None` for the completion signal
    #[must_use]
    pub fn into_outcome(self) -> Option<PlotOutcome> {
        match self {
            Self::Rendered(plot) => Some(Ok(plot)),
            Self::Failed(failure) => Some(Err(failure)),
            Self::Completed => None,
        }
    }
}
