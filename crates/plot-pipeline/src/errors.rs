use std::sync::Arc;

use glycan::Connection;
use miette::Diagnostic;
use pmf_store::StoreError;
use thiserror::Error;

use crate::BoxError;

#[derive(Debug, Diagnostic, Error)]
pub enum PlotError {
    #[error("no PMF data has been stored for {0}")]
    #[diagnostic(help("ingest a PMF file named after this connection, then try again"))]
    Missing(Connection),

    #[error("failed to fetch the PMF data for {connection}")]
    Store {
        connection: Connection,
        #[source]
        source: StoreError,
    },

    // NOTE: Every connection in a batch shares the one failure to open the store
    #[error("the PMF database is unavailable")]
    Unavailable(#[source] Arc<StoreError>),

    #[error("failed to render the plot for {connection}")]
    Render {
        connection: Connection,
        #[source]
        source: BoxError,
    },

    #[error("rendering the plot for {0} produced an empty image")]
    EmptyImage(Connection),
}
