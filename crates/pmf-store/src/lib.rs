//! Durable storage for PMF datasets and saved point configurations
//!
//! A [`Store`] is a single session on a SQLite database holding two independent tables: a write-once cache of PMF
//! datasets keyed by connection, and a table of named configurations that can be saved over. Sessions are cheap and
//! aren't shared between threads; each thread that needs the store opens its own.

// Module Declarations
mod configuration;
mod dataset;
pub mod errors;
mod store;

// Standard Library Imports
use std::collections::BTreeMap;

// External Crate Imports
use serde::{Deserialize, Serialize};

// Public Re-exports
pub use errors::{DataFormatError, Result, StoreError};
pub use store::Store;

// Public API ==========================================================================================================

/// One sample of a potential of mean force: the energy `z` at the dihedral angles `(x, y)`
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(from = "(f64, f64, f64)", into = "(f64, f64, f64)")]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// The energy landscape of a single connection, in the order its samples were read
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PmfDataset {
    coordinates: Vec<Coordinate>,
}

/// A point picked on a connection's plot, in plot pixels
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// The points picked on each connection's plot, keyed by connection
pub type Points = BTreeMap<String, Vec<Point>>;

#[derive(Clone, PartialEq, Debug)]
pub struct Configuration {
    pub id: String,
    pub molecule_name: String,
    pub points: Points,
}

/// The outcome of ingesting a batch of raw PMF files
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Ids that were newly written
    pub inserted: Vec<String>,
    /// Ids that already had a dataset, which was left untouched
    pub already_present: Vec<String>,
    /// Items that couldn't be decoded or stored, and why
    pub failed: Vec<(String, StoreError)>,
}
