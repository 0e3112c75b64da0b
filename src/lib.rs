//! Picks dihedral angles for glycan linkages from their potential of mean force (PMF) landscapes
//!
//! A molecule is entered in CASPER notation, each unique connection between its residues is looked up in a database of
//! PMF datasets and plotted, and the points picked on those plots become the input of an external structure builder.

// Module Declarations
pub mod errors;
mod molecule;
mod render;
mod settings;

// Public Re-exports
pub use errors::{GlycoplotError, Result, SettingsError};
pub use molecule::Molecule;
pub use render::SummaryRenderer;
pub use settings::Settings;
