//! Parsing of CASPER-style glycan sequences into residues, linkages, and the connections used to key PMF data

pub mod builder;
pub mod connection;
pub mod dihedrals;
pub mod errors;
pub mod parser;
mod sequence;

// External Crate Imports
use derive_more::Display;

// Public Re-exports
pub use dihedrals::{DihedralDefinition, DihedralSelector, DihedralTable};
pub use errors::{DihedralTableError, MalformedSequence};
pub use parser::parse;

// NOTE: Everything in this section is created by a single parse and is immutable afterwards; the `Sequence` owns its
// residues and linkages, and the `Connection`s derived from it are plain values that can outlive it

/// A single monosaccharide token, exactly as it was written in the sequence (e.g. `aDGal` or `bDGalf`)
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display)]
pub struct Residue(String);

/// A glycosidic bond between two adjacent residues, written `1->3` in a sequence
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display)]
#[display("{donor}->{acceptor}")]
pub struct Linkage {
    donor: Position,
    acceptor: Position,
}

/// A ring position, always a single decimal digit in CASPER notation
pub type Position = u8;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Topology {
    #[default]
    Linear,
    /// A repeating unit, written with a leading `-`, whose final residue links back to its first
    Cyclic,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Sequence {
    residues: Vec<Residue>,
    linkages: Vec<Linkage>,
    topology: Topology,
}

/// The canonical `residue + positions + residue` key (e.g. `aDGal13bDGalf`) used to address PMF datasets, plots, and
/// saved points. Two connections with the same text are the same connection, wherever they came from.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display)]
pub struct Connection(String);

/// Unique connections in order of first appearance
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct ConnectionSet(Vec<Connection>);
