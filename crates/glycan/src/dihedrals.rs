//! Lookup of the reference dihedral definitions that apply to a connection
//!
//! The reference table is plain text, one definition per line:
//!
//! ```text
//! # residue pos pos residue,angles,...
//! aDGal 1 3 bDGalf,phi psi,H1-C1-O3-C3,C1-O3-C3-H3
//! ```
//!
//! Only the first two fields are used. Lines starting with `#`, or with fewer than two commas, are ignored.

use std::{fmt, fs, path::Path};

use log::debug;

use crate::{Connection, errors::DihedralTableError};

// Public API ==========================================================================================================

/// Immutable reference data, loaded once and shared by every `DihedralSelector`
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct DihedralTable {
    rows: Vec<DihedralDefinition>,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct DihedralDefinition {
    linkage: String,
    angles: String,
}

#[derive(Copy, Clone, Debug)]
pub struct DihedralSelector<'t> {
    table: &'t DihedralTable,
}

impl DihedralTable {
    #[must_use]
    pub fn new(text: impl AsRef<str>) -> Self {
        let rows = text
            .as_ref()
            .lines()
            .filter_map(DihedralDefinition::from_line)
            .collect();
        Self { rows }
    }

    /// # Errors
    ///
    /// Fails if the file at `path` can't be read.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DihedralTableError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| DihedralTableError::Io {
            path: path.to_owned(),
            source,
        })?;
        let table = Self::new(text);
        debug!("loaded {} dihedral definitions from {path:?}", table.len());
        Ok(table)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DihedralDefinition> {
        self.rows.iter()
    }
}

impl DihedralDefinition {
    #[must_use]
    pub fn new(linkage: impl Into<String>, angles: impl Into<String>) -> Self {
        let linkage = linkage.into();
        let angles = angles.into();
        Self { linkage, angles }
    }

    /// The `residue pos pos residue` field this definition is keyed by
    #[must_use]
    pub fn linkage(&self) -> &str {
        &self.linkage
    }

    /// The name of the angle pair this definition describes
    #[must_use]
    pub fn angles(&self) -> &str {
        &self.angles
    }

    fn from_line(line: &str) -> Option<Self> {
        if line.starts_with('#') || line.matches(',').count() < 2 {
            return None;
        }
        let mut fields = line.split(',');
        Some(Self::new(fields.next()?, fields.next()?))
    }
}

impl fmt::Display for DihedralDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.angles, self.linkage)
    }
}

impl<'t> DihedralSelector<'t> {
    #[must_use]
    pub const fn new(table: &'t DihedralTable) -> Self {
        Self { table }
    }

    /// Every definition whose linkage field exactly matches the connection's lookup key, in table order
    ///
    /// Connections without a lookup key, or without any matching definitions, select nothing.
    #[must_use]
    pub fn select(&self, connection: &Connection) -> Vec<&'t DihedralDefinition> {
        let Some(key) = lookup_key(connection.as_str()) else {
            return Vec::new();
        };
        let table: &'t DihedralTable = self.table;
        table.rows.iter().filter(|row| row.linkage == key).collect()
    }

    /// Selects definitions for each connection in turn, keeping the connections' order
    #[must_use]
    pub fn select_all(&self, connections: &[Connection]) -> Vec<Vec<&'t DihedralDefinition>> {
        connections.iter().map(|c| self.select(c)).collect()
    }
}

/// Rewrites a connection into the `residue pos pos residue` form used by the reference table
///
/// The first pair of adjacent digits divides the connection: `aDGal13bDGalf` becomes `aDGal 1 3 bDGalf`. The second
/// residue runs up to the next pair of digits, if there is one.
#[must_use]
pub fn lookup_key(connection: &str) -> Option<String> {
    let divider = digit_pair(connection)?;
    let (donor, rest) = connection.split_at(divider);
    let (positions, rest) = rest.split_at(2);
    let acceptor = &rest[..digit_pair(rest).unwrap_or(rest.len())];

    let mut positions = positions.chars();
    let (from, to) = (positions.next()?, positions.next()?);
    Some(format!("{donor} {from} {to} {acceptor}"))
}

// Private Helper Functions ============================================================================================

// NOTE: ASCII digits are always single bytes, so the returned index is also a valid `char` boundary
fn digit_pair(s: &str) -> Option<usize> {
    s.as_bytes()
        .windows(2)
        .position(|w| w.iter().all(u8::is_ascii_digit))
}
