use std::str::FromStr;

use itertools::{Itertools, MinMaxResult};

use crate::{Coordinate, DataFormatError, PmfDataset};

const COMMENT: char = '#';

impl PmfDataset {
    #[must_use]
    pub fn new(coordinates: Vec<Coordinate>) -> Self {
        Self { coordinates }
    }

    #[must_use]
    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    /// Splits the samples into grid rows, where each row is a run of consecutive samples sharing the same `x`
    ///
    /// PMF files are written as a flattened grid, so for well-formed data every row has the same length.
    pub fn rows(&self) -> impl Iterator<Item = &[Coordinate]> {
        self.coordinates.chunk_by(|a, b| a.x == b.x)
    }

    /// The lowest and highest energies in the dataset
    #[must_use]
    pub fn z_range(&self) -> Option<(f64, f64)> {
        match self.coordinates.iter().map(|c| c.z).minmax_by(f64::total_cmp) {
            MinMaxResult::NoElements => None,
            MinMaxResult::OneElement(z) => Some((z, z)),
            MinMaxResult::MinMax(min, max) => Some((min, max)),
        }
    }
}

impl FromStr for PmfDataset {
    type Err = DataFormatError;

    /// Reads a raw PMF file: one `x y z` triple per line, with blank lines and `#` comments skipped
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line.trim_start()))
            .filter(|(_, line)| !line.is_empty() && !line.starts_with(COMMENT))
            .map(|(number, line)| parse_coordinate(number, line))
            .collect()
    }
}

impl FromIterator<Coordinate> for PmfDataset {
    fn from_iter<T: IntoIterator<Item = Coordinate>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl From<(f64, f64, f64)> for Coordinate {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Self { x, y, z }
    }
}

impl From<Coordinate> for (f64, f64, f64) {
    fn from(Coordinate { x, y, z }: Coordinate) -> Self {
        (x, y, z)
    }
}

// Private Helper Functions ============================================================================================

fn parse_coordinate(line: usize, text: &str) -> Result<Coordinate, DataFormatError> {
    let fields: Vec<_> = text.split_whitespace().collect();
    let &[x, y, z] = fields.as_slice() else {
        let found = fields.len();
        return Err(DataFormatError::FieldCount { line, found });
    };

    let number = |value: &str| -> Result<f64, DataFormatError> {
        let parsed: f64 = value.parse().map_err(|_| DataFormatError::NotANumber {
            line,
            value: value.to_owned(),
        })?;
        if parsed.is_finite() {
            Ok(parsed)
        } else {
            Err(DataFormatError::NotFinite {
                line,
                value: value.to_owned(),
            })
        }
    };

    Ok(Coordinate {
        x: number(x)?,
        y: number(y)?,
        z: number(z)?,
    })
}
