use glycan::{
    ConnectionSet, DihedralDefinition, DihedralSelector, MalformedSequence, Sequence,
    builder::{self, Pixel},
};
use log::debug;
use pmf_store::{Points, Store, StoreError};

use crate::errors::Result;

/// The molecule currently being worked on: its notation as entered, and everything derived from it
#[derive(Clone, Debug)]
pub struct Molecule {
    notation: String,
    sequence: Sequence,
    connections: ConnectionSet,
}

impl Molecule {
    /// # Errors
    ///
    /// Fails if `notation` isn't a usable glycan sequence.
    pub fn parse(notation: &str) -> Result<Self, MalformedSequence> {
        let notation = notation.trim().to_owned();
        let sequence: Sequence = notation.parse()?;
        let connections = sequence.connection_set();
        debug!(
            "parsed {notation} into {} residues and {} unique connections",
            sequence.residues().len(),
            connections.len()
        );
        Ok(Self {
            notation,
            sequence,
            connections,
        })
    }

    #[must_use]
    pub fn notation(&self) -> &str {
        &self.notation
    }

    #[must_use]
    pub const fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    /// The molecule's unique connections; a connection's index here is the index of its plot
    #[must_use]
    pub const fn connections(&self) -> &ConnectionSet {
        &self.connections
    }

    /// The dihedral definitions that apply to each connection, in connection order
    #[must_use]
    pub fn candidates<'t>(
        &self,
        selector: DihedralSelector<'t>,
    ) -> Vec<Vec<&'t DihedralDefinition>> {
        selector.select_all(&self.connections)
    }

    /// The structure builder's dihedral input for the points picked on this molecule's plots
    #[must_use]
    pub fn builder_input(&self, selector: DihedralSelector<'_>, points: &Points) -> String {
        let pixels: Vec<Vec<Pixel>> = self
            .connections
            .iter()
            .map(|connection| {
                points
                    .get(connection.as_str())
                    .into_iter()
                    .flatten()
                    .map(|point| (point.x, point.y))
                    .collect()
            })
            .collect();
        builder::dihedral_input(&self.candidates(selector), &pixels)
    }

    /// Saves the points picked on this molecule's plots under `config_id`
    ///
    /// Only connections of this molecule that have at least one point are kept.
    ///
    /// # Errors
    ///
    /// Fails if the configuration can't be written to `store`.
    pub fn save(&self, store: &Store, config_id: &str, points: &Points) -> Result<(), StoreError> {
        let picked: Points = self
            .connections
            .iter()
            .filter_map(|connection| {
                let points = points.get(connection.as_str())?;
                (!points.is_empty()).then(|| (connection.to_string(), points.clone()))
            })
            .collect();
        store.save_configuration(config_id, &self.notation, &picked)
    }

    /// Loads a saved configuration, re-parsing the molecule it was saved for
    ///
    /// # Errors
    ///
    /// Fails if `store` can't be read, or the saved molecule no longer parses.
    pub fn load(store: &Store, config_id: &str) -> Result<Option<(Self, Points)>> {
        let Some(configuration) = store.load_configuration(config_id)? else {
            return Ok(None);
        };
        let molecule = Self::parse(&configuration.molecule_name)?;
        Ok(Some((molecule, configuration.points)))
    }
}
